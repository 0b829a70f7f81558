//! This crate compiles deterministic single-tape Turing machines into nominal type
//! declarations with contravariant parameters, so that deciding whether one type is
//! assignable to another runs the machine. It includes modules for parsing machine
//! definitions, validating them, the canonical and real-time constructions with their
//! query encoders, rendering to Python type hints, and handing artifacts to a checker.

pub mod analyzer;
pub mod canonical;
pub mod checker;
pub mod compiler;
pub mod graph;
pub mod loader;
pub mod machine;
pub mod naming;
pub mod parser;
pub mod programs;
pub mod realtime;
pub mod render;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `analyze` function and `AnalysisError` enum from the analyzer module.
pub use analyzer::{analyze, AnalysisError};
/// Re-exports the checker boundary.
pub use checker::{Checker, CommandChecker, Verdict};
/// Re-exports the facade.
pub use compiler::{compile, compile_and_query, compile_query, word_from_str};
/// Re-exports the declaration graph types.
pub use graph::{DeclarationGraph, Query, TypeDecl, TypeRef, Variance};
/// Re-exports the `MachineLoader` struct from the loader module.
pub use loader::MachineLoader;
/// Re-exports the `TuringMachine` struct from the machine module.
pub use machine::TuringMachine;
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
/// Re-exports `MachineInfo`, `MachineRegistry`, and `MACHINES` from the programs module.
pub use programs::{MachineInfo, MachineRegistry, MACHINES};
pub use render::{render_artifact, render_graph, render_json, render_query};
/// Re-exports the machine description types and the error type.
pub use types::{
    Algorithm, Direction, Letter, Transition, TypingMachineError, MAX_DEFINITION_SIZE, TAPE_END,
};
