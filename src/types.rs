//! This module defines the core data structures and types shared across the crate,
//! including machine transitions, tape letters, algorithm selection, and error types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::Rule;

/// The symbol used in machine definitions to represent the blank cell.
pub const INPUT_BLANK_SYMBOL: &str = "_";
/// The boundary symbol marking both ends of the encoded tape.
pub const TAPE_END: &str = "__TAPE_END__";
/// The maximum allowed size for a machine definition in bytes.
pub const MAX_DEFINITION_SIZE: usize = 65536; // 64KB

/// A letter read from the tape: either a symbol of the machine alphabet or the blank cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Letter {
    /// The distinguished empty cell. Never part of the alphabet.
    Blank,
    /// A symbol of the machine alphabet.
    Symbol(String),
}

impl Letter {
    /// Returns the symbol, or `None` for the blank cell.
    pub fn symbol(&self) -> Option<&str> {
        match self {
            Letter::Blank => None,
            Letter::Symbol(symbol) => Some(symbol),
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Letter::Blank)
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Letter::Blank => f.write_str(INPUT_BLANK_SYMBOL),
            Letter::Symbol(symbol) => f.write_str(symbol),
        }
    }
}

/// Represents the possible directions the machine head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
}

/// Represents a single transition rule of a Turing machine.
///
/// When the machine is in `source_state` and the cell under the head holds
/// `read_letter`, it moves to `target_state`, writes `write_letter` and moves
/// the head in `direction`. Writing the blank cell is not expressible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub source_state: String,
    pub read_letter: Letter,
    pub target_state: String,
    pub write_letter: String,
    pub direction: Direction,
}

impl Transition {
    pub fn new(
        source_state: &str,
        read_letter: Letter,
        target_state: &str,
        write_letter: &str,
        direction: Direction,
    ) -> Self {
        Self {
            source_state: source_state.to_string(),
            read_letter,
            target_state: target_state.to_string(),
            write_letter: write_letter.to_string(),
            direction,
        }
    }
}

/// Selects which construction encodes the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// Bidirectional scan-then-rewrite encoding. Recursion depth grows with the
    /// distance travelled on the tape.
    Canonical,
    /// Fused scan/rewrite encoding. Recursion depth grows with the number of steps.
    RealTime,
}

impl Algorithm {
    pub const ALL: [Algorithm; 2] = [Algorithm::Canonical, Algorithm::RealTime];

    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Canonical => "canonical",
            Algorithm::RealTime => "real-time",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = TypingMachineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "canonical" | "grigore" => Ok(Algorithm::Canonical),
            "real-time" | "realtime" | "roth" => Ok(Algorithm::RealTime),
            _ => Err(TypingMachineError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Represents the errors that can occur while loading, validating, or compiling machines.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TypingMachineError {
    /// The algorithm selector does not name a known construction.
    #[error("Unrecognized algorithm: {0}")]
    UnknownAlgorithm(String),
    /// The machine violates a well-formedness rule the constructions rely on.
    #[error("Malformed machine: {0}")]
    MalformedMachine(String),
    /// The input word cannot be encoded for the given machine.
    #[error("Invalid input word: {0}")]
    InvalidInput(String),
    /// A type reference names a declaration missing from the graph.
    #[error("Declaration {declaration} references undeclared type {reference}")]
    UnresolvedType {
        declaration: String,
        reference: String,
    },
    /// Indicates an error during the parsing of a machine definition.
    #[error("Machine parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// Indicates a machine definition that parsed but is incomplete.
    #[error("Machine validation error: {0}")]
    ValidationError(String),
    /// Indicates an error related to file system operations.
    #[error("File error: {0}")]
    FileError(String),
    /// The external checker could not be run.
    #[error("Checker error: {0}")]
    CheckerError(String),
    /// A graph or query could not be serialized.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for TypingMachineError {
    fn from(error: serde_json::Error) -> Self {
        TypingMachineError::SerializationError(error.to_string())
    }
}
