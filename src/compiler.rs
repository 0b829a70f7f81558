//! Entry points that pick a construction and its matching query encoder.

use crate::graph::{DeclarationGraph, Query};
use crate::machine::TuringMachine;
use crate::render::render_artifact;
use crate::types::{Algorithm, TypingMachineError};
use crate::{canonical, realtime};
use tracing::info;

/// Encodes `machine` as a declaration graph with the chosen construction.
pub fn compile(
    algorithm: Algorithm,
    machine: &TuringMachine,
) -> Result<DeclarationGraph, TypingMachineError> {
    info!(%algorithm, machine = %machine.name(), "compiling machine");
    match algorithm {
        Algorithm::Canonical => canonical::compile(machine),
        Algorithm::RealTime => realtime::compile(machine),
    }
}

/// Encodes the initial configuration of `machine` on `word` as a query against the
/// graph `compile` produces for the same algorithm.
pub fn compile_query(
    algorithm: Algorithm,
    machine: &TuringMachine,
    word: &[String],
) -> Result<Query, TypingMachineError> {
    match algorithm {
        Algorithm::Canonical => canonical::compile_query(machine, word),
        Algorithm::RealTime => realtime::compile_query(machine, word),
    }
}

/// Compiles the graph and the query and renders them as one Python program.
pub fn compile_and_query(
    algorithm: Algorithm,
    machine: &TuringMachine,
    word: &[String],
) -> Result<String, TypingMachineError> {
    let graph = compile(algorithm, machine)?;
    let query = compile_query(algorithm, machine, word)?;
    graph.resolve_closed("query", &query.value)?;
    graph.resolve_closed("query", &query.expected)?;
    Ok(render_artifact(&graph, &query))
}

/// Splits a word into symbols. Whitespace separated input allows multi-character
/// symbols (`"x1 x2"`); otherwise every character is a symbol (`"abba"`).
pub fn word_from_str(word: &str) -> Vec<String> {
    if word.contains(char::is_whitespace) {
        word.split_whitespace().map(str::to_string).collect()
    } else {
        word.chars().map(String::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::programs::MachineRegistry;

    #[test]
    fn test_word_from_str() {
        assert_eq!(word_from_str("abba"), ["a", "b", "b", "a"]);
        assert_eq!(word_from_str("x1 x2"), ["x1", "x2"]);
        assert!(word_from_str("").is_empty());
    }

    #[test]
    fn test_compile_is_deterministic() {
        let machine = MachineRegistry::get_machine_by_name("palindromes").unwrap();
        let word = word_from_str("abba");

        for algorithm in Algorithm::ALL {
            let first = compile_and_query(algorithm, &machine, &word).unwrap();
            let second = compile_and_query(algorithm, &machine.clone(), &word).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_dispatch_selects_construction() {
        let machine = MachineRegistry::get_machine_by_name("anbn").unwrap();

        let canonical = compile(Algorithm::Canonical, &machine).unwrap();
        let realtime = compile(Algorithm::RealTime, &machine).unwrap();

        assert!(canonical.contains("E") && canonical.contains("QLW_q0"));
        assert!(realtime.contains("QWLR_q0") && !realtime.contains("E"));
        assert!(!canonical.uses_any());
        assert!(realtime.uses_any());
    }

    #[test]
    fn test_artifact_layout() {
        let machine = MachineRegistry::get_machine_by_name("even-length").unwrap();
        let artifact =
            compile_and_query(Algorithm::Canonical, &machine, &word_from_str("aa")).unwrap();

        let lines: Vec<&str> = artifact.lines().collect();
        assert_eq!(lines[0], "from typing import TypeVar, Generic");
        assert_eq!(lines[1], "T = TypeVar(\"T\", contravariant=True)");
        assert_eq!(lines[2], "class Z: ...");
        assert_eq!(
            *lines.last().unwrap(),
            "_: E[E[Z]] = QRW_q0[L___TAPE_END__[N[L_a[N[L_a[N[MR[N[L___TAPE_END__[N[E[E[Z]]]]]]]]]]]]]()"
        );
    }

    #[test]
    fn test_foreign_symbol_is_rejected() {
        let machine = MachineRegistry::get_machine_by_name("anbn").unwrap();
        for algorithm in Algorithm::ALL {
            let result = compile_and_query(algorithm, &machine, &word_from_str("abx"));
            assert!(matches!(result, Err(TypingMachineError::InvalidInput(_))));
        }
    }
}
