//! This module provides functions for analyzing Turing machines before they are encoded.
//! The constructions silently produce an inconsistent declaration graph for a machine
//! with conflicting transitions, so those are rejected here instead.

use crate::machine::TuringMachine;
use crate::types::{Letter, TypingMachineError, TAPE_END};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Represents the problems that can be found while analyzing a machine.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnalysisError {
    /// Two transitions share a source state and read letter.
    DuplicateTransitions(Vec<String>),
    /// The halting state has outgoing transitions.
    HaltingStateNotFinal(String),
    /// A state or symbol cannot be used inside a type name.
    InvalidIdentifiers(Vec<String>),
    /// A symbol collides with the tape boundary marker.
    ReservedSymbol(String),
}

impl From<AnalysisError> for TypingMachineError {
    /// Converts an `AnalysisError` into a `TypingMachineError::MalformedMachine`.
    fn from(error: AnalysisError) -> Self {
        match error {
            AnalysisError::DuplicateTransitions(pairs) => TypingMachineError::MalformedMachine(
                format!("Multiple transitions defined for: {}", pairs.join(", ")),
            ),
            AnalysisError::HaltingStateNotFinal(state) => TypingMachineError::MalformedMachine(
                format!("Halting state {state} has outgoing transitions"),
            ),
            AnalysisError::InvalidIdentifiers(names) => TypingMachineError::MalformedMachine(
                format!("Invalid state or symbol names: {:?}", names),
            ),
            AnalysisError::ReservedSymbol(symbol) => TypingMachineError::MalformedMachine(
                format!("Symbol {symbol} is reserved for the tape boundary"),
            ),
        }
    }
}

/// Analyzes a machine for the well-formedness rules the encoders rely on.
///
/// A missing transition is not an error: it is how a machine rejects.
///
/// # Returns
///
/// * `Ok(())` if no errors are found.
/// * `Err(TypingMachineError::MalformedMachine)` describing the first violated rule.
pub fn analyze(machine: &TuringMachine) -> Result<(), TypingMachineError> {
    let errors = [
        check_identifiers,
        check_reserved_symbols,
        check_deterministic,
        check_halting_state,
    ]
    .iter()
    .filter_map(|f| f(machine).err())
    .collect::<Vec<_>>();

    if let Some(first_error) = errors.into_iter().next() {
        return Err(first_error.into());
    }

    let unreachable = unreachable_states(machine);
    if !unreachable.is_empty() {
        warn!(machine = %machine.name(), states = ?unreachable, "unreachable states");
    }

    Ok(())
}

/// Checks that every symbol of `word` belongs to the machine alphabet.
pub fn check_word(machine: &TuringMachine, word: &[String]) -> Result<(), TypingMachineError> {
    let alphabet = machine.alphabet();
    match word.iter().find(|symbol| !alphabet.contains(symbol)) {
        Some(symbol) => Err(TypingMachineError::InvalidInput(format!(
            "symbol '{symbol}' is not in the machine alphabet {:?}",
            alphabet
        ))),
        None => Ok(()),
    }
}

/// Checks whether `name` can be embedded in a type name.
pub fn is_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Checks that states and symbols only use characters allowed in type names.
fn check_identifiers(machine: &TuringMachine) -> Result<(), AnalysisError> {
    let mut invalid: Vec<String> = machine
        .states()
        .iter()
        .chain(machine.alphabet())
        .filter(|name| !is_identifier(name))
        .cloned()
        .collect();

    if !invalid.is_empty() {
        invalid.sort();
        invalid.dedup();
        return Err(AnalysisError::InvalidIdentifiers(invalid));
    }

    Ok(())
}

/// Checks that no symbol is spelled like the tape boundary marker.
fn check_reserved_symbols(machine: &TuringMachine) -> Result<(), AnalysisError> {
    match machine.alphabet().iter().find(|symbol| *symbol == TAPE_END) {
        Some(symbol) => Err(AnalysisError::ReservedSymbol(symbol.clone())),
        None => Ok(()),
    }
}

/// Checks that each `(state, letter)` pair has at most one transition.
fn check_deterministic(machine: &TuringMachine) -> Result<(), AnalysisError> {
    let mut counts: HashMap<(&str, &Letter), usize> = HashMap::new();
    for transition in machine.transitions() {
        *counts
            .entry((transition.source_state.as_str(), &transition.read_letter))
            .or_insert(0) += 1;
    }

    let mut duplicates: Vec<String> = counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|((state, letter), _)| format!("({state}, {letter})"))
        .collect();

    if !duplicates.is_empty() {
        duplicates.sort(); // Sort for deterministic output
        return Err(AnalysisError::DuplicateTransitions(duplicates));
    }

    Ok(())
}

/// Checks that the halting state has no outgoing transitions.
fn check_halting_state(machine: &TuringMachine) -> Result<(), AnalysisError> {
    if machine.transitions_from(machine.halting_state()).next().is_some() {
        return Err(AnalysisError::HaltingStateNotFinal(
            machine.halting_state().to_string(),
        ));
    }

    Ok(())
}

/// Returns states that cannot be reached from the initial state, sorted.
///
/// Such states are harmless to the encoders but usually indicate a typo.
pub fn unreachable_states(machine: &TuringMachine) -> Vec<String> {
    let mut visited = HashSet::new();
    let mut queue = vec![machine.initial_state()];

    while let Some(state) = queue.pop() {
        if !visited.insert(state) {
            continue;
        }

        for transition in machine.transitions_from(state) {
            if !visited.contains(transition.target_state.as_str()) {
                queue.push(transition.target_state.as_str());
            }
        }
    }

    let mut unreachable: Vec<String> = machine
        .states()
        .iter()
        .filter(|state| !visited.contains(state.as_str()))
        .cloned()
        .collect();
    unreachable.sort();
    unreachable
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, Transition};

    fn symbol(s: &str) -> Letter {
        Letter::Symbol(s.to_string())
    }

    fn create_test_machine(transitions: Vec<Transition>) -> TuringMachine {
        TuringMachine::new("start", "halt", transitions).with_name("test")
    }

    #[test]
    fn test_valid_machine() {
        let machine = create_test_machine(vec![
            Transition::new("start", symbol("a"), "start", "a", Direction::Right),
            Transition::new("start", Letter::Blank, "halt", "a", Direction::Left),
        ]);

        assert!(analyze(&machine).is_ok());
    }

    #[test]
    fn test_missing_transitions_are_allowed() {
        let machine = create_test_machine(vec![Transition::new(
            "start",
            symbol("a"),
            "halt",
            "a",
            Direction::Right,
        )]);

        assert!(analyze(&machine).is_ok());
    }

    #[test]
    fn test_duplicate_transitions() {
        let machine = create_test_machine(vec![
            Transition::new("start", symbol("a"), "start", "a", Direction::Right),
            Transition::new("start", symbol("a"), "halt", "b", Direction::Left),
        ]);

        assert_eq!(
            check_deterministic(&machine),
            Err(AnalysisError::DuplicateTransitions(vec!["(start, a)".into()]))
        );
    }

    #[test]
    fn test_duplicate_blank_transitions() {
        let machine = create_test_machine(vec![
            Transition::new("start", Letter::Blank, "start", "a", Direction::Right),
            Transition::new("start", Letter::Blank, "halt", "b", Direction::Left),
        ]);

        let error: TypingMachineError = check_deterministic(&machine).unwrap_err().into();
        assert_eq!(
            error,
            TypingMachineError::MalformedMachine(
                "Multiple transitions defined for: (start, _)".into()
            )
        );
    }

    #[test]
    fn test_halting_state_with_transitions() {
        let machine = create_test_machine(vec![Transition::new(
            "halt",
            symbol("a"),
            "start",
            "a",
            Direction::Right,
        )]);

        assert_eq!(
            check_halting_state(&machine),
            Err(AnalysisError::HaltingStateNotFinal("halt".into()))
        );
    }

    #[test]
    fn test_invalid_identifiers() {
        let machine = create_test_machine(vec![Transition::new(
            "start",
            symbol("a-b"),
            "two words",
            "a",
            Direction::Right,
        )]);

        assert_eq!(
            check_identifiers(&machine),
            Err(AnalysisError::InvalidIdentifiers(vec![
                "a-b".into(),
                "two words".into()
            ]))
        );
        assert!(is_identifier("q_10"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn test_reserved_symbol() {
        let machine = create_test_machine(vec![Transition::new(
            "start",
            symbol(TAPE_END),
            "halt",
            "a",
            Direction::Right,
        )]);

        let result = analyze(&machine);
        assert!(matches!(result, Err(TypingMachineError::MalformedMachine(msg)) if msg.contains("reserved")));
    }

    #[test]
    fn test_unreachable_states() {
        let machine = create_test_machine(vec![
            Transition::new("start", symbol("a"), "halt", "a", Direction::Right),
            Transition::new("island", symbol("a"), "halt", "a", Direction::Right),
        ]);

        assert_eq!(unreachable_states(&machine), vec!["island".to_string()]);
        // Unreachable states only warn.
        assert!(analyze(&machine).is_ok());
    }

    #[test]
    fn test_check_word() {
        let machine = create_test_machine(vec![Transition::new(
            "start",
            symbol("a"),
            "halt",
            "b",
            Direction::Right,
        )]);

        assert!(check_word(&machine, &["a".into(), "b".into()]).is_ok());
        assert!(check_word(&machine, &[]).is_ok());

        let error = check_word(&machine, &["c".into()]).unwrap_err();
        assert!(error.to_string().contains("'c'"));
    }
}
