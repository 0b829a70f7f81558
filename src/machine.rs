//! This module defines the `TuringMachine` struct, the immutable description of a
//! deterministic single-tape machine consumed by the encoders. Its alphabet and state
//! set are derived from the transition list on first use and cached afterwards.

use crate::types::{Letter, Transition};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A deterministic single-tape Turing machine that accepts by reaching `halting_state`.
///
/// A missing transition for a `(state, letter)` pair rejects. The machine never runs
/// itself: the encoders translate it and an external type checker does the simulation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TuringMachine {
    name: String,
    initial_state: String,
    halting_state: String,
    transitions: Vec<Transition>,
    #[serde(skip)]
    alphabet: OnceLock<Vec<String>>,
    #[serde(skip)]
    states: OnceLock<Vec<String>>,
}

impl TuringMachine {
    /// Creates a new unnamed machine.
    pub fn new(initial_state: &str, halting_state: &str, transitions: Vec<Transition>) -> Self {
        Self {
            name: String::new(),
            initial_state: initial_state.to_string(),
            halting_state: halting_state.to_string(),
            transitions,
            alphabet: OnceLock::new(),
            states: OnceLock::new(),
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// The name of the machine, used as its registry key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The state the machine starts in.
    pub fn initial_state(&self) -> &str {
        &self.initial_state
    }

    /// The single accepting state. It has no outgoing transitions.
    pub fn halting_state(&self) -> &str {
        &self.halting_state
    }

    /// The transition function, in declaration order.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Returns the machine alphabet: every symbol read or written by a transition,
    /// excluding the blank cell, in order of first occurrence.
    pub fn alphabet(&self) -> &[String] {
        self.alphabet.get_or_init(|| {
            let mut alphabet: Vec<String> = Vec::new();
            for transition in &self.transitions {
                let letters = [
                    transition.read_letter.symbol(),
                    Some(transition.write_letter.as_str()),
                ];
                for symbol in letters.into_iter().flatten() {
                    if !alphabet.iter().any(|known| known == symbol) {
                        alphabet.push(symbol.to_string());
                    }
                }
            }
            alphabet
        })
    }

    /// Returns every state the machine mentions: the initial state first, then source
    /// and target states in transition order, then the halting state. No duplicates.
    pub fn states(&self) -> &[String] {
        self.states.get_or_init(|| {
            let mut states = vec![self.initial_state.clone()];
            let mentioned = self
                .transitions
                .iter()
                .flat_map(|t| [&t.source_state, &t.target_state])
                .chain(std::iter::once(&self.halting_state));

            for state in mentioned {
                if !states.contains(state) {
                    states.push(state.clone());
                }
            }
            states
        })
    }

    /// Returns the transitions leaving `state`, in declaration order.
    pub fn transitions_from<'a>(&'a self, state: &'a str) -> impl Iterator<Item = &'a Transition> {
        self.transitions
            .iter()
            .filter(move |transition| transition.source_state == state)
    }

    /// Finds the transition for `state` reading `letter`, if the machine defines one.
    pub fn transition(&self, state: &str, letter: &Letter) -> Option<&Transition> {
        self.transitions.iter().find(|transition| {
            transition.source_state == state && &transition.read_letter == letter
        })
    }

    /// Checks whether `state` is the accepting state.
    pub fn is_halting(&self, state: &str) -> bool {
        self.halting_state == state
    }
}

impl PartialEq for TuringMachine {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.initial_state == other.initial_state
            && self.halting_state == other.halting_state
            && self.transitions == other.transitions
    }
}

impl Eq for TuringMachine {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, Letter, Transition};

    fn symbol(s: &str) -> Letter {
        Letter::Symbol(s.to_string())
    }

    fn create_test_machine() -> TuringMachine {
        TuringMachine::new(
            "start",
            "accept",
            vec![
                Transition::new("start", symbol("a"), "middle", "x", Direction::Right),
                Transition::new("middle", Letter::Blank, "accept", "y", Direction::Left),
                Transition::new("middle", symbol("b"), "start", "a", Direction::Left),
            ],
        )
    }

    #[test]
    fn test_alphabet_in_first_occurrence_order() {
        let machine = create_test_machine();

        assert_eq!(machine.alphabet(), &["a", "x", "y", "b"]);
    }

    #[test]
    fn test_alphabet_excludes_blank() {
        let machine = create_test_machine();

        assert!(machine.alphabet().iter().all(|s| s != "_" && !s.is_empty()));
    }

    #[test]
    fn test_states_order_and_uniqueness() {
        let machine = create_test_machine();
        let states = machine.states();

        assert_eq!(states, &["start", "middle", "accept"]);
        assert_eq!(states.first().map(String::as_str), Some("start"));
        assert!(states.contains(&"accept".to_string()));
    }

    #[test]
    fn test_states_include_unreferenced_halting_state() {
        let machine = TuringMachine::new(
            "q0",
            "done",
            vec![Transition::new("q0", symbol("a"), "q0", "a", Direction::Right)],
        );

        assert_eq!(machine.states(), &["q0", "done"]);
    }

    #[test]
    fn test_derived_sets_are_stable_across_calls() {
        let machine = create_test_machine();

        let first_states = machine.states().to_vec();
        let first_alphabet = machine.alphabet().to_vec();

        assert_eq!(machine.states(), first_states.as_slice());
        assert_eq!(machine.alphabet(), first_alphabet.as_slice());
        // The cache survives cloning and does not affect equality.
        assert_eq!(machine.clone(), machine);
    }

    #[test]
    fn test_derived_sets_follow_transitions() {
        let mut transitions = vec![Transition::new("q0", symbol("a"), "q1", "a", Direction::Right)];
        let machine = TuringMachine::new("q0", "q1", transitions.clone());
        assert_eq!(machine.alphabet(), &["a"]);

        // A machine with more transitions is a new value with its own derived sets.
        transitions.push(Transition::new("q0", symbol("b"), "q2", "z", Direction::Left));
        let extended = TuringMachine::new("q0", "q1", transitions).with_name("extended");

        assert_eq!(extended.alphabet(), &["a", "b", "z"]);
        assert_eq!(extended.states(), &["q0", "q1", "q2"]);
        assert_eq!(extended.transitions().len(), 2);
        assert_eq!(machine.alphabet(), &["a"]);
        assert!(crate::canonical::compile(&extended).is_ok());
    }

    #[test]
    fn test_empty_machine() {
        let machine = TuringMachine::new("q0", "q0", Vec::new());

        assert!(machine.alphabet().is_empty());
        assert_eq!(machine.states(), &["q0"]);
    }

    #[test]
    fn test_transition_lookup() {
        let machine = create_test_machine();

        let transition = machine.transition("middle", &Letter::Blank).unwrap();
        assert_eq!(transition.target_state, "accept");
        assert!(machine.transition("accept", &symbol("a")).is_none());
        assert_eq!(machine.transitions_from("middle").count(), 2);
        assert!(machine.is_halting("accept"));
    }
}
