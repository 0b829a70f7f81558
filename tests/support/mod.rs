//! Test-only stand-ins for the external pieces: a nominal subtype checker with declared
//! contravariance, and a direct simulator to compare verdicts against.

#![allow(dead_code)]

use typing_machines::{DeclarationGraph, Letter, Query, TuringMachine, TypeRef, Verdict};

pub const STEP_LIMIT: usize = 1_000_000;

/// Result of checking a query, with the number of subtype steps it took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checked {
    pub verdict: Verdict,
    pub steps: usize,
}

/// Decides `query.value <: query.expected` against `graph`.
///
/// Every rule is a tail call, so the search is a loop: equal heads compare their
/// arguments with the sides swapped, different heads climb to the unique supertype of the
/// value whose head matches the expected type.
pub fn check(graph: &DeclarationGraph, query: &Query, limit: usize) -> Checked {
    let mut value = query.value.clone();
    let mut expected = query.expected.clone();
    let mut steps = 0;

    let verdict = loop {
        if steps >= limit {
            break Verdict::ResourceExhausted;
        }
        steps += 1;

        let (next_value, next_expected) = match (&value, &expected) {
            (TypeRef::Any, _) | (_, TypeRef::Any) => break Verdict::Accept,
            (
                TypeRef::Named {
                    name: value_name,
                    argument: value_argument,
                },
                TypeRef::Named {
                    name: expected_name,
                    argument: expected_argument,
                },
            ) => {
                if value_name == expected_name {
                    match (value_argument, expected_argument) {
                        (None, None) => break Verdict::Accept,
                        (Some(v), Some(e)) => ((**e).clone(), (**v).clone()),
                        _ => break Verdict::Reject,
                    }
                } else {
                    let supertype = graph
                        .get(value_name)
                        .and_then(|declaration| declaration.supertype(expected_name));
                    match (supertype, value_argument) {
                        (Some(supertype), Some(argument)) => {
                            (supertype.substitute(argument), expected.clone())
                        }
                        (Some(supertype), None) => (supertype.clone(), expected.clone()),
                        (None, _) => break Verdict::Reject,
                    }
                }
            }
            _ => break Verdict::Reject,
        };

        value = next_value;
        expected = next_expected;
    };

    Checked { verdict, steps }
}

/// Runs `machine` on `word` over a tape that grows with blanks on both sides.
pub fn simulate(machine: &TuringMachine, word: &[String], limit: usize) -> Verdict {
    let mut tape: Vec<Option<String>> = word.iter().cloned().map(Some).collect();
    if tape.is_empty() {
        tape.push(None);
    }
    let mut head = 0;
    let mut state = machine.initial_state().to_string();

    for _ in 0..limit {
        if machine.is_halting(&state) {
            return Verdict::Accept;
        }

        let letter = match &tape[head] {
            Some(symbol) => Letter::Symbol(symbol.clone()),
            None => Letter::Blank,
        };
        let Some(transition) = machine.transition(&state, &letter) else {
            return Verdict::Reject;
        };

        tape[head] = Some(transition.write_letter.clone());
        match transition.direction {
            typing_machines::Direction::Left => {
                if head == 0 {
                    // Extend tape to the left
                    tape.insert(0, None);
                } else {
                    head -= 1;
                }
            }
            typing_machines::Direction::Right => {
                head += 1;
                if head >= tape.len() {
                    tape.push(None);
                }
            }
        }
        state = transition.target_state.clone();
    }

    Verdict::ResourceExhausted
}

/// Every word over `alphabet` of length at most `max_len`, shortest first.
pub fn words(alphabet: &[&str], max_len: usize) -> Vec<Vec<String>> {
    let mut all = vec![Vec::new()];
    let mut frontier: Vec<Vec<String>> = vec![Vec::new()];
    for _ in 0..max_len {
        frontier = frontier
            .iter()
            .flat_map(|word| {
                alphabet.iter().map(move |symbol| {
                    let mut longer = word.clone();
                    longer.push(symbol.to_string());
                    longer
                })
            })
            .collect();
        all.extend(frontier.iter().cloned());
    }
    all
}
