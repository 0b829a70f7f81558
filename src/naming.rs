//! Type names shared by both constructions.

use crate::machine::TuringMachine;
use crate::types::{Letter, TAPE_END};

/// The nullary terminal type.
pub const Z: &str = "Z";
/// The cons cell wrapping the rest of the tape.
pub const N: &str = "N";

/// The marker type for a tape symbol.
pub fn letter(symbol: &str) -> String {
    format!("L_{symbol}")
}

/// The marker type for the tape boundary.
pub fn tape_end() -> String {
    letter(TAPE_END)
}

/// The marker type matched when a transition reads `letter`. Reading the blank cell
/// matches the tape boundary.
pub fn read(letter: &Letter) -> String {
    match letter {
        Letter::Blank => tape_end(),
        Letter::Symbol(symbol) => self::letter(symbol),
    }
}

/// A per-state phase type, e.g. `QLW_q0`.
pub fn phase(prefix: &str, state: &str) -> String {
    format!("{prefix}_{state}")
}

/// Symbol marker types for the whole alphabet followed by the tape boundary.
pub fn letters_with_tape_end(machine: &TuringMachine) -> Vec<String> {
    machine
        .alphabet()
        .iter()
        .map(|symbol| letter(symbol))
        .chain(std::iter::once(tape_end()))
        .collect()
}
