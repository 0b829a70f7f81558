//! The canonical construction. The tape is a right-nested chain of `N` cells tagged by
//! `L_<symbol>` markers. Each state has scanning phases (`QL_s`, `QR_s`) that match the
//! cell under the head and rewrite it, rewrite phases (`QLW_s`, `QRW_s`) that walk back
//! over the tape carrying movement markers (`ML`, `MR`), and reflectors (`QLR_s`, `QRL_s`)
//! that turn a walk around at the boundary through the shared `E` type.
//!
//! Every simulated step re-traverses the tape between the head and the boundary, so the
//! checker's recursion depth grows with the distance the head travels.

use crate::analyzer::{analyze, check_word};
use crate::graph::{DeclarationGraph, Query, TypeRef, Variance};
use crate::machine::TuringMachine;
use crate::naming::{self, N, Z};
use crate::types::{Direction, Transition, TypingMachineError};
use tracing::debug;

const ML: &str = "ML";
const MR: &str = "MR";
const E: &str = "E";

const GENERIC: Option<Variance> = Some(Variance::Contravariant);

/// Names of the declarations used while rewriting towards one side of the tape.
struct Side {
    writer: &'static str,
    scanner: &'static str,
    reflector: &'static str,
    marker: &'static str,
    opposite_marker: &'static str,
}

const LEFT: Side = Side {
    writer: "QLW",
    scanner: "QL",
    reflector: "QLR",
    marker: ML,
    opposite_marker: MR,
};

const RIGHT: Side = Side {
    writer: "QRW",
    scanner: "QR",
    reflector: "QRL",
    marker: MR,
    opposite_marker: ML,
};

fn movement_marker(direction: Direction) -> &'static str {
    match direction {
        Direction::Left => ML,
        Direction::Right => MR,
    }
}

/// Compiles a machine into the canonical declaration graph.
pub fn compile(machine: &TuringMachine) -> Result<DeclarationGraph, TypingMachineError> {
    analyze(machine)?;

    let states = machine.states();
    let letters = naming::letters_with_tape_end(machine);
    let mut graph = DeclarationGraph::new();

    // First pass: register every name.
    graph.declare(Z, None);
    for name in [N, ML, MR] {
        graph.declare(name, GENERIC);
    }
    for letter in &letters {
        graph.declare(letter.as_str(), GENERIC);
    }
    for side in [&LEFT, &RIGHT] {
        for state in states {
            graph.declare(naming::phase(side.reflector, state), GENERIC);
        }
    }
    graph.declare(E, GENERIC);
    for state in states {
        for side in [&LEFT, &RIGHT] {
            graph.declare(naming::phase(side.writer, state), GENERIC);
        }
    }
    for state in states {
        for side in [&LEFT, &RIGHT] {
            graph.declare(naming::phase(side.scanner, state), GENERIC);
        }
    }

    // Second pass: attach supertypes.
    let reflections = [(&LEFT, &RIGHT), (&RIGHT, &LEFT)]
        .into_iter()
        .flat_map(|(side, opposite)| {
            states.iter().map(move |state| {
                TypeRef::chain(
                    [
                        naming::phase(side.reflector, state),
                        N.to_string(),
                        naming::phase(opposite.writer, state),
                        E.to_string(),
                        E.to_string(),
                    ],
                    TypeRef::Param,
                )
            })
        })
        .collect::<Vec<_>>();
    graph.extend(E, reflections)?;

    for state in states {
        for side in [&LEFT, &RIGHT] {
            let supertypes = rewrite_supertypes(machine, state, side, &letters);
            graph.extend(&naming::phase(side.writer, state), supertypes)?;
        }
    }

    for state in states {
        for side in [&LEFT, &RIGHT] {
            let supertypes = machine
                .transitions_from(state)
                .map(|transition| scan_supertype(transition, side))
                .collect::<Vec<_>>();
            graph.extend(&naming::phase(side.scanner, state), supertypes)?;
        }
    }

    graph.resolve()?;

    debug!(
        machine = %machine.name(),
        declarations = graph.len(),
        supertypes = graph.supertype_count(),
        "compiled canonical declaration graph"
    );

    Ok(graph)
}

/// Supertypes of a rewrite phase. The phase hands control to the scanner once it meets
/// its own movement marker, walks over opposite markers and symbols unchanged, and at the
/// boundary either reflects or, for the halting state, closes the chain.
fn rewrite_supertypes(
    machine: &TuringMachine,
    state: &str,
    side: &Side,
    letters: &[String],
) -> Vec<TypeRef> {
    let writer = naming::phase(side.writer, state);
    let scanner = naming::phase(side.scanner, state);

    let mut supertypes = vec![
        TypeRef::chain([side.marker, N, scanner.as_str()], TypeRef::Param),
        TypeRef::chain(
            [side.opposite_marker, N, writer.as_str(), side.opposite_marker, N],
            TypeRef::Param,
        ),
    ];

    supertypes.extend(letters.iter().map(|letter| {
        TypeRef::chain(
            [letter.as_str(), N, writer.as_str(), letter.as_str(), N],
            TypeRef::Param,
        )
    }));

    supertypes.push(if machine.is_halting(state) {
        TypeRef::chain([E, E], TypeRef::named(Z))
    } else {
        let reflector = naming::phase(side.reflector, state);
        TypeRef::chain([E, reflector.as_str(), N], TypeRef::Param)
    });

    supertypes
}

/// The supertype a scanning phase gains from one transition: consume the matched cell,
/// enter the target's rewrite phase, and leave the written symbol together with the
/// movement marker behind. Reading the blank cell re-inserts the boundary first.
fn scan_supertype(transition: &Transition, side: &Side) -> TypeRef {
    let read = naming::read(&transition.read_letter);
    let written = naming::letter(&transition.write_letter);
    let marker = movement_marker(transition.direction);

    let mut heads = vec![
        read,
        N.to_string(),
        naming::phase(side.writer, &transition.target_state),
    ];
    if transition.read_letter.is_blank() {
        heads.extend([naming::tape_end(), N.to_string()]);
    }

    let moves_towards_side = marker == side.marker;
    if moves_towards_side {
        heads.extend([marker.to_string(), N.to_string(), written, N.to_string()]);
    } else {
        heads.extend([written, N.to_string(), marker.to_string(), N.to_string()]);
    }

    TypeRef::chain(heads, TypeRef::Param)
}

/// Compiles an input word into the canonical query. The word is laid out reversed behind
/// the initial right rewrite phase, and the result must collapse to `E[E[Z]]`.
pub fn compile_query(
    machine: &TuringMachine,
    word: &[String],
) -> Result<Query, TypingMachineError> {
    check_word(machine, word)?;

    let tape_end = naming::tape_end();
    let mut heads = vec![
        naming::phase(RIGHT.writer, machine.initial_state()),
        tape_end.clone(),
        N.to_string(),
    ];
    for symbol in word.iter().rev() {
        heads.push(naming::letter(symbol));
        heads.push(N.to_string());
    }
    heads.extend([
        MR.to_string(),
        N.to_string(),
        tape_end,
        N.to_string(),
        E.to_string(),
        E.to_string(),
    ]);

    Ok(Query {
        value: TypeRef::chain(heads, TypeRef::named(Z)),
        expected: accepting_shape(),
    })
}

/// The shape every accepted run collapses to.
pub fn accepting_shape() -> TypeRef {
    TypeRef::chain([E, E], TypeRef::named(Z))
}
