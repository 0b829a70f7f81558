//! The real-time construction. Scanning and rewriting are fused: the type that carries a
//! freshly written symbol also continues the scan, so cells behind the head are never
//! re-traversed and every simulated step costs a bounded amount of checker recursion.
//!
//! Per state `s` the construction declares the scanners `QL_s` / `QR_s`, the writers
//! `QWL_s` / `QWR_s`, the direction flips `QLR_s`, `QRL_s`, `QWLR_s`, `QWRL_s` and the
//! boundary transitions `QLSL_s`, `QRSR_s`, `QLSR_s`, `QRSL_s`. The flips and boundary
//! types have no supertypes of their own; `N` declares how each of them unfolds.

use crate::analyzer::{analyze, check_word};
use crate::graph::{DeclarationGraph, Query, TypeRef, Variance};
use crate::machine::TuringMachine;
use crate::naming::{self, N, Z};
use crate::types::{Direction, Letter, Transition, TypingMachineError};
use tracing::debug;

const GENERIC: Option<Variance> = Some(Variance::Contravariant);

/// Prefixes of the auxiliary types, in declaration order.
const AUXILIARY: [&str; 8] = [
    "QRL", "QLR", "QWLR", "QWRL", "QLSL", "QRSR", "QLSR", "QRSL",
];

/// Compiles a machine into the real-time declaration graph.
pub fn compile(machine: &TuringMachine) -> Result<DeclarationGraph, TypingMachineError> {
    analyze(machine)?;

    let states = machine.states();
    let letters = naming::letters_with_tape_end(machine);
    let running = states
        .iter()
        .filter(|state| !machine.is_halting(state))
        .collect::<Vec<_>>();
    let mut graph = DeclarationGraph::new();

    // First pass: register every name.
    graph.declare(Z, None);
    for letter in &letters {
        graph.declare(letter.as_str(), GENERIC);
    }
    let declared = running
        .iter()
        .map(|state| state.as_str())
        .chain(std::iter::once(machine.halting_state()));
    for state in declared {
        graph.declare(naming::phase("QL", state), GENERIC);
        graph.declare(naming::phase("QR", state), GENERIC);
    }
    for state in states {
        graph.declare(naming::phase("QWL", state), GENERIC);
        graph.declare(naming::phase("QWR", state), GENERIC);
    }
    for state in states {
        for prefix in AUXILIARY {
            graph.declare(naming::phase(prefix, state), GENERIC);
        }
    }
    graph.declare(N, GENERIC);

    // Second pass: attach supertypes.
    for state in &running {
        let transitions = machine.transitions_from(state).collect::<Vec<_>>();
        graph.extend(
            &naming::phase("QL", state),
            transitions.iter().map(|t| scan_supertype(t, Direction::Left)),
        )?;
        graph.extend(
            &naming::phase("QR", state),
            transitions.iter().map(|t| scan_supertype(t, Direction::Right)),
        )?;
    }

    // Once halted, any remaining tape satisfies the expected shape.
    let halted = letters
        .iter()
        .map(|letter| TypeRef::chain([letter.as_str(), N], TypeRef::Any))
        .collect::<Vec<_>>();
    graph.extend(&naming::phase("QL", machine.halting_state()), halted.clone())?;
    graph.extend(&naming::phase("QR", machine.halting_state()), halted)?;

    for state in states {
        for (writer, scanner) in [("QWL", "QL"), ("QWR", "QR")] {
            let scanner = naming::phase(scanner, state);
            let supertypes = machine
                .alphabet()
                .iter()
                .map(|symbol| {
                    let letter = naming::letter(symbol);
                    TypeRef::chain(
                        [letter.as_str(), N, scanner.as_str(), letter.as_str(), N],
                        TypeRef::Param,
                    )
                })
                .collect::<Vec<_>>();
            graph.extend(&naming::phase(writer, state), supertypes)?;
        }
    }

    let cell_supertypes = states
        .iter()
        .flat_map(|state| cell_supertypes(state))
        .collect::<Vec<_>>();
    graph.extend(N, cell_supertypes)?;

    graph.resolve()?;

    debug!(
        machine = %machine.name(),
        declarations = graph.len(),
        supertypes = graph.supertype_count(),
        "compiled real-time declaration graph"
    );

    Ok(graph)
}

/// The supertype a scanner gains from one transition. `side` is the direction the
/// scanner is walking.
fn scan_supertype(transition: &Transition, side: Direction) -> TypeRef {
    let target = transition.target_state.as_str();
    let written = naming::letter(&transition.write_letter);

    let heads = match (&transition.read_letter, side, transition.direction) {
        (Letter::Symbol(read), Direction::Left, Direction::Left) => vec![
            naming::letter(read),
            N.to_string(),
            naming::phase("QL", target),
        ],
        (Letter::Symbol(read), Direction::Left, Direction::Right) => {
            vec![naming::letter(read), naming::phase("QWLR", target), N.to_string()]
        }
        (Letter::Symbol(read), Direction::Right, Direction::Left) => {
            vec![naming::letter(read), naming::phase("QWRL", target), N.to_string()]
        }
        (Letter::Symbol(read), Direction::Right, Direction::Right) => vec![
            naming::letter(read),
            N.to_string(),
            naming::phase("QR", target),
        ],
        (Letter::Blank, side, direction) => {
            let boundary = match (side, direction) {
                (Direction::Left, Direction::Left) => "QLSL",
                (Direction::Left, Direction::Right) => "QLSR",
                (Direction::Right, Direction::Left) => "QRSL",
                (Direction::Right, Direction::Right) => "QRSR",
            };
            vec![naming::tape_end(), naming::phase(boundary, target), N.to_string()]
        }
    };

    TypeRef::chain(
        heads.into_iter().chain([written, N.to_string()]),
        TypeRef::Param,
    )
}

/// How the auxiliary types of `state` unfold when they meet a cell.
fn cell_supertypes(state: &str) -> Vec<TypeRef> {
    let phase = |prefix: &str| naming::phase(prefix, state);
    let tape_end = naming::tape_end();

    vec![
        TypeRef::chain([phase("QWLR"), N.into(), phase("QWR")], TypeRef::Param),
        TypeRef::chain([phase("QWRL"), N.into(), phase("QWL")], TypeRef::Param),
        TypeRef::chain(
            [phase("QLSL"), phase("QRL"), N.into(), tape_end.clone(), N.into()],
            TypeRef::Param,
        ),
        TypeRef::chain(
            [phase("QRSR"), phase("QLR"), N.into(), tape_end.clone(), N.into()],
            TypeRef::Param,
        ),
        TypeRef::chain(
            [phase("QLSR"), N.into(), phase("QWR"), tape_end.clone(), N.into()],
            TypeRef::Param,
        ),
        TypeRef::chain(
            [phase("QRSL"), N.into(), phase("QWL"), tape_end, N.into()],
            TypeRef::Param,
        ),
        TypeRef::chain([phase("QLR"), N.into(), phase("QR")], TypeRef::Param),
        TypeRef::chain([phase("QRL"), N.into(), phase("QL")], TypeRef::Param),
    ]
}

/// Compiles an input word into the real-time query: the initial right scanner applied to
/// a boundary cell must be assignable to the tape holding the word in reading order.
pub fn compile_query(
    machine: &TuringMachine,
    word: &[String],
) -> Result<Query, TypingMachineError> {
    check_word(machine, word)?;

    let tape_end = naming::tape_end();
    let tape = word
        .iter()
        .flat_map(|symbol| [naming::letter(symbol), N.to_string()])
        .chain([tape_end.clone(), N.to_string()])
        .collect::<Vec<_>>();

    Ok(Query {
        value: TypeRef::chain(
            [naming::phase("QR", machine.initial_state()), tape_end, N.to_string()],
            TypeRef::named(Z),
        ),
        expected: TypeRef::chain(tape, TypeRef::named(Z)),
    })
}
