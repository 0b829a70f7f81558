//! Renders declaration graphs and queries as Python type hints checkable by mypy, or as
//! JSON for other hosts.
//!
//! Supertype clauses quote their outermost argument so that forward references survive
//! class creation at runtime: `class QL_q0(Generic[T], L_a["N[QLW_q1[T]]"]): ...`.

use crate::graph::{DeclarationGraph, Query, TypeDecl, TypeRef, Variance};
use crate::types::{Algorithm, TypingMachineError};
use serde::Serialize;

/// The type variable shared by every generic declaration.
const PARAM: &str = "T";

fn type_variable_declaration(variance: Variance) -> String {
    match variance {
        Variance::Contravariant => format!("{PARAM} = TypeVar(\"{PARAM}\", contravariant=True)"),
    }
}

/// Renders a type reference, writing the parameter as `param`.
fn render_type(reference: &TypeRef, param: &str, quote_argument: bool) -> String {
    match reference {
        TypeRef::Param => param.to_string(),
        TypeRef::Any => "Any".to_string(),
        TypeRef::Named { name, argument } => match argument {
            None => name.clone(),
            Some(argument) => {
                let inner = render_type(argument, param, false);
                if quote_argument {
                    format!("{name}[\"{inner}\"]")
                } else {
                    format!("{name}[{inner}]")
                }
            }
        },
    }
}

fn render_declaration(declaration: &TypeDecl) -> String {
    let bases: Vec<String> = declaration
        .variance
        .map(|_| format!("Generic[{PARAM}]"))
        .into_iter()
        .chain(
            declaration
                .supertypes
                .iter()
                .map(|supertype| render_type(supertype, PARAM, true)),
        )
        .collect();

    if bases.is_empty() {
        format!("class {}: ...", declaration.name)
    } else {
        format!("class {}({}): ...", declaration.name, bases.join(", "))
    }
}

/// Renders the imports, the type variable and one class per declaration, in graph order.
pub fn render_graph(graph: &DeclarationGraph) -> String {
    let mut imports = vec!["TypeVar", "Generic"];
    if graph.uses_any() {
        imports.push("Any");
    }

    let type_variable = graph
        .declarations()
        .iter()
        .find_map(|declaration| declaration.variance)
        .map(type_variable_declaration);

    std::iter::once(format!("from typing import {}", imports.join(", ")))
        .chain(type_variable)
        .chain(graph.declarations().iter().map(render_declaration))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders the query as an annotated assignment: `_: <expected> = <value>()`.
pub fn render_query(query: &Query) -> String {
    format!("_: {} = {}()", query.expected, query.value)
}

/// The checkable program: graph, a newline, then the query.
pub fn render_artifact(graph: &DeclarationGraph, query: &Query) -> String {
    format!("{}\n{}", render_graph(graph), render_query(query))
}

#[derive(Serialize)]
struct JsonArtifact<'a> {
    algorithm: Algorithm,
    declarations: &'a [TypeDecl],
    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<&'a Query>,
}

/// Renders the graph, and the query if given, as pretty-printed JSON.
pub fn render_json(
    algorithm: Algorithm,
    graph: &DeclarationGraph,
    query: Option<&Query>,
) -> Result<String, TypingMachineError> {
    let artifact = JsonArtifact {
        algorithm,
        declarations: graph.declarations(),
        query,
    };
    Ok(serde_json::to_string_pretty(&artifact)?)
}
