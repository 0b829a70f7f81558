//! This module provides the parser for machine definitions, utilizing the `pest` crate.
//! It defines the grammar for `.tm` files and functions to parse the input into a
//! `TuringMachine`.

use crate::{
    analyzer::analyze,
    machine::TuringMachine,
    types::{
        Direction, Letter, Transition, TypingMachineError, INPUT_BLANK_SYMBOL,
        MAX_DEFINITION_SIZE,
    },
};
use pest::{
    error::{Error, ErrorVariant},
    iterators::{Pair, Pairs},
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;
use std::collections::HashSet;

/// Derives a `PestParser` for the machine grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct MachineParser;

/// Parses the given input string into a `TuringMachine`.
///
/// This is the main entry point for parsing machine definitions. The parsed machine is
/// analyzed before being returned, so a successful parse can be handed straight to
/// either encoder.
///
/// # Returns
///
/// * `Ok(TuringMachine)` if the input is successfully parsed and validated.
/// * `Err(TypingMachineError::ParseError)` if there are any syntax errors.
/// * `Err(TypingMachineError::ValidationError)` if a required section is missing.
/// * `Err(TypingMachineError::MalformedMachine)` if the machine fails analysis.
pub fn parse(input: &str) -> Result<TuringMachine, TypingMachineError> {
    if input.len() > MAX_DEFINITION_SIZE {
        return Err(TypingMachineError::ValidationError(format!(
            "Machine definition is {} bytes, the limit is {}",
            input.len(),
            MAX_DEFINITION_SIZE
        )));
    }

    let root = MachineParser::parse(Rule::program, input.trim())
        .map_err(|e| TypingMachineError::ParseError(e.into()))?
        .next()
        .ok_or_else(|| {
            TypingMachineError::ValidationError("Empty machine definition".to_string())
        })?;

    let machine = parse_machine(root)?;

    analyze(&machine)?;

    Ok(machine)
}

/// Parses the top-level sections of a machine definition from a `Pair<Rule::program>`.
fn parse_machine(pair: Pair<Rule>) -> Result<TuringMachine, TypingMachineError> {
    let mut name: Option<String> = None;
    let mut start: Option<String> = None;
    let mut halt: Option<String> = None;
    let mut rules: Option<Vec<Transition>> = None;
    let mut seen = HashSet::new();

    for p in pair.into_inner() {
        let span = p.as_span();
        let rule = p.as_rule();

        check_unique_rule(rule, span, &mut seen)?;

        match rule {
            Rule::name => name = Some(parse_inner_string(p).trim_end().to_string()),
            Rule::start => start = Some(parse_inner_string(p)),
            Rule::halt => halt = Some(parse_inner_string(p)),
            Rule::rules => rules = Some(parse_rules(p)?),
            _ => {} // EOI
        }
    }

    let name = check_required_rule(name, "name")?;
    let start = check_required_rule(start, "start")?;
    let halt = check_required_rule(halt, "halt")?;
    let rules = check_required_rule(rules, "rules")?;

    Ok(TuringMachine::new(&start, &halt, rules).with_name(&name))
}

/// Parses the `rules:` section, flattening the state blocks into one transition list
/// in file order.
fn parse_rules(pair: Pair<Rule>) -> Result<Vec<Transition>, TypingMachineError> {
    let mut transitions = Vec::new();
    let mut states = HashSet::new();

    for block in pair.into_inner() {
        let span = block.as_span();
        let mut pairs = block.into_inner();
        let state = next_pair(&mut pairs, span)?.as_str().to_string();

        // Prevent a state from being split across blocks
        if !states.insert(state.clone()) {
            return Err(parse_error(&format!("Duplicate state block: {state}"), span));
        }

        for transition in pairs {
            transitions.push(parse_transition(&state, transition)?);
        }
    }

    Ok(transitions)
}

/// Parses `read -> write, direction, target` for the enclosing `state`.
fn parse_transition(state: &str, pair: Pair<Rule>) -> Result<Transition, TypingMachineError> {
    let span = pair.as_span();
    let mut pairs = pair.into_inner();

    let read = parse_read_letter(next_pair(&mut pairs, span)?.as_str());

    let write = next_pair(&mut pairs, span)?;
    if write.as_str() == INPUT_BLANK_SYMBOL {
        return Err(parse_error(
            "The blank symbol can only be read, not written",
            write.as_span(),
        ));
    }

    let direction = parse_direction(next_pair(&mut pairs, span)?)?;
    let target = next_pair(&mut pairs, span)?;

    Ok(Transition::new(
        state,
        read,
        target.as_str(),
        write.as_str(),
        direction,
    ))
}

/// Parses a single direction from a `Pair<Rule::direction>`.
///
/// Supports '<' or 'L' for Left and '>' or 'R' for Right.
fn parse_direction(pair: Pair<Rule>) -> Result<Direction, TypingMachineError> {
    let span = pair.as_span();
    match pair.as_str() {
        "<" | "L" => Ok(Direction::Left),
        ">" | "R" => Ok(Direction::Right),
        _ => Err(parse_error(
            &format!("Unsupported direction: {}", pair.as_str()),
            span,
        )),
    }
}

fn parse_read_letter(input: &str) -> Letter {
    if input == INPUT_BLANK_SYMBOL {
        Letter::Blank
    } else {
        Letter::Symbol(input.to_string())
    }
}

/// Creates a `TypingMachineError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> TypingMachineError {
    TypingMachineError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}

/// Takes the next child pair, reporting a truncated construct at `span` if there is none.
fn next_pair<'i>(
    pairs: &mut Pairs<'i, Rule>,
    span: Span<'i>,
) -> Result<Pair<'i, Rule>, TypingMachineError> {
    pairs
        .next()
        .ok_or_else(|| parse_error("Incomplete definition", span))
}

/// Extracts the inner string content from a `Pair`.
fn parse_inner_string(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .next()
        .map(|inner| inner.as_str().to_string())
        .unwrap_or_default()
}

/// Checks if a given rule has already been declared, ensuring uniqueness for top-level sections.
fn check_unique_rule(
    rule: Rule,
    span: Span,
    seen: &mut HashSet<Rule>,
) -> Result<(), TypingMachineError> {
    if !matches!(rule, Rule::name | Rule::start | Rule::halt | Rule::rules) {
        return Ok(());
    };

    if seen.contains(&rule) {
        return Err(parse_error(
            &format!("Duplicate \"{rule:?}:\" declaration"),
            span,
        ));
    }

    seen.insert(rule);

    Ok(())
}

/// Checks if a required rule is present, returning an `Err` if it's missing.
fn check_required_rule<T>(value: Option<T>, name: &str) -> Result<T, TypingMachineError> {
    value.ok_or_else(|| TypingMachineError::ValidationError(format!("Missing '{name}' section")))
}
