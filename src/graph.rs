//! This module defines the declaration graph produced by the encoders: named type
//! declarations with at most one type parameter, linked by supertype relations, plus the
//! `Query` that pairs a constructed configuration with the shape it must be assignable to.
//!
//! Declarations reference each other freely, so a graph is built in two passes. Every
//! name is registered first with `declare`, and supertypes are attached afterwards with
//! `extend`, which resolves names through the graph's index rather than construction order.

use crate::types::TypingMachineError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Declared variance of a type parameter. Both constructions need the argument's
/// subtyping reversed, so contravariance is the only one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variance {
    Contravariant,
}

/// A reference to a type: a possibly applied declaration, the enclosing declaration's
/// parameter, or the wildcard that is compatible with every type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeRef {
    Named {
        name: String,
        argument: Option<Box<TypeRef>>,
    },
    Param,
    Any,
}

impl TypeRef {
    /// A nullary reference to `name`.
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named {
            name: name.into(),
            argument: None,
        }
    }

    /// `name` applied to `argument`.
    pub fn apply(name: impl Into<String>, argument: TypeRef) -> Self {
        TypeRef::Named {
            name: name.into(),
            argument: Some(Box::new(argument)),
        }
    }

    /// Builds the right-nested application `heads[0][heads[1][...[tail]]]`.
    pub fn chain<I, S>(heads: I, tail: TypeRef) -> Self
    where
        I: IntoIterator<Item = S>,
        I::IntoIter: DoubleEndedIterator,
        S: Into<String>,
    {
        heads
            .into_iter()
            .rev()
            .fold(tail, |inner, head| TypeRef::apply(head, inner))
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            TypeRef::Named { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Replaces every occurrence of the parameter with `value`.
    pub fn substitute(&self, value: &TypeRef) -> TypeRef {
        match self {
            TypeRef::Param => value.clone(),
            TypeRef::Any => TypeRef::Any,
            TypeRef::Named { name, argument } => TypeRef::Named {
                name: name.clone(),
                argument: argument
                    .as_ref()
                    .map(|argument| Box::new(argument.substitute(value))),
            },
        }
    }

    /// Returns the names along the spine of the reference, outermost first.
    pub fn spine(&self) -> Vec<&str> {
        let mut names = Vec::new();
        let mut current = Some(self);
        while let Some(TypeRef::Named { name, argument }) = current {
            names.push(name.as_str());
            current = argument.as_deref();
        }
        names
    }

    /// Returns true if the wildcard appears anywhere in the reference.
    pub fn mentions_any(&self) -> bool {
        match self {
            TypeRef::Any => true,
            TypeRef::Param => false,
            TypeRef::Named { argument, .. } => {
                argument.as_deref().is_some_and(TypeRef::mentions_any)
            }
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Param => f.write_str("T"),
            TypeRef::Any => f.write_str("Any"),
            TypeRef::Named { name, argument } => match argument {
                Some(argument) => write!(f, "{name}[{argument}]"),
                None => f.write_str(name),
            },
        }
    }
}

/// A named type declaration. `variance` is `None` for nullary declarations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    pub variance: Option<Variance>,
    pub supertypes: Vec<TypeRef>,
}

impl TypeDecl {
    pub fn arity(&self) -> usize {
        usize::from(self.variance.is_some())
    }

    /// Finds the supertype whose head is `name`.
    pub fn supertype(&self, name: &str) -> Option<&TypeRef> {
        self.supertypes.iter().find(|sup| sup.name() == Some(name))
    }
}

/// The ordered set of declarations emitted by an encoder.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeclarationGraph {
    declarations: Vec<TypeDecl>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl DeclarationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a declaration with no supertypes. Registering a name twice keeps the
    /// first registration.
    pub fn declare(&mut self, name: impl Into<String>, variance: Option<Variance>) {
        let name = name.into();
        if self.index.contains_key(&name) {
            return;
        }
        self.index.insert(name.clone(), self.declarations.len());
        self.declarations.push(TypeDecl {
            name,
            variance,
            supertypes: Vec::new(),
        });
    }

    /// Appends supertypes to an already registered declaration.
    pub fn extend<I>(&mut self, name: &str, supertypes: I) -> Result<(), TypingMachineError>
    where
        I: IntoIterator<Item = TypeRef>,
    {
        let position = *self
            .index
            .get(name)
            .ok_or_else(|| TypingMachineError::UnresolvedType {
                declaration: name.to_string(),
                reference: name.to_string(),
            })?;
        self.declarations[position].supertypes.extend(supertypes);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&TypeDecl> {
        self.index
            .get(name)
            .map(|&position| &self.declarations[position])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn declarations(&self) -> &[TypeDecl] {
        &self.declarations
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Total number of supertype clauses over all declarations.
    pub fn supertype_count(&self) -> usize {
        self.declarations.iter().map(|d| d.supertypes.len()).sum()
    }

    /// Returns true if any supertype clause uses the wildcard.
    pub fn uses_any(&self) -> bool {
        self.declarations
            .iter()
            .flat_map(|d| &d.supertypes)
            .any(TypeRef::mentions_any)
    }

    /// Checks that every name referenced by a supertype clause is declared in the graph,
    /// and that the parameter only appears inside parametric declarations.
    pub fn resolve(&self) -> Result<(), TypingMachineError> {
        for declaration in &self.declarations {
            for supertype in &declaration.supertypes {
                self.resolve_ref(declaration, supertype)?;
            }
        }
        Ok(())
    }

    /// Checks a type reference that appears outside any declaration, such as a query.
    pub fn resolve_closed(
        &self,
        context: &str,
        reference: &TypeRef,
    ) -> Result<(), TypingMachineError> {
        let mut current = Some(reference);
        while let Some(reference) = current {
            match reference {
                TypeRef::Any => return Ok(()),
                TypeRef::Param => {
                    return Err(TypingMachineError::UnresolvedType {
                        declaration: context.to_string(),
                        reference: reference.to_string(),
                    })
                }
                TypeRef::Named { name, argument } => {
                    if !self.contains(name) {
                        return Err(TypingMachineError::UnresolvedType {
                            declaration: context.to_string(),
                            reference: name.clone(),
                        });
                    }
                    current = argument.as_deref();
                }
            }
        }
        Ok(())
    }

    fn resolve_ref(
        &self,
        declaration: &TypeDecl,
        reference: &TypeRef,
    ) -> Result<(), TypingMachineError> {
        let unresolved = |reference: String| TypingMachineError::UnresolvedType {
            declaration: declaration.name.clone(),
            reference,
        };

        let mut current = Some(reference);
        while let Some(reference) = current {
            match reference {
                TypeRef::Any => return Ok(()),
                TypeRef::Param if declaration.variance.is_some() => return Ok(()),
                TypeRef::Param => return Err(unresolved(reference.to_string())),
                TypeRef::Named { name, argument } => {
                    if !self.contains(name) {
                        return Err(unresolved(name.clone()));
                    }
                    current = argument.as_deref();
                }
            }
        }
        Ok(())
    }
}

/// A subtyping assertion: `value` must be assignable to `expected`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub value: TypeRef,
    pub expected: TypeRef,
}
