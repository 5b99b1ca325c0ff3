//! Alias resolution
//!
//! Every `{path}` reference in a token tree is replaced with the value it
//! points to, following chains transitively. References inside composite
//! values and inside dimension expressions are resolved the same way. The
//! source tree is never modified; resolution builds a new one.

use crate::error::ResolutionError;
use crate::expression::{ArithmeticOperation, DimensionExpression, ExpressionElement};
use crate::path::TokenPath;
use crate::token::{Token, TokenGroup};
use crate::values::{DimensionValue, TokenValue};
use std::collections::HashSet;

/// Paths currently being followed; seeing one again means a cycle.
pub type VisitedPaths = HashSet<TokenPath>;

/// A value whose nested references can be resolved against a document.
pub trait CompositeToken: Sized {
    fn resolve_aliases(&self, resolver: &AliasResolver<'_>, visited: &mut VisitedPaths)
        -> Result<Self, ResolutionError>;
}

impl<T: CompositeToken> CompositeToken for Vec<T> {
    fn resolve_aliases(
        &self,
        resolver: &AliasResolver<'_>,
        visited: &mut VisitedPaths,
    ) -> Result<Self, ResolutionError> {
        self.iter().map(|item| item.resolve_aliases(resolver, visited)).collect()
    }
}

/// Looks up paths against a fixed document root.
#[derive(Debug, Clone, Copy)]
pub struct AliasResolver<'a> {
    root: &'a Token,
}

impl<'a> AliasResolver<'a> {
    pub fn new(root: &'a Token) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &'a Token {
        self.root
    }

    /// Resolve a single path from the root.
    pub fn resolve_alias(&self, path: &TokenPath) -> Result<Token, ResolutionError> {
        let mut visited = VisitedPaths::from([path.clone()]);
        self.resolve_in(self.root, path, &mut visited)
    }

    /// Follow a reference found while resolving something else.
    ///
    /// `path` stays in `visited` while its target is being resolved, so a
    /// chain that leads back to it is reported instead of recursing forever.
    pub fn follow(&self, path: &TokenPath, visited: &mut VisitedPaths) -> Result<Token, ResolutionError> {
        if !visited.insert(path.clone()) {
            log::debug!("Circular reference detected at {}", path);
            return Err(ResolutionError::CircularReference(path.clone()));
        }
        log::trace!("Following alias {}", path);
        let result = self.resolve_in(self.root, path, visited);
        visited.remove(path);
        result
    }

    /// Walk `path` below `node`.
    ///
    /// Groups consume one segment per step. Arrays try every entry with the
    /// whole remaining path, last entry first, and return the first success;
    /// failing entries are skipped.
    fn resolve_in(
        &self,
        node: &Token,
        path: &TokenPath,
        visited: &mut VisitedPaths,
    ) -> Result<Token, ResolutionError> {
        let (key, rest) = path.split_first().ok_or(ResolutionError::EmptyPath)?;

        match node {
            Token::Group(group) => {
                let child = group
                    .get(key)
                    .ok_or_else(|| ResolutionError::InvalidReference(key.to_string()))?;
                if rest.is_empty() {
                    self.classify(child, visited)
                } else {
                    self.resolve_in(child, &rest, visited)
                }
            }
            Token::Array(entries) => {
                for (index, entry) in entries.iter().enumerate().rev() {
                    match self.resolve_in(entry, path, visited) {
                        Ok(resolved) => return Ok(resolved),
                        Err(e) => log::trace!("Array entry {} does not resolve {}: {}", index, path, e),
                    }
                }
                Err(ResolutionError::InvalidReference(path.to_string()))
            }
            Token::Alias(_) | Token::Value(_) | Token::Unknown(_) => Err(ResolutionError::InvalidRoot),
        }
    }

    /// Turn the node a path ends on into its resolved form.
    fn classify(&self, node: &Token, visited: &mut VisitedPaths) -> Result<Token, ResolutionError> {
        match node {
            Token::Alias(target) => self.follow(target, visited),
            Token::Value(value) => value.resolve_aliases(self, visited).map(Token::Value),
            Token::Unknown(_) => Ok(node.clone()),
            Token::Group(_) | Token::Array(_) => Err(ResolutionError::InvalidValueForReference),
        }
    }

    /// Replace alias elements with the constants they point to.
    ///
    /// A reference to another expression is inlined in parentheses so the
    /// surrounding precedence is kept.
    pub fn resolve_expression(
        &self,
        expression: &DimensionExpression,
        visited: &mut VisitedPaths,
    ) -> Result<DimensionExpression, ResolutionError> {
        let mut elements = Vec::with_capacity(expression.elements.len());

        for element in &expression.elements {
            let ExpressionElement::Alias(path) = element else {
                elements.push(element.clone());
                continue;
            };

            match self.follow(path, visited)? {
                Token::Value(TokenValue::Dimension(DimensionValue::Constant(constant))) => {
                    elements.push(ExpressionElement::Value(constant));
                }
                Token::Value(TokenValue::Dimension(DimensionValue::Expression(inner))) => {
                    elements.push(ArithmeticOperation::LeftParen.into());
                    elements.extend(inner.elements);
                    elements.push(ArithmeticOperation::RightParen.into());
                }
                _ => return Err(ResolutionError::InvalidValueForReference),
            }
        }

        Ok(DimensionExpression::new(elements))
    }

    /// Resolve every reference in the document.
    pub fn resolve_tree(&self) -> Result<Token, ResolutionError> {
        self.resolve_node(self.root, &TokenPath::default())
    }

    fn resolve_node(&self, node: &Token, location: &TokenPath) -> Result<Token, ResolutionError> {
        match node {
            Token::Group(group) => group
                .iter()
                .map(|(key, child)| Ok((key.clone(), self.resolve_node(child, &location.appending(key))?)))
                .collect::<Result<TokenGroup, ResolutionError>>()
                .map(Token::Group),
            Token::Array(entries) => entries
                .iter()
                .enumerate()
                .map(|(index, entry)| self.resolve_node(entry, &location.appending(index.to_string())))
                .collect::<Result<Vec<_>, _>>()
                .map(Token::Array),
            Token::Alias(path) => {
                log::debug!("Resolving {} -> {}", location, path);
                let mut visited = self.seed(location);
                self.follow(path, &mut visited)
            }
            Token::Value(value) => {
                let mut visited = self.seed(location);
                value.resolve_aliases(self, &mut visited).map(Token::Value)
            }
            Token::Unknown(_) => Ok(node.clone()),
        }
    }

    /// The node's own location is visited from the start, so a value that
    /// refers to itself is a cycle.
    fn seed(&self, location: &TokenPath) -> VisitedPaths {
        let mut visited = VisitedPaths::new();
        if !location.is_empty() {
            visited.insert(location.clone());
        }
        visited
    }
}

/// Resolve every alias in `root`, returning the resolved copy.
pub fn resolve_aliases(root: &Token) -> Result<Token, ResolutionError> {
    AliasResolver::new(root).resolve_tree()
}
