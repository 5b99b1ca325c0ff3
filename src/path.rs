//! Token reference paths (`{group.token}`)

use crate::error::PathError;
use std::fmt;
use std::str::FromStr;

const SEPARATOR: char = '.';
const OPENING_BRACKET: char = '{';
const CLOSING_BRACKET: char = '}';

/// Location of a token inside a document, written `{color.brand.primary}`.
///
/// Used both as the target of an alias and as the key of the visited set
/// during alias resolution, so it hashes by its segment sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenPath {
    segments: Vec<String>,
}

impl TokenPath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse the bracketed reference syntax.
    ///
    /// The trimmed input must start with `{`, end with `}` and contain no
    /// other braces. Empty segments (`{a..b}`) are dropped.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let trimmed = raw.trim();

        let opening = trimmed.matches(OPENING_BRACKET).count();
        let closing = trimmed.matches(CLOSING_BRACKET).count();
        if !trimmed.starts_with(OPENING_BRACKET)
            || !trimmed.ends_with(CLOSING_BRACKET)
            || opening != 1
            || closing != 1
        {
            return Err(PathError::BracketsMismatch);
        }

        let interior = &trimmed[1..trimmed.len() - 1];
        let segments: Vec<String> = interior
            .split(SEPARATOR)
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();

        if segments.is_empty() {
            return Err(PathError::EmptyAlias);
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn push(&mut self, segment: impl Into<String>) {
        self.segments.push(segment.into());
    }

    pub fn appending(&self, segment: impl Into<String>) -> Self {
        let mut copy = self.clone();
        copy.push(segment);
        copy
    }

    /// Split into the first segment and the path that remains after it.
    pub fn split_first(&self) -> Option<(&str, TokenPath)> {
        let (first, rest) = self.segments.split_first()?;
        Some((first.as_str(), TokenPath { segments: rest.to_vec() }))
    }

    /// Segments joined with dots, without the surrounding braces.
    pub fn dotted(&self) -> String {
        self.segments.join(".")
    }
}

impl fmt::Display for TokenPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", OPENING_BRACKET, self.dotted(), CLOSING_BRACKET)
    }
}

impl FromStr for TokenPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
