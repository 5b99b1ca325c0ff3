//! Error types for the token compiler

use crate::path::TokenPath;
use crate::values::color::ColorSpace;
use thiserror::Error;

/// Errors raised while parsing a `{group.token}` reference.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Alias value must be enclosed in curly braces")]
    BracketsMismatch,

    #[error("Alias value cannot be empty")]
    EmptyAlias,
}

/// Errors raised while splitting a dimension formula into elements.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpressionParseError {
    #[error("Invalid format for dimension expression")]
    InvalidFormat,

    #[error("Invalid element: {0}")]
    InvalidElement(String),
}

/// Errors raised while evaluating a numeric formula.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("Not a valid mathematical formula: '{0}'")]
    InvalidFormula(String),

    #[error("Failed to compile validation pattern: '{0}'")]
    RegexCompilation(String),

    #[error("The formula is empty")]
    EmptyFormula,

    #[error("Invalid character '{character}' at position {position}")]
    InvalidCharacter { character: char, position: usize },

    #[error("Invalid syntax in formula: {0}")]
    InvalidSyntax(String),

    #[error("Division by zero is not allowed")]
    DivisionByZero,

    #[error("The formula has too many nested operations")]
    RecursionLimitExceeded,

    #[error("A number in the formula is too large or too small to be represented")]
    NumberOutOfRange,

    #[error("Unresolved alias: {0}")]
    UnresolvedAlias(TokenPath),
}

/// Errors raised while following aliases through a token tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("Token path is empty")]
    EmptyPath,

    #[error("Alias lookup root must be a group or an array")]
    InvalidRoot,

    #[error("Referenced token '{0}' does not exist")]
    InvalidReference(String),

    #[error("Reference points to a group or array instead of a value")]
    InvalidValueForReference,

    #[error("Circular reference detected at {0}")]
    CircularReference(TokenPath),

    #[error("Referenced token {path} has an incompatible type")]
    TypeMismatch { path: TokenPath },

    #[error("Cannot merge tokens: {0}")]
    UnsupportedMerge(String),
}

/// Reasons a cubic bezier payload is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubicBezierIssue {
    IncorrectNumberOfValues,
    XValueOutOfRange,
}

/// Errors raised while decoding a token document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("Token value type is not specified for '{location}'")]
    UnresolvedType { location: String },

    #[error("Unsupported token type '{0}'")]
    UnsupportedType(String),

    #[error("Expected {expected}, found {found}")]
    InvalidValue { expected: &'static str, found: String },

    #[error("Missing field '{0}'")]
    MissingField(&'static str),

    #[error("Invalid hex color: {0}")]
    InvalidHex(String),

    #[error("Font weight {0} is outside 1...1000")]
    InvalidFontWeight(u64),

    #[error("Unknown font weight alias '{0}'")]
    InvalidFontWeightAlias(String),

    #[error("Invalid cubic bezier {values:?}: {issue:?}")]
    InvalidCubicBezier { values: Vec<f64>, issue: CubicBezierIssue },

    #[error("Invalid dimension value string '{0}'")]
    InvalidMeasurement(String),

    #[error("Invalid file URL '{0}'")]
    InvalidUrl(String),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Expression(#[from] ExpressionParseError),
}

/// Errors raised while encoding a token tree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
    #[error("Hex encoding is not supported for color space '{0}'")]
    UnsupportedColorSpace(ColorSpace),

    #[error("Hex encoding requires numeric color components")]
    InvalidComponents,

    #[error("URL {url} is not relative to {base}")]
    NotRelative { url: String, base: String },

    #[error("Number {0} cannot be represented in JSON")]
    NonFiniteNumber(f64),
}

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path error: {0}")]
    Path(#[from] PathError),

    #[error("Expression error: {0}")]
    Expression(#[from] ExpressionParseError),

    #[error("Evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),

    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    #[error("Processor '{processor}' failed: {message}")]
    Processor { processor: String, message: String },

    #[error("Asset error for {url}: {message}")]
    Asset { url: String, message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },
}

pub type Result<T> = std::result::Result<T, TokenError>;

impl TokenError {
    pub fn processor(processor: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Processor {
            processor: processor.into(),
            message: message.into(),
        }
    }

    pub fn asset(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Asset {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }
}

impl DecodeError {
    pub(crate) fn invalid(expected: &'static str, found: &serde_json::Value) -> Self {
        Self::InvalidValue {
            expected,
            found: found.to_string(),
        }
    }
}
