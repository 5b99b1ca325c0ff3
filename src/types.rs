//! Core types and constants for token documents

use std::fmt;

/// Reserved key carrying a token's declared type.
pub const TYPE_KEY: &str = "$type";

/// Reserved key whose presence marks an object as a value token.
pub const VALUE_KEY: &str = "$value";

/// Declared type of a token (`$type`).
///
/// The tag is open: documents may carry vendor types such as `icon`, which
/// only decode once a custom type mapping points them at a known type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenType(String);

impl TokenType {
    pub const COLOR: &'static str = "color";
    pub const DIMENSION: &'static str = "dimension";
    pub const FILE: &'static str = "file";
    pub const FONT_FAMILY: &'static str = "fontFamily";
    pub const FONT_WEIGHT: &'static str = "fontWeight";
    pub const NUMBER: &'static str = "number";
    pub const DURATION: &'static str = "duration";
    pub const CUBIC_BEZIER: &'static str = "cubicBezier";
    pub const TYPOGRAPHY: &'static str = "typography";
    pub const GRADIENT: &'static str = "gradient";
    pub const SHADOW: &'static str = "shadow";
    pub const STROKE_STYLE: &'static str = "strokeStyle";
    pub const BORDER: &'static str = "border";
    pub const TRANSITION: &'static str = "transition";

    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn color() -> Self {
        Self::new(Self::COLOR)
    }

    pub fn dimension() -> Self {
        Self::new(Self::DIMENSION)
    }

    pub fn file() -> Self {
        Self::new(Self::FILE)
    }

    pub fn number() -> Self {
        Self::new(Self::NUMBER)
    }

    /// Whether this is one of the fourteen types with a value decoder.
    pub fn is_known(&self) -> bool {
        matches!(
            self.0.as_str(),
            Self::COLOR
                | Self::DIMENSION
                | Self::FILE
                | Self::FONT_FAMILY
                | Self::FONT_WEIGHT
                | Self::NUMBER
                | Self::DURATION
                | Self::CUBIC_BEZIER
                | Self::TYPOGRAPHY
                | Self::GRADIENT
                | Self::SHADOW
                | Self::STROKE_STYLE
                | Self::BORDER
                | Self::TRANSITION
        )
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TokenType {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl From<String> for TokenType {
    fn from(tag: String) -> Self {
        Self(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_types() {
        assert!(TokenType::color().is_known());
        assert!(TokenType::from("strokeStyle").is_known());
        assert!(!TokenType::from("icon").is_known());
        assert_eq!(TokenType::dimension().to_string(), "dimension");
    }
}
