//! Dimension expressions: tokenized formulas such as `{spacing.base} * 2 + 1rem`

use crate::codec::{self, TokenCodec};
use crate::config::{DecodeConfig, EncodeConfig};
use crate::error::{DecodeError, EncodeError, ExpressionParseError};
use crate::measurement::DimensionConstant;
use crate::path::TokenPath;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOperation {
    Add,
    Subtract,
    Multiply,
    Divide,
    LeftParen,
    RightParen,
}

impl ArithmeticOperation {
    pub const ALL: [ArithmeticOperation; 6] = [
        ArithmeticOperation::Add,
        ArithmeticOperation::Subtract,
        ArithmeticOperation::Multiply,
        ArithmeticOperation::Divide,
        ArithmeticOperation::LeftParen,
        ArithmeticOperation::RightParen,
    ];

    pub fn symbol(self) -> char {
        match self {
            ArithmeticOperation::Add => '+',
            ArithmeticOperation::Subtract => '-',
            ArithmeticOperation::Multiply => '*',
            ArithmeticOperation::Divide => '/',
            ArithmeticOperation::LeftParen => '(',
            ArithmeticOperation::RightParen => ')',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.symbol() == c)
    }
}

/// One piece of a dimension formula.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionElement {
    Operation(ArithmeticOperation),
    Alias(TokenPath),
    Value(DimensionConstant),
}

impl ExpressionElement {
    /// Parse a single run: an operator, a `{path}`, or a number with an
    /// optional unit suffix.
    pub fn parse(raw: &str) -> Result<Self, ExpressionParseError> {
        let trimmed = raw.trim();

        let mut chars = trimmed.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if let Some(op) = ArithmeticOperation::from_char(c) {
                return Ok(ExpressionElement::Operation(op));
            }
        }

        if let Ok(path) = TokenPath::parse(trimmed) {
            return Ok(ExpressionElement::Alias(path));
        }

        DimensionConstant::parse(trimmed)
            .map(ExpressionElement::Value)
            .map_err(|_| ExpressionParseError::InvalidElement(trimmed.to_string()))
    }

    pub fn raw(&self) -> String {
        match self {
            ExpressionElement::Operation(op) => op.symbol().to_string(),
            ExpressionElement::Alias(path) => path.to_string(),
            ExpressionElement::Value(constant) => constant.to_string(),
        }
    }

    pub fn value(value: f64) -> Self {
        ExpressionElement::Value(DimensionConstant::px(value))
    }

    pub fn alias(path: TokenPath) -> Self {
        ExpressionElement::Alias(path)
    }
}

impl From<ArithmeticOperation> for ExpressionElement {
    fn from(op: ArithmeticOperation) -> Self {
        ExpressionElement::Operation(op)
    }
}

impl From<DimensionConstant> for ExpressionElement {
    fn from(constant: DimensionConstant) -> Self {
        ExpressionElement::Value(constant)
    }
}

/// A formula kept as an ordered element list.
///
/// The textual form is the concatenation of every element's raw token, so
/// `"16px * 1.5"` encodes back as `"16px*1.5px"`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DimensionExpression {
    pub elements: Vec<ExpressionElement>,
}

impl DimensionExpression {
    pub fn new(elements: Vec<ExpressionElement>) -> Self {
        Self { elements }
    }

    /// Split `raw` on the operator characters and classify each run.
    ///
    /// Braced alias paths are kept whole, so `{size.x-large}` is one alias
    /// rather than a subtraction. Whitespace-only runs are dropped.
    pub fn tokenize(raw: &str) -> Result<Self, ExpressionParseError> {
        let mut runs: Vec<String> = Vec::new();
        let mut current = String::new();
        let mut in_alias = false;

        for c in raw.chars() {
            match c {
                '{' => {
                    in_alias = true;
                    current.push(c);
                }
                '}' => {
                    in_alias = false;
                    current.push(c);
                }
                _ if !in_alias && ArithmeticOperation::from_char(c).is_some() => {
                    if !current.trim().is_empty() {
                        runs.push(std::mem::take(&mut current));
                    }
                    current.clear();
                    runs.push(c.to_string());
                }
                _ => current.push(c),
            }
        }
        if !current.trim().is_empty() {
            runs.push(current);
        }

        if runs.is_empty() {
            return Err(ExpressionParseError::InvalidFormat);
        }

        let elements = runs
            .iter()
            .map(|run| ExpressionElement::parse(run))
            .collect::<Result<Vec<_>, _>>()?;

        log::trace!("Tokenized '{}' into {} elements", raw.trim(), elements.len());
        Ok(Self { elements })
    }

    pub fn raw(&self) -> String {
        self.elements.iter().map(ExpressionElement::raw).collect()
    }

    pub fn aliases(&self) -> impl Iterator<Item = &TokenPath> {
        self.elements.iter().filter_map(|element| match element {
            ExpressionElement::Alias(path) => Some(path),
            _ => None,
        })
    }

    pub fn has_aliases(&self) -> bool {
        self.aliases().next().is_some()
    }

    /// Apply `transform` to every constant, leaving operators and aliases.
    pub fn map_constants(&self, mut transform: impl FnMut(DimensionConstant) -> DimensionConstant) -> Self {
        let elements = self
            .elements
            .iter()
            .map(|element| match element {
                ExpressionElement::Value(constant) => ExpressionElement::Value(transform(*constant)),
                other => other.clone(),
            })
            .collect();
        Self { elements }
    }
}

impl fmt::Display for DimensionExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw())
    }
}

impl FromStr for DimensionExpression {
    type Err = ExpressionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::tokenize(s)
    }
}

impl TokenCodec for DimensionExpression {
    fn decode(value: &Value, _config: &DecodeConfig) -> Result<Self, DecodeError> {
        let raw = codec::expect_str(value, "expression string")?;
        Ok(Self::tokenize(raw)?)
    }

    fn encode(&self, _config: &EncodeConfig) -> Result<Value, EncodeError> {
        Ok(Value::String(self.raw()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::DimensionUnit;
    use serde_json::json;

    #[test]
    fn test_tokenize_mixed_formula() {
        let expression = DimensionExpression::tokenize("{spacing.base} * 2 + 1rem").unwrap();
        assert_eq!(
            expression.elements,
            vec![
                ExpressionElement::Alias(TokenPath::new(["spacing", "base"])),
                ArithmeticOperation::Multiply.into(),
                ExpressionElement::value(2.0),
                ArithmeticOperation::Add.into(),
                DimensionConstant::rem(1.0).into(),
            ]
        );
    }

    #[test]
    fn test_tokenize_parentheses_and_negation() {
        let expression = DimensionExpression::tokenize("-(4px/2)").unwrap();
        assert_eq!(
            expression.elements,
            vec![
                ArithmeticOperation::Subtract.into(),
                ArithmeticOperation::LeftParen.into(),
                ExpressionElement::value(4.0),
                ArithmeticOperation::Divide.into(),
                ExpressionElement::value(2.0),
                ArithmeticOperation::RightParen.into(),
            ]
        );
    }

    #[test]
    fn test_hyphenated_alias_stays_whole() {
        let expression = DimensionExpression::tokenize("{size.x-large}-2px").unwrap();
        assert_eq!(expression.elements.len(), 3);
        assert_eq!(
            expression.elements[0],
            ExpressionElement::Alias(TokenPath::new(["size", "x-large"]))
        );
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(DimensionExpression::tokenize(""), Err(ExpressionParseError::InvalidFormat));
        assert_eq!(DimensionExpression::tokenize("   "), Err(ExpressionParseError::InvalidFormat));
        assert_eq!(
            DimensionExpression::tokenize("2px + abc"),
            Err(ExpressionParseError::InvalidElement("abc".to_string()))
        );
        assert_eq!(
            DimensionExpression::tokenize("{a}} + 1"),
            Err(ExpressionParseError::InvalidElement("{a}}".to_string()))
        );
    }

    #[test]
    fn test_raw_form_round_trips() {
        let expression = DimensionExpression::tokenize("16px * 1.5 + {a.b}").unwrap();
        assert_eq!(expression.raw(), "16px*1.5px+{a.b}");
        assert_eq!(DimensionExpression::tokenize(&expression.raw()).unwrap(), expression);

        let encoded = expression.encode(&EncodeConfig::default()).unwrap();
        assert_eq!(encoded, json!("16px*1.5px+{a.b}"));
        assert_eq!(
            DimensionExpression::decode(&encoded, &DecodeConfig::default()).unwrap(),
            expression
        );
    }

    #[test]
    fn test_map_constants_skips_aliases() {
        let expression = DimensionExpression::tokenize("2rem + {a}").unwrap();
        let mapped = expression.map_constants(|c| DimensionConstant::new(c.value * 16.0, DimensionUnit::Px));
        assert_eq!(mapped.raw(), "32px+{a}");
        assert!(mapped.has_aliases());
    }
}
