//! Recursive-descent evaluator for `+ - * /` and parentheses
//!
//! ```text
//! expression := term (('+' | '-') term)*
//! term       := factor (('*' | '/') factor)*
//! factor     := '-' factor | '+' factor | '(' expression ')' | number
//! ```

use super::syntax::{strip_whitespace, DefaultFormulaSyntax, FormulaSyntax};
use super::FormulaEvaluator;
use crate::error::EvaluationError;
use std::ops::{Add, Div, Mul, Sub};

/// Numbers the evaluator can compute with.
pub trait Numeric:
    Copy + PartialEq + Add<Output = Self> + Sub<Output = Self> + Mul<Output = Self> + Div<Output = Self>
{
    fn from_f64(value: f64) -> Self;
}

impl Numeric for f64 {
    fn from_f64(value: f64) -> Self {
        value
    }
}

impl Numeric for f32 {
    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArithmeticEvaluator {
    pub max_recursion_depth: usize,
}

impl ArithmeticEvaluator {
    pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 100;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_recursion_depth(max_recursion_depth: usize) -> Self {
        Self { max_recursion_depth }
    }

    /// Evaluate `formula` in any [`Numeric`] type.
    pub fn evaluate_as<T: Numeric>(&self, formula: &str) -> Result<T, EvaluationError> {
        let sanitized = strip_whitespace(formula);
        DefaultFormulaSyntax.check(&sanitized)?;

        let chars: Vec<char> = sanitized.chars().collect();
        let mut parser = Parser {
            chars: &chars,
            position: 0,
            depth: 0,
            max_depth: self.max_recursion_depth,
        };

        let result = parser.expression::<T>()?;
        if parser.current().is_some() {
            return Err(EvaluationError::InvalidSyntax(format!(
                "Unexpected character at position {}",
                parser.position
            )));
        }
        Ok(result)
    }
}

impl Default for ArithmeticEvaluator {
    fn default() -> Self {
        Self::with_max_recursion_depth(Self::DEFAULT_MAX_RECURSION_DEPTH)
    }
}

impl FormulaEvaluator for ArithmeticEvaluator {
    fn evaluate(&self, formula: &str) -> Result<f64, EvaluationError> {
        self.evaluate_as::<f64>(formula)
    }
}

struct Parser<'a> {
    chars: &'a [char],
    position: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    fn current(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn enter(&mut self) -> Result<(), EvaluationError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(EvaluationError::RecursionLimitExceeded);
        }
        Ok(())
    }

    /// Run one grammar production inside the depth guard.
    fn guarded<T>(
        &mut self,
        production: impl FnOnce(&mut Self) -> Result<T, EvaluationError>,
    ) -> Result<T, EvaluationError> {
        self.enter()?;
        let result = production(self);
        self.depth -= 1;
        result
    }

    fn expression<T: Numeric>(&mut self) -> Result<T, EvaluationError> {
        self.guarded(|p| {
            let mut result = p.term::<T>()?;
            while let Some(op @ ('+' | '-')) = p.current() {
                p.advance();
                let right = p.term::<T>()?;
                result = if op == '+' { result + right } else { result - right };
            }
            Ok(result)
        })
    }

    fn term<T: Numeric>(&mut self) -> Result<T, EvaluationError> {
        self.guarded(|p| {
            let mut result = p.factor::<T>()?;
            while let Some(op @ ('*' | '/')) = p.current() {
                p.advance();
                let right = p.factor::<T>()?;
                if op == '*' {
                    result = result * right;
                } else {
                    if right == T::from_f64(0.0) {
                        return Err(EvaluationError::DivisionByZero);
                    }
                    result = result / right;
                }
            }
            Ok(result)
        })
    }

    fn factor<T: Numeric>(&mut self) -> Result<T, EvaluationError> {
        self.guarded(|p| match p.current() {
            Some('-') => {
                p.advance();
                Ok(T::from_f64(0.0) - p.factor::<T>()?)
            }
            Some('+') => {
                p.advance();
                p.factor::<T>()
            }
            Some('(') => {
                p.advance();
                let result = p.expression::<T>()?;
                if p.current() != Some(')') {
                    return Err(EvaluationError::InvalidSyntax(format!(
                        "Expected closing parenthesis at position {}",
                        p.position
                    )));
                }
                p.advance();
                Ok(result)
            }
            _ => p.number::<T>(),
        })
    }

    fn number<T: Numeric>(&mut self) -> Result<T, EvaluationError> {
        let mut literal = String::new();
        let mut decimal_point_found = false;

        while let Some(c) = self.current() {
            if c == '.' {
                if decimal_point_found {
                    return Err(EvaluationError::InvalidSyntax(
                        "Multiple decimal points in number".to_string(),
                    ));
                }
                decimal_point_found = true;
            } else if !c.is_ascii_digit() {
                break;
            }
            literal.push(c);
            self.advance();
        }

        if literal.is_empty() {
            return Err(EvaluationError::InvalidCharacter {
                character: self.current().unwrap_or(' '),
                position: self.position,
            });
        }

        let value: f64 = literal
            .parse()
            .map_err(|_| EvaluationError::InvalidSyntax(format!("Invalid number format: {}", literal)))?;
        if !value.is_finite() {
            return Err(EvaluationError::NumberOutOfRange);
        }
        Ok(T::from_f64(value))
    }
}
