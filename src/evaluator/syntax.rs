//! Pre-validation shared by every formula backend

use crate::error::EvaluationError;
use crate::expression::ArithmeticOperation;

pub const MAX_FORMULA_LENGTH: usize = 1000;

const ALLOWED_CHARACTERS: &str = "0123456789.+-*/() ";

/// Length and character checks run before any backend parses a formula.
pub trait FormulaSyntax {
    fn check(&self, formula: &str) -> Result<(), EvaluationError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFormulaSyntax;

impl FormulaSyntax for DefaultFormulaSyntax {
    fn check(&self, formula: &str) -> Result<(), EvaluationError> {
        if formula.is_empty() {
            return Err(EvaluationError::EmptyFormula);
        }

        if formula.chars().count() > MAX_FORMULA_LENGTH {
            return Err(EvaluationError::InvalidSyntax(format!(
                "Formula too long (max {} characters)",
                MAX_FORMULA_LENGTH
            )));
        }

        // Letters pass this first gate so unit names get a precise position below.
        let coarse = formula
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || ArithmeticOperation::from_char(c).is_some());
        if !coarse {
            return Err(EvaluationError::InvalidSyntax(
                "Invalid characters in formula".to_string(),
            ));
        }

        match formula
            .chars()
            .enumerate()
            .find(|(_, c)| !ALLOWED_CHARACTERS.contains(*c))
        {
            Some((position, character)) => Err(EvaluationError::InvalidCharacter { character, position }),
            None => Ok(()),
        }
    }
}

/// Drop every whitespace character.
pub fn strip_whitespace(formula: &str) -> String {
    formula.chars().filter(|c| !c.is_whitespace()).collect()
}
