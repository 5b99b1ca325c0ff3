//! Formula backend delegating to the `meval` expression engine

use super::syntax::{strip_whitespace, DefaultFormulaSyntax, FormulaSyntax};
use super::FormulaEvaluator;
use crate::error::EvaluationError;
use regex::Regex;

/// An operand: optional opening parens and signs, a decimal, optional closing parens.
const OPERAND: &str = r"[(\-\s]*\d+(\.\d*)?[)\s]*";
const OPERATOR: &str = r"\s*[+\-*/]\s*";

/// Evaluates formulas with `meval` after the shared syntax check and a
/// shape check that keeps the engine's wider grammar (functions, powers,
/// constants) out of reach.
#[derive(Debug, Clone)]
pub struct ExpressionEngineEvaluator {
    shape: Regex,
}

impl ExpressionEngineEvaluator {
    pub fn new() -> Result<Self, EvaluationError> {
        let pattern = format!(
            r"^\s*{operand}({operator}{operand})*\s*$",
            operand = OPERAND,
            operator = OPERATOR
        );
        let shape = Regex::new(&pattern).map_err(|e| EvaluationError::RegexCompilation(e.to_string()))?;
        Ok(Self { shape })
    }

    fn validate(&self, formula: &str) -> Result<(), EvaluationError> {
        DefaultFormulaSyntax.check(formula)?;
        if !self.shape.is_match(formula) {
            return Err(EvaluationError::InvalidFormula(formula.to_string()));
        }
        Ok(())
    }
}

impl FormulaEvaluator for ExpressionEngineEvaluator {
    fn evaluate(&self, formula: &str) -> Result<f64, EvaluationError> {
        let sanitized = strip_whitespace(formula);
        self.validate(&sanitized)?;

        let value = meval::eval_str(&sanitized).map_err(|e| {
            log::debug!("Expression engine rejected '{}': {}", sanitized, e);
            EvaluationError::InvalidFormula(sanitized.clone())
        })?;

        if !value.is_finite() {
            return Err(EvaluationError::NumberOutOfRange);
        }
        Ok(round_to_four_places(value))
    }
}

fn round_to_four_places(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> ExpressionEngineEvaluator {
        ExpressionEngineEvaluator::new().unwrap()
    }

    #[test]
    fn test_basic_arithmetic() {
        assert_eq!(engine().evaluate("4*5"), Ok(20.0));
        assert_eq!(engine().evaluate("32 + 5"), Ok(37.0));
        assert_eq!(engine().evaluate("(5+3)*2"), Ok(16.0));
        assert_eq!(engine().evaluate("-3*-2"), Ok(6.0));
    }

    #[test]
    fn test_rounds_to_four_places() {
        assert_eq!(engine().evaluate("10/3"), Ok(3.3333));
        assert_eq!(engine().evaluate("2/3"), Ok(0.6667));
    }

    #[test]
    fn test_rejects_doubled_operators() {
        assert_eq!(
            engine().evaluate("1++2"),
            Err(EvaluationError::InvalidFormula("1++2".to_string()))
        );
        assert_eq!(
            engine().evaluate("1*+2"),
            Err(EvaluationError::InvalidFormula("1*+2".to_string()))
        );
        assert_eq!(
            engine().evaluate("3**2"),
            Err(EvaluationError::InvalidFormula("3**2".to_string()))
        );
    }

    #[test]
    fn test_shared_syntax_checks_run_first() {
        assert_eq!(engine().evaluate(""), Err(EvaluationError::EmptyFormula));
        assert_eq!(
            engine().evaluate("sin(1)"),
            Err(EvaluationError::InvalidCharacter {
                character: 's',
                position: 0
            })
        );
    }

    #[test]
    fn test_unbalanced_parentheses_fail_in_engine() {
        assert_eq!(
            engine().evaluate("(1+2"),
            Err(EvaluationError::InvalidFormula("(1+2".to_string()))
        );
    }

    #[test]
    fn test_division_by_zero_is_out_of_range() {
        assert_eq!(engine().evaluate("1/0"), Err(EvaluationError::NumberOutOfRange));
    }
}
