//! Dimension expression evaluation
//!
//! A [`DimensionExpression`] is reduced to a unit-free numeric formula (every
//! constant converted to the base unit) and handed to a [`FormulaEvaluator`].
//! Aliases must have been resolved beforehand.

pub mod arithmetic;
pub mod engine;
pub mod syntax;

pub use arithmetic::{ArithmeticEvaluator, Numeric};
pub use engine::ExpressionEngineEvaluator;
pub use syntax::{DefaultFormulaSyntax, FormulaSyntax};

use crate::converter::{DimensionConverter, UnitConverter};
use crate::error::EvaluationError;
use crate::expression::{DimensionExpression, ExpressionElement};
use crate::measurement::{DimensionConstant, DimensionUnit};

/// A backend turning formula text into a number.
pub trait FormulaEvaluator {
    fn evaluate(&self, formula: &str) -> Result<f64, EvaluationError>;
}

impl<E: FormulaEvaluator + ?Sized> FormulaEvaluator for Box<E> {
    fn evaluate(&self, formula: &str) -> Result<f64, EvaluationError> {
        (**self).evaluate(formula)
    }
}

/// Render `expression` as a numeric formula in `base_unit`.
///
/// Constants print through `f64`'s `Display`, which never uses exponent
/// notation, so the output stays inside the evaluator's character set.
pub fn formula<C>(
    expression: &DimensionExpression,
    converter: &C,
    base_unit: DimensionUnit,
) -> Result<String, EvaluationError>
where
    C: UnitConverter<DimensionUnit> + ?Sized,
{
    let mut out = String::new();
    for element in &expression.elements {
        match element {
            ExpressionElement::Operation(op) => out.push(op.symbol()),
            ExpressionElement::Alias(path) => return Err(EvaluationError::UnresolvedAlias(path.clone())),
            ExpressionElement::Value(constant) => {
                out.push_str(&converter.convert(*constant, base_unit).value.to_string())
            }
        }
    }
    Ok(out)
}

/// Evaluates whole dimension expressions into constants in `base_unit`.
#[derive(Debug, Clone)]
pub struct DimensionEvaluator<E> {
    pub evaluator: E,
    pub base_unit: DimensionUnit,
    pub converter: DimensionConverter,
}

impl<E: FormulaEvaluator> DimensionEvaluator<E> {
    pub fn new(evaluator: E) -> Self {
        Self {
            evaluator,
            base_unit: DimensionUnit::Px,
            converter: DimensionConverter::default(),
        }
    }

    pub fn with_base_unit(mut self, base_unit: DimensionUnit) -> Self {
        self.base_unit = base_unit;
        self
    }

    pub fn with_converter(mut self, converter: DimensionConverter) -> Self {
        self.converter = converter;
        self
    }

    pub fn evaluate(&self, expression: &DimensionExpression) -> Result<DimensionConstant, EvaluationError> {
        let formula = formula(expression, &self.converter, self.base_unit)?;
        log::trace!("Evaluating '{}' as '{}'", expression, formula);
        let value = self.evaluator.evaluate(&formula)?;
        Ok(DimensionConstant::new(value, self.base_unit))
    }
}

impl DimensionEvaluator<ArithmeticEvaluator> {
    pub fn arithmetic() -> Self {
        Self::new(ArithmeticEvaluator::default())
    }
}

impl DimensionEvaluator<ExpressionEngineEvaluator> {
    pub fn expression_engine() -> Result<Self, EvaluationError> {
        Ok(Self::new(ExpressionEngineEvaluator::new()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::ArithmeticOperation;
    use crate::path::TokenPath;

    fn expression(raw: &str) -> DimensionExpression {
        DimensionExpression::tokenize(raw).unwrap()
    }

    #[test]
    fn test_formula_converts_constants_to_base() {
        let converter = DimensionConverter::default();
        assert_eq!(
            formula(&expression("2rem + 5px"), &converter, DimensionUnit::Px).unwrap(),
            "32+5"
        );
        assert_eq!(
            formula(&expression("(8px*2)"), &converter, DimensionUnit::Rem).unwrap(),
            "(0.5*0.125)"
        );
    }

    #[test]
    fn test_unresolved_alias_is_fatal() {
        let expr = DimensionExpression::new(vec![
            ExpressionElement::Alias(TokenPath::new(["a"])),
            ArithmeticOperation::Multiply.into(),
            ExpressionElement::value(5.0),
        ]);
        let result = DimensionEvaluator::arithmetic().evaluate(&expr);
        assert_eq!(result, Err(EvaluationError::UnresolvedAlias(TokenPath::new(["a"]))));
    }

    #[test]
    fn test_arithmetic_backend() {
        let evaluator = DimensionEvaluator::arithmetic();
        assert_eq!(evaluator.evaluate(&expression("4px*5px")), Ok(DimensionConstant::px(20.0)));
        assert_eq!(evaluator.evaluate(&expression("2rem+5")), Ok(DimensionConstant::px(37.0)));
        assert_eq!(
            evaluator.evaluate(&expression("2.5rem + 1.5rem")),
            Ok(DimensionConstant::px(64.0))
        );
        assert_eq!(evaluator.evaluate(&expression("20rem/10")), Ok(DimensionConstant::px(32.0)));
    }

    #[test]
    fn test_rem_base_unit() {
        let evaluator = DimensionEvaluator::arithmetic().with_base_unit(DimensionUnit::Rem);
        assert_eq!(evaluator.evaluate(&expression("16px+1rem")), Ok(DimensionConstant::rem(2.0)));
    }

    #[test]
    fn test_engine_backend_matches_arithmetic() {
        let engine = DimensionEvaluator::expression_engine().unwrap();
        let arithmetic = DimensionEvaluator::arithmetic();
        for raw in ["2rem-1", "(4+4)*2px", "1rem/4"] {
            assert_eq!(
                engine.evaluate(&expression(raw)),
                arithmetic.evaluate(&expression(raw)),
                "{raw}"
            );
        }
    }
}
