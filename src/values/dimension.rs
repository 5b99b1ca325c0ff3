use crate::codec::TokenCodec;
use crate::config::{DecodeConfig, EncodeConfig};
use crate::error::{DecodeError, EncodeError, ResolutionError};
use crate::expression::DimensionExpression;
use crate::measurement::{DimensionConstant, DimensionUnit};
use crate::resolver::{AliasResolver, CompositeToken, VisitedPaths};
use serde_json::Value;

/// A dimension: a constant such as `16px`, or a formula still to evaluate.
#[derive(Debug, Clone, PartialEq)]
pub enum DimensionValue {
    Constant(DimensionConstant),
    Expression(DimensionExpression),
}

impl DimensionValue {
    pub fn new(value: f64, unit: DimensionUnit) -> Self {
        DimensionValue::Constant(DimensionConstant::new(value, unit))
    }

    pub fn as_constant(&self) -> Option<&DimensionConstant> {
        match self {
            DimensionValue::Constant(constant) => Some(constant),
            DimensionValue::Expression(_) => None,
        }
    }
}

impl From<DimensionConstant> for DimensionValue {
    fn from(constant: DimensionConstant) -> Self {
        DimensionValue::Constant(constant)
    }
}

impl TokenCodec for DimensionValue {
    fn decode(value: &Value, config: &DecodeConfig) -> Result<Self, DecodeError> {
        match DimensionConstant::decode(value, config) {
            Ok(constant) => Ok(DimensionValue::Constant(constant)),
            Err(constant_error) => match value {
                Value::String(_) => DimensionExpression::decode(value, config).map(DimensionValue::Expression),
                _ => Err(constant_error),
            },
        }
    }

    fn encode(&self, config: &EncodeConfig) -> Result<Value, EncodeError> {
        match self {
            DimensionValue::Constant(constant) => constant.encode(config),
            DimensionValue::Expression(expression) => expression.encode(config),
        }
    }
}

impl CompositeToken for DimensionValue {
    fn resolve_aliases(
        &self,
        resolver: &AliasResolver<'_>,
        visited: &mut VisitedPaths,
    ) -> Result<Self, ResolutionError> {
        match self {
            DimensionValue::Constant(_) => Ok(self.clone()),
            DimensionValue::Expression(expression) => resolver
                .resolve_expression(expression, visited)
                .map(DimensionValue::Expression),
        }
    }
}
