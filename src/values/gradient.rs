use super::composite::{self, CompositeField};
use super::{ColorValue, NumberValue};
use crate::codec::{self, TokenCodec};
use crate::config::{DecodeConfig, EncodeConfig};
use crate::error::{DecodeError, EncodeError, ResolutionError};
use crate::resolver::{AliasResolver, CompositeToken, VisitedPaths};
use serde_json::{Map, Value};

/// One color stop; `position` runs from 0 to 1 along the gradient.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientStop {
    pub color: CompositeField<ColorValue>,
    pub position: CompositeField<NumberValue>,
}

pub type GradientValue = Vec<GradientStop>;

impl TokenCodec for GradientStop {
    fn decode(value: &Value, config: &DecodeConfig) -> Result<Self, DecodeError> {
        let map = codec::expect_object(value, "gradient stop")?;
        Ok(Self {
            color: composite::field(map, "color", config)?,
            position: composite::field(map, "position", config)?,
        })
    }

    fn encode(&self, config: &EncodeConfig) -> Result<Value, EncodeError> {
        let mut map = Map::new();
        composite::put(&mut map, "color", &self.color, config)?;
        composite::put(&mut map, "position", &self.position, config)?;
        Ok(Value::Object(map))
    }
}

impl CompositeToken for GradientStop {
    fn resolve_aliases(
        &self,
        resolver: &AliasResolver<'_>,
        visited: &mut VisitedPaths,
    ) -> Result<Self, ResolutionError> {
        Ok(Self {
            color: self.color.resolve_aliases(resolver, visited)?,
            position: self.position.resolve_aliases(resolver, visited)?,
        })
    }
}
