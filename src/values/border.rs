use super::composite::{self, CompositeField};
use super::{ColorValue, DimensionValue, StrokeStyleValue};
use crate::codec::{self, TokenCodec};
use crate::config::{DecodeConfig, EncodeConfig};
use crate::error::{DecodeError, EncodeError, ResolutionError};
use crate::resolver::{AliasResolver, CompositeToken, VisitedPaths};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct BorderValue {
    pub color: CompositeField<ColorValue>,
    pub width: CompositeField<DimensionValue>,
    pub style: CompositeField<StrokeStyleValue>,
}

impl TokenCodec for BorderValue {
    fn decode(value: &Value, config: &DecodeConfig) -> Result<Self, DecodeError> {
        let map = codec::expect_object(value, "border object")?;
        Ok(Self {
            color: composite::field(map, "color", config)?,
            width: composite::field(map, "width", config)?,
            style: composite::field(map, "style", config)?,
        })
    }

    fn encode(&self, config: &EncodeConfig) -> Result<Value, EncodeError> {
        let mut map = Map::new();
        composite::put(&mut map, "color", &self.color, config)?;
        composite::put(&mut map, "width", &self.width, config)?;
        composite::put(&mut map, "style", &self.style, config)?;
        Ok(Value::Object(map))
    }
}

impl CompositeToken for BorderValue {
    fn resolve_aliases(
        &self,
        resolver: &AliasResolver<'_>,
        visited: &mut VisitedPaths,
    ) -> Result<Self, ResolutionError> {
        Ok(Self {
            color: self.color.resolve_aliases(resolver, visited)?,
            width: self.width.resolve_aliases(resolver, visited)?,
            style: self.style.resolve_aliases(resolver, visited)?,
        })
    }
}
