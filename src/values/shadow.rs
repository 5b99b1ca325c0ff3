use super::composite::{self, CompositeField};
use super::{ColorValue, DimensionValue};
use crate::codec::{self, TokenCodec};
use crate::config::{DecodeConfig, EncodeConfig};
use crate::error::{DecodeError, EncodeError, ResolutionError};
use crate::resolver::{AliasResolver, CompositeToken, VisitedPaths};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct ShadowValue {
    pub color: CompositeField<ColorValue>,
    pub offset_x: CompositeField<DimensionValue>,
    pub offset_y: CompositeField<DimensionValue>,
    pub blur: CompositeField<DimensionValue>,
    pub spread: CompositeField<DimensionValue>,
    pub inset: Option<bool>,
}

impl TokenCodec for ShadowValue {
    fn decode(value: &Value, config: &DecodeConfig) -> Result<Self, DecodeError> {
        let map = codec::expect_object(value, "shadow object")?;
        let inset = map
            .get("inset")
            .map(|v| v.as_bool().ok_or_else(|| DecodeError::invalid("boolean", v)))
            .transpose()?;

        Ok(Self {
            color: composite::field(map, "color", config)?,
            offset_x: composite::field(map, "offsetX", config)?,
            offset_y: composite::field(map, "offsetY", config)?,
            blur: composite::field(map, "blur", config)?,
            spread: composite::field(map, "spread", config)?,
            inset,
        })
    }

    fn encode(&self, config: &EncodeConfig) -> Result<Value, EncodeError> {
        let mut map = Map::new();
        composite::put(&mut map, "color", &self.color, config)?;
        composite::put(&mut map, "offsetX", &self.offset_x, config)?;
        composite::put(&mut map, "offsetY", &self.offset_y, config)?;
        composite::put(&mut map, "blur", &self.blur, config)?;
        composite::put(&mut map, "spread", &self.spread, config)?;
        if let Some(inset) = self.inset {
            map.insert("inset".to_string(), Value::Bool(inset));
        }
        Ok(Value::Object(map))
    }
}

impl CompositeToken for ShadowValue {
    fn resolve_aliases(
        &self,
        resolver: &AliasResolver<'_>,
        visited: &mut VisitedPaths,
    ) -> Result<Self, ResolutionError> {
        Ok(Self {
            color: self.color.resolve_aliases(resolver, visited)?,
            offset_x: self.offset_x.resolve_aliases(resolver, visited)?,
            offset_y: self.offset_y.resolve_aliases(resolver, visited)?,
            blur: self.blur.resolve_aliases(resolver, visited)?,
            spread: self.spread.resolve_aliases(resolver, visited)?,
            inset: self.inset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::TokenCollection;
    use serde_json::json;

    fn layer(inset: Option<bool>) -> Value {
        let mut layer = json!({
            "color": "#00000080",
            "offsetX": "0px",
            "offsetY": "2px",
            "blur": "4px",
            "spread": "{space.none}"
        });
        if let Some(inset) = inset {
            layer["inset"] = json!(inset);
        }
        layer
    }

    #[test]
    fn test_single_shadow_encodes_unwrapped() {
        let config = DecodeConfig::default();
        let shadows = TokenCollection::<ShadowValue>::decode(&layer(None), &config).unwrap();
        assert_eq!(shadows.values.len(), 1);
        assert!(shadows.values[0].spread.is_alias());

        let encoded = shadows.encode(&EncodeConfig::default()).unwrap();
        assert!(encoded.is_object());
        assert!(encoded.get("inset").is_none());
    }

    #[test]
    fn test_layered_shadows() {
        let source = json!([layer(Some(true)), layer(None)]);
        let shadows = TokenCollection::<ShadowValue>::decode(&source, &DecodeConfig::default()).unwrap();
        assert_eq!(shadows.values[0].inset, Some(true));
        assert!(shadows.encode(&EncodeConfig::default()).unwrap().is_array());
    }
}
