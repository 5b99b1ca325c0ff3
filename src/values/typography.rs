use super::composite::{self, CompositeField};
use super::{DimensionValue, FontFamilyValue, FontWeightValue, NumberValue};
use crate::codec::{self, TokenCodec};
use crate::config::{DecodeConfig, EncodeConfig};
use crate::error::{DecodeError, EncodeError, ResolutionError};
use crate::resolver::{AliasResolver, CompositeToken, VisitedPaths};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct TypographyValue {
    pub font_family: CompositeField<FontFamilyValue>,
    pub font_size: CompositeField<DimensionValue>,
    pub font_weight: CompositeField<FontWeightValue>,
    pub letter_spacing: CompositeField<DimensionValue>,
    pub line_height: CompositeField<NumberValue>,
}

impl TokenCodec for TypographyValue {
    fn decode(value: &Value, config: &DecodeConfig) -> Result<Self, DecodeError> {
        let map = codec::expect_object(value, "typography object")?;
        Ok(Self {
            font_family: composite::field(map, "fontFamily", config)?,
            font_size: composite::field(map, "fontSize", config)?,
            font_weight: composite::field(map, "fontWeight", config)?,
            letter_spacing: composite::field(map, "letterSpacing", config)?,
            line_height: composite::field(map, "lineHeight", config)?,
        })
    }

    fn encode(&self, config: &EncodeConfig) -> Result<Value, EncodeError> {
        let mut map = Map::new();
        composite::put(&mut map, "fontFamily", &self.font_family, config)?;
        composite::put(&mut map, "fontSize", &self.font_size, config)?;
        composite::put(&mut map, "fontWeight", &self.font_weight, config)?;
        composite::put(&mut map, "letterSpacing", &self.letter_spacing, config)?;
        composite::put(&mut map, "lineHeight", &self.line_height, config)?;
        Ok(Value::Object(map))
    }
}

impl CompositeToken for TypographyValue {
    fn resolve_aliases(
        &self,
        resolver: &AliasResolver<'_>,
        visited: &mut VisitedPaths,
    ) -> Result<Self, ResolutionError> {
        Ok(Self {
            font_family: self.font_family.resolve_aliases(resolver, visited)?,
            font_size: self.font_size.resolve_aliases(resolver, visited)?,
            font_weight: self.font_weight.resolve_aliases(resolver, visited)?,
            letter_spacing: self.letter_spacing.resolve_aliases(resolver, visited)?,
            line_height: self.line_height.resolve_aliases(resolver, visited)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::DimensionConstant;
    use crate::path::TokenPath;
    use serde_json::json;

    #[test]
    fn test_mixed_direct_and_alias_fields() {
        let source = json!({
            "fontFamily": ["Inter", "sans-serif"],
            "fontSize": "{font.size.body}",
            "fontWeight": "bold",
            "letterSpacing": "0.5px",
            "lineHeight": 1.4
        });
        let typography = TypographyValue::decode(&source, &DecodeConfig::default()).unwrap();
        assert_eq!(
            typography.font_size,
            CompositeField::Alias(TokenPath::new(["font", "size", "body"]))
        );
        assert_eq!(
            typography.letter_spacing,
            CompositeField::Direct(DimensionValue::from(DimensionConstant::px(0.5)))
        );
        assert_eq!(typography.line_height, CompositeField::Direct(1.4));
    }

    #[test]
    fn test_missing_field() {
        let source = json!({"fontFamily": "Inter", "fontSize": 16});
        assert_eq!(
            TypographyValue::decode(&source, &DecodeConfig::default()),
            Err(DecodeError::MissingField("fontWeight"))
        );
    }
}
