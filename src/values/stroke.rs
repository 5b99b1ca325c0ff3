use super::composite::CompositeField;
use super::DimensionValue;
use crate::codec::{self, TokenCodec};
use crate::config::{DecodeConfig, EncodeConfig};
use crate::error::{DecodeError, EncodeError, ResolutionError};
use crate::resolver::{AliasResolver, CompositeToken, VisitedPaths};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineStyle {
    Solid,
    Dashed,
    Dotted,
    Double,
    Groove,
    Ridge,
    Outset,
    Inset,
}

impl LineStyle {
    pub const ALL: [LineStyle; 8] = [
        LineStyle::Solid,
        LineStyle::Dashed,
        LineStyle::Dotted,
        LineStyle::Double,
        LineStyle::Groove,
        LineStyle::Ridge,
        LineStyle::Outset,
        LineStyle::Inset,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LineStyle::Solid => "solid",
            LineStyle::Dashed => "dashed",
            LineStyle::Dotted => "dotted",
            LineStyle::Double => "double",
            LineStyle::Groove => "groove",
            LineStyle::Ridge => "ridge",
            LineStyle::Outset => "outset",
            LineStyle::Inset => "inset",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|style| style.as_str() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineCap {
    Round,
    Butt,
    Square,
}

impl LineCap {
    pub fn as_str(self) -> &'static str {
        match self {
            LineCap::Round => "round",
            LineCap::Butt => "butt",
            LineCap::Square => "square",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        [LineCap::Round, LineCap::Butt, LineCap::Square]
            .into_iter()
            .find(|cap| cap.as_str() == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashPattern {
    pub dash_array: Vec<CompositeField<DimensionValue>>,
    pub line_cap: LineCap,
}

/// A keyword line style, or an explicit dash pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum StrokeStyleValue {
    Line(LineStyle),
    Dash(DashPattern),
}

impl StrokeStyleValue {
    /// Transform the direct dimensions of a dash pattern.
    pub fn try_map_dimensions<E, F>(self, transform: &mut F) -> Result<Self, E>
    where
        F: FnMut(DimensionValue) -> Result<DimensionValue, E>,
    {
        match self {
            StrokeStyleValue::Line(_) => Ok(self),
            StrokeStyleValue::Dash(pattern) => Ok(StrokeStyleValue::Dash(DashPattern {
                dash_array: pattern
                    .dash_array
                    .into_iter()
                    .map(|field| field.try_map_direct(&mut *transform))
                    .collect::<Result<_, E>>()?,
                line_cap: pattern.line_cap,
            })),
        }
    }
}

impl TokenCodec for StrokeStyleValue {
    fn decode(value: &Value, config: &DecodeConfig) -> Result<Self, DecodeError> {
        if let Value::String(name) = value {
            return LineStyle::from_name(name)
                .map(StrokeStyleValue::Line)
                .ok_or_else(|| DecodeError::invalid("line style", value));
        }

        let map = codec::expect_object(value, "stroke style")?;
        let dash_array = codec::decode_field(map, "dashArray", config)?;
        let cap_value = codec::field(map, "lineCap")?;
        let line_cap = LineCap::from_name(codec::expect_str(cap_value, "line cap")?)
            .ok_or_else(|| DecodeError::invalid("line cap", cap_value))?;

        Ok(StrokeStyleValue::Dash(DashPattern { dash_array, line_cap }))
    }

    fn encode(&self, config: &EncodeConfig) -> Result<Value, EncodeError> {
        match self {
            StrokeStyleValue::Line(style) => Ok(Value::String(style.as_str().to_string())),
            StrokeStyleValue::Dash(pattern) => Ok(json!({
                "dashArray": pattern.dash_array.encode(config)?,
                "lineCap": pattern.line_cap.as_str(),
            })),
        }
    }
}

impl CompositeToken for StrokeStyleValue {
    fn resolve_aliases(
        &self,
        resolver: &AliasResolver<'_>,
        visited: &mut VisitedPaths,
    ) -> Result<Self, ResolutionError> {
        match self {
            StrokeStyleValue::Line(_) => Ok(self.clone()),
            StrokeStyleValue::Dash(pattern) => Ok(StrokeStyleValue::Dash(DashPattern {
                dash_array: pattern.dash_array.resolve_aliases(resolver, visited)?,
                line_cap: pattern.line_cap,
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_style() {
        let style = StrokeStyleValue::decode(&json!("dashed"), &DecodeConfig::default()).unwrap();
        assert_eq!(style, StrokeStyleValue::Line(LineStyle::Dashed));
        assert_eq!(style.encode(&EncodeConfig::default()).unwrap(), json!("dashed"));
        assert!(StrokeStyleValue::decode(&json!("wavy"), &DecodeConfig::default()).is_err());
    }

    #[test]
    fn test_dash_pattern() {
        let source = json!({"dashArray": ["{stroke.dash}", "2px"], "lineCap": "round"});
        let style = StrokeStyleValue::decode(&source, &DecodeConfig::default()).unwrap();
        let StrokeStyleValue::Dash(pattern) = &style else {
            panic!("expected dash pattern");
        };
        assert_eq!(pattern.dash_array.len(), 2);
        assert!(pattern.dash_array[0].is_alias());
        assert_eq!(pattern.line_cap, LineCap::Round);

        let encoded = style.encode(&EncodeConfig::default()).unwrap();
        assert_eq!(encoded["lineCap"], json!("round"));
        assert_eq!(encoded["dashArray"][0], json!("{stroke.dash}"));
    }

    #[test]
    fn test_bad_line_cap() {
        let source = json!({"dashArray": [], "lineCap": "pointy"});
        assert!(StrokeStyleValue::decode(&source, &DecodeConfig::default()).is_err());
    }
}
