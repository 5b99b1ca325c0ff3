//! Color values and hex conversion

use crate::codec::{self, TokenCodec};
use crate::config::{ColorEncoding, DecodeConfig, EncodeConfig};
use crate::error::{DecodeError, EncodeError};
use serde_json::{json, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    Srgb,
    SrgbLinear,
    DisplayP3,
    A98Rgb,
    ProphotoRgb,
    Rec2020,
    Xyz,
    XyzD50,
    XyzD65,
    Lab,
    Lch,
    Oklab,
    Oklch,
    Hsl,
    Hwb,
}

impl ColorSpace {
    pub const ALL: [ColorSpace; 15] = [
        ColorSpace::Srgb,
        ColorSpace::SrgbLinear,
        ColorSpace::DisplayP3,
        ColorSpace::A98Rgb,
        ColorSpace::ProphotoRgb,
        ColorSpace::Rec2020,
        ColorSpace::Xyz,
        ColorSpace::XyzD50,
        ColorSpace::XyzD65,
        ColorSpace::Lab,
        ColorSpace::Lch,
        ColorSpace::Oklab,
        ColorSpace::Oklch,
        ColorSpace::Hsl,
        ColorSpace::Hwb,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ColorSpace::Srgb => "srgb",
            ColorSpace::SrgbLinear => "srgb-linear",
            ColorSpace::DisplayP3 => "display-p3",
            ColorSpace::A98Rgb => "a98-rgb",
            ColorSpace::ProphotoRgb => "prophoto-rgb",
            ColorSpace::Rec2020 => "rec2020",
            ColorSpace::Xyz => "xyz",
            ColorSpace::XyzD50 => "xyz-d50",
            ColorSpace::XyzD65 => "xyz-d65",
            ColorSpace::Lab => "lab",
            ColorSpace::Lch => "lch",
            ColorSpace::Oklab => "oklab",
            ColorSpace::Oklch => "oklch",
            ColorSpace::Hsl => "hsl",
            ColorSpace::Hwb => "hwb",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|space| space.as_str() == name)
    }
}

impl fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A channel value, or the `"none"` keyword for a missing channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorComponent {
    None,
    Value(f64),
}

impl ColorComponent {
    const NONE_KEYWORD: &'static str = "none";
}

impl From<f64> for ColorComponent {
    fn from(value: f64) -> Self {
        ColorComponent::Value(value)
    }
}

impl TokenCodec for ColorComponent {
    fn decode(value: &Value, _config: &DecodeConfig) -> Result<Self, DecodeError> {
        match value {
            Value::Number(n) => n
                .as_f64()
                .map(ColorComponent::Value)
                .ok_or_else(|| DecodeError::invalid("color component", value)),
            Value::String(s) if s == Self::NONE_KEYWORD => Ok(ColorComponent::None),
            _ => Err(DecodeError::invalid("color component", value)),
        }
    }

    fn encode(&self, _config: &EncodeConfig) -> Result<Value, EncodeError> {
        match self {
            ColorComponent::None => Ok(Value::String(Self::NONE_KEYWORD.to_string())),
            ColorComponent::Value(v) => codec::number(*v),
        }
    }
}

/// Channel order of an eight-digit hex string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HexFormat {
    #[default]
    Rgba,
    Argb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColorValue {
    pub color_space: ColorSpace,
    pub components: Vec<ColorComponent>,
    pub alpha: f64,
    /// Hex spelling the color was read from, kept for round-tripping.
    pub hex: Option<String>,
}

impl ColorValue {
    pub fn new(color_space: ColorSpace, components: Vec<ColorComponent>, alpha: Option<f64>) -> Self {
        Self {
            color_space,
            components,
            alpha: alpha.unwrap_or(1.0),
            hex: None,
        }
    }

    pub fn srgb(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self::new(
            ColorSpace::Srgb,
            vec![red.into(), green.into(), blue.into()],
            Some(alpha),
        )
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` into an sRGB color.
    pub fn from_hex(raw: &str) -> Result<Self, DecodeError> {
        let trimmed = raw.trim();
        let digits = trimmed
            .strip_prefix('#')
            .ok_or_else(|| DecodeError::InvalidHex(raw.to_string()))?;
        if digits.len() != 6 && digits.len() != 8 {
            return Err(DecodeError::InvalidHex(raw.to_string()));
        }

        let bytes = hex::decode(digits).map_err(|_| DecodeError::InvalidHex(raw.to_string()))?;
        let channel = |i: usize| bytes.get(i).map(|b| f64::from(*b) / 255.0);

        let (red, green, blue) = match (channel(0), channel(1), channel(2)) {
            (Some(r), Some(g), Some(b)) => (r, g, b),
            _ => return Err(DecodeError::InvalidHex(raw.to_string())),
        };

        Ok(Self {
            hex: Some(format!("#{}", digits)),
            ..Self::srgb(red, green, blue, channel(3).unwrap_or(1.0))
        })
    }

    /// Render as hex. With `skip_opaque_alpha` a fully opaque color drops
    /// its alpha pair.
    pub fn to_hex(&self, format: HexFormat, skip_opaque_alpha: bool) -> Result<String, EncodeError> {
        if self.color_space != ColorSpace::Srgb {
            return Err(EncodeError::UnsupportedColorSpace(self.color_space));
        }

        let channel = |component: Option<&ColorComponent>| match component {
            Some(ColorComponent::Value(v)) => Ok(to_byte(*v)),
            _ => Err(EncodeError::InvalidComponents),
        };
        let red = channel(self.components.first())?;
        let green = channel(self.components.get(1))?;
        let blue = channel(self.components.get(2))?;
        let alpha = to_byte(self.alpha);

        let bytes = match (alpha, format) {
            (255, _) if skip_opaque_alpha => vec![red, green, blue],
            (_, HexFormat::Rgba) => vec![red, green, blue, alpha],
            (_, HexFormat::Argb) => vec![alpha, red, green, blue],
        };
        Ok(format!("#{}", hex::encode_upper(bytes)))
    }
}

fn to_byte(channel: f64) -> u8 {
    (channel * 255.0).round().clamp(0.0, 255.0) as u8
}

impl TokenCodec for ColorValue {
    fn decode(value: &Value, config: &DecodeConfig) -> Result<Self, DecodeError> {
        match value {
            Value::String(raw) => Self::from_hex(raw),
            Value::Object(map) => {
                let name = codec::expect_str(codec::field(map, "colorSpace")?, "color space")?;
                let color_space = ColorSpace::from_name(name)
                    .ok_or_else(|| DecodeError::invalid("color space", &Value::String(name.to_string())))?;
                let components = codec::expect_array(codec::field(map, "components")?, "components")?
                    .iter()
                    .map(|c| ColorComponent::decode(c, config))
                    .collect::<Result<Vec<_>, _>>()?;
                let alpha = map
                    .get("alpha")
                    .map(|a| codec::expect_f64(a, "alpha"))
                    .transpose()?;
                let hex = map
                    .get("hex")
                    .map(|h| codec::expect_str(h, "hex string").map(str::to_string))
                    .transpose()?;

                Ok(Self {
                    hex,
                    ..Self::new(color_space, components, alpha)
                })
            }
            _ => Err(DecodeError::invalid("color", value)),
        }
    }

    fn encode(&self, config: &EncodeConfig) -> Result<Value, EncodeError> {
        match config.color {
            ColorEncoding::Hex => Ok(Value::String(self.to_hex(HexFormat::Rgba, true)?)),
            ColorEncoding::Default => {
                let components = self
                    .components
                    .iter()
                    .map(|c| c.encode(config))
                    .collect::<Result<Vec<_>, _>>()?;
                let mut object = json!({
                    "colorSpace": self.color_space.as_str(),
                    "components": components,
                    "alpha": codec::number(self.alpha)?,
                });
                if let (Some(hex), Some(map)) = (&self.hex, object.as_object_mut()) {
                    map.insert("hex".to_string(), Value::String(hex.clone()));
                }
                Ok(object)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_decoding() {
        let color = ColorValue::from_hex("#FF000080").unwrap();
        assert_eq!(color.color_space, ColorSpace::Srgb);
        assert_eq!(color.components[0], ColorComponent::Value(1.0));
        assert_eq!(color.components[1], ColorComponent::Value(0.0));
        assert!((color.alpha - 128.0 / 255.0).abs() < 1e-9);
        assert_eq!(color.hex.as_deref(), Some("#FF000080"));

        let opaque = ColorValue::from_hex("#00ff00").unwrap();
        assert_eq!(opaque.alpha, 1.0);
        assert_eq!(opaque.hex.as_deref(), Some("#00ff00"));
    }

    #[test]
    fn test_invalid_hex() {
        for raw in ["FF0000", "#FF00", "#GG0000", "#FF00000"] {
            assert!(matches!(ColorValue::from_hex(raw), Err(DecodeError::InvalidHex(_))), "{raw}");
        }
    }

    #[test]
    fn test_hex_encoding_formats() {
        let color = ColorValue::srgb(1.0, 0.5, 0.0, 0.5);
        assert_eq!(color.to_hex(HexFormat::Rgba, true).unwrap(), "#FF800080");
        assert_eq!(color.to_hex(HexFormat::Argb, false).unwrap(), "#80FF8000");

        let opaque = ColorValue::srgb(0.0, 0.0, 1.0, 1.0);
        assert_eq!(opaque.to_hex(HexFormat::Rgba, true).unwrap(), "#0000FF");
        assert_eq!(opaque.to_hex(HexFormat::Rgba, false).unwrap(), "#0000FFFF");
    }

    #[test]
    fn test_hex_encoding_errors() {
        let p3 = ColorValue::new(ColorSpace::DisplayP3, vec![1.0.into(), 0.0.into(), 0.0.into()], None);
        assert_eq!(
            p3.to_hex(HexFormat::Rgba, true),
            Err(EncodeError::UnsupportedColorSpace(ColorSpace::DisplayP3))
        );

        let missing = ColorValue::new(ColorSpace::Srgb, vec![ColorComponent::None, 0.0.into(), 0.0.into()], None);
        assert_eq!(missing.to_hex(HexFormat::Rgba, true), Err(EncodeError::InvalidComponents));
    }

    #[test]
    fn test_structured_round_trip() {
        let source = json!({
            "colorSpace": "oklch",
            "components": [0.7, 0.1, "none"],
            "alpha": 0.9
        });
        let config = DecodeConfig::default();
        let color = ColorValue::decode(&source, &config).unwrap();
        assert_eq!(color.components[2], ColorComponent::None);
        assert_eq!(color.encode(&EncodeConfig::default()).unwrap(), source);
    }

    #[test]
    fn test_default_alpha_and_hex_passthrough() {
        let source = json!({"colorSpace": "srgb", "components": [1, 1, 1], "hex": "#ffffff"});
        let color = ColorValue::decode(&source, &DecodeConfig::default()).unwrap();
        assert_eq!(color.alpha, 1.0);
        let encoded = color.encode(&EncodeConfig::default()).unwrap();
        assert_eq!(encoded["hex"], json!("#ffffff"));
        assert_eq!(encoded["alpha"], json!(1.0));
    }

    #[test]
    fn test_hex_config_encoding() {
        let config = EncodeConfig::default().with_color(ColorEncoding::Hex);
        let color = ColorValue::from_hex("#336699").unwrap();
        assert_eq!(color.encode(&config).unwrap(), json!("#336699"));
    }

    #[test]
    fn test_unknown_color_space_rejected() {
        let source = json!({"colorSpace": "cmyk", "components": [0, 0, 0]});
        assert!(ColorValue::decode(&source, &DecodeConfig::default()).is_err());
    }
}
