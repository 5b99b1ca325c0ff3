//! Font family and font weight values

use crate::codec::{self, TokenCodec};
use crate::config::{DecodeConfig, EncodeConfig};
use crate::error::{DecodeError, EncodeError};
use serde_json::Value;

/// One family name, or a fallback stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFamilyValue {
    pub names: Vec<String>,
}

impl FontFamilyValue {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<&str> for FontFamilyValue {
    fn from(name: &str) -> Self {
        Self::new([name])
    }
}

impl TokenCodec for FontFamilyValue {
    fn decode(value: &Value, _config: &DecodeConfig) -> Result<Self, DecodeError> {
        match value {
            Value::String(name) => Ok(Self::new([name.as_str()])),
            Value::Array(items) => items
                .iter()
                .map(|item| codec::expect_str(item, "font family name").map(str::to_string))
                .collect::<Result<Vec<_>, _>>()
                .map(|names| Self { names }),
            _ => Err(DecodeError::invalid("font family", value)),
        }
    }

    fn encode(&self, _config: &EncodeConfig) -> Result<Value, EncodeError> {
        Ok(match self.names.as_slice() {
            [single] => Value::String(single.clone()),
            names => Value::Array(names.iter().cloned().map(Value::String).collect()),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontWeightAlias {
    Thin,
    Hairline,
    ExtraLight,
    UltraLight,
    Light,
    Normal,
    Regular,
    Book,
    Medium,
    SemiBold,
    DemiBold,
    Bold,
    ExtraBold,
    UltraBold,
    Black,
    Heavy,
    ExtraBlack,
    UltraBlack,
}

impl FontWeightAlias {
    pub const ALL: [FontWeightAlias; 18] = [
        FontWeightAlias::Thin,
        FontWeightAlias::Hairline,
        FontWeightAlias::ExtraLight,
        FontWeightAlias::UltraLight,
        FontWeightAlias::Light,
        FontWeightAlias::Normal,
        FontWeightAlias::Regular,
        FontWeightAlias::Book,
        FontWeightAlias::Medium,
        FontWeightAlias::SemiBold,
        FontWeightAlias::DemiBold,
        FontWeightAlias::Bold,
        FontWeightAlias::ExtraBold,
        FontWeightAlias::UltraBold,
        FontWeightAlias::Black,
        FontWeightAlias::Heavy,
        FontWeightAlias::ExtraBlack,
        FontWeightAlias::UltraBlack,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FontWeightAlias::Thin => "thin",
            FontWeightAlias::Hairline => "hairline",
            FontWeightAlias::ExtraLight => "extra-light",
            FontWeightAlias::UltraLight => "ultra-light",
            FontWeightAlias::Light => "light",
            FontWeightAlias::Normal => "normal",
            FontWeightAlias::Regular => "regular",
            FontWeightAlias::Book => "book",
            FontWeightAlias::Medium => "medium",
            FontWeightAlias::SemiBold => "semi-bold",
            FontWeightAlias::DemiBold => "demi-bold",
            FontWeightAlias::Bold => "bold",
            FontWeightAlias::ExtraBold => "extra-bold",
            FontWeightAlias::UltraBold => "ultra-bold",
            FontWeightAlias::Black => "black",
            FontWeightAlias::Heavy => "heavy",
            FontWeightAlias::ExtraBlack => "extra-black",
            FontWeightAlias::UltraBlack => "ultra-black",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|alias| alias.name() == name)
    }

    pub fn weight(self) -> u16 {
        use FontWeightAlias::*;
        match self {
            Thin | Hairline => 100,
            ExtraLight | UltraLight => 200,
            Light => 300,
            Normal | Regular | Book => 400,
            Medium => 500,
            SemiBold | DemiBold => 600,
            Bold => 700,
            ExtraBold | UltraBold => 800,
            Black | Heavy => 900,
            ExtraBlack | UltraBlack => 1000,
        }
    }
}

/// Numeric weight in `1..=1000`, remembering the named spelling if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontWeightValue {
    weight: u16,
    alias: Option<FontWeightAlias>,
}

impl FontWeightValue {
    pub const RANGE: std::ops::RangeInclusive<u64> = 1..=1000;

    pub fn new(weight: u64) -> Option<Self> {
        Self::RANGE.contains(&weight).then(|| Self {
            weight: weight as u16,
            alias: None,
        })
    }

    pub fn weight(&self) -> u16 {
        self.weight
    }

    pub fn alias(&self) -> Option<FontWeightAlias> {
        self.alias
    }
}

impl From<FontWeightAlias> for FontWeightValue {
    fn from(alias: FontWeightAlias) -> Self {
        Self {
            weight: alias.weight(),
            alias: Some(alias),
        }
    }
}

impl TokenCodec for FontWeightValue {
    fn decode(value: &Value, _config: &DecodeConfig) -> Result<Self, DecodeError> {
        if let Some(weight) = value.as_u64() {
            return Self::new(weight).ok_or(DecodeError::InvalidFontWeight(weight));
        }
        let name = codec::expect_str(value, "font weight")?;
        FontWeightAlias::from_name(name)
            .map(Self::from)
            .ok_or_else(|| DecodeError::InvalidFontWeightAlias(name.to_string()))
    }

    fn encode(&self, _config: &EncodeConfig) -> Result<Value, EncodeError> {
        Ok(match self.alias {
            Some(alias) => Value::String(alias.name().to_string()),
            None => Value::from(self.weight),
        })
    }
}
