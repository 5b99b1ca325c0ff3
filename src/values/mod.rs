//! Token value shapes
//!
//! [`TokenValue`] is the closed union over the fourteen value types. Decoding
//! is driven by the effective `$type`; encoding re-derives that tag from the
//! variant.

pub mod border;
pub mod color;
pub mod composite;
pub mod cubic_bezier;
pub mod dimension;
pub mod file;
pub mod font;
pub mod gradient;
pub mod shadow;
pub mod stroke;
pub mod transition;
pub mod typography;

pub use border::BorderValue;
pub use color::{ColorComponent, ColorSpace, ColorValue, HexFormat};
pub use composite::{CompositeField, TokenCollection};
pub use cubic_bezier::CubicBezierValue;
pub use dimension::DimensionValue;
pub use file::FileValue;
pub use font::{FontFamilyValue, FontWeightAlias, FontWeightValue};
pub use gradient::{GradientStop, GradientValue};
pub use shadow::ShadowValue;
pub use stroke::{DashPattern, LineCap, LineStyle, StrokeStyleValue};
pub use transition::TransitionValue;
pub use typography::TypographyValue;

pub use crate::measurement::DurationValue;

use crate::codec::TokenCodec;
use crate::config::{DecodeConfig, EncodeConfig};
use crate::error::{DecodeError, EncodeError, ResolutionError};
use crate::resolver::{AliasResolver, CompositeToken, VisitedPaths};
use crate::types::TokenType;
use serde_json::Value;
use std::convert::Infallible;

pub type NumberValue = f64;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    Color(ColorValue),
    Dimension(DimensionValue),
    File(FileValue),
    FontFamily(FontFamilyValue),
    FontWeight(FontWeightValue),
    Number(NumberValue),
    Duration(DurationValue),
    CubicBezier(CubicBezierValue),
    Typography(TypographyValue),
    Gradient(GradientValue),
    Shadow(TokenCollection<ShadowValue>),
    StrokeStyle(StrokeStyleValue),
    Border(BorderValue),
    Transition(TransitionValue),
}

impl TokenValue {
    /// Decode `payload` as the shape named by `token_type`.
    pub fn decode(token_type: &TokenType, payload: &Value, config: &DecodeConfig) -> Result<Self, DecodeError> {
        let value = match token_type.as_str() {
            TokenType::COLOR => TokenValue::Color(ColorValue::decode(payload, config)?),
            TokenType::DIMENSION => TokenValue::Dimension(DimensionValue::decode(payload, config)?),
            TokenType::FILE => TokenValue::File(FileValue::decode(payload, config)?),
            TokenType::FONT_FAMILY => TokenValue::FontFamily(FontFamilyValue::decode(payload, config)?),
            TokenType::FONT_WEIGHT => TokenValue::FontWeight(FontWeightValue::decode(payload, config)?),
            TokenType::NUMBER => TokenValue::Number(NumberValue::decode(payload, config)?),
            TokenType::DURATION => TokenValue::Duration(DurationValue::decode(payload, config)?),
            TokenType::CUBIC_BEZIER => TokenValue::CubicBezier(CubicBezierValue::decode(payload, config)?),
            TokenType::TYPOGRAPHY => TokenValue::Typography(TypographyValue::decode(payload, config)?),
            TokenType::GRADIENT => TokenValue::Gradient(GradientValue::decode(payload, config)?),
            TokenType::SHADOW => TokenValue::Shadow(TokenCollection::decode(payload, config)?),
            TokenType::STROKE_STYLE => TokenValue::StrokeStyle(StrokeStyleValue::decode(payload, config)?),
            TokenType::BORDER => TokenValue::Border(BorderValue::decode(payload, config)?),
            TokenType::TRANSITION => TokenValue::Transition(TransitionValue::decode(payload, config)?),
            other => return Err(DecodeError::UnsupportedType(other.to_string())),
        };
        Ok(value)
    }

    pub fn token_type(&self) -> TokenType {
        let tag = match self {
            TokenValue::Color(_) => TokenType::COLOR,
            TokenValue::Dimension(_) => TokenType::DIMENSION,
            TokenValue::File(_) => TokenType::FILE,
            TokenValue::FontFamily(_) => TokenType::FONT_FAMILY,
            TokenValue::FontWeight(_) => TokenType::FONT_WEIGHT,
            TokenValue::Number(_) => TokenType::NUMBER,
            TokenValue::Duration(_) => TokenType::DURATION,
            TokenValue::CubicBezier(_) => TokenType::CUBIC_BEZIER,
            TokenValue::Typography(_) => TokenType::TYPOGRAPHY,
            TokenValue::Gradient(_) => TokenType::GRADIENT,
            TokenValue::Shadow(_) => TokenType::SHADOW,
            TokenValue::StrokeStyle(_) => TokenType::STROKE_STYLE,
            TokenValue::Border(_) => TokenType::BORDER,
            TokenValue::Transition(_) => TokenType::TRANSITION,
        };
        TokenType::new(tag)
    }

    /// The `$value` payload alone.
    pub fn encode_payload(&self, config: &EncodeConfig) -> Result<Value, EncodeError> {
        match self {
            TokenValue::Color(v) => v.encode(config),
            TokenValue::Dimension(v) => v.encode(config),
            TokenValue::File(v) => v.encode(config),
            TokenValue::FontFamily(v) => v.encode(config),
            TokenValue::FontWeight(v) => v.encode(config),
            TokenValue::Number(v) => v.encode(config),
            TokenValue::Duration(v) => v.encode(config),
            TokenValue::CubicBezier(v) => v.encode(config),
            TokenValue::Typography(v) => v.encode(config),
            TokenValue::Gradient(v) => v.encode(config),
            TokenValue::Shadow(v) => v.encode(config),
            TokenValue::StrokeStyle(v) => v.encode(config),
            TokenValue::Border(v) => v.encode(config),
            TokenValue::Transition(v) => v.encode(config),
        }
    }
}

impl TokenValue {
    /// Apply `transform` to every dimension this value holds directly,
    /// composite fields included. Aliased fields are left alone.
    pub fn try_map_dimensions<E, F>(self, transform: &mut F) -> Result<Self, E>
    where
        F: FnMut(DimensionValue) -> Result<DimensionValue, E>,
    {
        Ok(match self {
            TokenValue::Dimension(dimension) => TokenValue::Dimension(transform(dimension)?),
            TokenValue::Typography(mut typography) => {
                typography.font_size = typography.font_size.try_map_direct(&mut *transform)?;
                typography.letter_spacing = typography.letter_spacing.try_map_direct(&mut *transform)?;
                TokenValue::Typography(typography)
            }
            TokenValue::Shadow(layers) => TokenValue::Shadow(TokenCollection::new(
                layers
                    .values
                    .into_iter()
                    .map(|mut layer| {
                        layer.offset_x = layer.offset_x.try_map_direct(&mut *transform)?;
                        layer.offset_y = layer.offset_y.try_map_direct(&mut *transform)?;
                        layer.blur = layer.blur.try_map_direct(&mut *transform)?;
                        layer.spread = layer.spread.try_map_direct(&mut *transform)?;
                        Ok(layer)
                    })
                    .collect::<Result<_, E>>()?,
            )),
            TokenValue::StrokeStyle(style) => TokenValue::StrokeStyle(style.try_map_dimensions(transform)?),
            TokenValue::Border(mut border) => {
                border.width = border.width.try_map_direct(&mut *transform)?;
                border.style = border.style.try_map_direct(|style| style.try_map_dimensions(transform))?;
                TokenValue::Border(border)
            }
            other => other,
        })
    }

    pub fn map_dimensions(self, mut transform: impl FnMut(DimensionValue) -> DimensionValue) -> Self {
        match self.try_map_dimensions(&mut |dimension| Ok::<_, Infallible>(transform(dimension))) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Apply `transform` to every direct duration, transitions included.
    pub fn map_durations(self, mut transform: impl FnMut(DurationValue) -> DurationValue) -> Self {
        match self {
            TokenValue::Duration(duration) => TokenValue::Duration(transform(duration)),
            TokenValue::Transition(mut transition) => {
                transition.duration = transition.duration.map_direct(&mut transform);
                transition.delay = transition.delay.map_direct(&mut transform);
                TokenValue::Transition(transition)
            }
            other => other,
        }
    }
}

impl CompositeToken for TokenValue {
    fn resolve_aliases(
        &self,
        resolver: &AliasResolver<'_>,
        visited: &mut VisitedPaths,
    ) -> Result<Self, ResolutionError> {
        Ok(match self {
            TokenValue::Dimension(v) => TokenValue::Dimension(v.resolve_aliases(resolver, visited)?),
            TokenValue::Typography(v) => TokenValue::Typography(v.resolve_aliases(resolver, visited)?),
            TokenValue::Gradient(v) => TokenValue::Gradient(v.resolve_aliases(resolver, visited)?),
            TokenValue::Shadow(v) => TokenValue::Shadow(v.resolve_aliases(resolver, visited)?),
            TokenValue::StrokeStyle(v) => TokenValue::StrokeStyle(v.resolve_aliases(resolver, visited)?),
            TokenValue::Border(v) => TokenValue::Border(v.resolve_aliases(resolver, visited)?),
            TokenValue::Transition(v) => TokenValue::Transition(v.resolve_aliases(resolver, visited)?),
            TokenValue::Color(_)
            | TokenValue::File(_)
            | TokenValue::FontFamily(_)
            | TokenValue::FontWeight(_)
            | TokenValue::Number(_)
            | TokenValue::Duration(_)
            | TokenValue::CubicBezier(_) => self.clone(),
        })
    }
}

/// Extract a typed payload from a resolved value, `None` on a shape mismatch.
pub trait FromTokenValue: Sized {
    fn from_token_value(value: TokenValue) -> Option<Self>;
}

macro_rules! token_value_payload {
    ($($variant:ident => $payload:ty),* $(,)?) => {
        $(
            impl FromTokenValue for $payload {
                fn from_token_value(value: TokenValue) -> Option<Self> {
                    match value {
                        TokenValue::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }
            }

            impl From<$payload> for TokenValue {
                fn from(payload: $payload) -> Self {
                    TokenValue::$variant(payload)
                }
            }
        )*
    };
}

token_value_payload! {
    Color => ColorValue,
    Dimension => DimensionValue,
    File => FileValue,
    FontFamily => FontFamilyValue,
    FontWeight => FontWeightValue,
    Number => NumberValue,
    Duration => DurationValue,
    CubicBezier => CubicBezierValue,
    Typography => TypographyValue,
    Gradient => GradientValue,
    Shadow => TokenCollection<ShadowValue>,
    StrokeStyle => StrokeStyleValue,
    Border => BorderValue,
    Transition => TransitionValue,
}

/// Values that never hold references resolve to themselves.
macro_rules! alias_free {
    ($($payload:ty),* $(,)?) => {
        $(
            impl CompositeToken for $payload {
                fn resolve_aliases(
                    &self,
                    _resolver: &AliasResolver<'_>,
                    _visited: &mut VisitedPaths,
                ) -> Result<Self, ResolutionError> {
                    Ok(self.clone())
                }
            }
        )*
    };
}

alias_free!(
    ColorValue,
    FileValue,
    FontFamilyValue,
    FontWeightValue,
    NumberValue,
    DurationValue,
    CubicBezierValue,
);
