//! Numbers with units: dimensions (`px`, `rem`) and durations (`s`, `ms`)

use crate::codec::{self, TokenCodec};
use crate::config::{DecodeConfig, EncodeConfig, MeasurementEncoding};
use crate::error::{DecodeError, EncodeError};
use serde_json::{json, Value};
use std::fmt;

/// A closed set of units identified by a string suffix.
pub trait Unit: Copy + Eq + fmt::Debug + 'static {
    /// Every unit, longest symbol first so suffix matching is unambiguous.
    const ALL: &'static [Self];

    fn symbol(self) -> &'static str;

    fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|unit| unit.symbol() == symbol)
    }

    /// Unit-specific compact decoding (`"16px"`, bare numbers).
    ///
    /// `None` falls back to the `{value, unit}` object form.
    fn decode_compact(_value: &Value) -> Option<Result<Measurement<Self>, DecodeError>> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement<U: Unit> {
    pub value: f64,
    pub unit: U,
}

impl<U: Unit> Measurement<U> {
    pub fn new(value: f64, unit: U) -> Self {
        Self { value, unit }
    }

    pub fn encode_with(&self, encoding: MeasurementEncoding) -> Result<Value, EncodeError> {
        match encoding {
            MeasurementEncoding::Object => Ok(json!({
                "value": codec::number(self.value)?,
                "unit": self.unit.symbol(),
            })),
            MeasurementEncoding::Value { with_unit: false } => codec::number(self.value),
            MeasurementEncoding::Value { with_unit: true } => Ok(Value::String(self.to_string())),
        }
    }
}

impl<U: Unit> fmt::Display for Measurement<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.symbol())
    }
}

impl<U: Unit> TokenCodec for Measurement<U> {
    fn decode(value: &Value, _config: &DecodeConfig) -> Result<Self, DecodeError> {
        if let Some(compact) = U::decode_compact(value) {
            return compact;
        }

        let map = codec::expect_object(value, "measurement object")?;
        let amount = codec::expect_f64(codec::field(map, "value")?, "number")?;
        let symbol = codec::expect_str(codec::field(map, "unit")?, "unit")?;
        let unit = U::from_symbol(symbol)
            .ok_or_else(|| DecodeError::invalid("known unit", &Value::String(symbol.to_string())))?;
        Ok(Self::new(amount, unit))
    }

    fn encode(&self, config: &EncodeConfig) -> Result<Value, EncodeError> {
        self.encode_with(config.measurement)
    }
}

/// Split a known unit suffix off `raw`, returning the numeric part.
fn split_unit<U: Unit>(raw: &str) -> (&str, Option<U>) {
    U::ALL
        .iter()
        .copied()
        .find(|unit| raw.ends_with(unit.symbol()))
        .map(|unit| (&raw[..raw.len() - unit.symbol().len()], Some(unit)))
        .unwrap_or((raw, None))
}

/// The numeric part of a compact measurement. `inf` and `NaN` are rejected.
fn parse_amount(number: &str) -> Option<f64> {
    number.parse::<f64>().ok().filter(|amount| amount.is_finite())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DimensionUnit {
    Px,
    Rem,
}

impl DimensionUnit {
    pub const DEFAULT: DimensionUnit = DimensionUnit::Px;
}

impl Default for DimensionUnit {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Unit for DimensionUnit {
    const ALL: &'static [Self] = &[DimensionUnit::Rem, DimensionUnit::Px];

    fn symbol(self) -> &'static str {
        match self {
            DimensionUnit::Px => "px",
            DimensionUnit::Rem => "rem",
        }
    }

    fn decode_compact(value: &Value) -> Option<Result<Measurement<Self>, DecodeError>> {
        match value {
            Value::Number(number) => number
                .as_f64()
                .map(|amount| Ok(Measurement::new(amount, DimensionUnit::DEFAULT))),
            Value::String(raw) => Some(DimensionConstant::parse(raw)),
            _ => None,
        }
    }
}

pub type DimensionConstant = Measurement<DimensionUnit>;

impl Measurement<DimensionUnit> {
    /// Parse `"16px"`, `"2rem"` or a bare `"8"` (taken as px).
    pub fn parse(raw: &str) -> Result<Self, DecodeError> {
        let trimmed = raw.trim();
        let (number, unit) = split_unit::<DimensionUnit>(trimmed);
        if unit.is_none() {
            log::debug!(
                "Unit format is unsupported or not specified. Defaulting to '{}' for value: '{}'",
                DimensionUnit::DEFAULT.symbol(),
                trimmed
            );
        }

        let amount =
            parse_amount(number).ok_or_else(|| DecodeError::InvalidMeasurement(trimmed.to_string()))?;
        Ok(Self::new(amount, unit.unwrap_or(DimensionUnit::DEFAULT)))
    }

    pub fn px(value: f64) -> Self {
        Self::new(value, DimensionUnit::Px)
    }

    pub fn rem(value: f64) -> Self {
        Self::new(value, DimensionUnit::Rem)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DurationUnit {
    Second,
    Millisecond,
}

impl Unit for DurationUnit {
    const ALL: &'static [Self] = &[DurationUnit::Millisecond, DurationUnit::Second];

    fn symbol(self) -> &'static str {
        match self {
            DurationUnit::Second => "s",
            DurationUnit::Millisecond => "ms",
        }
    }

    fn decode_compact(value: &Value) -> Option<Result<Measurement<Self>, DecodeError>> {
        let raw = value.as_str()?.trim();
        let parsed = match split_unit::<DurationUnit>(raw) {
            (number, Some(unit)) => parse_amount(number).map(|amount| Measurement::new(amount, unit)),
            (_, None) => None,
        };
        Some(parsed.ok_or_else(|| DecodeError::InvalidMeasurement(raw.to_string())))
    }
}

pub type DurationValue = Measurement<DurationUnit>;

impl Measurement<DurationUnit> {
    pub fn ms(value: f64) -> Self {
        Self::new(value, DurationUnit::Millisecond)
    }

    pub fn seconds(value: f64) -> Self {
        Self::new(value, DurationUnit::Second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode<U: Unit>(value: Value) -> Result<Measurement<U>, DecodeError> {
        Measurement::<U>::decode(&value, &DecodeConfig::default())
    }

    #[test]
    fn test_dimension_compact_forms() {
        assert_eq!(decode::<DimensionUnit>(json!(16)).unwrap(), DimensionConstant::px(16.0));
        assert_eq!(decode::<DimensionUnit>(json!("16px")).unwrap(), DimensionConstant::px(16.0));
        assert_eq!(decode::<DimensionUnit>(json!("1.5rem")).unwrap(), DimensionConstant::rem(1.5));
        assert_eq!(decode::<DimensionUnit>(json!("8")).unwrap(), DimensionConstant::px(8.0));
        assert_eq!(
            decode::<DimensionUnit>(json!({"value": 2, "unit": "rem"})).unwrap(),
            DimensionConstant::rem(2.0)
        );
    }

    #[test]
    fn test_dimension_invalid_strings() {
        assert!(matches!(
            decode::<DimensionUnit>(json!("16em")),
            Err(DecodeError::InvalidMeasurement(_))
        ));
        assert!(decode::<DimensionUnit>(json!("2px*2")).is_err());
        assert!(decode::<DimensionUnit>(json!({"value": 2, "unit": "em"})).is_err());
    }

    #[test]
    fn test_duration_forms() {
        assert_eq!(
            decode::<DurationUnit>(json!({"value": 300, "unit": "ms"})).unwrap(),
            DurationValue::ms(300.0)
        );
        assert_eq!(decode::<DurationUnit>(json!("0.5s")).unwrap(), DurationValue::seconds(0.5));
        assert_eq!(decode::<DurationUnit>(json!("120ms")).unwrap(), DurationValue::ms(120.0));
        assert!(decode::<DurationUnit>(json!(300)).is_err());
        assert!(decode::<DurationUnit>(json!("300")).is_err());
    }

    #[test]
    fn test_non_finite_amounts_are_rejected() {
        for raw in ["inf", "-inf", "NaN", "infinity", "infpx", "NaNrem"] {
            assert!(matches!(
                decode::<DimensionUnit>(json!(raw)),
                Err(DecodeError::InvalidMeasurement(_))
            ));
        }
        for raw in ["infms", "NaNs"] {
            assert!(matches!(
                decode::<DurationUnit>(json!(raw)),
                Err(DecodeError::InvalidMeasurement(_))
            ));
        }
    }

    #[test]
    fn test_measurement_encodings() {
        let value = DimensionConstant::px(12.0);
        assert_eq!(
            value.encode_with(MeasurementEncoding::Object).unwrap(),
            json!({"value": 12.0, "unit": "px"})
        );
        assert_eq!(
            value.encode_with(MeasurementEncoding::Value { with_unit: false }).unwrap(),
            json!(12.0)
        );
        assert_eq!(
            value.encode_with(MeasurementEncoding::Value { with_unit: true }).unwrap(),
            json!("12px")
        );
        assert_eq!(
            DurationValue::ms(250.0)
                .encode_with(MeasurementEncoding::Value { with_unit: true })
                .unwrap(),
            json!("250ms")
        );
    }

    #[test]
    fn test_compact_encoding_round_trips() {
        let encoding = MeasurementEncoding::Value { with_unit: true };
        let original = DurationValue::seconds(1.25);
        let encoded = original.encode_with(encoding).unwrap();
        assert_eq!(decode::<DurationUnit>(encoded).unwrap(), original);
    }
}
