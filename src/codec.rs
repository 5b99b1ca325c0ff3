//! JSON decoding and encoding shared by every value shape

use crate::config::{DecodeConfig, EncodeConfig};
use crate::error::{DecodeError, EncodeError};
use serde_json::{Map, Number, Value};

/// A value that reads itself from a structured document node and writes
/// itself back according to the output switches.
pub trait TokenCodec: Sized {
    fn decode(value: &Value, config: &DecodeConfig) -> Result<Self, DecodeError>;

    fn encode(&self, config: &EncodeConfig) -> Result<Value, EncodeError>;
}

impl TokenCodec for f64 {
    fn decode(value: &Value, _config: &DecodeConfig) -> Result<Self, DecodeError> {
        expect_f64(value, "number")
    }

    fn encode(&self, _config: &EncodeConfig) -> Result<Value, EncodeError> {
        number(*self)
    }
}

impl<T: TokenCodec> TokenCodec for Vec<T> {
    fn decode(value: &Value, config: &DecodeConfig) -> Result<Self, DecodeError> {
        expect_array(value, "array")?
            .iter()
            .map(|item| T::decode(item, config))
            .collect()
    }

    fn encode(&self, config: &EncodeConfig) -> Result<Value, EncodeError> {
        self.iter()
            .map(|item| item.encode(config))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }
}

pub(crate) fn number(value: f64) -> Result<Value, EncodeError> {
    Number::from_f64(value)
        .map(Value::Number)
        .ok_or(EncodeError::NonFiniteNumber(value))
}

pub(crate) fn expect_f64(value: &Value, expected: &'static str) -> Result<f64, DecodeError> {
    value
        .as_f64()
        .ok_or_else(|| DecodeError::invalid(expected, value))
}

pub(crate) fn expect_str<'a>(value: &'a Value, expected: &'static str) -> Result<&'a str, DecodeError> {
    value
        .as_str()
        .ok_or_else(|| DecodeError::invalid(expected, value))
}

pub(crate) fn expect_object<'a>(
    value: &'a Value,
    expected: &'static str,
) -> Result<&'a Map<String, Value>, DecodeError> {
    value
        .as_object()
        .ok_or_else(|| DecodeError::invalid(expected, value))
}

pub(crate) fn expect_array<'a>(value: &'a Value, expected: &'static str) -> Result<&'a Vec<Value>, DecodeError> {
    value
        .as_array()
        .ok_or_else(|| DecodeError::invalid(expected, value))
}

pub(crate) fn field<'a>(map: &'a Map<String, Value>, name: &'static str) -> Result<&'a Value, DecodeError> {
    map.get(name).ok_or(DecodeError::MissingField(name))
}

pub(crate) fn decode_field<T: TokenCodec>(
    map: &Map<String, Value>,
    name: &'static str,
    config: &DecodeConfig,
) -> Result<T, DecodeError> {
    T::decode(field(map, name)?, config)
}
