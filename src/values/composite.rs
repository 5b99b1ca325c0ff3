//! Building blocks shared by composite values

use super::FromTokenValue;
use crate::codec::TokenCodec;
use crate::config::{DecodeConfig, EncodeConfig};
use crate::error::{DecodeError, EncodeError, ResolutionError};
use crate::path::TokenPath;
use crate::resolver::{AliasResolver, CompositeToken, VisitedPaths};
use crate::token::Token;
use serde_json::Value;

/// A composite sub-field: a direct value or a reference to another token.
#[derive(Debug, Clone, PartialEq)]
pub enum CompositeField<T> {
    Alias(TokenPath),
    Direct(T),
}

impl<T> CompositeField<T> {
    pub fn direct(&self) -> Option<&T> {
        match self {
            CompositeField::Direct(value) => Some(value),
            CompositeField::Alias(_) => None,
        }
    }

    pub fn is_alias(&self) -> bool {
        matches!(self, CompositeField::Alias(_))
    }

    /// Transform the direct value, keeping aliases untouched.
    pub fn map_direct(self, transform: impl FnOnce(T) -> T) -> Self {
        match self {
            CompositeField::Direct(value) => CompositeField::Direct(transform(value)),
            alias => alias,
        }
    }

    pub fn try_map_direct<E>(self, transform: impl FnOnce(T) -> Result<T, E>) -> Result<Self, E> {
        match self {
            CompositeField::Direct(value) => transform(value).map(CompositeField::Direct),
            alias => Ok(alias),
        }
    }
}

impl<T> From<T> for CompositeField<T> {
    fn from(value: T) -> Self {
        CompositeField::Direct(value)
    }
}

impl<T: TokenCodec> TokenCodec for CompositeField<T> {
    fn decode(value: &Value, config: &DecodeConfig) -> Result<Self, DecodeError> {
        if let Some(path) = value.as_str().and_then(|raw| TokenPath::parse(raw).ok()) {
            return Ok(CompositeField::Alias(path));
        }
        T::decode(value, config).map(CompositeField::Direct)
    }

    fn encode(&self, config: &EncodeConfig) -> Result<Value, EncodeError> {
        match self {
            CompositeField::Alias(path) => Ok(Value::String(path.to_string())),
            CompositeField::Direct(value) => value.encode(config),
        }
    }
}

impl<T> CompositeToken for CompositeField<T>
where
    T: CompositeToken + FromTokenValue + Clone,
{
    /// An alias must land on a value of the same shape as `T`.
    fn resolve_aliases(
        &self,
        resolver: &AliasResolver<'_>,
        visited: &mut VisitedPaths,
    ) -> Result<Self, ResolutionError> {
        match self {
            CompositeField::Direct(value) => value.resolve_aliases(resolver, visited).map(CompositeField::Direct),
            CompositeField::Alias(path) => match resolver.follow(path, visited)? {
                Token::Value(value) => T::from_token_value(value)
                    .map(CompositeField::Direct)
                    .ok_or_else(|| ResolutionError::TypeMismatch { path: path.clone() }),
                _ => Err(ResolutionError::TypeMismatch { path: path.clone() }),
            },
        }
    }
}

/// One value or several; a single element is written without the array.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenCollection<T> {
    pub values: Vec<T>,
}

impl<T> TokenCollection<T> {
    pub fn new(values: Vec<T>) -> Self {
        Self { values }
    }

    pub fn single(value: T) -> Self {
        Self { values: vec![value] }
    }
}

impl<T: TokenCodec> TokenCodec for TokenCollection<T> {
    fn decode(value: &Value, config: &DecodeConfig) -> Result<Self, DecodeError> {
        match value {
            Value::Array(items) => items
                .iter()
                .map(|item| T::decode(item, config))
                .collect::<Result<Vec<_>, _>>()
                .map(Self::new),
            single => T::decode(single, config).map(Self::single),
        }
    }

    fn encode(&self, config: &EncodeConfig) -> Result<Value, EncodeError> {
        match self.values.as_slice() {
            [single] => single.encode(config),
            values => values
                .iter()
                .map(|value| value.encode(config))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
        }
    }
}

impl<T: CompositeToken> CompositeToken for TokenCollection<T> {
    fn resolve_aliases(
        &self,
        resolver: &AliasResolver<'_>,
        visited: &mut VisitedPaths,
    ) -> Result<Self, ResolutionError> {
        self.values.resolve_aliases(resolver, visited).map(Self::new)
    }
}

/// Required composite field lookup.
pub(crate) fn field<T: TokenCodec>(
    map: &serde_json::Map<String, Value>,
    name: &'static str,
    config: &DecodeConfig,
) -> Result<CompositeField<T>, DecodeError> {
    crate::codec::decode_field(map, name, config)
}

/// Insert `field` under `name`.
pub(crate) fn put<T: TokenCodec>(
    map: &mut serde_json::Map<String, Value>,
    name: &str,
    field: &CompositeField<T>,
    config: &EncodeConfig,
) -> Result<(), EncodeError> {
    map.insert(name.to_string(), field.encode(config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::DimensionConstant;
    use crate::values::DimensionValue;
    use serde_json::json;

    #[test]
    fn test_field_prefers_alias() {
        let field = CompositeField::<DimensionValue>::decode(&json!("{size.base}"), &DecodeConfig::default()).unwrap();
        assert_eq!(field, CompositeField::Alias(TokenPath::new(["size", "base"])));
        assert_eq!(field.encode(&EncodeConfig::default()).unwrap(), json!("{size.base}"));
    }

    #[test]
    fn test_field_direct_value() {
        let field = CompositeField::<DimensionValue>::decode(&json!("4px"), &DecodeConfig::default()).unwrap();
        assert_eq!(field.direct(), Some(&DimensionValue::from(DimensionConstant::px(4.0))));
    }

    #[test]
    fn test_collection_single_and_many() {
        let config = DecodeConfig::default();
        let single = TokenCollection::<f64>::decode(&json!(2), &config).unwrap();
        assert_eq!(single.values, vec![2.0]);
        assert_eq!(single.encode(&EncodeConfig::default()).unwrap(), json!(2.0));

        let many = TokenCollection::<f64>::decode(&json!([1, 2]), &config).unwrap();
        assert_eq!(many.values, vec![1.0, 2.0]);
        assert_eq!(many.encode(&EncodeConfig::default()).unwrap(), json!([1.0, 2.0]));
    }
}
