//! The token tree
//!
//! A document is decoded into nested [`Token`] nodes. Groups propagate their
//! `$type` to descendants, `$value` strings in `{path}` form become aliases,
//! and anything that cannot be understood is kept verbatim as
//! [`Token::Unknown`] so it survives a round trip.

use crate::config::{DecodeConfig, EncodeConfig};
use crate::error::{DecodeError, EncodeError, ResolutionError};
use crate::path::TokenPath;
use crate::types::{TokenType, TYPE_KEY, VALUE_KEY};
use crate::values::TokenValue;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Children of a group, ordered by key.
pub type TokenGroup = BTreeMap<String, Token>;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Value(TokenValue),
    Group(TokenGroup),
    Alias(TokenPath),
    Array(Vec<Token>),
    /// Anything the decoder could not interpret, kept as written.
    Unknown(Value),
}

impl Token {
    /// Decode a whole document.
    pub fn decode(source: &Value, config: &DecodeConfig) -> Result<Self, DecodeError> {
        Self::decode_at(source, config, &TokenPath::default())
    }

    fn decode_at(source: &Value, config: &DecodeConfig, location: &TokenPath) -> Result<Self, DecodeError> {
        match source {
            Value::Object(map) if map.contains_key(VALUE_KEY) => Self::decode_value_node(map, config, location),
            Value::Array(entries) => entries
                .iter()
                .enumerate()
                .map(|(index, entry)| Self::decode_at(entry, config, &location.appending(index.to_string())))
                .collect::<Result<Vec<_>, _>>()
                .map(Token::Array),
            Value::Object(map) => Self::decode_group(map, config, location),
            other => Ok(Token::Unknown(other.clone())),
        }
    }

    /// A node carrying `$value`: alias, typed value, or unknown.
    fn decode_value_node(
        map: &Map<String, Value>,
        config: &DecodeConfig,
        location: &TokenPath,
    ) -> Result<Self, DecodeError> {
        let payload = &map[VALUE_KEY];
        let own_type = map.get(TYPE_KEY).and_then(Value::as_str).map(TokenType::from);

        let mut path_error = None;
        if let Value::String(raw) = payload {
            match TokenPath::parse(raw) {
                Ok(path) => return Ok(Token::Alias(path)),
                Err(e) if raw.trim_start().starts_with('{') => path_error = Some(e),
                Err(_) => {}
            }
        }

        let token_type = config
            .effective_type(own_type)
            .ok_or_else(|| DecodeError::UnresolvedType {
                location: location.dotted(),
            })?;
        let token_type = config.map_type(&token_type);

        match (TokenValue::decode(&token_type, payload, config), path_error) {
            (Ok(value), _) => Ok(Token::Value(value)),
            // Looks like a reference, but is neither a path nor a typed value.
            (Err(_), Some(path_error)) => Err(path_error.into()),
            (Err(e), None) => {
                log::debug!(
                    "Keeping {} as unknown ({} as '{}'): {}",
                    location.dotted(),
                    payload,
                    token_type,
                    e
                );
                Ok(Token::Unknown(payload.clone()))
            }
        }
    }

    fn decode_group(map: &Map<String, Value>, config: &DecodeConfig, location: &TokenPath) -> Result<Self, DecodeError> {
        let scoped;
        let config = match map.get(TYPE_KEY) {
            None => config,
            Some(Value::String(tag)) => {
                scoped = config.inheriting(TokenType::from(tag.as_str()));
                &scoped
            }
            Some(other) => {
                log::debug!("Group {} has a non-string {}: {}", location.dotted(), TYPE_KEY, other);
                return Ok(Token::Unknown(Value::Object(map.clone())));
            }
        };

        map.iter()
            .filter(|(key, _)| key.as_str() != TYPE_KEY)
            .map(|(key, child)| Ok((key.clone(), Self::decode_at(child, config, &location.appending(key))?)))
            .collect::<Result<TokenGroup, DecodeError>>()
            .map(Token::Group)
    }

    /// Encode back into a document.
    ///
    /// Values carry their own `$type`; groups never emit one, so an
    /// inherited type is materialized on every leaf.
    pub fn encode(&self, config: &EncodeConfig) -> Result<Value, EncodeError> {
        match self {
            Token::Value(value) => {
                let mut map = Map::new();
                map.insert(TYPE_KEY.to_string(), Value::String(value.token_type().to_string()));
                map.insert(VALUE_KEY.to_string(), value.encode_payload(config)?);
                Ok(Value::Object(map))
            }
            Token::Alias(path) => {
                let mut map = Map::new();
                map.insert(VALUE_KEY.to_string(), Value::String(path.to_string()));
                Ok(Value::Object(map))
            }
            Token::Group(group) => group
                .iter()
                .map(|(key, child)| Ok((key.clone(), child.encode(config)?)))
                .collect::<Result<Map<_, _>, EncodeError>>()
                .map(Value::Object),
            Token::Array(entries) => entries
                .iter()
                .map(|entry| entry.encode(config))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Token::Unknown(raw) => Ok(raw.clone()),
        }
    }

    pub fn as_group(&self) -> Option<&TokenGroup> {
        match self {
            Token::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&TokenValue> {
        match self {
            Token::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Child of a group by key.
    pub fn get(&self, key: &str) -> Option<&Token> {
        self.as_group()?.get(key)
    }

    /// Walk a dotted path through nested groups.
    pub fn lookup(&self, path: &TokenPath) -> Option<&Token> {
        path.segments().iter().try_fold(self, |node, key| node.get(key))
    }

    /// Apply `transform` to every leaf, rebuilding groups and arrays around
    /// the results.
    pub fn try_map<E>(self, transform: &mut impl FnMut(Token) -> Result<Token, E>) -> Result<Token, E> {
        match self {
            Token::Group(group) => group
                .into_iter()
                .map(|(key, child)| Ok((key, child.try_map(transform)?)))
                .collect::<Result<TokenGroup, E>>()
                .map(Token::Group),
            Token::Array(entries) => entries
                .into_iter()
                .map(|entry| entry.try_map(transform))
                .collect::<Result<Vec<_>, E>>()
                .map(Token::Array),
            leaf => transform(leaf),
        }
    }

    pub fn map(self, mut transform: impl FnMut(Token) -> Token) -> Token {
        match self.try_map(&mut |token| Ok::<_, std::convert::Infallible>(transform(token))) {
            Ok(token) => token,
            Err(never) => match never {},
        }
    }

    /// Merge two trees.
    ///
    /// Groups merge key by key; every other pairing is handed to `combine`.
    pub fn deep_merge(
        self,
        other: Token,
        combine: &mut impl FnMut(Token, Token) -> Result<Token, ResolutionError>,
    ) -> Result<Token, ResolutionError> {
        match (self, other) {
            (Token::Group(mut base), Token::Group(overlay)) => {
                for (key, incoming) in overlay {
                    let merged = match base.remove(&key) {
                        Some(existing) => existing.deep_merge(incoming, combine)?,
                        None => incoming,
                    };
                    base.insert(key, merged);
                }
                Ok(Token::Group(base))
            }
            (left, right) => combine(left, right),
        }
    }

    /// Number of value, alias and unknown leaves.
    pub fn leaf_count(&self) -> usize {
        match self {
            Token::Group(group) => group.values().map(Token::leaf_count).sum(),
            Token::Array(entries) => entries.iter().map(Token::leaf_count).sum(),
            _ => 1,
        }
    }
}

/// Merge policy for [`Token::deep_merge`]: the later leaf wins, but a group
/// never replaces a leaf or the other way round.
pub fn overlay_leaves(left: Token, right: Token) -> Result<Token, ResolutionError> {
    match (&left, &right) {
        (Token::Group(_), _) | (_, Token::Group(_)) => Err(ResolutionError::UnsupportedMerge(
            "a group cannot be merged with a token".to_string(),
        )),
        _ => Ok(right),
    }
}

impl Serialize for Token {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.encode(&EncodeConfig::default())
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Token {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = Value::deserialize(deserializer)?;
        Token::decode(&source, &DecodeConfig::default()).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PathError;
    use crate::measurement::DimensionConstant;
    use crate::values::{ColorValue, FileValue};
    use serde_json::json;

    fn decode(source: Value) -> Result<Token, DecodeError> {
        Token::decode(&source, &DecodeConfig::default())
    }

    #[test]
    fn test_group_type_is_inherited() {
        let token = decode(json!({
            "spacing": {
                "$type": "dimension",
                "small": {"$value": "4px"},
                "nested": {"large": {"$value": "2rem"}}
            }
        }))
        .unwrap();

        let small = token.lookup(&TokenPath::new(["spacing", "small"])).unwrap();
        assert_eq!(small, &Token::Value(TokenValue::Dimension(DimensionConstant::px(4.0).into())));
        let large = token.lookup(&TokenPath::new(["spacing", "nested", "large"])).unwrap();
        assert_eq!(large, &Token::Value(TokenValue::Dimension(DimensionConstant::rem(2.0).into())));
    }

    #[test]
    fn test_own_type_overrides_inherited() {
        let token = decode(json!({
            "$type": "dimension",
            "ratio": {"$type": "number", "$value": 1.25}
        }))
        .unwrap();
        assert_eq!(token.get("ratio"), Some(&Token::Value(TokenValue::Number(1.25))));
    }

    #[test]
    fn test_alias_needs_no_type() {
        let token = decode(json!({"link": {"$value": "{color.primary}"}})).unwrap();
        assert_eq!(
            token.get("link"),
            Some(&Token::Alias(TokenPath::new(["color", "primary"])))
        );
    }

    #[test]
    fn test_missing_type_is_an_error() {
        let result = decode(json!({"theme": {"accent": {"$value": "#ff0000"}}}));
        assert_eq!(
            result,
            Err(DecodeError::UnresolvedType {
                location: "theme.accent".to_string()
            })
        );
    }

    #[test]
    fn test_unknown_type_preserves_payload() {
        let source = json!({"logo": {"$type": "icon", "$value": {"glyph": "star", "size": 3}}});
        let token = decode(source.clone()).unwrap();
        assert_eq!(token.get("logo"), Some(&Token::Unknown(json!({"glyph": "star", "size": 3}))));

        let encoded = token.encode(&EncodeConfig::default()).unwrap();
        assert_eq!(encoded["logo"], json!({"glyph": "star", "size": 3}));
    }

    #[test]
    fn test_custom_type_mapping() {
        let config = DecodeConfig::default()
            .with_custom_type("icon", TokenType::FILE)
            .with_file_base(url::Url::parse("https://cdn.example.com/assets/").unwrap());
        let token = Token::decode(&json!({"logo": {"$type": "icon", "$value": "logo.svg"}}), &config).unwrap();
        let Some(Token::Value(TokenValue::File(file))) = token.get("logo") else {
            panic!("expected file value");
        };
        assert_eq!(
            file,
            &FileValue::Url(url::Url::parse("https://cdn.example.com/assets/logo.svg").unwrap())
        );
    }

    #[test]
    fn test_broken_reference_surfaces_path_error() {
        let result = decode(json!({"x": {"$type": "color", "$value": "{color.primary"}}));
        assert_eq!(result, Err(DecodeError::Path(PathError::BracketsMismatch)));
    }

    #[test]
    fn test_arrays_and_scalars() {
        let token = decode(json!({
            "themes": [
                {"accent": {"$type": "color", "$value": "#ff0000"}},
                "loose"
            ],
            "$description": "kept"
        }))
        .unwrap();
        let Some(Token::Array(entries)) = token.get("themes") else {
            panic!("expected array");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1], Token::Unknown(json!("loose")));
        assert_eq!(token.get("$description"), Some(&Token::Unknown(json!("kept"))));
    }

    #[test]
    fn test_non_string_group_type_degrades() {
        let source = json!({"bad": {"$type": 5, "child": {"$value": 1}}});
        let token = decode(source).unwrap();
        assert_eq!(token.get("bad"), Some(&Token::Unknown(json!({"$type": 5, "child": {"$value": 1}}))));
    }

    #[test]
    fn test_encode_materializes_types() {
        let token = decode(json!({
            "$type": "color",
            "primary": {"$value": "#336699"},
            "link": {"$value": "{primary}"}
        }))
        .unwrap();
        let encoded = token.encode(&EncodeConfig::default()).unwrap();
        assert!(encoded.get(TYPE_KEY).is_none());
        assert_eq!(encoded["primary"][TYPE_KEY], json!("color"));
        assert_eq!(encoded["link"], json!({"$value": "{primary}"}));

        assert_eq!(decode(encoded).unwrap(), token);
    }

    #[test]
    fn test_map_reaches_leaves_in_arrays() {
        let token = decode(json!({
            "$type": "number",
            "a": {"$value": 1},
            "list": [{"b": {"$type": "number", "$value": 2}}]
        }))
        .unwrap();
        let doubled = token.map(|leaf| match leaf {
            Token::Value(TokenValue::Number(n)) => Token::Value(TokenValue::Number(n * 2.0)),
            other => other,
        });
        assert_eq!(doubled.get("a"), Some(&Token::Value(TokenValue::Number(2.0))));
        let Some(Token::Array(entries)) = doubled.get("list") else {
            panic!("expected array");
        };
        assert_eq!(entries[0].get("b"), Some(&Token::Value(TokenValue::Number(4.0))));
        assert_eq!(doubled.leaf_count(), 2);
    }

    #[test]
    fn test_deep_merge() {
        let base = decode(json!({
            "color": {"$type": "color", "primary": {"$value": "#000000"}, "muted": {"$value": "#777777"}}
        }))
        .unwrap();
        let overlay = decode(json!({
            "color": {"$type": "color", "primary": {"$value": "#ffffff"}},
            "size": {"$type": "number", "scale": {"$value": 2}}
        }))
        .unwrap();

        let merged = base.clone().deep_merge(overlay, &mut overlay_leaves).unwrap();
        let primary = merged.lookup(&TokenPath::new(["color", "primary"])).unwrap();
        assert_eq!(
            primary,
            &Token::Value(TokenValue::Color(ColorValue::from_hex("#ffffff").unwrap()))
        );
        assert!(merged.lookup(&TokenPath::new(["color", "muted"])).is_some());
        assert!(merged.lookup(&TokenPath::new(["size", "scale"])).is_some());

        let conflicting = decode(json!({"color": {"$type": "number", "$value": 1}})).unwrap();
        assert!(matches!(
            base.deep_merge(conflicting, &mut overlay_leaves),
            Err(ResolutionError::UnsupportedMerge(_))
        ));
    }

    #[test]
    fn test_serde_uses_default_configs() {
        let token: Token = serde_json::from_str(r#"{"gap": {"$type": "dimension", "$value": 8}}"#).unwrap();
        let text = serde_json::to_string(&token).unwrap();
        assert_eq!(
            serde_json::from_str::<Value>(&text).unwrap(),
            json!({"gap": {"$type": "dimension", "$value": {"value": 8.0, "unit": "px"}}})
        );
    }
}
