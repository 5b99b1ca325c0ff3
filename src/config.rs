//! Decode and encode configuration threaded through the token tree

use crate::types::TokenType;
use std::collections::HashMap;
use url::Url;

/// Context carried down the recursion while a document is decoded.
///
/// Only `inherited_type` changes on the way down: each group that declares a
/// `$type` rebinds it for its children. The rest is shared read-only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodeConfig {
    /// Type declared by the nearest enclosing group.
    pub inherited_type: Option<TokenType>,

    /// Vendor type remapping, applied once before value decoding.
    pub custom_types: Option<HashMap<TokenType, TokenType>>,

    /// Base that relative file references are appended to.
    pub file_base: Option<Url>,
}

impl DecodeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_custom_types(mut self, custom_types: HashMap<TokenType, TokenType>) -> Self {
        self.custom_types = Some(custom_types);
        self
    }

    pub fn with_custom_type(mut self, from: impl Into<TokenType>, to: impl Into<TokenType>) -> Self {
        self.custom_types
            .get_or_insert_with(HashMap::new)
            .insert(from.into(), to.into());
        self
    }

    pub fn with_file_base(mut self, file_base: Url) -> Self {
        self.file_base = Some(file_base);
        self
    }

    /// Copy of this configuration with the inherited type overwritten.
    pub fn inheriting(&self, inherited_type: TokenType) -> Self {
        Self {
            inherited_type: Some(inherited_type),
            ..self.clone()
        }
    }

    /// Effective type for a node: its own tag, else the inherited one.
    pub fn effective_type(&self, own_type: Option<TokenType>) -> Option<TokenType> {
        own_type.or_else(|| self.inherited_type.clone())
    }

    /// Apply the custom type table to an effective type (single lookup).
    pub fn map_type(&self, token_type: &TokenType) -> TokenType {
        self.custom_types
            .as_ref()
            .and_then(|map| map.get(token_type))
            .cloned()
            .unwrap_or_else(|| token_type.clone())
    }
}

/// How colors are written back out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorEncoding {
    /// `{colorSpace, components, alpha, hex?}` object.
    #[default]
    Default,
    /// `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    Hex,
}

/// How measurements (dimension constants, durations) are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MeasurementEncoding {
    /// `{value, unit}` object.
    #[default]
    Object,
    /// Bare number, or `"<value><unit>"` when `with_unit` is set.
    Value { with_unit: bool },
}

/// How file references are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FileEncoding {
    #[default]
    Absolute,
    /// Path only, or the remainder after `base` when one is given.
    Relative { base: Option<Url> },
}

/// Output switches used while encoding a token tree. Read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodeConfig {
    pub color: ColorEncoding,
    pub measurement: MeasurementEncoding,
    pub file: FileEncoding,
}

impl EncodeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_color(mut self, color: ColorEncoding) -> Self {
        self.color = color;
        self
    }

    pub fn with_measurement(mut self, measurement: MeasurementEncoding) -> Self {
        self.measurement = measurement;
        self
    }

    pub fn with_file(mut self, file: FileEncoding) -> Self {
        self.file = file;
        self
    }
}
