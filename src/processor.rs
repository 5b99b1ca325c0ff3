//! Token tree processors
//!
//! Each processor takes a whole tree and returns a transformed one. They are
//! chained with [`CombineProcessor`] to form a pipeline such as
//! skip keys, resolve aliases, convert units, evaluate, flatten.

use crate::assets::{mime_for_extension, AssetCache};
use crate::converter::{DimensionConverter, DurationConverter, UnitConverter};
use crate::error::{Result, TokenError};
use crate::evaluator::{ArithmeticEvaluator, DimensionEvaluator, ExpressionEngineEvaluator, FormulaEvaluator};
use crate::measurement::{DimensionUnit, DurationUnit};
use crate::resolver;
use crate::token::{Token, TokenGroup};
use crate::values::{DimensionValue, FileValue, TokenValue};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use url::Url;

/// One step of a token pipeline.
pub trait TokenProcessor {
    fn name(&self) -> &str;

    fn process(&self, token: Token) -> Result<Token>;
}

impl<P: TokenProcessor + ?Sized> TokenProcessor for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn process(&self, token: Token) -> Result<Token> {
        (**self).process(token)
    }
}

/// Replaces every alias with the value it points to.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveAliasesProcessor;

impl TokenProcessor for ResolveAliasesProcessor {
    fn name(&self) -> &str {
        "resolve-aliases"
    }

    fn process(&self, token: Token) -> Result<Token> {
        Ok(resolver::resolve_aliases(&token)?)
    }
}

/// Reduces dimension expressions to constants.
///
/// Aliases must already be resolved; an expression that still contains one
/// fails the whole run.
#[derive(Debug, Clone)]
pub struct DimensionEvaluationProcessor<E> {
    pub evaluator: DimensionEvaluator<E>,
}

impl<E: FormulaEvaluator> DimensionEvaluationProcessor<E> {
    pub fn new(evaluator: DimensionEvaluator<E>) -> Self {
        Self { evaluator }
    }

    fn evaluate(&self, dimension: DimensionValue) -> Result<DimensionValue> {
        match dimension {
            DimensionValue::Expression(expression) => {
                let constant = self.evaluator.evaluate(&expression)?;
                log::trace!("{} = {}", expression, constant);
                Ok(DimensionValue::Constant(constant))
            }
            constant => Ok(constant),
        }
    }
}

impl DimensionEvaluationProcessor<ArithmeticEvaluator> {
    pub fn arithmetic() -> Self {
        Self::new(DimensionEvaluator::arithmetic())
    }
}

impl DimensionEvaluationProcessor<ExpressionEngineEvaluator> {
    pub fn expression_engine() -> Result<Self> {
        Ok(Self::new(DimensionEvaluator::expression_engine()?))
    }
}

impl<E: FormulaEvaluator> TokenProcessor for DimensionEvaluationProcessor<E> {
    fn name(&self) -> &str {
        "dimension-evaluation"
    }

    fn process(&self, token: Token) -> Result<Token> {
        token.try_map(&mut |leaf| match leaf {
            Token::Value(value) => value
                .try_map_dimensions(&mut |dimension| self.evaluate(dimension))
                .map(Token::Value),
            other => Ok(other),
        })
    }
}

/// Rewrites every constant into one target unit.
///
/// Expressions keep their shape; only their constants are converted.
#[derive(Debug, Clone, Copy)]
pub struct UnitConversionProcessor {
    pub converter: DimensionConverter,
    pub target_unit: DimensionUnit,
    pub duration_target: Option<DurationUnit>,
}

impl UnitConversionProcessor {
    pub fn new(target_unit: DimensionUnit) -> Self {
        Self {
            converter: DimensionConverter::default(),
            target_unit,
            duration_target: None,
        }
    }

    pub fn with_converter(mut self, converter: DimensionConverter) -> Self {
        self.converter = converter;
        self
    }

    pub fn with_duration_target(mut self, unit: DurationUnit) -> Self {
        self.duration_target = Some(unit);
        self
    }

    fn convert(&self, dimension: DimensionValue) -> DimensionValue {
        match dimension {
            DimensionValue::Constant(constant) => {
                DimensionValue::Constant(self.converter.convert(constant, self.target_unit))
            }
            DimensionValue::Expression(expression) => DimensionValue::Expression(
                expression.map_constants(|constant| self.converter.convert(constant, self.target_unit)),
            ),
        }
    }
}

impl TokenProcessor for UnitConversionProcessor {
    fn name(&self) -> &str {
        "unit-conversion"
    }

    fn process(&self, token: Token) -> Result<Token> {
        Ok(token.map(|leaf| match leaf {
            Token::Value(value) => {
                let value = value.map_dimensions(|dimension| self.convert(dimension));
                let value = match self.duration_target {
                    Some(target) => value.map_durations(|duration| DurationConverter.convert(duration, target)),
                    None => value,
                };
                Token::Value(value)
            }
            other => other,
        }))
    }
}

/// Runs processors one after another.
#[derive(Default)]
pub struct CombineProcessor {
    processors: Vec<Box<dyn TokenProcessor>>,
}

impl CombineProcessor {
    pub fn new(processors: Vec<Box<dyn TokenProcessor>>) -> Self {
        Self { processors }
    }

    pub fn then(mut self, processor: impl TokenProcessor + 'static) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }
}

impl TokenProcessor for CombineProcessor {
    fn name(&self) -> &str {
        "combine"
    }

    fn process(&self, token: Token) -> Result<Token> {
        self.processors.iter().try_fold(token, |token, processor| {
            log::debug!("Running processor '{}'", processor.name());
            let processed = processor.process(token)?;
            log::debug!("Processor '{}' finished ({} leaves)", processor.name(), processed.leaf_count());
            Ok(processed)
        })
    }
}

/// How nested keys are joined into one flat key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyStyle {
    Joined(String),
    CamelCase,
    SnakeCase,
}

impl Default for KeyStyle {
    fn default() -> Self {
        KeyStyle::Joined(".".to_string())
    }
}

impl KeyStyle {
    pub fn join(&self, segments: &[String]) -> String {
        match self {
            KeyStyle::Joined(separator) => segments.join(separator),
            KeyStyle::SnakeCase => segments
                .iter()
                .map(|segment| segment.to_lowercase())
                .collect::<Vec<_>>()
                .join("_"),
            KeyStyle::CamelCase => segments
                .iter()
                .enumerate()
                .map(|(index, segment)| if index == 0 { segment.to_lowercase() } else { capitalize(segment) })
                .collect(),
        }
    }
}

fn capitalize(segment: &str) -> String {
    let lower = segment.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Predicate deciding that a group stays nested instead of being flattened.
pub type DepthLimit = Box<dyn Fn(&TokenGroup) -> bool + Send + Sync>;

/// Collapses nested groups into a single level of joined keys.
#[derive(Default)]
pub struct FlattenProcessor {
    pub key_style: KeyStyle,
    pub depth_limit: Option<DepthLimit>,
}

impl FlattenProcessor {
    pub fn new(key_style: KeyStyle) -> Self {
        Self {
            key_style,
            depth_limit: None,
        }
    }

    pub fn with_depth_limit(mut self, limit: impl Fn(&TokenGroup) -> bool + Send + Sync + 'static) -> Self {
        self.depth_limit = Some(Box::new(limit));
        self
    }

    fn stops_at(&self, group: &TokenGroup) -> bool {
        self.depth_limit.as_ref().map_or(false, |limit| limit(group))
    }

    fn collect(&self, group: TokenGroup, prefix: &[String], out: &mut Vec<(Vec<String>, Token)>) {
        for (key, child) in group {
            let mut path = prefix.to_vec();
            path.push(key);
            match child {
                Token::Group(inner) if !self.stops_at(&inner) => self.collect(inner, &path, out),
                leaf => out.push((path, leaf)),
            }
        }
    }
}

impl TokenProcessor for FlattenProcessor {
    fn name(&self) -> &str {
        "flatten"
    }

    fn process(&self, token: Token) -> Result<Token> {
        let Token::Group(group) = token else {
            return Ok(token);
        };

        let mut entries = Vec::new();
        self.collect(group, &[], &mut entries);

        let mut flat = TokenGroup::new();
        for (path, child) in entries {
            let key = self.key_style.join(&path);
            if flat.insert(key.clone(), child).is_some() {
                return Err(TokenError::processor(self.name(), format!("duplicate flattened key '{}'", key)));
            }
        }
        Ok(Token::Group(flat))
    }
}

/// Drops top-level keys.
#[derive(Debug, Clone, Default)]
pub struct SkipKeysProcessor {
    pub keys: HashSet<String>,
}

impl SkipKeysProcessor {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }
}

impl TokenProcessor for SkipKeysProcessor {
    fn name(&self) -> &str {
        "skip-keys"
    }

    fn process(&self, token: Token) -> Result<Token> {
        match token {
            Token::Group(mut group) => {
                group.retain(|key, _| !self.keys.contains(key));
                Ok(Token::Group(group))
            }
            other => Ok(other),
        }
    }
}

/// Points file values at local copies held by an [`AssetCache`].
///
/// Files with an unrecognized extension, and files the cache fails to fetch,
/// keep their original URL.
pub struct FileCachingProcessor {
    cache: Arc<dyn AssetCache>,
}

impl FileCachingProcessor {
    pub fn new(cache: Arc<dyn AssetCache>) -> Self {
        Self { cache }
    }

    fn cache_file(&self, url: &Url) -> Option<Url> {
        let extension = Path::new(url.path()).extension()?.to_str()?;
        let mime = mime_for_extension(extension)?;

        match self.cache.download(url, mime) {
            Ok(local) => Url::from_file_path(&local).ok(),
            Err(e) => {
                log::warn!("Failed to cache {}: {}", url, e);
                None
            }
        }
    }
}

impl TokenProcessor for FileCachingProcessor {
    fn name(&self) -> &str {
        "file-caching"
    }

    fn process(&self, token: Token) -> Result<Token> {
        Ok(token.map(|leaf| match leaf {
            Token::Value(TokenValue::File(FileValue::Url(url))) => {
                let cached = self.cache_file(&url).unwrap_or(url);
                Token::Value(TokenValue::File(FileValue::Url(cached)))
            }
            other => other,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::DirectoryAssetCache;
    use crate::config::DecodeConfig;
    use crate::error::{EvaluationError, ResolutionError};
    use crate::measurement::{DimensionConstant, DurationValue};
    use crate::path::TokenPath;
    use crate::values::{CompositeField, TypographyValue};
    use serde_json::json;
    use tempfile::TempDir;

    fn document(source: serde_json::Value) -> Token {
        Token::decode(&source, &DecodeConfig::default()).unwrap()
    }

    fn at<'a>(token: &'a Token, path: &[&str]) -> &'a Token {
        token.lookup(&TokenPath::new(path.iter().copied())).unwrap()
    }

    fn dimension(token: &Token) -> &DimensionValue {
        match token {
            Token::Value(TokenValue::Dimension(dimension)) => dimension,
            other => panic!("expected dimension, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_then_evaluate() {
        let root = document(json!({
            "$type": "dimension",
            "base": {"$value": "4px"},
            "large": {"$value": "{base} * 4"}
        }));
        let pipeline = CombineProcessor::default()
            .then(ResolveAliasesProcessor)
            .then(DimensionEvaluationProcessor::arithmetic());
        let processed = pipeline.process(root).unwrap();
        assert_eq!(dimension(at(&processed, &["large"])), &DimensionConstant::px(16.0).into());
    }

    #[test]
    fn test_evaluation_requires_resolved_aliases() {
        let root = document(json!({"$type": "dimension", "large": {"$value": "{base} * 4"}}));
        let result = DimensionEvaluationProcessor::arithmetic().process(root);
        assert!(matches!(
            result,
            Err(TokenError::Evaluation(EvaluationError::UnresolvedAlias(_)))
        ));
    }

    #[test]
    fn test_expression_engine_backend() {
        let root = document(json!({"$type": "dimension", "gap": {"$value": "(1rem + 4px) / 2"}}));
        let processed = DimensionEvaluationProcessor::expression_engine()
            .unwrap()
            .process(root)
            .unwrap();
        assert_eq!(dimension(at(&processed, &["gap"])), &DimensionConstant::px(10.0).into());
    }

    #[test]
    fn test_unit_conversion() {
        let root = document(json!({
            "$type": "dimension",
            "base": {"$value": "32px"},
            "expr": {"$value": "16px + 1rem"},
            "text": {
                "$type": "typography",
                "$value": {
                    "fontFamily": "Inter",
                    "fontSize": "24px",
                    "fontWeight": 400,
                    "letterSpacing": "{base}",
                    "lineHeight": 1.2
                }
            },
            "fade": {"$type": "duration", "$value": "0.25s"}
        }));
        let processor = UnitConversionProcessor::new(DimensionUnit::Rem).with_duration_target(DurationUnit::Millisecond);
        let processed = processor.process(root).unwrap();

        assert_eq!(dimension(at(&processed, &["base"])), &DimensionConstant::rem(2.0).into());
        let DimensionValue::Expression(expr) = dimension(at(&processed, &["expr"])) else {
            panic!("expected expression");
        };
        assert_eq!(expr.raw(), "1rem+1rem");

        let Token::Value(TokenValue::Typography(TypographyValue { font_size, letter_spacing, .. })) =
            at(&processed, &["text"])
        else {
            panic!("expected typography");
        };
        assert_eq!(font_size, &CompositeField::Direct(DimensionConstant::rem(1.5).into()));
        assert!(letter_spacing.is_alias());

        assert_eq!(
            at(&processed, &["fade"]),
            &Token::Value(TokenValue::Duration(DurationValue::ms(250.0)))
        );
    }

    #[test]
    fn test_combine_propagates_errors() {
        let root = document(json!({"$type": "number", "a": {"$value": "{b}"}, "b": {"$value": "{a}"}}));
        let pipeline = CombineProcessor::new(vec![Box::new(ResolveAliasesProcessor)]);
        assert_eq!(pipeline.len(), 1);
        assert!(matches!(
            pipeline.process(root),
            Err(TokenError::Resolution(ResolutionError::CircularReference(_)))
        ));
    }

    #[test]
    fn test_key_styles() {
        let segments = ["Color".to_string(), "brand".to_string(), "PRIMARY".to_string()];
        assert_eq!(KeyStyle::default().join(&segments), "Color.brand.PRIMARY");
        assert_eq!(KeyStyle::Joined("-".to_string()).join(&segments), "Color-brand-PRIMARY");
        assert_eq!(KeyStyle::CamelCase.join(&segments), "colorBrandPrimary");
        assert_eq!(KeyStyle::SnakeCase.join(&segments), "color_brand_primary");
    }

    #[test]
    fn test_flatten() {
        let root = document(json!({
            "color": {
                "$type": "color",
                "brand": {"primary": {"$value": "#ff0000"}},
                "ink": {"$value": "#000000"}
            },
            "space": {"$type": "number", "unit": {"$value": 4}}
        }));
        let processed = FlattenProcessor::default().process(root).unwrap();
        let group = processed.as_group().unwrap();
        let keys: Vec<_> = group.keys().map(String::as_str).collect();
        assert_eq!(keys, ["color.brand.primary", "color.ink", "space.unit"]);
    }

    #[test]
    fn test_flatten_depth_limit() {
        let root = document(json!({
            "color": {
                "$type": "color",
                "brand": {"primary": {"$value": "#ff0000"}, "muted": {"$value": "#777777"}},
                "ink": {"$value": "#000000"}
            }
        }));
        let processor = FlattenProcessor::new(KeyStyle::CamelCase).with_depth_limit(|group| group.len() > 1);
        let processed = processor.process(root).unwrap();
        let group = processed.as_group().unwrap();
        assert_eq!(group.len(), 1);
        assert!(matches!(group.get("color"), Some(Token::Group(_))));
    }

    #[test]
    fn test_flatten_rejects_colliding_keys() {
        let root = document(json!({
            "a": {"b": {"$type": "number", "$value": 1}},
            "a.b": {"$type": "number", "$value": 2}
        }));
        assert!(matches!(
            FlattenProcessor::default().process(root),
            Err(TokenError::Processor { .. })
        ));
    }

    #[test]
    fn test_skip_keys() {
        let root = document(json!({
            "$description": "palette",
            "internal": {"$type": "number", "x": {"$value": 1}},
            "public": {"$type": "number", "y": {"$value": 2}}
        }));
        let processed = SkipKeysProcessor::new(["internal", "$description"]).process(root).unwrap();
        let keys: Vec<_> = processed.as_group().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["public"]);
    }

    #[test]
    fn test_file_caching() {
        let sources = TempDir::new().unwrap();
        let cache_dir = TempDir::new().unwrap();
        std::fs::write(sources.path().join("logo.svg"), b"<svg/>").unwrap();
        let source_url = Url::from_file_path(sources.path().join("logo.svg")).unwrap();

        let root = document(json!({
            "$type": "file",
            "logo": {"$value": source_url.as_str()},
            "readme": {"$value": "https://example.com/readme.txt"},
            "missing": {"$value": "https://example.com/gone.svg"}
        }));
        let cache = Arc::new(DirectoryAssetCache::new(cache_dir.path()));
        let processed = FileCachingProcessor::new(cache).process(root).unwrap();

        let Token::Value(TokenValue::File(FileValue::Url(logo))) = at(&processed, &["logo"]) else {
            panic!("expected file");
        };
        assert!(logo.to_file_path().unwrap().starts_with(cache_dir.path()));

        let Token::Value(TokenValue::File(FileValue::Url(missing))) = at(&processed, &["missing"]) else {
            panic!("expected file");
        };
        assert_eq!(missing.as_str(), "https://example.com/gone.svg");
    }
}
