//! Design Token Compiler
//!
//! Reads design token documents in the W3C Design Tokens Community Group
//! format, resolves `{path}` aliases, evaluates dimension expressions and
//! writes the result back out.
//!
//! # Basic Usage
//!
//! ```rust
//! use tokenc::{compile_source, Result};
//!
//! fn main() -> Result<()> {
//!     let output = compile_source(r#"{
//!         "spacing": {
//!             "$type": "dimension",
//!             "base": {"$value": "4px"},
//!             "large": {"$value": "{spacing.base}"}
//!         }
//!     }"#)?;
//!     assert!(output.contains("large"));
//!     Ok(())
//! }
//! ```
//!
//! # Pipeline
//!
//! 1. **Decode** - JSON into a [`Token`] tree, propagating group `$type`s
//! 2. **Merge** - several documents deep-merged, later ones winning
//! 3. **Skip keys** - drop unwanted top-level groups
//! 4. **Resolve** - replace every alias with its target
//! 5. **Convert** - rewrite constants into one unit (optional)
//! 6. **Evaluate** - reduce dimension expressions to constants (optional)
//! 7. **Flatten** - collapse nested groups into dotted keys (optional)
//! 8. **Encode** - back to JSON

pub mod assets;
pub mod cli;
pub mod codec;
pub mod config;
pub mod converter;
pub mod error;
pub mod evaluator;
pub mod expression;
pub mod measurement;
pub mod path;
pub mod processor;
pub mod resolver;
pub mod token;
pub mod types;
pub mod values;

use serde::Serialize;
use std::fs;
use std::time::Instant;

pub use assets::{AssetCache, DirectoryAssetCache};
pub use cli::EnhancedCli;
pub use codec::TokenCodec;
pub use config::{ColorEncoding, DecodeConfig, EncodeConfig, FileEncoding, MeasurementEncoding};
pub use converter::{DimensionConverter, DurationConverter, UnitConverter};
pub use error::{
    DecodeError, EncodeError, EvaluationError, ExpressionParseError, PathError, ResolutionError, Result,
    TokenError,
};
pub use evaluator::{ArithmeticEvaluator, DimensionEvaluator, ExpressionEngineEvaluator, FormulaEvaluator};
pub use expression::{ArithmeticOperation, DimensionExpression, ExpressionElement};
pub use measurement::{DimensionConstant, DimensionUnit, DurationUnit, DurationValue, Measurement};
pub use path::TokenPath;
pub use processor::{
    CombineProcessor, DimensionEvaluationProcessor, FileCachingProcessor, FlattenProcessor, KeyStyle,
    ResolveAliasesProcessor, SkipKeysProcessor, TokenProcessor, UnitConversionProcessor,
};
pub use resolver::{resolve_aliases, AliasResolver};
pub use token::Token;
pub use types::TokenType;
pub use values::TokenValue;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Backend used to evaluate dimension expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluatorKind {
    Arithmetic,
    ExpressionEngine,
}

/// Compilation options and settings
#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub decode: DecodeConfig,
    pub encode: EncodeConfig,

    /// Top-level keys dropped before resolution
    pub skip_keys: Vec<String>,

    /// Target unit for every dimension constant, if any
    pub convert_to: Option<DimensionUnit>,

    /// Pixels per rem for conversion and evaluation
    pub rem_base: f64,

    /// Evaluate expressions after resolution
    pub evaluator: Option<EvaluatorKind>,

    /// Collapse nested groups into dotted keys
    pub flatten: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            decode: DecodeConfig::default(),
            encode: EncodeConfig::default(),
            skip_keys: Vec::new(),
            convert_to: None,
            rem_base: DimensionConverter::DEFAULT_REM_BASE,
            evaluator: None,
            flatten: false,
        }
    }
}

/// Compilation statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct CompilationStats {
    /// Number of input documents
    pub input_count: usize,

    /// Combined input size in bytes
    pub source_size: u64,

    /// Encoded output size in bytes
    pub output_size: u64,

    /// Leaves in the merged input tree
    pub token_count: usize,

    /// Alias leaves before resolution
    pub alias_count: usize,

    /// Dimension expressions before evaluation
    pub expression_count: usize,

    /// Values kept verbatim because they could not be decoded
    pub unknown_count: usize,

    /// Wall time in milliseconds
    pub compile_time_ms: u64,
}

impl CompilationStats {
    fn count(&mut self, token: &Token) {
        match token {
            Token::Group(group) => group.values().for_each(|child| self.count(child)),
            Token::Array(entries) => entries.iter().for_each(|entry| self.count(entry)),
            Token::Alias(_) => {
                self.token_count += 1;
                self.alias_count += 1;
            }
            Token::Unknown(_) => {
                self.token_count += 1;
                self.unknown_count += 1;
            }
            Token::Value(value) => {
                self.token_count += 1;
                if matches!(value, TokenValue::Dimension(values::DimensionValue::Expression(_))) {
                    self.expression_count += 1;
                }
            }
        }
    }
}

/// Assemble the processor chain `options` asks for.
pub fn build_pipeline(options: &CompileOptions) -> Result<CombineProcessor> {
    if !(options.rem_base.is_finite() && options.rem_base > 0.0) {
        return Err(TokenError::invalid_format(format!(
            "rem base must be a positive number, got {}",
            options.rem_base
        )));
    }
    let converter = DimensionConverter::with_rem_base(options.rem_base);
    let base_unit = options.convert_to.unwrap_or(DimensionUnit::DEFAULT);

    let mut pipeline = CombineProcessor::default();
    if !options.skip_keys.is_empty() {
        pipeline = pipeline.then(SkipKeysProcessor::new(options.skip_keys.iter().cloned()));
    }
    pipeline = pipeline.then(ResolveAliasesProcessor);
    if let Some(target) = options.convert_to {
        pipeline = pipeline.then(UnitConversionProcessor::new(target).with_converter(converter));
    }
    match options.evaluator {
        Some(EvaluatorKind::Arithmetic) => {
            let evaluator = DimensionEvaluator::arithmetic()
                .with_base_unit(base_unit)
                .with_converter(converter);
            pipeline = pipeline.then(DimensionEvaluationProcessor::new(evaluator));
        }
        Some(EvaluatorKind::ExpressionEngine) => {
            let evaluator = DimensionEvaluator::expression_engine()?
                .with_base_unit(base_unit)
                .with_converter(converter);
            pipeline = pipeline.then(DimensionEvaluationProcessor::new(evaluator));
        }
        None => {}
    }
    if options.flatten {
        pipeline = pipeline.then(FlattenProcessor::default());
    }
    Ok(pipeline)
}

/// Parse and decode one JSON document.
pub fn decode_document(source: &str, config: &DecodeConfig) -> Result<Token> {
    let json: serde_json::Value = serde_json::from_str(source)
        .map_err(|e| TokenError::invalid_format(format!("Invalid JSON: {}", e)))?;
    Ok(Token::decode(&json, config)?)
}

/// Compile a single document with default options
pub fn compile_source(source: &str) -> Result<String> {
    let (output, _stats) = compile_sources_with_options(&[source], &CompileOptions::default())?;
    Ok(output)
}

/// Compile one or more documents, merged in order, into pretty JSON.
pub fn compile_sources_with_options(
    sources: &[&str],
    options: &CompileOptions,
) -> Result<(String, CompilationStats)> {
    let start_time = Instant::now();
    let mut stats = CompilationStats {
        input_count: sources.len(),
        source_size: sources.iter().map(|s| s.len() as u64).sum(),
        ..Default::default()
    };

    let mut merged: Option<Token> = None;
    for source in sources {
        let document = decode_document(source, &options.decode)?;
        merged = Some(match merged {
            Some(base) => base.deep_merge(document, &mut token::overlay_leaves)?,
            None => document,
        });
    }
    let root = merged.ok_or_else(|| TokenError::invalid_format("No input documents"))?;
    stats.count(&root);
    log::debug!("Decoded {} tokens from {} documents", stats.token_count, stats.input_count);

    let processed = build_pipeline(options)?.process(root)?;
    let encoded = processed.encode(&options.encode)?;
    let output = serde_json::to_string_pretty(&encoded)
        .map_err(|e| TokenError::invalid_format(format!("JSON serialization error: {}", e)))?;

    stats.output_size = output.len() as u64;
    stats.compile_time_ms = start_time.elapsed().as_millis() as u64;
    log::info!(
        "Compiled {} tokens ({} aliases, {} expressions) in {}ms",
        stats.token_count,
        stats.alias_count,
        stats.expression_count,
        stats.compile_time_ms
    );
    Ok((output, stats))
}

/// Read and compile token files, merged in the order given.
pub fn compile_files_with_options(
    input_paths: &[String],
    options: &CompileOptions,
) -> Result<(String, CompilationStats)> {
    let sources = input_paths
        .iter()
        .map(|path| {
            fs::read_to_string(path).map_err(|e| TokenError::FileNotFound {
                path: format!("{}: {}", path, e),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let borrowed: Vec<&str> = sources.iter().map(String::as_str).collect();
    compile_sources_with_options(&borrowed, options)
}
