// FILE: src/cli/mod.rs

mod config;
mod handlers;

use crate::config::{ColorEncoding, FileEncoding, MeasurementEncoding};
use crate::error::{Result, TokenError};
use crate::measurement::DimensionUnit;
use crate::{CompileOptions, EvaluatorKind};
use clap::{Arg, ArgAction, Command, ValueEnum};
use std::time::Instant;
use url::Url;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Evaluator {
    Arithmetic,
    Expression,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TargetUnit {
    Px,
    Rem,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorFormat {
    Default,
    Hex,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MeasurementFormat {
    Object,
    Value,
    ValueWithUnit,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FileFormat {
    Absolute,
    Relative,
}

impl From<Evaluator> for EvaluatorKind {
    fn from(evaluator: Evaluator) -> Self {
        match evaluator {
            Evaluator::Arithmetic => EvaluatorKind::Arithmetic,
            Evaluator::Expression => EvaluatorKind::ExpressionEngine,
        }
    }
}

impl From<TargetUnit> for DimensionUnit {
    fn from(unit: TargetUnit) -> Self {
        match unit {
            TargetUnit::Px => DimensionUnit::Px,
            TargetUnit::Rem => DimensionUnit::Rem,
        }
    }
}

impl From<ColorFormat> for ColorEncoding {
    fn from(format: ColorFormat) -> Self {
        match format {
            ColorFormat::Default => ColorEncoding::Default,
            ColorFormat::Hex => ColorEncoding::Hex,
        }
    }
}

impl From<MeasurementFormat> for MeasurementEncoding {
    fn from(format: MeasurementFormat) -> Self {
        match format {
            MeasurementFormat::Object => MeasurementEncoding::Object,
            MeasurementFormat::Value => MeasurementEncoding::Value { with_unit: false },
            MeasurementFormat::ValueWithUnit => MeasurementEncoding::Value { with_unit: true },
        }
    }
}

pub struct EnhancedCli {
    config: config::ConfigFile,
    start_time: Instant,
}

impl Default for EnhancedCli {
    fn default() -> Self {
        Self::new()
    }
}

impl EnhancedCli {
    pub fn new() -> Self {
        Self {
            config: config::ConfigFile::default(),
            start_time: Instant::now(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        self.start_time = Instant::now();
        let matches = self.build_cli().get_matches();

        self.setup_logging(matches.get_count("verbose"))?;

        if let Some(config_path) = matches.get_one::<String>("config") {
            self.config = config::load(config_path)?;
        }

        match matches.subcommand() {
            Some(("resolve", sub_matches)) => handlers::handle_resolve_command(self, sub_matches),
            Some(("check", sub_matches)) => handlers::handle_check_command(self, sub_matches),
            _ => {
                println!("No subcommand specified. Use --help for usage information.");
                Ok(())
            }
        }
    }

    fn build_cli(&self) -> Command {
        Command::new(crate::NAME)
            .version(crate::VERSION)
            .about(crate::DESCRIPTION)
            .author("Tokenc Development Team")
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Configuration file path (.json or .toml)")
                    .action(ArgAction::Set),
            )
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .help("Increase verbosity (can be used multiple times)")
                    .action(ArgAction::Count),
            )
            .subcommand(
                Command::new("resolve")
                    .about("Resolve aliases in token documents and write the result")
                    .arg(Arg::new("input").help("Input token documents, merged in order").required(true).num_args(1..).index(1))
                    .arg(Arg::new("output").short('o').long("output").value_name("FILE").help("Output file (stdout when omitted)"))
                    .arg(Arg::new("evaluate").short('e').long("evaluate").value_parser(clap::value_parser!(Evaluator)).help("Evaluate dimension expressions"))
                    .arg(Arg::new("convert").long("convert").value_parser(clap::value_parser!(TargetUnit)).help("Convert dimensions to one unit"))
                    .arg(Arg::new("color").long("color").value_parser(clap::value_parser!(ColorFormat)).help("Color output format"))
                    .arg(Arg::new("measurement").long("measurement").value_parser(clap::value_parser!(MeasurementFormat)).help("Dimension and duration output format"))
                    .arg(Arg::new("file-format").long("file-format").value_parser(clap::value_parser!(FileFormat)).help("File reference output format"))
                    .arg(Arg::new("file-base").long("file-base").value_name("URL").help("Base URL for relative file references"))
                    .arg(Arg::new("type-map").short('t').long("type-map").value_name("FROM=TO").help("Treat tokens of type FROM as type TO").action(ArgAction::Append))
                    .arg(Arg::new("skip").short('s').long("skip").value_name("KEY").help("Drop a top-level key").action(ArgAction::Append))
                    .arg(Arg::new("flatten").long("flatten").help("Flatten nested groups into dotted keys").action(ArgAction::SetTrue))
                    .arg(Arg::new("stats").long("stats").help("Show compilation statistics").action(ArgAction::SetTrue)),
            )
            .subcommand(
                Command::new("check")
                    .about("Check token documents for decode and alias errors")
                    .arg(Arg::new("input").help("Input token document or directory").required(true).index(1))
                    .arg(Arg::new("recursive").short('r').long("recursive").help("Check all .json files in directory recursively").action(ArgAction::SetTrue)),
            )
    }

    fn setup_logging(&self, verbose_count: u8) -> Result<()> {
        let log_level = match verbose_count {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };
        env_logger::Builder::from_default_env()
            .filter_level(log_level)
            .format_timestamp_secs()
            .init();
        Ok(())
    }

    /// Options from the configuration file alone.
    pub fn config_options(&self) -> Result<CompileOptions> {
        let config = &self.config;
        let mut options = CompileOptions::default();

        for (from, to) in config.custom_types.iter().flatten() {
            options.decode = options.decode.with_custom_type(from.as_str(), to.as_str());
        }
        if let Some(base) = &config.file_base {
            options.decode = options.decode.with_file_base(parse_url(base)?);
        }

        if let Some(color) = configured::<ColorFormat>("color_format", config.color_format.as_deref())? {
            options.encode.color = color.into();
        }
        if let Some(measurement) =
            configured::<MeasurementFormat>("measurement_format", config.measurement_format.as_deref())?
        {
            options.encode.measurement = measurement.into();
        }
        if let Some(FileFormat::Relative) = configured::<FileFormat>("file_format", config.file_format.as_deref())? {
            let base = config.relative_base.as_deref().map(parse_url).transpose()?;
            options.encode.file = FileEncoding::Relative { base };
        }

        options.skip_keys = config.skip_keys.clone().unwrap_or_default();
        if let Some(rem_base) = config.rem_base {
            if !(rem_base.is_finite() && rem_base > 0.0) {
                return Err(TokenError::invalid_format(format!(
                    "Invalid value '{}' for rem_base in config file",
                    rem_base
                )));
            }
            options.rem_base = rem_base;
        }
        options.convert_to = configured::<TargetUnit>("target_unit", config.target_unit.as_deref())?.map(Into::into);
        options.evaluator = configured::<Evaluator>("evaluator", config.evaluator.as_deref())?.map(Into::into);
        options.flatten = config.flatten.unwrap_or(false);
        Ok(options)
    }

    /// Configuration file options overridden by the `resolve` flags.
    pub fn build_compile_options(&self, matches: &clap::ArgMatches) -> Result<CompileOptions> {
        let mut options = self.config_options()?;

        if let Some(mappings) = matches.get_many::<String>("type-map") {
            for mapping in mappings {
                let (from, to) = mapping.split_once('=').ok_or_else(|| {
                    TokenError::invalid_format(format!("Invalid type mapping: {}. Use FROM=TO format.", mapping))
                })?;
                options.decode = options.decode.with_custom_type(from.trim(), to.trim());
            }
        }
        if let Some(base) = matches.get_one::<String>("file-base") {
            options.decode = options.decode.with_file_base(parse_url(base)?);
        }

        if let Some(color) = matches.get_one::<ColorFormat>("color") {
            options.encode.color = (*color).into();
        }
        if let Some(measurement) = matches.get_one::<MeasurementFormat>("measurement") {
            options.encode.measurement = (*measurement).into();
        }
        match matches.get_one::<FileFormat>("file-format") {
            Some(FileFormat::Absolute) => options.encode.file = FileEncoding::Absolute,
            Some(FileFormat::Relative) if options.encode.file == FileEncoding::Absolute => {
                options.encode.file = FileEncoding::Relative { base: None };
            }
            _ => {}
        }

        if let Some(keys) = matches.get_many::<String>("skip") {
            options.skip_keys.extend(keys.cloned());
        }
        if let Some(unit) = matches.get_one::<TargetUnit>("convert") {
            options.convert_to = Some((*unit).into());
        }
        if let Some(evaluator) = matches.get_one::<Evaluator>("evaluate") {
            options.evaluator = Some((*evaluator).into());
        }
        options.flatten |= matches.get_flag("flatten");

        log::debug!("Compile options: {:?}", options);
        Ok(options)
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.start_time.elapsed().as_millis()
    }
}

/// Parse a configuration file string as one of the flag values.
fn configured<T: ValueEnum>(key: &str, raw: Option<&str>) -> Result<Option<T>> {
    raw.map(|raw| {
        T::from_str(raw, true)
            .map_err(|_| TokenError::invalid_format(format!("Invalid value '{}' for {} in config file", raw, key)))
    })
    .transpose()
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| TokenError::invalid_format(format!("Invalid URL '{}': {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_with(config: config::ConfigFile) -> EnhancedCli {
        EnhancedCli {
            config,
            start_time: Instant::now(),
        }
    }

    #[test]
    fn test_config_options() {
        let cli = cli_with(config::ConfigFile {
            rem_base: Some(10.0),
            evaluator: Some("expression".to_string()),
            color_format: Some("hex".to_string()),
            skip_keys: Some(vec!["internal".to_string()]),
            ..Default::default()
        });
        let options = cli.config_options().unwrap();
        assert_eq!(options.rem_base, 10.0);
        assert_eq!(options.evaluator, Some(EvaluatorKind::ExpressionEngine));
        assert_eq!(options.encode.color, ColorEncoding::Hex);
        assert_eq!(options.skip_keys, vec!["internal".to_string()]);
    }

    #[test]
    fn test_config_rejects_bad_values() {
        for rem_base in [0.0, -4.0, f64::INFINITY] {
            let cli = cli_with(config::ConfigFile {
                rem_base: Some(rem_base),
                ..Default::default()
            });
            assert!(matches!(cli.config_options(), Err(TokenError::InvalidFormat { .. })));
        }

        let cli = cli_with(config::ConfigFile {
            evaluator: Some("abacus".to_string()),
            ..Default::default()
        });
        assert!(matches!(cli.config_options(), Err(TokenError::InvalidFormat { .. })));
    }
}
