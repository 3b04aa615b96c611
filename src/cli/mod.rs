//! Command-line interface for otel-transform.
//!
//! Reads a JSON metrics batch, applies the configured statements and writes
//! the transformed batch back out:
//!
//! ```text
//! otel-transform --statement 'set(metric.unit, "ms")' < batch.json > out.json
//! ```

use crate::core::config::ConfigBuilder;
use crate::core::{Config, LoggingConfig, Result, TransformError};
use crate::model::MetricsBatch;
use crate::transform::TransformProcessor;
use clap::Parser;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Apply transform statements to OpenTelemetry metrics
#[derive(Parser, Debug)]
#[command(name = "otel-transform")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (default: ~/.config/otel-transform/config.yaml)
    #[arg(short, long, env = "OTEL_TRANSFORM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Statement to apply; repeat for more. Replaces the statements from the config file
    #[arg(short, long = "statement", value_name = "STATEMENT")]
    pub statements: Vec<String>,

    /// JSON metrics batch to read, `-` for stdin
    #[arg(short, long, default_value = "-")]
    pub input: PathBuf,

    /// Where to write the transformed batch (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, env = "OTEL_TRANSFORM_DEBUG")]
    pub debug: bool,

    /// Compile the statements and exit
    #[arg(long)]
    pub check_config: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Config file to load: the explicit one, or the default location if it exists
    pub fn config_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config {
            return Some(path.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join("otel-transform").join("config.yaml"))
            .filter(|path| path.exists())
    }

    /// Load configuration with proper precedence:
    /// 1. CLI arguments (highest priority)
    /// 2. Config file
    /// 3. Defaults (lowest priority)
    pub fn load_config(&self) -> Result<Config> {
        let mut builder = ConfigBuilder::new();

        if let Some(path) = self.config_path() {
            let content = std::fs::read_to_string(&path).map_err(|e| {
                TransformError::config(format!("Failed to read config file {:?}: {}", path, e))
            })?;
            builder = builder.from_yaml(&content)?;
        }

        self.build_config_from_args(builder)
    }

    fn build_config_from_args(&self, mut builder: ConfigBuilder) -> Result<Config> {
        if !self.statements.is_empty() {
            builder = builder.statements(self.statements.iter().cloned());
        }
        builder.debug(self.debug).build()
    }

    /// Initialize logging. Logs go to stderr; stdout carries the batch.
    pub fn init_logging(&self, logging: &LoggingConfig) -> Result<()> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

        let level = if self.debug {
            "debug".to_string()
        } else {
            std::env::var("OTEL_TRANSFORM_LOG_LEVEL").unwrap_or_else(|_| logging.level.as_str().to_string())
        };

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

        let fmt_layer = if logging.structured {
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true)
                .compact()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .compact()
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TransformError::config(format!("Failed to initialize logging: {}", e)))?;

        Ok(())
    }
}

/// Execute the otel-transform command.
pub fn execute(cli: Cli) -> Result<()> {
    let config = cli.load_config()?;
    cli.init_logging(&config.logging)?;
    if let Some(path) = cli.config_path() {
        info!("Loaded configuration from: {:?}", path);
    }

    let processor = TransformProcessor::from_config(&config)?;

    if cli.check_config {
        println!("Configuration is valid!");
        println!("  Statements: {}", processor.len());
        for statement in processor.statements() {
            println!("    [{:?}] {}", statement.unit(), statement.source());
        }
        println!("  Mismatch policy: {:?}", config.transform.mismatch_policy);
        return Ok(());
    }

    let mut batch = read_batch(&cli.input)?;
    debug!(
        metrics = batch.metric_count(),
        data_points = batch.data_point_count(),
        "Read metrics batch"
    );

    let stats = processor.process(&mut batch);
    info!(
        applied = stats.applied,
        skipped = stats.skipped,
        emitted_metrics = stats.emitted_metrics,
        "Transformed metrics batch"
    );

    write_batch(&batch, cli.output.as_deref())
}

fn read_batch(input: &Path) -> Result<MetricsBatch> {
    let reader: Box<dyn Read> = if input == Path::new("-") {
        Box::new(io::stdin().lock())
    } else {
        Box::new(File::open(input)?)
    };
    Ok(serde_json::from_reader(BufReader::new(reader))?)
}

fn write_batch(batch: &MetricsBatch, output: Option<&Path>) -> Result<()> {
    let writer: Box<dyn Write> = match output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout().lock()),
    };
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer_pretty(&mut writer, batch)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
