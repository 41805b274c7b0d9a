// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use mdtranslate::app_config::{self, Config};
use mdtranslate::app_controller::{Controller, RunMode};
use mdtranslate::file_utils::FileManager;

/// Log file opened once the configuration is known
static LOG_FILE: OnceCell<Mutex<File>> = OnceCell::new();

/// CLI Wrapper for RunMode to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliMode {
    /// Grow the terminology glossary from the input
    Extract,
    /// Translate the input into the output directory
    Translate,
}

impl From<CliMode> for RunMode {
    fn from(mode: CliMode) -> Self {
        match mode {
            CliMode::Extract => RunMode::Extract,
            CliMode::Translate => RunMode::Translate,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for mdtranslate
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// mdtranslate - English to Chinese Markdown translation with LLMs
///
/// Translates technical Markdown documents through a translate, review and
/// polish pipeline while keeping a persistent terminology glossary.
#[derive(Parser, Debug)]
#[command(name = "mdtranslate")]
#[command(version)]
#[command(about = "LLM-powered English to Chinese Markdown translator")]
#[command(long_about = "mdtranslate splits Markdown documents into units, leaves fenced code untouched and \
translates prose through translate, review and polish passes.

EXAMPLES:
    mdtranslate -i book/ -m extract                 # Build the glossary from a directory
    mdtranslate -i book/ -o book-zh/ -m translate   # Translate a directory tree
    mdtranslate -i ch1.md -o out/ -m translate      # Translate a single file
    mdtranslate -i ch1.md -m extract -t terms.csv   # Use a specific glossary file
    mdtranslate completions bash > mdtranslate.bash # Generate bash completions

CONFIGURATION:
    Configuration is stored in mdtranslate.json by default and created when missing.
    DEEPSEEK_API_KEY, DEEPSEEK_API_BASE, MODEL_NAME, REASONER_MODEL_NAME and MAX_TOKENS
    override the file.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input Markdown file or directory
    #[arg(short, long = "input", value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Output directory, required for translation
    #[arg(short, long = "output", value_name = "OUTPUT_DIR")]
    output_path: Option<PathBuf>,

    /// What to do with the input
    #[arg(short, long, value_enum)]
    mode: Option<CliMode>,

    /// Glossary CSV file, overrides the configured one
    #[arg(short, long = "terminology", value_name = "CSV_FILE")]
    terminology: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long = "config", default_value = "mdtranslate.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// Validated arguments of a translation or extraction run
#[derive(Debug)]
struct RunArgs {
    input_path: PathBuf,
    output_path: Option<PathBuf>,
    mode: RunMode,
    terminology: Option<PathBuf>,
    config_path: String,
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger, filtered through log::max_level
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @opens: Log file that receives a plain copy of every record
    fn attach_file(path: &Path) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;
        let _ = LOG_FILE.set(Mutex::new(file));
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let now = chrono::Local::now();
        let mut stderr = std::io::stderr();
        let _ = writeln!(
            stderr,
            "\x1B[{}m{} {:<5} {}\x1B[0m",
            Self::color_for_level(record.level()),
            now.format("%H:%M:%S%.3f"),
            record.level(),
            record.args()
        );

        if let Some(file) = LOG_FILE.get() {
            let _ = writeln!(
                file.lock(),
                "{} - {} - {} - {}",
                now.format("%Y-%m-%d %H:%M:%S%.3f"),
                record.target(),
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
        if let Some(file) = LOG_FILE.get() {
            let _ = file.lock().flush();
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = CustomLogger::init(LevelFilter::Info) {
        eprintln!("Failed to initialize logger: {}", e);
    }

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "mdtranslate", &mut std::io::stdout());
        return;
    }

    let args = validate_args(cli);

    tokio::select! {
        result = run(args) => {
            if let Err(e) = result {
                error!("Error during processing: {:#}", e);
                log::logger().flush();
                std::process::exit(1);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted");
            log::logger().flush();
            std::process::exit(0);
        }
    }
}

/// Check argument combinations clap cannot express, exiting with a usage error
fn validate_args(cli: CommandLineOptions) -> RunArgs {
    let mut cmd = CommandLineOptions::command();

    let Some(input_path) = cli.input_path else {
        cmd.error(ErrorKind::MissingRequiredArgument, "--input <INPUT_PATH> is required").exit();
    };
    let Some(mode) = cli.mode else {
        cmd.error(ErrorKind::MissingRequiredArgument, "--mode <MODE> is required").exit();
    };
    if matches!(mode, CliMode::Translate) && cli.output_path.is_none() {
        cmd.error(
            ErrorKind::MissingRequiredArgument,
            "--output <OUTPUT_DIR> is required in translate mode",
        )
        .exit();
    }

    RunArgs {
        input_path,
        output_path: cli.output_path,
        mode: mode.into(),
        terminology: cli.terminology,
        config_path: cli.config_path,
        log_level: cli.log_level,
    }
}

async fn run(args: RunArgs) -> Result<()> {
    if let Some(cli_level) = &args.log_level {
        let level: app_config::LogLevel = cli_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&args.config_path)?;
    config.apply_env_overrides()?;
    if let Some(cli_level) = args.log_level {
        config.log_level = cli_level.into();
    }
    log::set_max_level(config.log_level.to_level_filter());

    if !config.log_file.is_empty() {
        if let Err(e) = CustomLogger::attach_file(Path::new(&config.log_file)) {
            warn!("{:#}", e);
        }
    }

    config.validate().context("Invalid configuration")?;

    let input_path = FileManager::absolute(&args.input_path)?;
    if !input_path.exists() {
        return Err(anyhow::anyhow!("Input path does not exist: {}", input_path.display()));
    }
    let output_path = args.output_path.as_ref().map(FileManager::absolute).transpose()?;

    let input_root = if FileManager::dir_exists(&input_path) {
        input_path.clone()
    } else {
        input_path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."))
    };

    let glossary_path = config.resolve_glossary_path(args.terminology.as_deref());
    info!("Using glossary {}", glossary_path.display());

    let controller = Controller::with_config(&config, &glossary_path, input_root, output_path);
    controller.run(&input_path, args.mode).await?;

    info!("Done");
    Ok(())
}
