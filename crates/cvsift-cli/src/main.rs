use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

use cvsift_core::config_file::{self, ConfigFile, ModelConfig};
use cvsift_core::{DocumentFormat, ParseResult};
use cvsift_ingest::ResumeParser;

mod output;

use output::ColorMode;

/// Entity model shipped with the repository, used when nothing else is configured.
const DEFAULT_MODEL_PATH: &str = "models/entity_patterns.jsonl";

/// cvsift - extract name, contact details and skills from PDF/DOCX résumés
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a résumé and print the extracted fields
    Parse {
        /// Path to the PDF or DOCX file
        file_path: PathBuf,

        /// Name the file was uploaded under; its extension decides the format
        #[arg(long)]
        original_name: Option<String>,

        /// Print the result record as JSON
        #[arg(long)]
        json: bool,

        /// Include the per-category skill breakdown
        #[arg(long)]
        categories: bool,

        /// Path to an entity-pattern model (JSON Lines)
        #[arg(long)]
        model: Option<PathBuf>,

        /// Directory of a BERT token-classification model (needs the `bert` feature)
        #[arg(long, value_name = "DIR")]
        bert_model: Option<PathBuf>,

        /// Run without an entity model
        #[arg(long, conflicts_with_all = ["model", "bert_model"])]
        no_model: bool,

        /// Config file to use instead of the default lookup
        #[arg(long)]
        config: Option<PathBuf>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Print the normalized text extracted from a résumé
    Text {
        /// Path to the PDF or DOCX file
        file_path: PathBuf,

        /// Name the file was uploaded under; its extension decides the format
        #[arg(long)]
        original_name: Option<String>,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Parse {
            file_path,
            original_name,
            json,
            categories,
            model,
            bert_model,
            no_model,
            config,
            no_color,
        } => parse(
            &file_path,
            original_name.as_deref(),
            ParseOptions {
                json,
                categories,
                model,
                bert_model,
                no_model,
                config,
                color: ColorMode(!no_color && std::io::stdout().is_terminal()),
            },
        ),
        Command::Text {
            file_path,
            original_name,
        } => text(&file_path, original_name.as_deref()),
    }
}

/// Log to stderr so stdout stays clean for `--json`. `RUST_LOG` overrides
/// the default `warn` level.
fn init_tracing() {
    Registry::default()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();
}

struct ParseOptions {
    json: bool,
    categories: bool,
    model: Option<PathBuf>,
    bert_model: Option<PathBuf>,
    no_model: bool,
    config: Option<PathBuf>,
    color: ColorMode,
}

fn parse(
    file_path: &Path,
    original_name: Option<&str>,
    opts: ParseOptions,
) -> anyhow::Result<ExitCode> {
    let config = resolve_config(
        opts.config.as_deref(),
        opts.model,
        opts.bert_model,
        opts.no_model,
    )?;
    let parser = ResumeParser::init(&config)?;

    let (result, skills) = match parser.analyze_guarded(file_path, original_name) {
        Ok(analysis) => {
            let skills = analysis.fields.skills.clone();
            (analysis.into_parse_result(), Some(skills))
        }
        Err(e) => (ParseResult::failure(&e), None),
    };

    let mut stdout = std::io::stdout().lock();
    let breakdown = if opts.categories { skills.as_ref() } else { None };
    if opts.json {
        output::print_json(&mut stdout, &result, breakdown)?;
    } else {
        let file_name = original_name
            .map(str::to_string)
            .or_else(|| file_path.file_name().map(|n| n.to_string_lossy().to_string()))
            .unwrap_or_else(|| file_path.display().to_string());
        output::print_summary(&mut stdout, &file_name, &result, breakdown, opts.color)?;
    }
    stdout.flush()?;

    Ok(if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn text(file_path: &Path, original_name: Option<&str>) -> anyhow::Result<ExitCode> {
    if !file_path.exists() {
        anyhow::bail!("File not found: {}", file_path.display());
    }

    let format_source = original_name.map(Path::new).unwrap_or(file_path);
    let Some(format) = DocumentFormat::from_path(format_source) else {
        anyhow::bail!(
            "Unsupported file format: {} (expected .pdf or .docx)",
            format_source.display()
        );
    };

    let parser = ResumeParser::new();
    if !parser.supports(format) {
        anyhow::bail!("{format} support not compiled in");
    }

    let text = parser.extract_text(file_path, format);
    if text.trim().is_empty() {
        eprintln!("No text could be extracted from {}", file_path.display());
        return Ok(ExitCode::FAILURE);
    }

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{text}")?;
    Ok(ExitCode::SUCCESS)
}

/// Resolve configuration: CLI flags > env vars > config file > defaults.
fn resolve_config(
    config_path: Option<&Path>,
    model: Option<PathBuf>,
    bert_model: Option<PathBuf>,
    no_model: bool,
) -> anyhow::Result<ConfigFile> {
    let mut config = match config_path {
        Some(path) => config_file::load_from_path(path)
            .ok_or_else(|| anyhow::anyhow!("Could not load config file: {}", path.display()))?,
        None => config_file::load_config(),
    };

    let model_config = config.model.get_or_insert_with(ModelConfig::default);
    if no_model {
        model_config.disabled = Some(true);
        return Ok(config);
    }

    if let Some(dir) = bert_model
        .or_else(|| std::env::var("CVSIFT_BERT_MODEL_DIR").ok().map(PathBuf::from))
    {
        model_config.bert_dir = Some(dir.display().to_string());
        model_config.disabled = Some(false);
    }

    if let Some(path) = model
        .or_else(|| std::env::var("CVSIFT_MODEL_PATH").ok().map(PathBuf::from))
    {
        model_config.patterns_path = Some(path.display().to_string());
        model_config.disabled = Some(false);
    } else if model_config.patterns_path.is_none() && Path::new(DEFAULT_MODEL_PATH).exists() {
        model_config.patterns_path = Some(DEFAULT_MODEL_PATH.to_string());
    }

    Ok(config)
}
