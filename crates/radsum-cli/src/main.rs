use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use radsum_core::classifier::OpenAiClassifier;
use radsum_core::config_file::{self, ConfigFile, expand_home};
use radsum_core::{Config, DocumentSource, ReportAggregator, RunStatus, export_outcome};
use radsum_ingest::DirectorySource;
use radsum_parsing::{NameExtractor, ReportExtractor};
use radsum_reporting::FileExporter;
use tokio_util::sync::CancellationToken;

mod output;

use output::ColorMode;

const DEFAULT_INPUT_DIR: &str = "~/Documents/MRI_Reports";
const DEFAULT_OUTPUT_DIR: &str = "~/Documents/MRI_Outputs";

/// MRI report summarizer - per-report summary and severity for a folder of PDFs
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize and classify every PDF report in the input folder
    Run(RunArgs),

    /// Extract names and sections without calling the classifier
    DryRun {
        /// Folder containing PDF reports
        #[arg(long)]
        input: Option<PathBuf>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Folder containing PDF reports
    #[arg(long)]
    input: Option<PathBuf>,

    /// Existing folder for the CSV and JSON summaries
    #[arg(long)]
    output: Option<PathBuf>,

    /// Classifier model name
    #[arg(long)]
    model: Option<String>,

    /// OpenAI API key
    #[arg(long)]
    api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long)]
    base_url: Option<String>,

    /// Per-report classifier timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Try the next name label when a match is too long to be a name
    #[arg(long)]
    fall_through_long_names: bool,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();
    let file = config_file::load_config();

    match cli.command {
        Command::Run(args) => run(args, &file).await,
        Command::DryRun { input, no_color } => dry_run(input, no_color, &file),
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Resolve a directory: CLI flag > env var > config file > default.
fn resolve_dir(
    flag: Option<PathBuf>,
    env: &str,
    from_file: Option<PathBuf>,
    default: &str,
) -> PathBuf {
    flag.or_else(|| env_var(env).map(|v| expand_home(&v)))
        .or(from_file)
        .unwrap_or_else(|| expand_home(default))
}

/// Build the runtime config: CLI flags > env vars > config file > defaults.
fn resolve_config(args: &RunArgs, file: &ConfigFile) -> Config {
    let mut config = file.to_config();

    if let Some(model) = env_var("RADSUM_MODEL") {
        config.model = model;
    }
    if let Some(key) = env_var("OPENAI_API_KEY") {
        config.api_key = Some(key);
    }
    if let Some(url) = env_var("RADSUM_BASE_URL") {
        config.base_url = url;
    }
    if let Some(secs) = env_var("RADSUM_TIMEOUT").and_then(|v| v.parse().ok()) {
        config.timeout_secs = secs;
    }

    if let Some(ref model) = args.model {
        config.model = model.clone();
    }
    if let Some(ref key) = args.api_key {
        config.api_key = Some(key.clone());
    }
    if let Some(ref url) = args.base_url {
        config.base_url = url.clone();
    }
    if let Some(secs) = args.timeout {
        config.timeout_secs = secs;
    }
    if args.fall_through_long_names {
        config.fall_through_on_long_name = true;
    }
    config
}

async fn run(args: RunArgs, file: &ConfigFile) -> anyhow::Result<()> {
    let config = resolve_config(&args, file);
    config.validate()?;
    let input = resolve_dir(
        args.input.clone(),
        "RADSUM_INPUT_DIR",
        file.input_dir(),
        DEFAULT_INPUT_DIR,
    );
    let output_dir = resolve_dir(
        args.output.clone(),
        "RADSUM_OUTPUT_DIR",
        file.output_dir(),
        DEFAULT_OUTPUT_DIR,
    );
    let color = ColorMode(!args.no_color);
    tracing::debug!(
        ?config,
        input = %input.display(),
        output = %output_dir.display(),
        "resolved configuration"
    );

    if !input.is_dir() {
        anyhow::bail!("Input folder does not exist: {}", input.display());
    }
    if !output_dir.is_dir() {
        anyhow::bail!("Output folder does not exist: {}", output_dir.display());
    }
    let api_key = config.api_key.clone().context(
        "Missing OpenAI API key. Set OPENAI_API_KEY, pass --api-key, or add api_key to the [classifier] config section",
    )?;

    let classifier = OpenAiClassifier::new(api_key, &config.base_url, config.timeout())?;
    let source = DirectorySource::open(&input)?;
    let aggregator = ReportAggregator::new(&classifier, &config);

    let mut writer: Box<dyn Write> = Box::new(std::io::stdout());

    let progress_writer: Arc<Mutex<Box<dyn Write + Send>>> =
        Arc::new(Mutex::new(Box::new(std::io::stdout())));
    let progress_cb = {
        let pw = Arc::clone(&progress_writer);
        move |event: radsum_core::ProgressEvent| {
            if let Ok(mut w) = pw.lock() {
                let _ = output::print_progress(&mut *w, &event, color);
                let _ = w.flush();
            }
        }
    };

    let cancel = CancellationToken::new();

    // Set up Ctrl+C handler
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_clone.cancel();
        }
    });

    let outcome = aggregator.run(&source, progress_cb, &cancel).await?;

    match outcome.status() {
        RunStatus::NoDocuments => {
            writeln!(writer, "No PDF files found in {}.", input.display())?;
            return Ok(());
        }
        RunStatus::NoRecords => {
            writeln!(writer, "\nNo reports produced valid summaries.")?;
            return Ok(());
        }
        RunStatus::Completed => {}
    }

    output::print_table(&mut *writer, &outcome, color)?;

    let exporter = FileExporter::new(&output_dir);
    match export_outcome(&outcome, &exporter) {
        Ok(Some(summary)) => output::print_export(&mut *writer, &summary, color)?,
        Ok(None) => {}
        Err(e) => anyhow::bail!("Error saving CSV/JSON: {}", e),
    }

    Ok(())
}

fn dry_run(input: Option<PathBuf>, no_color: bool, file: &ConfigFile) -> anyhow::Result<()> {
    use owo_colors::OwoColorize;

    let input = resolve_dir(input, "RADSUM_INPUT_DIR", file.input_dir(), DEFAULT_INPUT_DIR);
    if !input.is_dir() {
        anyhow::bail!("Input folder does not exist: {}", input.display());
    }
    let color = ColorMode(!no_color);
    let fall_through = file.to_config().fall_through_on_long_name;
    let extractor = ReportExtractor::new()
        .with_name_extractor(NameExtractor::new().with_fall_through(fall_through));

    let source = DirectorySource::open(&input)?;
    let ids = source.list()?;
    let mut writer = std::io::stdout();

    if color.enabled() {
        writeln!(
            writer,
            "{} {} ({} PDF files)\n",
            "DRY RUN:".bold().cyan(),
            input.display().bold(),
            ids.len()
        )?;
    } else {
        writeln!(writer, "DRY RUN: {} ({} PDF files)\n", input.display(), ids.len())?;
    }

    for (index, id) in ids.iter().enumerate() {
        match source.read(id) {
            Ok(doc) => {
                let report = extractor.extract(&doc.text);
                output::print_dry_run_entry(&mut writer, index, ids.len(), id, &report, color)?;
            }
            Err(e) => {
                writeln!(writer, "[{}/{}] {}", index + 1, ids.len(), id)?;
                writeln!(writer, "  Error reading PDF: {}\n", e)?;
            }
        }
    }

    writeln!(writer, "Total: {} reports", ids.len())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use radsum_core::config_file::ClassifierConfig;

    fn args(extra: &[&str]) -> RunArgs {
        let mut argv = vec!["radsum", "run"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Command::Run(a) => a,
            Command::DryRun { .. } => unreachable!(),
        }
    }

    #[test]
    fn cli_flags_override_file_values() {
        let file = ConfigFile {
            classifier: Some(ClassifierConfig {
                model: Some("file-model".into()),
                timeout_secs: Some(10),
                ..Default::default()
            }),
            ..Default::default()
        };
        let config = resolve_config(
            &args(&["--model", "flag-model", "--fall-through-long-names"]),
            &file,
        );
        assert_eq!(config.model, "flag-model");
        assert!(config.fall_through_on_long_name);
        if std::env::var("RADSUM_TIMEOUT").is_err() {
            assert_eq!(config.timeout_secs, 10);
        }
    }

    #[test]
    fn zero_timeout_flag_is_rejected() {
        let config = resolve_config(&args(&["--timeout", "0"]), &ConfigFile::default());
        assert_eq!(config.timeout_secs, 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn resolve_dir_prefers_flag() {
        let dir = resolve_dir(
            Some(PathBuf::from("/flag")),
            "RADSUM_TEST_UNSET_DIR",
            Some(PathBuf::from("/file")),
            "/default",
        );
        assert_eq!(dir, PathBuf::from("/flag"));

        let dir = resolve_dir(None, "RADSUM_TEST_UNSET_DIR", None, "/default");
        assert_eq!(dir, PathBuf::from("/default"));
    }

    #[test]
    fn dry_run_subcommand_parses() {
        let cli = Cli::parse_from(["radsum", "dry-run", "--input", "/x", "--no-color"]);
        assert!(matches!(
            cli.command,
            Command::DryRun { input: Some(ref p), no_color: true } if p == &PathBuf::from("/x")
        ));
    }
}
