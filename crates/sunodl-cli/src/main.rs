use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dialoguer::MultiSelect;

use sunodl_acquire::SunoClient;
use sunodl_model::item::{OutputKind, WorkItem};
use sunodl_model::layout::OutputLayout;
use sunodl_run::{read_url_list, Coordinator};

#[derive(Parser)]
#[command(name = "sunodl")]
#[command(about = "Batch downloader for Suno track page assets")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_HASH"), ")"))]
struct Cli {
    /// File with one track URL per line; blank lines are skipped
    #[arg(short, long, default_value = "suno_urls.txt")]
    urls_file: PathBuf,

    /// Root directory the per-kind output folders are created under
    #[arg(short = 'O', long, default_value = ".")]
    output_dir: PathBuf,

    /// Output kinds to save, comma separated (e.g. "html,audio,lyrics");
    /// prompts interactively when omitted
    #[arg(short, long, value_enum, value_delimiter = ',')]
    kinds: Option<Vec<KindArg>>,

    /// Log level: error, warn, info, debug, trace
    #[arg(long, default_value = "info", value_enum)]
    log_level: LogLevel,

    /// Use UTC timestamps instead of local time
    #[arg(long)]
    utc: bool,
}

#[derive(Clone, clap::ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum KindArg {
    /// Rendered page snapshot
    Html,
    /// Track video (mp4)
    Video,
    /// Track audio (mp3)
    Audio,
    /// Lyrics text
    Lyrics,
    /// Generation prompt text
    Prompt,
    /// Cover image
    Image,
}

impl From<KindArg> for OutputKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Html => OutputKind::Html,
            KindArg::Video => OutputKind::Video,
            KindArg::Audio => OutputKind::Audio,
            KindArg::Lyrics => OutputKind::Lyrics,
            KindArg::Prompt => OutputKind::Prompt,
            KindArg::Image => OutputKind::Image,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Map log level, suppressing noisy HTML-parsing and websocket crates
    // at debug/trace
    let level = match cli.log_level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug,selectors=warn,html5ever=warn,tungstenite=warn",
        LogLevel::Trace => "trace,selectors=warn,html5ever=warn,tungstenite=warn",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // Timestamp format: 2026-02-14 19:44:09.123 -08:00
    let time_format = "%Y-%m-%d %H:%M:%S%.3f %:z";

    if cli.utc {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_timer(tracing_subscriber::fmt::time::ChronoUtc::new(
                time_format.to_string(),
            ))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_timer(tracing_subscriber::fmt::time::ChronoLocal::new(
                time_format.to_string(),
            ))
            .init();
    }

    let urls = read_url_list(&cli.urls_file)?;
    anyhow::ensure!(
        !urls.is_empty(),
        "no URLs found in {}",
        cli.urls_file.display()
    );

    let kinds: Vec<OutputKind> = match cli.kinds {
        Some(args) => args.into_iter().map(OutputKind::from).collect(),
        None => select_kinds()?,
    };
    anyhow::ensure!(!kinds.is_empty(), "no output kinds selected");

    let items: Vec<WorkItem> = urls
        .iter()
        .map(|url| WorkItem::new(url.clone(), &kinds))
        .collect();

    tracing::info!(
        urls = items.len(),
        kinds = kinds.len(),
        output_dir = %cli.output_dir.display(),
        "Starting run"
    );

    let client = SunoClient::new().context("failed to initialize the HTTP client")?;
    let mut coordinator = Coordinator::new(OutputLayout::new(&cli.output_dir));

    let summary = coordinator.run(&client, &items).await?;

    tracing::info!(
        items = summary.items,
        done = summary.done,
        failed = summary.failed,
        files = summary.files_written,
        failures = summary.failures_recorded,
        "Run complete"
    );

    Ok(())
}

/// Interactive fallback when --kinds is not given: multi-select over all
/// output kinds.
fn select_kinds() -> Result<Vec<OutputKind>> {
    let labels: Vec<&str> = OutputKind::ALL.iter().map(|k| k.label()).collect();
    let picked = MultiSelect::new()
        .with_prompt("Select what to extract and save for each URL")
        .items(&labels)
        .interact()
        .context("output kind selection cancelled")?;

    Ok(picked.into_iter().map(|i| OutputKind::ALL[i]).collect())
}
