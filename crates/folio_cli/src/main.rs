use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use folio_extract::{build_markdown_document, save_article, ContentExtractor, ExtractorSettings};
use folio_logging::{folio_error, LogDestination};
use log::LevelFilter;

/// Extract the readable article from a web page as Markdown
#[derive(Parser, Debug)]
#[command(name = "folio-extract", version)]
struct Args {
    /// http or https URL of the page
    #[arg(value_name = "URL")]
    url: String,

    /// Print the extraction result as JSON instead of Markdown
    #[arg(long, conflicts_with = "output_dir")]
    json: bool,

    /// Write `{title}--{hash}.md` into this directory instead of stdout
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Total budget for fetch and extraction
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// Log level: off, error, warn, info, debug, trace
    #[arg(long, default_value = "warn", value_name = "LEVEL")]
    log_level: LevelFilter,

    /// Also write logs to this file
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

impl Args {
    fn settings(&self) -> ExtractorSettings {
        let mut settings = ExtractorSettings::default();
        if let Some(secs) = self.timeout_secs {
            settings.total_timeout = Duration::from_secs(secs);
        }
        settings
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    match &args.log_file {
        Some(path) => folio_logging::initialize(LogDestination::Both, args.log_level, path),
        None => folio_logging::initialize(LogDestination::Terminal, args.log_level, &PathBuf::new()),
    }

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            folio_error!("cli_failed url={} error={:#}", args.url, err);
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> anyhow::Result<()> {
    let extractor = ContentExtractor::new(args.settings());
    let result = extractor
        .extract(&args.url)
        .await
        .with_context(|| format!("could not extract {}", args.url))?;

    if let Some(dir) = &args.output_dir {
        let path = save_article(dir, &args.url, &result)
            .with_context(|| format!("could not save article into {}", dir.display()))?;
        println!("{}", path.display());
    } else if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", build_markdown_document(&args.url, &result));
    }
    Ok(())
}
