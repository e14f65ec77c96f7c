//! bibleurl CLI - daily Bible reading plan links
//!
//! Prints the BibleGateway link for a day of the reading plan, or fetches the
//! passage and saves it as Markdown.

use bibleurl::args::{parse_day, parse_version};
use bibleurl::paths::validate_log_folder;
use bibleurl::sanitize::osc8_hyperlink;
use bibleurl::url::{validate_base_url, ALLOWED_HOSTS};
use bibleurl::{
    ConvertOptions, DailyReading, PassageFetcher, PlanConfig, ReadingPlan, PARSE_FALLBACK_MESSAGE,
};
use chrono::{NaiveDate, Utc};
use clap::Parser;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};

/// Daily Bible reading plan links and Markdown passages
#[derive(Parser)]
#[command(
    name = "bibleurl",
    about = "Print the BibleGateway link for a day of the reading plan",
    long_about = "bibleurl - daily Bible reading plan.\n\n\
                  Each day covers Old Testament, Gospel and Acts-through-Revelation\n\
                  chapters; every track starts over when it runs out.\n\n\
                  Usage:\n  \
                  bibleurl 1                  Link for day 1\n  \
                  bibleurl 42 --version ESV   Link in another translation\n  \
                  bibleurl 365 --markdown     Save the passage as Markdown"
)]
struct Cli {
    /// Day of the reading plan (1 or more)
    #[arg(value_parser = parse_day)]
    day: u64,

    /// Bible version code, e.g. NIV, ESV, KJV (default: from configuration)
    #[arg(long, value_parser = parse_version)]
    version: Option<String>,

    /// Fetch the passage and save it as Markdown in the log folder
    #[arg(short, long, conflicts_with = "json")]
    markdown: bool,

    /// Print the reading as JSON
    #[arg(long)]
    json: bool,

    /// JSON configuration file
    #[arg(long, env = "BIBLEURL_CONFIG")]
    config: Option<PathBuf>,

    /// Leave footnotes out of saved Markdown
    #[arg(long, requires = "markdown")]
    no_footnotes: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(e.exit_code());
    }
}

/// `RUST_LOG` takes precedence over `-v`.
fn init_logging(verbose: u8) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level(verbose)))
        .init();
}

fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

async fn run(cli: Cli) -> bibleurl::Result<()> {
    let config = PlanConfig::load(cli.config.as_deref())?;
    let plan = ReadingPlan::new(config)?;
    let reading = match &cli.version {
        Some(version) => plan.reading_in(cli.day, version)?,
        None => plan.reading(cli.day)?,
    };
    log::info!("day {}: {}", reading.day, reading.search);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reading)?);
    } else if cli.markdown {
        let mut options = ConvertOptions::default();
        if cli.no_footnotes {
            options = options.without_footnotes();
        }
        let path = save_passage(&reading, plan.config(), options).await?;
        println!("Saved to {}", path.display());
    } else {
        println!("{}", osc8_hyperlink(&reading.url));
    }
    Ok(())
}

async fn save_passage(
    reading: &DailyReading,
    config: &PlanConfig,
    options: ConvertOptions,
) -> bibleurl::Result<PathBuf> {
    validate_base_url(&config.base_url, ALLOWED_HOSTS)?;
    let log_dir = validate_log_folder(&config.log_folder, &std::env::current_dir()?)?;
    let fetcher = PassageFetcher::new()?.with_convert_options(options);

    let pb = create_spinner(&format!("Fetching {}...", reading.search));
    let fetched = fetcher.fetch_markdown(&reading.url).await;
    pb.finish_and_clear();
    let markdown = fetched?;

    if markdown == PARSE_FALLBACK_MESSAGE {
        eprintln!(
            "{} Could not extract passage text from the fetched page. The page structure may have changed.",
            "Warning:".yellow().bold()
        );
    }

    write_markdown(&log_dir, reading.day, run_date(), &markdown)
}

/// Files are named by the UTC calendar date.
fn run_date() -> NaiveDate {
    Utc::now().date_naive()
}

/// Writes `YYYY-MM-DD-day-N.md` into `dir`, creating the folder if needed.
fn write_markdown(dir: &Path, day: u64, date: NaiveDate, markdown: &str) -> bibleurl::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(output_file_name(date, day));
    fs::write(&path, markdown)?;
    log::debug!("wrote {} bytes to {}", markdown.len(), path.display());
    Ok(path)
}

fn output_file_name(date: NaiveDate, day: u64) -> String {
    format!("{}-day-{day}.md", date.format("%Y-%m-%d"))
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template("{spinner:.blue} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
