//! `fbmerge` CLI -- merge occurrences into free/busy blocks and publish calendars.
//!
//! ## Usage
//!
//! ```sh
//! # Merge a JSON array of occurrences (stdin → stdout)
//! echo '[{"start":10,"end":20,"subject":"A","status":2}]' | fbmerge merge
//!
//! # Merge from file to file, joining subjects with " / "
//! fbmerge merge -i occurrences.json -o blocks.json --separator " / "
//!
//! # Free slots between the merged blocks inside a window
//! fbmerge free -i occurrences.json --start 2026-03-02T08:00:00Z --end 2026-03-02T17:00:00Z
//!
//! # Publish every account of a calendar document
//! fbmerge publish -i calendar.json --start 2026-03-02T00:00:00Z --end 2026-03-09T00:00:00Z
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `warn`).
//! `-v` overrides it with `debug`.

mod config;

use std::collections::BTreeMap;
use std::io::{self, Read};
use std::process;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use freebusy_engine::{
    first_free_slot, free_slots, merge, Account, BusyStatus, CalendarItem, FreeBusyPublisher,
    MemorySink, MemoryStore, MergedInterval, Occurrence, PublishReport, RRuleExpander, TimeWindow,
};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use config::Config;

#[derive(Parser)]
#[command(
    name = "fbmerge",
    version,
    about = "Free/busy merging and publishing CLI"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON configuration file
    #[arg(long, global = true, env = "FBMERGE_CONFIG")]
    config: Option<String>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge a JSON array of occurrences into busy blocks
    Merge {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Separator used to join the subjects of one block
        #[arg(long)]
        separator: Option<String>,
    },
    /// List free slots between merged blocks inside a window
    Free {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Window start (epoch seconds or RFC 3339)
        #[arg(long)]
        start: String,
        /// Window end (epoch seconds or RFC 3339)
        #[arg(long)]
        end: String,
        /// Only print the first slot at least this many minutes long
        #[arg(long)]
        min_minutes: Option<i64>,
    },
    /// Publish free/busy blocks for every account of a calendar document
    Publish {
        /// Calendar document (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Window start (defaults to now minus the configured lookback)
        #[arg(long, requires = "end")]
        start: Option<String>,
        /// Window end
        #[arg(long, requires = "start")]
        end: Option<String>,
    },
}

/// Input of `fbmerge publish`.
#[derive(Deserialize)]
struct CalendarDocument {
    accounts: Vec<AccountDocument>,
    /// Users that have a free/busy provider.
    #[serde(default)]
    providers: Vec<String>,
}

#[derive(Deserialize)]
struct AccountDocument {
    user: String,
    calendar: String,
    #[serde(default)]
    items: Vec<CalendarItem>,
}

#[derive(Serialize)]
struct IntervalDto<'a> {
    start: i64,
    end: i64,
    status: BusyStatus,
    subjects: &'a [String],
    subject: String,
}

impl<'a> IntervalDto<'a> {
    fn new(interval: &'a MergedInterval, separator: &str) -> Self {
        Self {
            start: interval.start,
            end: interval.end,
            status: interval.status,
            subjects: &interval.subjects,
            subject: interval.joined_subjects(separator),
        }
    }
}

#[derive(Serialize)]
struct PublishOutput<'a> {
    window: TimeWindow,
    report: &'a PublishReport,
    published: BTreeMap<&'a str, Vec<IntervalDto<'a>>>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Merge {
            input,
            output,
            separator,
        } => {
            let occurrences = read_occurrences(input.as_deref())?;
            let blocks = merge(&occurrences);
            tracing::debug!(
                occurrences = occurrences.len(),
                blocks = blocks.len(),
                "merged"
            );

            let separator = separator.as_deref().unwrap_or(&config.subject_separator);
            let dtos: Vec<IntervalDto> = blocks
                .iter()
                .map(|b| IntervalDto::new(b, separator))
                .collect();
            let json = serde_json::to_string_pretty(&dtos)?;
            write_output(output.as_deref(), &json)?;
        }
        Commands::Free {
            input,
            start,
            end,
            min_minutes,
        } => {
            let occurrences = read_occurrences(input.as_deref())?;
            let window = TimeWindow::new(parse_timestamp(&start)?, parse_timestamp(&end)?)
                .context("Invalid window")?;
            let blocks = merge(&occurrences);

            let json = match min_minutes {
                Some(min) => serde_json::to_string_pretty(&first_free_slot(&blocks, &window, min))?,
                None => serde_json::to_string_pretty(&free_slots(&blocks, &window))?,
            };
            write_output(None, &json)?;
        }
        Commands::Publish {
            input,
            output,
            start,
            end,
        } => {
            let raw = read_input(input.as_deref())?;
            let document: CalendarDocument =
                serde_json::from_str(&raw).context("Failed to parse calendar document")?;

            let window = match (start, end) {
                (Some(start), Some(end)) => {
                    TimeWindow::new(parse_timestamp(&start)?, parse_timestamp(&end)?)
                        .context("Invalid window")?
                }
                _ => config.window(Utc::now()),
            };

            let mut store = MemoryStore::new();
            let mut accounts = Vec::with_capacity(document.accounts.len());
            for account in &document.accounts {
                store.create_folder(&account.calendar);
                for item in &account.items {
                    store.insert_item(&account.calendar, item);
                }
                accounts.push(Account::new(account.user.clone(), account.calendar.clone()));
            }

            let expander = RRuleExpander {
                max_instances: config.max_instances,
            };
            let mut sink = MemorySink::with_providers(document.providers);
            let report =
                FreeBusyPublisher::new(&store, &expander).publish_all(&accounts, &window, &mut sink);

            let published = sink
                .all_published()
                .iter()
                .map(|(user, fb)| {
                    let blocks = fb
                        .blocks
                        .iter()
                        .map(|b| IntervalDto::new(b, &config.subject_separator))
                        .collect();
                    (user.as_str(), blocks)
                })
                .collect();
            let json = serde_json::to_string_pretty(&PublishOutput {
                window,
                report: &report,
                published,
            })?;
            write_output(output.as_deref(), &json)?;

            if !report.failed.is_empty() {
                process::exit(1);
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Parse a timestamp given as epoch seconds or as an RFC 3339 datetime.
fn parse_timestamp(raw: &str) -> Result<i64> {
    let raw = raw.trim();
    if let Ok(secs) = raw.parse::<i64>() {
        return Ok(secs);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.timestamp())
        .with_context(|| format!("Invalid timestamp: '{}'", raw))
}

fn read_occurrences(path: Option<&str>) -> Result<Vec<Occurrence>> {
    let raw = read_input(path)?;
    serde_json::from_str(&raw).context("Failed to parse occurrences JSON")
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
