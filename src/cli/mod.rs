//! Command-line interface for logbuddy.
//!
//! Provides one-shot commands for printing, exporting and listing players
//! from one or more log sources, plus an interactive shell for narrowing
//! a loaded collection step by step.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::config::{self, ResolvedConfig};
use crate::core::{BatchOptions, HearingRange, LogCollection};
use crate::domain::{Category, Entry, Location};
use crate::ingest;

pub mod shell;

/// logbuddy - Game server log parser and filter
#[derive(Parser, Debug)]
#[command(name = "logbuddy")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Show full diagnostics for lines that fail to parse
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only report errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load sources and start an interactive shell
    Shell {
        /// Log files, folders or http(s) logs links
        #[arg(required = true)]
        sources: Vec<String>,
    },

    /// Filter sources and print the result
    Print {
        /// Log files, folders or http(s) logs links
        #[arg(required = true)]
        sources: Vec<String>,

        #[command(flatten)]
        filters: FilterArgs,

        /// Only print the first N entries
        #[arg(long, conflicts_with = "tail")]
        head: Option<usize>,

        /// Only print the last N entries
        #[arg(long)]
        tail: Option<usize>,
    },

    /// Filter sources and write the result to a file
    Export {
        /// Log files, folders or http(s) logs links
        #[arg(required = true)]
        sources: Vec<String>,

        #[command(flatten)]
        filters: FilterArgs,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// List the players seen in the sources
    Who {
        /// Log files, folders or http(s) logs links
        #[arg(required = true)]
        sources: Vec<String>,
    },

    /// Show resolved configuration
    Config,
}

/// Filters shared by the one-shot commands, applied in declaration order
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Keep lines acted by these ckeys (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub ckeys: Vec<String>,

    /// Keep lines containing any of these strings (repeatable)
    #[arg(short = 's', long = "string")]
    pub strings: Vec<String>,

    /// Match --string case-sensitively
    #[arg(long)]
    pub case_sensitive: bool,

    /// Keep lines in this zone
    #[arg(long)]
    pub location: Option<String>,

    /// Center of the --radius filter as X,Y,Z
    #[arg(long, value_parser = parse_location, requires = "radius")]
    pub center: Option<Location>,

    /// Keep lines strictly within this many tiles of --center
    #[arg(long, requires = "center")]
    pub radius: Option<i32>,

    /// Keep only these categories (comma-separated)
    #[arg(long = "category", value_delimiter = ',', value_parser = parse_category)]
    pub categories: Vec<Category>,

    /// Drop these categories (comma-separated)
    #[arg(long = "exclude", value_delimiter = ',', value_parser = parse_category)]
    pub excluded: Vec<Category>,

    /// Keep what this ckey could have perceived
    #[arg(long)]
    pub heard: Option<String>,

    /// Approximate a conversation between these ckeys (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub conversation: Vec<String>,
}

impl FilterArgs {
    /// Narrow `logs` with every filter that was given
    pub fn apply(&self, logs: &mut LogCollection, hearing: &HearingRange) -> Result<()> {
        if !self.ckeys.is_empty() {
            logs.filter_ckeys(&self.ckeys)?;
        }
        if !self.strings.is_empty() {
            logs.filter_strings(&self.strings, self.case_sensitive)?;
        }
        if let Some(location) = &self.location {
            logs.filter_location_name(location)?;
        }
        if let (Some(center), Some(radius)) = (self.center, self.radius) {
            logs.filter_radius(center, radius)?;
        }
        if !self.categories.is_empty() || !self.excluded.is_empty() {
            logs.filter_categories(&self.categories, &self.excluded)?;
        }
        if let Some(ckey) = &self.heard {
            logs.filter_heard(ckey, hearing, None)?;
        }
        if !self.conversation.is_empty() {
            logs.filter_conversation(&self.conversation, hearing)?;
        }
        Ok(())
    }
}

/// Parse `X,Y,Z` (surrounding parentheses allowed)
pub fn parse_location(value: &str) -> Result<Location, String> {
    let inner = value.trim().trim_start_matches('(').trim_end_matches(')');
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [x, y, z] => {
            let coord = |part: &str| {
                part.parse::<i32>()
                    .map_err(|_| format!("Invalid coordinate '{}'", part))
            };
            Ok(Location::new(coord(x)?, coord(y)?, coord(z)?))
        }
        _ => Err(format!("Expected X,Y,Z but got '{}'", value)),
    }
}

/// Parse a category token, rejecting names that are not categories
pub fn parse_category(value: &str) -> Result<Category, String> {
    let category = Category::from_token(value.trim());
    if category == Category::Unknown && !value.trim().eq_ignore_ascii_case("unknown") {
        let known: Vec<&str> = Category::ALL.iter().map(|c| c.token()).collect();
        return Err(format!(
            "Unknown category '{}'. Known categories: {}",
            value,
            known.join(", ")
        ));
    }
    Ok(category)
}

impl Cli {
    /// Batch options derived from the global flags
    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            verbose: self.verbose,
            quiet: self.quiet,
            ..Default::default()
        }
    }

    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let options = self.batch_options();
        match self.command {
            Commands::Shell { sources } => {
                let cfg = config::config()?;
                let logs = ingest::load_sources(&sources, cfg, &options).await?;
                shell::Shell::new(logs, cfg).run().await
            }
            Commands::Print {
                sources,
                filters,
                head,
                tail,
            } => print_logs(&sources, &filters, head, tail, &options).await,
            Commands::Export {
                sources,
                filters,
                output,
            } => export_logs(&sources, &filters, &output, &options).await,
            Commands::Who { sources } => list_players(&sources, &options).await,
            Commands::Config => show_config(),
        }
    }
}

/// Load every source and apply `filters`
async fn load_filtered(
    sources: &[String],
    filters: &FilterArgs,
    cfg: &ResolvedConfig,
    options: &BatchOptions,
) -> Result<LogCollection> {
    let mut logs = ingest::load_sources(sources, cfg, options).await?;
    filters.apply(&mut logs, &cfg.hearing)?;
    Ok(logs)
}

/// Write raw lines of `entries`, one per line
pub fn write_entries<'a, W, I>(out: &mut W, entries: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Entry>,
{
    for entry in entries {
        writeln!(out, "{}", entry)?;
    }
    Ok(())
}

async fn print_logs(
    sources: &[String],
    filters: &FilterArgs,
    head: Option<usize>,
    tail: Option<usize>,
    options: &BatchOptions,
) -> Result<()> {
    let cfg = config::config()?;
    let logs = load_filtered(sources, filters, cfg, options).await?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match (head, tail) {
        (Some(n), _) => write_entries(&mut out, logs.head(n))?,
        (None, Some(n)) => write_entries(&mut out, logs.tail(n))?,
        (None, None) => write_entries(&mut out, logs.entries())?,
    }
    out.flush()?;
    Ok(())
}

async fn export_logs(
    sources: &[String],
    filters: &FilterArgs,
    output: &Path,
    options: &BatchOptions,
) -> Result<()> {
    let cfg = config::config()?;
    let logs = load_filtered(sources, filters, cfg, options).await?;

    let file = File::create(output)
        .with_context(|| format!("Failed to create output file: {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    logs.export(&mut writer)
        .and_then(|_| writer.flush())
        .with_context(|| format!("Failed to write logs to {}", output.display()))?;

    info!(entries = logs.len(), path = %output.display(), "Exported");
    Ok(())
}

async fn list_players(sources: &[String], options: &BatchOptions) -> Result<()> {
    let cfg = config::config()?;
    let logs = ingest::load_sources(sources, cfg, options).await?;

    if logs.known_identities().is_empty() {
        println!("No players found");
        return Ok(());
    }
    for ckey in logs.known_identities() {
        println!("{}", ckey);
    }
    eprintln!("\nTotal: {} players", logs.known_identities().len());
    Ok(())
}

/// Show the resolved configuration
fn show_config() -> Result<()> {
    let cfg = config::config()?;
    println!("{}", cfg);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_location() {
        assert_eq!(parse_location("1,2,3").unwrap(), Location::new(1, 2, 3));
        assert_eq!(parse_location("(10, 20, 2)").unwrap(), Location::new(10, 20, 2));
        assert!(parse_location("1,2").is_err());
        assert!(parse_location("a,b,c").is_err());
    }

    #[test]
    fn test_parse_category() {
        assert_eq!(parse_category("say").unwrap(), Category::Say);
        assert_eq!(parse_category("unknown").unwrap(), Category::Unknown);
        assert!(parse_category("shouting").is_err());
    }

    #[test]
    fn test_cli_parses_print_filters() {
        let cli = Cli::try_parse_from([
            "logbuddy",
            "-q",
            "print",
            "game.txt",
            "--ckeys",
            "alice,bob",
            "--category",
            "say,emote",
            "--center",
            "10,10,2",
            "--radius",
            "5",
            "--tail",
            "3",
        ])
        .unwrap();
        assert!(cli.quiet);

        let Commands::Print { sources, filters, head, tail } = cli.command else {
            panic!("expected print");
        };
        assert_eq!(sources, ["game.txt"]);
        assert_eq!(filters.ckeys, ["alice", "bob"]);
        assert_eq!(filters.categories, [Category::Say, Category::Emote]);
        assert_eq!(filters.center, Some(Location::new(10, 10, 2)));
        assert_eq!(filters.radius, Some(5));
        assert_eq!((head, tail), (None, Some(3)));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["logbuddy", "-v", "-q", "config"]).is_err());
    }

    #[test]
    fn test_radius_requires_center() {
        assert!(Cli::try_parse_from(["logbuddy", "print", "a.txt", "--radius", "3"]).is_err());
    }

    #[test]
    fn test_apply_filters() {
        let mut logs = LogCollection::parse_batch(
            [
                r#"[2022-01-01 10:00:00] SAY: alice/(Alice) "hi" (Bar (10,10,2))"#,
                r#"[2022-01-01 10:00:01] SAY: bob/(Bob) "hello" (Bar (11,10,2))"#,
                "[2022-01-01 10:00:02] GAME: round end",
            ],
            &BatchOptions::default(),
        );
        let filters = FilterArgs {
            categories: vec![Category::Say],
            strings: vec!["HELLO".to_string()],
            ..Default::default()
        };
        filters.apply(&mut logs, &HearingRange::default()).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs.entries().next().unwrap().text(), Some("hello"));
    }
}
