//! Interactive shell over a loaded collection.
//!
//! Each input line is split into words (double quotes group words) and
//! parsed with clap, so every shell command has the same `--help` as the
//! one-shot commands.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use super::{parse_category, parse_location, write_entries};
use crate::config::ResolvedConfig;
use crate::core::{CollectionError, HearingRange, LogCollection};
use crate::domain::{Category, Location};

/// One line typed at the shell prompt
#[derive(Parser, Debug)]
#[command(name = "logbuddy", no_binary_name = true, disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum ShellCommand {
    /// Keep lines acted by these ckeys
    Ckeys {
        #[arg(required = true)]
        ckeys: Vec<String>,
    },

    /// Keep lines containing any of these strings
    Strings {
        #[arg(required = true)]
        strings: Vec<String>,

        /// Match case-sensitively
        #[arg(short, long)]
        case_sensitive: bool,
    },

    /// Keep what a ckey could have perceived
    Heard {
        ckey: String,

        /// Only keep others' lines of these categories
        #[arg(short, long, value_delimiter = ',', value_parser = parse_category)]
        categories: Vec<Category>,
    },

    /// Approximate a conversation between ckeys
    Conversation {
        #[arg(required = true)]
        ckeys: Vec<String>,
    },

    /// Keep lines in a zone
    Location {
        #[arg(required = true)]
        name: Vec<String>,
    },

    /// Keep lines strictly within a radius of a point
    Radius {
        /// X,Y,Z
        #[arg(value_parser = parse_location)]
        center: Location,

        radius: i32,
    },

    /// Keep or drop categories
    Categories {
        /// Categories to keep (all when omitted)
        #[arg(value_delimiter = ',', value_parser = parse_category)]
        include: Vec<Category>,

        /// Categories to drop
        #[arg(short, long, value_delimiter = ',', value_parser = parse_category)]
        exclude: Vec<Category>,
    },

    /// Undo every filter
    Reset,

    /// Print the first lines
    Head { lines: Option<usize> },

    /// Print the last lines
    Tail { lines: Option<usize> },

    /// Print every active line
    Print,

    /// List players seen in the logs
    Who,

    /// Show one active entry (1-based) as JSON
    Inspect { index: usize },

    /// Write the active lines to a file
    Export { path: PathBuf },

    /// Summarize the loaded logs
    Info,

    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

/// Whether the shell keeps reading after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Shell state: the collection being narrowed and display settings
pub struct Shell {
    logs: LogCollection,
    hearing: HearingRange,
    preview_lines: usize,
}

impl Shell {
    pub fn new(logs: LogCollection, config: &ResolvedConfig) -> Self {
        Self {
            logs,
            hearing: config.hearing,
            preview_lines: config.preview_lines,
        }
    }

    pub fn logs(&self) -> &LogCollection {
        &self.logs
    }

    /// Read commands from stdin until `quit` or end of input
    pub async fn run(mut self) -> Result<()> {
        info!(entries = self.logs.len(), "Logs loaded, type 'help' for commands");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("> ");
            io::stdout().flush()?;

            let Some(line) = lines.next_line().await.context("Failed to read from stdin")? else {
                break;
            };

            let stdout = io::stdout();
            let mut out = stdout.lock();
            match self.handle_line(&line, &mut out) {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => {}
                Err(err) => match err.downcast_ref::<CollectionError>() {
                    // Already reported when the filter refused it
                    Some(CollectionError::EmptyResultRejected { .. }) => {}
                    _ => eprintln!("Error: {:#}", err),
                },
            }
        }
        Ok(())
    }

    /// Parse and execute one input line
    pub fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Flow> {
        let words = split_words(line)?;
        if words.is_empty() {
            return Ok(Flow::Continue);
        }

        match ShellLine::try_parse_from(&words) {
            Ok(parsed) => self.execute(parsed.command, out),
            Err(err) => {
                write!(out, "{}", err)?;
                Ok(Flow::Continue)
            }
        }
    }

    /// Execute a parsed command, writing listings to `out`
    pub fn execute<W: Write>(&mut self, command: ShellCommand, out: &mut W) -> Result<Flow> {
        debug!(?command, "Shell command");
        let remaining = match command {
            ShellCommand::Ckeys { ckeys } => self.logs.filter_ckeys(&ckeys)?,
            ShellCommand::Strings {
                strings,
                case_sensitive,
            } => self.logs.filter_strings(&strings, case_sensitive)?,
            ShellCommand::Heard { ckey, categories } => {
                let allowed = (!categories.is_empty()).then_some(categories.as_slice());
                self.logs.filter_heard(&ckey, &self.hearing, allowed)?
            }
            ShellCommand::Conversation { ckeys } => {
                self.logs.filter_conversation(&ckeys, &self.hearing)?
            }
            ShellCommand::Location { name } => self.logs.filter_location_name(&name.join(" "))?,
            ShellCommand::Radius { center, radius } => self.logs.filter_radius(center, radius)?,
            ShellCommand::Categories { include, exclude } => {
                self.logs.filter_categories(&include, &exclude)?
            }
            ShellCommand::Reset => {
                self.logs.reset();
                self.logs.len()
            }
            ShellCommand::Head { lines } => {
                let n = lines.unwrap_or(self.preview_lines);
                write_entries(out, self.logs.head(n))?;
                return Ok(Flow::Continue);
            }
            ShellCommand::Tail { lines } => {
                let n = lines.unwrap_or(self.preview_lines);
                write_entries(out, self.logs.tail(n))?;
                return Ok(Flow::Continue);
            }
            ShellCommand::Print => {
                write_entries(out, self.logs.entries())?;
                return Ok(Flow::Continue);
            }
            ShellCommand::Who => {
                for ckey in self.logs.known_identities() {
                    writeln!(out, "{}", ckey)?;
                }
                return Ok(Flow::Continue);
            }
            ShellCommand::Inspect { index } => {
                let entry = index
                    .checked_sub(1)
                    .and_then(|i| self.logs.entries().nth(i))
                    .with_context(|| {
                        format!("No entry {} (1 to {} available)", index, self.logs.len())
                    })?;
                writeln!(out, "{}", serde_json::to_string_pretty(entry)?)?;
                return Ok(Flow::Continue);
            }
            ShellCommand::Export { path } => {
                let file = File::create(&path)
                    .with_context(|| format!("Failed to create output file: {}", path.display()))?;
                let mut writer = BufWriter::new(file);
                self.logs
                    .export(&mut writer)
                    .and_then(|_| writer.flush())
                    .with_context(|| format!("Failed to write logs to {}", path.display()))?;
                writeln!(out, "Exported {} lines to {}", self.logs.len(), path.display())?;
                return Ok(Flow::Continue);
            }
            ShellCommand::Info => {
                self.write_info(out)?;
                return Ok(Flow::Continue);
            }
            ShellCommand::Quit => return Ok(Flow::Quit),
        };

        writeln!(out, "{} entries", remaining)?;
        Ok(Flow::Continue)
    }

    fn write_info<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let logs = &self.logs;
        writeln!(out, "Source:     {}", logs.source_label().unwrap_or("(unknown)"))?;
        match logs.round_id() {
            Some(id) => writeln!(out, "Round:      {}", id)?,
            None => writeln!(out, "Round:      (unknown)")?,
        }
        writeln!(out, "Kind:       {}", logs.kind())?;
        writeln!(out, "Entries:    {} of {}", logs.len(), logs.all_entries().len())?;
        writeln!(out, "Players:    {}", logs.known_identities().len())?;
        writeln!(out, "Rejected:   {}", logs.rejected().len())?;
        if let (Some(first), Some(last)) = (logs.entries().next(), logs.entries().next_back()) {
            writeln!(out, "Span:       {} to {}", first.timestamp(), last.timestamp())?;
        }
        Ok(())
    }
}

/// Split a command line into words; double quotes group words
fn split_words(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quoted = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quoted {
        anyhow::bail!("Unterminated quote");
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
