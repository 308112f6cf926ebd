//! logbuddy - Game server log parser and filter
//!
//! Parses round logs from a space-station roleplay game server into typed
//! entries, collates several log files into one time-ordered collection,
//! and narrows it down with composable filters.
//!
//! # Architecture
//!
//! - Every raw line becomes an [`Entry`] or a per-line [`ParseError`];
//!   bad lines never abort a batch
//! - A [`LogCollection`] keeps all accepted entries sorted by timestamp and
//!   an active view that filters narrow and `reset` restores
//! - A filter that would leave nothing is refused and the view is kept
//!
//! # Modules
//!
//! - `domain`: Data structures (Entry, Player, Location, Category)
//! - `core`: Parsing, continuation handling, collections, filters, audibility
//! - `ingest`: File, folder and logs-link loaders
//! - `adapters`: Remote retrieval (HTTP)
//! - `config`: YAML configuration
//! - `cli`: Command-line interface and interactive shell
//!
//! # Usage
//!
//! ```bash
//! # Everything bob said or did
//! logbuddy print logs/ --ckeys bob
//!
//! # What alice could have heard, saved to a file
//! logbuddy export game.txt --heard alice --output alice.txt
//!
//! # Explore interactively
//! logbuddy shell https://example.org/parsed-logs/round-4242
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod ingest;

// Re-export main types at crate root for convenience
pub use crate::core::{
    parse_line, BatchOptions, CollectionError, HearingRange, LogCollection, ParseError,
};
pub use adapters::{FetchError, Fetcher, HttpFetcher};
pub use domain::{Category, Entry, Location, Player, SourceKind};
