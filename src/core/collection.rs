//! Time-ordered collections of parsed entries.
//!
//! A collection keeps every entry it accepted (`all_entries`, sorted by
//! timestamp) plus an active view that filters narrow and `reset` restores.
//! The active view is stored as indices into the full set, so it is always
//! a subset of it.

use std::collections::BTreeSet;
use std::io::{self, Write};

use thiserror::Error;
use tracing::{debug, warn};

use super::continuation::{classify, clean_line, LineAction};
use super::parser::{parse_line, ParseError};
use crate::domain::{Entry, SourceKind};

/// Banner written as the first line of a round's logs
const ROUND_BANNER: &str = "Starting up round ID ";

/// Collection-level errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionError {
    #[error("{origin} does not seem to be supported: {reason}")]
    UnsupportedBatchSource { origin: String, reason: String },

    #[error("Operation completed with empty set ({operation}). Aborting.")]
    EmptyResultRejected { operation: &'static str },

    #[error("Not enough information to sort the logs")]
    NotSortable,
}

/// Options for building a collection from raw lines
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    /// Declared kind of the source
    pub kind: SourceKind,
    /// Emit full diagnostic detail for rejected lines
    pub verbose: bool,
    /// Do not report rejected lines
    pub quiet: bool,
}

impl BatchOptions {
    pub fn with_kind(mut self, kind: SourceKind) -> Self {
        self.kind = kind;
        self
    }
}

/// An ordered set of entries with provenance and an active view
#[derive(Debug, Clone)]
pub struct LogCollection {
    round_id: Option<i64>,
    entries: Vec<Entry>,
    active: Vec<usize>,
    known_identities: BTreeSet<String>,
    source_label: Option<String>,
    kind: SourceKind,
    sortable: bool,
    rejected: Vec<ParseError>,
}

impl Default for LogCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl LogCollection {
    /// Create an empty collection, useful as a base for `merge`
    pub fn new() -> Self {
        Self {
            round_id: None,
            entries: Vec::new(),
            active: Vec::new(),
            known_identities: BTreeSet::new(),
            source_label: None,
            kind: SourceKind::Unknown,
            sortable: true,
            rejected: Vec::new(),
        }
    }

    /// Build a collection from raw lines.
    ///
    /// A leading round banner sets the round id and is dropped together with
    /// the line after it. Lines that fail to parse are reported and skipped;
    /// they never abort the batch.
    pub fn parse_batch<I, S>(lines: I, options: &BatchOptions) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if options.verbose && options.quiet {
            warn!("Verbose and quiet are mutually exclusive");
        }

        let mut collection = Self {
            kind: options.kind,
            ..Self::new()
        };

        let mut lines = lines.into_iter().peekable();
        let banner = lines
            .peek()
            .and_then(|first| parse_round_banner(AsRef::<str>::as_ref(first)));
        if let Some(round_id) = banner {
            collection.round_id = Some(round_id);
            lines.next();
            lines.next();
        }

        let mut entries: Vec<Entry> = Vec::new();
        for raw in lines {
            let line = clean_line(raw.as_ref());
            let parsed = match classify(line, entries.last()) {
                LineAction::Skip => continue,
                LineAction::AppendToPrevious(text) => {
                    if let Some(previous) = entries.last_mut() {
                        previous.append_text(&text);
                    }
                    continue;
                }
                LineAction::Rejoin(joined) => {
                    entries.pop();
                    parse_line(&joined)
                }
                LineAction::Parse(line) => parse_line(line),
            };

            match parsed {
                Ok(entry) => entries.push(entry),
                Err(err) => {
                    if !options.quiet {
                        warn!(line = err.line(), reason = %err, "Could not be parsed");
                    }
                    if options.verbose {
                        debug!(error = ?err, "Rejected line detail");
                    }
                    collection.rejected.push(err);
                }
            }
        }

        debug!(
            accepted = entries.len(),
            rejected = collection.rejected.len(),
            round_id = ?collection.round_id,
            "Parsed batch"
        );

        for entry in &entries {
            collection.record_identity(entry);
        }
        collection.entries = entries;
        collection.sort_all();
        collection
    }

    /// Merge another collection into this one.
    ///
    /// Entries and identities are unioned and the active view is reset.
    /// Metadata is left-biased: the round id and source label of `self` are
    /// kept as they are, even when unset.
    pub fn merge(&mut self, other: LogCollection) {
        self.entries.extend(other.entries);
        self.known_identities.extend(other.known_identities);
        self.rejected.extend(other.rejected);
        self.kind = SourceKind::Collated;
        self.sort_all();
    }

    /// Append pre-parsed entries, re-sort and reset the active view
    pub fn add_entries(&mut self, entries: impl IntoIterator<Item = Entry>) -> Result<(), CollectionError> {
        if !self.sortable {
            return Err(CollectionError::NotSortable);
        }
        for entry in entries {
            self.record_identity(&entry);
            self.entries.push(entry);
        }
        self.sort_all();
        Ok(())
    }

    /// Re-sort the active view by timestamp
    pub fn sort(&mut self) -> Result<(), CollectionError> {
        if !self.sortable {
            return Err(CollectionError::NotSortable);
        }
        let entries = &self.entries;
        self.active
            .sort_by_key(|&index| (entries[index].timestamp(), index));
        Ok(())
    }

    /// Flag the collection as (non-)sortable
    pub fn set_sortable(&mut self, sortable: bool) {
        self.sortable = sortable;
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    /// Restore the active view to every entry
    pub fn reset(&mut self) {
        self.active = (0..self.entries.len()).collect();
    }

    /// Write each active entry's raw line, then a trailer naming the tool
    /// and, when known, where the logs came from.
    pub fn export<W: Write>(&self, sink: &mut W) -> io::Result<()> {
        for entry in self.entries() {
            writeln!(sink, "{}", entry.raw_line())?;
        }
        writeln!(
            sink,
            "Created using {} v{}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        )?;
        if let Some(source) = &self.source_label {
            writeln!(sink, "Logs acquired from {}", source)?;
        }
        Ok(())
    }

    /// Active entries in order
    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &Entry> + ExactSizeIterator + '_ {
        self.active.iter().map(move |&index| &self.entries[index])
    }

    /// The first `n` active entries
    pub fn head(&self, n: usize) -> impl Iterator<Item = &Entry> + '_ {
        self.entries().take(n)
    }

    /// The last `n` active entries, in order
    pub fn tail(&self, n: usize) -> impl Iterator<Item = &Entry> + '_ {
        self.entries().skip(self.len().saturating_sub(n))
    }

    /// Every retained entry, sorted by timestamp
    pub fn all_entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Number of active entries
    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn round_id(&self) -> Option<i64> {
        self.round_id
    }

    /// Sorted, deduplicated actor keys seen so far
    pub fn known_identities(&self) -> &BTreeSet<String> {
        &self.known_identities
    }

    pub fn source_label(&self) -> Option<&str> {
        self.source_label.as_deref()
    }

    pub fn set_source_label(&mut self, label: impl Into<String>) {
        self.source_label = Some(label.into());
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Lines that failed to parse, in input order
    pub fn rejected(&self) -> &[ParseError] {
        &self.rejected
    }

    /// Replace the active view, refusing an empty result
    pub(crate) fn replace_active(
        &mut self,
        operation: &'static str,
        kept: Vec<usize>,
    ) -> Result<usize, CollectionError> {
        if kept.is_empty() {
            warn!(operation, "Operation completed with empty set. Aborting.");
            return Err(CollectionError::EmptyResultRejected { operation });
        }
        debug!(operation, before = self.active.len(), after = kept.len(), "Filter applied");
        self.active = kept;
        Ok(self.active.len())
    }

    /// Active (index, entry) pairs
    pub(crate) fn indexed(&self) -> impl Iterator<Item = (usize, &Entry)> + '_ {
        self.active.iter().map(move |&index| (index, &self.entries[index]))
    }

    fn record_identity(&mut self, entry: &Entry) {
        if let Some(ckey) = entry.actor().and_then(|actor| actor.normalized_ckey()) {
            self.known_identities.insert(ckey);
        }
    }

    fn sort_all(&mut self) {
        self.entries.sort_by_key(|entry| entry.timestamp());
        self.reset();
    }
}

/// Extract the round id from a `Starting up round ID N.` banner
fn parse_round_banner(line: &str) -> Option<i64> {
    let (_, rest) = line.split_once(ROUND_BANNER)?;
    rest.trim_matches(|c: char| c == '.' || c == ' ' || c == '\r' || c == '\n')
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, Location};

    fn lines() -> Vec<&'static str> {
        vec![
            "[2022-01-01 10:00:02] SAY: bob/(Bob) \"second\" (Bar (10,10,2))",
            "[2022-01-01 10:00:01] SAY: alice/(Alice) \"first\" (Bar (11,10,2))",
            "[2022-01-01 10:00:03] ATTACK: carol[DC]/(Carol) has punched bob/(Bob)",
        ]
    }

    #[test]
    fn test_batch_is_sorted() {
        let collection = LogCollection::parse_batch(lines(), &BatchOptions::default());
        let texts: Vec<_> = collection.entries().map(|e| e.text().unwrap()).collect();
        assert_eq!(texts, ["first", "second", "has punched bob/(Bob)"]);
        assert_eq!(collection.len(), 3);
        assert!(collection.round_id().is_none());
    }

    #[test]
    fn test_identities_are_normalized() {
        let collection = LogCollection::parse_batch(lines(), &BatchOptions::default());
        let ids: Vec<_> = collection.known_identities().iter().cloned().collect();
        assert_eq!(ids, ["alice", "bob", "carol"]);
    }

    #[test]
    fn test_round_banner() {
        let batch = vec![
            "[2022-01-01 09:59:59] Starting up round ID 4242.",
            "-------------------------",
            "[2022-01-01 10:00:00] GAME: hello",
        ];
        let collection = LogCollection::parse_batch(batch, &BatchOptions::default());
        assert_eq!(collection.round_id(), Some(4242));
        assert_eq!(collection.len(), 1);
        assert!(collection.rejected().is_empty());
    }

    #[test]
    fn test_bad_lines_are_recorded() {
        let batch = vec!["garbage", "[2022-01-01 10:00:00] GAME: ok", "[nope] GAME: x"];
        let collection = LogCollection::parse_batch(
            batch,
            &BatchOptions {
                quiet: true,
                ..Default::default()
            },
        );
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.rejected().len(), 2);
        assert_eq!(collection.rejected()[0].line(), "garbage");
    }

    #[test]
    fn test_vote_continuation() {
        let batch = vec![
            "[2022-01-01 10:00:00] VOTE: Restart vote results",
            "- <b>Yes</b> 4 &amp; counting",
            "- <b>No</b> 2",
        ];
        let collection = LogCollection::parse_batch(batch, &BatchOptions::default());
        assert_eq!(collection.len(), 1);
        let vote = collection.entries().next().unwrap();
        assert_eq!(vote.category(), Category::Vote);
        assert_eq!(vote.text(), Some("Restart vote results, Yes 4 & counting, No 2"));
    }

    #[test]
    fn test_wrapped_line_recovers_location() {
        let batch = vec![
            "[2022-01-01 10:00:00] EMOTE: alice/(Alice) announces: Attention crew",
            "- please report. (Bridge (50,60,2))",
        ];
        let collection = LogCollection::parse_batch(batch, &BatchOptions::default());
        assert_eq!(collection.len(), 1);
        assert!(collection.rejected().is_empty());
        let entry = collection.entries().next().unwrap();
        assert_eq!(entry.text(), Some("announces: Attention crew\\nplease report."));
        assert_eq!(entry.location(), Some(Location::new(50, 60, 2)));
        assert_eq!(entry.location_name(), Some("Bridge "));
        assert!(entry.raw_line().contains("\\n"));
    }

    #[test]
    fn test_censored_lines_are_dropped() {
        let batch = vec!["[2022-01-01 10:00:00] GAME: a", "-censored(asay/apm/ahelp/notes/etc)"];
        let collection = LogCollection::parse_batch(batch, &BatchOptions::default());
        assert_eq!(collection.len(), 1);
        assert!(collection.rejected().is_empty());
    }

    #[test]
    fn test_head_and_tail() {
        let collection = LogCollection::parse_batch(lines(), &BatchOptions::default());
        assert_eq!(collection.head(1).count(), 1);
        let tail: Vec<_> = collection.tail(2).map(|e| e.text().unwrap()).collect();
        assert_eq!(tail, ["second", "has punched bob/(Bob)"]);
        assert_eq!(collection.tail(10).count(), 3);
    }

    #[test]
    fn test_not_sortable() {
        let mut collection = LogCollection::parse_batch(lines(), &BatchOptions::default());
        collection.set_sortable(false);
        assert_eq!(collection.sort(), Err(CollectionError::NotSortable));
        assert_eq!(
            collection.add_entries(Vec::new()),
            Err(CollectionError::NotSortable)
        );
    }

    #[test]
    fn test_merge_keeps_receiver_metadata() {
        let mut other = LogCollection::parse_batch(
            vec![
                "Starting up round ID 9.",
                "---",
                "[2022-01-01 10:00:00] GAME: hello",
            ],
            &BatchOptions::default(),
        );
        other.set_source_label("game.txt");

        let mut merged = LogCollection::new();
        merged.merge(other);
        assert_eq!(merged.round_id(), None);
        assert_eq!(merged.source_label(), None);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.kind(), SourceKind::Collated);
    }

    #[test]
    fn test_export_trailer() {
        let mut collection = LogCollection::parse_batch(lines(), &BatchOptions::default());
        collection.set_source_label("https://example.org/round-1/");
        let mut out = Vec::new();
        collection.export(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let exported: Vec<_> = text.lines().collect();
        assert_eq!(exported.len(), 5);
        assert_eq!(exported[0], lines()[1]);
        assert!(exported[3].starts_with("Created using logbuddy v"));
        assert_eq!(exported[4], "Logs acquired from https://example.org/round-1/");
    }
}
