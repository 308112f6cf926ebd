//! Multi-line continuation handling.
//!
//! Vote tallies and priority announcements are written across several raw
//! lines where only the first carries the `[timestamp] CATEGORY:` prefix.
//! Each raw line is classified here, against the most recently accepted
//! entry, before the line parser sees it.

use crate::domain::{Category, Entry};

/// Prefix of a vote ballot line
const VOTE_BALLOT: &str = "- <b>";

/// Prefix of a soft-wrapped line
const WRAP: &str = "- ";

/// Prefix of a line removed by the log redaction pass
const CENSORED: &str = "-censored";

/// Literal escape joining a wrapped line to its head
pub const WRAP_JOIN: &str = "\\n";

/// What to do with one raw line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineAction<'a> {
    /// Drop the line silently
    Skip,
    /// Append this text to the previous (vote) entry
    AppendToPrevious(String),
    /// Discard the previous entry and parse this rejoined line instead
    Rejoin(String),
    /// Parse the line on its own
    Parse(&'a str),
}

/// Trim surrounding spaces and line terminators
pub fn clean_line(line: &str) -> &str {
    line.trim_matches(|c: char| c == '\r' || c == '\n' || c == ' ')
}

/// Classify a cleaned line against the last accepted entry
pub fn classify<'a>(line: &'a str, previous: Option<&Entry>) -> LineAction<'a> {
    if line.is_empty() || line.starts_with(CENSORED) {
        return LineAction::Skip;
    }

    let Some(previous) = previous else {
        return LineAction::Parse(line);
    };

    if line.starts_with(VOTE_BALLOT) && previous.category() == Category::Vote {
        return LineAction::AppendToPrevious(decode_html_entities(&strip_markup(
            &line[WRAP.len()..],
        )));
    }

    if let Some(rest) = line.strip_prefix(WRAP) {
        return LineAction::Rejoin(format!("{}{}{}", previous.raw_line(), WRAP_JOIN, rest));
    }

    LineAction::Parse(line)
}

/// Remove `<...>` tags
pub fn strip_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// Decode named and numeric HTML character references.
///
/// Unknown references are left untouched.
pub fn decode_html_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let candidate = &rest[amp..];
        match candidate.find(';').and_then(|end| {
            decode_entity(&candidate[1..end]).map(|decoded| (decoded, end + 1))
        }) {
            Some((decoded, consumed)) => {
                out.push(decoded);
                rest = &candidate[consumed..];
            }
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    if let Some(numeric) = name.strip_prefix('#') {
        let code = match numeric.strip_prefix(|c: char| c == 'x' || c == 'X') {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse().ok()?,
        };
        return char::from_u32(code);
    }

    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => None,
    }
}
