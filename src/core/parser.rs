//! Line grammar: one raw log line in, one typed entry out.
//!
//! A line looks like `[timestamp] CATEGORY: payload`. The timestamp and the
//! category token are split off first; the payload is then handed to the
//! sub-parser registered for the category in [`SUB_PARSERS`]. Categories
//! without a sub-parser keep the payload verbatim as their text.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use thiserror::Error;

use super::location::split_location;
use crate::domain::{Category, Entry, Player, SiliconKind};

/// Per-line parse failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Does not start with [")]
    MissingBracket { line: String },

    #[error("Malformed {category} entry: expected {expected}")]
    MalformedEntry {
        category: Category,
        line: String,
        expected: &'static str,
    },

    #[error("Invalid timestamp: {value}")]
    InvalidTimestamp { line: String, value: String },
}

impl ParseError {
    /// The line that failed to parse
    pub fn line(&self) -> &str {
        match self {
            ParseError::MissingBracket { line }
            | ParseError::MalformedEntry { line, .. }
            | ParseError::InvalidTimestamp { line, .. } => line,
        }
    }
}

/// A delimiter a sub-parser looked for and did not find
#[derive(Debug)]
struct Expected(&'static str);

type SubParser = fn(Entry, &str) -> Result<Entry, Expected>;

/// Category to sub-parser table
const SUB_PARSERS: &[(Category, SubParser)] = &[
    (Category::Game, parse_verbatim),
    (Category::Access, parse_verbatim),
    (Category::Admin, parse_verbatim),
    (Category::Ooc, parse_speech),
    (Category::Say, parse_speech),
    (Category::Whisper, parse_speech),
    (Category::Emote, parse_emote),
    (Category::RadioEmote, parse_emote),
    (Category::Attack, parse_attack),
    (Category::Silicon, parse_silicon),
    (Category::Pda, parse_pda),
];

fn sub_parser(category: Category) -> Option<SubParser> {
    SUB_PARSERS
        .iter()
        .find(|(c, _)| *c == category)
        .map(|(_, parser)| *parser)
}

/// Parse one raw line into an [`Entry`].
///
/// Unrecognized categories are not an error: they become
/// [`Category::Unknown`] with the payload as text.
pub fn parse_line(line: &str) -> Result<Entry, ParseError> {
    if !line.starts_with('[') {
        return Err(ParseError::MissingBracket {
            line: line.to_string(),
        });
    }

    let malformed = |category, expected| ParseError::MalformedEntry {
        category,
        line: line.to_string(),
        expected,
    };

    let (stamp, rest) = line
        .split_once("] ")
        .ok_or_else(|| malformed(Category::Unknown, "\"] \" after the timestamp"))?;
    let stamp = &stamp[1..];
    let timestamp = parse_timestamp(stamp).ok_or_else(|| ParseError::InvalidTimestamp {
        line: line.to_string(),
        value: stamp.to_string(),
    })?;

    let (token, payload) = rest
        .split_once(": ")
        .ok_or_else(|| malformed(Category::Unknown, "\": \" after the category"))?;
    let category = Category::from_token(token);

    let entry = Entry::new(timestamp, category, line);
    match sub_parser(category) {
        Some(parser) => parser(entry, payload).map_err(|Expected(what)| malformed(category, what)),
        None => Ok(entry.with_text(payload)),
    }
}

/// Flexible ISO-8601 date-time parsing.
///
/// Accepts `T` or space as the separator, optional fractional seconds,
/// an optional offset (converted to UTC) and bare dates.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }

    const FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    if let Some(dt) = FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
    {
        return Some(dt);
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Split the leading `ckey/(name) ` token off a payload
fn split_actor(payload: &str) -> Result<(Player, &str), Expected> {
    let (token, rest) = payload
        .split_once(") ")
        .ok_or(Expected("\") \" after the actor"))?;
    let actor = Player::parse(token).ok_or(Expected("\"/\" inside the actor"))?;
    Ok((actor, rest))
}

fn parse_verbatim(entry: Entry, payload: &str) -> Result<Entry, Expected> {
    Ok(entry.with_text(payload))
}

/// SAY, WHISPER and OOC:
/// `ckey/(name) "utterance" annotation (Zone (x,y,z))`
fn parse_speech(entry: Entry, payload: &str) -> Result<Entry, Expected> {
    let (actor, rest) = split_actor(payload)?;
    let (quoted, after) = rest
        .split_once("\" ")
        .ok_or(Expected("'\" ' after the utterance"))?;

    // Anything before the opening quote is a verb such as `says,`
    let utterance = quoted.split_once('"').map_or(quoted, |(_, u)| u);
    let (utterance, is_dead) = match utterance.strip_prefix("(DEAD)") {
        Some(alive) => (alive.trim_start(), true),
        None => (utterance, false),
    };

    let (annotation, location_part) = match after.split_once('(') {
        Some((annotation, location)) => (annotation.trim(), Some(location)),
        None => (after.trim(), None),
    };

    let mut text = utterance.to_string();
    if !annotation.is_empty() {
        text.push_str(" | ");
        text.push_str(annotation);
    }

    let mut entry = entry.with_actor(actor).with_text(text).with_dead(is_dead);
    if let Some((location, name)) = location_part.and_then(|part| split_location(part, false)) {
        entry = entry.with_location(location, name);
    }
    Ok(entry)
}

/// EMOTE and RADIOEMOTE: `ckey/(name) action (Zone (x,y,z))`
fn parse_emote(entry: Entry, payload: &str) -> Result<Entry, Expected> {
    let (actor, rest) = split_actor(payload)?;
    let (action, location_part) = match rest.split_once(" (") {
        Some((action, location)) => (action, Some(location)),
        None => (rest, None),
    };

    let mut entry = entry.with_actor(actor).with_text(action);
    if let Some((location, name)) = location_part.and_then(|part| split_location(part, false)) {
        entry = entry.with_location(location, name);
    }
    Ok(entry)
}

/// ATTACK: `ckey/(name) remainder`.
///
/// The remainder regularly names a second `ckey/(name)` pair (the victim).
/// It is kept as plain text: there is no reliable way to tell where a
/// victim's key starts, since keys and verbs are both free words.
fn parse_attack(entry: Entry, payload: &str) -> Result<Entry, Expected> {
    let (actor, rest) = split_actor(payload)?;
    Ok(entry.with_actor(actor).with_text(rest))
}

/// SILICON: optional `CYBORG: ` / `LAW: ` sub-tag, then the actor.
///
/// For law changes of the form `used X on ckey/(name) ...` the law-setter is
/// the player after ` on `, not the nominal actor.
fn parse_silicon(entry: Entry, payload: &str) -> Result<Entry, Expected> {
    let (kind, payload) = if let Some(rest) = payload.strip_prefix("CYBORG: ") {
        (SiliconKind::Cyborg, rest)
    } else if let Some(rest) = payload.strip_prefix("LAW: ") {
        (SiliconKind::Law, rest)
    } else {
        (SiliconKind::Misc, payload)
    };

    let (mut actor, rest) = split_actor(payload)?;
    if kind == SiliconKind::Law && rest.starts_with("used ") {
        let (_, target) = rest
            .split_once(" on ")
            .ok_or(Expected("\" on \" in a law change"))?;
        let token = target.split(") ").next().unwrap_or(target);
        actor = Player::parse(token).ok_or(Expected("\"/\" inside the law-setter"))?;
    }

    Ok(entry
        .with_silicon_kind(kind)
        .with_actor(actor)
        .with_text(rest))
}

/// PDA: `ckey/(name) (type) to Target) "message" (Zone (x,y,z))`
///
/// The message type before ` to ` is dropped.
fn parse_pda(entry: Entry, payload: &str) -> Result<Entry, Expected> {
    let (actor, rest) = split_actor(payload)?;
    let rest = rest.trim_matches(|c: char| c == ' ' || c == '(');
    let (_message_type, rest) = rest
        .split_once(" to ")
        .ok_or(Expected("\" to \" before the recipient"))?;
    let (target, rest) = rest
        .split_once(") \"")
        .ok_or(Expected("') \"' after the recipient"))?;
    let (message, location_part) = rest
        .split_once("\" (")
        .ok_or(Expected("'\" (' after the message"))?;

    let mut entry = entry
        .with_actor(actor)
        .with_target(Player::new(None, target))
        .with_text(message);
    if let Some((location, name)) = split_location(location_part, true) {
        entry = entry.with_location(location, name);
    }
    Ok(entry)
}
