//! Trailing-coordinate extraction shared by the sub-parsers.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::Location;

/// `(x,y,z)` with 1-3 digit x/y and a 1-2 digit z-level
static COORDINATES: OnceLock<Regex> = OnceLock::new();

fn coordinates() -> &'static Regex {
    COORDINATES.get_or_init(|| {
        Regex::new(r"\(([0-9]{1,3}),([0-9]{1,3}),([0-9]{1,2})\)").expect("coordinate pattern is valid")
    })
}

/// Find the last coordinate triple in `text`.
///
/// Returns the location and the byte offset where the match starts, so the
/// caller can split the zone name from the coordinates. Earlier triples (for
/// example inside a quoted message) are ignored.
pub fn extract_location(text: &str) -> Option<(Location, usize)> {
    let caps = coordinates().captures_iter(text).last()?;
    let start = caps.get(0)?.start();

    let x = caps[1].parse().ok()?;
    let y = caps[2].parse().ok()?;
    let z = caps[3].parse().ok()?;

    Some((Location::new(x, y, z), start))
}

/// Split `text` into the zone name before the last triple and the triple.
///
/// An empty zone name is reported as `None`.
pub fn split_location(text: &str, trim_name: bool) -> Option<(Location, Option<String>)> {
    let (location, start) = extract_location(text)?;
    let name = &text[..start];
    let name = if trim_name { name.trim() } else { name };
    let name = (!name.trim().is_empty()).then(|| name.to_string());
    Some((location, name))
}
