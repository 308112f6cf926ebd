//! Approximate "could this player have perceived this entry" reconstruction.
//!
//! The only inputs are coordinates and z-levels: walls, doors and radio
//! equipment are not modelled. A player's position is only known when they
//! appear in a located entry, so the hearing box is widened by a walking
//! error margin.

use serde::{Deserialize, Serialize};

use crate::domain::{Category, Entry, Location};

/// Tiles a player can hear across
pub const HEARING_RANGE: i32 = 9;

/// Extra tiles for movement between located entries
pub const WALKING_ERROR: i32 = 4;

/// Hearing distance settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HearingRange {
    #[serde(default = "default_range")]
    pub range: i32,

    #[serde(default = "default_walking_error")]
    pub walking_error: i32,
}

fn default_range() -> i32 {
    HEARING_RANGE
}
fn default_walking_error() -> i32 {
    WALKING_ERROR
}

impl Default for HearingRange {
    fn default() -> Self {
        Self {
            range: HEARING_RANGE,
            walking_error: WALKING_ERROR,
        }
    }
}

impl HearingRange {
    /// Box half-width actually used: range plus walking error
    pub fn effective(&self) -> i32 {
        self.range.saturating_add(self.walking_error)
    }
}

/// Select, in order, the entries `ckey` could have perceived.
///
/// `entries` must be in chronological order and yields each entry with an
/// opaque index, which is what gets returned. When `categories` is given,
/// entries the player did not take part in are only kept if their category
/// is listed.
pub fn audible_to<'a, I>(
    entries: I,
    ckey: &str,
    hearing: &HearingRange,
    categories: Option<&[Category]>,
) -> Vec<usize>
where
    I: IntoIterator<Item = (usize, &'a Entry)>,
{
    let range = hearing.effective();
    let mut current = Location::ORIGIN;
    let mut previous = Location::ORIGIN;
    let mut heard = Vec::new();

    for (index, entry) in entries {
        if entry.involves(ckey) {
            if let Some(location) = entry.location() {
                previous = current;
                current = location;
            }
            heard.push(index);
            continue;
        }

        // Just changed z-level: position is ambiguous
        if current.z != previous.z {
            continue;
        }

        if categories.is_some_and(|allowed| !allowed.contains(&entry.category())) {
            continue;
        }

        if entry.category().is_broadcast() {
            heard.push(index);
            continue;
        }

        if entry
            .location()
            .is_some_and(|location| location.within_box(&current, range))
        {
            heard.push(index);
        }
    }

    heard
}
