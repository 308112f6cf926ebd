//! A single parsed log line.
//!
//! Entries are produced by the line parser and never change afterwards,
//! except that a vote tally may absorb its continuation lines while a
//! batch is still being built.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::category::{Category, SiliconKind};
use super::player::{normalize_ckey, Player, RECONNECT_MARKER};

/// Map coordinates: x, y and z-level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Location {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Location {
    pub const ORIGIN: Location = Location { x: 0, y: 0, z: 0 };

    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Same z-level and strictly inside the axis-aligned box of `radius`.
    ///
    /// A negative radius contains nothing.
    pub fn within_box(&self, other: &Location, radius: i32) -> bool {
        let Ok(radius) = u32::try_from(radius) else {
            return false;
        };
        self.z == other.z && self.x.abs_diff(other.x) < radius && self.y.abs_diff(other.y) < radius
    }
}

impl From<(i32, i32, i32)> for Location {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.x, self.y, self.z)
    }
}

/// One log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    timestamp: NaiveDateTime,
    category: Category,
    actor: Option<Player>,
    target: Option<Player>,
    location: Option<Location>,
    location_name: Option<String>,
    text: Option<String>,
    is_dead: Option<bool>,
    silicon_kind: Option<SiliconKind>,
    raw_line: String,
}

impl Entry {
    /// Create an entry with only the mandatory parts populated
    pub(crate) fn new(timestamp: NaiveDateTime, category: Category, raw_line: impl Into<String>) -> Self {
        Self {
            timestamp,
            category,
            actor: None,
            target: None,
            location: None,
            location_name: None,
            text: None,
            is_dead: None,
            silicon_kind: None,
            raw_line: raw_line.into(),
        }
    }

    pub(crate) fn with_actor(mut self, actor: Player) -> Self {
        self.actor = Some(actor);
        self
    }

    pub(crate) fn with_target(mut self, target: Player) -> Self {
        self.target = Some(target);
        self
    }

    pub(crate) fn with_location(mut self, location: Location, name: Option<String>) -> Self {
        self.location = Some(location);
        self.location_name = name;
        self
    }

    pub(crate) fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub(crate) fn with_dead(mut self, is_dead: bool) -> Self {
        self.is_dead = Some(is_dead);
        self
    }

    pub(crate) fn with_silicon_kind(mut self, kind: SiliconKind) -> Self {
        self.silicon_kind = Some(kind);
        self
    }

    /// Append continuation text, joined with `", "`
    pub(crate) fn append_text(&mut self, more: &str) {
        match &mut self.text {
            Some(text) => {
                text.push_str(", ");
                text.push_str(more);
            }
            None => self.text = Some(more.to_string()),
        }
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn actor(&self) -> Option<&Player> {
        self.actor.as_ref()
    }

    pub fn target(&self) -> Option<&Player> {
        self.target.as_ref()
    }

    pub fn location(&self) -> Option<Location> {
        self.location
    }

    pub fn location_name(&self) -> Option<&str> {
        self.location_name.as_deref()
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Only set for speech categories
    pub fn is_dead(&self) -> Option<bool> {
        self.is_dead
    }

    /// Only set for `SILICON:` lines
    pub fn silicon_kind(&self) -> Option<SiliconKind> {
        self.silicon_kind
    }

    /// The unmodified source line
    pub fn raw_line(&self) -> &str {
        &self.raw_line
    }

    /// Whether `ckey` took part as actor or target, or is referenced as
    /// `ckey/(` inside the free text.
    ///
    /// Matching ignores case and the reconnect marker, like
    /// [`Player::has_ckey`].
    pub fn involves(&self, ckey: &str) -> bool {
        if self.actor.as_ref().is_some_and(|p| p.has_ckey(ckey))
            || self.target.as_ref().is_some_and(|p| p.has_ckey(ckey))
        {
            return true;
        }
        let Some(text) = self.text.as_deref() else {
            return false;
        };
        let text = text.to_lowercase();
        let key = normalize_ckey(ckey).to_lowercase();
        text.contains(&format!("{}/(", key))
            || text.contains(&format!("{}{}/(", key, RECONNECT_MARKER.to_lowercase()))
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw_line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2022, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_within_box_is_strict() {
        let center = Location::new(10, 10, 2);
        assert!(Location::new(12, 8, 2).within_box(&center, 3));
        assert!(!Location::new(13, 10, 2).within_box(&center, 3));
        assert!(!Location::new(10, 10, 3).within_box(&center, 3));
    }

    #[test]
    fn test_within_box_extreme_coordinates() {
        let center = Location::new(i32::MIN, 0, 2);
        assert!(!Location::new(10, 10, 2).within_box(&center, 5));
        assert!(Location::new(i32::MIN + 1, 0, 2).within_box(&center, 5));
        assert!(!Location::new(i32::MAX, 0, 2).within_box(&center, i32::MAX));
        assert!(!Location::new(10, 10, 2).within_box(&Location::new(10, 10, 2), -1));
    }

    #[test]
    fn test_append_text() {
        let mut entry = Entry::new(ts(), Category::Vote, "[x] VOTE: a").with_text("a");
        entry.append_text("b");
        assert_eq!(entry.text(), Some("a, b"));

        let mut empty = Entry::new(ts(), Category::Vote, "[x] VOTE:");
        empty.append_text("first");
        assert_eq!(empty.text(), Some("first"));
    }

    #[test]
    fn test_involves_via_text_reference() {
        let entry = Entry::new(ts(), Category::Attack, "raw")
            .with_actor(Player::new(Some("alice"), "Alice"))
            .with_text("has punched bob/(Bob)");
        assert!(entry.involves("alice"));
        assert!(entry.involves("bob"));
        assert!(!entry.involves("carol"));
    }

    #[test]
    fn test_involves_text_reference_ignores_case_and_reconnect() {
        let entry = Entry::new(ts(), Category::Attack, "raw")
            .with_actor(Player::new(Some("alice"), "Alice"))
            .with_text("has punched Bob[DC]/(Bob)");
        assert!(entry.involves("bob"));
        assert!(entry.involves("BOB"));
        assert!(entry.involves("bob[DC]"));
        assert!(!entry.involves("bo"));
    }
}
