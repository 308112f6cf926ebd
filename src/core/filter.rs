//! Filters over a collection's active view.
//!
//! Every filter narrows the active view to a subset of itself and returns
//! the new size. A filter that would leave nothing is refused with
//! [`CollectionError::EmptyResultRejected`] and the view stays as it was.

use std::collections::BTreeSet;

use super::audibility::{audible_to, HearingRange};
use super::collection::{CollectionError, LogCollection};
use crate::domain::{Category, Entry, Location};

impl LogCollection {
    /// Keep entries whose actor has one of `ckeys`.
    ///
    /// Only the actor counts; use [`filter_strings`](Self::filter_strings)
    /// to match keys anywhere in the line.
    pub fn filter_ckeys<S: AsRef<str>>(&mut self, ckeys: &[S]) -> Result<usize, CollectionError> {
        let kept = self.actor_indices(ckeys);
        self.replace_active("ckeys", kept)
    }

    /// Keep entries whose raw line contains any of `needles`
    pub fn filter_strings<S: AsRef<str>>(
        &mut self,
        needles: &[S],
        case_sensitive: bool,
    ) -> Result<usize, CollectionError> {
        let needles: Vec<String> = needles
            .iter()
            .map(|n| {
                if case_sensitive {
                    n.as_ref().to_string()
                } else {
                    n.as_ref().to_lowercase()
                }
            })
            .collect();

        let kept = self
            .indexed()
            .filter(|(_, entry)| {
                let haystack = if case_sensitive {
                    entry.raw_line().to_string()
                } else {
                    entry.raw_line().to_lowercase()
                };
                needles.iter().any(|needle| haystack.contains(needle.as_str()))
            })
            .map(|(index, _)| index)
            .collect();
        self.replace_active("strings", kept)
    }

    /// Keep entries whose zone name matches, ignoring case and surrounding
    /// whitespace
    pub fn filter_location_name(&mut self, name: &str) -> Result<usize, CollectionError> {
        let wanted = name.trim().to_lowercase();
        let kept = self
            .indexed()
            .filter(|(_, entry)| {
                entry
                    .location_name()
                    .is_some_and(|own| own.trim().to_lowercase() == wanted)
            })
            .map(|(index, _)| index)
            .collect();
        self.replace_active("location", kept)
    }

    /// Keep located entries on `center`'s z-level strictly inside the
    /// square of `radius` around it
    pub fn filter_radius(&mut self, center: Location, radius: i32) -> Result<usize, CollectionError> {
        let kept = self
            .indexed()
            .filter(|(_, entry)| {
                entry
                    .location()
                    .is_some_and(|location| location.within_box(&center, radius))
            })
            .map(|(index, _)| index)
            .collect();
        self.replace_active("radius", kept)
    }

    /// Keep entries whose category is in `include` (every category when
    /// empty) and not in `exclude`
    pub fn filter_categories(
        &mut self,
        include: &[Category],
        exclude: &[Category],
    ) -> Result<usize, CollectionError> {
        let kept = self
            .indexed()
            .filter(|(_, entry)| {
                let category = entry.category();
                (include.is_empty() || include.contains(&category)) && !exclude.contains(&category)
            })
            .map(|(index, _)| index)
            .collect();
        self.replace_active("categories", kept)
    }

    /// Entries `ckey` could have perceived, see [`audible_to`]
    pub fn heard_by(
        &self,
        ckey: &str,
        hearing: &HearingRange,
        categories: Option<&[Category]>,
    ) -> Result<Vec<&Entry>, CollectionError> {
        self.ensure_sortable()?;
        let all = self.all_entries();
        Ok(audible_to(self.indexed(), ckey, hearing, categories)
            .into_iter()
            .map(|index| &all[index])
            .collect())
    }

    /// Keep only entries `ckey` could have perceived
    pub fn filter_heard(
        &mut self,
        ckey: &str,
        hearing: &HearingRange,
        categories: Option<&[Category]>,
    ) -> Result<usize, CollectionError> {
        self.ensure_sortable()?;
        let kept = audible_to(self.indexed(), ckey, hearing, categories);
        self.replace_active("heard", kept)
    }

    /// Approximate a conversation between `ckeys`.
    ///
    /// Restricts to lines the participants acted in, then keeps whatever
    /// any one of them could have perceived from that set.
    pub fn filter_conversation<S: AsRef<str>>(
        &mut self,
        ckeys: &[S],
        hearing: &HearingRange,
    ) -> Result<usize, CollectionError> {
        self.ensure_sortable()?;
        let spoken = self.actor_indices(ckeys);
        if spoken.is_empty() {
            return self.replace_active("conversation", spoken);
        }

        let all = self.all_entries();
        let mut union = BTreeSet::new();
        for ckey in ckeys {
            let participants = spoken.iter().map(|&index| (index, &all[index]));
            union.extend(audible_to(participants, ckey.as_ref(), hearing, None));
        }

        // Indices follow timestamp order, so the set is already sorted
        self.replace_active("conversation", union.into_iter().collect())
    }

    fn actor_indices<S: AsRef<str>>(&self, ckeys: &[S]) -> Vec<usize> {
        self.indexed()
            .filter(|(_, entry)| {
                entry
                    .actor()
                    .is_some_and(|actor| ckeys.iter().any(|ckey| actor.has_ckey(ckey.as_ref())))
            })
            .map(|(index, _)| index)
            .collect()
    }

    fn ensure_sortable(&self) -> Result<(), CollectionError> {
        if self.is_sortable() {
            Ok(())
        } else {
            Err(CollectionError::NotSortable)
        }
    }
}
