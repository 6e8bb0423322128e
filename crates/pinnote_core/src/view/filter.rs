//! Search filter and pinned/other sections.

use crate::model::note::Note;

/// Notes matching the search box, split the way the list renders them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteSections<'a> {
    pub pinned: Vec<&'a Note>,
    pub others: Vec<&'a Note>,
}

impl NoteSections<'_> {
    pub fn len(&self) -> usize {
        self.pinned.len() + self.others.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Notes whose title or content contains `term`, ignoring case.
///
/// An empty term matches every note. Input order is preserved.
pub fn filter_notes<'a>(notes: &'a [Note], term: &str) -> Vec<&'a Note> {
    if term.is_empty() {
        return notes.iter().collect();
    }
    let lowered = term.to_lowercase();
    notes
        .iter()
        .filter(|note| note.matches_term(&lowered))
        .collect()
}

/// Filters by `term`, then partitions on `is_pinned`.
pub fn sections<'a>(notes: &'a [Note], term: &str) -> NoteSections<'a> {
    let (pinned, others) = filter_notes(notes, term)
        .into_iter()
        .partition(|note| note.is_pinned);
    NoteSections { pinned, others }
}
