//! Category/search filtering and the multi-key record ordering.

use std::cmp::Ordering;

use event_map_record_models::EventRecord;
use serde::{Deserialize, Serialize};

/// Current filter selection.
///
/// At most one category is active at a time. An empty search query
/// matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    /// The selected category, or `None` for "all".
    pub active_category: Option<String>,
    /// Lowercased free-text query.
    pub search_query: String,
}

impl FilterState {
    /// Shows every category.
    pub fn select_all(&mut self) {
        self.active_category = None;
    }

    /// Selects `category`, or goes back to "all" if it is already
    /// selected.
    pub fn toggle_category(&mut self, category: &str) {
        if self.active_category.as_deref() == Some(category) {
            self.active_category = None;
        } else {
            self.active_category = Some(category.to_string());
        }
    }

    /// Replaces the search query.
    pub fn set_search(&mut self, query: &str) {
        self.search_query = query.to_lowercase();
    }

    /// Returns `true` if `record` passes both the category and the search
    /// filter.
    #[must_use]
    pub fn matches(&self, record: &EventRecord) -> bool {
        let category_match = self
            .active_category
            .as_deref()
            .is_none_or(|active| record.defaulted_category() == active);

        category_match && self.matches_search(record)
    }

    fn matches_search(&self, record: &EventRecord) -> bool {
        if self.search_query.is_empty() {
            return true;
        }
        let query = self.search_query.to_lowercase();
        [&record.title, &record.location, &record.explanation]
            .iter()
            .any(|field| field.to_lowercase().contains(&query))
    }
}

/// Filters `records` and returns them in display order.
#[must_use]
pub fn view<'a>(records: &'a [EventRecord], filter: &FilterState) -> Vec<&'a EventRecord> {
    let mut filtered: Vec<&EventRecord> = records.iter().filter(|r| filter.matches(r)).collect();
    filtered.sort_by(|a, b| compare_records(a, b));
    filtered
}

/// Display order: defaulted category, then date (empty last), then start
/// time, then end time (empty last). All comparisons are plain string
/// comparisons, so dates and times must be zero-padded to sort
/// chronologically.
#[must_use]
pub fn compare_records(a: &EventRecord, b: &EventRecord) -> Ordering {
    a.defaulted_category()
        .cmp(b.defaulted_category())
        .then_with(|| empty_last(&a.date, &b.date))
        .then_with(|| a.start_time.cmp(&b.start_time))
        .then_with(|| empty_last(&a.end_time, &b.end_time))
}

fn empty_last(a: &str, b: &str) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ => a.cmp(b),
    }
}
