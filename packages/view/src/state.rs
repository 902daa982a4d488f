//! Application state held by the presentation layer.
//!
//! The presentation layer owns one [`AppState`], feeds UI events into it,
//! and calls [`AppState::derive`] to get a fresh snapshot after each one.

use event_map_record_models::{EventRecord, LoadSignal};

use crate::filter::{FilterState, view};
use crate::group::{CoordinateGroup, MarkerSummary, group, markers};
use crate::palette::{CategoryButton, category_buttons};

/// Working set, load outcome, and filter selection.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    records: Vec<EventRecord>,
    signal: LoadSignal,
    filter: FilterState,
}

/// Everything rendered for the current state, recomputed from scratch.
#[derive(Debug, Clone, PartialEq)]
pub struct Derived<'a> {
    /// Filtered records in display order.
    pub view: Vec<&'a EventRecord>,
    /// View records grouped by rounded coordinate.
    pub groups: Vec<CoordinateGroup<'a>>,
    /// One marker per group.
    pub markers: Vec<MarkerSummary>,
}

impl AppState {
    /// Creates the state for a freshly loaded working set with no filters.
    #[must_use]
    pub fn new(records: Vec<EventRecord>, signal: LoadSignal) -> Self {
        Self {
            records,
            signal,
            filter: FilterState::default(),
        }
    }

    /// The full working set.
    #[must_use]
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Outcome of the load that produced the working set.
    #[must_use]
    pub const fn signal(&self) -> LoadSignal {
        self.signal
    }

    /// Current filter selection.
    #[must_use]
    pub const fn filter(&self) -> &FilterState {
        &self.filter
    }

    /// Category buttons for the whole working set.
    #[must_use]
    pub fn category_buttons(&self) -> Vec<CategoryButton> {
        category_buttons(&self.records)
    }

    /// Selects a category, or clears it if it is already selected.
    pub fn toggle_category(&mut self, category: &str) {
        self.filter.toggle_category(category);
    }

    /// Clears the category selection.
    pub fn select_all(&mut self) {
        self.filter.select_all();
    }

    /// Replaces the search query.
    pub fn set_search(&mut self, query: &str) {
        self.filter.set_search(query);
    }

    /// Swaps in a new working set. The filter selection is kept.
    pub fn replace_records(&mut self, records: Vec<EventRecord>, signal: LoadSignal) {
        self.records = records;
        self.signal = signal;
    }

    /// Derives the view, its coordinate groups, and their markers.
    #[must_use]
    pub fn derive(&self) -> Derived<'_> {
        let view = view(&self.records, &self.filter);
        let groups = group(&view);
        let markers = markers(&groups);
        log::debug!(
            "Derived {} of {} records in {} groups",
            view.len(),
            self.records.len(),
            groups.len()
        );
        Derived {
            view,
            groups,
            markers,
        }
    }
}
