//! Category colors and the category button list.

use std::str::FromStr;

use event_map_record_models::EventRecord;
use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumString};

/// Color used for categories without an entry in the palette.
pub const DEFAULT_COLOR: &str = "#43c59e";

/// Text of the button that clears the category filter.
pub const ALL_BUTTON_TEXT: &str = "すべて";

/// Color of the button that clears the category filter.
pub const ALL_BUTTON_COLOR: &str = "#333";

/// Categories that, when present, get their buttons first and in this
/// order.
pub const PREFERRED_ORDER: &[&str] = &[
    "お笑い芸人",
    "一日目",
    "二日目",
    "屋外出店",
    "屋内出店",
    "展示",
];

/// Categories with a dedicated color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
pub enum KnownCategory {
    /// Events
    #[strum(serialize = "イベント")]
    Event,
    /// Hands-on activities
    #[strum(serialize = "体験")]
    Activity,
    /// Exhibitions
    #[strum(serialize = "展示")]
    Exhibition,
    /// Food stalls
    #[strum(serialize = "食べ物")]
    Food,
    /// Plain places (also the default category)
    #[strum(serialize = "場所")]
    Place,
    /// Transport
    #[strum(serialize = "交通")]
    Transport,
    /// Live shows
    #[strum(serialize = "ライブ")]
    Live,
}

impl KnownCategory {
    /// Marker and button color.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Event => "#e74c3c",
            Self::Activity => "#f1c40f",
            Self::Exhibition => "#3498db",
            Self::Food => "#ff9800",
            Self::Place => "#43c59e",
            Self::Transport => "#9b59b6",
            Self::Live => "#e91e63",
        }
    }

    /// English label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Event => "Events",
            Self::Activity => "Activities",
            Self::Exhibition => "Exhibitions",
            Self::Food => "Food",
            Self::Place => "Places",
            Self::Transport => "Transport",
            Self::Live => "Live Shows",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Event,
            Self::Activity,
            Self::Exhibition,
            Self::Food,
            Self::Place,
            Self::Transport,
            Self::Live,
        ]
    }
}

/// Color for a (defaulted) category name.
#[must_use]
pub fn category_color(category: &str) -> &'static str {
    KnownCategory::from_str(category).map_or(DEFAULT_COLOR, KnownCategory::color)
}

/// Label for a (defaulted) category name: the English label for known
/// categories, the name itself otherwise.
#[must_use]
pub fn category_label(category: &str) -> &str {
    match KnownCategory::from_str(category) {
        Ok(known) => known.label(),
        Err(_) => category,
    }
}

/// One category filter button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryButton {
    /// Category selected by the button, `None` for "all".
    pub category: Option<String>,
    /// Button text.
    pub text: String,
    /// Button color.
    pub color: &'static str,
}

impl CategoryButton {
    fn all() -> Self {
        Self {
            category: None,
            text: ALL_BUTTON_TEXT.to_string(),
            color: ALL_BUTTON_COLOR,
        }
    }

    fn for_category(category: &str) -> Self {
        Self {
            category: Some(category.to_string()),
            text: category.to_string(),
            color: category_color(category),
        }
    }
}

/// Distinct defaulted categories in first-seen order.
#[must_use]
pub fn categories_in(records: &[EventRecord]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for record in records {
        let category = record.defaulted_category();
        if !seen.contains(&category) {
            seen.push(category);
        }
    }
    seen
}

/// Buttons for the categories present in `records`: "all" first, then the
/// [`PREFERRED_ORDER`] categories that are present, then every other
/// present category in first-seen order.
#[must_use]
pub fn category_buttons(records: &[EventRecord]) -> Vec<CategoryButton> {
    let present = categories_in(records);

    let preferred = PREFERRED_ORDER
        .iter()
        .copied()
        .filter(|category| present.contains(category));
    let rest = present
        .iter()
        .copied()
        .filter(|category| !PREFERRED_ORDER.contains(category));

    std::iter::once(CategoryButton::all())
        .chain(preferred.chain(rest).map(CategoryButton::for_category))
        .collect()
}
