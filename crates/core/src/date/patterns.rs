//! Ordered library of date shapes used to find dates inside free text.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

const MONTH: &str = r"(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)";

/// A recognizable date shape, listed in matching priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateShape {
    /// `2024-03-15`, optionally with a time and offset.
    Iso,
    /// `March 15, 2024`, optionally followed by a clock time.
    WrittenMonth,
    /// `15 March 2024`.
    DayMonthYear,
    /// `03/15/2024`.
    Us,
    /// `15.03.2024`.
    European,
    /// `3 days ago`.
    Relative,
    /// 10- or 13-digit epoch value.
    UnixTimestamp,
}

struct ShapeSpec {
    shape: DateShape,
    pattern: String,
}

fn shape_specs() -> Vec<ShapeSpec> {
    vec![
        ShapeSpec {
            shape: DateShape::Iso,
            pattern: r"\b\d{4}-\d{2}-\d{2}(?:[T ]\d{2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:Z|[+-]\d{2}:?\d{2})?)?".to_string(),
        },
        ShapeSpec {
            shape: DateShape::WrittenMonth,
            pattern: format!(
                r"(?i)\b{MONTH}\.?\s+\d{{1,2}}(?:st|nd|rd|th)?,?\s+\d{{4}}(?:,?\s+(?:at\s+)?\d{{1,2}}:\d{{2}}(?:\s*[ap]\.?m\.?)?)?"
            ),
        },
        ShapeSpec {
            shape: DateShape::DayMonthYear,
            pattern: format!(r"(?i)\b\d{{1,2}}(?:st|nd|rd|th)?\s+{MONTH}\.?,?\s+\d{{4}}\b"),
        },
        ShapeSpec { shape: DateShape::Us, pattern: r"\b\d{1,2}/\d{1,2}/\d{4}\b".to_string() },
        ShapeSpec { shape: DateShape::European, pattern: r"\b\d{1,2}\.\d{1,2}\.\d{4}\b".to_string() },
        ShapeSpec {
            shape: DateShape::Relative,
            pattern: r"(?i)\b\d+\s+(?:minute|min|hour|day|week|month|year)s?\s+ago\b".to_string(),
        },
        ShapeSpec { shape: DateShape::UnixTimestamp, pattern: r"\b\d{10}(?:\d{3})?\b".to_string() },
    ]
}

static SHAPES: LazyLock<Vec<(DateShape, Regex)>> = LazyLock::new(|| {
    shape_specs()
        .into_iter()
        .map(|spec| (spec.shape, Regex::new(&spec.pattern).unwrap()))
        .collect()
});

/// Returns the first substring matching the highest-priority shape.
///
/// ```rust
/// use threatscope_core::date::{DateShape, first_match};
///
/// let (shape, text) = first_match("Posted by staff on March 3, 2024 in News").unwrap();
/// assert_eq!(shape, DateShape::WrittenMonth);
/// assert_eq!(text, "March 3, 2024");
/// ```
pub fn first_match(text: &str) -> Option<(DateShape, &str)> {
    candidates(text).next()
}

/// Iterates every date-shaped substring, grouped by shape priority and in
/// position order within a shape.
pub fn candidates(text: &str) -> impl Iterator<Item = (DateShape, &str)> {
    SHAPES
        .iter()
        .flat_map(move |(shape, re)| re.find_iter(text).map(move |m| (*shape, m.as_str())))
}
