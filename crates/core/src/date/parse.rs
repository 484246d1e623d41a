//! Parsing a single date candidate string.
//!
//! A candidate goes through an ordered list of steps; the first step that
//! produces a timestamp with a plausible year wins. Naive values are taken
//! as UTC.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use regex::{Captures, Regex};

use super::patterns::candidates;

/// Earliest accepted publication year.
pub const MIN_YEAR: i32 = 1990;
/// Latest accepted publication year.
pub const MAX_YEAR: i32 = 2030;

const MIN_CANDIDATE_CHARS: usize = 4;
const MAX_CANDIDATE_CHARS: usize = 100;

const MONTH_ABBR: &str = r"(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?";

static PAREN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^)]*\)").unwrap());
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static AUTHOR_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^by\s").unwrap());
static PERSON_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][a-z'\-]+(?:\s+[A-Z][a-z'\-]+){1,2}$").unwrap());
static TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:\d{10}|\d{13})$").unwrap());
static RELATIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d+)\s+(minute|min|hour|hr|day|week|month|year)s?\s+ago$").unwrap()
});
static LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:last\s+updated|updated|published|posted|modified|released|date)(?:\s+(?:on|at))?\s*:?\s*")
        .unwrap()
});
static WEEKDAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:mon|tue|wed|thu|fri|sat|sun)[a-z]*\.?,?\s+").unwrap());
static TRAILING_TZ_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+(?:[A-Z]{1,4}T|UTC|GMT)$").unwrap());
static AT_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i),?\s+(?:at|@)\s+(\d{1,2}:\d{2})").unwrap());
static TIME_CLAUSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:,|\s+at|\s+@|\s*\|)?\s+\d{1,2}:\d{2}.*$").unwrap());
static ORDINAL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d{1,2})(?:st|nd|rd|th)\b").unwrap());
static MONTH_DOT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b([A-Za-z]{3,4})\.").unwrap());
static MONTH_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b{MONTH_ABBR}\s+(\d{{1,2}}),?\s+(\d{{4}}),?\s+(?:at\s+)?(\d{{1,2}}):(\d{{2}})\s*([ap])\.?m\.?"
    ))
    .unwrap()
});
static MONTH_DAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(?i)\b{MONTH_ABBR}\s+(\d{{1,2}}),?\s+(\d{{4}})\b")).unwrap());
static DAY_MONTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(?i)\b(\d{{1,2}})\s+{MONTH_ABBR},?\s+(\d{{4}})\b")).unwrap());

/// Formats carrying an explicit UTC offset.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M:%S %z",
    "%a, %d %b %Y %H:%M:%S %z",
    "%d %b %Y %H:%M:%S %z",
];

/// Naive date-time formats. US before European where they overlap.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%B %d, %Y %I:%M %p",
    "%B %d, %Y %I:%M:%S %p",
    "%B %d, %Y %H:%M",
    "%B %d %Y %I:%M %p",
    "%d %B %Y %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d.%m.%Y %H:%M",
];

/// Date-only formats. US before European where they overlap.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %B, %Y",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d.%m.%Y",
    "%m-%d-%Y",
];

/// Parses a date candidate relative to the current time.
///
/// ```rust
/// use chrono::{Datelike, Timelike};
/// use threatscope_core::date::parse_date;
///
/// let dt = parse_date("JULY 09, 2025 03:54 PM (EDT)").unwrap();
/// assert_eq!((dt.year(), dt.month(), dt.day()), (2025, 7, 9));
/// assert_eq!((dt.hour(), dt.minute()), (15, 54));
///
/// assert!(parse_date("John Smith").is_none());
/// ```
pub fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    parse_date_at(input, Utc::now())
}

/// Parses a date candidate, resolving relative expressions against `now`.
pub fn parse_date_at(input: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let trimmed = input.trim();

    if trimmed.chars().count() > MAX_CANDIDATE_CHARS {
        return candidates(trimmed)
            .filter(|(_, text)| text.chars().count() <= MAX_CANDIDATE_CHARS)
            .find_map(|(_, text)| parse_candidate(text, now));
    }

    parse_candidate(trimmed, now)
}

fn parse_candidate(candidate: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let len = candidate.chars().count();
    if !(MIN_CANDIDATE_CHARS..=MAX_CANDIDATE_CHARS).contains(&len) || looks_like_author(candidate) {
        return None;
    }

    parse_generic(candidate)
        .or_else(|| parse_timestamp(candidate))
        .or_else(|| parse_relative(candidate, now))
        .or_else(|| parse_labeled(candidate))
        .or_else(|| parse_cleaned(candidate))
}

fn looks_like_author(text: &str) -> bool {
    if AUTHOR_PREFIX_RE.is_match(text) {
        return true;
    }

    !text.chars().any(|c| c.is_ascii_digit()) && PERSON_NAME_RE.is_match(text) && !is_relative_word(text)
}

fn is_relative_word(text: &str) -> bool {
    matches!(text.to_lowercase().as_str(), "today" | "yesterday")
}

fn in_range(dt: DateTime<Utc>) -> Option<DateTime<Utc>> {
    (MIN_YEAR..=MAX_YEAR).contains(&dt.year()).then_some(dt)
}

/// RFC 3339, RFC 2822 and the format tables. Parenthesized comments are ignored.
fn parse_generic(text: &str) -> Option<DateTime<Utc>> {
    let stripped = PAREN_RE.replace_all(text, " ");
    let normalized = WS_RE.replace_all(stripped.trim(), " ");
    let s = normalized.as_ref();

    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return in_range(dt.to_utc());
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return in_range(dt.to_utc());
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return in_range(dt.to_utc());
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return in_range(dt.and_utc());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return in_range(date.and_hms_opt(0, 0, 0)?.and_utc());
        }
    }

    None
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if !TIMESTAMP_RE.is_match(text) {
        return None;
    }

    let value: i64 = text.parse().ok()?;
    let dt = if text.len() == 13 { DateTime::from_timestamp_millis(value)? } else { DateTime::from_timestamp(value, 0)? };
    in_range(dt)
}

fn parse_relative(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match text.to_lowercase().as_str() {
        "today" | "just now" => return in_range(now),
        "yesterday" => return in_range(now.checked_sub_signed(TimeDelta::try_days(1)?)?),
        _ => {}
    }

    let caps = RELATIVE_RE.captures(text)?;
    let amount: i64 = caps[1].parse().ok()?;
    let unit = caps[2].to_lowercase();

    let dt = match unit.as_str() {
        "minute" | "min" => now.checked_sub_signed(TimeDelta::try_minutes(amount)?)?,
        "hour" | "hr" => now.checked_sub_signed(TimeDelta::try_hours(amount)?)?,
        "day" => now.checked_sub_signed(TimeDelta::try_days(amount)?)?,
        "week" => now.checked_sub_signed(TimeDelta::try_weeks(amount)?)?,
        "month" => now.checked_sub_months(Months::new(u32::try_from(amount).ok()?))?,
        "year" => now.checked_sub_months(Months::new(u32::try_from(amount.checked_mul(12)?).ok()?))?,
        _ => return None,
    };

    in_range(dt)
}

/// `Published: X. Last Updated: Y` yields the first labeled date that parses.
fn parse_labeled(text: &str) -> Option<DateTime<Utc>> {
    let labels: Vec<_> = LABEL_RE.find_iter(text).collect();

    for (i, label) in labels.iter().enumerate() {
        let end = labels.get(i + 1).map_or(text.len(), |next| next.start());
        let segment = &text[label.end()..end];
        let segment = segment
            .split(['|', '\u{2022}', '\u{b7}', '\n'])
            .next()
            .unwrap_or_default()
            .trim()
            .trim_end_matches(['.', ',', ';', ':', '-'])
            .trim();

        if segment.chars().count() < MIN_CANDIDATE_CHARS {
            continue;
        }

        if let Some(dt) = parse_generic(segment).or_else(|| parse_cleaned(segment)) {
            return Some(dt);
        }
    }

    None
}

/// Strips decorations that defeat the format tables, then retries with
/// progressively looser matching.
fn parse_cleaned(text: &str) -> Option<DateTime<Utc>> {
    let cleaned = clean_candidate(text);

    if let Some(dt) = parse_generic(&cleaned) {
        return Some(dt);
    }

    let without_time = TIME_CLAUSE_RE.replace(&cleaned, "");
    if without_time != cleaned
        && let Some(dt) = parse_generic(without_time.trim())
    {
        return Some(dt);
    }

    parse_month_time(&cleaned).or_else(|| parse_month_date(&cleaned))
}

fn clean_candidate(text: &str) -> String {
    let s = PAREN_RE.replace_all(text, " ");
    let s = WS_RE.replace_all(s.trim(), " ");
    let s = WEEKDAY_RE.replace(&s, "");
    let s = TRAILING_TZ_RE.replace(&s, "");
    let s = AT_TIME_RE.replace(&s, " $1");
    let s = ORDINAL_RE.replace_all(&s, "$1");
    let s = MONTH_DOT_RE.replace_all(&s, "$1");
    s.trim().trim_end_matches([',', '.']).trim().to_string()
}

/// Month name, day, year and a 12-hour clock time.
fn parse_month_time(text: &str) -> Option<DateTime<Utc>> {
    let caps = MONTH_TIME_RE.captures(text)?;
    let date = date_from_parts(&caps[1], &caps[2], &caps[3])?;

    let hour: u32 = caps[4].parse().ok()?;
    let minute: u32 = caps[5].parse().ok()?;
    if !(1..=12).contains(&hour) {
        return None;
    }
    let is_pm = caps[6].eq_ignore_ascii_case("p");
    let hour = hour % 12 + if is_pm { 12 } else { 0 };

    in_range(date.and_hms_opt(hour, minute, 0)?.and_utc())
}

/// Month name and day in either order, without a time.
fn parse_month_date(text: &str) -> Option<DateTime<Utc>> {
    let date = if let Some(caps) = MONTH_DAY_RE.captures(text) {
        date_from_caps(&caps, 1, 2, 3)
    } else {
        let caps = DAY_MONTH_RE.captures(text)?;
        date_from_caps(&caps, 2, 1, 3)
    }?;

    in_range(date.and_hms_opt(0, 0, 0)?.and_utc())
}

fn date_from_caps(caps: &Captures<'_>, month: usize, day: usize, year: usize) -> Option<NaiveDate> {
    date_from_parts(&caps[month], &caps[day], &caps[year])
}

fn date_from_parts(month: &str, day: &str, year: &str) -> Option<NaiveDate> {
    let month = month_number(month)?;
    let day: u32 = day.parse().ok()?;
    let year: i32 = year.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Month number from any spelling whose first three letters identify it.
fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}
