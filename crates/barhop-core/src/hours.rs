//! Business-hours evaluation against a weekly hours map.
//!
//! Every function takes the evaluation instant explicitly and never fails:
//! malformed or missing data degrades to a fallback string (or to "open" when
//! a range cannot be parsed) so callers always have something to show.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDateTime, Timelike};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Weekday names indexed Sunday=0 through Saturday=6.
pub const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

pub const HOURS_UNAVAILABLE: &str = "Hours unavailable";
pub const CLOSED_TODAY: &str = "Closed today";
pub const UNKNOWN: &str = "Unknown";
pub const HOURS_UNKNOWN: &str = "Hours unknown";

const CLOSES_PREFIX: &str = "Closes ";

static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2}):(\d{2})\s*(AM|PM)\s*–\s*(\d{1,2}):(\d{2})\s*(AM|PM)")
        .expect("valid hours range regex")
});

static CLOSING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"–\s*(.+)$").expect("valid closing time regex"));

static OPENING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2}:\d{2}\s*(?:AM|PM))").expect("valid opening time regex"));

/// Per-weekday opening hours, keyed by English weekday name.
///
/// Values are either `"Closed"` (any case) or a range such as
/// `"5:00 PM – 1:00 AM"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeeklyHours(BTreeMap<String, String>);

impl WeeklyHours {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the entry for `day`, replacing any previous value.
    pub fn insert(&mut self, day: impl Into<String>, hours: impl Into<String>) {
        self.0.insert(day.into(), hours.into());
    }

    /// Raw entry for a weekday name.
    #[must_use]
    pub fn get(&self, day: &str) -> Option<&str> {
        self.0.get(day).map(String::as_str)
    }

    /// Raw entry for a weekday index (Sunday=0), wrapping modulo 7.
    #[must_use]
    pub fn for_day_index(&self, index: usize) -> Option<&str> {
        self.get(DAY_NAMES[index % 7])
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for WeeklyHours {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meridiem {
    Am,
    Pm,
}

/// A 12-hour clock reading as written in an hours string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTime {
    pub hour: u32,
    pub minute: u32,
    pub meridiem: Meridiem,
}

impl ClockTime {
    /// Minutes since midnight.
    ///
    /// `12:MM AM` maps to the minute component alone; any other PM hour
    /// gains 12 hours.
    #[must_use]
    pub fn minutes_since_midnight(&self) -> u32 {
        match self.meridiem {
            Meridiem::Pm if self.hour != 12 => self.hour * 60 + self.minute + 720,
            Meridiem::Am if self.hour == 12 => self.minute,
            _ => self.hour * 60 + self.minute,
        }
    }
}

/// One day's entry after parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayHours {
    Closed,
    Range { open: ClockTime, close: ClockTime },
    Unparsed,
}

/// Parses a single day's hours text.
#[must_use]
pub fn parse_day_hours(raw: &str) -> DayHours {
    if is_closed(raw) {
        return DayHours::Closed;
    }

    let Some(caps) = RANGE_RE.captures(raw) else {
        return DayHours::Unparsed;
    };

    let clock = |h: usize, m: usize, p: usize| -> Option<ClockTime> {
        Some(ClockTime {
            hour: caps.get(h)?.as_str().parse().ok()?,
            minute: caps.get(m)?.as_str().parse().ok()?,
            meridiem: if caps.get(p)?.as_str() == "PM" {
                Meridiem::Pm
            } else {
                Meridiem::Am
            },
        })
    };

    match (clock(1, 2, 3), clock(4, 5, 6)) {
        (Some(open), Some(close)) => DayHours::Range { open, close },
        _ => DayHours::Unparsed,
    }
}

fn is_closed(raw: &str) -> bool {
    raw.eq_ignore_ascii_case("closed")
}

fn day_index(now: &NaiveDateTime) -> usize {
    now.weekday().num_days_from_sunday() as usize
}

fn present(hours: Option<&WeeklyHours>) -> Option<&WeeklyHours> {
    hours.filter(|h| !h.is_empty())
}

/// Today's entry; a blank value counts as missing.
fn today_entry<'a>(hours: Option<&'a WeeklyHours>, now: &NaiveDateTime) -> Option<&'a str> {
    present(hours)
        .and_then(|h| h.for_day_index(day_index(now)))
        .filter(|entry| !entry.trim().is_empty())
}

/// Today's closing time, e.g. `"Closes 1:00 AM"`.
///
/// Returns `"Hours unavailable"` without data for today and `"Closed today"`
/// for a closed day. Text without an en-dash is returned unchanged.
#[must_use]
pub fn closing_time(hours: Option<&WeeklyHours>, now: &NaiveDateTime) -> String {
    let Some(today) = today_entry(hours, now) else {
        return HOURS_UNAVAILABLE.to_string();
    };

    if is_closed(today) {
        return CLOSED_TODAY.to_string();
    }

    match CLOSING_RE.captures(today).and_then(|c| c.get(1)) {
        Some(close) => format!("{CLOSES_PREFIX}{}", close.as_str().trim()),
        None => today.to_string(),
    }
}

/// Whether the venue is open at `now`.
///
/// Unparseable ranges count as open.
#[must_use]
pub fn is_open_now(hours: Option<&WeeklyHours>, now: &NaiveDateTime) -> bool {
    let Some(today) = today_entry(hours, now) else {
        return false;
    };

    match parse_day_hours(today) {
        DayHours::Closed => false,
        DayHours::Unparsed => true,
        DayHours::Range { open, close } => {
            let open = open.minutes_since_midnight();
            let close = close.minutes_since_midnight();
            let current = now.hour() * 60 + now.minute();
            if close < open {
                current >= open || current <= close
            } else {
                current >= open && current <= close
            }
        }
    }
}

/// The next day (strictly after today, up to a week out) with an opening
/// time, e.g. `"tomorrow at 5:00 PM"` or `"Sunday at 12:00 PM"`.
#[must_use]
pub fn next_opening_time(hours: Option<&WeeklyHours>, now: &NaiveDateTime) -> String {
    let Some(hours) = present(hours) else {
        return UNKNOWN.to_string();
    };

    let today = day_index(now);
    for offset in 1..=7 {
        let index = (today + offset) % 7;
        let Some(entry) = hours.for_day_index(index) else {
            continue;
        };
        if is_closed(entry) {
            continue;
        }
        if let Some(open) = OPENING_RE.captures(entry).and_then(|c| c.get(1)) {
            let open = open.as_str();
            return if offset == 1 {
                format!("tomorrow at {open}")
            } else {
                format!("{} at {open}", DAY_NAMES[index])
            };
        }
    }

    UNKNOWN.to_string()
}

/// Composite status line, e.g. `"Open until 1:00 AM"` or
/// `"Closed until tomorrow at 5:00 PM"`.
#[must_use]
pub fn open_status_message(hours: Option<&WeeklyHours>, now: &NaiveDateTime) -> String {
    if present(hours).is_none() {
        return HOURS_UNKNOWN.to_string();
    }

    if is_open_now(hours, now) {
        let closing = closing_time(hours, now);
        if closing == CLOSED_TODAY {
            return "Open".to_string();
        }
        let until = closing.strip_prefix(CLOSES_PREFIX).unwrap_or(&closing);
        format!("Open until {until}")
    } else {
        let next = next_opening_time(hours, now);
        if next == UNKNOWN {
            "Closed".to_string()
        } else {
            format!("Closed until {next}")
        }
    }
}

/// Every derived hours field for one venue at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenStatus {
    pub is_open_now: bool,
    pub closing_time: String,
    pub next_opening: String,
    pub message: String,
}

impl OpenStatus {
    #[must_use]
    pub fn evaluate(hours: Option<&WeeklyHours>, now: &NaiveDateTime) -> Self {
        Self {
            is_open_now: is_open_now(hours, now),
            closing_time: closing_time(hours, now),
            next_opening: next_opening_time(hours, now),
            message: open_status_message(hours, now),
        }
    }
}

#[cfg(test)]
#[path = "hours_test.rs"]
mod tests;
