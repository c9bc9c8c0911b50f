//! BarHop social events shown on the discover feed.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    LiveMusic,
    Birthday,
    Celebration,
    HappyHour,
    Karaoke,
    Trivia,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrganizerKind {
    Bar,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organizer {
    pub kind: OrganizerKind,
    pub name: String,
    #[serde(default)]
    pub profile_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Venue {
    #[must_use]
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub id: i64,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub organizer: Organizer,
    pub venue: Venue,
    /// Local start time at the venue.
    pub starts_at: NaiveDateTime,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub attendee_count: u32,
    #[serde(default)]
    pub max_attendees: Option<u32>,
    #[serde(default)]
    pub is_sponsored: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
}

impl Event {
    /// `true` once `max_attendees` is reached. Events without a cap never fill.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.max_attendees
            .is_some_and(|max| self.attendee_count >= max)
    }
}
