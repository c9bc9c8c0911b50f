//! Reshaping of Places responses into the bar shapes the API serves.

use barhop_core::hours::DAY_NAMES;
use barhop_core::{NewBar, WeeklyHours};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::{PlaceDetails, PlaceResult};

/// Upper bound the Places API accepts for a nearby search radius.
pub const MAX_RADIUS_METERS: u32 = 50_000;

/// Image used when a place has no photos.
pub const PLACEHOLDER_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1571019613454-1cb2f99b2d8b?w=400";

const THUMBNAIL_WIDTH: u32 = 400;
const GALLERY_WIDTH: u32 = 600;
const MAX_GALLERY_PHOTOS: usize = 5;
const FEATURE_TYPES: [&str; 4] = ["bar", "night_club", "restaurant", "food"];

/// Google lists `weekday_text` starting on Monday.
const WEEKDAY_TEXT_ORDER: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// A nearby search hit shaped like a bar listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyPlace {
    pub place_id: String,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "type")]
    pub place_type: String,
    pub description: String,
    pub rating: Decimal,
    pub user_ratings_total: Option<i64>,
    /// `"Open now"` or `"Hours vary"`; nearby results carry no weekly hours.
    pub hours: String,
    pub image_url: String,
    pub features: Vec<String>,
    pub is_sponsored: bool,
    pub promotion: Option<String>,
    pub is_open: bool,
    pub price_range: String,
}

/// Converts a search radius in kilometres to metres, capped at
/// [`MAX_RADIUS_METERS`]. Negative or NaN input yields 0.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn radius_meters(radius_km: f64) -> u32 {
    let meters = (radius_km * 1000.0).clamp(0.0, f64::from(MAX_RADIUS_METERS));
    if meters.is_nan() {
        return 0;
    }
    meters.round() as u32
}

fn has_type(types: &[String], wanted: &str) -> bool {
    types.iter().any(|t| t == wanted)
}

/// `Nightclub`, `Bar & Restaurant` or `Bar`, in that order of precedence.
#[must_use]
pub fn type_label(types: &[String]) -> &'static str {
    if has_type(types, "night_club") {
        "Nightclub"
    } else if has_type(types, "restaurant") {
        "Bar & Restaurant"
    } else {
        "Bar"
    }
}

#[must_use]
pub fn is_operational(business_status: Option<&str>) -> bool {
    business_status == Some("OPERATIONAL")
}

/// e.g. `"Nightclub • Open"` or `"Bar • Closed"`.
#[must_use]
pub fn describe(types: &[String], business_status: Option<&str>) -> String {
    let kind = if has_type(types, "night_club") {
        "Nightclub"
    } else {
        "Bar"
    };
    let state = if is_operational(business_status) {
        "Open"
    } else {
        "Closed"
    };
    format!("{kind} • {state}")
}

/// One `$` per price level; unknown or zero levels read as `$$`.
#[must_use]
pub fn price_range(price_level: Option<u8>) -> String {
    match price_level {
        Some(level) if level > 0 => "$".repeat(usize::from(level)),
        _ => "$$".to_string(),
    }
}

/// Place types worth surfacing as features.
#[must_use]
pub fn features(types: &[String]) -> Vec<String> {
    types
        .iter()
        .filter(|t| FEATURE_TYPES.contains(&t.as_str()))
        .cloned()
        .collect()
}

/// Ratings are reported to one decimal place; missing ratings read as 0.0.
#[must_use]
pub fn rating(raw: Option<f64>) -> Decimal {
    raw.and_then(|r| Decimal::try_from(r).ok())
        .map_or(Decimal::new(0, 1), |d| d.round_dp(1))
}

/// Builds weekly hours from `weekday_text` lines.
///
/// A line's day comes from its `"<Day>: "` prefix when present, otherwise
/// from its position in Google's Monday-first order. A line without a
/// `": "` separator is recorded as `Closed`. Narrow and thin spaces are
/// folded to plain spaces.
#[must_use]
pub fn weekly_hours_from_text(lines: &[String]) -> Option<WeeklyHours> {
    if lines.is_empty() {
        return None;
    }

    let mut hours = WeeklyHours::new();
    for (index, line) in lines.iter().enumerate().take(WEEKDAY_TEXT_ORDER.len()) {
        let line = line.replace(['\u{202f}', '\u{2009}', '\u{a0}'], " ");
        let (prefix, value) = match line.split_once(": ") {
            Some((prefix, value)) => (Some(prefix.trim()), value.trim().to_string()),
            None => (None, "Closed".to_string()),
        };
        let day = prefix
            .and_then(|p| DAY_NAMES.iter().find(|d| d.eq_ignore_ascii_case(p)))
            .copied()
            .unwrap_or(WEEKDAY_TEXT_ORDER[index]);
        hours.insert(day, value);
    }
    Some(hours)
}

/// Reshapes a nearby search hit. Results without a location are dropped.
pub fn nearby_place(
    result: &PlaceResult,
    photo_url: impl Fn(&str, u32) -> String,
) -> Option<NearbyPlace> {
    let location = result.geometry.as_ref()?.location;
    let business_status = result.business_status.as_deref();
    let open_now = result
        .opening_hours
        .as_ref()
        .and_then(|h| h.open_now)
        .unwrap_or(false);

    Some(NearbyPlace {
        place_id: result.place_id.clone(),
        name: result.name.clone(),
        address: result
            .vicinity
            .clone()
            .or_else(|| result.formatted_address.clone())
            .unwrap_or_else(|| "Address not available".to_string()),
        latitude: location.lat,
        longitude: location.lng,
        place_type: type_label(&result.types).to_string(),
        description: describe(&result.types, business_status),
        rating: rating(result.rating),
        user_ratings_total: result.user_ratings_total,
        hours: if open_now { "Open now" } else { "Hours vary" }.to_string(),
        image_url: result.photos.first().map_or_else(
            || PLACEHOLDER_IMAGE_URL.to_string(),
            |p| photo_url(&p.photo_reference, THUMBNAIL_WIDTH),
        ),
        features: features(&result.types),
        is_sponsored: false,
        promotion: None,
        is_open: is_operational(business_status),
        price_range: price_range(result.price_level),
    })
}

/// Converts a details lookup into a bar record ready for upsert.
///
/// `place_id` is the id that was looked up; it wins over the one echoed in
/// the response. Missing geometry leaves the coordinates at 0.0, which an
/// upsert of an existing bar ignores.
pub fn details_to_new_bar(
    details: &PlaceDetails,
    place_id: &str,
    photo_url: impl Fn(&str, u32) -> String,
) -> NewBar {
    let business_status = details.business_status.as_deref();
    let (latitude, longitude) = details
        .geometry
        .as_ref()
        .map_or((0.0, 0.0), |g| (g.location.lat, g.location.lng));

    NewBar {
        place_id: Some(place_id.to_string()),
        name: details.name.clone(),
        address: details.formatted_address.clone().unwrap_or_default(),
        latitude,
        longitude,
        bar_type: type_label(&details.types).to_string(),
        description: Some(describe(&details.types, business_status)),
        rating: Some(rating(details.rating)),
        user_ratings_total: details.user_ratings_total,
        hours: details
            .opening_hours
            .as_ref()
            .and_then(|h| weekly_hours_from_text(&h.weekday_text)),
        phone_number: details.formatted_phone_number.clone(),
        website: details.website.clone(),
        image_url: details
            .photos
            .first()
            .map(|p| photo_url(&p.photo_reference, THUMBNAIL_WIDTH)),
        photos: details
            .photos
            .iter()
            .take(MAX_GALLERY_PHOTOS)
            .map(|p| photo_url(&p.photo_reference, GALLERY_WIDTH))
            .collect(),
        features: features(&details.types),
        is_open: is_operational(business_status),
        price_range: Some(price_range(details.price_level)),
        price_level: details.price_level,
        ..NewBar::default()
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
