//! Google Places (legacy web service) response types.
//!
//! Only the fields the application reads are modelled; everything is
//! optional or defaulted because the API omits fields freely.

use serde::Deserialize;

/// Response of `place/nearbysearch/json`.
#[derive(Debug, Deserialize)]
pub struct NearbySearchResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<PlaceResult>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// One entry of a nearby search.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceResult {
    pub place_id: String,
    pub name: String,
    #[serde(default)]
    pub vicinity: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub business_status: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub user_ratings_total: Option<i64>,
    #[serde(default)]
    pub price_level: Option<u8>,
    #[serde(default)]
    pub photos: Vec<Photo>,
    #[serde(default)]
    pub opening_hours: Option<OpeningHours>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Photo {
    pub photo_reference: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpeningHours {
    #[serde(default)]
    pub open_now: Option<bool>,
    /// Lines such as `"Monday: 4:00 PM – 2:00 AM"`.
    #[serde(default)]
    pub weekday_text: Vec<String>,
}

/// Response of `place/details/json`.
#[derive(Debug, Deserialize)]
pub struct DetailsResponse {
    pub status: String,
    #[serde(default)]
    pub result: Option<PlaceDetails>,
}

/// The `result` object of a details lookup.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceDetails {
    #[serde(default)]
    pub place_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub formatted_phone_number: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub opening_hours: Option<OpeningHours>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub user_ratings_total: Option<i64>,
    #[serde(default)]
    pub photos: Vec<Photo>,
    #[serde(default)]
    pub price_level: Option<u8>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub business_status: Option<String>,
}
