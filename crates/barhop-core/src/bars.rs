use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;
use crate::hours::WeeklyHours;
use crate::CoreError;

/// A venue held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub id: i64,
    pub place_id: Option<String>,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "type")]
    pub bar_type: String,
    pub description: Option<String>,
    pub rating: Decimal,
    pub user_ratings_total: Option<i64>,
    pub hours: Option<WeeklyHours>,
    pub phone_number: Option<String>,
    pub website: Option<String>,
    pub image_url: Option<String>,
    pub photos: Vec<String>,
    pub features: Vec<String>,
    pub is_sponsored: bool,
    pub promotion: Option<String>,
    pub is_open: bool,
    pub price_range: Option<String>,
    pub price_level: Option<u8>,
    pub is_verified: bool,
    pub last_google_sync: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Bar {
    /// The bar's location. Stored coordinates are validated on insert.
    #[must_use]
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    /// Case-insensitive substring match over name, type, address and features.
    #[must_use]
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.bar_type.to_lowercase().contains(&needle)
            || self.address.to_lowercase().contains(&needle)
            || self
                .features
                .iter()
                .any(|f| f.to_lowercase().contains(&needle))
    }
}

/// Input record for creating or upserting a bar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewBar {
    pub place_id: Option<String>,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "type")]
    pub bar_type: String,
    pub description: Option<String>,
    pub rating: Option<Decimal>,
    pub user_ratings_total: Option<i64>,
    pub hours: Option<WeeklyHours>,
    pub phone_number: Option<String>,
    pub website: Option<String>,
    pub image_url: Option<String>,
    pub photos: Vec<String>,
    pub features: Vec<String>,
    pub is_sponsored: bool,
    pub promotion: Option<String>,
    pub is_open: bool,
    pub price_range: Option<String>,
    pub price_level: Option<u8>,
    pub is_verified: bool,
    pub last_google_sync: Option<DateTime<Utc>>,
}

impl NewBar {
    /// Checks name, coordinates and rating bounds.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidArgument`] describing the first problem found.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::InvalidArgument(
                "bar name must be non-empty".to_string(),
            ));
        }
        Coordinate::new(self.latitude, self.longitude)?;
        if let Some(rating) = self.rating {
            if rating < Decimal::ZERO || rating > Decimal::from(5) {
                return Err(CoreError::InvalidArgument(format!(
                    "bar '{}' has rating {rating}; must be between 0.0 and 5.0",
                    self.name
                )));
            }
        }
        Ok(())
    }

    /// Materialises a stored bar with the given id and timestamp.
    #[must_use]
    pub fn into_bar(self, id: i64, now: DateTime<Utc>) -> Bar {
        Bar {
            id,
            place_id: self.place_id,
            name: self.name,
            address: self.address,
            latitude: self.latitude,
            longitude: self.longitude,
            bar_type: self.bar_type,
            description: self.description,
            rating: self.rating.unwrap_or(Decimal::new(0, 1)),
            user_ratings_total: self.user_ratings_total,
            hours: self.hours,
            phone_number: self.phone_number,
            website: self.website,
            image_url: self.image_url,
            photos: self.photos,
            features: self.features,
            is_sponsored: self.is_sponsored,
            promotion: self.promotion,
            is_open: self.is_open,
            price_range: self.price_range,
            price_level: self.price_level,
            is_verified: self.is_verified,
            last_google_sync: self.last_google_sync,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A bar paired with its distance from a query point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedBar {
    pub bar: Bar,
    pub distance_miles: f64,
}
