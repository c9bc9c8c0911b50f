//! Google Places client used to discover bars near a location and to refresh
//! stored bars with place details.

pub mod client;
pub mod error;
pub mod normalize;
pub(crate) mod retry;
pub mod types;

pub use client::{PlacesClient, SearchStrategy, SEARCH_STRATEGIES};
pub use error::PlacesError;
pub use normalize::{details_to_new_bar, radius_meters, NearbyPlace, MAX_RADIUS_METERS};
