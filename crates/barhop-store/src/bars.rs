//! Bar queries and writes.

use barhop_core::geo::km_to_miles;
use barhop_core::{Bar, Coordinate, NewBar, RankedBar};
use chrono::Utc;

use crate::ranking::rank_by_distance;
use crate::{MemStore, StoreError};

/// Insert a new bar and return it with its assigned id.
///
/// # Errors
///
/// Returns [`StoreError::Invalid`] if the bar fails validation.
pub async fn create_bar(store: &MemStore, new_bar: NewBar) -> Result<Bar, StoreError> {
    new_bar.validate()?;

    let mut state = store.state.write().await;
    let id = state.allocate_bar_id();
    let bar = new_bar.into_bar(id, Utc::now());
    state.bars.insert(id, bar.clone());
    Ok(bar)
}

/// Fetch a bar by id.
///
/// # Errors
///
/// Returns [`StoreError::NotFound`] if no bar has that id.
pub async fn get_bar(store: &MemStore, id: i64) -> Result<Bar, StoreError> {
    store
        .state
        .read()
        .await
        .bars
        .get(&id)
        .cloned()
        .ok_or(StoreError::NotFound)
}

/// All bars in id order.
pub async fn list_bars(store: &MemStore) -> Vec<Bar> {
    store.state.read().await.bars.values().cloned().collect()
}

/// Sponsored bars in id order.
pub async fn sponsored_bars(store: &MemStore) -> Vec<Bar> {
    store
        .state
        .read()
        .await
        .bars
        .values()
        .filter(|b| b.is_sponsored)
        .cloned()
        .collect()
}

/// Bars within `radius_km` of `origin`, nearest first.
///
/// # Errors
///
/// Returns [`StoreError::Invalid`] if `radius_km` is negative or not finite.
pub async fn nearby_bars(
    store: &MemStore,
    origin: &Coordinate,
    radius_km: f64,
) -> Result<Vec<RankedBar>, StoreError> {
    if !radius_km.is_finite() || radius_km < 0.0 {
        return Err(barhop_core::CoreError::InvalidArgument(format!(
            "radius {radius_km} km must be a non-negative number"
        ))
        .into());
    }

    let state = store.state.read().await;
    Ok(rank_by_distance(
        state.bars.values(),
        origin,
        Some(km_to_miles(radius_km)),
    ))
}

/// Case-insensitive search over name, type, address and features.
///
/// With an `origin` the matches are ranked nearest first and carry their
/// distance; without one they stay in id order.
pub async fn search_bars(
    store: &MemStore,
    query: &str,
    origin: Option<&Coordinate>,
) -> Vec<SearchHit> {
    let state = store.state.read().await;
    let matches = state.bars.values().filter(|b| b.matches_query(query));

    match origin {
        Some(origin) => rank_by_distance(matches, origin, None)
            .into_iter()
            .map(|r| SearchHit {
                bar: r.bar,
                distance_miles: Some(r.distance_miles),
            })
            .collect(),
        None => matches
            .map(|b| SearchHit {
                bar: b.clone(),
                distance_miles: None,
            })
            .collect(),
    }
}

/// A search match, with distance when the search had an origin.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub bar: Bar,
    pub distance_miles: Option<f64>,
}

/// Merge `incoming` into the bar sharing its place id, or create it.
///
/// Fields present on `incoming` win; absent optional fields keep the stored
/// value. Name and address only change when non-empty.
///
/// # Errors
///
/// Returns [`StoreError::Invalid`] if `incoming` has no place id or fails
/// validation.
pub async fn upsert_bar_by_place_id(store: &MemStore, incoming: NewBar) -> Result<Bar, StoreError> {
    let Some(place_id) = incoming.place_id.clone() else {
        return Err(barhop_core::CoreError::InvalidArgument(
            "upsert requires a place id".to_string(),
        )
        .into());
    };

    let mut state = store.state.write().await;
    let existing_id = state
        .bars
        .values()
        .find(|b| b.place_id.as_deref() == Some(place_id.as_str()))
        .map(|b| b.id);

    let Some(id) = existing_id else {
        incoming.validate()?;
        let id = state.allocate_bar_id();
        let bar = incoming.into_bar(id, Utc::now());
        state.bars.insert(id, bar.clone());
        tracing::debug!(bar_id = id, place_id = %place_id, "created bar from place");
        return Ok(bar);
    };

    let Some(bar) = state.bars.get_mut(&id) else {
        return Err(StoreError::NotFound);
    };
    merge_into(bar, incoming);
    tracing::debug!(bar_id = id, place_id = %place_id, "refreshed bar from place");
    Ok(bar.clone())
}

fn merge_into(bar: &mut Bar, incoming: NewBar) {
    if !incoming.name.trim().is_empty() {
        bar.name = incoming.name;
    }
    if !incoming.address.trim().is_empty() {
        bar.address = incoming.address;
    }
    if let Some(rating) = incoming.rating {
        bar.rating = rating;
    }
    if incoming.user_ratings_total.is_some() {
        bar.user_ratings_total = incoming.user_ratings_total;
    }
    if incoming.phone_number.is_some() {
        bar.phone_number = incoming.phone_number;
    }
    if incoming.website.is_some() {
        bar.website = incoming.website;
    }
    if !incoming.photos.is_empty() {
        bar.photos = incoming.photos;
    }
    if incoming.image_url.is_some() {
        bar.image_url = incoming.image_url;
    }
    if incoming.price_level.is_some() {
        bar.price_level = incoming.price_level;
        bar.price_range = incoming.price_range;
    }
    if incoming.hours.is_some() {
        bar.hours = incoming.hours;
    }
    bar.is_open = incoming.is_open;
    let now = Utc::now();
    bar.last_google_sync = Some(incoming.last_google_sync.unwrap_or(now));
    bar.updated_at = now;
}

#[cfg(test)]
mod tests {
    use barhop_core::seed::{parse_seed, DEFAULT_SEED};
    use barhop_core::WeeklyHours;
    use rust_decimal::Decimal;

    use super::*;

    async fn seeded() -> MemStore {
        MemStore::seeded(&parse_seed(DEFAULT_SEED).unwrap())
            .await
            .unwrap()
    }

    fn place(place_id: &str, name: &str) -> NewBar {
        NewBar {
            place_id: Some(place_id.to_string()),
            name: name.to_string(),
            address: "1 Burnside St, Portland, OR".to_string(),
            latitude: 45.523,
            longitude: -122.67,
            bar_type: "Bar".to_string(),
            is_open: true,
            ..NewBar::default()
        }
    }

    #[tokio::test]
    async fn create_bar_rejects_invalid_coordinates() {
        let store = MemStore::new();
        let err = create_bar(
            &store,
            NewBar {
                name: "Lost".to_string(),
                latitude: -95.0,
                ..NewBar::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
    }

    #[tokio::test]
    async fn get_bar_returns_not_found() {
        let store = seeded().await;
        assert!(matches!(get_bar(&store, 99).await, Err(StoreError::NotFound)));
        assert_eq!(get_bar(&store, 5).await.unwrap().name, "Sky Lounge");
    }

    #[tokio::test]
    async fn sponsored_bars_filters_flag() {
        let store = seeded().await;
        let names: Vec<String> = sponsored_bars(&store)
            .await
            .into_iter()
            .map(|b| b.name)
            .collect();
        assert_eq!(names, ["Neon Nights", "Midnight Lounge"]);
    }

    #[tokio::test]
    async fn nearby_bars_ranks_from_origin() {
        let store = seeded().await;
        let origin = Coordinate::new(45.5152, -122.6784).unwrap();
        let ranked = nearby_bars(&store, &origin, 5.0).await.unwrap();
        assert_eq!(ranked.len(), 5);
        assert_eq!(ranked[0].bar.name, "Neon Nights");
        assert!(ranked
            .windows(2)
            .all(|w| w[0].distance_miles <= w[1].distance_miles));
    }

    #[tokio::test]
    async fn nearby_bars_respects_radius() {
        let store = seeded().await;
        // Seattle: every Portland seed bar is ~145 miles away.
        let origin = Coordinate::new(47.6062, -122.3321).unwrap();
        assert!(nearby_bars(&store, &origin, 5.0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn nearby_bars_rejects_negative_radius() {
        let store = seeded().await;
        let origin = Coordinate::new(45.5, -122.6).unwrap();
        assert!(matches!(
            nearby_bars(&store, &origin, -1.0).await,
            Err(StoreError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn search_matches_features_and_ranks_with_origin() {
        let store = seeded().await;
        let hits = search_bars(&store, "cocktail", None).await;
        let names: Vec<&str> = hits.iter().map(|h| h.bar.name.as_str()).collect();
        assert_eq!(names, ["Midnight Lounge", "Sky Lounge"]);
        assert!(hits.iter().all(|h| h.distance_miles.is_none()));

        let origin = Coordinate::new(45.5200, -122.6820).unwrap();
        let hits = search_bars(&store, "cocktail", Some(&origin)).await;
        assert_eq!(hits[0].bar.name, "Sky Lounge");
        assert!(hits.iter().all(|h| h.distance_miles.is_some()));
    }

    #[tokio::test]
    async fn search_with_no_matches_is_empty() {
        let store = seeded().await;
        assert!(search_bars(&store, "karaoke", None).await.is_empty());
    }

    #[tokio::test]
    async fn upsert_creates_then_updates() {
        let store = MemStore::new();
        let created = upsert_bar_by_place_id(&store, place("abc", "Dive"))
            .await
            .unwrap();
        assert_eq!(created.id, 1);

        let mut hours = WeeklyHours::new();
        hours.insert("Monday", "4:00 PM – 2:00 AM");
        let refreshed = upsert_bar_by_place_id(
            &store,
            NewBar {
                rating: Some(Decimal::new(42, 1)),
                hours: Some(hours.clone()),
                phone_number: None,
                ..place("abc", "Dive Bar")
            },
        )
        .await
        .unwrap();

        assert_eq!(refreshed.id, 1);
        assert_eq!(refreshed.name, "Dive Bar");
        assert_eq!(refreshed.rating, Decimal::new(42, 1));
        assert_eq!(refreshed.hours, Some(hours));
        assert!(refreshed.last_google_sync.is_some());
        assert_eq!(list_bars(&store).await.len(), 1);
    }

    #[tokio::test]
    async fn upsert_keeps_existing_optional_fields() {
        let store = MemStore::new();
        upsert_bar_by_place_id(
            &store,
            NewBar {
                website: Some("https://dive.example.com".to_string()),
                ..place("abc", "Dive")
            },
        )
        .await
        .unwrap();
        let refreshed = upsert_bar_by_place_id(&store, place("abc", ""))
            .await
            .unwrap();
        assert_eq!(refreshed.name, "Dive");
        assert_eq!(refreshed.website.as_deref(), Some("https://dive.example.com"));
    }

    #[tokio::test]
    async fn upsert_requires_place_id() {
        let store = MemStore::new();
        let err = upsert_bar_by_place_id(
            &store,
            NewBar {
                place_id: None,
                ..place("x", "Dive")
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
    }
}
