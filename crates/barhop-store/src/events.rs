use barhop_core::Event;

use crate::{MemStore, StoreError};

/// Events ordered by start time (id breaks ties), optionally featured only.
pub async fn list_events(store: &MemStore, featured_only: bool) -> Vec<Event> {
    let state = store.state.read().await;
    let mut events: Vec<Event> = state
        .events
        .values()
        .filter(|e| !featured_only || e.is_featured)
        .cloned()
        .collect();
    events.sort_by(|a, b| a.starts_at.cmp(&b.starts_at).then(a.id.cmp(&b.id)));
    events
}

/// # Errors
///
/// Returns [`StoreError::NotFound`] if no event has that id.
pub async fn get_event(store: &MemStore, id: i64) -> Result<Event, StoreError> {
    store
        .state
        .read()
        .await
        .events
        .get(&id)
        .cloned()
        .ok_or(StoreError::NotFound)
}

#[cfg(test)]
mod tests {
    use barhop_core::seed::{parse_seed, DEFAULT_SEED};

    use super::*;

    #[tokio::test]
    async fn list_events_orders_by_start_time() {
        let store = MemStore::seeded(&parse_seed(DEFAULT_SEED).unwrap())
            .await
            .unwrap();
        let titles: Vec<String> = list_events(&store, false)
            .await
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(
            titles,
            [
                "Happy Hour Specials",
                "Live Jazz Night",
                "Sarah's 25th Birthday Bash",
                "Trivia Tuesday",
                "Karaoke Night Champions",
            ]
        );
    }

    #[tokio::test]
    async fn featured_filter_keeps_featured_only() {
        let store = MemStore::seeded(&parse_seed(DEFAULT_SEED).unwrap())
            .await
            .unwrap();
        let featured = list_events(&store, true).await;
        assert_eq!(featured.len(), 2);
        assert!(featured.iter().all(|e| e.is_featured));
    }

    #[tokio::test]
    async fn get_event_by_id() {
        let store = MemStore::seeded(&parse_seed(DEFAULT_SEED).unwrap())
            .await
            .unwrap();
        assert_eq!(get_event(&store, 1).await.unwrap().title, "Live Jazz Night");
        assert!(matches!(get_event(&store, 99).await, Err(StoreError::NotFound)));
    }
}
