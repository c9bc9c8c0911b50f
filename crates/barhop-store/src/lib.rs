//! In-memory storage for bars, users, favorites and events.
//!
//! Operations are free functions over a cloneable [`MemStore`] handle so
//! request handlers can share one store through application state.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use barhop_core::{Bar, CoreError, Event, SeedFile, User};
use thiserror::Error;
use tokio::sync::RwLock;

pub mod bars;
pub mod events;
pub mod ranking;
pub mod users;

pub use bars::{
    create_bar, get_bar, list_bars, nearby_bars, search_bars, sponsored_bars, SearchHit,
    upsert_bar_by_place_id,
};
pub use events::{get_event, list_events};
pub use ranking::rank_by_distance;
pub use users::{create_user, get_user, get_user_by_username, is_bar_favorited, toggle_favorite};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Invalid(#[from] CoreError),
}

#[derive(Debug, Default)]
pub(crate) struct StoreState {
    pub(crate) bars: BTreeMap<i64, Bar>,
    pub(crate) users: BTreeMap<i64, User>,
    pub(crate) events: BTreeMap<i64, Event>,
    /// `(user_id, bar_id)` pairs.
    pub(crate) favorites: HashSet<(i64, i64)>,
    next_bar_id: i64,
    next_user_id: i64,
    next_event_id: i64,
}

impl StoreState {
    pub(crate) fn allocate_bar_id(&mut self) -> i64 {
        self.next_bar_id += 1;
        self.next_bar_id
    }

    pub(crate) fn allocate_user_id(&mut self) -> i64 {
        self.next_user_id += 1;
        self.next_user_id
    }

    pub(crate) fn allocate_event_id(&mut self) -> i64 {
        self.next_event_id += 1;
        self.next_event_id
    }
}

/// Shared handle to the in-memory store. Clones point at the same data.
#[derive(Debug, Clone, Default)]
pub struct MemStore {
    pub(crate) state: Arc<RwLock<StoreState>>,
}

impl MemStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated from a validated seed file.
    ///
    /// Ids are assigned in seed order starting at 1.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] if a seed bar fails validation.
    pub async fn seeded(seed: &SeedFile) -> Result<Self, StoreError> {
        let store = Self::new();
        for bar in &seed.bars {
            create_bar(&store, bar.clone()).await?;
        }

        let mut state = store.state.write().await;
        for event in &seed.events {
            let id = state.allocate_event_id();
            state.events.insert(
                id,
                Event {
                    id,
                    ..event.clone()
                },
            );
        }
        tracing::info!(
            bars = state.bars.len(),
            events = state.events.len(),
            "store seeded"
        );
        drop(state);

        Ok(store)
    }

    /// Record counts, used by the health endpoint.
    pub async fn counts(&self) -> StoreCounts {
        let state = self.state.read().await;
        StoreCounts {
            bars: state.bars.len(),
            users: state.users.len(),
            events: state.events.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreCounts {
    pub bars: usize,
    pub users: usize,
    pub events: usize,
}
