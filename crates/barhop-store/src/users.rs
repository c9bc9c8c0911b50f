//! Users and their favorite bars.

use barhop_core::{NewUser, User};
use chrono::Utc;

use crate::{MemStore, StoreError};

/// Create a user with a unique username.
///
/// # Errors
///
/// Returns [`StoreError::Invalid`] for a bad username and
/// [`StoreError::Conflict`] if the username is taken (case-insensitive).
pub async fn create_user(store: &MemStore, new_user: NewUser) -> Result<User, StoreError> {
    new_user.validate()?;

    let mut state = store.state.write().await;
    let wanted = new_user.username.trim().to_lowercase();
    if state
        .users
        .values()
        .any(|u| u.username.to_lowercase() == wanted)
    {
        return Err(StoreError::Conflict(format!(
            "username '{}' is already taken",
            new_user.username.trim()
        )));
    }

    let id = state.allocate_user_id();
    let user = new_user.into_user(id, Utc::now());
    state.users.insert(id, user.clone());
    Ok(user)
}

/// # Errors
///
/// Returns [`StoreError::NotFound`] if no user has that id.
pub async fn get_user(store: &MemStore, id: i64) -> Result<User, StoreError> {
    store
        .state
        .read()
        .await
        .users
        .get(&id)
        .cloned()
        .ok_or(StoreError::NotFound)
}

/// Username lookup, case-insensitive like the uniqueness check in
/// [`create_user`].
pub async fn get_user_by_username(store: &MemStore, username: &str) -> Option<User> {
    let wanted = username.trim().to_lowercase();
    store
        .state
        .read()
        .await
        .users
        .values()
        .find(|u| u.username.to_lowercase() == wanted)
        .cloned()
}

/// Flip the favorite flag for `(user_id, bar_id)` and return the new state.
///
/// # Errors
///
/// Returns [`StoreError::NotFound`] if the user or bar does not exist.
pub async fn toggle_favorite(
    store: &MemStore,
    user_id: i64,
    bar_id: i64,
) -> Result<bool, StoreError> {
    let mut state = store.state.write().await;
    if !state.users.contains_key(&user_id) || !state.bars.contains_key(&bar_id) {
        return Err(StoreError::NotFound);
    }

    let key = (user_id, bar_id);
    if state.favorites.remove(&key) {
        Ok(false)
    } else {
        state.favorites.insert(key);
        Ok(true)
    }
}

/// Whether the user has favorited the bar. Unknown ids are simply not favorited.
pub async fn is_bar_favorited(store: &MemStore, user_id: i64, bar_id: i64) -> bool {
    store
        .state
        .read()
        .await
        .favorites
        .contains(&(user_id, bar_id))
}
