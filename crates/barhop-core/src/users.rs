use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,
    pub is_location_sharing_enabled: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewUser {
    pub username: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,
    pub is_location_sharing_enabled: bool,
}

impl NewUser {
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidArgument`] for a blank or whitespace-containing
    /// username.
    pub fn validate(&self) -> Result<(), CoreError> {
        let username = self.username.trim();
        if username.is_empty() {
            return Err(CoreError::InvalidArgument(
                "username must be non-empty".to_string(),
            ));
        }
        if username.chars().any(char::is_whitespace) {
            return Err(CoreError::InvalidArgument(format!(
                "username '{username}' must not contain whitespace"
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn into_user(self, id: i64, now: DateTime<Utc>) -> User {
        User {
            id,
            username: self.username.trim().to_string(),
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            bio: self.bio,
            profile_image_url: self.profile_image_url,
            is_location_sharing_enabled: self.is_location_sharing_enabled,
            created_at: now,
        }
    }
}
