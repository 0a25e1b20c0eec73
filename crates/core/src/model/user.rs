use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::UserId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UserError {
    #[error("user name cannot be empty")]
    EmptyName,
}

/// A learner profile. Scores are stamped with its id and name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: UserId,
    name: String,
    created_at: DateTime<Utc>,
}

impl User {
    /// Create a user with a freshly generated id.
    ///
    /// # Errors
    ///
    /// Returns `UserError::EmptyName` if the trimmed name is empty.
    pub fn new(name: &str, created_at: DateTime<Utc>) -> Result<Self, UserError> {
        Self::from_persisted(UserId::generate(), name, created_at)
    }

    /// Rehydrate a user from storage.
    ///
    /// # Errors
    ///
    /// Returns `UserError::EmptyName` if the trimmed name is empty.
    pub fn from_persisted(
        id: UserId,
        name: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Self, UserError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(UserError::EmptyName);
        }
        Ok(Self {
            id,
            name: name.to_owned(),
            created_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> &UserId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Rename the user, keeping id and creation time.
    ///
    /// # Errors
    ///
    /// Returns `UserError::EmptyName` if the trimmed name is empty.
    pub fn rename(&mut self, name: &str) -> Result<(), UserError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(UserError::EmptyName);
        }
        name.clone_into(&mut self.name);
        Ok(())
    }

    /// Case-insensitive comparison used for duplicate detection.
    #[must_use]
    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }

    /// The id/name pair stamped onto score records.
    #[must_use]
    pub fn identity(&self) -> UserIdentity {
        UserIdentity {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// The current user as seen by the session engine. Not validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub id: UserId,
    pub name: String,
}
