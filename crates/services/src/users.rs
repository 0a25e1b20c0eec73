use std::sync::Arc;

use quiz_core::model::{User, UserId, UserIdentity};
use storage::repository::{StorageError, UserRepository};
use tracing::info;

use crate::Clock;
use crate::error::UserServiceError;

/// Manages learner profiles and which one is active.
#[derive(Clone)]
pub struct UserService {
    clock: Clock,
    users: Arc<dyn UserRepository>,
}

impl UserService {
    #[must_use]
    pub fn new(clock: Clock, users: Arc<dyn UserRepository>) -> Self {
        Self { clock, users }
    }

    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::new(clock, Arc::new(storage::repository::InMemoryRepository::new()))
    }

    /// Create a user with a fresh id.
    ///
    /// # Errors
    ///
    /// Returns `UserServiceError::User` for an empty name.
    /// Returns `UserServiceError::DuplicateName` if the name is taken (case-insensitive).
    /// Returns `UserServiceError::Storage` if persistence fails.
    pub async fn add_user(&self, name: &str) -> Result<User, UserServiceError> {
        let user = User::new(name, self.clock.now())?;
        self.ensure_name_free(user.name(), None).await?;
        self.users.upsert_user(&user).await?;
        info!(user_id = %user.id(), "user added");
        Ok(user)
    }

    /// Rename an existing user.
    ///
    /// # Errors
    ///
    /// Returns `UserServiceError::NotFound` if the user does not exist.
    /// Returns `UserServiceError::User` for an empty name.
    /// Returns `UserServiceError::DuplicateName` if another user has the name.
    /// Returns `UserServiceError::Storage` if persistence fails.
    pub async fn update_user(&self, id: &UserId, name: &str) -> Result<User, UserServiceError> {
        let mut user = self
            .users
            .get_user(id)
            .await?
            .ok_or(UserServiceError::NotFound)?;
        user.rename(name)?;
        self.ensure_name_free(user.name(), Some(id)).await?;
        self.users.upsert_user(&user).await?;
        Ok(user)
    }

    /// Delete a user; clears the current selection if it pointed at them.
    ///
    /// # Errors
    ///
    /// Returns `UserServiceError::NotFound` if the user does not exist.
    /// Returns `UserServiceError::Storage` if persistence fails.
    pub async fn remove_user(&self, id: &UserId) -> Result<(), UserServiceError> {
        match self.users.delete_user(id).await {
            Ok(()) => {
                info!(user_id = %id, "user removed");
                Ok(())
            }
            Err(StorageError::NotFound) => Err(UserServiceError::NotFound),
            Err(err) => Err(err.into()),
        }
    }

    /// Make `id` the current user.
    ///
    /// # Errors
    ///
    /// Returns `UserServiceError::NotFound` if the user does not exist.
    /// Returns `UserServiceError::Storage` if persistence fails.
    pub async fn select_user(&self, id: &UserId) -> Result<User, UserServiceError> {
        let user = self
            .users
            .get_user(id)
            .await?
            .ok_or(UserServiceError::NotFound)?;
        self.users.set_current_user(Some(id)).await?;
        Ok(user)
    }

    /// # Errors
    ///
    /// Returns `UserServiceError::Storage` if repository access fails.
    pub async fn clear_selection(&self) -> Result<(), UserServiceError> {
        self.users.set_current_user(None).await?;
        Ok(())
    }

    /// The selected user, if any.
    ///
    /// # Errors
    ///
    /// Returns `UserServiceError::Storage` if repository access fails.
    pub async fn current_user(&self) -> Result<Option<User>, UserServiceError> {
        let Some(id) = self.users.current_user().await? else {
            return Ok(None);
        };
        Ok(self.users.get_user(&id).await?)
    }

    /// Identity to stamp on score records.
    ///
    /// # Errors
    ///
    /// Returns `UserServiceError::Storage` if repository access fails.
    pub async fn current_identity(&self) -> Result<Option<UserIdentity>, UserServiceError> {
        Ok(self.current_user().await?.map(|u| u.identity()))
    }

    /// # Errors
    ///
    /// Returns `UserServiceError::Storage` if repository access fails.
    pub async fn list_users(&self) -> Result<Vec<User>, UserServiceError> {
        Ok(self.users.list_users().await?)
    }

    /// Look up a user by name (case-insensitive), creating one if missing,
    /// and select it.
    ///
    /// # Errors
    ///
    /// Returns `UserServiceError::User` for an empty name.
    /// Returns `UserServiceError::Storage` if persistence fails.
    pub async fn find_or_create(&self, name: &str) -> Result<User, UserServiceError> {
        let existing = self
            .users
            .list_users()
            .await?
            .into_iter()
            .find(|u| u.has_name(name));
        let user = match existing {
            Some(user) => user,
            None => self.add_user(name).await?,
        };
        self.users.set_current_user(Some(user.id())).await?;
        Ok(user)
    }

    async fn ensure_name_free(
        &self,
        name: &str,
        except: Option<&UserId>,
    ) -> Result<(), UserServiceError> {
        let taken = self
            .users
            .list_users()
            .await?
            .iter()
            .any(|u| Some(u.id()) != except && u.has_name(name));
        if taken {
            return Err(UserServiceError::DuplicateName(name.to_owned()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::UserError;
    use quiz_core::time::{fixed_clock, fixed_now};

    #[tokio::test]
    async fn add_user_trims_and_rejects_duplicates() {
        let svc = UserService::in_memory(fixed_clock());
        let ali = svc.add_user("  Ali ").await.unwrap();
        assert_eq!(ali.name(), "Ali");
        assert_eq!(ali.created_at(), fixed_now());
        assert!(ali.id().as_str().starts_with("user_"));

        let err = svc.add_user("ALI").await.unwrap_err();
        assert!(matches!(err, UserServiceError::DuplicateName(_)));

        let err = svc.add_user("   ").await.unwrap_err();
        assert!(matches!(err, UserServiceError::User(UserError::EmptyName)));
    }

    #[tokio::test]
    async fn update_user_checks_other_names_only() {
        let svc = UserService::in_memory(fixed_clock());
        let ali = svc.add_user("Ali").await.unwrap();
        svc.add_user("Abu").await.unwrap();

        let same = svc.update_user(ali.id(), "ali").await.unwrap();
        assert_eq!(same.name(), "ali");

        let err = svc.update_user(ali.id(), "abu").await.unwrap_err();
        assert!(matches!(err, UserServiceError::DuplicateName(_)));

        let err = svc
            .update_user(&UserId::new("ghost"), "Ghost")
            .await
            .unwrap_err();
        assert!(matches!(err, UserServiceError::NotFound));
    }

    #[tokio::test]
    async fn selection_follows_removal() {
        let svc = UserService::in_memory(fixed_clock());
        let ali = svc.add_user("Ali").await.unwrap();
        assert!(svc.current_user().await.unwrap().is_none());

        svc.select_user(ali.id()).await.unwrap();
        let identity = svc.current_identity().await.unwrap().unwrap();
        assert_eq!(identity.name, "Ali");

        svc.remove_user(ali.id()).await.unwrap();
        assert!(svc.current_user().await.unwrap().is_none());
        assert!(matches!(
            svc.remove_user(ali.id()).await,
            Err(UserServiceError::NotFound)
        ));
        assert!(matches!(
            svc.select_user(ali.id()).await,
            Err(UserServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn find_or_create_reuses_existing() {
        let svc = UserService::in_memory(fixed_clock());
        let first = svc.find_or_create("Siti").await.unwrap();
        let again = svc.find_or_create("siti").await.unwrap();
        assert_eq!(first.id(), again.id());
        assert_eq!(svc.list_users().await.unwrap().len(), 1);
        assert_eq!(
            svc.current_user().await.unwrap().map(|u| u.id().clone()),
            Some(first.id().clone())
        );
    }
}
