use async_trait::async_trait;
use quiz_core::model::{User, UserId};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, map_user_row, ser};
use crate::repository::{StorageError, UserRepository};

#[async_trait]
impl UserRepository for SqliteRepository {
    async fn upsert_user(&self, user: &User) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO users (id, name, created_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(id) DO UPDATE SET name = excluded.name
            ",
        )
        .bind(user.id().as_str())
        .bind(user.name())
        .bind(user.created_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }

    async fn get_user(&self, id: &UserId) -> Result<Option<User>, StorageError> {
        let row = sqlx::query("SELECT id, name, created_at FROM users WHERE id = ?1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;
        row.as_ref().map(map_user_row).transpose()
    }

    async fn list_users(&self) -> Result<Vec<User>, StorageError> {
        let rows = sqlx::query("SELECT id, name, created_at FROM users ORDER BY created_at ASC, rowid ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;
        rows.iter().map(map_user_row).collect()
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<UserId>, StorageError> {
        let row = sqlx::query("SELECT user_id FROM active_user WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;
        let Some(row) = row else {
            return Ok(None);
        };
        let user_id: Option<String> = row.try_get("user_id").map_err(ser)?;
        Ok(user_id.map(UserId::new))
    }

    async fn set_current_user(&self, id: Option<&UserId>) -> Result<(), StorageError> {
        if let Some(id) = id {
            if self.get_user(id).await?.is_none() {
                return Err(StorageError::NotFound);
            }
        }
        sqlx::query(
            r"
                INSERT INTO active_user (id, user_id)
                VALUES (1, ?1)
                ON CONFLICT(id) DO UPDATE SET user_id = excluded.user_id
            ",
        )
        .bind(id.map(UserId::as_str))
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }
}
