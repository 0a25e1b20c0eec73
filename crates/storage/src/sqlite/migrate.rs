use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Applies the schema (users, current-user pointer, scores and their answers).
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    if is_applied(pool, 1).await? {
        return Ok(());
    }

    let mut tx = pool.begin().await?;

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
        ",
    )
    .execute(&mut *tx)
    .await?;

    // Single-row table; ON DELETE SET NULL clears it when the user goes away.
    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS active_user (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                user_id TEXT REFERENCES users(id) ON DELETE SET NULL
            );
        ",
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS scores (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                user_name TEXT NOT NULL,
                session_id TEXT NOT NULL,
                session_name TEXT NOT NULL,
                score INTEGER NOT NULL CHECK (score >= 0),
                total_questions INTEGER NOT NULL CHECK (total_questions > 0),
                percentage INTEGER NOT NULL CHECK (percentage BETWEEN 0 AND 100),
                timestamp TEXT NOT NULL,
                mode TEXT NOT NULL CHECK (mode IN ('quiz', 'test')),
                CHECK (score <= total_questions)
            );
        ",
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS score_answers (
                score_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                question_id TEXT NOT NULL,
                user_answer INTEGER NOT NULL,
                correct_answer INTEGER NOT NULL,
                is_correct INTEGER NOT NULL,
                PRIMARY KEY (score_id, position),
                FOREIGN KEY (score_id) REFERENCES scores(id) ON DELETE CASCADE
            );
        ",
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r"
            CREATE INDEX IF NOT EXISTS idx_scores_session_rank
                ON scores (session_id, percentage DESC, score DESC, timestamp DESC);
        ",
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r"
            CREATE INDEX IF NOT EXISTS idx_scores_user_name
                ON scores (user_name, timestamp);
        ",
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r"
            INSERT INTO schema_migrations (version, applied_at)
            VALUES (?1, ?2)
            ON CONFLICT(version) DO NOTHING
        ",
    )
    .bind(1_i64)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    tracing::info!(version = 1, "sqlite schema migrated");

    Ok(())
}
