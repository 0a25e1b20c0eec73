use async_trait::async_trait;
use quiz_core::model::{ScoreRecord, SessionId};
use sqlx::sqlite::SqliteRow;

use super::SqliteRepository;
use super::mapping::{
    conn, index_to_i64, limit_to_i64, map_answer_row, map_score_row, position_to_i64,
};
use crate::repository::{ScoreRepository, StorageError};

const SCORE_COLUMNS: &str = r"
    id, user_id, user_name, session_id, session_name,
    score, total_questions, percentage, timestamp, mode
";

impl SqliteRepository {
    async fn hydrate(&self, rows: Vec<SqliteRow>) -> Result<Vec<ScoreRecord>, StorageError> {
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let mut record = map_score_row(&row)?;
            let answers = sqlx::query(
                r"
                    SELECT question_id, user_answer, correct_answer, is_correct
                    FROM score_answers
                    WHERE score_id = ?1
                    ORDER BY position ASC
                ",
            )
            .bind(record.id.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;
            record.answers = answers
                .iter()
                .map(map_answer_row)
                .collect::<Result<_, _>>()?;
            out.push(record);
        }
        Ok(out)
    }
}

#[async_trait]
impl ScoreRepository for SqliteRepository {
    async fn append_score(&self, record: &ScoreRecord) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        sqlx::query(
            r"
                INSERT INTO scores (
                    id, user_id, user_name, session_id, session_name,
                    score, total_questions, percentage, timestamp, mode
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ",
        )
        .bind(record.id.as_str())
        .bind(record.user_id.as_str())
        .bind(&record.user_name)
        .bind(record.session_id.as_str())
        .bind(&record.session_name)
        .bind(i64::from(record.score))
        .bind(i64::from(record.total_questions))
        .bind(i64::from(record.percentage))
        .bind(record.timestamp)
        .bind(record.mode.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::Conflict,
            other => conn(other),
        })?;

        for (position, answer) in record.answers.iter().enumerate() {
            sqlx::query(
                r"
                    INSERT INTO score_answers (
                        score_id, position, question_id, user_answer, correct_answer, is_correct
                    )
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ",
            )
            .bind(record.id.as_str())
            .bind(position_to_i64(position)?)
            .bind(answer.question_id.as_str())
            .bind(index_to_i64(answer.user_answer)?)
            .bind(index_to_i64(answer.correct_answer)?)
            .bind(answer.is_correct)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn list_scores(&self) -> Result<Vec<ScoreRecord>, StorageError> {
        let sql = format!("SELECT {SCORE_COLUMNS} FROM scores ORDER BY timestamp ASC, id ASC");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;
        self.hydrate(rows).await
    }

    async fn scores_by_user(&self, user_name: &str) -> Result<Vec<ScoreRecord>, StorageError> {
        let sql = format!(
            "SELECT {SCORE_COLUMNS} FROM scores WHERE user_name = ?1 ORDER BY timestamp ASC, id ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(user_name)
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;
        self.hydrate(rows).await
    }

    async fn scores_by_session(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<ScoreRecord>, StorageError> {
        let sql = format!(
            "SELECT {SCORE_COLUMNS} FROM scores WHERE session_id = ?1 ORDER BY timestamp ASC, id ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(session_id.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;
        self.hydrate(rows).await
    }

    async fn top_scores(
        &self,
        session_id: &SessionId,
        limit: usize,
    ) -> Result<Vec<ScoreRecord>, StorageError> {
        let sql = format!(
            "SELECT {SCORE_COLUMNS} FROM scores WHERE session_id = ?1
             ORDER BY percentage DESC, score DESC, timestamp DESC
             LIMIT ?2"
        );
        let rows = sqlx::query(&sql)
            .bind(session_id.as_str())
            .bind(limit_to_i64(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;
        self.hydrate(rows).await
    }
}
