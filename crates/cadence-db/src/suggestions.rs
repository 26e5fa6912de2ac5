//! Suggestion repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

use cadence_core::{
    CreateSuggestionRequest, Error, Result, Suggestion, SuggestionRepository, SuggestionStatus,
};

/// PostgreSQL implementation of SuggestionRepository.
pub struct PgSuggestionRepository {
    pool: Pool<Postgres>,
}

impl PgSuggestionRepository {
    /// Create a new PgSuggestionRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Convert string from the database to SuggestionStatus.
    fn str_to_status(s: &str) -> SuggestionStatus {
        match s {
            "primary" => SuggestionStatus::Primary,
            "secondary" => SuggestionStatus::Secondary,
            "accepted" => SuggestionStatus::Accepted,
            "rejected" => SuggestionStatus::Rejected,
            _ => SuggestionStatus::Primary, // fallback
        }
    }

    /// Parse a suggestion row into a Suggestion struct.
    fn parse_suggestion_row(row: sqlx::postgres::PgRow) -> Suggestion {
        Suggestion {
            id: row.get("id"),
            content: row.get("content"),
            category: row.get("category"),
            status: Self::str_to_status(row.get("status")),
            target_hash: row.get("target_hash"),
            is_active: row.get("is_active"),
            member_id: row.get("member_id"),
            created_at: row.get("created_at"),
        }
    }
}

#[async_trait]
impl SuggestionRepository for PgSuggestionRepository {
    async fn create(&self, req: CreateSuggestionRequest) -> Result<Uuid> {
        let id = Uuid::now_v7();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO suggestion
                 (id, content, category, status, target_hash, is_active, member_id, created_at)
             VALUES ($1, $2, $3, 'primary', $4, true, $5, $6)",
        )
        .bind(id)
        .bind(&req.content)
        .bind(&req.category)
        .bind(&req.target_hash)
        .bind(req.member_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(suggestion_id = %id, category = %req.category, "suggestion created");
        Ok(id)
    }

    async fn fetch(&self, id: Uuid) -> Result<Suggestion> {
        let row = sqlx::query("SELECT * FROM suggestion WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        row.map(Self::parse_suggestion_row)
            .ok_or(Error::SuggestionNotFound(id))
    }

    async fn find_active_by_hash(
        &self,
        member_id: Uuid,
        target_hash: &str,
    ) -> Result<Vec<Suggestion>> {
        let rows = sqlx::query(
            "SELECT * FROM suggestion
             WHERE member_id = $1 AND target_hash = $2 AND is_active = true
             ORDER BY created_at",
        )
        .bind(member_id)
        .bind(target_hash)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(Self::parse_suggestion_row).collect())
    }

    async fn update_status(&self, id: Uuid, to: SuggestionStatus) -> Result<()> {
        // The monotonic order is validated against the current row inside
        // one transaction so a concurrent update cannot slip a backwards
        // move through.
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let row = sqlx::query("SELECT status FROM suggestion WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(Error::Database)?;

        let current = match row {
            Some(row) => Self::str_to_status(row.get("status")),
            None => return Err(Error::SuggestionNotFound(id)),
        };
        current.checked_transition(to)?;

        sqlx::query("UPDATE suggestion SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(to.as_str())
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }

    async fn invalidate_by_hash(&self, member_id: Uuid, target_hash: &str) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE suggestion
             SET is_active = false
             WHERE member_id = $1 AND target_hash = $2 AND is_active = true",
        )
        .bind(member_id)
        .bind(target_hash)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        let affected = result.rows_affected();
        debug!(
            member_id = %member_id,
            target_hash = %target_hash,
            affected,
            "suggestions invalidated"
        );
        Ok(affected)
    }

    async fn delete_by_member(&self, member_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM suggestion WHERE member_id = $1")
            .bind(member_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected())
    }
}
