//! Member tombstone repository for the retention sweep.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};
use tracing::info;
use uuid::Uuid;

use cadence_core::{Error, Member, MemberRepository, Result};

/// PostgreSQL implementation of MemberRepository.
///
/// Exposes only what the hard-delete sweep needs: the account lifecycle
/// itself (signup, profile, soft-delete marking) is owned elsewhere.
pub struct PgMemberRepository {
    pool: Pool<Postgres>,
}

impl PgMemberRepository {
    /// Create a new PgMemberRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn parse_member_row(row: sqlx::postgres::PgRow) -> Member {
        Member {
            id: row.get("id"),
            deleted_at: row.get("deleted_at"),
        }
    }
}

#[async_trait]
impl MemberRepository for PgMemberRepository {
    async fn list_expired_tombstones(&self, cutoff: DateTime<Utc>) -> Result<Vec<Member>> {
        let rows = sqlx::query(
            "SELECT id, deleted_at FROM member
             WHERE deleted_at IS NOT NULL AND deleted_at <= $1
             ORDER BY deleted_at",
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(Self::parse_member_row).collect())
    }

    async fn hard_delete(&self, member_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM member WHERE id = $1 AND deleted_at IS NOT NULL")
            .bind(member_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            // Live accounts are off-limits here; only tombstones qualify.
            return Err(Error::NotFound(format!(
                "tombstoned member {member_id}"
            )));
        }

        info!(member_id = %member_id, "member hard-deleted");
        Ok(())
    }
}
