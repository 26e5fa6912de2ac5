//! Reminder repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

use cadence_core::{
    CreateReminderRequest, Error, InteractionStatus, LifecycleStatus, Reminder,
    ReminderRepository, Result, TargetType,
};

/// PostgreSQL implementation of ReminderRepository.
///
/// Terminated is absorbing: every mutating query carries a
/// `lifecycle_status <> 'terminated'` guard, so a stale or replayed update
/// can never resurrect a retired reminder.
pub struct PgReminderRepository {
    pool: Pool<Postgres>,
}

impl PgReminderRepository {
    /// Create a new PgReminderRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Convert LifecycleStatus to string for the database.
    fn lifecycle_to_str(status: LifecycleStatus) -> &'static str {
        status.as_str()
    }

    /// Convert string from the database to LifecycleStatus.
    fn str_to_lifecycle(s: &str) -> LifecycleStatus {
        match s {
            "active" => LifecycleStatus::Active,
            "inactive" => LifecycleStatus::Inactive,
            "terminated" => LifecycleStatus::Terminated,
            _ => LifecycleStatus::Inactive, // fallback
        }
    }

    /// Convert string from the database to InteractionStatus.
    fn str_to_interaction(s: &str) -> InteractionStatus {
        match s {
            "pending" => InteractionStatus::Pending,
            "checked" => InteractionStatus::Checked,
            "dismissed" => InteractionStatus::Dismissed,
            _ => InteractionStatus::Pending, // fallback
        }
    }

    /// Convert string from the database to TargetType.
    fn str_to_target_type(s: &str) -> TargetType {
        TargetType::from_str_loose(s).unwrap_or(TargetType::Event)
    }

    /// Parse a reminder row into a Reminder struct.
    fn parse_reminder_row(row: sqlx::postgres::PgRow) -> Reminder {
        Reminder {
            id: row.get("id"),
            title: row.get("title"),
            occurrence_time: row.get("occurrence_time"),
            target_type: Self::str_to_target_type(row.get("target_type")),
            target_id: row.get("target_id"),
            interaction_status: Self::str_to_interaction(row.get("interaction_status")),
            lifecycle_status: Self::str_to_lifecycle(row.get("lifecycle_status")),
            member_id: row.get("member_id"),
            created_at: row.get("created_at"),
        }
    }
}

#[async_trait]
impl ReminderRepository for PgReminderRepository {
    async fn create(&self, req: CreateReminderRequest) -> Result<Uuid> {
        let id = Uuid::now_v7();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO reminder
                 (id, title, occurrence_time, target_type, target_id,
                  interaction_status, lifecycle_status, member_id, created_at)
             VALUES ($1, $2, $3, $4, $5, 'pending', $6, $7, $8)",
        )
        .bind(id)
        .bind(&req.title)
        .bind(req.occurrence_time)
        .bind(req.target_type.as_str())
        .bind(req.target_id)
        .bind(Self::lifecycle_to_str(req.lifecycle_status))
        .bind(req.member_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(reminder_id = %id, target_id = %req.target_id, "reminder created");
        Ok(id)
    }

    async fn fetch(&self, id: Uuid) -> Result<Reminder> {
        let row = sqlx::query("SELECT * FROM reminder WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        row.map(Self::parse_reminder_row)
            .ok_or(Error::ReminderNotFound(id))
    }

    async fn find_by_target(
        &self,
        target_id: Uuid,
        target_type: TargetType,
    ) -> Result<Vec<Reminder>> {
        let rows = sqlx::query(
            "SELECT * FROM reminder
             WHERE target_id = $1 AND target_type = $2
             ORDER BY occurrence_time",
        )
        .bind(target_id)
        .bind(target_type.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(Self::parse_reminder_row).collect())
    }

    async fn find_due(&self, now: DateTime<Utc>) -> Result<Vec<Reminder>> {
        let rows = sqlx::query(
            "SELECT * FROM reminder
             WHERE lifecycle_status IN ('active', 'inactive')
               AND occurrence_time <= $1
             ORDER BY occurrence_time",
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(Self::parse_reminder_row).collect())
    }

    async fn advance_occurrence(
        &self,
        id: Uuid,
        occurrence_time: DateTime<Utc>,
        status: LifecycleStatus,
        title: Option<&str>,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE reminder
             SET occurrence_time = $2,
                 lifecycle_status = $3,
                 interaction_status = 'pending',
                 title = COALESCE($4, title)
             WHERE id = $1 AND lifecycle_status <> 'terminated'",
        )
        .bind(id)
        .bind(occurrence_time)
        .bind(Self::lifecycle_to_str(status))
        .bind(title)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }

    async fn terminate(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE reminder
             SET lifecycle_status = 'terminated'
             WHERE id = $1 AND lifecycle_status <> 'terminated'",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }

    async fn terminate_at(
        &self,
        target_id: Uuid,
        target_type: TargetType,
        occurrence_time: DateTime<Utc>,
    ) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE reminder
             SET lifecycle_status = 'terminated'
             WHERE target_id = $1 AND target_type = $2
               AND occurrence_time = $3
               AND lifecycle_status <> 'terminated'",
        )
        .bind(target_id)
        .bind(target_type.as_str())
        .bind(occurrence_time)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(result.rows_affected())
    }

    async fn terminate_following(
        &self,
        target_id: Uuid,
        target_type: TargetType,
        from: DateTime<Utc>,
    ) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE reminder
             SET lifecycle_status = 'terminated'
             WHERE target_id = $1 AND target_type = $2
               AND occurrence_time >= $3
               AND lifecycle_status <> 'terminated'",
        )
        .bind(target_id)
        .bind(target_type.as_str())
        .bind(from)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(result.rows_affected())
    }

    async fn delete_terminated(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM reminder WHERE lifecycle_status = 'terminated'")
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        let removed = result.rows_affected();
        debug!(affected = removed, "terminated reminders purged");
        Ok(removed)
    }

    async fn delete_by_member(&self, member_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM reminder WHERE member_id = $1")
            .bind(member_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_str_round_trip() {
        for status in [
            LifecycleStatus::Active,
            LifecycleStatus::Inactive,
            LifecycleStatus::Terminated,
        ] {
            let s = PgReminderRepository::lifecycle_to_str(status);
            assert_eq!(PgReminderRepository::str_to_lifecycle(s), status);
        }
    }

    #[test]
    fn test_unknown_lifecycle_falls_back_to_inactive() {
        assert_eq!(
            PgReminderRepository::str_to_lifecycle("garbage"),
            LifecycleStatus::Inactive
        );
    }

    #[test]
    fn test_interaction_str_round_trip() {
        for status in [
            InteractionStatus::Pending,
            InteractionStatus::Checked,
            InteractionStatus::Dismissed,
        ] {
            assert_eq!(
                PgReminderRepository::str_to_interaction(status.as_str()),
                status
            );
        }
        assert_eq!(
            PgReminderRepository::str_to_interaction("???"),
            InteractionStatus::Pending
        );
    }

    #[test]
    fn test_target_type_str_round_trip() {
        assert_eq!(
            PgReminderRepository::str_to_target_type("event"),
            TargetType::Event
        );
        assert_eq!(
            PgReminderRepository::str_to_target_type("todo"),
            TargetType::Todo
        );
    }
}
