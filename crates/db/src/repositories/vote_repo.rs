//! Repository for the `votes` table.

use sqlx::PgPool;

use stage_core::types::DbId;
use stage_core::vote::Vote;

use crate::models::vote::{vote_columns, VoteRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, session_id, voter_id, vote_type, avatar_type, avatar_value, \
                       weight, change_count, submitted_at";

/// Provides write-behind and hydration operations for votes.
pub struct VoteRepo;

impl VoteRepo {
    /// Upsert a vote by its natural key `(session_id, voter_id)`.
    ///
    /// Mirrors the ledger's change semantics: a conflicting row keeps its
    /// id and weight while direction, avatar, change count and timestamp
    /// are replaced. Retried writes are naturally idempotent.
    pub async fn upsert(pool: &PgPool, vote: &Vote) -> Result<(), sqlx::Error> {
        let (vote_type, avatar_type, avatar_value) = vote_columns(vote);
        sqlx::query(
            "INSERT INTO votes \
                (session_id, voter_id, vote_type, avatar_type, avatar_value, weight, change_count, submitted_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT ON CONSTRAINT uq_votes_session_voter DO UPDATE SET \
                vote_type = EXCLUDED.vote_type, \
                avatar_type = EXCLUDED.avatar_type, \
                avatar_value = EXCLUDED.avatar_value, \
                change_count = EXCLUDED.change_count, \
                submitted_at = EXCLUDED.submitted_at",
        )
        .bind(vote.session_id)
        .bind(vote.voter_id)
        .bind(vote_type)
        .bind(avatar_type)
        .bind(avatar_value)
        .bind(vote.weight as i32)
        .bind(vote.change_count as i32)
        .bind(vote.submitted_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// All votes for a session in first-submission order (row ids are
    /// assigned once and survive upserts, unlike `submitted_at`).
    pub async fn list_for_session(
        pool: &PgPool,
        session_id: DbId,
    ) -> Result<Vec<Vote>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM votes WHERE session_id = $1 ORDER BY id");
        let rows = sqlx::query_as::<_, VoteRow>(&query)
            .bind(session_id)
            .fetch_all(pool)
            .await?;
        rows.into_iter().map(VoteRow::into_vote).collect()
    }

    /// Look up one voter's vote (the server-authoritative "have I voted"
    /// answer).
    pub async fn find(
        pool: &PgPool,
        session_id: DbId,
        voter_id: uuid::Uuid,
    ) -> Result<Option<Vote>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM votes WHERE session_id = $1 AND voter_id = $2");
        let row = sqlx::query_as::<_, VoteRow>(&query)
            .bind(session_id)
            .bind(voter_id)
            .fetch_optional(pool)
            .await?;
        row.map(VoteRow::into_vote).transpose()
    }

    /// Delete a session's votes (fresh round). Returns the count removed.
    pub async fn delete_for_session(pool: &PgPool, session_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM votes WHERE session_id = $1")
            .bind(session_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
