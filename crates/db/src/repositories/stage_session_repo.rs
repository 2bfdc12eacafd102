//! Repository for the `stage_sessions` table.

use sqlx::PgPool;

use stage_core::phase::PhaseState;
use stage_core::session::SessionConfig;
use stage_core::types::DbId;

use crate::models::stage_session::{phase_name, policy_columns, StageSessionRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, phase, phase_entered_at, countdown_secs, success_threshold, \
                       like_label, like_icon, dislike_label, dislike_icon, \
                       change_policy, change_limit, threshold_bands, max_wall_size, \
                       created_at, updated_at";

/// Provides CRUD operations for stage sessions.
pub struct StageSessionRepo;

impl StageSessionRepo {
    /// Insert a new session with product defaults, returning the row.
    pub async fn create(pool: &PgPool) -> Result<StageSessionRow, sqlx::Error> {
        let query = format!("INSERT INTO stage_sessions DEFAULT VALUES RETURNING {COLUMNS}");
        sqlx::query_as::<_, StageSessionRow>(&query)
            .fetch_one(pool)
            .await
    }

    /// Fetch one session by id.
    pub async fn get(pool: &PgPool, id: DbId) -> Result<Option<StageSessionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM stage_sessions WHERE id = $1");
        sqlx::query_as::<_, StageSessionRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every session (engine hydration at startup).
    pub async fn list(pool: &PgPool) -> Result<Vec<StageSessionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM stage_sessions ORDER BY id");
        sqlx::query_as::<_, StageSessionRow>(&query)
            .fetch_all(pool)
            .await
    }

    /// Persist an operator configuration update. Returns `true` if the
    /// row existed.
    pub async fn update_config(
        pool: &PgPool,
        id: DbId,
        config: &SessionConfig,
    ) -> Result<bool, sqlx::Error> {
        let (change_policy, change_limit) = policy_columns(config.change_policy);
        let threshold_bands = serde_json::to_value(&config.threshold_bands)
            .map_err(|e| sqlx::Error::Encode(e.into()))?;

        let result = sqlx::query(
            "UPDATE stage_sessions SET \
                countdown_secs = $2, \
                success_threshold = $3, \
                like_label = $4, \
                like_icon = $5, \
                dislike_label = $6, \
                dislike_icon = $7, \
                change_policy = $8, \
                change_limit = $9, \
                threshold_bands = $10, \
                max_wall_size = $11, \
                updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(config.countdown_secs as i32)
        .bind(config.success_threshold)
        .bind(&config.like.label)
        .bind(&config.like.icon)
        .bind(&config.dislike.label)
        .bind(&config.dislike.icon)
        .bind(change_policy)
        .bind(change_limit)
        .bind(threshold_bands)
        .bind(config.max_wall_size as i32)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Persist a phase transition. Returns `true` if the row existed.
    pub async fn update_phase(
        pool: &PgPool,
        id: DbId,
        state: &PhaseState,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE stage_sessions SET phase = $2, phase_entered_at = $3, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(phase_name(state.phase))
        .bind(state.entered_at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
