//! Operator console handlers: session bootstrap, configuration, phase
//! commands.
//!
//! Operator authentication is handled upstream by the surrounding
//! product; these routes only enforce domain rules.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use stage_core::error::StageError;
use stage_core::phase::PhaseCommand;
use stage_core::session::VoteSideMeta;
use stage_core::threshold::ThresholdBand;
use stage_core::types::DbId;
use stage_core::vote::VoteChangePolicy;
use stage_db::repositories::{StageSessionRepo, VoteRepo};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Request body for PUT /stage/{session_id}/config. All fields optional;
/// omitted fields keep their current value.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConfigRequest {
    #[validate(range(min = 0, max = 3600))]
    pub countdown_secs: Option<u32>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub success_threshold: Option<f64>,
    pub like: Option<VoteSideMeta>,
    pub dislike: Option<VoteSideMeta>,
    pub change_policy: Option<VoteChangePolicy>,
    pub threshold_bands: Option<Vec<ThresholdBand>>,
    #[validate(range(min = 1, max = 1000))]
    pub max_wall_size: Option<u32>,
}

/// Request body for POST /stage/{session_id}/phase.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseCommandRequest {
    pub command: PhaseCommand,
    /// With `reset`: also clear the vote store for a new round. Defaults
    /// to keeping votes for audit.
    pub fresh_round: Option<bool>,
}

// ---------------------------------------------------------------------------
// Session bootstrap
// ---------------------------------------------------------------------------

/// POST /api/v1/stage
///
/// Create a session with product defaults and bring it live. The operator
/// configures thresholds and policy afterwards via the config route.
pub async fn create_session(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let row = StageSessionRepo::create(&state.pool).await?;
    let config = row.config()?;
    let phase = row.phase_state()?;
    let session_id = config.session_id;

    state.engine.open_session(config, phase, Vec::new()).await;
    let snapshot = state.engine.snapshot(session_id).await?;

    tracing::info!(session_id, "Stage session created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: snapshot })))
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// PUT /api/v1/stage/{session_id}/config
///
/// Patch the operator configuration, persist it, and broadcast the full
/// config snapshot on the `config` channel.
pub async fn update_config(
    State(state): State<AppState>,
    Path(session_id): Path<DbId>,
    Json(input): Json<UpdateConfigRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let mut config = state.engine.config(session_id).await?;
    if let Some(countdown_secs) = input.countdown_secs {
        config.countdown_secs = countdown_secs;
    }
    if let Some(success_threshold) = input.success_threshold {
        config.success_threshold = success_threshold;
    }
    if let Some(like) = input.like {
        config.like = like;
    }
    if let Some(dislike) = input.dislike {
        config.dislike = dislike;
    }
    if let Some(change_policy) = input.change_policy {
        config.change_policy = change_policy;
    }
    if let Some(threshold_bands) = input.threshold_bands {
        config.threshold_bands = threshold_bands;
    }
    if let Some(max_wall_size) = input.max_wall_size {
        config.max_wall_size = max_wall_size as usize;
    }

    if !StageSessionRepo::update_config(&state.pool, session_id, &config).await? {
        return Err(StageError::SessionNotFound(session_id).into());
    }
    let snapshot = state.engine.update_config(session_id, config).await?;

    tracing::info!(session_id, "Stage configuration updated");
    Ok(Json(DataResponse { data: snapshot }))
}

// ---------------------------------------------------------------------------
// Phase commands
// ---------------------------------------------------------------------------

/// POST /api/v1/stage/{session_id}/phase
///
/// Drive the phase state machine. Illegal transitions are rejected with
/// 409 and leave the current phase running.
pub async fn phase_command(
    State(state): State<AppState>,
    Path(session_id): Path<DbId>,
    Json(input): Json<PhaseCommandRequest>,
) -> AppResult<impl IntoResponse> {
    let snapshot = state
        .engine
        .phase_command(session_id, input.command, input.fresh_round.unwrap_or(false))
        .await?;

    Ok(Json(DataResponse { data: snapshot }))
}

// ---------------------------------------------------------------------------
// Session reopen (operator restart path)
// ---------------------------------------------------------------------------

/// POST /api/v1/stage/{session_id}/open
///
/// Re-hydrate a persisted session into the live engine (used after a
/// server restart when lazily bringing rounds back).
pub async fn reopen_session(
    State(state): State<AppState>,
    Path(session_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let row = StageSessionRepo::get(&state.pool, session_id)
        .await?
        .ok_or(StageError::SessionNotFound(session_id))?;
    let votes = VoteRepo::list_for_session(&state.pool, session_id).await?;

    state
        .engine
        .open_session(row.config()?, row.phase_state()?, votes)
        .await;
    let snapshot = state.engine.snapshot(session_id).await?;

    Ok(Json(DataResponse { data: snapshot }))
}
