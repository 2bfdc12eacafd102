//! Voter-facing handlers: vote submission, reconciliation, snapshots.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use stage_core::avatar::Avatar;
use stage_core::types::{DbId, VoterId};
use stage_core::vote::VoteType;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Request body for POST /stage/{session_id}/votes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitVoteRequest {
    pub voter_id: VoterId,
    pub vote_type: VoteType,
    pub avatar: Avatar,
    /// Scalar vote multiplier; defaults to 1 for regular voters.
    pub weight: Option<u32>,
}

// ---------------------------------------------------------------------------
// Vote submission
// ---------------------------------------------------------------------------

/// POST /api/v1/stage/{session_id}/votes
///
/// Validates and idempotently commits one vote per voter. Policy errors
/// (already voted, change limit) are terminal 409s the client must not
/// retry.
pub async fn submit_vote(
    State(state): State<AppState>,
    Path(session_id): Path<DbId>,
    payload: Result<Json<SubmitVoteRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    // Missing or malformed fields are the voter's problem, not a server
    // one: surface them as a 400 instead of the extractor's default.
    let Json(input) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let receipt = state
        .engine
        .submit_vote(
            session_id,
            input.voter_id,
            input.vote_type,
            input.avatar,
            input.weight.unwrap_or(1),
        )
        .await?;

    Ok(Json(DataResponse { data: receipt }))
}

// ---------------------------------------------------------------------------
// Voter reconciliation
// ---------------------------------------------------------------------------

/// GET /api/v1/stage/{session_id}/votes/{voter_id}
///
/// The server-authoritative "have I voted" record. Clients must check
/// this before re-entering the voting flow; the local marker is only a
/// UX hint.
pub async fn get_voter_record(
    State(state): State<AppState>,
    Path((session_id, voter_id)): Path<(DbId, VoterId)>,
) -> AppResult<impl IntoResponse> {
    let vote = state
        .engine
        .voter_record(session_id, voter_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "No vote recorded for voter {voter_id} in session {session_id}"
            ))
        })?;

    Ok(Json(DataResponse { data: vote }))
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// GET /api/v1/stage/{session_id}
///
/// Full current state (config, phase, stats, voter wall) for late
/// joiners and polling fallbacks.
pub async fn get_snapshot(
    State(state): State<AppState>,
    Path(session_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let snapshot = state.engine.snapshot(session_id).await?;
    Ok(Json(DataResponse { data: snapshot }))
}
