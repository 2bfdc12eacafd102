//! Integration tests for `StageEngine`.
//!
//! These exercise the vote submission service, phase control and fan-out
//! directly, without HTTP. The audit queue is connected to a receiver
//! where persistence matters to the assertion, and dropped otherwise.

mod common;

use assert_matches::assert_matches;
use chrono::Utc;

use stage_core::avatar::Avatar;
use stage_core::error::StageError;
use stage_core::phase::{Phase, PhaseCommand, PhaseState};
use stage_core::session::SessionConfig;
use stage_core::types::VoterId;
use stage_core::vote::{VoteChangePolicy, VoteType};
use stage_events::StageUpdate;
use stage_api::stage::VoteStatus;

fn emoji(value: &str) -> Avatar {
    Avatar::Emoji(value.to_string())
}

// ---------------------------------------------------------------------------
// Test: aggregate invariants over N first-time votes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn n_votes_produce_consistent_totals() {
    let (engine, _hub) = common::test_engine();
    common::open_voting_session(&engine, 1).await;

    for i in 0..10 {
        let vote_type = if i < 7 {
            VoteType::Like
        } else {
            VoteType::Dislike
        };
        let receipt = engine
            .submit_vote(1, VoterId::new_v4(), vote_type, emoji("😀"), 1)
            .await
            .expect("vote should be accepted");
        assert_eq!(receipt.status, VoteStatus::Recorded);
    }

    let snapshot = engine.snapshot(1).await.unwrap();
    assert_eq!(snapshot.stats.total_voters, 10);
    assert_eq!(snapshot.stats.total_likes, 7);
    assert_eq!(snapshot.stats.total_dislikes, 3);
    assert_eq!(
        snapshot.stats.total_likes + snapshot.stats.total_dislikes,
        snapshot.stats.total_voters
    );
    assert!((snapshot.stats.percentage() - 70.0).abs() < 0.001);
    assert_eq!(snapshot.voters.len(), 10);
}

// ---------------------------------------------------------------------------
// Test: idempotent resubmission vs. AlreadyVoted
// ---------------------------------------------------------------------------

#[tokio::test]
async fn identical_retry_is_unchanged_but_different_vote_conflicts() {
    let (engine, _hub) = common::test_engine();
    common::open_voting_session(&engine, 1).await;
    let voter = VoterId::new_v4();

    let first = engine
        .submit_vote(1, voter, VoteType::Like, emoji("😀"), 1)
        .await
        .unwrap();
    assert_eq!(first.status, VoteStatus::Recorded);

    // Client retry after a timeout: identical payload, no error.
    let retry = engine
        .submit_vote(1, voter, VoteType::Like, emoji("😀"), 1)
        .await
        .unwrap();
    assert_eq!(retry.status, VoteStatus::Unchanged);

    // A genuine second opinion under policy `none` is terminal.
    let err = engine
        .submit_vote(1, voter, VoteType::Dislike, emoji("😀"), 1)
        .await
        .unwrap_err();
    assert_matches!(err, StageError::AlreadyVoted);

    let snapshot = engine.snapshot(1).await.unwrap();
    assert_eq!(snapshot.stats.total_voters, 1);
}

// ---------------------------------------------------------------------------
// Test: bounded vote changes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn limited_policy_allows_two_changes_then_fails() {
    let (engine, _hub) = common::test_engine();
    common::open_session_with_policy(&engine, 1, VoteChangePolicy::Limited(2)).await;
    let voter = VoterId::new_v4();

    engine
        .submit_vote(1, voter, VoteType::Like, emoji("😀"), 1)
        .await
        .unwrap();

    let first = engine
        .submit_vote(1, voter, VoteType::Dislike, emoji("😀"), 1)
        .await
        .unwrap();
    assert_eq!(first.status, VoteStatus::Changed);
    assert_eq!(first.changes_remaining, Some(1));

    let second = engine
        .submit_vote(1, voter, VoteType::Like, emoji("🙃"), 1)
        .await
        .unwrap();
    assert_eq!(second.status, VoteStatus::Changed);
    assert_eq!(second.changes_remaining, Some(0));

    let err = engine
        .submit_vote(1, voter, VoteType::Dislike, emoji("🙃"), 1)
        .await
        .unwrap_err();
    assert_matches!(err, StageError::ChangeLimitExceeded { limit: 2 });
}

// ---------------------------------------------------------------------------
// Test: votes are rejected outside the voting phase
// ---------------------------------------------------------------------------

#[tokio::test]
async fn votes_outside_voting_phase_are_rejected() {
    let (engine, _hub) = common::test_engine();
    // Freshly opened sessions sit in standby.
    engine
        .open_session(
            SessionConfig::new(1),
            PhaseState::new(10, Utc::now()),
            Vec::new(),
        )
        .await;

    let err = engine
        .submit_vote(1, VoterId::new_v4(), VoteType::Like, emoji("😀"), 1)
        .await
        .unwrap_err();
    assert_matches!(
        err,
        StageError::InvalidPhaseTransition {
            from: Phase::Standby,
            ..
        }
    );
}

// ---------------------------------------------------------------------------
// Test: malformed submissions fail validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_avatar_and_zero_weight_fail_validation() {
    let (engine, _hub) = common::test_engine();
    common::open_voting_session(&engine, 1).await;

    let err = engine
        .submit_vote(1, VoterId::new_v4(), VoteType::Like, emoji("  "), 1)
        .await
        .unwrap_err();
    assert_matches!(err, StageError::Validation(_));

    let err = engine
        .submit_vote(1, VoterId::new_v4(), VoteType::Like, emoji("😀"), 0)
        .await
        .unwrap_err();
    assert_matches!(err, StageError::Validation(_));
}

// ---------------------------------------------------------------------------
// Test: unknown session
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_session_is_not_found() {
    let (engine, _hub) = common::test_engine();

    let err = engine
        .submit_vote(99, VoterId::new_v4(), VoteType::Like, emoji("😀"), 1)
        .await
        .unwrap_err();
    assert_matches!(err, StageError::SessionNotFound(99));
}

// ---------------------------------------------------------------------------
// Test: operator phase flow and the countdown boundary
// ---------------------------------------------------------------------------

#[tokio::test]
async fn countdown_elapses_into_voting_exactly_once() {
    let (engine, hub) = common::test_engine();
    // Zero-second countdown: the boundary is crossed immediately.
    let mut config = SessionConfig::new(1);
    config.countdown_secs = 0;
    engine
        .open_session(config, PhaseState::new(0, Utc::now()), Vec::new())
        .await;

    let (_token, mut rx) = hub.subscribe(1).await;

    engine
        .phase_command(1, PhaseCommand::StartCountdown, false)
        .await
        .unwrap();

    // The sweep (or any read) resolves the elapsed countdown.
    let transitioned = engine.resolve_session(1).await.unwrap();
    assert_matches!(transitioned, Some(state) if state.phase == Phase::Voting);

    // A second sweep observes no new transition.
    assert_matches!(engine.resolve_session(1).await.unwrap(), None);

    // Subscribers saw countdown, then voting, and nothing further.
    assert_matches!(
        rx.recv().await,
        Some(StageUpdate::Phase(state)) if state.phase == Phase::Countdown
    );
    assert_matches!(
        rx.recv().await,
        Some(StageUpdate::Phase(state)) if state.phase == Phase::Voting
    );
    assert_matches!(rx.try_recv(), Err(_));
}

#[tokio::test]
async fn invalid_operator_transition_is_a_noop() {
    let (engine, _hub) = common::test_engine();
    common::open_voting_session(&engine, 1).await;

    engine
        .phase_command(1, PhaseCommand::EndVoting, false)
        .await
        .unwrap();

    // results -> countdown directly is illegal.
    let err = engine
        .phase_command(1, PhaseCommand::StartCountdown, false)
        .await
        .unwrap_err();
    assert_matches!(
        err,
        StageError::InvalidPhaseTransition {
            from: Phase::Results,
            ..
        }
    );

    // The session is still in results.
    let snapshot = engine.snapshot(1).await.unwrap();
    assert_eq!(snapshot.phase.phase, Phase::Results);
}

// ---------------------------------------------------------------------------
// Test: reset with a fresh round clears the store
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fresh_round_reset_clears_votes_and_wall() {
    let (engine, _hub) = common::test_engine();
    common::open_voting_session(&engine, 1).await;
    let voter = VoterId::new_v4();

    engine
        .submit_vote(1, voter, VoteType::Like, emoji("😀"), 1)
        .await
        .unwrap();
    engine
        .phase_command(1, PhaseCommand::EndVoting, false)
        .await
        .unwrap();

    let snapshot = engine
        .phase_command(1, PhaseCommand::Reset, true)
        .await
        .unwrap();

    assert_eq!(snapshot.phase.phase, Phase::Standby);
    assert_eq!(snapshot.stats.total_voters, 0);
    assert!(snapshot.voters.is_empty());
    // The voter's record is gone; a stale local "already voted" marker
    // reconciles to a fresh flow.
    assert_eq!(engine.voter_record(1, voter).await.unwrap(), None);
}

#[tokio::test]
async fn reset_without_fresh_round_keeps_votes_for_audit() {
    let (engine, _hub) = common::test_engine();
    common::open_voting_session(&engine, 1).await;
    let voter = VoterId::new_v4();

    engine
        .submit_vote(1, voter, VoteType::Like, emoji("😀"), 1)
        .await
        .unwrap();
    engine
        .phase_command(1, PhaseCommand::EndVoting, false)
        .await
        .unwrap();
    engine
        .phase_command(1, PhaseCommand::Reset, false)
        .await
        .unwrap();

    assert!(engine.voter_record(1, voter).await.unwrap().is_some());
}

// ---------------------------------------------------------------------------
// Test: every accepted vote broadcasts fresh snapshots
// ---------------------------------------------------------------------------

#[tokio::test]
async fn accepted_votes_broadcast_stats_and_wall() {
    let (engine, hub) = common::test_engine();
    common::open_voting_session(&engine, 1).await;

    let (_token, mut rx) = hub.subscribe(1).await;

    engine
        .submit_vote(1, VoterId::new_v4(), VoteType::Like, emoji("😀"), 1)
        .await
        .unwrap();

    assert_matches!(
        rx.recv().await,
        Some(StageUpdate::LiveStats(stats)) if stats.total_likes == 1
    );
    assert_matches!(
        rx.recv().await,
        Some(StageUpdate::Voters(wall)) if wall.len() == 1
    );
}

#[tokio::test]
async fn unchanged_retry_broadcasts_nothing() {
    let (engine, hub) = common::test_engine();
    common::open_voting_session(&engine, 1).await;
    let voter = VoterId::new_v4();

    engine
        .submit_vote(1, voter, VoteType::Like, emoji("😀"), 1)
        .await
        .unwrap();

    let (_token, mut rx) = hub.subscribe(1).await;
    engine
        .submit_vote(1, voter, VoteType::Like, emoji("😀"), 1)
        .await
        .unwrap();

    assert_matches!(rx.try_recv(), Err(_));
}

// ---------------------------------------------------------------------------
// Test: judge weight flows through stats and wall
// ---------------------------------------------------------------------------

#[tokio::test]
async fn weighted_vote_counts_as_its_weight() {
    let (engine, _hub) = common::test_engine();
    common::open_voting_session(&engine, 1).await;

    engine
        .submit_vote(1, VoterId::new_v4(), VoteType::Like, emoji("⭐"), 3)
        .await
        .unwrap();
    engine
        .submit_vote(1, VoterId::new_v4(), VoteType::Dislike, emoji("😀"), 1)
        .await
        .unwrap();

    let snapshot = engine.snapshot(1).await.unwrap();
    assert_eq!(snapshot.stats.total_voters, 4);
    assert_eq!(snapshot.stats.total_likes, 3);
    assert!(snapshot.voters[0].is_judge);
    assert!(!snapshot.voters[1].is_judge);
}
