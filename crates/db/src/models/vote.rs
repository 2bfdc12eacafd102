//! Vote row model.

use sqlx::FromRow;

use stage_core::avatar::Avatar;
use stage_core::types::{DbId, Timestamp, VoterId};
use stage_core::vote::{Vote, VoteType};

/// A row from the `votes` table.
#[derive(Debug, Clone, FromRow)]
pub struct VoteRow {
    pub id: DbId,
    pub session_id: DbId,
    pub voter_id: VoterId,
    pub vote_type: String,
    pub avatar_type: String,
    pub avatar_value: String,
    pub weight: i32,
    pub change_count: i32,
    pub submitted_at: Timestamp,
}

impl VoteRow {
    /// Convert to the domain vote; malformed enum text (impossible under
    /// the table's CHECK constraints) surfaces as a decode error.
    pub fn into_vote(self) -> Result<Vote, sqlx::Error> {
        let vote_type = match self.vote_type.as_str() {
            "like" => VoteType::Like,
            "dislike" => VoteType::Dislike,
            other => return Err(decode_error("vote_type", other)),
        };
        let avatar = match self.avatar_type.as_str() {
            "emoji" => Avatar::Emoji(self.avatar_value),
            "selfie" => Avatar::Selfie(self.avatar_value),
            other => return Err(decode_error("avatar_type", other)),
        };
        Ok(Vote {
            session_id: self.session_id,
            voter_id: self.voter_id,
            vote_type,
            avatar,
            weight: self.weight.max(1) as u32,
            change_count: self.change_count.max(0) as u32,
            submitted_at: self.submitted_at,
        })
    }
}

/// Column values for writing a domain vote.
pub(crate) fn vote_columns(vote: &Vote) -> (&'static str, &'static str, &str) {
    let vote_type = match vote.vote_type {
        VoteType::Like => "like",
        VoteType::Dislike => "dislike",
    };
    let (avatar_type, avatar_value) = match &vote.avatar {
        Avatar::Emoji(value) => ("emoji", value.as_str()),
        Avatar::Selfie(value) => ("selfie", value.as_str()),
    };
    (vote_type, avatar_type, avatar_value)
}

fn decode_error(column: &str, value: &str) -> sqlx::Error {
    sqlx::Error::Decode(format!("unexpected {column} value: {value}").into())
}
