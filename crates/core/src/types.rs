/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Voters are anonymous, identified by a stable client-generated UUID.
pub type VoterId = uuid::Uuid;
