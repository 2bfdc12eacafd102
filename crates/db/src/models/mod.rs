//! Row models and DTO conversions.
//!
//! Each submodule contains a `FromRow` entity struct matching the
//! database row plus conversions to and from the typed domain structs in
//! `stage-core`.

pub mod stage_session;
pub mod vote;
