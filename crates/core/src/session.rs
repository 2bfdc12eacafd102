//! Operator-facing session configuration.

use serde::{Deserialize, Serialize};

use crate::threshold::ThresholdBand;
use crate::types::DbId;
use crate::vote::VoteChangePolicy;

/// Default number of voter tiles the wall renders.
pub const DEFAULT_MAX_WALL_SIZE: usize = 100;

/// Label and icon shown for one vote direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteSideMeta {
    pub label: String,
    pub icon: String,
}

/// Everything the operator configures for one voting round.
///
/// Broadcast in full on the `config` channel whenever it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    pub session_id: DbId,
    pub countdown_secs: u32,
    /// Like-share percentage at which the celebratory event fires (0-100).
    pub success_threshold: f64,
    pub like: VoteSideMeta,
    pub dislike: VoteSideMeta,
    pub change_policy: VoteChangePolicy,
    /// Color zones for the percentage display, ordered ascending.
    pub threshold_bands: Vec<ThresholdBand>,
    pub max_wall_size: usize,
}

impl SessionConfig {
    /// A config with product defaults, as created by the operator widget.
    pub fn new(session_id: DbId) -> Self {
        Self {
            session_id,
            countdown_secs: 10,
            success_threshold: 65.0,
            like: VoteSideMeta {
                label: "Like".to_string(),
                icon: "👍".to_string(),
            },
            dislike: VoteSideMeta {
                label: "Dislike".to_string(),
                icon: "👎".to_string(),
            },
            change_policy: VoteChangePolicy::None,
            threshold_bands: Vec::new(),
            max_wall_size: DEFAULT_MAX_WALL_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = SessionConfig::new(1);
        assert_eq!(config.change_policy, VoteChangePolicy::None);
        assert!(config.success_threshold > 0.0 && config.success_threshold <= 100.0);
        assert!(config.max_wall_size > 0);
    }

    #[test]
    fn round_trips_through_json() {
        let mut config = SessionConfig::new(3);
        config.change_policy = VoteChangePolicy::Limited(2);
        let json = serde_json::to_string(&config).unwrap();
        let back: SessionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
