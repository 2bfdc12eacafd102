//! Percentage threshold zones and the edge-triggered success latch.
//!
//! Pure logic, safe to call on every animation tick.

use serde::{Deserialize, Serialize};

/// One display zone: everything at or above `percentage` (up to the next
/// band) renders in `color`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdBand {
    pub percentage: f64,
    pub color: String,
}

/// Select the color of the highest band at or below `percentage`.
///
/// `None` when no band applies (empty list, or percentage below every band).
pub fn zone_for(percentage: f64, bands: &[ThresholdBand]) -> Option<&str> {
    bands
        .iter()
        .filter(|band| band.percentage <= percentage)
        .max_by(|a, b| a.percentage.total_cmp(&b.percentage))
        .map(|band| band.color.as_str())
}

/// Edge-triggered detector for crossing the success threshold.
///
/// Fires once per upward crossing: while the percentage holds at or above
/// the threshold the latch stays disarmed, and it re-arms only after the
/// percentage drops below the line again.
#[derive(Debug, Clone, Copy)]
pub struct SuccessLatch {
    threshold: f64,
    armed: bool,
}

impl SuccessLatch {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            armed: true,
        }
    }

    /// Feed the latest percentage; `true` means the celebratory
    /// `SuccessReached` event fires now.
    pub fn observe(&mut self, percentage: f64) -> bool {
        if percentage >= self.threshold {
            if self.armed {
                self.armed = false;
                return true;
            }
            false
        } else {
            self.armed = true;
            false
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
