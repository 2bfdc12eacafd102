//! Display-side percentage interpolation.
//!
//! The big screen eases its shown percentage toward the live target at a
//! fixed fraction per tick instead of jumping, so a burst of votes reads
//! as one smooth movement. Only the pure step lives here; the render loop
//! that calls it is presentation code.

/// Fraction of the remaining distance covered per tick.
const EASING_FRACTION: f64 = 0.2;

/// Distance under which the value snaps to the target and the animation
/// terminates.
const SNAP_EPSILON: f64 = 0.05;

/// Advance the displayed value one tick toward `target`.
pub fn step(current: f64, target: f64) -> f64 {
    let next = current + (target - current) * EASING_FRACTION;
    if (next - target).abs() < SNAP_EPSILON {
        target
    } else {
        next
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_moves_toward_the_target() {
        let next = step(0.0, 100.0);
        assert!(next > 0.0 && next < 100.0);
    }

    #[test]
    fn converges_and_snaps_in_bounded_ticks() {
        let mut value = 0.0;
        let target = 70.0;
        let mut ticks = 0;

        while value != target {
            value = step(value, target);
            ticks += 1;
            assert!(ticks < 200, "interpolation must terminate");
        }

        assert_eq!(value, target);
    }

    #[test]
    fn converges_downward_too() {
        let mut value = 70.0;
        for _ in 0..200 {
            value = step(value, 63.6);
        }
        assert_eq!(value, 63.6);
    }

    #[test]
    fn at_target_stays_at_target() {
        assert_eq!(step(42.0, 42.0), 42.0);
    }

    #[test]
    fn retargeting_mid_flight_redirects() {
        let mut value = 0.0;
        for _ in 0..5 {
            value = step(value, 100.0);
        }
        let mid = value;

        // Target drops while the animation is in flight.
        let next = step(mid, 10.0);
        assert!(next < mid);
    }
}
