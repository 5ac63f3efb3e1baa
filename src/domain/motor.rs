//! Joystick to differential-drive mapping.

use crate::domain::models::{JoystickSample, MotorPair};

/// Motor values sent to the robot are limited to this magnitude
pub const MOTOR_LIMIT: i32 = 220;

/// Convert a polar stick reading into left/right motor values.
///
/// The stick axes are inverted relative to the trigonometric convention:
/// pushing "up" drives the robot forward and pushing "right" turns it right.
/// Results are truncated toward zero, then clamped to `±MOTOR_LIMIT`.
pub fn compute_motor_pair(angle: u16, strength: u8) -> MotorPair {
    let rad = f64::from(angle).to_radians();
    let strength = f64::from(strength);

    let turn = -rad.cos();
    let forward = -rad.sin();

    let left = truncate(strength * (forward - turn));
    let right = truncate(-(strength * (forward + turn)));

    MotorPair {
        left: left.clamp(-MOTOR_LIMIT, MOTOR_LIMIT),
        right: right.clamp(-MOTOR_LIMIT, MOTOR_LIMIT),
    }
}

/// Truncate toward zero, first snapping values within rounding noise of an
/// integer. `cos(90°)` is 6e-17, not 0, and would otherwise turn 100 into 99.
fn truncate(value: f64) -> i32 {
    const EPSILON: f64 = 1e-9;

    let nearest = value.round();
    if (value - nearest).abs() < EPSILON {
        nearest as i32
    } else {
        value as i32
    }
}

impl From<JoystickSample> for MotorPair {
    fn from(sample: JoystickSample) -> Self {
        compute_motor_pair(sample.angle, sample.strength)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_straight_up_full_strength() {
        assert_eq!(compute_motor_pair(90, 100), MotorPair::new(-100, 100));
    }

    #[test]
    fn test_right_angles_are_exact() {
        assert_eq!(compute_motor_pair(0, 100), MotorPair::new(100, 100));
        assert_eq!(compute_motor_pair(180, 100), MotorPair::new(-100, -100));
        assert_eq!(compute_motor_pair(270, 100), MotorPair::new(100, -100));
        assert_eq!(compute_motor_pair(90, 37), MotorPair::new(-37, 37));
        assert_eq!(compute_motor_pair(270, 1), MotorPair::new(1, -1));
    }

    #[test]
    fn test_fractions_still_truncate_toward_zero() {
        // 45°: left is 0, right is -(100 * -1.414..) = 141.4..
        assert_eq!(compute_motor_pair(45, 100), MotorPair::new(0, 141));
        // 225°: right is -141.4..
        assert_eq!(compute_motor_pair(225, 100), MotorPair::new(0, -141));
    }

    #[test]
    fn test_zero_strength_is_stop() {
        for angle in 0..360 {
            assert_eq!(compute_motor_pair(angle, 0), MotorPair::STOP);
        }
    }

    #[test]
    fn test_output_is_bounded() {
        for angle in 0..360 {
            for strength in 0..=100 {
                let pair = compute_motor_pair(angle, strength);
                assert!(pair.left.abs() <= MOTOR_LIMIT, "{angle} {strength}");
                assert!(pair.right.abs() <= MOTOR_LIMIT, "{angle} {strength}");
            }
        }
    }

    #[test]
    fn test_opposite_direction_reverses_left_motor() {
        for angle in 0..360u16 {
            for strength in [10u8, 50, 100] {
                let forward = compute_motor_pair(angle, strength);
                let reversed = compute_motor_pair((angle + 180) % 360, strength);
                assert!(
                    (forward.left + reversed.left).abs() <= 1,
                    "angle {angle} strength {strength}: {forward:?} vs {reversed:?}"
                );
            }
        }
    }

    #[test]
    fn test_sample_conversion_matches_function() {
        let sample = JoystickSample::new(45, 80);
        assert_eq!(MotorPair::from(sample), compute_motor_pair(45, 80));
    }
}
