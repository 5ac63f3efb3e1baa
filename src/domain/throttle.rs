//! Motion command rate limiting.
//!
//! Motion updates are sent only when the motor pair changes and at most once
//! per `min_interval`. Stops are never delayed, and button frames bypass the
//! limiter entirely.

use crate::domain::frame::{CommandCode, CommandFrame};
use crate::domain::models::{ButtonEvent, MotorPair};
use std::time::{Duration, Instant};

pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThrottleState {
    /// Pair carried by the last motion frame
    pub last: MotorPair,
    /// `None` means the next differing motion frame is not rate limited
    pub last_sent_at: Option<Instant>,
}

#[derive(Debug, Clone)]
pub struct CommandThrottler {
    state: ThrottleState,
    min_interval: Duration,
}

impl Default for CommandThrottler {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}

impl CommandThrottler {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            state: ThrottleState::default(),
            min_interval,
        }
    }

    pub fn state(&self) -> &ThrottleState {
        &self.state
    }

    pub fn last_pair(&self) -> MotorPair {
        self.state.last
    }

    /// Decide whether a motion candidate should be sent at `now`.
    ///
    /// `strength` is the stick deflection the candidate was computed from;
    /// zero means the stick is centered.
    pub fn on_motion(
        &mut self,
        candidate: MotorPair,
        strength: u8,
        now: Instant,
    ) -> Option<CommandFrame> {
        if strength == 0 {
            if self.state.last.is_stopped() {
                return None;
            }
            return Some(self.record(MotorPair::STOP, Some(now)));
        }

        if candidate == self.state.last || !self.interval_elapsed(now) {
            return None;
        }

        Some(self.record(candidate, Some(now)))
    }

    /// Unconditional stop after the stick has been let go.
    ///
    /// Repeats the stop even when one was already sent, in case it was lost,
    /// and clears the send timestamp so the next move goes out immediately.
    pub fn on_released(&mut self) -> CommandFrame {
        self.record(MotorPair::STOP, None)
    }

    /// Frame for a button event, carrying the last sent motor pair.
    pub fn on_button(&self, event: ButtonEvent) -> CommandFrame {
        let code = CommandCode::from(event);
        CommandFrame::new(self.state.last.left, self.state.last.right, code)
    }

    fn interval_elapsed(&self, now: Instant) -> bool {
        match self.state.last_sent_at {
            None => true,
            Some(sent_at) => now.saturating_duration_since(sent_at) >= self.min_interval,
        }
    }

    fn record(&mut self, pair: MotorPair, sent_at: Option<Instant>) -> CommandFrame {
        self.state = ThrottleState {
            last: pair,
            last_sent_at: sent_at,
        };
        CommandFrame::motion(pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::ButtonId;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_first_change_is_sent() {
        let mut throttler = CommandThrottler::default();
        let frame = throttler.on_motion(MotorPair::new(50, 50), 40, Instant::now());
        assert_eq!(frame, Some(CommandFrame::motion(MotorPair::new(50, 50))));
        assert_eq!(throttler.last_pair(), MotorPair::new(50, 50));
    }

    #[test]
    fn test_updates_inside_interval_are_dropped() {
        let mut throttler = CommandThrottler::default();
        let t0 = Instant::now();

        assert!(throttler.on_motion(MotorPair::new(50, 50), 40, t0).is_some());
        assert!(throttler
            .on_motion(MotorPair::new(51, 50), 40, t0 + ms(10))
            .is_none());
        assert_eq!(throttler.last_pair(), MotorPair::new(50, 50));
        assert_eq!(throttler.state().last_sent_at, Some(t0));
    }

    #[test]
    fn test_update_after_interval_is_sent() {
        let mut throttler = CommandThrottler::default();
        let t0 = Instant::now();

        throttler.on_motion(MotorPair::new(50, 50), 40, t0);
        let frame = throttler.on_motion(MotorPair::new(60, 40), 40, t0 + ms(100));
        assert_eq!(frame, Some(CommandFrame::motion(MotorPair::new(60, 40))));
        assert_eq!(throttler.state().last_sent_at, Some(t0 + ms(100)));
    }

    #[test]
    fn test_unchanged_pair_is_never_resent() {
        let mut throttler = CommandThrottler::default();
        let t0 = Instant::now();

        throttler.on_motion(MotorPair::new(50, 50), 40, t0);
        assert!(throttler
            .on_motion(MotorPair::new(50, 50), 40, t0 + ms(500))
            .is_none());
    }

    #[test]
    fn test_at_most_one_emission_per_interval() {
        let mut throttler = CommandThrottler::default();
        let t0 = Instant::now();
        let mut sent_at = Vec::new();

        // A changing candidate every 7ms for two seconds
        for step in 0..300u64 {
            let now = t0 + ms(step * 7);
            let candidate = MotorPair::new(step as i32 % 200 + 1, 0);
            if throttler.on_motion(candidate, 50, now).is_some() {
                sent_at.push(now);
            }
        }

        assert!(sent_at.len() > 1);
        for pair in sent_at.windows(2) {
            assert!(pair[1] - pair[0] >= DEFAULT_MIN_INTERVAL);
        }
    }

    #[test]
    fn test_stop_bypasses_interval() {
        let mut throttler = CommandThrottler::default();
        let t0 = Instant::now();

        throttler.on_motion(MotorPair::new(80, -80), 60, t0);
        let frame = throttler.on_motion(MotorPair::STOP, 0, t0 + ms(1));
        assert_eq!(frame, Some(CommandFrame::stop()));
        assert_eq!(throttler.last_pair(), MotorPair::STOP);
        assert_eq!(throttler.state().last_sent_at, Some(t0 + ms(1)));
    }

    #[test]
    fn test_repeated_stop_is_suppressed() {
        let mut throttler = CommandThrottler::default();
        let t0 = Instant::now();

        assert!(throttler.on_motion(MotorPair::STOP, 0, t0).is_none());
        throttler.on_motion(MotorPair::new(10, 10), 5, t0);
        assert!(throttler.on_motion(MotorPair::STOP, 0, t0 + ms(1)).is_some());
        assert!(throttler.on_motion(MotorPair::STOP, 0, t0 + ms(2)).is_none());
    }

    #[test]
    fn test_zero_strength_stops_regardless_of_candidate() {
        let mut throttler = CommandThrottler::default();
        let t0 = Instant::now();

        throttler.on_motion(MotorPair::new(30, 30), 20, t0);
        let frame = throttler.on_motion(MotorPair::new(1, 1), 0, t0 + ms(5));
        assert_eq!(frame, Some(CommandFrame::stop()));
    }

    #[test]
    fn test_release_forces_stop_and_clears_timestamp() {
        let mut throttler = CommandThrottler::default();
        let t0 = Instant::now();

        throttler.on_motion(MotorPair::new(30, 30), 20, t0);
        throttler.on_motion(MotorPair::STOP, 0, t0 + ms(1));

        // Already stopped, still resent
        assert_eq!(throttler.on_released(), CommandFrame::stop());
        assert_eq!(throttler.state().last_sent_at, None);

        // Next move is not rate limited
        let frame = throttler.on_motion(MotorPair::new(5, 5), 3, t0 + ms(2));
        assert_eq!(frame, Some(CommandFrame::motion(MotorPair::new(5, 5))));
    }

    #[test]
    fn test_buttons_use_last_sent_pair() {
        let mut throttler = CommandThrottler::default();
        let t0 = Instant::now();

        throttler.on_motion(MotorPair::new(50, 50), 40, t0);
        // Throttled, so (51, 50) is never the last sent pair
        throttler.on_motion(MotorPair::new(51, 50), 40, t0 + ms(10));

        let press = throttler.on_button(ButtonEvent::press(ButtonId::A));
        let release = throttler.on_button(ButtonEvent::release(ButtonId::A));
        assert_eq!(press.encode(), b"50:50:1\n");
        assert_eq!(release.encode(), b"50:50:3\n");
        assert_eq!(throttler.state().last_sent_at, Some(t0));
    }

    #[test]
    fn test_move_right_after_stop_is_rate_limited() {
        let mut throttler = CommandThrottler::default();
        let t0 = Instant::now();

        throttler.on_motion(MotorPair::new(50, 50), 40, t0);
        assert!(throttler.on_motion(MotorPair::STOP, 0, t0 + ms(1)).is_some());

        // The stop restarted the interval
        assert!(throttler
            .on_motion(MotorPair::new(60, 60), 40, t0 + ms(50))
            .is_none());
        assert_eq!(throttler.last_pair(), MotorPair::STOP);
        assert_eq!(
            throttler.on_motion(MotorPair::new(60, 60), 40, t0 + ms(101)),
            Some(CommandFrame::motion(MotorPair::new(60, 60)))
        );
    }
}
