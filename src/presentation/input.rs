//! Pacing of virtual-stick input.
//!
//! The stick reports a sample at most once per `sample_interval` while held,
//! a centered sample as soon as it is let go, and a release signal once it has
//! settled back in the middle.

use crate::domain::models::JoystickSample;
use std::time::{Duration, Instant};

/// What the stick widget saw this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StickState {
    pub sample: JoystickSample,
    pub held: bool,
    pub just_released: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacedInput {
    Sample(JoystickSample),
    /// Stick let go and still centered after the settle delay
    Released,
}

#[derive(Debug, Clone)]
pub struct InputPacer {
    sample_interval: Duration,
    settle_delay: Duration,
    last_sample_at: Option<Instant>,
    settle_deadline: Option<Instant>,
}

impl InputPacer {
    pub fn new(sample_interval: Duration, settle_delay: Duration) -> Self {
        Self {
            sample_interval,
            settle_delay,
            last_sample_at: None,
            settle_deadline: None,
        }
    }

    /// True while a release signal is still pending
    pub fn is_settling(&self) -> bool {
        self.settle_deadline.is_some()
    }

    pub fn update(&mut self, stick: StickState, now: Instant) -> Vec<PacedInput> {
        let mut out = Vec::new();

        if stick.just_released {
            out.push(PacedInput::Sample(JoystickSample::centered()));
            self.last_sample_at = None;
            self.settle_deadline = Some(now + self.settle_delay);
        } else if stick.held {
            let due = self
                .last_sample_at
                .map_or(true, |at| now.saturating_duration_since(at) >= self.sample_interval);
            if due {
                out.push(PacedInput::Sample(stick.sample));
                self.last_sample_at = Some(now);
            }
        }

        if let Some(deadline) = self.settle_deadline {
            if now >= deadline {
                self.settle_deadline = None;
                if !stick.held {
                    out.push(PacedInput::Released);
                }
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pacer() -> InputPacer {
        InputPacer::new(Duration::from_millis(100), Duration::from_millis(50))
    }

    fn held(angle: u16, strength: u8) -> StickState {
        StickState {
            sample: JoystickSample::new(angle, strength),
            held: true,
            just_released: false,
        }
    }

    fn idle() -> StickState {
        StickState {
            sample: JoystickSample::centered(),
            held: false,
            just_released: false,
        }
    }

    fn released() -> StickState {
        StickState {
            just_released: true,
            ..idle()
        }
    }

    #[test]
    fn test_held_stick_is_sampled_at_interval() {
        let mut pacer = pacer();
        let t0 = Instant::now();

        assert_eq!(
            pacer.update(held(90, 50), t0),
            vec![PacedInput::Sample(JoystickSample::new(90, 50))]
        );
        assert!(pacer.update(held(95, 50), t0 + Duration::from_millis(40)).is_empty());
        assert_eq!(
            pacer.update(held(100, 60), t0 + Duration::from_millis(100)),
            vec![PacedInput::Sample(JoystickSample::new(100, 60))]
        );
    }

    #[test]
    fn test_release_sends_center_then_signal_after_settle() {
        let mut pacer = pacer();
        let t0 = Instant::now();

        pacer.update(held(90, 50), t0);
        assert_eq!(
            pacer.update(released(), t0 + Duration::from_millis(10)),
            vec![PacedInput::Sample(JoystickSample::centered())]
        );
        assert!(pacer.is_settling());
        assert!(pacer.update(idle(), t0 + Duration::from_millis(30)).is_empty());
        assert_eq!(
            pacer.update(idle(), t0 + Duration::from_millis(60)),
            vec![PacedInput::Released]
        );
        assert!(!pacer.is_settling());
        assert!(pacer.update(idle(), t0 + Duration::from_millis(200)).is_empty());
    }

    #[test]
    fn test_grabbing_again_cancels_release_signal() {
        let mut pacer = pacer();
        let t0 = Instant::now();

        pacer.update(held(90, 50), t0);
        pacer.update(released(), t0 + Duration::from_millis(10));
        let out = pacer.update(held(0, 30), t0 + Duration::from_millis(70));

        assert_eq!(out, vec![PacedInput::Sample(JoystickSample::new(0, 30))]);
        assert!(!pacer.is_settling());
    }

    #[test]
    fn test_idle_stick_produces_nothing() {
        let mut pacer = pacer();
        assert!(pacer.update(idle(), Instant::now()).is_empty());
    }
}
