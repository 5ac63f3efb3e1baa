use crate::domain::connection::{Connection, ConnectionError};
use crate::domain::frame::CommandFrame;
use crate::domain::models::{ButtonEvent, JoystickSample, MotorPair};
use crate::domain::motor::compute_motor_pair;
use crate::domain::throttle::{CommandThrottler, ThrottleState};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DriveError {
    #[error("Robot not connected, dropped {0}")]
    NotConnected(String),

    #[error("Robot rejected {frame}: {reason}")]
    SendRejected { frame: String, reason: String },
}

/// Turns stick and button input into frames on a [`Connection`].
///
/// Owned by the control screen; the connection handle lives exactly as long
/// as the screen does.
pub struct DriveController<C: Connection> {
    connection: C,
    throttler: CommandThrottler,
    last_sent: Option<CommandFrame>,
}

impl<C: Connection> DriveController<C> {
    pub fn new(connection: C, min_interval: Duration) -> Self {
        Self {
            connection,
            throttler: CommandThrottler::new(min_interval),
            last_sent: None,
        }
    }

    pub fn throttle_state(&self) -> &ThrottleState {
        self.throttler.state()
    }

    pub fn last_pair(&self) -> MotorPair {
        self.throttler.last_pair()
    }

    /// Last frame handed to the connection successfully
    pub fn last_sent(&self) -> Option<CommandFrame> {
        self.last_sent
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    /// Returns the frame sent, or `None` if the update was throttled.
    pub fn on_joystick(
        &mut self,
        sample: JoystickSample,
        now: Instant,
    ) -> Result<Option<CommandFrame>, DriveError> {
        let candidate = compute_motor_pair(sample.angle, sample.strength);
        match self.throttler.on_motion(candidate, sample.strength, now) {
            Some(frame) => self.dispatch(frame).map(Some),
            None => Ok(None),
        }
    }

    pub fn on_button(&mut self, event: ButtonEvent) -> Result<CommandFrame, DriveError> {
        let frame = self.throttler.on_button(event);
        self.dispatch(frame)
    }

    /// Stick let go and back in the center
    pub fn on_released(&mut self) -> Result<CommandFrame, DriveError> {
        let frame = self.throttler.on_released();
        debug!("Forced stop after joystick release");
        self.dispatch(frame)
    }

    // Throttle state has already advanced; a failed send is not rolled back.
    fn dispatch(&mut self, frame: CommandFrame) -> Result<CommandFrame, DriveError> {
        let text = frame.to_string();

        if !self.connection.is_connected() {
            warn!("Not connected, dropping {:?}", text);
            return Err(DriveError::NotConnected(text));
        }

        match self.connection.send(&frame.encode()) {
            Ok(()) => {
                debug!("Sent {:?}", text);
                self.last_sent = Some(frame);
                Ok(frame)
            }
            Err(ConnectionError::NotConnected) => {
                warn!("Connection dropped while sending {:?}", text);
                Err(DriveError::NotConnected(text))
            }
            Err(ConnectionError::SendRejected(reason)) => {
                warn!("Send of {:?} rejected: {}", text, reason);
                Err(DriveError::SendRejected {
                    frame: text,
                    reason,
                })
            }
        }
    }
}
