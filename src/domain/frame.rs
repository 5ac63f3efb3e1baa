//! Robot command frame
//!
//! Every command is a single text line:
//!
//! ```text
//! <left>:<right>:<code>\n
//! ```
//!
//! `left` and `right` are signed decimal motor values, `code` tells the robot
//! what kind of update it is (see [`CommandCode`]).

use crate::domain::models::{ButtonAction, ButtonEvent, ButtonId, MotorPair};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const FIELD_SEPARATOR: char = ':';
const TERMINATOR: char = '\n';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandCode {
    /// Joystick motion update
    Motion = 0,
    /// Button A pressed
    ButtonADown = 1,
    /// Button B pressed
    ButtonBDown = 2,
    /// Any button released
    ButtonUp = 3,
}

impl CommandCode {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Motion),
            1 => Some(Self::ButtonADown),
            2 => Some(Self::ButtonBDown),
            3 => Some(Self::ButtonUp),
            _ => None,
        }
    }
}

impl From<ButtonEvent> for CommandCode {
    fn from(event: ButtonEvent) -> Self {
        match (event.button, event.action) {
            (ButtonId::A, ButtonAction::Press) => Self::ButtonADown,
            (ButtonId::B, ButtonAction::Press) => Self::ButtonBDown,
            (_, ButtonAction::Release) => Self::ButtonUp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandFrame {
    pub left: i32,
    pub right: i32,
    pub code: CommandCode,
}

impl CommandFrame {
    pub fn new(left: i32, right: i32, code: CommandCode) -> Self {
        Self { left, right, code }
    }

    pub fn motion(pair: MotorPair) -> Self {
        Self::new(pair.left, pair.right, CommandCode::Motion)
    }

    pub fn stop() -> Self {
        Self::motion(MotorPair::STOP)
    }

    pub fn motors(&self) -> MotorPair {
        MotorPair::new(self.left, self.right)
    }

    /// Bytes written to the peripheral
    pub fn encode(&self) -> Vec<u8> {
        encode(self.left, self.right, self.code)
    }
}

impl fmt::Display for CommandFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}{}",
            self.left,
            self.right,
            self.code.as_u8(),
            TERMINATOR,
            sep = FIELD_SEPARATOR
        )
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("Frame is not valid UTF-8")]
    InvalidEncoding,

    #[error("Frame is not newline terminated")]
    MissingTerminator,

    #[error("Expected 3 fields, found {0}")]
    FieldCount(usize),

    #[error("Invalid {field} value: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Unknown command code: {0}")]
    UnknownCode(u8),
}

pub fn encode(left: i32, right: i32, code: CommandCode) -> Vec<u8> {
    CommandFrame::new(left, right, code).to_string().into_bytes()
}

pub fn decode(bytes: &[u8]) -> Result<CommandFrame, FrameError> {
    let text = std::str::from_utf8(bytes).map_err(|_| FrameError::InvalidEncoding)?;
    text.parse()
}

impl FromStr for CommandFrame {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s
            .strip_suffix(TERMINATOR)
            .ok_or(FrameError::MissingTerminator)?;

        let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
        if fields.len() != 3 {
            return Err(FrameError::FieldCount(fields.len()));
        }

        let left = parse_field("left", fields[0])?;
        let right = parse_field("right", fields[1])?;
        let raw_code: u8 = parse_field("code", fields[2])?;
        let code = CommandCode::from_u8(raw_code).ok_or(FrameError::UnknownCode(raw_code))?;

        Ok(Self { left, right, code })
    }
}

fn parse_field<T: FromStr>(field: &'static str, value: &str) -> Result<T, FrameError> {
    value.parse().map_err(|_| FrameError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_motion() {
        assert_eq!(encode(-100, 100, CommandCode::Motion), b"-100:100:0\n");
        assert_eq!(CommandFrame::stop().encode(), b"0:0:0\n");
    }

    #[test]
    fn test_button_codes() {
        assert_eq!(
            CommandCode::from(ButtonEvent::press(ButtonId::A)),
            CommandCode::ButtonADown
        );
        assert_eq!(
            CommandCode::from(ButtonEvent::press(ButtonId::B)),
            CommandCode::ButtonBDown
        );
        assert_eq!(
            CommandCode::from(ButtonEvent::release(ButtonId::A)),
            CommandCode::ButtonUp
        );
        assert_eq!(
            CommandCode::from(ButtonEvent::release(ButtonId::B)),
            CommandCode::ButtonUp
        );
    }

    #[test]
    fn test_decode_round_trips_encoded_frames() {
        let frames = [
            CommandFrame::new(-220, 220, CommandCode::Motion),
            CommandFrame::new(15, -7, CommandCode::ButtonADown),
            CommandFrame::new(0, 0, CommandCode::ButtonUp),
        ];
        for frame in frames {
            assert_eq!(decode(&frame.encode()).unwrap(), frame);
        }
    }

    #[test]
    fn test_decode_rejects_malformed_frames() {
        assert_eq!(decode(b"1:2:0"), Err(FrameError::MissingTerminator));
        assert_eq!(decode(b"1:2\n"), Err(FrameError::FieldCount(2)));
        assert_eq!(decode(b"1:2:0:4\n"), Err(FrameError::FieldCount(4)));
        assert_eq!(decode(b"1:2:9\n"), Err(FrameError::UnknownCode(9)));
        assert_eq!(decode(&[0xff, b'\n']), Err(FrameError::InvalidEncoding));
        assert!(matches!(
            decode(b"x:2:0\n"),
            Err(FrameError::InvalidNumber { field: "left", .. })
        ));
    }
}
