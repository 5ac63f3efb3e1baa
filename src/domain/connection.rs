use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("No active connection")]
    NotConnected,

    #[error("Send rejected: {0}")]
    SendRejected(String),
}

/// Link to the robot as seen by the drive controller.
///
/// `send` must not block the caller for long; implementations that talk to a
/// slow transport should hand the bytes off to a worker.
pub trait Connection {
    fn send(&mut self, frame: &[u8]) -> Result<(), ConnectionError>;
    fn is_connected(&self) -> bool;
}
