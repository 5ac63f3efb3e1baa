use thiserror::Error;

#[derive(Debug, Error)]
pub enum BleError {
    #[error("Bluetooth error: {0}")]
    Btleplug(#[from] btleplug::Error),

    #[error("No Bluetooth adapter found")]
    NoAdapter,

    #[error("Invalid UUID: {0:?}")]
    InvalidUuid(String),

    #[error("UART service not found on device")]
    ServiceNotFound,

    #[error("Characteristic not found: {0}")]
    CharacteristicNotFound(String),

    #[error("No device connected")]
    NotConnected,
}
