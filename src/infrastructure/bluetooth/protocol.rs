//! UART-over-BLE Protocol
//!
//! The robot exposes a Nordic-style UART service. Characteristic names follow
//! the micro:bit convention, which is from the peripheral's point of view:
//! the host writes command frames to the characteristic ending in `...03`
//! and receives notifications from the one ending in `...02`.

use crate::infrastructure::bluetooth::error::BleError;
use uuid::Uuid;

/// UART Service UUID
pub const UART_SERVICE_UUID: Uuid = Uuid::from_u128(0x6E400001_B5A3_F393_E0A9_E50E24DCCA9E);

/// Characteristic the host writes command frames to
pub const UART_WRITE_CHAR_UUID: Uuid = Uuid::from_u128(0x6E400003_B5A3_F393_E0A9_E50E24DCCA9E);

/// Characteristic the robot notifies text on
pub const UART_NOTIFY_CHAR_UUID: Uuid = Uuid::from_u128(0x6E400002_B5A3_F393_E0A9_E50E24DCCA9E);

/// Parse a UUID string as stored in settings
pub fn parse_uuid(uuid_str: &str) -> Result<Uuid, BleError> {
    Uuid::parse_str(uuid_str.trim()).map_err(|_| BleError::InvalidUuid(uuid_str.to_string()))
}

/// Text carried by a notification, without trailing line endings
pub fn decode_notification(value: &[u8]) -> String {
    String::from_utf8_lossy(value)
        .trim_end_matches(&['\r', '\n'][..])
        .to_string()
}
