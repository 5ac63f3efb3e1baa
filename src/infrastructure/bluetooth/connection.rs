//! BLE Connection Module
//!
//! Connects to a robot, discovers its UART service and resolves the
//! characteristics used for commands and replies.

use crate::domain::models::{AppEvent, MessageSeverity, StatusMessage};
use crate::domain::settings::Settings;
use crate::infrastructure::bluetooth::error::BleError;
use crate::infrastructure::bluetooth::protocol::{self, parse_uuid};
use btleplug::api::{CharPropFlags, Characteristic, Peripheral as _};
use btleplug::platform::Peripheral;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// UUIDs the connection looks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub service_uuid: Uuid,
    pub write_char_uuid: Uuid,
    pub notify_char_uuid: Uuid,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            service_uuid: protocol::UART_SERVICE_UUID,
            write_char_uuid: protocol::UART_WRITE_CHAR_UUID,
            notify_char_uuid: protocol::UART_NOTIFY_CHAR_UUID,
        }
    }
}

impl ConnectionConfig {
    pub fn from_settings(settings: &Settings) -> Result<Self, BleError> {
        Ok(Self {
            service_uuid: parse_uuid(&settings.ble_service_uuid)?,
            write_char_uuid: parse_uuid(&settings.ble_write_char_uuid)?,
            notify_char_uuid: parse_uuid(&settings.ble_notify_char_uuid)?,
        })
    }
}

/// Result of a successful connection
pub struct ConnectionResult {
    pub peripheral: Peripheral,
    pub write_characteristic: Characteristic,
    /// `None` when the robot has no notify characteristic; commands still work
    pub notify_characteristic: Option<Characteristic>,
}

/// BLE Connection handler
pub struct BleConnection {
    event_sender: mpsc::UnboundedSender<AppEvent>,
    config: ConnectionConfig,
}

impl BleConnection {
    pub fn new(event_sender: mpsc::UnboundedSender<AppEvent>, config: ConnectionConfig) -> Self {
        Self {
            event_sender,
            config,
        }
    }

    pub async fn connect(&self, peripheral: Peripheral) -> Result<ConnectionResult, BleError> {
        info!("Connecting to {}", peripheral.address());
        self.send_log("Connecting...", MessageSeverity::Info);

        if !peripheral.is_connected().await? {
            peripheral.connect().await?;
        }
        info!("Connected to GATT server, discovering services...");

        peripheral.discover_services().await?;

        let (write_char, notify_char) = match self.find_characteristics(&peripheral) {
            Ok(found) => found,
            Err(e) => {
                error!("{}", e);
                let _ = peripheral.disconnect().await;
                return Err(e);
            }
        };

        let notify_characteristic = match notify_char {
            Some(c) => match peripheral.subscribe(&c).await {
                Ok(()) => {
                    info!("Subscribed to notifications on {}", c.uuid);
                    Some(c)
                }
                Err(e) => {
                    warn!("Could not subscribe to notifications: {}", e);
                    None
                }
            },
            None => None,
        };

        self.send_log("Connected", MessageSeverity::Success);

        Ok(ConnectionResult {
            peripheral,
            write_characteristic: write_char,
            notify_characteristic,
        })
    }

    fn find_characteristics(
        &self,
        peripheral: &Peripheral,
    ) -> Result<(Characteristic, Option<Characteristic>), BleError> {
        let has_service = peripheral
            .services()
            .iter()
            .any(|s| s.uuid == self.config.service_uuid);
        if !has_service {
            return Err(BleError::ServiceNotFound);
        }

        let mut write_char = None;
        let mut notify_char = None;

        for c in peripheral.characteristics() {
            if c.service_uuid != self.config.service_uuid {
                continue;
            }
            if c.uuid == self.config.write_char_uuid {
                info!("Found write characteristic");
                write_char = Some(c);
            } else if c.uuid == self.config.notify_char_uuid {
                if c.properties
                    .intersects(CharPropFlags::NOTIFY | CharPropFlags::INDICATE)
                {
                    info!("Found notify characteristic");
                    notify_char = Some(c);
                } else {
                    warn!("Characteristic {} does not notify, ignoring", c.uuid);
                }
            }
        }

        let write = write_char.ok_or_else(|| {
            BleError::CharacteristicNotFound(self.config.write_char_uuid.to_string())
        })?;

        Ok((write, notify_char))
    }

    fn send_log(&self, message: &str, severity: MessageSeverity) {
        let _ = self
            .event_sender
            .send(AppEvent::LogMessage(StatusMessage::new(message, severity)));
    }
}
