//! BLE Scanner Module
//!
//! Time-boxed discovery of robots whose advertised name matches a filter.

use crate::domain::models::{
    display_name, AppEvent, MessageSeverity, ScannedDevice, StatusMessage,
};
use crate::infrastructure::bluetooth::error::BleError;
use btleplug::api::{Central, CentralEvent, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, PeripheralId};
use futures::StreamExt;
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Decides which advertisements make it into the device list
#[derive(Debug, Default)]
pub struct DeviceFilter {
    name_filter: String,
    seen: HashSet<String>,
}

impl DeviceFilter {
    pub fn new(name_filter: &str) -> Self {
        Self {
            name_filter: name_filter.to_string(),
            seen: HashSet::new(),
        }
    }

    /// Accepts each matching display name once. An empty filter matches all.
    pub fn admit(&mut self, display_name: &str) -> bool {
        if !display_name.contains(&self.name_filter) {
            return false;
        }
        self.seen.insert(display_name.to_string())
    }
}

/// BLE Scanner for discovering robots
pub struct BleScanner {
    event_sender: mpsc::UnboundedSender<AppEvent>,
}

impl BleScanner {
    pub fn new(event_sender: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self { event_sender }
    }

    /// Scan for `duration`, streaming matches to the UI as they appear.
    pub async fn scan(
        &self,
        adapter: &Adapter,
        name_filter: &str,
        duration: Duration,
    ) -> Result<(), BleError> {
        info!(
            "Starting BLE scan for {:?} ({}s)",
            name_filter,
            duration.as_secs()
        );
        self.send_log("Scanning...", MessageSeverity::Info);

        let mut events = adapter.events().await?;
        adapter.start_scan(ScanFilter::default()).await?;

        let mut filter = DeviceFilter::new(name_filter);
        let mut found = 0usize;
        let deadline = tokio::time::Instant::now() + duration;

        while let Ok(Some(event)) = tokio::time::timeout_at(deadline, events.next()).await {
            let id = match event {
                CentralEvent::DeviceDiscovered(id) | CentralEvent::DeviceUpdated(id) => id,
                _ => continue,
            };

            if let Some(device) = self.inspect(adapter, id, &mut filter).await {
                found += 1;
                let _ = self.event_sender.send(AppEvent::DeviceFound(device));
            }
        }

        adapter.stop_scan().await?;
        info!("Scan finished, {} matching device(s)", found);
        self.send_log("Scan finished", MessageSeverity::Info);
        let _ = self.event_sender.send(AppEvent::ScanFinished);

        Ok(())
    }

    async fn inspect(
        &self,
        adapter: &Adapter,
        id: PeripheralId,
        filter: &mut DeviceFilter,
    ) -> Option<ScannedDevice> {
        let peripheral = adapter.peripheral(&id).await.ok()?;
        let properties = peripheral.properties().await.ok()??;

        let address = properties.address.to_string();
        let label = display_name(properties.local_name.as_deref(), &address);
        debug!("Found: {}", label);

        if !filter.admit(&label) {
            return None;
        }

        Some(ScannedDevice {
            id,
            name: properties.local_name.unwrap_or_default(),
            address,
            signal_strength: properties.rssi.unwrap_or(0),
        })
    }

    fn send_log(&self, message: &str, severity: MessageSeverity) {
        let _ = self
            .event_sender
            .send(AppEvent::LogMessage(StatusMessage::new(message, severity)));
    }
}
