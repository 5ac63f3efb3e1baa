//! Bluetooth Service Module
//!
//! Main service that coordinates scanning, connection and command writes.
//! Runs on its own thread with a current-thread tokio runtime and is driven
//! by [`BluetoothCommand`]s from the UI.

use crate::domain::models::{
    AppEvent, BluetoothCommand, ConnectionStatus, MessageSeverity, StatusMessage,
};
use crate::domain::settings::SettingsService;
use crate::infrastructure::bluetooth::{
    connection::{BleConnection, ConnectionConfig, ConnectionResult},
    error::BleError,
    link::BleLink,
    protocol,
    scanner::BleScanner,
};
use anyhow::Result;
use btleplug::api::{
    Central, CentralEvent, Characteristic, Manager as _, Peripheral as _, WriteType,
};
use btleplug::platform::{Adapter, Manager, Peripheral, PeripheralId};
use futures::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Main Bluetooth service coordinating all BLE operations
pub struct BluetoothService {
    _manager: Option<Manager>,
    adapter: Option<Adapter>,
    peripheral: Option<Peripheral>,
    write_characteristic: Option<Characteristic>,
    scanner: BleScanner,
    event_sender: mpsc::UnboundedSender<AppEvent>,
    settings: Arc<Mutex<SettingsService>>,
    link_state: Arc<AtomicBool>,
    background_tasks: Vec<JoinHandle<()>>,
}

impl BluetoothService {
    pub fn new(
        event_sender: mpsc::UnboundedSender<AppEvent>,
        settings: Arc<Mutex<SettingsService>>,
        link_state: Arc<AtomicBool>,
    ) -> Self {
        Self {
            _manager: None,
            adapter: None,
            peripheral: None,
            write_characteristic: None,
            scanner: BleScanner::new(event_sender.clone()),
            event_sender,
            settings,
            link_state,
            background_tasks: Vec::new(),
        }
    }

    /// Start the worker thread. Returns the link the UI uses to talk to it.
    pub fn spawn(
        event_sender: mpsc::UnboundedSender<AppEvent>,
        settings: Arc<Mutex<SettingsService>>,
    ) -> Result<BleLink> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let (command_tx, mut command_rx) = mpsc::unbounded_channel();
        let link_state = Arc::new(AtomicBool::new(false));
        let link = BleLink::new(command_tx, link_state.clone());

        std::thread::Builder::new()
            .name("bluetooth".to_string())
            .spawn(move || {
                runtime.block_on(async move {
                    let mut service = BluetoothService::new(event_sender, settings, link_state);
                    while let Some(command) = command_rx.recv().await {
                        service.handle(command).await;
                    }
                    service.disconnect().await;
                    info!("Bluetooth worker stopped");
                });
            })?;

        Ok(link)
    }

    async fn handle(&mut self, command: BluetoothCommand) {
        match command {
            BluetoothCommand::StartScan => {
                if let Err(e) = self.start_scan().await {
                    error!("Scan failed: {}", e);
                    self.report_error(format!("Scan failed: {}", e));
                    let _ = self.event_sender.send(AppEvent::ScanFinished);
                }
            }
            BluetoothCommand::Connect(id) => {
                if let Err(e) = self.connect(id).await {
                    error!("Connection failed: {}", e);
                    self.report_error(format!("Connection failed: {}", e));
                }
            }
            BluetoothCommand::Disconnect => self.disconnect().await,
            BluetoothCommand::Write(frame) => {
                if let Err(e) = self.write(&frame).await {
                    warn!("Write failed: {}", e);
                    let _ = self.event_sender.send(AppEvent::LogMessage(StatusMessage::new(
                        format!("Command not delivered: {}", e),
                        MessageSeverity::Warning,
                    )));
                }
            }
        }
    }

    /// Returns the first adapter, creating the manager on first use
    async fn adapter(&mut self) -> Result<Adapter> {
        if let Some(adapter) = &self.adapter {
            return Ok(adapter.clone());
        }

        let manager = Manager::new().await.map_err(BleError::from)?;
        let adapter = manager
            .adapters()
            .await
            .map_err(BleError::from)?
            .into_iter()
            .next()
            .ok_or(BleError::NoAdapter)?;
        info!(
            "Using adapter {}",
            adapter.adapter_info().await.unwrap_or_default()
        );

        self._manager = Some(manager);
        self.adapter = Some(adapter.clone());
        Ok(adapter)
    }

    /// Scan for robots, blocking command handling until the window closes
    pub async fn start_scan(&mut self) -> Result<()> {
        let (name_filter, duration) = {
            let settings = self
                .settings
                .lock()
                .map_err(|_| anyhow::anyhow!("Lock error"))?;
            let s = settings.get();
            (s.device_name_filter.clone(), s.scan_duration())
        };

        let adapter = self.adapter().await?;
        let _ = self
            .event_sender
            .send(AppEvent::ConnectionStatus(ConnectionStatus::Scanning));
        self.scanner.scan(&adapter, &name_filter, duration).await?;
        let _ = self
            .event_sender
            .send(AppEvent::ConnectionStatus(ConnectionStatus::Disconnected));
        Ok(())
    }

    pub async fn connect(&mut self, id: PeripheralId) -> Result<()> {
        self.teardown().await;

        let config = {
            let settings = self
                .settings
                .lock()
                .map_err(|_| anyhow::anyhow!("Lock error"))?;
            ConnectionConfig::from_settings(settings.get())?
        };

        let _ = self
            .event_sender
            .send(AppEvent::ConnectionStatus(ConnectionStatus::Connecting));

        let adapter = self.adapter().await?;
        let peripheral = adapter.peripheral(&id).await.map_err(BleError::from)?;

        let connection = BleConnection::new(self.event_sender.clone(), config.clone());
        let result = connection.connect(peripheral).await?;

        if let Err(e) = self.setup_event_handlers(&adapter, &result, &config).await {
            let _ = result.peripheral.disconnect().await;
            return Err(e);
        }

        self.peripheral = Some(result.peripheral);
        self.write_characteristic = Some(result.write_characteristic);
        self.link_state.store(true, Ordering::SeqCst);

        let _ = self
            .event_sender
            .send(AppEvent::ConnectionStatus(ConnectionStatus::Connected));

        Ok(())
    }

    /// Forward notifications and watch for the link going down
    async fn setup_event_handlers(
        &mut self,
        adapter: &Adapter,
        result: &ConnectionResult,
        config: &ConnectionConfig,
    ) -> Result<()> {
        if result.notify_characteristic.is_some() {
            let mut notifications = result
                .peripheral
                .notifications()
                .await
                .map_err(BleError::from)?;
            let sender = self.event_sender.clone();
            let notify_uuid = config.notify_char_uuid;
            self.background_tasks.push(tokio::spawn(async move {
                while let Some(notification) = notifications.next().await {
                    if notification.uuid != notify_uuid {
                        continue;
                    }
                    let text = protocol::decode_notification(&notification.value);
                    debug!("Received: {}", text);
                    let _ = sender.send(AppEvent::PeripheralMessage(text));
                }
            }));
        }

        let mut events = adapter.events().await.map_err(BleError::from)?;
        let sender = self.event_sender.clone();
        let link_state = self.link_state.clone();
        let peripheral_id = result.peripheral.id();
        self.background_tasks.push(tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let CentralEvent::DeviceDisconnected(id) = event {
                    if id == peripheral_id {
                        info!("Device disconnected");
                        link_state.store(false, Ordering::SeqCst);
                        let _ = sender.send(AppEvent::ConnectionStatus(
                            ConnectionStatus::Disconnected,
                        ));
                        break;
                    }
                }
            }
        }));

        Ok(())
    }

    /// Drop the link on request. Announces `Disconnected` only if the link
    /// was still up; a link the adapter already reported lost stays quiet.
    pub async fn disconnect(&mut self) {
        let was_up = self.link_state.swap(false, Ordering::SeqCst);
        self.teardown().await;

        if was_up {
            info!("Disconnected from device");
            let _ = self.event_sender.send(AppEvent::LogMessage(StatusMessage::new(
                "Disconnected from device",
                MessageSeverity::Info,
            )));
            let _ = self
                .event_sender
                .send(AppEvent::ConnectionStatus(ConnectionStatus::Disconnected));
        }
    }

    /// Release the peripheral and background tasks without emitting events
    async fn teardown(&mut self) {
        self.link_state.store(false, Ordering::SeqCst);
        for task in self.background_tasks.drain(..) {
            task.abort();
        }
        self.write_characteristic = None;

        if let Some(peripheral) = self.peripheral.take() {
            if let Err(e) = peripheral.disconnect().await {
                debug!("Disconnect of stale peripheral failed: {}", e);
            }
        }
    }

    /// Single write-with-response, no retry
    pub async fn write(&self, frame: &[u8]) -> Result<(), BleError> {
        let (peripheral, characteristic) = match (&self.peripheral, &self.write_characteristic) {
            (Some(p), Some(c)) => (p, c),
            _ => return Err(BleError::NotConnected),
        };

        peripheral
            .write(characteristic, frame, WriteType::WithResponse)
            .await?;
        debug!("Wrote {:?}", String::from_utf8_lossy(frame));
        Ok(())
    }

    /// Failed scan or connect: surface the message and drop to `Error`
    fn report_error(&self, message: String) {
        let _ = self.event_sender.send(AppEvent::LogMessage(StatusMessage::new(
            message,
            MessageSeverity::Error,
        )));
        let _ = self
            .event_sender
            .send(AppEvent::ConnectionStatus(ConnectionStatus::Error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> (BluetoothService, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let settings = SettingsService::with_path(
            std::env::temp_dir().join("sumo_robot_controller_service_test.json"),
        );
        let service = BluetoothService::new(
            tx,
            Arc::new(Mutex::new(settings)),
            Arc::new(AtomicBool::new(false)),
        );
        (service, rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<AppEvent>) -> Vec<AppEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_disconnect_announces_live_link() {
        let (mut service, mut rx) = service();
        service.link_state.store(true, Ordering::SeqCst);

        service.disconnect().await;

        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], AppEvent::LogMessage(_)));
        assert!(matches!(
            events[1],
            AppEvent::ConnectionStatus(ConnectionStatus::Disconnected)
        ));
        assert!(!service.link_state.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_disconnect_after_link_loss_is_silent() {
        let (mut service, mut rx) = service();
        // The adapter watcher already cleared the flag and reported the loss
        service.link_state.store(false, Ordering::SeqCst);

        service.disconnect().await;

        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_teardown_before_connect_emits_nothing() {
        let (mut service, mut rx) = service();
        service.link_state.store(true, Ordering::SeqCst);

        service.teardown().await;

        assert!(drain(&mut rx).is_empty());
        assert!(!service.link_state.load(Ordering::SeqCst));
        assert!(service.background_tasks.is_empty());
    }

    #[tokio::test]
    async fn test_failure_reports_error_status() {
        let (service, mut rx) = service();

        service.report_error("Connection failed: timeout".to_string());

        let events = drain(&mut rx);
        assert!(matches!(
            &events[0],
            AppEvent::LogMessage(msg) if msg.severity == MessageSeverity::Error
        ));
        assert!(matches!(
            events[1],
            AppEvent::ConnectionStatus(ConnectionStatus::Error)
        ));
    }

    #[tokio::test]
    async fn test_write_without_link_is_rejected() {
        let (service, _rx) = service();
        assert!(matches!(
            service.write(b"0:0:0\n").await,
            Err(BleError::NotConnected)
        ));
    }
}
