use crate::domain::models::{
    AppEvent, BluetoothCommand, ConnectionStatus, MessageSeverity, ScannedDevice, StatusMessage,
};
use crate::domain::settings::SettingsService;
use crate::infrastructure::bluetooth::{BleLink, BluetoothService};
use crate::infrastructure::logging::LoggingGuard;
use crate::presentation::components::Components;
use crate::presentation::screens::control::{ControlAction, ControlScreen};
use crate::presentation::screens::device_select::{DeviceSelectAction, DeviceSelectScreen};
use eframe::egui;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info};

const ACTIVE_REPAINT: Duration = Duration::from_millis(16);
const IDLE_REPAINT: Duration = Duration::from_millis(100);

enum Screen {
    DeviceSelect(DeviceSelectScreen),
    Control(Box<ControlScreen>),
}

pub struct RobotControllerApp {
    // Services
    settings: Arc<Mutex<SettingsService>>,
    link: BleLink,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,

    // State
    connection_status: ConnectionStatus,
    status_message: Option<StatusMessage>,
    /// Device a connection was last requested for
    selected_device: Option<ScannedDevice>,
    screen: Screen,

    _logging_guard: Option<LoggingGuard>,
}

impl RobotControllerApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        settings: SettingsService,
        logging_guard: Option<LoggingGuard>,
    ) -> anyhow::Result<Self> {
        let settings = Arc::new(Mutex::new(settings));
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let link = BluetoothService::spawn(events_tx, settings.clone())?;

        Ok(Self {
            settings,
            link,
            events_rx,
            connection_status: ConnectionStatus::Disconnected,
            status_message: None,
            selected_device: None,
            screen: Screen::DeviceSelect(DeviceSelectScreen::new()),
            _logging_guard: logging_guard,
        })
    }

    fn request(&mut self, command: BluetoothCommand) {
        if let Err(e) = self.link.request(command) {
            error!("Bluetooth request failed: {}", e);
            self.status_message = Some(StatusMessage::new(e.to_string(), MessageSeverity::Error));
        }
    }

    fn process_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                AppEvent::DeviceFound(device) => {
                    if let Screen::DeviceSelect(screen) = &mut self.screen {
                        screen.add_device(device);
                    }
                }
                AppEvent::ScanFinished => {
                    if let Screen::DeviceSelect(screen) = &mut self.screen {
                        screen.scan_finished();
                    }
                }
                AppEvent::ConnectionStatus(status) => self.on_status(status),
                AppEvent::LogMessage(msg) => self.status_message = Some(msg),
                AppEvent::PeripheralMessage(text) => {
                    info!("Robot says: {}", text);
                    if let Screen::Control(screen) = &mut self.screen {
                        screen.push_peripheral_message(text);
                    }
                }
            }
        }
    }

    fn on_status(&mut self, status: ConnectionStatus) {
        self.connection_status = status;
        let on_control = matches!(self.screen, Screen::Control(_));
        match status {
            ConnectionStatus::Connected if !on_control => self.open_control_screen(),
            ConnectionStatus::Disconnected | ConnectionStatus::Error if on_control => {
                self.screen = Screen::DeviceSelect(DeviceSelectScreen::new());
            }
            ConnectionStatus::Disconnected | ConnectionStatus::Error => {
                if let Screen::DeviceSelect(screen) = &mut self.screen {
                    screen.set_connecting(None);
                }
            }
            _ => {}
        }
    }

    fn open_control_screen(&mut self) {
        let name = self
            .selected_device
            .as_ref()
            .map(ScannedDevice::display_name)
            .unwrap_or_default();
        let control = match self.settings.lock() {
            Ok(settings) => ControlScreen::new(self.link.clone(), name.clone(), settings.get()),
            Err(e) => {
                error!("Settings lock poisoned: {}", e);
                return;
            }
        };
        self.status_message = Some(StatusMessage::new(
            format!("Connected to {}", name),
            MessageSeverity::Success,
        ));
        self.screen = Screen::Control(Box::new(control));
    }

    fn needs_fast_repaint(&self) -> bool {
        match &self.screen {
            Screen::Control(screen) => screen.needs_repaint(),
            Screen::DeviceSelect(_) => matches!(
                self.connection_status,
                ConnectionStatus::Scanning | ConnectionStatus::Connecting
            ),
        }
    }
}

impl eframe::App for RobotControllerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_events();

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.add_space(4.0);
            Components::status_banner(ui, self.connection_status);
            if let Some(msg) = &self.status_message {
                Components::status_message(ui, msg);
            }
            ui.add_space(4.0);
        });

        let mut command = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.set_max_width(800.0);
                ui.add_space(20.0);

                match &mut self.screen {
                    Screen::DeviceSelect(screen) => match screen.show(ui) {
                        DeviceSelectAction::None => {}
                        DeviceSelectAction::Scan => {
                            screen.start_scan();
                            command = Some(BluetoothCommand::StartScan);
                        }
                        DeviceSelectAction::Connect(device) => {
                            screen.set_connecting(Some(&device));
                            command = Some(BluetoothCommand::Connect(device.id.clone()));
                            self.selected_device = Some(device);
                        }
                    },
                    Screen::Control(screen) => match screen.show(ui) {
                        ControlAction::None => {}
                        ControlAction::Disconnect => command = Some(BluetoothCommand::Disconnect),
                    },
                }
            });
        });
        if let Some(command) = command {
            self.request(command);
        }

        // Stick sampling and settle timers run off the frame clock
        if self.needs_fast_repaint() {
            ctx.request_repaint_after(ACTIVE_REPAINT);
        } else {
            ctx.request_repaint_after(IDLE_REPAINT);
        }
    }
}
