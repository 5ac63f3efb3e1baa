use crate::domain::models::ScannedDevice;
use crate::presentation::components::Components;
use eframe::egui;

pub enum DeviceSelectAction {
    None,
    Scan,
    Connect(ScannedDevice),
}

/// First screen: scan for robots and pick one
#[derive(Default)]
pub struct DeviceSelectScreen {
    devices: Vec<ScannedDevice>,
    scanning: bool,
    connecting_to: Option<String>,
}

impl DeviceSelectScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_scan(&mut self) {
        self.devices.clear();
        self.scanning = true;
    }

    pub fn scan_finished(&mut self) {
        self.scanning = false;
    }

    pub fn add_device(&mut self, device: ScannedDevice) {
        if let Some(existing) = self.devices.iter_mut().find(|d| d.id == device.id) {
            existing.signal_strength = device.signal_strength;
        } else {
            self.devices.push(device);
        }
    }

    pub fn set_connecting(&mut self, device: Option<&ScannedDevice>) {
        self.connecting_to = device.map(ScannedDevice::display_name);
    }

    pub fn show(&mut self, ui: &mut egui::Ui) -> DeviceSelectAction {
        let mut action = DeviceSelectAction::None;

        Components::heading(ui, "Find your robot");
        ui.add_space(10.0);

        ui.horizontal(|ui| {
            let busy = self.scanning || self.connecting_to.is_some();
            if ui
                .add_enabled(!busy, egui::Button::new("Scan"))
                .clicked()
            {
                action = DeviceSelectAction::Scan;
            }
            if self.scanning {
                ui.spinner();
                ui.label("Scanning...");
            }
            if let Some(name) = &self.connecting_to {
                ui.spinner();
                ui.label(format!("Connecting to {}", name));
            }
        });

        ui.add_space(10.0);

        Components::card(ui, "Nearby devices", |ui| {
            if self.devices.is_empty() {
                ui.label(if self.scanning {
                    "Looking for devices..."
                } else {
                    "No devices found. Press Scan."
                });
                return;
            }

            egui::ScrollArea::vertical()
                .id_salt("scan_results")
                .max_height(300.0)
                .show(ui, |ui| {
                    for device in &self.devices {
                        let label = format!(
                            "{}  ({} dBm)",
                            device.display_name(),
                            device.signal_strength
                        );
                        let enabled = self.connecting_to.is_none();
                        if ui
                            .add_enabled(enabled, egui::Button::new(label))
                            .clicked()
                        {
                            action = DeviceSelectAction::Connect(device.clone());
                        }
                    }
                });
        });

        action
    }
}
