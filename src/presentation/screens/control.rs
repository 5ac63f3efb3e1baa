use crate::domain::drive::{DriveController, DriveError};
use crate::domain::models::{ButtonEvent, ButtonId};
use crate::domain::settings::Settings;
use crate::infrastructure::bluetooth::BleLink;
use crate::presentation::components::Components;
use crate::presentation::input::{InputPacer, PacedInput};
use crate::presentation::joystick::Joystick;
use eframe::egui;
use std::collections::VecDeque;
use std::time::Instant;

const MAX_PERIPHERAL_MESSAGES: usize = 20;
const STICK_SIZE: f32 = 260.0;
const BUTTON_SIZE: f32 = 110.0;

pub enum ControlAction {
    None,
    Disconnect,
}

/// Tracks pointer-down/up edges of a held button
struct HoldButton {
    id: ButtonId,
    label: &'static str,
    was_down: bool,
}

impl HoldButton {
    fn new(id: ButtonId, label: &'static str) -> Self {
        Self {
            id,
            label,
            was_down: false,
        }
    }

    fn show(&mut self, ui: &mut egui::Ui) -> Option<ButtonEvent> {
        let text = egui::RichText::new(self.label).size(40.0).strong();
        let response = ui.add_sized(
            [BUTTON_SIZE, BUTTON_SIZE],
            egui::Button::new(text).sense(egui::Sense::click_and_drag()),
        );
        let down = response.is_pointer_button_down_on();

        let event = match (self.was_down, down) {
            (false, true) => Some(ButtonEvent::press(self.id)),
            (true, false) => Some(ButtonEvent::release(self.id)),
            _ => None,
        };
        self.was_down = down;
        event
    }
}

/// Second screen: drive the connected robot
pub struct ControlScreen {
    device_name: String,
    drive: DriveController<BleLink>,
    joystick: Joystick,
    pacer: InputPacer,
    buttons: [HoldButton; 2],
    peripheral_messages: VecDeque<String>,
    last_error: Option<DriveError>,
}

impl ControlScreen {
    pub fn new(link: BleLink, device_name: String, settings: &Settings) -> Self {
        Self {
            device_name,
            drive: DriveController::new(link, settings.throttle_interval()),
            joystick: Joystick::default(),
            pacer: InputPacer::new(
                settings.joystick_sample_interval(),
                settings.release_settle(),
            ),
            buttons: [
                HoldButton::new(ButtonId::A, "A"),
                HoldButton::new(ButtonId::B, "B"),
            ],
            peripheral_messages: VecDeque::new(),
            last_error: None,
        }
    }

    pub fn push_peripheral_message(&mut self, text: String) {
        self.peripheral_messages.push_back(text);
        while self.peripheral_messages.len() > MAX_PERIPHERAL_MESSAGES {
            self.peripheral_messages.pop_front();
        }
    }

    /// True while input is in flight and the UI should keep repainting
    pub fn needs_repaint(&self) -> bool {
        self.joystick.is_held()
            || self.pacer.is_settling()
            || self.buttons.iter().any(|b| b.was_down)
    }

    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlAction {
        let mut action = ControlAction::None;

        ui.horizontal(|ui| {
            Components::heading(ui, &self.device_name);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Disconnect").clicked() {
                    action = ControlAction::Disconnect;
                }
            });
        });
        ui.add_space(10.0);

        let mut button_events = Vec::new();
        ui.horizontal(|ui| {
            let stick = self.joystick.show(ui, STICK_SIZE);
            let now = Instant::now();
            for input in self.pacer.update(stick, now) {
                self.apply(input, now);
            }

            ui.add_space(40.0);
            ui.vertical(|ui| {
                ui.add_space(40.0);
                ui.horizontal(|ui| {
                    for button in self.buttons.iter_mut() {
                        if let Some(event) = button.show(ui) {
                            button_events.push(event);
                        }
                    }
                });
            });
        });
        for event in button_events {
            let result = self.drive.on_button(event).map(|_| ());
            self.record(result);
        }

        ui.add_space(10.0);
        self.show_telemetry(ui);

        action
    }

    fn apply(&mut self, input: PacedInput, now: Instant) {
        let result = match input {
            PacedInput::Sample(sample) => self.drive.on_joystick(sample, now).map(|_| ()),
            PacedInput::Released => self.drive.on_released().map(|_| ()),
        };
        self.record(result);
    }

    fn record(&mut self, result: Result<(), DriveError>) {
        match result {
            Ok(()) => self.last_error = None,
            Err(e) => self.last_error = Some(e),
        }
    }

    fn show_telemetry(&self, ui: &mut egui::Ui) {
        Components::card(ui, "Robot link", |ui| {
            egui::Grid::new("link_grid")
                .spacing([30.0, 6.0])
                .show(ui, |ui| {
                    ui.label("Stick:");
                    let sample = self.joystick.sample();
                    ui.label(format!("{}° / {}%", sample.angle, sample.strength));
                    ui.end_row();

                    ui.label("Motors:");
                    let pair = self.drive.last_pair();
                    ui.label(format!("L {}  R {}", pair.left, pair.right));
                    ui.end_row();

                    ui.label("Last frame:");
                    ui.monospace(
                        self.drive
                            .last_sent()
                            .map(|frame| frame.to_string())
                            .unwrap_or_default()
                            .trim_end(),
                    );
                    ui.end_row();
                });

            if let Some(error) = &self.last_error {
                ui.colored_label(egui::Color32::from_rgb(200, 150, 0), error.to_string());
            }
        });

        if !self.peripheral_messages.is_empty() {
            ui.add_space(10.0);
            Components::card(ui, "From robot", |ui| {
                for message in &self.peripheral_messages {
                    ui.monospace(message);
                }
            });
        }
    }
}
