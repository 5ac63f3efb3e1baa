use crate::domain::models::JoystickSample;
use crate::presentation::input::StickState;
use eframe::egui;

const KNOB_RADIUS: f32 = 28.0;

/// On-screen analog stick that springs back to the center when let go.
#[derive(Debug, Default)]
pub struct Joystick {
    /// Knob position relative to the center, unit circle, screen axes
    offset: egui::Vec2,
    held: bool,
}

impl Joystick {
    pub fn sample(&self) -> JoystickSample {
        sample_from_offset(self.offset)
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    pub fn show(&mut self, ui: &mut egui::Ui, size: f32) -> StickState {
        let (rect, response) =
            ui.allocate_exact_size(egui::vec2(size, size), egui::Sense::click_and_drag());
        let center = rect.center();
        let travel = (size / 2.0 - KNOB_RADIUS).max(1.0);

        let pressed = response.is_pointer_button_down_on();
        if pressed {
            if let Some(pos) = response.interact_pointer_pos() {
                let offset = (pos - center) / travel;
                self.offset = if offset.length() > 1.0 {
                    offset.normalized()
                } else {
                    offset
                };
            }
        }

        let just_released = self.held && !pressed;
        if just_released {
            self.offset = egui::Vec2::ZERO;
        }
        self.held = pressed;

        let visuals = ui.style().visuals.clone();
        let painter = ui.painter_at(rect);
        painter.circle_filled(center, size / 2.0, visuals.extreme_bg_color);
        painter.circle_stroke(
            center,
            size / 2.0 - 1.0,
            visuals.widgets.noninteractive.bg_stroke,
        );
        painter.line_segment(
            [center - egui::vec2(travel, 0.0), center + egui::vec2(travel, 0.0)],
            visuals.widgets.noninteractive.fg_stroke,
        );
        painter.line_segment(
            [center - egui::vec2(0.0, travel), center + egui::vec2(0.0, travel)],
            visuals.widgets.noninteractive.fg_stroke,
        );
        let knob_color = if pressed {
            visuals.selection.bg_fill
        } else {
            visuals.widgets.inactive.bg_fill
        };
        let knob = center + self.offset * travel;
        painter.circle_filled(knob, KNOB_RADIUS, knob_color);
        painter.circle_stroke(knob, KNOB_RADIUS, visuals.widgets.inactive.fg_stroke);

        StickState {
            sample: self.sample(),
            held: pressed,
            just_released,
        }
    }
}

/// Convert a knob offset (screen axes, y down) into stick convention:
/// 0° right, 90° up, counter-clockwise, strength 0..=100.
pub fn sample_from_offset(offset: egui::Vec2) -> JoystickSample {
    let length = offset.length().min(1.0);
    let strength = (length * 100.0).round() as u8;
    if strength == 0 {
        return JoystickSample::centered();
    }

    let degrees = (-offset.y).atan2(offset.x).to_degrees();
    let angle = (degrees.round() as i32).rem_euclid(360) as u16;
    JoystickSample::new(angle, strength)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_to_sample() {
        assert_eq!(
            sample_from_offset(egui::vec2(0.0, -1.0)),
            JoystickSample::new(90, 100)
        );
        assert_eq!(
            sample_from_offset(egui::vec2(1.0, 0.0)),
            JoystickSample::new(0, 100)
        );
        assert_eq!(
            sample_from_offset(egui::vec2(-0.5, 0.0)),
            JoystickSample::new(180, 50)
        );
        assert_eq!(
            sample_from_offset(egui::vec2(0.0, 0.25)),
            JoystickSample::new(270, 25)
        );
    }

    #[test]
    fn test_center_is_zero_strength() {
        assert_eq!(sample_from_offset(egui::Vec2::ZERO), JoystickSample::centered());
        assert_eq!(sample_from_offset(egui::vec2(0.001, 0.001)).strength, 0);
    }

    #[test]
    fn test_overshoot_is_capped() {
        assert_eq!(sample_from_offset(egui::vec2(3.0, 0.0)).strength, 100);
    }
}
