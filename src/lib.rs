//! Desktop remote for a micro:bit sumo robot.
//!
//! `domain` holds the drive logic (motor mapping, throttling, frame codec),
//! `infrastructure` the BLE worker and logging, `presentation` the egui app.

pub mod domain;
pub mod infrastructure;
pub mod presentation;
