//! Domain Module
//!
//! Input-to-command pipeline and application state, independent of the BLE
//! stack and the GUI.
//!
//! ```text
//! JoystickSample ──► motor ──► MotorPair ──► throttle ──► CommandFrame ──► Connection
//!                                               ▲
//!                               ButtonEvent ────┘ (never throttled)
//! ```

pub mod connection;
pub mod drive;
pub mod frame;
pub mod models;
pub mod motor;
pub mod settings;
pub mod throttle;
