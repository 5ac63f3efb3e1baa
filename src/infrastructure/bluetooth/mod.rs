//! Bluetooth Module
//!
//! Provides BLE communication with the robot.
//!
//! ## Architecture
//!
//! ```text
//!   UI thread                         "bluetooth" thread (tokio)
//! ┌──────────┐  BluetoothCommand   ┌─────────────────────────────┐
//! │ BleLink  │ ──────────────────► │      BluetoothService       │
//! │          │                     │                             │
//! │          │ ◄── connected flag  │  Scanner  Connection  Proto │
//! └──────────┘                     └──────────────┬──────────────┘
//!        ▲                AppEvent                │
//!        └────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`protocol`] - UART service UUIDs and notification decoding
//! - [`scanner`] - Time-boxed device discovery with name filtering
//! - [`connection`] - Connect, service discovery and characteristic lookup
//! - [`service`] - Worker that owns the adapter and the connected peripheral
//! - [`link`] - [`Connection`](crate::domain::connection::Connection) handle for the UI

pub mod connection;
pub mod error;
pub mod link;
pub mod protocol;
pub mod scanner;
pub mod service;

pub use link::BleLink;
pub use service::BluetoothService;
