use btleplug::platform::PeripheralId;

/// One reading from the virtual joystick, in stick convention
/// (0° points right, 90° points up, counter-clockwise).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JoystickSample {
    /// Degrees in `[0, 360)`
    pub angle: u16,
    /// Deflection in `[0, 100]`
    pub strength: u8,
}

impl JoystickSample {
    pub fn new(angle: u16, strength: u8) -> Self {
        Self {
            angle: angle % 360,
            strength: strength.min(100),
        }
    }

    /// Sample reported by a stick resting in the center
    pub fn centered() -> Self {
        Self::default()
    }
}

/// Differential-drive motor values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MotorPair {
    pub left: i32,
    pub right: i32,
}

impl MotorPair {
    pub const STOP: MotorPair = MotorPair { left: 0, right: 0 };

    pub fn new(left: i32, right: i32) -> Self {
        Self { left, right }
    }

    pub fn is_stopped(&self) -> bool {
        *self == Self::STOP
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonId {
    A,
    B,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    Press,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEvent {
    pub button: ButtonId,
    pub action: ButtonAction,
}

impl ButtonEvent {
    pub fn press(button: ButtonId) -> Self {
        Self {
            button,
            action: ButtonAction::Press,
        }
    }

    pub fn release(button: ButtonId) -> Self {
        Self {
            button,
            action: ButtonAction::Release,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScannedDevice {
    pub id: PeripheralId,
    pub name: String,
    pub address: String,
    pub signal_strength: i16,
}

impl ScannedDevice {
    /// Label shown in the device list, e.g. `"BBC micro:bit (AA:BB:..)"`
    pub fn display_name(&self) -> String {
        display_name(Some(&self.name), &self.address)
    }
}

pub const UNKNOWN_DEVICE_NAME: &str = "Unknown device";

pub fn display_name(name: Option<&str>, address: &str) -> String {
    let name = match name {
        Some(n) if !n.is_empty() => n,
        _ => UNKNOWN_DEVICE_NAME,
    };
    format!("{} ({})", name, address)
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    DeviceFound(ScannedDevice),
    ScanFinished,
    ConnectionStatus(ConnectionStatus),
    LogMessage(StatusMessage),
    /// Text received on the peripheral's notify characteristic
    PeripheralMessage(String),
}

#[derive(Debug, Clone)]
pub enum BluetoothCommand {
    StartScan,
    Connect(PeripheralId),
    Disconnect,
    Write(Vec<u8>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Scanning,
    Connecting,
    Connected,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub message: String,
    pub severity: MessageSeverity,
}

impl StatusMessage {
    pub fn new(message: impl Into<String>, severity: MessageSeverity) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSeverity {
    Info,
    Success,
    Warning,
    Error,
}
