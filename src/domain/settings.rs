use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_level")]
    pub level: String, // "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_true")]
    pub file_logging_enabled: bool,
    #[serde(default = "default_true")]
    pub console_logging_enabled: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_prefix")]
    pub file_name_prefix: String,
    #[serde(default = "default_true")]
    pub show_file_line: bool,
    #[serde(default = "default_false")]
    pub show_thread_ids: bool,
    #[serde(default = "default_true")]
    pub show_target: bool,
    #[serde(default = "default_true")]
    pub ansi_colors: bool,
    #[serde(default = "default_rotation")]
    pub rotation: String, // "daily", "hourly", "minutely", "never"
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            file_logging_enabled: default_true(),
            console_logging_enabled: default_true(),
            log_dir: default_log_dir(),
            file_name_prefix: default_prefix(),
            show_file_line: default_true(),
            show_thread_ids: default_false(),
            show_target: default_true(),
            ansi_colors: default_true(),
            rotation: default_rotation(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_log_dir() -> String {
    "logs".to_string()
}
fn default_prefix() -> String {
    "sumo_robot_controller".to_string()
}
fn default_rotation() -> String {
    "daily".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // Logging Settings
    #[serde(default)]
    pub log_settings: LogSettings,

    // Drive Settings
    #[serde(default = "default_throttle_interval_ms")]
    pub throttle_interval_ms: u64,
    #[serde(default = "default_release_settle_ms")]
    pub release_settle_ms: u64,
    #[serde(default = "default_joystick_sample_interval_ms")]
    pub joystick_sample_interval_ms: u64,

    // Scan Settings
    #[serde(default = "default_scan_duration_secs")]
    pub scan_duration_secs: u64,
    #[serde(default = "default_device_name_filter")]
    pub device_name_filter: String,

    // Advanced BLE Settings
    #[serde(default = "default_service_uuid")]
    pub ble_service_uuid: String,
    #[serde(default = "default_write_uuid")]
    pub ble_write_char_uuid: String,
    #[serde(default = "default_notify_uuid")]
    pub ble_notify_char_uuid: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_settings: LogSettings::default(),

            throttle_interval_ms: default_throttle_interval_ms(),
            release_settle_ms: default_release_settle_ms(),
            joystick_sample_interval_ms: default_joystick_sample_interval_ms(),

            scan_duration_secs: default_scan_duration_secs(),
            device_name_filter: default_device_name_filter(),

            ble_service_uuid: default_service_uuid(),
            ble_write_char_uuid: default_write_uuid(),
            ble_notify_char_uuid: default_notify_uuid(),
        }
    }
}

impl Settings {
    pub fn throttle_interval(&self) -> Duration {
        Duration::from_millis(self.throttle_interval_ms)
    }

    pub fn release_settle(&self) -> Duration {
        Duration::from_millis(self.release_settle_ms)
    }

    pub fn joystick_sample_interval(&self) -> Duration {
        Duration::from_millis(self.joystick_sample_interval_ms)
    }

    pub fn scan_duration(&self) -> Duration {
        Duration::from_secs(self.scan_duration_secs)
    }
}

fn default_throttle_interval_ms() -> u64 {
    100
}
fn default_release_settle_ms() -> u64 {
    50
}
fn default_joystick_sample_interval_ms() -> u64 {
    100
}
fn default_scan_duration_secs() -> u64 {
    5
}
fn default_device_name_filter() -> String {
    "micro".to_string()
}
fn default_service_uuid() -> String {
    "6e400001-b5a3-f393-e0a9-e50e24dcca9e".to_string()
}
fn default_write_uuid() -> String {
    "6e400003-b5a3-f393-e0a9-e50e24dcca9e".to_string()
}
fn default_notify_uuid() -> String {
    "6e400002-b5a3-f393-e0a9-e50e24dcca9e".to_string()
}

pub struct SettingsService {
    settings: Settings,
    settings_path: PathBuf,
}

impl SettingsService {
    pub fn new() -> anyhow::Result<Self> {
        let settings_path = Self::get_settings_path()?;
        Ok(Self::with_path(settings_path))
    }

    /// Load from `settings_path`, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn with_path(settings_path: PathBuf) -> Self {
        let settings = Self::load_from_file(&settings_path).unwrap_or_default();
        Self {
            settings,
            settings_path,
        }
    }

    fn get_settings_path() -> anyhow::Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        path.push("SumoRobotController");
        fs::create_dir_all(&path)?;
        path.push("settings.json");
        Ok(path)
    }

    fn load_from_file(path: &Path) -> anyhow::Result<Settings> {
        let contents = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&contents)?;
        Ok(settings)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(&self.settings)?;
        fs::write(&self.settings_path, json)?;
        Ok(())
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    pub fn path(&self) -> &Path {
        &self.settings_path
    }
}
