//! Runtime configuration.
//!
//! Every key has a default, so an empty (or missing) file yields a working
//! configuration for the reference installation. Durations are expressed in
//! milliseconds (`*_ms`) or seconds (`*_secs`) in the file and exposed as
//! [`Duration`] through accessor methods.
//!
//! ```toml
//! log_level = "debug"
//!
//! [actuator]
//! driver = "simulated"
//!
//! [session]
//! open_window_ms = 8000
//!
//! [camera]
//! url = "http://10.0.0.12:8080/shot.jpg"
//! ```

use crate::constants::*;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatchkeyConfig {
    /// Default `tracing` filter when `RUST_LOG` is not set.
    pub log_level: String,
    pub paths: PathsConfig,
    pub actuator: ActuatorConfig,
    pub display: DisplayConfig,
    pub session: SessionConfig,
    pub camera: CameraConfig,
    pub viewer: ViewerConfig,
}

impl Default for LatchkeyConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            paths: PathsConfig::default(),
            actuator: ActuatorConfig::default(),
            display: DisplayConfig::default(),
            session: SessionConfig::default(),
            camera: CameraConfig::default(),
            viewer: ViewerConfig::default(),
        }
    }
}

impl LatchkeyConfig {
    /// Load configuration.
    ///
    /// With an explicit path the file must exist. Without one,
    /// `latchkey.toml` in the working directory is used when present and
    /// defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// fails [`validate`](Self::validate).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::from_file(fallback)?
                } else {
                    Self::default()
                }
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration file without validating it.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&contents).map_err(|e| match e {
            Error::ConfigParse { message, .. } => Error::ConfigParse {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::ConfigParse {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })
    }

    /// Check values that would make the controller misbehave at runtime.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for a zero rotation cadence, a display with
    /// no columns or rows, an empty camera URL, or an empty viewer program.
    pub fn validate(&self) -> Result<()> {
        if self.session.rotation_cadence_ms == 0 {
            return Err(Error::Config(
                "session.rotation_cadence_ms must be greater than zero".to_string(),
            ));
        }
        if self.display.columns == 0 || self.display.rows == 0 {
            return Err(Error::Config(
                "display.columns and display.rows must be greater than zero".to_string(),
            ));
        }
        if self.camera.url.trim().is_empty() {
            return Err(Error::Config("camera.url must not be empty".to_string()));
        }
        if self.viewer.program.trim().is_empty() {
            return Err(Error::Config("viewer.program must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Filesystem layout. Relative paths resolve against `base_dir`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub base_dir: PathBuf,
    pub database: PathBuf,
    pub photos_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            database: PathBuf::from(DEFAULT_DATABASE_FILE),
            photos_dir: PathBuf::from(DEFAULT_PHOTOS_DIR),
        }
    }
}

impl PathsConfig {
    /// Absolute (or base-relative) location of the SQLite file.
    pub fn database_path(&self) -> PathBuf {
        self.base_dir.join(&self.database)
    }

    /// Directory photos are written to.
    pub fn photos_path(&self) -> PathBuf {
        self.base_dir.join(&self.photos_dir)
    }

    /// Resolve a stored `photo_path` against the base directory.
    pub fn resolve(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.base_dir.join(relative)
    }
}

/// Which actuator implementation to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActuatorDriver {
    /// Hobby servo on a sysfs PWM channel.
    Servo,
    /// No hardware; moves are logged.
    Simulated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActuatorConfig {
    pub driver: ActuatorDriver,
    pub pwm_chip: u32,
    pub pwm_channel: u32,
    pub period_ns: u64,
    pub closed_duty_ns: u64,
    pub open_duty_ns: u64,
    pub settle_ms: u64,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            driver: ActuatorDriver::Servo,
            pwm_chip: DEFAULT_PWM_CHIP,
            pwm_channel: DEFAULT_PWM_CHANNEL,
            period_ns: DEFAULT_PWM_PERIOD_NS,
            closed_duty_ns: DEFAULT_CLOSED_DUTY_NS,
            open_duty_ns: DEFAULT_OPEN_DUTY_NS,
            settle_ms: DEFAULT_SETTLE_MS,
        }
    }
}

impl ActuatorConfig {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// Which display implementation to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayDriver {
    /// HD44780 character LCD behind a PCF8574 I2C backpack.
    Lcd,
    /// Frames are echoed to the operator console.
    Console,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub driver: DisplayDriver,
    pub i2c_bus: PathBuf,
    pub i2c_address: u16,
    pub columns: usize,
    pub rows: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            driver: DisplayDriver::Lcd,
            i2c_bus: PathBuf::from(DEFAULT_I2C_BUS),
            i2c_address: DEFAULT_I2C_ADDRESS,
            columns: DEFAULT_DISPLAY_COLUMNS,
            rows: DEFAULT_DISPLAY_ROWS,
        }
    }
}

/// Access and enrollment session timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub open_window_ms: u64,
    pub rotation_cadence_ms: u64,
    pub denial_hold_ms: u64,
    pub notice_hold_ms: u64,
    pub closed_hold_ms: u64,
    pub viewer_terminate_timeout_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            open_window_ms: DEFAULT_OPEN_WINDOW_MS,
            rotation_cadence_ms: DEFAULT_ROTATION_CADENCE_MS,
            denial_hold_ms: DEFAULT_DENIAL_HOLD_MS,
            notice_hold_ms: DEFAULT_NOTICE_HOLD_MS,
            closed_hold_ms: DEFAULT_CLOSED_HOLD_MS,
            viewer_terminate_timeout_ms: DEFAULT_VIEWER_TERMINATE_TIMEOUT_MS,
        }
    }
}

impl SessionConfig {
    pub fn open_window(&self) -> Duration {
        Duration::from_millis(self.open_window_ms)
    }

    pub fn rotation_cadence(&self) -> Duration {
        Duration::from_millis(self.rotation_cadence_ms)
    }

    pub fn denial_hold(&self) -> Duration {
        Duration::from_millis(self.denial_hold_ms)
    }

    pub fn notice_hold(&self) -> Duration {
        Duration::from_millis(self.notice_hold_ms)
    }

    pub fn closed_hold(&self) -> Duration {
        Duration::from_millis(self.closed_hold_ms)
    }

    pub fn viewer_terminate_timeout(&self) -> Duration {
        Duration::from_millis(self.viewer_terminate_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_CAMERA_URL.to_string(),
            timeout_secs: DEFAULT_CAMERA_TIMEOUT_SECS,
        }
    }
}

impl CameraConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_VIEWER_PROGRAM.to_string(),
            args: DEFAULT_VIEWER_ARGS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = LatchkeyConfig::default();
        config.validate().unwrap();

        assert_eq!(config.display.columns, 16);
        assert_eq!(config.session.open_window(), Duration::from_secs(5));
        assert_eq!(config.session.rotation_cadence(), Duration::from_millis(1500));
        assert_eq!(config.camera.timeout(), Duration::from_secs(15));
        assert_eq!(config.actuator.driver, ActuatorDriver::Servo);
        assert_eq!(config.viewer.args, vec!["-F", "-Z", "--hide-pointer"]);
    }

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config = LatchkeyConfig::from_toml("").unwrap();
        assert_eq!(config, LatchkeyConfig::default());
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = LatchkeyConfig::from_toml(
            r#"
            log_level = "debug"

            [actuator]
            driver = "simulated"

            [display]
            driver = "console"
            columns = 20

            [session]
            open_window_ms = 8000

            [paths]
            base_dir = "/srv/latchkey"
            "#,
        )
        .unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.actuator.driver, ActuatorDriver::Simulated);
        assert_eq!(config.display.driver, DisplayDriver::Console);
        assert_eq!(config.display.columns, 20);
        assert_eq!(config.display.rows, 2);
        assert_eq!(config.session.open_window_ms, 8000);
        assert_eq!(config.session.rotation_cadence_ms, DEFAULT_ROTATION_CADENCE_MS);
        assert_eq!(
            config.paths.database_path(),
            PathBuf::from("/srv/latchkey/latchkey.db")
        );
        assert_eq!(
            config.paths.photos_path(),
            PathBuf::from("/srv/latchkey/photos")
        );
    }

    #[test]
    fn test_example_file_matches_defaults() {
        let example = include_str!("../../../config/latchkey.example.toml");
        let config = LatchkeyConfig::from_toml(example).unwrap();
        assert_eq!(config, LatchkeyConfig::default());
    }

    #[test]
    fn test_unknown_driver_is_parse_error() {
        let result = LatchkeyConfig::from_toml("[actuator]\ndriver = \"stepper\"\n");
        assert!(matches!(result, Err(Error::ConfigParse { .. })));
    }

    #[test]
    fn test_validate_rejects_zero_cadence() {
        let mut config = LatchkeyConfig::default();
        config.session.rotation_cadence_ms = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_empty_camera_url() {
        let mut config = LatchkeyConfig::default();
        config.camera.url = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[camera]\nurl = \"http://camera.local/shot.jpg\"").unwrap();

        let config = LatchkeyConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.camera.url, "http://camera.local/shot.jpg");
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let result = LatchkeyConfig::load(Some(Path::new("/nonexistent/latchkey.toml")));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_parse_error_names_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[session\nopen_window_ms = 1").unwrap();

        let result = LatchkeyConfig::from_file(file.path());
        match result {
            Err(Error::ConfigParse { path, .. }) => {
                assert_eq!(path, file.path().display().to_string())
            }
            other => panic!("Expected ConfigParse, got {:?}", other),
        }
    }
}
