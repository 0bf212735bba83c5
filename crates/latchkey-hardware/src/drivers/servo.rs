//! Hobby servo on a Linux sysfs PWM channel.
//!
//! The kernel exposes each PWM chip as `/sys/class/pwm/pwmchipN`. Writing a
//! channel number to `export` creates `pwmM/` with `period`, `duty_cycle` and
//! `enable` attributes (all in nanoseconds, except `enable`).
//!
//! Every move drives the target pulse width for the settle time and then
//! drops the duty cycle to zero, which stops the servo from hunting around
//! its set point.

use crate::error::{PeripheralError, Result};
use crate::traits::DoorActuator;
use crate::types::DeviceInfo;
use latchkey_core::config::ActuatorConfig;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Kernel mount point for PWM chips.
pub const SYSFS_PWM_ROOT: &str = "/sys/class/pwm";

/// How many times to look for the channel directory after an export.
const EXPORT_POLL_ATTEMPTS: u32 = 20;

/// Delay between polls; udev may need a moment to fix permissions.
const EXPORT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Servo driven through sysfs PWM.
#[derive(Debug)]
pub struct ServoActuator {
    chip_dir: PathBuf,
    channel_dir: PathBuf,
    channel: u32,
    closed_duty_ns: u64,
    open_duty_ns: u64,
    settle: Duration,
    exported_by_us: bool,
    released: bool,
}

impl ServoActuator {
    /// Claim the configured PWM channel and move the latch to closed.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the PWM chip does not exist, and
    /// `InitializationFailed` if the channel cannot be exported or configured.
    pub async fn open_channel(config: &ActuatorConfig) -> Result<Self> {
        Self::with_sysfs_root(Path::new(SYSFS_PWM_ROOT), config).await
    }

    /// Same as [`open_channel`](Self::open_channel) with a custom sysfs root.
    pub async fn with_sysfs_root(root: &Path, config: &ActuatorConfig) -> Result<Self> {
        if config.period_ns == 0
            || config.open_duty_ns > config.period_ns
            || config.closed_duty_ns > config.period_ns
        {
            return Err(PeripheralError::configuration(format!(
                "Duty cycles ({} / {} ns) must fit in a non-zero period ({} ns)",
                config.closed_duty_ns, config.open_duty_ns, config.period_ns
            )));
        }

        let chip_dir = root.join(format!("pwmchip{}", config.pwm_chip));
        if !chip_dir.is_dir() {
            return Err(PeripheralError::unavailable(chip_dir.display().to_string()));
        }

        let channel_dir = chip_dir.join(format!("pwm{}", config.pwm_channel));
        let mut exported_by_us = false;
        if !channel_dir.is_dir() {
            std::fs::write(chip_dir.join("export"), config.pwm_channel.to_string()).map_err(
                |e| {
                    PeripheralError::initialization_failed(format!(
                        "Cannot export PWM channel {} on {}: {}",
                        config.pwm_channel,
                        chip_dir.display(),
                        e
                    ))
                },
            )?;
            exported_by_us = true;
            wait_for_channel(&channel_dir).await?;
        }

        let mut servo = Self {
            chip_dir,
            channel_dir,
            channel: config.pwm_channel,
            closed_duty_ns: config.closed_duty_ns,
            open_duty_ns: config.open_duty_ns,
            settle: config.settle(),
            exported_by_us,
            released: false,
        };

        servo
            .write_attr("period", config.period_ns)
            .and_then(|_| servo.write_attr("duty_cycle", 0))
            .and_then(|_| servo.write_attr("enable", 1))
            .map_err(|e| PeripheralError::initialization_failed(e.to_string()))?;

        servo.move_to(servo.closed_duty_ns).await?;
        info!("Servo ready on {}", servo.channel_dir.display());

        Ok(servo)
    }

    /// Directory of the claimed PWM channel.
    pub fn channel_dir(&self) -> &Path {
        &self.channel_dir
    }

    async fn move_to(&mut self, duty_ns: u64) -> Result<()> {
        if self.released {
            return Err(PeripheralError::unavailable(format!(
                "{} (released)",
                self.channel_dir.display()
            )));
        }

        debug!("Servo pulse {} ns", duty_ns);
        self.write_attr("duty_cycle", duty_ns)?;
        tokio::time::sleep(self.settle).await;
        self.write_attr("duty_cycle", 0)
    }

    /// Blocking variant of a close move, for paths that cannot await.
    fn close_blocking(&mut self) -> Result<()> {
        if self.released {
            return Err(PeripheralError::unavailable(format!(
                "{} (released)",
                self.channel_dir.display()
            )));
        }

        warn!("Servo emergency close, pulse {} ns", self.closed_duty_ns);
        self.write_attr("duty_cycle", self.closed_duty_ns)?;
        std::thread::sleep(self.settle);
        self.write_attr("duty_cycle", 0)
    }

    fn write_attr(&self, name: &str, value: impl Display) -> Result<()> {
        let path = self.channel_dir.join(name);
        std::fs::write(&path, value.to_string())
            .map_err(|e| PeripheralError::transient(format!("{}: {}", path.display(), e)))
    }

    fn release_now(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;

        let disabled = self.write_attr("enable", 0);
        if self.exported_by_us {
            if let Err(e) = std::fs::write(self.chip_dir.join("unexport"), self.channel.to_string())
            {
                warn!("Failed to unexport PWM channel {}: {}", self.channel, e);
            }
        }
        info!("Servo released");
        disabled
    }
}

async fn wait_for_channel(channel_dir: &Path) -> Result<()> {
    for _ in 0..EXPORT_POLL_ATTEMPTS {
        if channel_dir.is_dir() {
            return Ok(());
        }
        tokio::time::sleep(EXPORT_POLL_INTERVAL).await;
    }
    Err(PeripheralError::initialization_failed(format!(
        "{} did not appear after export",
        channel_dir.display()
    )))
}

impl DoorActuator for ServoActuator {
    async fn open(&mut self) -> Result<()> {
        self.move_to(self.open_duty_ns).await
    }

    async fn close(&mut self) -> Result<()> {
        self.move_to(self.closed_duty_ns).await
    }

    fn close_now(&mut self) -> Result<()> {
        self.close_blocking()
    }

    async fn release(&mut self) -> Result<()> {
        self.release_now()
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new("Servo", "sysfs-pwm")
            .with_location(self.channel_dir.display().to_string()))
    }
}

impl Drop for ServoActuator {
    fn drop(&mut self) {
        if let Err(e) = self.release_now() {
            warn!("Servo release on drop failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config() -> ActuatorConfig {
        ActuatorConfig {
            settle_ms: 1000,
            ..ActuatorConfig::default()
        }
    }

    fn sysfs_with_channel() -> TempDir {
        let root = TempDir::new().unwrap();
        std::fs::create_dir_all(root.path().join("pwmchip0/pwm0")).unwrap();
        root
    }

    fn read(path: PathBuf) -> String {
        std::fs::read_to_string(path).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_init_configures_channel_and_closes() {
        let root = sysfs_with_channel();
        let servo = ServoActuator::with_sysfs_root(root.path(), &config())
            .await
            .unwrap();

        let channel = root.path().join("pwmchip0/pwm0");
        assert_eq!(read(channel.join("period")), "20000000");
        assert_eq!(read(channel.join("enable")), "1");
        assert_eq!(read(channel.join("duty_cycle")), "0");
        assert!(!servo.exported_by_us);
    }

    #[tokio::test(start_paused = true)]
    async fn test_move_waits_for_settle_time() {
        let root = sysfs_with_channel();
        let mut servo = ServoActuator::with_sysfs_root(root.path(), &config())
            .await
            .unwrap();

        let start = tokio::time::Instant::now();
        servo.open().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(1000));
        assert_eq!(read(root.path().join("pwmchip0/pwm0/duty_cycle")), "0");
    }

    #[tokio::test]
    async fn test_missing_chip_is_unavailable() {
        let root = TempDir::new().unwrap();
        let result = ServoActuator::with_sysfs_root(root.path(), &config()).await;
        assert!(matches!(result, Err(PeripheralError::Unavailable { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_export_that_never_appears_fails_init() {
        let root = TempDir::new().unwrap();
        std::fs::create_dir_all(root.path().join("pwmchip0")).unwrap();

        let result = ServoActuator::with_sysfs_root(root.path(), &config()).await;
        assert!(matches!(
            result,
            Err(PeripheralError::InitializationFailed { .. })
        ));
        assert_eq!(read(root.path().join("pwmchip0/export")), "0");
    }

    #[tokio::test]
    async fn test_duty_larger_than_period_is_rejected() {
        let root = sysfs_with_channel();
        let bad = ActuatorConfig {
            open_duty_ns: 30_000_000,
            ..config()
        };
        let result = ServoActuator::with_sysfs_root(root.path(), &bad).await;
        assert!(matches!(
            result,
            Err(PeripheralError::ConfigurationError { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_release_disables_output_and_blocks_moves() {
        let root = sysfs_with_channel();
        let mut servo = ServoActuator::with_sysfs_root(root.path(), &config())
            .await
            .unwrap();

        servo.release().await.unwrap();
        assert_eq!(read(root.path().join("pwmchip0/pwm0/enable")), "0");
        assert!(servo.open().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_now_pulses_closed_then_stops() {
        let root = sysfs_with_channel();
        let cfg = ActuatorConfig {
            settle_ms: 0,
            ..config()
        };
        let mut servo = ServoActuator::with_sysfs_root(root.path(), &cfg)
            .await
            .unwrap();
        servo.open().await.unwrap();

        servo.close_now().unwrap();
        assert_eq!(read(root.path().join("pwmchip0/pwm0/duty_cycle")), "0");

        servo.release().await.unwrap();
        assert!(servo.close_now().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_disables_output() {
        let root = sysfs_with_channel();
        let servo = ServoActuator::with_sysfs_root(root.path(), &config())
            .await
            .unwrap();

        drop(servo);
        assert_eq!(read(root.path().join("pwmchip0/pwm0/enable")), "0");
    }
}
