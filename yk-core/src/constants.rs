//! Constants and configuration values for yukon-detect
//!
//! Centralizes the board's magic numbers, paths, and configuration defaults.
//! Add new values here rather than scattering literals across modules.

use std::time::Duration;

/// Board geometry
pub mod board {
    /// Number of module slots on a Yukon board
    pub const NUM_SLOTS: u8 = 6;

    /// First valid slot number
    pub const FIRST_SLOT: u8 = 1;

    /// ADC reference voltage
    pub const ADC_REFERENCE_VOLTAGE: f32 = 3.3;

    /// Voltage an unconnected ADC1 line settles at (half the reference)
    pub const FLOATING_ADC1_VOLTAGE: f32 = ADC_REFERENCE_VOLTAGE / 2.0;
}

/// Module detection parameters
pub mod detection {
    /// ADC1 voltage at or below which the level reads LOW
    pub const DEFAULT_ADC_LOW_THRESHOLD: f32 = 0.2;

    /// ADC1 voltage at or above which the level reads HIGH
    pub const DEFAULT_ADC_HIGH_THRESHOLD: f32 = 3.2;

    /// ADC1 readings averaged per detection
    pub const DEFAULT_SAMPLES: u32 = 64;

    /// Upper bound on samples accepted from configuration
    pub const MAX_SAMPLES: u32 = 4096;

    /// Number of rows in the address table (3 ADC levels x 8 slow-pin states)
    pub const ADDRESS_COUNT: usize = 24;
}

/// Main output rail parameters used before detection
pub mod output {
    use super::Duration;

    /// Output voltage below which slot addresses read reliably
    pub const DEFAULT_DISSIPATE_LEVEL: f32 = 0.4;

    /// A bench power module with no load can take a while to discharge
    pub const DEFAULT_DISSIPATE_TIMEOUT_SECS: u64 = 15;

    /// Delay between output voltage polls
    pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10;

    pub const DEFAULT_DISSIPATE_TIMEOUT: Duration =
        Duration::from_secs(DEFAULT_DISSIPATE_TIMEOUT_SECS);

    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(DEFAULT_POLL_INTERVAL_MS);
}

/// Size limits for files read from disk
pub mod limits {
    /// Maximum snapshot file size (64 KiB)
    pub const MAX_SNAPSHOT_SIZE: u64 = 64 * 1024;

    /// Maximum settings file size (64 KiB)
    pub const MAX_SETTINGS_SIZE: u64 = 64 * 1024;

    /// Maximum registration profile size (16 KiB)
    pub const MAX_PROFILE_SIZE: u64 = 16 * 1024;
}

/// File system locations
pub mod paths {
    use std::path::PathBuf;

    /// Directory name under the user config dir
    pub const APP_DIR: &str = "yukon-detect";

    /// Settings file name
    pub const SETTINGS_FILE: &str = "settings.json";

    /// User configuration directory
    ///
    /// Resolution order: `$XDG_CONFIG_HOME`, `$HOME/.config`, then the platform default.
    pub fn user_config_dir() -> Option<PathBuf> {
        let base = if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            Some(PathBuf::from(xdg))
        } else if let Ok(home) = std::env::var("HOME") {
            Some(PathBuf::from(home).join(".config"))
        } else {
            dirs::config_dir()
        };

        base.map(|p| p.join(APP_DIR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_thresholds_ordered() {
        assert!(detection::DEFAULT_ADC_LOW_THRESHOLD < detection::DEFAULT_ADC_HIGH_THRESHOLD);
        assert!(detection::DEFAULT_ADC_HIGH_THRESHOLD <= board::ADC_REFERENCE_VOLTAGE);
    }

    #[test]
    #[serial]
    fn test_user_config_dir_prefers_xdg() {
        let previous = std::env::var("XDG_CONFIG_HOME").ok();
        std::env::set_var("XDG_CONFIG_HOME", "/tmp/yk-xdg");

        let dir = paths::user_config_dir();
        assert_eq!(dir, Some(std::path::PathBuf::from("/tmp/yk-xdg/yukon-detect")));

        match previous {
            Some(value) => std::env::set_var("XDG_CONFIG_HOME", value),
            None => std::env::remove_var("XDG_CONFIG_HOME"),
        }
    }
}
