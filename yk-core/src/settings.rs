//! Application Settings
//!
//! Persistent settings stored as JSON in ~/.config/yukon-detect/settings.json

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;

use crate::constants::{detection, limits, output, paths};
use crate::detect::{AdcThresholds, DetectorConfig};
use crate::error::{Result, YukonError};

// ============================================================================
// Cached Settings
// ============================================================================

static SETTINGS_CACHE: OnceLock<RwLock<Option<AppSettings>>> = OnceLock::new();

fn get_cache() -> &'static RwLock<Option<AppSettings>> {
    SETTINGS_CACHE.get_or_init(|| RwLock::new(None))
}

/// Get cached settings, loading from disk on first use
pub fn get_cached_settings() -> AppSettings {
    if let Some(settings) = get_cache().read().as_ref() {
        return settings.clone();
    }

    let settings = load_settings().unwrap_or_default();
    *get_cache().write() = Some(settings.clone());
    settings
}

fn update_cache(settings: &AppSettings) {
    *get_cache().write() = Some(settings.clone());
}

// ============================================================================
// Settings Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub general: GeneralSettings,
    #[serde(default)]
    pub detection: DetectionSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralSettings {
    /// Log filter used when RUST_LOG is not set ("error", "warn", "info", "debug", "trace")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionSettings {
    #[serde(default = "default_adc_low")]
    pub adc_low_threshold: f32,
    #[serde(default = "default_adc_high")]
    pub adc_high_threshold: f32,
    #[serde(default = "default_samples")]
    pub samples: u32,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            adc_low_threshold: default_adc_low(),
            adc_high_threshold: default_adc_high(),
            samples: default_samples(),
        }
    }
}

fn default_adc_low() -> f32 {
    detection::DEFAULT_ADC_LOW_THRESHOLD
}

fn default_adc_high() -> f32 {
    detection::DEFAULT_ADC_HIGH_THRESHOLD
}

fn default_samples() -> u32 {
    detection::DEFAULT_SAMPLES
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default = "default_dissipate_level")]
    pub dissipate_level: f32,
    #[serde(default = "default_dissipate_timeout_secs")]
    pub dissipate_timeout_secs: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dissipate_level: default_dissipate_level(),
            dissipate_timeout_secs: default_dissipate_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

fn default_dissipate_level() -> f32 {
    output::DEFAULT_DISSIPATE_LEVEL
}

fn default_dissipate_timeout_secs() -> u64 {
    output::DEFAULT_DISSIPATE_TIMEOUT_SECS
}

fn default_poll_interval_ms() -> u64 {
    output::DEFAULT_POLL_INTERVAL_MS
}

const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

impl AppSettings {
    pub fn thresholds(&self) -> Result<AdcThresholds> {
        AdcThresholds::new(
            self.detection.adc_low_threshold,
            self.detection.adc_high_threshold,
        )
    }

    pub fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.general.log_level.as_str()) {
            return Err(YukonError::invalid_config(
                "general.log_level",
                format!("must be one of {}", LOG_LEVELS.join(", ")),
            ));
        }

        self.thresholds()?;

        if self.detection.samples == 0 || self.detection.samples > detection::MAX_SAMPLES {
            return Err(YukonError::invalid_config(
                "detection.samples",
                format!("must be between 1 and {}", detection::MAX_SAMPLES),
            ));
        }

        if !self.output.dissipate_level.is_finite() || self.output.dissipate_level <= 0.0 {
            return Err(YukonError::invalid_config(
                "output.dissipate_level",
                "must be a positive voltage",
            ));
        }

        if self.output.poll_interval_ms == 0 {
            return Err(YukonError::invalid_config(
                "output.poll_interval_ms",
                "must be at least 1",
            ));
        }

        Ok(())
    }

    /// Detector tuning derived from these settings
    pub fn detector_config(&self) -> Result<DetectorConfig> {
        self.validate()?;
        Ok(DetectorConfig {
            thresholds: self.thresholds()?,
            samples: self.detection.samples,
            dissipate_level: self.output.dissipate_level,
            dissipate_timeout: Duration::from_secs(self.output.dissipate_timeout_secs),
            dissipate_poll_interval: Duration::from_millis(self.output.poll_interval_ms),
        })
    }
}

// ============================================================================
// Load / Save
// ============================================================================

/// Get the settings file path
pub fn get_settings_path() -> Result<PathBuf> {
    let dir = paths::user_config_dir()
        .ok_or_else(|| YukonError::config("Could not determine config directory"))?;
    Ok(dir.join(paths::SETTINGS_FILE))
}

/// Load settings from the default location
pub fn load_settings() -> Result<AppSettings> {
    load_settings_from(&get_settings_path()?)
}

/// Load settings from a file, returning defaults when it does not exist
pub fn load_settings_from(path: &Path) -> Result<AppSettings> {
    if !path.exists() {
        debug!("No settings file at {:?}, using defaults", path);
        return Ok(AppSettings::default());
    }

    let metadata = fs::metadata(path).map_err(|e| YukonError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    if metadata.len() > limits::MAX_SETTINGS_SIZE {
        return Err(YukonError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size: limits::MAX_SETTINGS_SIZE,
        });
    }

    let content = fs::read_to_string(path).map_err(|e| YukonError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let settings: AppSettings = serde_json::from_str(&content).map_err(|e| {
        YukonError::config(format!("Failed to parse settings JSON: {}", e))
    })?;
    settings.validate()?;
    Ok(settings)
}

/// Save settings to the default location
pub fn save_settings(settings: &AppSettings) -> Result<()> {
    save_settings_to(settings, &get_settings_path()?)?;
    update_cache(settings);
    Ok(())
}

/// Save settings atomically: write a temp file, sync, then rename over the target
pub fn save_settings_to(settings: &AppSettings, path: &Path) -> Result<()> {
    use std::io::Write;

    settings.validate()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| YukonError::FileWrite {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let json = serde_json::to_string_pretty(settings)?;
    let temp_path = path.with_extension("json.tmp");

    let write_err = |e| YukonError::FileWrite {
        path: temp_path.clone(),
        source: e,
    };
    let mut file = fs::File::create(&temp_path).map_err(write_err)?;
    file.write_all(json.as_bytes()).map_err(write_err)?;
    file.sync_all().map_err(write_err)?;
    drop(file);

    fs::rename(&temp_path, path).map_err(|e| YukonError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    debug!("Saved settings to {:?}", path);
    Ok(())
}

/// Set one value by dotted key, e.g. `detection.samples`
pub fn update_setting(settings: &mut AppSettings, key: &str, value: &str) -> Result<()> {
    let invalid = |reason: &str| YukonError::invalid_config(key, reason.to_string());
    let mut updated = settings.clone();

    match key {
        "general.log_level" => {
            updated.general.log_level = value.trim().to_ascii_lowercase();
        }
        "detection.adc_low_threshold" => {
            updated.detection.adc_low_threshold =
                value.trim().parse().map_err(|_| invalid("expected a voltage"))?;
        }
        "detection.adc_high_threshold" => {
            updated.detection.adc_high_threshold =
                value.trim().parse().map_err(|_| invalid("expected a voltage"))?;
        }
        "detection.samples" => {
            updated.detection.samples =
                value.trim().parse().map_err(|_| invalid("expected a whole number"))?;
        }
        "output.dissipate_level" => {
            updated.output.dissipate_level =
                value.trim().parse().map_err(|_| invalid("expected a voltage"))?;
        }
        "output.dissipate_timeout_secs" => {
            updated.output.dissipate_timeout_secs =
                value.trim().parse().map_err(|_| invalid("expected whole seconds"))?;
        }
        "output.poll_interval_ms" => {
            updated.output.poll_interval_ms =
                value.trim().parse().map_err(|_| invalid("expected whole milliseconds"))?;
        }
        _ => return Err(invalid("unknown setting")),
    }

    updated.validate()?;
    *settings = updated;
    Ok(())
}
