use anyhow::{Context, Result, bail};
use log::LevelFilter;
use pdf_cursor::RepeatTiming;
use pdf_raster::RasterConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Presentation settings read from a JSON file.
///
/// Every field is optional in the file; missing ones take the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
    /// Hold-to-repeat timing for the navigation keys
    pub repeat: RepeatTiming,
    /// Pages decoded per batch by each rasterizer
    pub batch_size: usize,
    /// Decode attempts per batch before a render cycle gives up
    pub max_decode_attempts: u32,
    /// Wait before the first retry, doubled for each later one
    pub retry_backoff_ms: u64,
    /// Frame period while a key is held
    pub fast_tick_secs: f64,
    /// Frame period while idle
    pub slow_tick_secs: f64,
    /// One of off, error, warn, info, debug, trace
    pub log_level: String,
}

impl Default for DeckConfig {
    fn default() -> Self {
        let raster = RasterConfig::default();
        Self {
            repeat: RepeatTiming::default(),
            batch_size: raster.batch_size,
            max_decode_attempts: raster.max_decode_attempts,
            retry_backoff_ms: raster.retry_backoff.as_millis() as u64,
            fast_tick_secs: 1.0 / 60.0,
            slow_tick_secs: 0.5,
            log_level: "info".to_string(),
        }
    }
}

impl DeckConfig {
    /// Read `path`, or return the defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.repeat.validate()?;
        self.raster_config().validate()?;
        for (name, secs) in [
            ("fast_tick_secs", self.fast_tick_secs),
            ("slow_tick_secs", self.slow_tick_secs),
        ] {
            if !secs.is_finite() || secs <= 0.0 {
                bail!("{name} must be a positive number of seconds, got {secs}");
            }
        }
        self.log_level()?;
        Ok(())
    }

    pub fn raster_config(&self) -> RasterConfig {
        RasterConfig {
            batch_size: self.batch_size,
            max_decode_attempts: self.max_decode_attempts,
            retry_backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }

    pub fn fast_tick(&self) -> Duration {
        Duration::from_secs_f64(self.fast_tick_secs)
    }

    pub fn slow_tick(&self) -> Duration {
        Duration::from_secs_f64(self.slow_tick_secs)
    }

    pub fn log_level(&self) -> Result<LevelFilter> {
        self.log_level
            .parse()
            .map_err(|_| anyhow::anyhow!("Unknown log level '{}'", self.log_level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_no_path_gives_defaults() {
        let config = DeckConfig::load(None).unwrap();
        assert_eq!(config, DeckConfig::default());
        assert_eq!(config.repeat.trigger_delay, Duration::from_millis(400));
        assert_eq!(config.slow_tick(), Duration::from_millis(500));
        assert_eq!(config.log_level().unwrap(), LevelFilter::Info);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let file = write_config(
            r#"{"batch_size": 8, "repeat": {"repeat_interval_ms": 50}, "log_level": "DEBUG"}"#,
        );
        let config = DeckConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.batch_size, 8);
        assert_eq!(config.repeat.repeat_interval, Duration::from_millis(50));
        assert_eq!(config.repeat.trigger_delay, Duration::from_millis(400));
        assert_eq!(config.max_decode_attempts, 3);
        assert_eq!(config.log_level().unwrap(), LevelFilter::Debug);
        assert_eq!(config.raster_config().batch_size, 8);
    }

    #[test]
    fn test_invalid_files_are_rejected() {
        for json in [
            "not json",
            r#"{"batch_size": 0}"#,
            r#"{"repeat": {"repeat_interval_ms": 0}}"#,
            r#"{"slow_tick_secs": -1.0}"#,
            r#"{"retry_backoff_ms": 600000}"#,
            r#"{"log_level": "loud"}"#,
        ] {
            let file = write_config(json);
            assert!(DeckConfig::load(Some(file.path())).is_err(), "{json}");
        }
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(DeckConfig::load(Some(Path::new("/nonexistent/deck.json"))).is_err());
    }
}
