use crate::constants::{REPEAT_INTERVAL, TRIGGER_DELAY};
use crate::{CursorError, Result};
use std::time::Duration;

/// Delay and interval used by a [`RepeatTimer`](crate::RepeatTimer)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatTiming {
    /// Hold time before the first repeat
    pub trigger_delay: Duration,
    /// Time between subsequent repeats
    pub repeat_interval: Duration,
}

impl Default for RepeatTiming {
    fn default() -> Self {
        Self {
            trigger_delay: TRIGGER_DELAY,
            repeat_interval: REPEAT_INTERVAL,
        }
    }
}

impl RepeatTiming {
    pub fn validate(&self) -> Result<()> {
        if self.repeat_interval.is_zero() {
            return Err(CursorError::Timing(
                "Repeat interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// Durations are written as whole milliseconds so config files stay readable.
#[cfg(feature = "serde")]
mod serde_impls {
    use super::*;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(default)]
    struct RepeatTimingMs {
        trigger_delay_ms: u64,
        repeat_interval_ms: u64,
    }

    impl Default for RepeatTimingMs {
        fn default() -> Self {
            RepeatTiming::default().into()
        }
    }

    impl From<RepeatTiming> for RepeatTimingMs {
        fn from(timing: RepeatTiming) -> Self {
            Self {
                trigger_delay_ms: timing.trigger_delay.as_millis() as u64,
                repeat_interval_ms: timing.repeat_interval.as_millis() as u64,
            }
        }
    }

    impl Serialize for RepeatTiming {
        fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            RepeatTimingMs::from(*self).serialize(serializer)
        }
    }

    impl<'de> Deserialize<'de> for RepeatTiming {
        fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            let ms = RepeatTimingMs::deserialize(deserializer)?;
            Ok(RepeatTiming {
                trigger_delay: Duration::from_millis(ms.trigger_delay_ms),
                repeat_interval: Duration::from_millis(ms.repeat_interval_ms),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timing_matches_constants() {
        let timing = RepeatTiming::default();
        assert_eq!(timing.trigger_delay, Duration::from_millis(400));
        assert_eq!(timing.repeat_interval, Duration::from_millis(100));
        assert!(timing.validate().is_ok());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let timing = RepeatTiming {
            repeat_interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(matches!(timing.validate(), Err(CursorError::Timing(_))));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_timing_json_uses_milliseconds() {
        let json = serde_json::to_string(&RepeatTiming::default()).unwrap();
        assert_eq!(json, r#"{"trigger_delay_ms":400,"repeat_interval_ms":100}"#);

        let parsed: RepeatTiming = serde_json::from_str(r#"{"trigger_delay_ms":250}"#).unwrap();
        assert_eq!(parsed.trigger_delay, Duration::from_millis(250));
        assert_eq!(parsed.repeat_interval, REPEAT_INTERVAL);
    }
}
