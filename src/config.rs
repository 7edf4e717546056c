//! Configuration types for batch-select

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, Result};

/// Scheduling parameters for a [`SelectionCoordinator`](crate::SelectionCoordinator)
///
/// # Examples
///
/// ```
/// use batch_select::CoordinatorConfig;
/// use std::time::Duration;
///
/// let config = CoordinatorConfig {
///     batch_size: 250,
///     pause: Duration::from_millis(5),
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Items handed to the foreground per dispatch (default: 100, must be > 0)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause between batches, zero disables it (default: 10ms)
    ///
    /// Serialized as whole milliseconds, so it must be a whole number of them.
    #[serde(default = "default_pause", with = "duration_ms_serde")]
    pub pause: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            pause: default_pause(),
        }
    }
}

impl CoordinatorConfig {
    /// Check that the configuration can drive a coordinator
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::Config {
                message: "batch_size must be greater than zero".to_string(),
                key: Some("batch_size".to_string()),
            });
        }
        if self.pause.subsec_nanos() % 1_000_000 != 0 {
            return Err(Error::Config {
                message: format!(
                    "pause must be a whole number of milliseconds, got {:?}",
                    self.pause
                ),
                key: Some("pause".to_string()),
            });
        }
        Ok(())
    }
}

fn default_batch_size() -> usize {
    100
}

fn default_pause() -> Duration {
    Duration::from_millis(10)
}

// Duration serialization helper (milliseconds)
mod duration_ms_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
