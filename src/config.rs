use std::path::PathBuf;

use tracing::warn;

use crate::error::QTableError;
use crate::qtable::TERMINAL_SENTINEL;

// =============================================================================
// Q-Table Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct QTableConfig {
    pub vision_range: u8,
    pub table_path: PathBuf,
    pub backup_dir: PathBuf,
}

impl Default for QTableConfig {
    fn default() -> Self {
        Self {
            vision_range: 4,
            table_path: PathBuf::from("qTable.json"),
            backup_dir: PathBuf::from("backup"),
        }
    }
}

impl QTableConfig {
    /// Defaults overridden by `SMB_VISION_RANGE`, `SMB_QTABLE_PATH` and
    /// `SMB_BACKUP_DIR` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(range) = env_parse("SMB_VISION_RANGE") {
            config.vision_range = range;
        }
        if let Ok(path) = std::env::var("SMB_QTABLE_PATH") {
            config.table_path = PathBuf::from(path);
        }
        if let Ok(dir) = std::env::var("SMB_BACKUP_DIR") {
            config.backup_dir = PathBuf::from(dir);
        }
        config
    }

    pub fn validate(&self) -> Result<(), QTableError> {
        if self.vision_range >= TERMINAL_SENTINEL {
            return Err(QTableError::VisionRange(self.vision_range));
        }
        Ok(())
    }

    /// Values each state slot may take: `0..=vision_range` then the sentinel.
    pub fn state_values(&self) -> Vec<u8> {
        (0..=self.vision_range)
            .chain(std::iter::once(TERMINAL_SENTINEL))
            .collect()
    }

    pub fn expected_entries(&self) -> usize {
        (self.vision_range as usize + 2).pow(crate::qtable::STATE_VARIABLES as u32)
    }
}

// =============================================================================
// Learning Rate Knobs
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LearningConfig {
    pub gamma: f64,
    pub alpha: f64,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            gamma: 0.9,
            alpha: 0.1,
        }
    }
}

impl LearningConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(gamma) = env_parse("SMB_GAMMA") {
            config.gamma = gamma;
        }
        if let Some(alpha) = env_parse("SMB_ALPHA") {
            config.alpha = alpha;
        }
        config
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("ignoring {key}={raw:?}: not a valid value");
            None
        }
    }
}
