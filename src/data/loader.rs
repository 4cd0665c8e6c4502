//! RON data loader
//!
//! Loads the level table, achievements, rewards and economy tunables from
//! external RON files, with fallback to the built-in defaults.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::config::EconomyConfig;
use super::rewards::{default_reward_catalog, RewardCatalog};
use crate::progression::{default_achievements, default_level_table, AchievementDef, LevelTable};

/// Default location of the data files
pub const DEFAULT_DATA_DIR: &str = "assets/data";

const LEVELS_FILE: &str = "levels.ron";
const ACHIEVEMENTS_FILE: &str = "achievements.ron";
const REWARDS_FILE: &str = "rewards.ron";
const ECONOMY_FILE: &str = "economy.ron";

/// Failures while exporting data files
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize {file}: {source}")]
    Serialize {
        file: &'static str,
        #[source]
        source: ron::Error,
    },
}

/// All externally configurable data
#[derive(Debug, Clone)]
pub struct DataManager {
    /// Level thresholds and titles
    pub levels: LevelTable,
    /// Achievement definitions
    pub achievements: Vec<AchievementDef>,
    /// Reward catalog
    pub rewards: RewardCatalog,
    /// Economy tunables
    pub economy: EconomyConfig,
}

impl DataManager {
    /// Load from the default data directory
    pub fn new() -> Self {
        Self::load(Path::new(DEFAULT_DATA_DIR))
    }

    /// Load each file from `base_path`, falling back to defaults per file
    pub fn load(base_path: &Path) -> Self {
        Self {
            levels: load_ron(&base_path.join(LEVELS_FILE), default_level_table),
            achievements: load_ron(&base_path.join(ACHIEVEMENTS_FILE), default_achievements),
            rewards: load_ron(&base_path.join(REWARDS_FILE), default_reward_catalog),
            economy: load_ron(&base_path.join(ECONOMY_FILE), EconomyConfig::default),
        }
    }
}

impl Default for DataManager {
    fn default() -> Self {
        Self {
            levels: default_level_table(),
            achievements: default_achievements(),
            rewards: default_reward_catalog(),
            economy: EconomyConfig::default(),
        }
    }
}

fn load_ron<T, D>(path: &Path, default: D) -> T
where
    T: DeserializeOwned,
    D: FnOnce() -> T,
{
    if path.exists() {
        match fs::read_to_string(path) {
            Ok(content) => match ron::from_str(&content) {
                Ok(value) => {
                    log::info!("Loaded {:?}", path);
                    return value;
                }
                Err(e) => log::warn!("Failed to parse {:?}: {}. Using defaults.", path, e),
            },
            Err(e) => log::warn!("Failed to read {:?}: {}. Using defaults.", path, e),
        }
    }
    default()
}

/// Write all default data to RON files for easy editing
pub fn export_default_data(base_path: &Path) -> Result<(), DataError> {
    fs::create_dir_all(base_path).map_err(|source| DataError::Io {
        path: base_path.to_path_buf(),
        source,
    })?;

    let defaults = DataManager::default();
    write_ron(base_path, LEVELS_FILE, &defaults.levels)?;
    write_ron(base_path, ACHIEVEMENTS_FILE, &defaults.achievements)?;
    write_ron(base_path, REWARDS_FILE, &defaults.rewards)?;
    write_ron(base_path, ECONOMY_FILE, &defaults.economy)?;

    log::info!("Exported default data to {:?}", base_path);
    Ok(())
}

fn write_ron<T: Serialize>(base_path: &Path, file: &'static str, value: &T) -> Result<(), DataError> {
    let text = ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default())
        .map_err(|source| DataError::Serialize { file, source })?;
    let path = base_path.join(file);
    fs::write(&path, text).map_err(|source| DataError::Io { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_then_load() {
        let dir = tempfile::tempdir().unwrap();
        export_default_data(dir.path()).unwrap();

        assert!(dir.path().join(LEVELS_FILE).exists());
        assert!(dir.path().join(ACHIEVEMENTS_FILE).exists());
        assert!(dir.path().join(REWARDS_FILE).exists());
        assert!(dir.path().join(ECONOMY_FILE).exists());

        let loaded = DataManager::load(dir.path());
        let defaults = DataManager::default();
        assert_eq!(loaded.levels, defaults.levels);
        assert_eq!(loaded.achievements, defaults.achievements);
        assert_eq!(loaded.rewards, defaults.rewards);
        assert_eq!(loaded.economy, defaults.economy);
    }

    #[test]
    fn test_missing_dir_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = DataManager::load(&dir.path().join("absent"));
        assert_eq!(loaded.levels.max_level(), 10);
    }

    #[test]
    fn test_invalid_level_table_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(LEVELS_FILE),
            "[(level: 0, title: \"a\", description: \"\", points_required: 0),\
              (level: 1, title: \"b\", description: \"\", points_required: 0)]",
        )
        .unwrap();
        fs::write(dir.path().join(ECONOMY_FILE), "(conversion_rate: 50)").unwrap();

        let loaded = DataManager::load(dir.path());
        assert_eq!(loaded.levels, default_level_table());
        assert_eq!(loaded.economy.conversion_rate, 50);
    }
}
