//! Data loading and external configuration
//!
//! This module handles loading levels, achievements, rewards and economy
//! tunables from external RON files, allowing the progression track to be
//! rebalanced without a rebuild.

pub mod loader;
pub mod config;
pub mod rewards;

pub use loader::{DataManager, DataError, export_default_data, DEFAULT_DATA_DIR};
pub use config::EconomyConfig;
pub use rewards::{Reward, RewardCatalog, default_reward_catalog};
