//! Progression systems

pub mod levels;
pub mod resolver;
pub mod achievements;

pub use levels::{LevelDefinition, LevelTable, LevelTableError, default_level_table};
pub use resolver::{LevelProgress, LevelResolver};
pub use achievements::{AchievementDef, AchievementStats, RequirementType};
pub use achievements::{evaluate, achievement_progress, default_achievements};
