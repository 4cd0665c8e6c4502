//! Lunaris - progression and economy engine for a gamified habit tracker
//!
//! Complete habits and tasks to earn EXP and Lunar Crystals, climb the
//! lunar level track, and spend your crystals on rewards.

pub mod progression;
pub mod economy;
pub mod save;
pub mod data;
pub mod ui;

// Re-export commonly used types
pub use economy::{Currency, EconomyAccount, EconomyEngine, EconomyError, UserId};
pub use progression::{LevelProgress, LevelResolver, LevelTable};
pub use save::{EconomyStore, JsonFileStore, MemoryStore};
