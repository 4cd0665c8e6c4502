//! Economy tunables

use serde::{Deserialize, Serialize};

/// Amounts granted per event and the EXP to crystal exchange rate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// EXP per Lunar Crystal when converting
    pub conversion_rate: u64,
    /// EXP for completing a habit
    pub habit_exp: u64,
    /// EXP for completing a task
    pub task_exp: u64,
    /// Crystals for completing a habit
    pub habit_crystals_base: u64,
    /// Extra crystals per streak day beyond the first
    pub habit_crystals_per_streak: u64,
    /// Crystals for completing a task
    pub task_crystals_base: u64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            conversion_rate: 100,
            habit_exp: 50,
            task_exp: 30,
            habit_crystals_base: 5,
            habit_crystals_per_streak: 1,
            task_crystals_base: 3,
        }
    }
}

impl EconomyConfig {
    /// Crystals for a habit completion at the given streak length
    pub fn habit_crystals(&self, streak_length: u32) -> u64 {
        if streak_length > 1 {
            let bonus_days = u64::from(streak_length - 1);
            self.habit_crystals_base
                .saturating_add(bonus_days.saturating_mul(self.habit_crystals_per_streak))
        } else {
            self.habit_crystals_base
        }
    }
}
