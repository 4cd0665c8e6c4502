//! Achievement evaluation
//!
//! Decides which achievement thresholds a user has newly crossed.
//! Granting the reward and recording the earned id is the economy engine's job.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::economy::Currency;

/// Which aggregate stat an achievement is measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementType {
    HabitsCompleted,
    TotalCompleted,
    MaxStreak,
    LevelReached,
}

/// Aggregate stats supplied by the habit/task tracker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementStats {
    pub total_completed: u64,
    pub max_streak: u64,
    pub level: u32,
}

impl AchievementStats {
    /// Stat value an achievement of this type compares against
    pub fn value_for(&self, requirement: RequirementType) -> u64 {
        match requirement {
            RequirementType::HabitsCompleted | RequirementType::TotalCompleted => self.total_completed,
            RequirementType::MaxStreak => self.max_streak,
            RequirementType::LevelReached => self.level as u64,
        }
    }
}

/// Achievement definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementDef {
    pub id: String,
    pub name: String,
    pub description: String,
    pub requirement_type: RequirementType,
    pub requirement_value: u64,
    /// Amount granted when earned
    pub reward: u64,
    #[serde(default)]
    pub reward_currency: Currency,
}

impl AchievementDef {
    pub fn new(
        id: &str,
        name: &str,
        description: &str,
        requirement_type: RequirementType,
        requirement_value: u64,
        reward: u64,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            requirement_type,
            requirement_value,
            reward,
            reward_currency: Currency::LunarCrystals,
        }
    }

    pub fn is_satisfied(&self, stats: &AchievementStats) -> bool {
        stats.value_for(self.requirement_type) >= self.requirement_value
    }
}

/// Definitions whose thresholds are met and which are not already earned.
///
/// A definition id listed twice in `defs` is only reported once.
pub fn evaluate<'a>(
    stats: &AchievementStats,
    defs: &'a [AchievementDef],
    already_earned: &HashSet<String>,
) -> Vec<&'a AchievementDef> {
    let mut seen = HashSet::new();
    let mut newly = Vec::new();
    for def in defs {
        if already_earned.contains(&def.id) || !def.is_satisfied(stats) {
            continue;
        }
        if seen.insert(def.id.as_str()) {
            newly.push(def);
        }
    }
    newly
}

/// Progress toward an achievement in [0, 1]; earned achievements always report full
pub fn achievement_progress(def: &AchievementDef, stats: &AchievementStats, earned: bool) -> f64 {
    if earned || def.requirement_value == 0 {
        return 1.0;
    }
    let value = stats.value_for(def.requirement_type) as f64;
    (value / def.requirement_value as f64).min(1.0)
}

/// Built-in achievement set
pub fn default_achievements() -> Vec<AchievementDef> {
    use RequirementType::*;

    vec![
        AchievementDef::new("first_step", "First Step", "Complete your first habit", HabitsCompleted, 1, 10),
        AchievementDef::new("habit_apprentice", "Habit Apprentice", "Complete 25 habits", HabitsCompleted, 25, 25),
        AchievementDef::new("habit_master", "Habit Master", "Complete 100 habits", HabitsCompleted, 100, 75),
        AchievementDef::new("busy_moon", "Busy Moon", "Complete 250 habits and tasks", TotalCompleted, 250, 150),
        AchievementDef::new("week_streak", "Waxing Week", "Keep a 7 day streak", MaxStreak, 7, 30),
        AchievementDef::new("month_streak", "Full Cycle", "Keep a 30 day streak", MaxStreak, 30, 120),
        AchievementDef::new("level_5", "Gibbous Rising", "Reach level 5", LevelReached, 5, 50),
        AchievementDef::new("level_10", "Full Moon", "Reach the final level", LevelReached, 10, 200),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(total: u64, streak: u64, level: u32) -> AchievementStats {
        AchievementStats { total_completed: total, max_streak: streak, level }
    }

    #[test]
    fn test_evaluate_threshold_is_inclusive() {
        let defs = default_achievements();
        let earned = HashSet::new();
        let newly: Vec<&str> = evaluate(&stats(1, 0, 0), &defs, &earned)
            .iter()
            .map(|d| d.id.as_str())
            .collect();
        assert_eq!(newly, vec!["first_step"]);
    }

    #[test]
    fn test_evaluate_each_requirement_type() {
        let defs = default_achievements();
        let earned = HashSet::new();
        let newly: HashSet<&str> = evaluate(&stats(0, 7, 5), &defs, &earned)
            .iter()
            .map(|d| d.id.as_str())
            .collect();
        assert!(newly.contains("week_streak"));
        assert!(newly.contains("level_5"));
        assert!(!newly.contains("first_step"));
        assert!(!newly.contains("level_10"));
    }

    #[test]
    fn test_evaluate_skips_already_earned() {
        let defs = default_achievements();
        let s = stats(30, 0, 0);
        let first: HashSet<String> = evaluate(&s, &defs, &HashSet::new())
            .iter()
            .map(|d| d.id.clone())
            .collect();
        assert_eq!(first.len(), 2);

        let second = evaluate(&s, &defs, &first);
        assert!(second.is_empty());
    }

    #[test]
    fn test_evaluate_dedupes_repeated_definitions() {
        let mut defs = default_achievements();
        defs.push(defs[0].clone());
        let newly = evaluate(&stats(1, 0, 0), &defs, &HashSet::new());
        assert_eq!(newly.len(), 1);
    }

    #[test]
    fn test_progress_fraction() {
        let def = AchievementDef::new("x", "X", "", RequirementType::MaxStreak, 10, 0);
        assert_eq!(achievement_progress(&def, &stats(0, 5, 0), false), 0.5);
        assert_eq!(achievement_progress(&def, &stats(0, 50, 0), false), 1.0);
        // stat drift after earning does not reduce progress
        assert_eq!(achievement_progress(&def, &stats(0, 0, 0), true), 1.0);
    }
}
