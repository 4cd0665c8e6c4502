//! Level resolution
//!
//! Derives level and progress-to-next-level from cumulative EXP.

use serde::{Deserialize, Serialize};

use super::levels::{LevelDefinition, LevelTable};

/// Where a given EXP total sits on the level track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelProgress {
    pub level: u32,
    pub title: String,
    pub description: String,
    /// Threshold of the current level
    pub points_required: u64,
    /// Threshold of the next level, or the current threshold at max level
    pub next_level_points: u64,
    /// Fraction of the way to the next level, always in [0, 1]
    pub progress: f64,
}

impl LevelProgress {
    pub fn is_max_level(&self) -> bool {
        self.next_level_points == self.points_required
    }

    /// EXP still needed for the next level (0 at max level)
    pub fn exp_to_next(&self, total_exp: u64) -> u64 {
        self.next_level_points.saturating_sub(total_exp)
    }
}

/// Maps cumulative EXP onto a [`LevelTable`]
#[derive(Debug, Clone, Default)]
pub struct LevelResolver {
    table: LevelTable,
}

impl LevelResolver {
    pub fn new(table: LevelTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &LevelTable {
        &self.table
    }

    /// Greatest level whose threshold is at or below `total_exp`, clamped to max level
    pub fn level_for(&self, total_exp: u64) -> u32 {
        let reached = self
            .table
            .definitions()
            .partition_point(|def| def.points_required <= total_exp);
        // Level 0 sits at 0 EXP, so at least one row always qualifies.
        reached.saturating_sub(1) as u32
    }

    /// Row for the level `total_exp` resolves to
    pub fn definition_for(&self, total_exp: u64) -> &LevelDefinition {
        let defs = self.table.definitions();
        &defs[self.level_for(total_exp) as usize]
    }

    /// Title shown for a level, falling back to the top title past the table
    pub fn title_for_level(&self, level: u32) -> &str {
        let defs = self.table.definitions();
        let index = (level as usize).min(defs.len() - 1);
        &defs[index].title
    }

    pub fn progress_for(&self, total_exp: u64) -> LevelProgress {
        let level = self.level_for(total_exp);
        let current = self.definition_for(total_exp);
        let next_level_points = self
            .table
            .get(level + 1)
            .map(|next| next.points_required)
            .unwrap_or(current.points_required);

        let span = next_level_points - current.points_required;
        let progress = if span == 0 {
            1.0
        } else {
            let into_level = total_exp - current.points_required;
            (into_level as f64 / span as f64).clamp(0.0, 1.0)
        };

        LevelProgress {
            level,
            title: current.title.clone(),
            description: current.description.clone(),
            points_required: current.points_required,
            next_level_points,
            progress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::levels::LevelDefinition;

    fn small_table() -> LevelResolver {
        let table = LevelTable::new(vec![
            LevelDefinition::new(0, "Novice", "", 0),
            LevelDefinition::new(1, "Adept", "", 1000),
            LevelDefinition::new(2, "Master", "", 5000),
        ])
        .unwrap();
        LevelResolver::new(table)
    }

    #[test]
    fn test_level_boundaries() {
        let resolver = small_table();
        assert_eq!(resolver.level_for(0), 0);
        assert_eq!(resolver.level_for(999), 0);
        assert_eq!(resolver.level_for(1000), 1);
        assert_eq!(resolver.level_for(4999), 1);
        assert_eq!(resolver.level_for(5000), 2);
    }

    #[test]
    fn test_level_clamps_at_max() {
        let resolver = small_table();
        assert_eq!(resolver.level_for(5001), 2);
        assert_eq!(resolver.level_for(u64::MAX), 2);
    }

    #[test]
    fn test_threshold_inclusivity_on_default_table() {
        let resolver = LevelResolver::default();
        for def in resolver.table().definitions() {
            assert_eq!(resolver.level_for(def.points_required), def.level);
            if def.level > 0 {
                assert_eq!(resolver.level_for(def.points_required - 1), def.level - 1);
            }
        }
    }

    #[test]
    fn test_level_is_monotonic() {
        let resolver = LevelResolver::default();
        let mut previous = 0;
        for exp in (0..9_000).step_by(7) {
            let level = resolver.level_for(exp);
            assert!(level >= previous, "level dropped at {} EXP", exp);
            previous = level;
        }
    }

    #[test]
    fn test_progress_midway() {
        let resolver = small_table();
        let progress = resolver.progress_for(3000);
        assert_eq!(progress.level, 1);
        assert_eq!(progress.title, "Adept");
        assert_eq!(progress.points_required, 1000);
        assert_eq!(progress.next_level_points, 5000);
        assert!((progress.progress - 0.5).abs() < f64::EPSILON);
        assert_eq!(progress.exp_to_next(3000), 2000);
    }

    #[test]
    fn test_progress_at_max_level_is_full() {
        let resolver = small_table();
        let progress = resolver.progress_for(12_000);
        assert!(progress.is_max_level());
        assert_eq!(progress.next_level_points, 5000);
        assert_eq!(progress.progress, 1.0);
        assert_eq!(progress.exp_to_next(12_000), 0);
    }

    #[test]
    fn test_progress_is_bounded() {
        let resolver = LevelResolver::default();
        for exp in (0..10_000).step_by(13) {
            let p = resolver.progress_for(exp).progress;
            assert!((0.0..=1.0).contains(&p), "progress {} out of range at {}", p, exp);
        }
    }

    #[test]
    fn test_title_for_level() {
        let resolver = small_table();
        assert_eq!(resolver.title_for_level(1), "Adept");
        assert_eq!(resolver.title_for_level(99), "Master");
    }
}
