//! Level table
//!
//! The ordered list of levels, their cumulative EXP thresholds, and their titles.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One row of the level table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDefinition {
    pub level: u32,
    pub title: String,
    pub description: String,
    /// Cumulative EXP needed to reach this level
    pub points_required: u64,
}

impl LevelDefinition {
    pub fn new(level: u32, title: &str, description: &str, points_required: u64) -> Self {
        Self {
            level,
            title: title.to_string(),
            description: description.to_string(),
            points_required,
        }
    }
}

/// Reasons a level table can be rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LevelTableError {
    #[error("level table is empty")]
    Empty,
    #[error("level table must start at level 0 with 0 EXP, found level {level} at {points} EXP")]
    BadFirstLevel { level: u32, points: u64 },
    #[error("level {found} is out of sequence, expected level {expected}")]
    OutOfSequence { expected: u32, found: u32 },
    #[error("level {level} threshold {points} is not above the previous threshold {previous}")]
    ThresholdNotAscending { level: u32, points: u64, previous: u64 },
}

/// Validated, immutable level table.
///
/// Levels are contiguous from 0, and thresholds strictly increase, so the
/// row for level `n` always sits at index `n`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LevelDefinition>", into = "Vec<LevelDefinition>")]
pub struct LevelTable {
    levels: Vec<LevelDefinition>,
}

impl LevelTable {
    /// Build a table, rejecting anything that is not sorted and contiguous
    pub fn new(levels: Vec<LevelDefinition>) -> Result<Self, LevelTableError> {
        let first = levels.first().ok_or(LevelTableError::Empty)?;
        if first.level != 0 || first.points_required != 0 {
            return Err(LevelTableError::BadFirstLevel {
                level: first.level,
                points: first.points_required,
            });
        }

        for (index, pair) in levels.windows(2).enumerate() {
            let (prev, next) = (&pair[0], &pair[1]);
            let expected = index as u32 + 1;
            if next.level != expected {
                return Err(LevelTableError::OutOfSequence { expected, found: next.level });
            }
            if next.points_required <= prev.points_required {
                return Err(LevelTableError::ThresholdNotAscending {
                    level: next.level,
                    points: next.points_required,
                    previous: prev.points_required,
                });
            }
        }

        Ok(Self { levels })
    }

    /// Look up a level's row
    pub fn get(&self, level: u32) -> Option<&LevelDefinition> {
        self.levels.get(level as usize)
    }

    /// Highest attainable level
    pub fn max_level(&self) -> u32 {
        (self.levels.len() - 1) as u32
    }

    pub fn definitions(&self) -> &[LevelDefinition] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl TryFrom<Vec<LevelDefinition>> for LevelTable {
    type Error = LevelTableError;

    fn try_from(levels: Vec<LevelDefinition>) -> Result<Self, Self::Error> {
        Self::new(levels)
    }
}

impl From<LevelTable> for Vec<LevelDefinition> {
    fn from(table: LevelTable) -> Self {
        table.levels
    }
}

impl Default for LevelTable {
    fn default() -> Self {
        default_level_table()
    }
}

/// The built-in lunar progression track
pub fn default_level_table() -> LevelTable {
    LevelTable {
        levels: vec![
            LevelDefinition::new(0, "Stargazer", "Every journey starts with looking up", 0),
            LevelDefinition::new(1, "Moonseeker", "You have started chasing the light", 100),
            LevelDefinition::new(2, "Crescent Walker", "Small habits, steady steps", 300),
            LevelDefinition::new(3, "Tidecaller", "Your routines pull like the tide", 600),
            LevelDefinition::new(4, "Half-Moon Adept", "Halfway lit and climbing", 1_000),
            LevelDefinition::new(5, "Gibbous Sage", "Consistency has become second nature", 1_500),
            LevelDefinition::new(6, "Lunar Knight", "You guard your goals against the dark", 2_200),
            LevelDefinition::new(7, "Eclipse Warden", "Even on dim days you keep going", 3_000),
            LevelDefinition::new(8, "Starforged", "Tempered by hundreds of small wins", 4_000),
            LevelDefinition::new(9, "Moonlit Paragon", "Others look to you for guidance", 5_500),
            LevelDefinition::new(10, "Celestial Sovereign", "The full moon, at last", 7_500),
        ],
    }
}
