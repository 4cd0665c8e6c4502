//! Engine inputs and outputs
//!
//! Completion events come in from the habit and task trackers; notifications
//! go out through an [`EventSink`] once an operation has been committed.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::account::{Currency, UserId};

/// A habit was checked off
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitCompleted {
    pub habit_id: String,
    /// Current streak including today's completion
    pub streak_length: u32,
}

/// A one-off task was finished
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCompleted {
    pub task_id: String,
}

/// Notification produced by a committed engine operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EconomyEvent {
    LevelUp {
        user_id: UserId,
        old_level: u32,
        new_level: u32,
        title: String,
    },
    /// Level lost through an EXP conversion
    LevelDown {
        user_id: UserId,
        old_level: u32,
        new_level: u32,
    },
    CurrencyEarned {
        user_id: UserId,
        currency: Currency,
        amount: u64,
        reason: String,
    },
    AchievementEarned {
        user_id: UserId,
        achievement_id: String,
        name: String,
    },
}

impl EconomyEvent {
    /// Short line suitable for a toast
    pub fn summary(&self) -> String {
        match self {
            EconomyEvent::LevelUp { new_level, title, .. } => {
                format!("Level up! You are now level {} ({})", new_level, title)
            }
            EconomyEvent::LevelDown { new_level, .. } => {
                format!("You dropped to level {}", new_level)
            }
            EconomyEvent::CurrencyEarned { currency, amount, reason, .. } => {
                format!("+{} {} ({})", amount, currency, reason)
            }
            EconomyEvent::AchievementEarned { name, .. } => {
                format!("Achievement unlocked: {}", name)
            }
        }
    }
}

/// Receiver for engine notifications
pub trait EventSink: Send + Sync {
    fn notify(&self, event: &EconomyEvent);
}

/// Writes every event to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn notify(&self, event: &EconomyEvent) {
        log::info!("{}", event.summary());
    }
}

/// Keeps events until drained
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<EconomyEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far
    pub fn events(&self) -> Vec<EconomyEvent> {
        self.events.lock().clone()
    }

    /// Take all recorded events, leaving the sink empty
    pub fn drain(&self) -> Vec<EconomyEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl EventSink for RecordingSink {
    fn notify(&self, event: &EconomyEvent) {
        self.events.lock().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_drain() {
        let sink = RecordingSink::new();
        sink.notify(&EconomyEvent::LevelDown { user_id: UserId::new("u"), old_level: 2, new_level: 1 });
        assert_eq!(sink.events().len(), 1);
        assert_eq!(sink.drain().len(), 1);
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_summary_text() {
        let event = EconomyEvent::CurrencyEarned {
            user_id: UserId::new("u"),
            currency: Currency::LunarCrystals,
            amount: 7,
            reason: "Morning run".to_string(),
        };
        assert_eq!(event.summary(), "+7 Lunar Crystals (Morning run)");
    }
}
