//! Append-only ledgers
//!
//! EXP transactions, level transitions, and reward purchases. Entries are
//! created once by the engine and never edited afterwards.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::account::{Currency, UserId};

/// Kind of EXP ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    HabitCompleted,
    TaskCompleted,
    LevelUp,
    ConversionLoss,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::HabitCompleted => "habit_completed",
            TransactionType::TaskCompleted => "task_completed",
            TransactionType::LevelUp => "level_up",
            TransactionType::ConversionLoss => "conversion_loss",
        }
    }
}

/// One EXP-affecting event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpTransaction {
    pub id: Uuid,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Positive for gains, negative for deductions
    pub amount: i64,
    pub description: String,
    pub source: Option<String>,
    pub old_level: Option<u32>,
    pub new_level: Option<u32>,
}

impl ExpTransaction {
    pub fn new(user_id: &UserId, kind: TransactionType, amount: i64, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.clone(),
            created_at: Utc::now(),
            kind,
            amount,
            description: description.into(),
            source: None,
            old_level: None,
            new_level: None,
        }
    }

    pub fn with_source(mut self, source: Option<String>) -> Self {
        self.source = source;
        self
    }

    pub fn with_levels(mut self, old_level: u32, new_level: u32) -> Self {
        self.old_level = Some(old_level);
        self.new_level = Some(new_level);
        self
    }
}

/// A level transition, up or down
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelHistoryEntry {
    pub id: Uuid,
    pub user_id: UserId,
    pub old_level: u32,
    pub new_level: u32,
    /// EXP total right after the transition
    pub exp_at_level_up: u64,
    pub created_at: DateTime<Utc>,
}

impl LevelHistoryEntry {
    pub fn new(user_id: &UserId, old_level: u32, new_level: u32, exp_at_level_up: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.clone(),
            old_level,
            new_level,
            exp_at_level_up,
            created_at: Utc::now(),
        }
    }

    pub fn is_level_up(&self) -> bool {
        self.new_level > self.old_level
    }
}

/// A completed reward purchase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub id: Uuid,
    pub user_id: UserId,
    pub reward_id: String,
    pub currency: Currency,
    pub cost: u64,
    pub created_at: DateTime<Utc>,
}

impl PurchaseRecord {
    pub fn new(user_id: &UserId, reward_id: &str, currency: Currency, cost: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.clone(),
            reward_id: reward_id.to_string(),
            currency,
            cost,
            created_at: Utc::now(),
        }
    }
}

/// EXP earned on one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyExp {
    pub date: NaiveDate,
    pub exp: i64,
}

/// EXP earned per UTC day for the `days` days ending on `today`, oldest first.
///
/// Days without gains are zero-filled. Deductions (conversions) do not count
/// against the day's total.
pub fn daily_exp(transactions: &[ExpTransaction], days: u32, today: NaiveDate) -> Vec<DailyExp> {
    if days == 0 {
        return Vec::new();
    }
    let start = today
        .checked_sub_days(Days::new(u64::from(days - 1)))
        .unwrap_or(NaiveDate::MIN);

    let mut totals: HashMap<NaiveDate, i64> = HashMap::new();
    for tx in transactions.iter().filter(|tx| tx.amount > 0) {
        let date = tx.created_at.date_naive();
        if date >= start && date <= today {
            let total = totals.entry(date).or_default();
            *total = total.saturating_add(tx.amount);
        }
    }

    start
        .iter_days()
        .take_while(|date| *date <= today)
        .map(|date| DailyExp { date, exp: totals.get(&date).copied().unwrap_or(0) })
        .collect()
}
