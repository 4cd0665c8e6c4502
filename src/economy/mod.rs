//! Economy systems
//!
//! Accounts, ledgers, and the engine that mutates them.

pub mod account;
pub mod ledger;
pub mod events;
pub mod error;
pub mod engine;

pub use account::{Currency, EconomyAccount, UserId};
pub use ledger::{DailyExp, ExpTransaction, LevelHistoryEntry, PurchaseRecord, TransactionType, daily_exp};
pub use events::{EconomyEvent, EventSink, HabitCompleted, LogSink, RecordingSink, TaskCompleted};
pub use error::EconomyError;
pub use engine::{CompletionReward, ConversionReceipt, EconomyEngine, ExpGrant, ExpSource, ResetOptions, SpendReceipt};
