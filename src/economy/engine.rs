//! Economy engine
//!
//! Orchestrates every EXP and currency mutation. Each operation runs inside a
//! single store transaction, so the account, the EXP ledger and the level
//! history always move together. Notifications go out only after the
//! transaction has committed.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use super::account::{Currency, EconomyAccount, UserId};
use super::error::EconomyError;
use super::events::{EconomyEvent, EventSink, HabitCompleted, LogSink, TaskCompleted};
use super::ledger::{daily_exp, DailyExp, ExpTransaction, LevelHistoryEntry, PurchaseRecord, TransactionType};
use crate::data::{EconomyConfig, RewardCatalog};
use crate::progression::{evaluate, AchievementDef, AchievementStats, LevelProgress, LevelResolver};
use crate::save::{EconomyStore, UserBook};

/// What earned a direct EXP grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpSource {
    Habit,
    Task,
}

impl ExpSource {
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            ExpSource::Habit => TransactionType::HabitCompleted,
            ExpSource::Task => TransactionType::TaskCompleted,
        }
    }
}

/// Result of an EXP grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpGrant {
    pub leveled_up: bool,
    pub old_level: u32,
    pub new_level: u32,
    pub total_exp: u64,
}

/// Result of converting EXP into crystals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionReceipt {
    pub exp_spent: u64,
    pub crystals_gained: u64,
    pub old_level: u32,
    pub new_level: u32,
    pub total_exp: u64,
}

/// Result of a currency spend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendReceipt {
    pub currency: Currency,
    pub amount: u64,
    pub remaining: u64,
}

/// Everything a habit or task completion paid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionReward {
    pub exp: ExpGrant,
    pub crystals: u64,
}

/// What a stats reset clears besides EXP and level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResetOptions {
    pub clear_crystals: bool,
}

/// The progression and economy engine
pub struct EconomyEngine<S: EconomyStore> {
    store: S,
    resolver: LevelResolver,
    config: EconomyConfig,
    sink: Arc<dyn EventSink>,
}

impl<S: EconomyStore> EconomyEngine<S> {
    /// Create an engine that logs its notifications
    pub fn new(store: S, resolver: LevelResolver, config: EconomyConfig) -> Self {
        Self {
            store,
            resolver,
            config,
            sink: Arc::new(LogSink),
        }
    }

    /// Route notifications to `sink` instead of the log
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn resolver(&self) -> &LevelResolver {
        &self.resolver
    }

    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Create a level 0 account with empty balances
    pub fn open_account(&self, user_id: &UserId) -> Result<EconomyAccount, EconomyError> {
        let account = self.store.create_account(user_id)?;
        log::info!("Opened economy account for {}", user_id);
        Ok(account)
    }

    /// Zero EXP and level and clear the EXP ledger and level history.
    ///
    /// Runs as one transaction: either everything is reset or nothing is.
    pub fn reset_stats(&self, user_id: &UserId, options: ResetOptions) -> Result<(), EconomyError> {
        self.run(user_id, |book, _| {
            book.account.set_exp(0, &self.resolver);
            if options.clear_crystals {
                book.account.set_balance(Currency::LunarCrystals, 0);
            }
            book.transactions.clear();
            book.level_history.clear();
            Ok(())
        })?;

        log::info!("Reset stats for {} (crystals cleared: {})", user_id, options.clear_crystals);
        Ok(())
    }

    // =========================================================================
    // EXP
    // =========================================================================

    /// Add EXP, recording the grant and any level-up
    pub fn grant_exp(
        &self,
        user_id: &UserId,
        amount: i64,
        source: ExpSource,
        description: &str,
    ) -> Result<ExpGrant, EconomyError> {
        let amount = positive(amount)?;
        let grant = self.run(user_id, |book, events| {
            self.apply_exp_gain(book, amount, source.transaction_type(), description, None, events)
        })?;

        log::debug!("Granted {} EXP to {} ({})", amount, user_id, description);
        self.log_level_up(user_id, &grant);
        Ok(grant)
    }

    /// Convert EXP into Lunar Crystals at the configured rate
    pub fn convert_exp_to_crystals(&self, user_id: &UserId, exp_amount: i64) -> Result<ConversionReceipt, EconomyError> {
        self.convert_exp_at_rate(user_id, exp_amount, self.config.conversion_rate)
    }

    /// Convert EXP into Lunar Crystals at `rate` EXP per crystal.
    ///
    /// The full `exp_amount` is deducted even when it is not a multiple of
    /// `rate`; the remainder is not refunded. The level is re-derived and may
    /// drop, in which case the drop is recorded in the level history.
    pub fn convert_exp_at_rate(
        &self,
        user_id: &UserId,
        exp_amount: i64,
        rate: u64,
    ) -> Result<ConversionReceipt, EconomyError> {
        let exp = positive(exp_amount)?;
        if rate == 0 {
            return Err(EconomyError::InvalidAmount { amount: 0 });
        }

        let receipt = self
            .run(user_id, |book, events| {
                let available = book.account.total_exp();
                if available < exp {
                    return Err(EconomyError::InsufficientExp { requested: exp, available });
                }

                let crystals_gained = exp / rate;
                let old_level = self.resolver.level_for(available);
                let total_exp = available - exp;
                let new_level = self.resolver.level_for(total_exp);
                let crystals = book
                    .account
                    .lunar_crystals()
                    .checked_add(crystals_gained)
                    .ok_or_else(|| overflow(crystals_gained))?;

                let uid = book.account.user_id().clone();
                book.account.set_exp(total_exp, &self.resolver);
                book.account.set_balance(Currency::LunarCrystals, crystals);
                book.transactions.push(
                    ExpTransaction::new(
                        &uid,
                        TransactionType::ConversionLoss,
                        -signed(exp)?,
                        format!("Converted {} EXP into {} {}", exp, crystals_gained, Currency::LunarCrystals),
                    )
                    .with_levels(old_level, new_level),
                );

                if new_level != old_level {
                    book.level_history.push(LevelHistoryEntry::new(&uid, old_level, new_level, total_exp));
                    events.push(EconomyEvent::LevelDown { user_id: uid.clone(), old_level, new_level });
                }
                if crystals_gained > 0 {
                    events.push(EconomyEvent::CurrencyEarned {
                        user_id: uid,
                        currency: Currency::LunarCrystals,
                        amount: crystals_gained,
                        reason: "EXP conversion".to_string(),
                    });
                }

                Ok(ConversionReceipt { exp_spent: exp, crystals_gained, old_level, new_level, total_exp })
            })
            .inspect_err(|e| log::warn!("EXP conversion for {} rejected: {}", user_id, e))?;

        log::info!(
            "{} converted {} EXP into {} crystals (level {} -> {})",
            user_id, receipt.exp_spent, receipt.crystals_gained, receipt.old_level, receipt.new_level
        );
        Ok(receipt)
    }

    // =========================================================================
    // Currency
    // =========================================================================

    /// Add to a currency balance, returning the new balance
    pub fn grant_currency(
        &self,
        user_id: &UserId,
        currency: Currency,
        amount: i64,
        reason: &str,
    ) -> Result<u64, EconomyError> {
        let amount = positive(amount)?;
        let balance = self.run(user_id, |book, events| {
            apply_currency_gain(book, currency, amount, reason, events)
        })?;

        log::debug!("Granted {} {} to {} ({})", amount, currency, user_id, reason);
        Ok(balance)
    }

    /// Deduct from a currency balance, never going below zero
    pub fn spend_currency(
        &self,
        user_id: &UserId,
        currency: Currency,
        amount: i64,
        purpose: &str,
    ) -> Result<SpendReceipt, EconomyError> {
        let amount = positive(amount)?;
        let receipt = self
            .run(user_id, |book, _| apply_spend(book, currency, amount))
            .inspect_err(|e| log::warn!("Spend of {} {} by {} rejected: {}", amount, currency, user_id, e))?;

        log::debug!("{} spent {} {} on {}", user_id, amount, currency, purpose);
        Ok(receipt)
    }

    /// Buy a reward from the catalog and record the purchase
    pub fn purchase_reward(
        &self,
        user_id: &UserId,
        reward_id: &str,
        catalog: &RewardCatalog,
    ) -> Result<PurchaseRecord, EconomyError> {
        let reward = catalog
            .find(reward_id)
            .ok_or_else(|| EconomyError::UnknownReward(reward_id.to_string()))?;
        let cost = nonzero(reward.cost)
            .inspect_err(|_| log::warn!("Reward {} has no cost and cannot be bought", reward_id))?;

        let record = self
            .run(user_id, |book, _| {
                apply_spend(book, reward.currency, cost)?;
                let record = PurchaseRecord::new(book.account.user_id(), &reward.id, reward.currency, reward.cost);
                book.purchases.push(record.clone());
                Ok(record)
            })
            .inspect_err(|e| log::warn!("Purchase of {} by {} rejected: {}", reward_id, user_id, e))?;

        log::info!("{} bought {} for {} {}", user_id, reward.name, reward.cost, reward.currency);
        Ok(record)
    }

    // =========================================================================
    // Event entry points
    // =========================================================================

    /// Pay out EXP and streak-scaled crystals for a habit completion
    pub fn complete_habit(&self, user_id: &UserId, event: &HabitCompleted) -> Result<CompletionReward, EconomyError> {
        let exp = nonzero(self.config.habit_exp)?;
        let crystals = self.config.habit_crystals(event.streak_length);
        let description = format!("Completed habit {}", event.habit_id);

        let reward = self.run(user_id, |book, events| {
            let grant = self.apply_exp_gain(
                book,
                exp,
                TransactionType::HabitCompleted,
                &description,
                Some(event.habit_id.clone()),
                events,
            )?;
            if crystals > 0 {
                apply_currency_gain(book, Currency::LunarCrystals, crystals, &description, events)?;
            }
            Ok(CompletionReward { exp: grant, crystals })
        })?;

        self.log_level_up(user_id, &reward.exp);
        Ok(reward)
    }

    /// Pay out EXP and crystals for a task completion
    pub fn complete_task(&self, user_id: &UserId, event: &TaskCompleted) -> Result<CompletionReward, EconomyError> {
        let exp = nonzero(self.config.task_exp)?;
        let crystals = self.config.task_crystals_base;
        let description = format!("Completed task {}", event.task_id);

        let reward = self.run(user_id, |book, events| {
            let grant = self.apply_exp_gain(
                book,
                exp,
                TransactionType::TaskCompleted,
                &description,
                Some(event.task_id.clone()),
                events,
            )?;
            if crystals > 0 {
                apply_currency_gain(book, Currency::LunarCrystals, crystals, &description, events)?;
            }
            Ok(CompletionReward { exp: grant, crystals })
        })?;

        self.log_level_up(user_id, &reward.exp);
        Ok(reward)
    }

    /// Record and reward every achievement `stats` newly satisfies.
    ///
    /// The earned set is read and updated inside the same transaction as the
    /// reward grant, so an achievement is never paid out twice.
    pub fn award_achievements(
        &self,
        user_id: &UserId,
        stats: &AchievementStats,
        defs: &[AchievementDef],
    ) -> Result<Vec<String>, EconomyError> {
        let awarded = self.run(user_id, |book, events| {
            let earned = book.earned_achievements();
            let mut awarded = Vec::new();
            for def in evaluate(stats, defs, &earned) {
                book.achievements.insert(def.id.clone(), Utc::now());
                events.push(EconomyEvent::AchievementEarned {
                    user_id: user_id.clone(),
                    achievement_id: def.id.clone(),
                    name: def.name.clone(),
                });
                if def.reward > 0 {
                    let reason = format!("Achievement: {}", def.name);
                    apply_currency_gain(book, def.reward_currency, def.reward, &reason, events)?;
                }
                awarded.push(def.id.clone());
            }
            Ok(awarded)
        })?;

        for id in &awarded {
            log::info!("{} earned achievement {}", user_id, id);
        }
        Ok(awarded)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn account(&self, user_id: &UserId) -> Result<EconomyAccount, EconomyError> {
        Ok(self.book(user_id)?.account)
    }

    pub fn level_progress(&self, user_id: &UserId) -> Result<LevelProgress, EconomyError> {
        let account = self.account(user_id)?;
        Ok(self.resolver.progress_for(account.total_exp()))
    }

    /// Most recent EXP ledger entries first
    pub fn recent_transactions(&self, user_id: &UserId, limit: usize) -> Result<Vec<ExpTransaction>, EconomyError> {
        let book = self.book(user_id)?;
        Ok(book.transactions.iter().rev().take(limit).cloned().collect())
    }

    /// Most recent level transitions first
    pub fn level_history(&self, user_id: &UserId, limit: usize) -> Result<Vec<LevelHistoryEntry>, EconomyError> {
        let book = self.book(user_id)?;
        Ok(book.level_history.iter().rev().take(limit).cloned().collect())
    }

    /// Most recent purchases first
    pub fn purchases(&self, user_id: &UserId, limit: usize) -> Result<Vec<PurchaseRecord>, EconomyError> {
        let book = self.book(user_id)?;
        Ok(book.purchases.iter().rev().take(limit).cloned().collect())
    }

    pub fn earned_achievements(&self, user_id: &UserId) -> Result<HashSet<String>, EconomyError> {
        Ok(self.book(user_id)?.earned_achievements())
    }

    /// EXP earned per day over the last `days` days, oldest first
    pub fn exp_progress_data(&self, user_id: &UserId, days: u32) -> Result<Vec<DailyExp>, EconomyError> {
        self.exp_progress_data_on(user_id, days, Utc::now().date_naive())
    }

    /// Same as [`Self::exp_progress_data`] with an explicit end date
    pub fn exp_progress_data_on(
        &self,
        user_id: &UserId,
        days: u32,
        today: NaiveDate,
    ) -> Result<Vec<DailyExp>, EconomyError> {
        let book = self.book(user_id)?;
        Ok(daily_exp(&book.transactions, days, today))
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn book(&self, user_id: &UserId) -> Result<UserBook, EconomyError> {
        self.store
            .snapshot(user_id)?
            .ok_or_else(|| EconomyError::AccountNotFound(user_id.clone()))
    }

    /// Run `f` as one store transaction and deliver its events on commit
    fn run<R, F>(&self, user_id: &UserId, f: F) -> Result<R, EconomyError>
    where
        F: FnOnce(&mut UserBook, &mut Vec<EconomyEvent>) -> Result<R, EconomyError>,
    {
        let mut events = Vec::new();
        let result = self.store.transact(user_id, |book| f(book, &mut events))?;
        for event in &events {
            self.sink.notify(event);
        }
        Ok(result)
    }

    fn log_level_up(&self, user_id: &UserId, grant: &ExpGrant) {
        if grant.leveled_up {
            let title = self.resolver.title_for_level(grant.new_level);
            log::info!("{} leveled up: {} -> {} ({})", user_id, grant.old_level, grant.new_level, title);
        }
    }

    fn apply_exp_gain(
        &self,
        book: &mut UserBook,
        amount: u64,
        kind: TransactionType,
        description: &str,
        source: Option<String>,
        events: &mut Vec<EconomyEvent>,
    ) -> Result<ExpGrant, EconomyError> {
        let uid = book.account.user_id().clone();
        let before = book.account.total_exp();
        let total_exp = before.checked_add(amount).ok_or_else(|| overflow(amount))?;
        let old_level = self.resolver.level_for(before);
        let new_level = self.resolver.level_for(total_exp);

        book.account.set_exp(total_exp, &self.resolver);
        book.transactions.push(
            ExpTransaction::new(&uid, kind, signed(amount)?, description)
                .with_source(source)
                .with_levels(old_level, new_level),
        );

        let leveled_up = new_level > old_level;
        if leveled_up {
            let title = self.resolver.title_for_level(new_level).to_string();
            book.level_history.push(LevelHistoryEntry::new(&uid, old_level, new_level, total_exp));
            book.transactions.push(
                ExpTransaction::new(
                    &uid,
                    TransactionType::LevelUp,
                    0,
                    format!("Reached level {} ({})", new_level, title),
                )
                .with_levels(old_level, new_level),
            );
            events.push(EconomyEvent::LevelUp { user_id: uid, old_level, new_level, title });
        }

        Ok(ExpGrant { leveled_up, old_level, new_level, total_exp })
    }
}

fn apply_currency_gain(
    book: &mut UserBook,
    currency: Currency,
    amount: u64,
    reason: &str,
    events: &mut Vec<EconomyEvent>,
) -> Result<u64, EconomyError> {
    let balance = book
        .account
        .balance(currency)
        .checked_add(amount)
        .ok_or_else(|| overflow(amount))?;
    book.account.set_balance(currency, balance);
    events.push(EconomyEvent::CurrencyEarned {
        user_id: book.account.user_id().clone(),
        currency,
        amount,
        reason: reason.to_string(),
    });
    Ok(balance)
}

fn apply_spend(book: &mut UserBook, currency: Currency, amount: u64) -> Result<SpendReceipt, EconomyError> {
    let available = book.account.balance(currency);
    if available < amount {
        return Err(EconomyError::InsufficientFunds { currency, required: amount, available });
    }
    let remaining = available - amount;
    book.account.set_balance(currency, remaining);
    Ok(SpendReceipt { currency, amount, remaining })
}

fn positive(amount: i64) -> Result<u64, EconomyError> {
    if amount <= 0 {
        log::warn!("Rejected non-positive amount {}", amount);
        return Err(EconomyError::InvalidAmount { amount });
    }
    Ok(amount as u64)
}

fn nonzero(amount: u64) -> Result<u64, EconomyError> {
    if amount == 0 {
        return Err(EconomyError::InvalidAmount { amount: 0 });
    }
    Ok(amount)
}

fn signed(amount: u64) -> Result<i64, EconomyError> {
    i64::try_from(amount).map_err(|_| overflow(amount))
}

fn overflow(amount: u64) -> EconomyError {
    EconomyError::InvalidAmount { amount: i64::try_from(amount).unwrap_or(i64::MAX) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::RecordingSink;
    use crate::progression::{LevelDefinition, LevelTable, RequirementType};
    use crate::save::MemoryStore;

    fn small_resolver() -> LevelResolver {
        let table = LevelTable::new(vec![
            LevelDefinition::new(0, "Novice", "", 0),
            LevelDefinition::new(1, "Adept", "", 1000),
            LevelDefinition::new(2, "Master", "", 5000),
        ])
        .unwrap();
        LevelResolver::new(table)
    }

    fn engine() -> (EconomyEngine<MemoryStore>, UserId, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        let engine = EconomyEngine::new(MemoryStore::new(), small_resolver(), EconomyConfig::default())
            .with_sink(sink.clone());
        let user = UserId::new("luna");
        engine.open_account(&user).unwrap();
        (engine, user, sink)
    }

    #[test]
    fn test_grant_without_level_up() {
        let (engine, user, sink) = engine();
        let grant = engine.grant_exp(&user, 100, ExpSource::Habit, "Read").unwrap();
        assert!(!grant.leveled_up);
        assert_eq!(grant.total_exp, 100);
        assert_eq!(engine.recent_transactions(&user, 10).unwrap().len(), 1);
        assert!(engine.level_history(&user, 10).unwrap().is_empty());
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_grant_across_two_levels_records_one_transition() {
        let (engine, user, sink) = engine();
        let grant = engine.grant_exp(&user, 6000, ExpSource::Task, "Big project").unwrap();
        assert!(grant.leveled_up);
        assert_eq!((grant.old_level, grant.new_level), (0, 2));

        let history = engine.level_history(&user, 10).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!((history[0].old_level, history[0].new_level), (0, 2));

        let txs = engine.recent_transactions(&user, 10).unwrap();
        assert_eq!(txs[0].kind, TransactionType::LevelUp);
        assert_eq!(txs[0].amount, 0);
        assert_eq!(txs[1].kind, TransactionType::TaskCompleted);

        assert!(matches!(
            sink.events().as_slice(),
            [EconomyEvent::LevelUp { new_level: 2, title, .. }] if title == "Master"
        ));
    }

    #[test]
    fn test_invalid_amounts_rejected_before_mutation() {
        let (engine, user, _) = engine();
        assert!(matches!(
            engine.grant_exp(&user, 0, ExpSource::Habit, "x"),
            Err(EconomyError::InvalidAmount { amount: 0 })
        ));
        assert!(matches!(
            engine.grant_currency(&user, Currency::Diamonds, -3, "x"),
            Err(EconomyError::InvalidAmount { amount: -3 })
        ));
        assert!(matches!(
            engine.convert_exp_at_rate(&user, 10, 0),
            Err(EconomyError::InvalidAmount { .. })
        ));
        assert!(engine.recent_transactions(&user, 10).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_account() {
        let (engine, _, _) = engine();
        let ghost = UserId::new("ghost");
        assert!(matches!(
            engine.grant_exp(&ghost, 10, ExpSource::Habit, "x"),
            Err(EconomyError::AccountNotFound(_))
        ));
        assert!(matches!(engine.account(&ghost), Err(EconomyError::AccountNotFound(_))));
    }

    #[test]
    fn test_conversion_level_down_is_recorded() {
        let (engine, user, sink) = engine();
        engine.grant_exp(&user, 1050, ExpSource::Habit, "x").unwrap();
        sink.drain();

        let receipt = engine.convert_exp_at_rate(&user, 150, 100).unwrap();
        assert_eq!(receipt.crystals_gained, 1);
        assert_eq!((receipt.old_level, receipt.new_level), (1, 0));

        let account = engine.account(&user).unwrap();
        assert_eq!(account.total_exp(), 900);
        assert_eq!(account.current_level(), 0);

        let history = engine.level_history(&user, 1).unwrap();
        assert_eq!((history[0].old_level, history[0].new_level, history[0].exp_at_level_up), (1, 0, 900));
        assert!(!history[0].is_level_up());

        let events = sink.events();
        assert!(events.iter().any(|e| matches!(e, EconomyEvent::LevelDown { new_level: 0, .. })));
    }

    #[test]
    fn test_conversion_below_rate_loses_exp() {
        let (engine, user, sink) = engine();
        engine.grant_exp(&user, 80, ExpSource::Habit, "x").unwrap();
        let receipt = engine.convert_exp_at_rate(&user, 60, 100).unwrap();
        assert_eq!(receipt.crystals_gained, 0);
        assert_eq!(engine.account(&user).unwrap().total_exp(), 20);
        assert_eq!(engine.account(&user).unwrap().lunar_crystals(), 0);
        assert!(sink.events().is_empty());

        let txs = engine.recent_transactions(&user, 1).unwrap();
        assert_eq!(txs[0].kind, TransactionType::ConversionLoss);
        assert_eq!(txs[0].amount, -60);
    }

    #[test]
    fn test_conversion_uses_configured_rate() {
        let (engine, user, _) = engine();
        engine.grant_exp(&user, 450, ExpSource::Habit, "x").unwrap();
        let receipt = engine.convert_exp_to_crystals(&user, 450).unwrap();
        assert_eq!(receipt.crystals_gained, 4);
    }

    #[test]
    fn test_purchase_reward_without_cost_is_rejected() {
        let (engine, user, _) = engine();
        let catalog = RewardCatalog {
            rewards: vec![crate::data::Reward::new("free", "Free Lunch", "", 0, Currency::LunarCrystals)],
        };

        assert!(matches!(
            engine.purchase_reward(&user, "free", &catalog),
            Err(EconomyError::InvalidAmount { amount: 0 })
        ));
        assert!(engine.purchases(&user, 10).unwrap().is_empty());
    }

    #[test]
    fn test_spend_rejects_non_positive_amounts() {
        let (engine, user, _) = engine();
        engine.grant_currency(&user, Currency::LunarCrystals, 10, "gift").unwrap();

        for amount in [0, -1] {
            assert!(matches!(
                engine.spend_currency(&user, Currency::LunarCrystals, amount, "x"),
                Err(EconomyError::InvalidAmount { .. })
            ));
        }
        assert_eq!(engine.account(&user).unwrap().lunar_crystals(), 10);
    }

    #[test]
    fn test_purchase_reward() {
        let (engine, user, _) = engine();
        let catalog = crate::data::default_reward_catalog();
        engine.grant_currency(&user, Currency::LunarCrystals, 100, "gift").unwrap();

        let record = engine.purchase_reward(&user, "moon_badge", &catalog).unwrap();
        assert_eq!(record.cost, 75);
        assert_eq!(engine.account(&user).unwrap().lunar_crystals(), 25);
        assert_eq!(engine.purchases(&user, 10).unwrap().len(), 1);

        let err = engine.purchase_reward(&user, "moon_badge", &catalog).unwrap_err();
        assert_eq!(err.shortfall(), Some(50));
        assert!(matches!(
            engine.purchase_reward(&user, "unicorn", &catalog),
            Err(EconomyError::UnknownReward(_))
        ));
        assert_eq!(engine.purchases(&user, 10).unwrap().len(), 1);
    }

    #[test]
    fn test_complete_habit_pays_streak_bonus() {
        let (engine, user, _) = engine();
        let reward = engine
            .complete_habit(&user, &HabitCompleted { habit_id: "run".to_string(), streak_length: 4 })
            .unwrap();
        assert_eq!(reward.crystals, 8);
        assert_eq!(reward.exp.total_exp, 50);

        let account = engine.account(&user).unwrap();
        assert_eq!(account.lunar_crystals(), 8);

        let txs = engine.recent_transactions(&user, 1).unwrap();
        assert_eq!(txs[0].source.as_deref(), Some("run"));
        assert_eq!(txs[0].kind, TransactionType::HabitCompleted);
    }

    #[test]
    fn test_complete_task() {
        let (engine, user, _) = engine();
        let reward = engine.complete_task(&user, &TaskCompleted { task_id: "taxes".to_string() }).unwrap();
        assert_eq!(reward.exp.total_exp, 30);
        assert_eq!(reward.crystals, 3);
        let txs = engine.recent_transactions(&user, 1).unwrap();
        assert_eq!(txs[0].kind, TransactionType::TaskCompleted);
    }

    #[test]
    fn test_award_achievements_once() {
        let (engine, user, sink) = engine();
        let defs = vec![
            AchievementDef::new("first", "First", "", RequirementType::HabitsCompleted, 1, 10),
            AchievementDef::new("streak", "Streak", "", RequirementType::MaxStreak, 3, 0),
        ];
        let stats = AchievementStats { total_completed: 1, max_streak: 3, level: 0 };

        let first = engine.award_achievements(&user, &stats, &defs).unwrap();
        assert_eq!(first, vec!["first".to_string(), "streak".to_string()]);
        assert_eq!(engine.account(&user).unwrap().lunar_crystals(), 10);

        let second = engine.award_achievements(&user, &stats, &defs).unwrap();
        assert!(second.is_empty());
        assert_eq!(engine.account(&user).unwrap().lunar_crystals(), 10);

        let earned = sink
            .events()
            .iter()
            .filter(|e| matches!(e, EconomyEvent::AchievementEarned { .. }))
            .count();
        assert_eq!(earned, 2);
    }

    #[test]
    fn test_reset_stats() {
        let (engine, user, _) = engine();
        engine.grant_exp(&user, 2000, ExpSource::Habit, "x").unwrap();
        engine.grant_currency(&user, Currency::LunarCrystals, 30, "x").unwrap();
        engine.grant_currency(&user, Currency::Diamonds, 2, "x").unwrap();

        engine.reset_stats(&user, ResetOptions::default()).unwrap();
        let account = engine.account(&user).unwrap();
        assert_eq!((account.total_exp(), account.current_level()), (0, 0));
        assert_eq!(account.lunar_crystals(), 30);
        assert!(engine.recent_transactions(&user, 10).unwrap().is_empty());
        assert!(engine.level_history(&user, 10).unwrap().is_empty());

        engine.reset_stats(&user, ResetOptions { clear_crystals: true }).unwrap();
        let account = engine.account(&user).unwrap();
        assert_eq!(account.lunar_crystals(), 0);
        assert_eq!(account.diamonds(), 2);
    }
}
