//! Economy account
//!
//! One durable record per user: cumulative EXP, derived level, and currency balances.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::progression::LevelResolver;

/// Identifier of the user owning an account
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Spendable currencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Currency {
    #[default]
    LunarCrystals,
    Diamonds,
}

impl Currency {
    pub fn name(&self) -> &'static str {
        match self {
            Currency::LunarCrystals => "Lunar Crystals",
            Currency::Diamonds => "Diamonds",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A user's EXP and balances.
///
/// `current_level` is only ever written together with `total_exp`, so it
/// always equals the level the resolver derives from the EXP total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomyAccount {
    user_id: UserId,
    total_exp: u64,
    current_level: u32,
    lunar_crystals: u64,
    #[serde(default)]
    diamonds: u64,
    updated_at: DateTime<Utc>,
}

impl EconomyAccount {
    /// Fresh account at level 0 with empty balances
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            total_exp: 0,
            current_level: 0,
            lunar_crystals: 0,
            diamonds: 0,
            updated_at: Utc::now(),
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn total_exp(&self) -> u64 {
        self.total_exp
    }

    pub fn current_level(&self) -> u32 {
        self.current_level
    }

    pub fn lunar_crystals(&self) -> u64 {
        self.lunar_crystals
    }

    pub fn diamonds(&self) -> u64 {
        self.diamonds
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn balance(&self, currency: Currency) -> u64 {
        match currency {
            Currency::LunarCrystals => self.lunar_crystals,
            Currency::Diamonds => self.diamonds,
        }
    }

    /// Set the EXP total and re-derive the level from it
    pub(crate) fn set_exp(&mut self, total_exp: u64, resolver: &LevelResolver) {
        self.total_exp = total_exp;
        self.current_level = resolver.level_for(total_exp);
        self.touch();
    }

    pub(crate) fn set_balance(&mut self, currency: Currency, amount: u64) {
        match currency {
            Currency::LunarCrystals => self.lunar_crystals = amount,
            Currency::Diamonds => self.diamonds = amount,
        }
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
