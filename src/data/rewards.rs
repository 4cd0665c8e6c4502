//! Reward catalog
//!
//! Items users can buy with their currencies.

use serde::{Deserialize, Serialize};

use crate::economy::Currency;

/// A purchasable reward
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub id: String,
    pub name: String,
    pub description: String,
    pub cost: u64,
    #[serde(default)]
    pub currency: Currency,
}

impl Reward {
    pub fn new(id: &str, name: &str, description: &str, cost: u64, currency: Currency) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            cost,
            currency,
        }
    }
}

/// Collection of rewards on offer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardCatalog {
    pub rewards: Vec<Reward>,
}

impl RewardCatalog {
    /// Find a reward by ID
    pub fn find(&self, id: &str) -> Option<&Reward> {
        self.rewards.iter().find(|r| r.id == id)
    }
}

pub fn default_reward_catalog() -> RewardCatalog {
    RewardCatalog {
        rewards: vec![
            Reward::new("night_theme", "Midnight Theme", "A deep blue dashboard theme", 40, Currency::LunarCrystals),
            Reward::new("moon_badge", "Moon Badge", "Show off a silver moon next to your name", 75, Currency::LunarCrystals),
            Reward::new("coffee_break", "Coffee Break", "Treat yourself to a coffee", 150, Currency::LunarCrystals),
            Reward::new("movie_night", "Movie Night", "An evening off with a film", 400, Currency::LunarCrystals),
            Reward::new("aurora_frame", "Aurora Frame", "Animated profile frame", 5, Currency::Diamonds),
        ],
    }
}
