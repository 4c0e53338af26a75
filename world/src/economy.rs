//! Gold, lives and best-wave ledger.

use pathguard_core::EconomySnapshot;

/// Player resources. Every operation saturates instead of underflowing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Economy {
    gold: u32,
    lives: u32,
    best_wave: u32,
}

impl Economy {
    /// Creates a ledger with the level's starting resources and a persisted best wave.
    #[must_use]
    pub fn new(gold: u32, lives: u32, best_wave: u32) -> Self {
        Self {
            gold,
            lives,
            best_wave,
        }
    }

    /// Reports whether `cost` can be paid.
    #[must_use]
    pub fn can_afford(&self, cost: u32) -> bool {
        self.gold >= cost
    }

    /// Removes `cost` gold, stopping at zero.
    pub fn spend(&mut self, cost: u32) {
        self.gold = self.gold.saturating_sub(cost);
    }

    /// Adds `amount` gold.
    pub fn earn(&mut self, amount: u32) {
        self.gold = self.gold.saturating_add(amount);
    }

    /// Removes one life, stopping at zero.
    pub fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
    }

    /// Records `wave` as reached; returns `true` when it beats the previous best.
    pub fn record_wave(&mut self, wave: u32) -> bool {
        if wave <= self.best_wave {
            return false;
        }
        self.best_wave = wave;
        true
    }

    /// Reports whether no lives are left.
    #[must_use]
    pub fn is_bankrupt(&self) -> bool {
        self.lives == 0
    }

    /// Gold available.
    #[must_use]
    pub fn gold(&self) -> u32 {
        self.gold
    }

    /// Lives left.
    #[must_use]
    pub fn lives(&self) -> u32 {
        self.lives
    }

    /// Highest one-based wave number reached.
    #[must_use]
    pub fn best_wave(&self) -> u32 {
        self.best_wave
    }

    /// Copies the ledger into a read-only snapshot.
    #[must_use]
    pub fn snapshot(&self) -> EconomySnapshot {
        EconomySnapshot {
            gold: self.gold,
            lives: self.lives,
            best_wave: self.best_wave,
        }
    }
}
