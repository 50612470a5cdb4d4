//! Per-user exp accrual and the level curve
//!
//! Exp lives in the document store under the per-user collection
//! `user/{id}`, key `exp`, as a plain number. Message events grant a small
//! randomized amount; `/rank` renders the result.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.4.0

use anyhow::Result;
use rand::Rng;

use crate::database::Database;

/// Document key for a user's exp inside their collection.
pub const EXP_KEY: &str = "exp";

/// Rounding applied to the random part of a grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Round {
    #[default]
    None,
    Floor,
    Ceil,
}

/// One exp grant: a fixed part plus an optionally rounded-and-divided random
/// part drawn from `[min_random, max_random)`.
#[derive(Debug, Clone, Copy)]
pub struct ExpGain {
    pub add: f64,
    pub min_random: f64,
    pub max_random: f64,
    pub round: Round,
    pub divide: f64,
}

impl Default for ExpGain {
    fn default() -> Self {
        ExpGain {
            add: 0.0,
            min_random: 0.0,
            max_random: 0.0,
            round: Round::None,
            divide: 1.0,
        }
    }
}

/// Grant applied for every (non-bot, non-banned) message: 0-4 exp.
pub const MESSAGE_GAIN: ExpGain = ExpGain {
    add: 0.0,
    min_random: 0.0,
    max_random: 10.0,
    round: Round::Floor,
    divide: 2.0,
};

impl ExpGain {
    /// Compute the grant amount using the supplied rng.
    pub fn roll<R: Rng>(&self, rng: &mut R) -> f64 {
        let mut random = 0.0;
        if self.max_random > self.min_random {
            random = rng.random_range(self.min_random..self.max_random);
            random = match self.round {
                Round::None => random,
                Round::Floor => random.floor(),
                Round::Ceil => random.ceil(),
            };
            if self.divide != 0.0 {
                random /= self.divide;
            }
        }
        self.add + random
    }
}

/// Per-user document collection name.
pub fn user_collection(user_id: u64) -> String {
    format!("user/{user_id}")
}

/// Read a user's exp, treating an absent document as 0.
pub async fn user_exp(database: &Database, user_id: u64) -> Result<f64> {
    Ok(database
        .get_one::<f64>(&user_collection(user_id), EXP_KEY)
        .await?
        .unwrap_or(0.0))
}

/// Apply a grant to a user's stored exp and return the new total.
pub async fn add_user_exp(database: &Database, user_id: u64, gain: ExpGain) -> Result<f64> {
    let current = user_exp(database, user_id).await?;
    let updated = current + gain.roll(&mut rand::rng());
    database
        .set(&user_collection(user_id), EXP_KEY, &updated)
        .await?;
    Ok(updated)
}

/// Level for a given exp total. Level `n` starts at `100 * n^2` exp.
pub fn level_for_exp(exp: f64) -> u32 {
    if exp <= 0.0 {
        0
    } else {
        (exp / 100.0).sqrt().floor() as u32
    }
}

/// Exp at which a level starts.
pub fn exp_for_level(level: u32) -> f64 {
    100.0 * f64::from(level) * f64::from(level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roll_fixed_only() {
        let gain = ExpGain { add: 5.0, ..Default::default() };
        assert_eq!(gain.roll(&mut rand::rng()), 5.0);
    }

    #[test]
    fn test_roll_random_within_bounds() {
        let gain = ExpGain {
            min_random: 2.0,
            max_random: 8.0,
            ..Default::default()
        };
        for _ in 0..100 {
            let rolled = gain.roll(&mut rand::rng());
            assert!((2.0..8.0).contains(&rolled), "rolled {rolled}");
        }
    }

    #[test]
    fn test_roll_floor_and_divide() {
        let gain = MESSAGE_GAIN;
        for _ in 0..100 {
            let rolled = gain.roll(&mut rand::rng());
            // floor(0..10) / 2 -> 0.0, 0.5, ... 4.5
            assert!((0.0..=4.5).contains(&rolled), "rolled {rolled}");
            assert_eq!((rolled * 2.0).fract(), 0.0);
        }
    }

    #[test]
    fn test_roll_ceil() {
        let gain = ExpGain {
            min_random: 0.5,
            max_random: 1.5,
            round: Round::Ceil,
            ..Default::default()
        };
        for _ in 0..50 {
            let rolled = gain.roll(&mut rand::rng());
            assert!(rolled == 1.0 || rolled == 2.0, "rolled {rolled}");
        }
    }

    #[test]
    fn test_level_curve() {
        assert_eq!(level_for_exp(0.0), 0);
        assert_eq!(level_for_exp(99.0), 0);
        assert_eq!(level_for_exp(100.0), 1);
        assert_eq!(level_for_exp(399.0), 1);
        assert_eq!(level_for_exp(400.0), 2);
        assert_eq!(level_for_exp(-5.0), 0);
    }

    #[test]
    fn test_exp_for_level_inverts_curve() {
        for level in 0..20 {
            assert_eq!(level_for_exp(exp_for_level(level)), level);
        }
    }

    #[tokio::test]
    async fn test_add_user_exp_accumulates() {
        let db = Database::in_memory().unwrap();
        let gain = ExpGain { add: 10.0, ..Default::default() };
        assert_eq!(add_user_exp(&db, 42, gain).await.unwrap(), 10.0);
        assert_eq!(add_user_exp(&db, 42, gain).await.unwrap(), 20.0);
        assert_eq!(user_exp(&db, 42).await.unwrap(), 20.0);
    }

    #[tokio::test]
    async fn test_exp_is_per_user() {
        let db = Database::in_memory().unwrap();
        let gain = ExpGain { add: 7.0, ..Default::default() };
        add_user_exp(&db, 1, gain).await.unwrap();
        assert_eq!(user_exp(&db, 2).await.unwrap(), 0.0);
    }
}
