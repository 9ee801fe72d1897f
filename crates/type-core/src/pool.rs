//! Item pools: weighted sampling and the shuffled deck a session walks through.

use fastrand::Rng;

use crate::item::{Difficulty, Member, Word};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("item pool is empty")]
    Empty,
}

/// Cumulative-weight index; each pick is one random draw plus a binary search.
#[derive(Debug, Clone)]
pub struct WeightedPool {
    cumulative: Vec<u64>,
    total: u64,
}

impl WeightedPool {
    /// Returns `None` when every weight is zero.
    pub fn new(weights: impl IntoIterator<Item = u32>) -> Option<Self> {
        let mut total = 0u64;
        let cumulative: Vec<u64> = weights
            .into_iter()
            .map(|w| {
                total += u64::from(w);
                total
            })
            .collect();
        (total > 0).then_some(Self { cumulative, total })
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Index of the picked item; zero-weight items are never returned.
    pub fn pick(&self, rng: &mut Rng) -> usize {
        let r = rng.u64(0..self.total);
        self.cumulative.partition_point(|&c| c <= r)
    }
}

/// Shuffled order of item indices with a cursor.
#[derive(Debug, Clone)]
pub struct Deck {
    order: Vec<usize>,
    cursor: usize,
}

impl Deck {
    pub fn shuffled(mut order: Vec<usize>, rng: &mut Rng) -> Result<Self, PoolError> {
        if order.is_empty() {
            return Err(PoolError::Empty);
        }
        rng.shuffle(&mut order);
        Ok(Self { order, cursor: 0 })
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Item index at the cursor; `None` once exhausted.
    pub fn current(&self) -> Option<usize> {
        self.order.get(self.cursor).copied()
    }

    /// Move to the next slot; `None` once every slot has been shown.
    pub fn advance(&mut self) -> Option<usize> {
        if self.cursor + 1 >= self.order.len() {
            self.cursor = self.order.len();
            return None;
        }
        self.cursor += 1;
        Some(self.order[self.cursor])
    }

    /// Move to the next slot, reshuffling and restarting at 0 when exhausted.
    pub fn advance_recycling(&mut self, rng: &mut Rng) -> usize {
        if self.cursor + 1 >= self.order.len() {
            rng.shuffle(&mut self.order);
            self.cursor = 0;
        } else {
            self.cursor += 1;
        }
        self.order[self.cursor]
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.order.len()
    }
}

/// Deck of word indices for `difficulty`.
///
/// Each word appears as often as its weight. When every weight is zero the
/// unweighted pool is used instead, so a non-empty word list always yields a
/// playable deck. Totals above `max_len` are sampled from a [`WeightedPool`].
pub fn build_word_deck(
    words: &[Word],
    difficulty: Difficulty,
    max_len: usize,
    rng: &mut Rng,
) -> Result<Deck, PoolError> {
    if words.is_empty() {
        return Err(PoolError::Empty);
    }

    let Some(pool) = WeightedPool::new(words.iter().map(|w| w.weights.get(difficulty))) else {
        tracing::debug!(%difficulty, words = words.len(), "all weights zero, using unweighted pool");
        return Deck::shuffled((0..words.len()).collect(), rng);
    };

    let order = if pool.total() <= max_len as u64 {
        words
            .iter()
            .enumerate()
            .flat_map(|(i, w)| std::iter::repeat(i).take(w.weights.get(difficulty) as usize))
            .collect()
    } else {
        (0..max_len.max(1)).map(|_| pool.pick(rng)).collect()
    };
    Deck::shuffled(order, rng)
}

/// Deck of member indices; each member is asked once.
pub fn build_member_deck(members: &[Member], rng: &mut Rng) -> Result<Deck, PoolError> {
    Deck::shuffled((0..members.len()).collect(), rng)
}
