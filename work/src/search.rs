//! Resumable nonce search (single-threaded, single candidate stream).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use notary_types::Digest;

use crate::{Difficulty, WorkError};

/// Attempts between checks of the cancellation flag.
const BATCH_SIZE: u64 = 4096;

/// A nonce whose hash meets the difficulty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Solution {
    pub nonce: u64,
    pub hash: Digest,
    /// Hash evaluations spent by this search, across resumptions.
    pub attempts: u64,
}

/// Result of a bounded [`NonceSearch::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchStep {
    Found(Solution),
    /// Budget spent without a solution; `next_nonce` is where to resume.
    Pending { next_nonce: u64 },
}

/// Limits applied to a search run.
#[derive(Clone, Debug, Default)]
pub struct SearchControl {
    /// Maximum hash evaluations for this run. `None` means unbounded.
    pub budget: Option<u64>,
    /// Cooperative cancellation flag, polled every batch.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl SearchControl {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_budget(mut self, budget: u64) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Walks nonces upward from a starting point until `hash_at(nonce)` meets
/// the difficulty.
///
/// The search holds no reference to the thing being hashed; callers pass a
/// closure mapping a nonce to the candidate hash. Stopping and resuming at
/// `next_nonce` visits exactly the same nonces as one uninterrupted run.
#[derive(Clone, Debug)]
pub struct NonceSearch {
    difficulty: Difficulty,
    next_nonce: u64,
    attempts: u64,
    exhausted: bool,
}

impl NonceSearch {
    /// Start a search at nonce 0.
    pub fn new(difficulty: Difficulty) -> Self {
        Self::resume_from(difficulty, 0)
    }

    /// Continue a search from a previously reported `next_nonce`.
    pub fn resume_from(difficulty: Difficulty, next_nonce: u64) -> Self {
        Self {
            difficulty,
            next_nonce,
            attempts: 0,
            exhausted: false,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn next_nonce(&self) -> u64 {
        self.next_nonce
    }

    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Evaluate at most `budget` nonces.
    pub fn step<F>(&mut self, mut hash_at: F, budget: u64) -> Result<SearchStep, WorkError>
    where
        F: FnMut(u64) -> Digest,
    {
        for _ in 0..budget {
            if self.exhausted {
                return Err(WorkError::NonceSpaceExhausted);
            }
            let nonce = self.next_nonce;
            let hash = hash_at(nonce);
            self.attempts += 1;
            if self.difficulty.is_met_by(&hash) {
                return Ok(SearchStep::Found(Solution {
                    nonce,
                    hash,
                    attempts: self.attempts,
                }));
            }
            match nonce.checked_add(1) {
                Some(next) => self.next_nonce = next,
                None => self.exhausted = true,
            }
        }
        Ok(SearchStep::Pending {
            next_nonce: self.next_nonce,
        })
    }

    /// Run until a solution is found or `control` stops the search.
    pub fn run<F>(&mut self, mut hash_at: F, control: &SearchControl) -> Result<Solution, WorkError>
    where
        F: FnMut(u64) -> Digest,
    {
        let mut remaining = control.budget;
        loop {
            if control.is_cancelled() {
                tracing::debug!(next_nonce = self.next_nonce, "nonce search cancelled");
                return Err(WorkError::Cancelled {
                    next_nonce: self.next_nonce,
                });
            }
            let batch = match remaining {
                Some(0) => {
                    return Err(WorkError::BudgetExhausted {
                        next_nonce: self.next_nonce,
                    })
                }
                Some(left) => left.min(BATCH_SIZE),
                None => BATCH_SIZE,
            };
            if let SearchStep::Found(solution) = self.step(&mut hash_at, batch)? {
                return Ok(solution);
            }
            if let Some(left) = remaining.as_mut() {
                *left -= batch;
            }
            tracing::trace!(next_nonce = self.next_nonce, attempts = self.attempts, "nonce search progress");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Stand-in hash that only meets difficulty at `target`.
    fn fake_hash(target: u64) -> impl FnMut(u64) -> Digest {
        move |nonce| {
            if nonce == target {
                Digest::ZERO
            } else {
                Digest::new([0xFF; 32])
            }
        }
    }

    #[test]
    fn finds_first_matching_nonce() {
        let mut search = NonceSearch::new(Difficulty::new(4));
        let solution = search.run(fake_hash(37), &SearchControl::unbounded()).unwrap();
        assert_eq!(solution.nonce, 37);
        assert_eq!(solution.attempts, 38);
        assert!(solution.hash.is_zero());
    }

    #[test]
    fn nonce_zero_is_checked_first() {
        let mut search = NonceSearch::new(Difficulty::new(4));
        let step = search.step(fake_hash(0), 1).unwrap();
        assert!(matches!(step, SearchStep::Found(Solution { nonce: 0, .. })));
    }

    #[test]
    fn zero_difficulty_accepts_first_nonce() {
        let mut search = NonceSearch::new(Difficulty::new(0));
        let solution = search
            .run(|_| Digest::new([0xFF; 32]), &SearchControl::unbounded())
            .unwrap();
        assert_eq!(solution.nonce, 0);
    }

    #[test]
    fn step_reports_resume_point() {
        let mut search = NonceSearch::new(Difficulty::new(4));
        let step = search.step(fake_hash(100), 10).unwrap();
        assert_eq!(step, SearchStep::Pending { next_nonce: 10 });
        assert_eq!(search.attempts(), 10);
    }

    #[test]
    fn budget_exhaustion_then_resume() {
        let mut search = NonceSearch::new(Difficulty::new(4));
        let control = SearchControl::unbounded().with_budget(5000);
        let err = search.run(fake_hash(9000), &control).unwrap_err();
        assert_eq!(err, WorkError::BudgetExhausted { next_nonce: 5000 });

        let mut resumed = NonceSearch::resume_from(Difficulty::new(4), 5000);
        let solution = resumed.run(fake_hash(9000), &control).unwrap();
        assert_eq!(solution.nonce, 9000);
    }

    #[test]
    fn cancelled_before_start() {
        let flag = Arc::new(AtomicBool::new(true));
        let mut search = NonceSearch::new(Difficulty::new(4));
        let control = SearchControl::unbounded().with_cancel(flag);
        let err = search.run(fake_hash(1), &control).unwrap_err();
        assert_eq!(err, WorkError::Cancelled { next_nonce: 0 });
    }

    #[test]
    fn nonce_space_exhaustion_is_reported() {
        let mut search = NonceSearch::resume_from(Difficulty::new(4), u64::MAX);
        let err = search
            .run(|_| Digest::new([0xFF; 32]), &SearchControl::unbounded())
            .unwrap_err();
        assert_eq!(err, WorkError::NonceSpaceExhausted);
    }
}
