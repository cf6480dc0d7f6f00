//! Remote sync outbox
//!
//! The engine never talks to the backend. It drops notices here and the host
//! drains them on its own schedule, retrying failures by handing the batch back
//! with `requeue`. Score notices coalesce: only the newest total is worth
//! sending. Clearing the queue starts a new generation, and batches drained
//! before that are discarded on requeue.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// One update for the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncNotice {
    Score { total_score: u64 },
    Achievement { achievement_id: String },
}

/// Notices taken out of the queue in one `drain`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncBatch {
    generation: u64,
    notices: Vec<SyncNotice>,
}

impl SyncBatch {
    pub fn notices(&self) -> &[SyncNotice] {
        &self.notices
    }

    pub fn len(&self) -> usize {
        self.notices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }
}

impl IntoIterator for SyncBatch {
    type Item = SyncNotice;
    type IntoIter = std::vec::IntoIter<SyncNotice>;

    fn into_iter(self) -> Self::IntoIter {
        self.notices.into_iter()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SyncQueue {
    generation: u64,
    pending_score: Option<u64>,
    achievements: VecDeque<String>,
}

impl SyncQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any pending score with the newer total
    pub fn push_score(&mut self, total_score: u64) {
        self.pending_score = Some(total_score);
    }

    pub fn push_achievement(&mut self, achievement_id: impl Into<String>) {
        let id = achievement_id.into();
        if !self.achievements.contains(&id) {
            self.achievements.push_back(id);
        }
    }

    /// Take everything pending: the score (if any) first, then achievements in
    /// unlock order
    pub fn drain(&mut self) -> SyncBatch {
        let mut notices = Vec::with_capacity(self.len());
        if let Some(total_score) = self.pending_score.take() {
            notices.push(SyncNotice::Score { total_score });
        }
        notices.extend(
            self.achievements
                .drain(..)
                .map(|achievement_id| SyncNotice::Achievement { achievement_id }),
        );
        SyncBatch {
            generation: self.generation,
            notices,
        }
    }

    /// Put back a batch that failed to deliver. Anything pushed since the
    /// drain is newer, so a pending score always wins over the requeued one.
    /// Batches from before the last `clear` are dropped.
    pub fn requeue(&mut self, failed: SyncBatch) {
        if failed.generation != self.generation {
            log::debug!("Dropping {} stale sync notices", failed.len());
            return;
        }

        let mut retried = VecDeque::new();
        for notice in failed {
            match notice {
                SyncNotice::Score { total_score } => {
                    self.pending_score.get_or_insert(total_score);
                }
                SyncNotice::Achievement { achievement_id } => {
                    let queued = retried.contains(&achievement_id)
                        || self.achievements.contains(&achievement_id);
                    if !queued {
                        retried.push_back(achievement_id);
                    }
                }
            }
        }
        // Retries go ahead of anything queued since
        retried.append(&mut self.achievements);
        self.achievements = retried;
        log::debug!("Requeued sync notices, {} pending", self.len());
    }

    /// Drop everything pending and invalidate batches already drained
    pub fn clear(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.pending_score = None;
        self.achievements.clear();
    }

    pub fn len(&self) -> usize {
        self.pending_score.iter().count() + self.achievements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
