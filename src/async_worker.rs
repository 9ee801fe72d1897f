use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use tracing::{debug, warn};

use type_core::item::{Member, Word};
use type_core::source::{MemberSource, WordSource};
use type_session::PoolRequest;

use crate::ranking::{RankingClient, RankingSubmission, SubmitOutcome};

// ---------------------------------------------------------------------------
// Work / Result types
// ---------------------------------------------------------------------------

pub enum PoolWork {
    Words(PoolRequest),
    Members { generation: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PoolKind {
    Words,
    Members,
}

impl PoolWork {
    fn generation(&self) -> u64 {
        match self {
            Self::Words(req) => req.generation,
            Self::Members { generation } => *generation,
        }
    }

    fn kind(&self) -> PoolKind {
        match self {
            Self::Words(_) => PoolKind::Words,
            Self::Members { .. } => PoolKind::Members,
        }
    }
}

#[derive(Debug)]
pub enum PoolResult {
    Words { generation: u64, words: Vec<Word> },
    Members { generation: u64, members: Vec<Member> },
}

impl PoolResult {
    pub fn generation(&self) -> u64 {
        match self {
            Self::Words { generation, .. } | Self::Members { generation, .. } => *generation,
        }
    }
}

/// Newest requested generation for each pool kind. The word and quiz games
/// number their requests independently.
#[derive(Default)]
struct Latest {
    words: AtomicU64,
    members: AtomicU64,
}

impl Latest {
    fn slot(&self, kind: PoolKind) -> &AtomicU64 {
        match kind {
            PoolKind::Words => &self.words,
            PoolKind::Members => &self.members,
        }
    }

    fn is_current(&self, work: &PoolWork) -> bool {
        self.slot(work.kind()).load(Ordering::SeqCst) == work.generation()
    }
}

// ---------------------------------------------------------------------------
// PoolLoader
// ---------------------------------------------------------------------------

/// Fetches item pools off the game thread.
///
/// Only the most recent request of each kind is served: queued requests are
/// drained to the latest word and member request, and a result whose
/// generation was superseded while fetching is dropped. A failed fetch is
/// delivered as an empty pool.
pub struct PoolLoader {
    work_tx: mpsc::Sender<PoolWork>,
    result_rx: Mutex<mpsc::Receiver<PoolResult>>,
    latest: Arc<Latest>,
}

impl PoolLoader {
    pub fn new(
        words: Arc<dyn WordSource>,
        members: Arc<dyn MemberSource>,
    ) -> std::io::Result<Self> {
        let latest = Arc::new(Latest::default());
        let (work_tx, work_rx) = mpsc::channel::<PoolWork>();
        let (result_tx, result_rx) = mpsc::channel::<PoolResult>();
        {
            let latest = Arc::clone(&latest);
            thread::Builder::new()
                .name("type-engine-pool".into())
                .spawn(move || pool_worker(work_rx, result_tx, latest, words, members))?;
        }
        Ok(Self {
            work_tx,
            result_rx: Mutex::new(result_rx),
            latest,
        })
    }

    pub fn request(&self, work: PoolWork) {
        self.latest
            .slot(work.kind())
            .store(work.generation(), Ordering::SeqCst);
        let _ = self.work_tx.send(work);
    }

    pub fn try_recv(&self) -> Option<PoolResult> {
        let rx = self.result_rx.lock().ok()?;
        rx.try_recv().ok()
    }

    /// Block until a result arrives. Used by the CLI and tests.
    pub fn recv(&self) -> Option<PoolResult> {
        let rx = self.result_rx.lock().ok()?;
        rx.recv().ok()
    }
}

fn pool_worker(
    rx: mpsc::Receiver<PoolWork>,
    tx: mpsc::Sender<PoolResult>,
    latest: Arc<Latest>,
    words: Arc<dyn WordSource>,
    members: Arc<dyn MemberSource>,
) {
    while let Ok(first) = rx.recv() {
        // Drain: keep only the newest queued request of each kind
        let (mut word_work, mut member_work) = (None, None);
        for work in std::iter::once(first).chain(rx.try_iter()) {
            match work.kind() {
                PoolKind::Words => word_work = Some(work),
                PoolKind::Members => member_work = Some(work),
            }
        }

        for work in [word_work, member_work].into_iter().flatten() {
            if !latest.is_current(&work) {
                continue;
            }
            let (kind, generation) = (work.kind(), work.generation());
            let result = fetch(work, words.as_ref(), members.as_ref());

            // Check staleness after fetching
            if latest.slot(kind).load(Ordering::SeqCst) != generation {
                debug!(generation, "dropping superseded pool");
                continue;
            }
            let _ = tx.send(result);
        }
    }
}

fn fetch(work: PoolWork, words: &dyn WordSource, members: &dyn MemberSource) -> PoolResult {
    match work {
        PoolWork::Words(req) => {
            let generation = req.generation;
            let words = words
                .fetch_words(req.category.as_deref())
                .unwrap_or_else(|e| {
                    warn!(error = %e, generation, "word fetch failed");
                    Vec::new()
                });
            PoolResult::Words { generation, words }
        }
        PoolWork::Members { generation } => {
            let members = members.fetch_members().unwrap_or_else(|e| {
                warn!(error = %e, generation, "member fetch failed");
                Vec::new()
            });
            PoolResult::Members {
                generation,
                members,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// RankingSubmitter
// ---------------------------------------------------------------------------

/// Posts results to the leaderboard without blocking gameplay. Failures are
/// logged and dropped; successful outcomes are polled with `try_recv`.
pub struct RankingSubmitter {
    work_tx: mpsc::Sender<RankingSubmission>,
    result_rx: Mutex<mpsc::Receiver<SubmitOutcome>>,
}

impl RankingSubmitter {
    pub fn new(client: Arc<dyn RankingClient>) -> std::io::Result<Self> {
        let (work_tx, work_rx) = mpsc::channel::<RankingSubmission>();
        let (result_tx, result_rx) = mpsc::channel::<SubmitOutcome>();
        thread::Builder::new()
            .name("type-engine-ranking".into())
            .spawn(move || ranking_worker(work_rx, result_tx, client))?;
        Ok(Self {
            work_tx,
            result_rx: Mutex::new(result_rx),
        })
    }

    pub fn submit(&self, submission: RankingSubmission) {
        let _ = self.work_tx.send(submission);
    }

    pub fn try_recv(&self) -> Option<SubmitOutcome> {
        let rx = self.result_rx.lock().ok()?;
        rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<SubmitOutcome> {
        let rx = self.result_rx.lock().ok()?;
        rx.recv_timeout(timeout).ok()
    }
}

fn ranking_worker(
    rx: mpsc::Receiver<RankingSubmission>,
    tx: mpsc::Sender<SubmitOutcome>,
    client: Arc<dyn RankingClient>,
) {
    while let Ok(submission) = rx.recv() {
        match client.submit_and_rank(&submission) {
            Ok(outcome) => {
                debug!(id = %outcome.id, rank = outcome.rank, "ranking stored");
                let _ = tx.send(outcome);
            }
            Err(e) => warn!(error = %e, score = submission.score(), "ranking submission failed"),
        }
    }
}
