//! Minimal host-side scheduler for driving a game without an event loop.

use std::collections::BTreeMap;

use type_core::timer::{TimerCommand, TimerToken};

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    next_due: u64,
    interval_ms: u64,
    repeating: bool,
}

/// Applies [`TimerCommand`]s and reports which timers are due at a given time.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    timers: BTreeMap<u64, (TimerToken, Scheduled)>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, now: u64, commands: &[TimerCommand]) {
        for cmd in commands {
            match *cmd {
                TimerCommand::Start {
                    token,
                    interval_ms,
                    repeating,
                } => {
                    self.timers.insert(
                        token.generation,
                        (
                            token,
                            Scheduled {
                                next_due: now + interval_ms.max(1),
                                interval_ms: interval_ms.max(1),
                                repeating,
                            },
                        ),
                    );
                }
                TimerCommand::Cancel(token) => {
                    self.timers.remove(&token.generation);
                }
            }
        }
    }

    /// Earliest pending fire time.
    pub fn next_due(&self) -> Option<u64> {
        self.timers.values().map(|(_, s)| s.next_due).min()
    }

    /// Tokens due at or before `now`, earliest first. Repeating timers are
    /// rescheduled; one-shot timers are dropped.
    pub fn due(&mut self, now: u64) -> Vec<TimerToken> {
        let mut fired: Vec<(u64, TimerToken)> = Vec::new();
        self.timers.retain(|_, (token, s)| {
            if s.next_due > now {
                return true;
            }
            fired.push((s.next_due, *token));
            if s.repeating {
                while s.next_due <= now {
                    s.next_due += s.interval_ms;
                }
                true
            } else {
                false
            }
        });
        fired.sort_by_key(|(at, token)| (*at, token.generation));
        fired.into_iter().map(|(_, token)| token).collect()
    }

    pub fn tokens(&self) -> Vec<TimerToken> {
        self.timers.values().map(|(token, _)| *token).collect()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}
