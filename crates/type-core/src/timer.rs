//! Countdowns derived from a captured start time, and the timer handles a
//! game asks its host to schedule.

use serde::Serialize;

/// Countdown whose remaining time is recomputed from `started_at` on every
/// read, so late or skipped ticks never accumulate drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    started_at: u64,
    limit_ms: u64,
    bonus_ms: u64,
}

impl Countdown {
    pub fn start(now: u64, limit_ms: u64) -> Self {
        Self {
            started_at: now,
            limit_ms,
            bonus_ms: 0,
        }
    }

    pub fn started_at(&self) -> u64 {
        self.started_at
    }

    pub fn limit_ms(&self) -> u64 {
        self.limit_ms
    }

    pub fn bonus_ms(&self) -> u64 {
        self.bonus_ms
    }

    pub fn deadline(&self) -> u64 {
        self.started_at + self.limit_ms + self.bonus_ms
    }

    pub fn remaining(&self, now: u64) -> u64 {
        self.deadline().saturating_sub(now)
    }

    pub fn expired(&self, now: u64) -> bool {
        now >= self.deadline()
    }

    /// Remaining share of the base limit, clamped to 0..=1. A zero limit reads as full.
    pub fn fraction(&self, now: u64) -> f64 {
        if self.limit_ms == 0 {
            return 1.0;
        }
        (self.remaining(now) as f64 / self.limit_ms as f64).clamp(0.0, 1.0)
    }

    pub fn add_bonus(&mut self, ms: u64) {
        self.bonus_ms += ms;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TimerKind {
    /// Whole-session countdown.
    Session,
    /// Per word or per question countdown.
    Item,
    /// Quiz answer feedback display.
    Feedback,
}

impl TimerKind {
    fn slot(self) -> usize {
        match self {
            Self::Session => 0,
            Self::Item => 1,
            Self::Feedback => 2,
        }
    }
}

/// Handle for one scheduled timer. Ticks carrying a superseded generation are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimerToken {
    pub kind: TimerKind,
    pub generation: u64,
}

/// What the host must do with its scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TimerCommand {
    Start {
        token: TimerToken,
        interval_ms: u64,
        repeating: bool,
    },
    Cancel(TimerToken),
}

/// At most one live timer per kind.
#[derive(Debug, Default)]
pub struct TimerSlots {
    active: [Option<TimerToken>; 3],
    next_generation: u64,
}

impl TimerSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a timer of `kind`, cancelling any timer of the same kind first.
    pub fn start(
        &mut self,
        kind: TimerKind,
        interval_ms: u64,
        repeating: bool,
        out: &mut Vec<TimerCommand>,
    ) -> TimerToken {
        self.cancel(kind, out);
        self.next_generation += 1;
        let token = TimerToken {
            kind,
            generation: self.next_generation,
        };
        self.active[kind.slot()] = Some(token);
        out.push(TimerCommand::Start {
            token,
            interval_ms,
            repeating,
        });
        token
    }

    pub fn cancel(&mut self, kind: TimerKind, out: &mut Vec<TimerCommand>) {
        if let Some(old) = self.active[kind.slot()].take() {
            out.push(TimerCommand::Cancel(old));
        }
    }

    pub fn cancel_all(&mut self, out: &mut Vec<TimerCommand>) {
        for kind in [TimerKind::Session, TimerKind::Item, TimerKind::Feedback] {
            self.cancel(kind, out);
        }
    }

    pub fn is_current(&self, token: TimerToken) -> bool {
        self.active[token.kind.slot()] == Some(token)
    }

    pub fn is_active(&self, kind: TimerKind) -> bool {
        self.active[kind.slot()].is_some()
    }

    pub fn active_count(&self) -> usize {
        self.active.iter().flatten().count()
    }
}
