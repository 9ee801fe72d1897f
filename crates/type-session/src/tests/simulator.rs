use std::sync::Arc;

use type_core::clock::ManualClock;

use crate::host::ManualScheduler;
use crate::{BonusEvent, GameEvent, GameResponse, QuizGame, SoundCue, WordGame};

pub(super) trait Driven {
    fn handle(&mut self, event: GameEvent) -> GameResponse;
}

impl Driven for WordGame {
    fn handle(&mut self, event: GameEvent) -> GameResponse {
        WordGame::handle(self, event)
    }
}

impl Driven for QuizGame {
    fn handle(&mut self, event: GameEvent) -> GameResponse {
        QuizGame::handle(self, event)
    }
}

/// Headless host for integration tests.
///
/// Owns the clock and a [`ManualScheduler`], executes every timer command the
/// game emits and records the sounds and bonus events it asked for.
pub(super) struct HeadlessHost<G: Driven> {
    pub game: G,
    pub clock: Arc<ManualClock>,
    pub scheduler: ManualScheduler,
    pub sounds: Vec<SoundCue>,
    pub bonuses: Vec<BonusEvent>,
    pub finished_events: usize,
}

impl<G: Driven> HeadlessHost<G> {
    pub fn new(game: G, clock: Arc<ManualClock>) -> Self {
        Self {
            game,
            clock,
            scheduler: ManualScheduler::new(),
            sounds: Vec::new(),
            bonuses: Vec::new(),
            finished_events: 0,
        }
    }

    pub fn now(&self) -> u64 {
        use type_core::clock::Clock;
        self.clock.now_ms()
    }

    pub fn send(&mut self, event: GameEvent) -> GameResponse {
        let resp = self.game.handle(event);
        self.absorb(&resp);
        resp
    }

    fn absorb(&mut self, resp: &GameResponse) {
        let now = self.now();
        self.scheduler.apply(now, &resp.effects.timers);
        self.sounds.extend(resp.effects.sounds.iter().copied());
        self.bonuses.extend(resp.effects.bonus);
        if resp.effects.finished {
            self.finished_events += 1;
        }
    }

    /// Move the clock forward by `ms`, firing every timer that falls due on the way.
    pub fn advance(&mut self, ms: u64) {
        let target = self.now() + ms;
        while let Some(due) = self.scheduler.next_due().filter(|d| *d <= target) {
            self.clock.set(due);
            for token in self.scheduler.due(due) {
                let resp = self.game.handle(GameEvent::Tick(token));
                self.absorb(&resp);
            }
        }
        self.clock.set(target);
    }

    pub fn type_keys(&mut self, keys: &str) {
        for c in keys.chars() {
            self.send(GameEvent::Key(c));
        }
    }

    pub fn count(&self, cue: SoundCue) -> usize {
        self.sounds.iter().filter(|s| **s == cue).count()
    }
}
