//! Word-typing mode: the player types the romaji of each word before its
//! countdown runs out, for as long as the session countdown lasts.

use std::sync::Arc;

use tracing::{debug, debug_span, info, warn};

use type_core::clock::Clock;
use type_core::item::{Difficulty, Word};
use type_core::pool::{build_word_deck, Deck};
use type_core::romaji::{match_keystroke, PatternSequence};
use type_core::settings::{DifficultySettings, Settings};
use type_core::stats::{item_score, ComboBonus, Counters, GameResult, Multipliers};
use type_core::timer::{Countdown, TimerKind, TimerSlots, TimerToken};

use crate::error::GameError;
use crate::types::{
    BonusEvent, DisplaySnapshot, GameEvent, GameResponse, GameStatus, PoolRequest, SideEffects,
    SoundCue, Synced, WordGameConfig,
};

/// The word being typed.
struct ActiveWord {
    index: usize,
    patterns: PatternSequence,
    unit: usize,
    partial: String,
    typed: String,
    had_miss: bool,
    countdown: Countdown,
}

pub struct WordGame {
    settings: Settings,
    clock: Arc<dyn Clock>,
    rng: fastrand::Rng,

    status: GameStatus,
    difficulty: Difficulty,
    words: Vec<Word>,
    deck: Option<Deck>,
    current: Option<ActiveWord>,

    counters: Counters,
    session: Countdown,
    timers: TimerSlots,

    /// Bumped on every initialization; a fetched pool is applied only if its
    /// generation is still the latest.
    generation: u64,
    pending: Option<(u64, WordGameConfig)>,
    result: Option<GameResult>,
}

impl WordGame {
    pub fn new(settings: Settings, clock: Arc<dyn Clock>) -> Self {
        Self::with_rng(settings, clock, fastrand::Rng::new())
    }

    /// Deterministic shuffles, for tests and replays.
    pub fn with_seed(settings: Settings, clock: Arc<dyn Clock>, seed: u64) -> Self {
        Self::with_rng(settings, clock, fastrand::Rng::with_seed(seed))
    }

    fn with_rng(settings: Settings, clock: Arc<dyn Clock>, rng: fastrand::Rng) -> Self {
        Self {
            settings,
            clock,
            rng,
            status: GameStatus::Idle,
            difficulty: Difficulty::Normal,
            words: Vec::new(),
            deck: None,
            current: None,
            counters: Counters::default(),
            session: Countdown::start(0, 0),
            timers: TimerSlots::new(),
            generation: 0,
            pending: None,
            result: None,
        }
    }

    fn difficulty_settings(&self) -> &DifficultySettings {
        self.settings.for_difficulty(self.difficulty)
    }

    fn combo_bonus(&self) -> ComboBonus {
        let d = self.difficulty_settings();
        ComboBonus::Every {
            threshold: d.combo_threshold,
            seconds: d.combo_bonus_secs,
        }
    }

    // -----------------------------------------------------------------
    // Initialization
    // -----------------------------------------------------------------

    /// Initialize from a pool already in hand.
    ///
    /// Supersedes any outstanding [`begin_initialize`](Self::begin_initialize).
    pub fn initialize(
        &mut self,
        config: WordGameConfig,
        words: Vec<Word>,
    ) -> Result<GameResponse, GameError> {
        self.generation += 1;
        self.pending = None;
        self.install(config, words)
    }

    /// Start an asynchronous initialization. The host fetches the pool described
    /// by the returned request and hands it to [`receive_pool`](Self::receive_pool).
    pub fn begin_initialize(&mut self, config: WordGameConfig) -> PoolRequest {
        self.generation += 1;
        let request = PoolRequest {
            generation: self.generation,
            difficulty: config.difficulty,
            category: config.category.clone(),
        };
        self.pending = Some((self.generation, config));
        debug!(generation = self.generation, "pool requested");
        request
    }

    /// Apply a fetched pool. Pools from a superseded request are discarded
    /// without touching the game.
    pub fn receive_pool(
        &mut self,
        generation: u64,
        words: Vec<Word>,
    ) -> Result<GameResponse, GameError> {
        match self.pending.take() {
            Some((pending, config)) if pending == generation && generation == self.generation => {
                self.install(config, words)
            }
            other => {
                self.pending = other;
                warn!(generation, latest = self.generation, "discarding stale pool");
                Err(GameError::StalePool { generation })
            }
        }
    }

    fn install(
        &mut self,
        config: WordGameConfig,
        words: Vec<Word>,
    ) -> Result<GameResponse, GameError> {
        let _span = debug_span!("initialize", difficulty = %config.difficulty).entered();

        let words: Vec<Word> = words
            .into_iter()
            .filter(|w| !w.patterns().is_empty())
            .collect();
        let deck = match build_word_deck(
            &words,
            config.difficulty,
            self.settings.pool.max_deck_len,
            &mut self.rng,
        ) {
            Ok(deck) => deck,
            Err(_) => {
                warn!(status = ?self.status, "empty word pool, staying put");
                return Err(GameError::EmptyPool);
            }
        };

        let mut resp = GameResponse::consumed();
        self.timers.cancel_all(&mut resp.effects.timers);

        self.difficulty = config.difficulty;
        self.words = words;
        self.counters = Counters::default();
        self.result = None;
        self.session = Countdown::start(0, 0);
        self.current = None;
        let first = deck.current();
        self.deck = Some(deck);
        if let Some(index) = first {
            let now = self.clock.now_ms();
            self.load_word(index, now);
        }
        self.status = GameStatus::Ready;
        debug!(
            words = self.words.len(),
            deck = self.deck.as_ref().map_or(0, Deck::len),
            "ready"
        );
        Ok(resp)
    }

    fn load_word(&mut self, index: usize, now: u64) {
        let word = &self.words[index];
        let patterns = word.patterns();
        let limit = self
            .difficulty_settings()
            .word_time_ms(patterns.default_romanization().len());
        self.current = Some(ActiveWord {
            index,
            patterns,
            unit: 0,
            partial: String::new(),
            typed: String::new(),
            had_miss: false,
            countdown: Countdown::start(now, limit),
        });
    }

    // -----------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------

    /// Process one event and describe what the host should do.
    pub fn handle(&mut self, event: GameEvent) -> GameResponse {
        let _span = debug_span!("handle_event", ?event).entered();

        match event {
            GameEvent::Start => match self.start() {
                Ok(resp) => resp,
                Err(e) => {
                    debug!(%e, "start ignored");
                    GameResponse::not_consumed()
                }
            },
            GameEvent::Key(c) => self.submit_keystroke(c),
            GameEvent::Tick(token) => self.tick(token),
            GameEvent::Quit => self.quit(),
            GameEvent::Answer(_) => GameResponse::not_consumed(),
        }
    }

    /// Begin play. Starts the session and first word countdowns together.
    pub fn start(&mut self) -> Result<GameResponse, GameError> {
        if self.status != GameStatus::Ready {
            return Err(GameError::InvalidState(self.status));
        }
        let now = self.clock.now_ms();
        let mut resp = GameResponse::consumed();

        let limit_ms = self.difficulty_settings().time_limit_secs * 1000;
        self.session = Countdown::start(now, limit_ms);
        if let Some(word) = self.current.as_mut() {
            word.countdown = Countdown::start(now, word.countdown.limit_ms());
        }
        let (session_tick, item_tick) = (
            self.settings.timers.session_tick_ms,
            self.settings.timers.item_tick_ms,
        );
        let timers = &mut resp.effects.timers;
        self.timers.start(TimerKind::Session, session_tick, true, timers);
        self.timers.start(TimerKind::Item, item_tick, true, timers);

        self.status = GameStatus::Playing;
        debug!(limit_ms, "playing");
        Ok(resp)
    }

    pub fn submit_keystroke(&mut self, c: char) -> GameResponse {
        if self.status != GameStatus::Playing || c.is_control() {
            return GameResponse::not_consumed();
        }
        let now = self.clock.now_ms();
        let mut resp = GameResponse::consumed();
        // A key that arrives after its word ran out is spent on the skip.
        if self.sync(now, &mut resp.effects) != Synced::Steady {
            return resp;
        }

        let key = lowercase(c);
        let Some(word) = self.current.as_mut() else {
            return GameResponse::not_consumed();
        };
        let r = match_keystroke(&word.patterns, word.unit, &word.partial, key);
        if !r.matched {
            self.counters.miss += 1;
            word.had_miss = true;
            resp.effects.sounds.push(SoundCue::Miss);
            debug!(%key, unit = word.unit, "miss");
            return resp;
        }

        self.counters.correct += 1;
        word.typed.push(key);
        word.unit = r.next_unit();
        word.partial = r.partial;
        if word.unit >= word.patterns.len() {
            self.complete_word(now, &mut resp.effects);
        } else {
            resp.effects.sounds.push(SoundCue::Type);
        }
        resp
    }

    /// Handle a host timer firing. Ticks from cancelled timers are ignored.
    pub fn tick(&mut self, token: TimerToken) -> GameResponse {
        if self.status != GameStatus::Playing || !self.timers.is_current(token) {
            return GameResponse::not_consumed();
        }
        let now = self.clock.now_ms();
        let mut resp = GameResponse::consumed();
        self.sync(now, &mut resp.effects);
        resp
    }

    /// End the game now.
    pub fn quit(&mut self) -> GameResponse {
        if self.status != GameStatus::Playing {
            return GameResponse::not_consumed();
        }
        let now = self.clock.now_ms();
        let mut resp = GameResponse::consumed();
        if self.sync(now, &mut resp.effects) != Synced::Finished {
            self.finish(now, &mut resp.effects);
        }
        resp
    }

    /// Bring the countdowns up to `now`.
    fn sync(&mut self, now: u64, effects: &mut SideEffects) -> Synced {
        let session_deadline = self.session.deadline();
        let item_expired = self.current.as_ref().is_some_and(|w| {
            w.countdown.expired(now) && w.countdown.deadline() <= session_deadline
        });
        if item_expired {
            self.counters.skipped += 1;
            self.counters.combo = 0;
            debug!(skipped = self.counters.skipped, "word timed out");
            self.next_word(now, effects);
        }
        if self.session.expired(now) {
            self.finish(now, effects);
            return Synced::Finished;
        }
        if item_expired {
            Synced::Advanced
        } else {
            Synced::Steady
        }
    }

    fn complete_word(&mut self, now: u64, effects: &mut SideEffects) {
        let Some(word) = self.current.as_ref() else {
            return;
        };
        let had_miss = word.had_miss;
        let points = item_score(
            &self.settings.scoring,
            Multipliers::from(self.difficulty_settings()),
            word.countdown.remaining(now),
            word.countdown.limit_ms(),
        );
        self.counters.completed += 1;
        self.counters.score += points;
        effects.sounds.push(SoundCue::Correct);

        if had_miss {
            self.counters.combo = 0;
        } else {
            self.counters.combo += 1;
            if let Some(seconds) = self.combo_bonus().seconds_for(self.counters.combo) {
                self.session.add_bonus(u64::from(seconds) * 1000);
                self.counters.total_bonus_secs += seconds;
                effects.bonus = Some(BonusEvent {
                    combo: self.counters.combo,
                    seconds,
                });
                effects.sounds.push(SoundCue::Bonus);
                debug!(combo = self.counters.combo, seconds, "combo bonus");
            }
        }
        debug!(points, score = self.counters.score, combo = self.counters.combo, "word complete");
        self.next_word(now, effects);
    }

    /// Move to the next word, reshuffling the deck when it runs out.
    fn next_word(&mut self, now: u64, effects: &mut SideEffects) {
        let Some(deck) = self.deck.as_mut() else {
            return;
        };
        let index = deck.advance_recycling(&mut self.rng);
        self.load_word(index, now);
        let interval = self.settings.timers.item_tick_ms;
        self.timers
            .start(TimerKind::Item, interval, true, &mut effects.timers);
    }

    fn finish(&mut self, now: u64, effects: &mut SideEffects) {
        self.timers.cancel_all(&mut effects.timers);
        let ended_at = now.min(self.session.deadline());
        let elapsed = ended_at.saturating_sub(self.session.started_at());
        let result = GameResult::from_counters(&self.counters, elapsed);
        info!(
            score = result.score,
            completed = result.total_completed,
            skipped = result.skipped_count,
            accuracy = result.accuracy,
            "word game finished"
        );
        self.result = Some(result);
        self.status = GameStatus::Finished;
        effects.finished = true;
        effects.sounds.push(SoundCue::GameEnd);
    }

    // -----------------------------------------------------------------
    // Read-only view
    // -----------------------------------------------------------------

    pub fn display(&self) -> DisplaySnapshot {
        let Some(word) = self.current.as_ref() else {
            return DisplaySnapshot::default();
        };
        let item_time_fraction = match self.status {
            GameStatus::Playing => word.countdown.fraction(self.clock.now_ms()),
            GameStatus::Finished => 0.0,
            GameStatus::Idle | GameStatus::Ready => 1.0,
        };
        DisplaySnapshot {
            text: self.words[word.index].text.clone(),
            typed: word.typed.clone(),
            remaining: word.patterns.remaining_from(word.unit, &word.partial),
            item_time_fraction,
        }
    }

    /// Final statistics. `None` until the game has finished.
    pub fn result(&self) -> Option<GameResult> {
        self.result.clone()
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn current_word(&self) -> Option<&Word> {
        self.current.as_ref().map(|w| &self.words[w.index])
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    pub fn score(&self) -> u64 {
        self.counters.score
    }

    pub fn combo(&self) -> u32 {
        self.counters.combo
    }

    pub fn combo_threshold(&self) -> u32 {
        self.difficulty_settings().combo_threshold
    }

    pub fn total_bonus_secs(&self) -> u32 {
        self.counters.total_bonus_secs
    }

    pub fn session_remaining_ms(&self) -> u64 {
        match self.status {
            GameStatus::Playing => self.session.remaining(self.clock.now_ms()),
            GameStatus::Finished => 0,
            GameStatus::Idle | GameStatus::Ready => {
                self.difficulty_settings().time_limit_secs * 1000
            }
        }
    }

    pub fn item_remaining_ms(&self) -> u64 {
        let Some(word) = self.current.as_ref() else {
            return 0;
        };
        match self.status {
            GameStatus::Playing => word.countdown.remaining(self.clock.now_ms()),
            GameStatus::Finished => 0,
            GameStatus::Idle | GameStatus::Ready => word.countdown.limit_ms(),
        }
    }

    pub fn item_limit_ms(&self) -> u64 {
        self.current.as_ref().map_or(0, |w| w.countdown.limit_ms())
    }

    pub fn active_timers(&self) -> usize {
        self.timers.active_count()
    }
}

/// Single-char lowercase, leaving characters whose lowercase form expands untouched.
fn lowercase(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}
