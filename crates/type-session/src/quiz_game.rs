//! Person quiz: each member is shown once and the player answers with a
//! name or nickname. Every answer is followed by a short feedback display.

use std::sync::Arc;

use tracing::{debug, debug_span, info, warn};

use type_core::clock::Clock;
use type_core::item::{Member, QuestionTarget};
use type_core::pool::{build_member_deck, Deck};
use type_core::settings::Settings;
use type_core::stats::{item_score, ComboBonus, Counters, GameResult, Multipliers};
use type_core::timer::{Countdown, TimerKind, TimerSlots, TimerToken};

use crate::error::GameError;
use crate::types::{
    BonusEvent, GameEvent, GameResponse, GameStatus, QuizFeedback, QuizSnapshot, SideEffects,
    SoundCue, Synced,
};

/// Correct answers in a row per bonus level.
const COMBO_THRESHOLD: u32 = 5;

struct Question {
    index: usize,
    target: QuestionTarget,
    countdown: Countdown,
}

struct Feedback {
    shown: QuizFeedback,
    /// The question ran out of time; leaving feedback counts a skip.
    timed_out: bool,
    countdown: Countdown,
}

pub struct QuizGame {
    settings: Settings,
    clock: Arc<dyn Clock>,
    rng: fastrand::Rng,

    status: GameStatus,
    members: Vec<Member>,
    deck: Option<Deck>,
    question: Option<Question>,
    feedback: Option<Feedback>,

    counters: Counters,
    session: Countdown,
    timers: TimerSlots,

    generation: u64,
    pending: Option<u64>,
    result: Option<GameResult>,
}

impl QuizGame {
    pub fn new(settings: Settings, clock: Arc<dyn Clock>) -> Self {
        Self::with_rng(settings, clock, fastrand::Rng::new())
    }

    pub fn with_seed(settings: Settings, clock: Arc<dyn Clock>, seed: u64) -> Self {
        Self::with_rng(settings, clock, fastrand::Rng::with_seed(seed))
    }

    fn with_rng(settings: Settings, clock: Arc<dyn Clock>, rng: fastrand::Rng) -> Self {
        Self {
            settings,
            clock,
            rng,
            status: GameStatus::Idle,
            members: Vec::new(),
            deck: None,
            question: None,
            feedback: None,
            counters: Counters::default(),
            session: Countdown::start(0, 0),
            timers: TimerSlots::new(),
            generation: 0,
            pending: None,
            result: None,
        }
    }

    fn combo_bonus(&self) -> ComboBonus {
        ComboBonus::CappedLevel {
            threshold: COMBO_THRESHOLD,
            cap: self.settings.quiz.combo_bonus_cap_secs,
        }
    }

    pub fn initialize(&mut self, members: Vec<Member>) -> Result<GameResponse, GameError> {
        self.generation += 1;
        self.pending = None;
        self.install(members)
    }

    /// Start an asynchronous initialization; returns the generation to pass
    /// back with the fetched members.
    pub fn begin_initialize(&mut self) -> u64 {
        self.generation += 1;
        self.pending = Some(self.generation);
        self.generation
    }

    pub fn receive_pool(
        &mut self,
        generation: u64,
        members: Vec<Member>,
    ) -> Result<GameResponse, GameError> {
        if self.pending != Some(generation) {
            warn!(generation, latest = self.generation, "discarding stale member pool");
            return Err(GameError::StalePool { generation });
        }
        self.pending = None;
        self.install(members)
    }

    fn install(&mut self, members: Vec<Member>) -> Result<GameResponse, GameError> {
        let _span = debug_span!("initialize_quiz", members = members.len()).entered();

        let deck = match build_member_deck(&members, &mut self.rng) {
            Ok(deck) => deck,
            Err(_) => {
                warn!(status = ?self.status, "empty member pool, staying put");
                return Err(GameError::EmptyPool);
            }
        };

        let mut resp = GameResponse::consumed();
        self.timers.cancel_all(&mut resp.effects.timers);
        self.members = members;
        self.deck = Some(deck);
        self.question = None;
        self.feedback = None;
        self.counters = Counters::default();
        self.session = Countdown::start(0, 0);
        self.result = None;
        self.status = GameStatus::Ready;
        debug!(members = self.members.len(), "quiz ready");
        Ok(resp)
    }

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
            GameEvent::Answer(text) => self.submit_answer(&text),
            GameEvent::Tick(token) => self.tick(token),
            GameEvent::Quit => self.quit(),
            GameEvent::Key(_) => GameResponse::not_consumed(),
        }
    }

    pub fn start(&mut self) -> Result<GameResponse, GameError> {
        if self.status != GameStatus::Ready {
            return Err(GameError::InvalidState(self.status));
        }
        let first = self.deck.as_ref().and_then(Deck::current);
        let Some(first) = first else {
            return Err(GameError::EmptyPool);
        };
        let now = self.clock.now_ms();
        let mut resp = GameResponse::consumed();

        self.session = Countdown::start(now, self.settings.quiz.time_limit_secs * 1000);
        let session_tick = self.settings.timers.session_tick_ms;
        self.timers
            .start(TimerKind::Session, session_tick, true, &mut resp.effects.timers);
        self.status = GameStatus::Playing;
        self.ask(first, now, &mut resp.effects);
        Ok(resp)
    }

    fn ask(&mut self, index: usize, now: u64, effects: &mut SideEffects) {
        let target = if self.members[index].nickname().is_some() && self.rng.bool() {
            QuestionTarget::Nickname
        } else {
            QuestionTarget::Name
        };
        self.question = Some(Question {
            index,
            target,
            countdown: Countdown::start(now, self.settings.quiz.question_time_ms),
        });
        let interval = self.settings.timers.item_tick_ms;
        self.timers
            .start(TimerKind::Item, interval, true, &mut effects.timers);
        debug!(index, ?target, "question");
    }

    /// Check a submitted answer. Ignored while feedback is showing.
    pub fn submit_answer(&mut self, text: &str) -> GameResponse {
        if self.status != GameStatus::Playing {
            return GameResponse::not_consumed();
        }
        let now = self.clock.now_ms();
        let mut resp = GameResponse::consumed();
        // An answer racing a question change was meant for the old question.
        if self.sync(now, &mut resp.effects) != Synced::Steady {
            return resp;
        }
        if self.feedback.is_some() {
            return GameResponse {
                consumed: false,
                ..resp
            };
        }
        let Some(question) = self.question.as_ref() else {
            return GameResponse::not_consumed();
        };

        let member = &self.members[question.index];
        let correct = is_correct(text, member, question.target);
        let effects = &mut resp.effects;
        if correct {
            let points = item_score(
                &self.settings.scoring,
                Multipliers::from(&self.settings.quiz),
                question.countdown.remaining(now),
                question.countdown.limit_ms(),
            );
            self.counters.correct += 1;
            self.counters.completed += 1;
            self.counters.score += points;
            self.counters.combo += 1;
            effects.sounds.push(SoundCue::Correct);
            if let Some(seconds) = self.combo_bonus().seconds_for(self.counters.combo) {
                self.session.add_bonus(u64::from(seconds) * 1000);
                self.counters.total_bonus_secs += seconds;
                effects.bonus = Some(BonusEvent {
                    combo: self.counters.combo,
                    seconds,
                });
                effects.sounds.push(SoundCue::Bonus);
            }
        } else {
            self.counters.miss += 1;
            self.counters.combo = 0;
            effects.sounds.push(SoundCue::Miss);
        }
        debug!(correct, score = self.counters.score, combo = self.counters.combo, "answer");
        self.show_feedback(correct, false, now, effects);
        resp
    }

    fn show_feedback(&mut self, correct: bool, timed_out: bool, now: u64, effects: &mut SideEffects) {
        let Some(question) = self.question.as_ref() else {
            return;
        };
        let member = &self.members[question.index];
        let shown = QuizFeedback {
            correct,
            revealed_answer: member.revealed_answer(question.target).to_string(),
            member_name: member.name.clone(),
        };
        let hold_ms = if correct {
            self.settings.quiz.feedback_correct_ms
        } else {
            self.settings.quiz.feedback_wrong_ms
        };
        self.timers.cancel(TimerKind::Item, &mut effects.timers);
        self.timers
            .start(TimerKind::Feedback, hold_ms, false, &mut effects.timers);
        self.feedback = Some(Feedback {
            shown,
            timed_out,
            countdown: Countdown::start(now, hold_ms),
        });
    }

    pub fn tick(&mut self, token: TimerToken) -> GameResponse {
        if self.status != GameStatus::Playing || !self.timers.is_current(token) {
            return GameResponse::not_consumed();
        }
        let now = self.clock.now_ms();
        let mut resp = GameResponse::consumed();
        if self.sync(now, &mut resp.effects) == Synced::Finished {
            return resp;
        }
        // The one-shot feedback timer has fired; it will not fire again.
        if token.kind == TimerKind::Feedback && self.feedback.is_some() {
            self.leave_feedback(now, &mut resp.effects);
        }
        resp
    }

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
        let feedback_done = self.feedback.as_ref().is_some_and(|f| {
            f.countdown.expired(now) && f.countdown.deadline() <= session_deadline
        });
        if feedback_done && self.leave_feedback(now, effects) {
            return Synced::Finished;
        }
        let question_expired = self.feedback.is_none()
            && self.question.as_ref().is_some_and(|q| {
                q.countdown.expired(now) && q.countdown.deadline() <= session_deadline
            });
        if question_expired {
            self.counters.miss += 1;
            effects.sounds.push(SoundCue::Miss);
            debug!("question timed out");
            self.show_feedback(false, true, now, effects);
        }
        if self.session.expired(now) {
            self.finish(now, effects);
            return Synced::Finished;
        }
        if feedback_done || question_expired {
            Synced::Advanced
        } else {
            Synced::Steady
        }
    }

    /// Close the feedback and ask the next member. Returns true if that
    /// exhausted the deck and finished the game.
    fn leave_feedback(&mut self, now: u64, effects: &mut SideEffects) -> bool {
        let Some(feedback) = self.feedback.take() else {
            return false;
        };
        self.timers.cancel(TimerKind::Feedback, &mut effects.timers);
        if feedback.timed_out {
            self.counters.skipped += 1;
            self.counters.combo = 0;
        }
        let next = self.deck.as_mut().and_then(Deck::advance);
        match next {
            Some(index) => {
                self.ask(index, now, effects);
                false
            }
            None => {
                debug!("every member asked");
                self.finish(now, effects);
                true
            }
        }
    }

    fn finish(&mut self, now: u64, effects: &mut SideEffects) {
        self.timers.cancel_all(&mut effects.timers);
        self.feedback = None;
        let ended_at = now.min(self.session.deadline());
        let elapsed = ended_at.saturating_sub(self.session.started_at());
        let result = GameResult::from_counters(&self.counters, elapsed);
        info!(
            score = result.score,
            correct = result.correct_count,
            miss = result.miss_count,
            "quiz finished"
        );
        self.result = Some(result);
        self.status = GameStatus::Finished;
        effects.finished = true;
        effects.sounds.push(SoundCue::GameEnd);
    }

    pub fn display(&self) -> QuizSnapshot {
        let now = self.clock.now_ms();
        let question = self.question.as_ref().filter(|_| self.status == GameStatus::Playing);
        QuizSnapshot {
            photo_reference: question
                .map(|q| self.members[q.index].photo_reference.clone())
                .unwrap_or_default(),
            target: question.map(|q| q.target),
            question_time_fraction: match (question, &self.feedback) {
                (Some(_), Some(_)) => 0.0,
                (Some(q), None) => q.countdown.fraction(now),
                (None, _) => 1.0,
            },
            feedback: self.feedback.as_ref().map(|f| f.shown.clone()),
        }
    }

    pub fn result(&self) -> Option<GameResult> {
        self.result.clone()
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn current_member(&self) -> Option<&Member> {
        self.question.as_ref().map(|q| &self.members[q.index])
    }

    pub fn question_target(&self) -> Option<QuestionTarget> {
        self.question.as_ref().map(|q| q.target)
    }

    pub fn feedback(&self) -> Option<&QuizFeedback> {
        self.feedback.as_ref().map(|f| &f.shown)
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
        COMBO_THRESHOLD
    }

    pub fn total_bonus_secs(&self) -> u32 {
        self.counters.total_bonus_secs
    }

    pub fn session_remaining_ms(&self) -> u64 {
        match self.status {
            GameStatus::Playing => self.session.remaining(self.clock.now_ms()),
            GameStatus::Finished => 0,
            GameStatus::Idle | GameStatus::Ready => self.settings.quiz.time_limit_secs * 1000,
        }
    }

    pub fn active_timers(&self) -> usize {
        self.timers.active_count()
    }
}

fn is_correct(input: &str, member: &Member, target: QuestionTarget) -> bool {
    let normalized = input.trim().to_lowercase();
    if normalized.is_empty() {
        return false;
    }
    member
        .answers(target)
        .into_iter()
        .any(|candidate| candidate.to_lowercase() == normalized)
}
