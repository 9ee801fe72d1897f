use std::sync::Arc;

use type_core::clock::ManualClock;
use type_core::item::{Member, QuestionTarget};
use type_core::timer::{TimerCommand, TimerKind};

use super::simulator::HeadlessHost;
use super::{make_quiz, members, test_settings};
use crate::{GameError, GameEvent, GameStatus, QuizGame, SoundCue};

fn started(pool: Vec<Member>) -> HeadlessHost<QuizGame> {
    let (game, clock) = make_quiz(pool);
    let mut host = HeadlessHost::new(game, clock);
    assert!(host.send(GameEvent::Start).consumed);
    host
}

fn right_answer(game: &QuizGame) -> String {
    let member = game.current_member().unwrap();
    member
        .revealed_answer(game.question_target().unwrap())
        .to_string()
}

fn answer(host: &mut HeadlessHost<QuizGame>, text: &str) -> bool {
    host.send(GameEvent::Answer(text.to_string())).consumed
}

#[test]
fn test_empty_member_pool() {
    let clock = Arc::new(ManualClock::new(0));
    let mut game = QuizGame::with_seed(test_settings(), clock, 1);
    assert_eq!(game.initialize(Vec::new()).unwrap_err(), GameError::EmptyPool);
    assert_eq!(game.status(), GameStatus::Idle);
}

#[test]
fn test_start_asks_first_question() {
    let host = started(members(&["Taro", "Hanako"]));
    assert_eq!(host.game.status(), GameStatus::Playing);
    assert_eq!(host.game.question_target(), Some(QuestionTarget::Name));
    assert!(host.game.current_member().is_some());
    assert_eq!(host.game.active_timers(), 2);
    assert_eq!(host.game.display().question_time_fraction, 1.0);
}

#[test]
fn test_correct_answer_scores_and_shows_feedback() {
    let mut host = started(members(&["Taro", "Hanako"]));
    let first = host.game.current_member().unwrap().name.clone();
    let reply = right_answer(&host.game).to_uppercase();
    assert!(answer(&mut host, &format!("  {reply} ")));

    let c = host.game.counters();
    assert_eq!((c.correct, c.completed, c.combo, c.miss), (1, 1, 1, 0));
    // 150 base + full 75 time bonus.
    assert_eq!(c.score, 225);
    let feedback = host.game.feedback().unwrap();
    assert!(feedback.correct);
    assert_eq!(feedback.member_name, first);
    assert_eq!(host.count(SoundCue::Correct), 1);

    // Answers are ignored while feedback is up.
    assert!(!answer(&mut host, "anything"));
    assert_eq!(host.game.counters().miss, 0);

    host.advance(799);
    assert!(host.game.feedback().is_some());
    host.advance(1);
    assert!(host.game.feedback().is_none());
    assert_ne!(host.game.current_member().unwrap().name, first);
}

#[test]
fn test_reading_is_accepted() {
    let mut host = started(members(&["Taro"]));
    assert!(answer(&mut host, "taro-reading"));
    assert!(host.game.feedback().unwrap().correct);
}

#[test]
fn test_wrong_answer_resets_combo() {
    let mut host = started(members(&["A", "B", "C"]));
    let reply = right_answer(&host.game);
    answer(&mut host, &reply);
    host.advance(800);
    assert_eq!(host.game.combo(), 1);

    answer(&mut host, "nobody");
    let c = host.game.counters();
    assert_eq!(c.miss, 1);
    assert_eq!(c.combo, 0);
    let feedback = host.game.feedback().unwrap().clone();
    assert!(!feedback.correct);
    assert_eq!(feedback.revealed_answer, feedback.member_name);

    host.advance(1_499);
    assert!(host.game.feedback().is_some());
    host.advance(1);
    assert!(host.game.feedback().is_none());
    assert_eq!(host.game.counters().skipped, 0);
}

#[test]
fn test_empty_answer_is_wrong() {
    let mut host = started(members(&["A", "B"]));
    assert!(answer(&mut host, "   "));
    assert_eq!(host.game.counters().miss, 1);
}

#[test]
fn test_question_timeout() {
    let mut host = started(members(&["A", "B"]));
    let reply = right_answer(&host.game);
    host.advance(10_000);

    let c = host.game.counters();
    assert_eq!(c.miss, 1);
    assert_eq!(c.skipped, 0);
    let feedback = host.game.feedback().unwrap();
    assert!(!feedback.correct);
    assert_eq!(feedback.revealed_answer, reply);
    assert_eq!(host.game.display().question_time_fraction, 0.0);
    assert!(!answer(&mut host, &reply));

    host.advance(1_500);
    let c = host.game.counters();
    assert_eq!(c.skipped, 1);
    assert_eq!(c.combo, 0);
    assert!(host.game.feedback().is_none());
    assert_eq!(host.game.status(), GameStatus::Playing);
}

#[test]
fn test_exhaustion_finishes() {
    let mut host = started(members(&["A", "B"]));
    for _ in 0..2 {
        let reply = right_answer(&host.game);
        answer(&mut host, &reply);
        host.advance(800);
    }
    assert_eq!(host.game.status(), GameStatus::Finished);
    assert!(host.scheduler.is_empty());
    assert_eq!(host.finished_events, 1);
    let result = host.game.result().unwrap();
    assert_eq!(result.total_completed, 2);
    assert_eq!(result.correct_count, 2);
    assert_eq!(result.accuracy, 100.0);
    assert_eq!(result.elapsed_secs, 1.6);
}

#[test]
fn test_capped_combo_bonus() {
    let names: Vec<String> = (0..10).map(|i| format!("m{i}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let mut host = started(members(&refs));
    for _ in 0..10 {
        let reply = right_answer(&host.game);
        answer(&mut host, &reply);
        host.advance(800);
    }
    let seconds: Vec<u32> = host.bonuses.iter().map(|b| b.seconds).collect();
    assert_eq!(seconds, vec![1, 2]);
    assert_eq!(host.game.total_bonus_secs(), 3);
    assert_eq!(host.count(SoundCue::Bonus), 2);
}

#[test]
fn test_session_expiry_during_play() {
    let names: Vec<String> = (0..20).map(|i| format!("m{i}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let mut host = started(members(&refs));
    host.advance(90_000);
    assert_eq!(host.game.status(), GameStatus::Finished);
    let result = host.game.result().unwrap();
    assert_eq!(result.elapsed_secs, 90.0);
    // 11.5 s per timed-out question; the eighth is still open at 90 s.
    assert_eq!(result.skipped_count, 7);
    assert_eq!(result.miss_count, 7);
}

#[test]
fn test_feedback_timer_is_one_shot() {
    let (mut game, _) = make_quiz(members(&["A", "B"]));
    game.start().unwrap();
    let reply = right_answer(&game);
    let resp = game.submit_answer(&reply);
    let started = resp.effects.timers.iter().find_map(|c| match c {
        TimerCommand::Start {
            token, repeating, ..
        } if token.kind == TimerKind::Feedback => Some(*repeating),
        _ => None,
    });
    assert_eq!(started, Some(false));
    assert!(resp
        .effects
        .timers
        .iter()
        .any(|c| matches!(c, TimerCommand::Cancel(t) if t.kind == TimerKind::Item)));
}

#[test]
fn test_nickname_only_when_present() {
    for seed in 0..20 {
        let clock = Arc::new(ManualClock::new(0));
        let mut game = QuizGame::with_seed(test_settings(), clock, seed);
        game.initialize(members(&["Plain"])).unwrap();
        game.start().unwrap();
        assert_eq!(game.question_target(), Some(QuestionTarget::Name));
    }

    let mut seen_nickname = false;
    for seed in 0..40 {
        let clock = Arc::new(ManualClock::new(0));
        let mut game = QuizGame::with_seed(test_settings(), clock, seed);
        game.initialize(vec![Member::new("Taro", "たろう").with_nickname("Tarochan", "たろちゃん")])
            .unwrap();
        game.start().unwrap();
        if game.question_target() == Some(QuestionTarget::Nickname) {
            seen_nickname = true;
            assert!(!game.submit_answer("taro").effects.sounds.contains(&SoundCue::Correct));
            break;
        }
    }
    assert!(seen_nickname);
}

#[test]
fn test_quit_and_stale_pool() {
    let (mut game, _) = make_quiz(members(&["A"]));
    let gen_a = game.begin_initialize();
    let gen_b = game.begin_initialize();
    assert!(matches!(
        game.receive_pool(gen_a, members(&["X"])),
        Err(GameError::StalePool { .. })
    ));
    game.receive_pool(gen_b, members(&["X", "Y"])).unwrap();
    game.start().unwrap();
    assert!(game.quit().effects.finished);
    assert_eq!(game.status(), GameStatus::Finished);
    assert!(game.result().is_some());
}

#[test]
fn test_key_events_not_consumed() {
    let mut host = started(members(&["A"]));
    assert!(!host.send(GameEvent::Key('a')).consumed);
}

#[test]
fn test_answer_racing_next_question_is_not_judged() {
    let (mut game, clock) = make_quiz(members(&["Taro", "Hanako"]));
    game.start().unwrap();
    let first = game.current_member().unwrap().name.clone();
    let reply = right_answer(&game);
    assert!(game.submit_answer(&reply).consumed);

    // Feedback is over but the one-shot feedback tick has not arrived.
    clock.set(800);
    let resp = game.submit_answer(&reply);
    assert!(resp.consumed);
    assert!(resp.effects.sounds.is_empty());
    assert!(game.feedback().is_none());
    assert_ne!(game.current_member().unwrap().name, first);
    let c = game.counters();
    assert_eq!((c.correct, c.miss, c.combo), (1, 0, 1));

    let next = right_answer(&game);
    assert!(game.submit_answer(&next).consumed);
    assert_eq!(game.counters().combo, 2);
}

#[test]
fn test_answer_after_question_deadline_shows_timeout() {
    let (mut game, clock) = make_quiz(members(&["A", "B"]));
    game.start().unwrap();
    let reply = right_answer(&game);

    clock.set(10_000);
    let resp = game.submit_answer(&reply);
    assert!(resp.consumed);
    assert_eq!(resp.effects.sounds, vec![SoundCue::Miss]);
    let c = game.counters();
    assert_eq!((c.correct, c.miss), (0, 1));
    assert!(!game.feedback().unwrap().correct);
}

#[test]
fn test_quiz_threshold_ignores_custom_settings() {
    use type_core::settings::{parse_settings_toml, DEFAULT_SETTINGS_TOML};

    let custom = DEFAULT_SETTINGS_TOML.replace(
        "combo_bonus_cap_secs = 3",
        "combo_threshold = 2\ncombo_bonus_cap_secs = 3",
    );
    let settings = parse_settings_toml(&custom).unwrap();
    let clock = Arc::new(ManualClock::new(0));
    let mut game = QuizGame::with_seed(settings, clock.clone(), 11);
    game.initialize(members(&["A", "B", "C", "D"])).unwrap();
    let mut host = HeadlessHost::new(game, clock);
    host.send(GameEvent::Start);
    assert_eq!(host.game.combo_threshold(), 5);

    for _ in 0..4 {
        let reply = right_answer(&host.game);
        answer(&mut host, &reply);
        host.advance(800);
    }
    assert!(host.bonuses.is_empty());
}
