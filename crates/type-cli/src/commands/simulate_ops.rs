use std::fs;
use std::process;
use std::sync::Arc;

use serde::Serialize;

use type_engine::clock::{Clock, ManualClock};
use type_engine::host::ManualScheduler;
use type_engine::item::{Difficulty, Word};
use type_engine::settings::settings;
use type_engine::stats::GameResult;
use type_engine::{
    BonusEvent, GameError, GameEvent, GameResponse, GameStatus, WordGame, WordGameConfig,
};

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

/// Key sent for a deliberate mistake. Not a spelling of any kana.
const WRONG_KEY: char = '@';

#[derive(Debug, Clone, Copy)]
pub struct SimulationOptions {
    pub difficulty: Difficulty,
    /// Typing speed in keystrokes per minute.
    pub cpm: u64,
    /// Insert a wrong key before every n-th keystroke. 0 disables.
    pub miss_every: u32,
    pub seed: u64,
}

#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub difficulty: Difficulty,
    pub seed: u64,
    pub keystrokes: u64,
    pub bonuses: Vec<BonusEvent>,
    pub result: Option<GameResult>,
}

struct Driver {
    game: WordGame,
    clock: Arc<ManualClock>,
    scheduler: ManualScheduler,
    bonuses: Vec<BonusEvent>,
}

impl Driver {
    fn absorb(&mut self, resp: GameResponse) {
        let now = self.clock.now_ms();
        self.scheduler.apply(now, &resp.effects.timers);
        self.bonuses.extend(resp.effects.bonus);
    }

    /// Move the clock to `target`, firing every timer due on the way.
    fn advance_to(&mut self, target: u64) {
        while let Some(at) = self.scheduler.next_due().filter(|&at| at <= target) {
            self.clock.set(at);
            for token in self.scheduler.due(at) {
                let resp = self.game.handle(GameEvent::Tick(token));
                self.absorb(resp);
            }
        }
        self.clock.set(target);
    }

    fn playing(&self) -> bool {
        self.game.status() == GameStatus::Playing
    }
}

/// Play one word game with a scripted typist on a manual clock.
pub fn run_simulation(
    words: Vec<Word>,
    opts: SimulationOptions,
) -> Result<SimulationReport, GameError> {
    let clock = Arc::new(ManualClock::new(0));
    let mut game = WordGame::with_seed(settings().clone(), clock.clone(), opts.seed);
    let init = game.initialize(WordGameConfig::new(opts.difficulty), words)?;

    let mut driver = Driver {
        game,
        clock,
        scheduler: ManualScheduler::new(),
        bonuses: Vec::new(),
    };
    driver.absorb(init);
    let started = driver.game.start()?;
    driver.absorb(started);

    let interval = (60_000 / opts.cpm.max(1)).max(1);
    let mut keystrokes = 0u64;

    while driver.playing() {
        let target = driver.clock.now_ms() + interval;
        driver.advance_to(target);
        if !driver.playing() {
            break;
        }

        keystrokes += 1;
        let key = if opts.miss_every > 0 && keystrokes % u64::from(opts.miss_every) == 0 {
            WRONG_KEY
        } else {
            match driver.game.display().remaining.chars().next() {
                Some(c) => c,
                None => break,
            }
        };
        let resp = driver.game.handle(GameEvent::Key(key));
        driver.absorb(resp);
    }

    Ok(SimulationReport {
        difficulty: opts.difficulty,
        seed: opts.seed,
        keystrokes,
        bonuses: driver.bonuses,
        result: driver.game.result(),
    })
}

pub fn simulate_cmd(words_file: &str, opts: SimulationOptions) {
    let content = die!(fs::read_to_string(words_file), "Error reading {words_file}: {}");
    let words: Vec<Word> = die!(serde_json::from_str(&content), "Error parsing words: {}");
    let report = die!(run_simulation(words, opts), "Error: {}");
    let json = die!(serde_json::to_string_pretty(&report), "Error: {}");
    println!("{json}");
}
