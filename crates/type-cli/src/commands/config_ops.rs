use std::fs;
use std::process;

use type_engine::item::Difficulty;
use type_engine::{romaji, settings};

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

pub fn romaji_export() {
    print!("{}", romaji::default_toml());
}

pub fn romaji_validate(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    let map = die!(romaji::parse_romaji_toml(&content), "Error: {}");
    println!("OK: {} kana units", map.len());
}

pub fn settings_export() {
    print!("{}", settings::default_toml());
}

pub fn settings_validate(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    let s = die!(settings::parse_settings_toml(&content), "Error: {}");
    let limits: Vec<String> = Difficulty::ALL
        .iter()
        .map(|&d| format!("{d}={}s", s.for_difficulty(d).time_limit_secs))
        .collect();
    println!(
        "OK: {}, quiz={}s, base_score={}",
        limits.join(" "),
        s.quiz.time_limit_secs,
        s.scoring.base_score
    );
}
