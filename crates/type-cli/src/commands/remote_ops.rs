use std::process;

use type_engine::item::Difficulty;
use type_engine::ranking::{HttpRankingClient, RankingBoard, RankingClient};
use type_engine::source::{HttpCatalog, MemberSource, WordSource};

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

pub fn words_cmd(server: &str, category: Option<&str>, json: bool) {
    let catalog = HttpCatalog::new(server);
    let words = die!(catalog.fetch_words(category), "Error fetching words: {}");
    if json {
        let out = die!(serde_json::to_string_pretty(&words), "Error: {}");
        println!("{out}");
        return;
    }
    for w in &words {
        let reading = w.patterns().default_romanization();
        println!(
            "{}\t{}\t{}\t{}/{}/{}",
            w.text, w.reading, reading, w.weights.easy, w.weights.normal, w.weights.hard
        );
    }
    eprintln!("{} words", words.len());
}

pub fn members_cmd(server: &str) {
    let catalog = HttpCatalog::new(server);
    let members = die!(catalog.fetch_members(), "Error fetching members: {}");
    for m in &members {
        match m.nickname() {
            Some(nick) => println!("{}\t{}\t{}", m.name, m.name_reading, nick),
            None => println!("{}\t{}", m.name, m.name_reading),
        }
    }
    eprintln!("{} members", members.len());
}

pub fn ranking_cmd(server: &str, difficulty: Option<Difficulty>, limit: usize) {
    let client = HttpRankingClient::new(server);
    let board = difficulty.map_or(RankingBoard::Quiz, RankingBoard::Word);
    let rows = die!(client.top(board, Some(limit)), "Error fetching ranking: {}");
    for (i, row) in rows.iter().enumerate() {
        println!("{:>3}. {:<20} {:>8}", i + 1, row.nickname, row.score);
    }
}
