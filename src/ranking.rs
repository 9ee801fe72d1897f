//! Leaderboard payloads and the HTTP client that submits them.

use std::sync::OnceLock;

use regex::RegexSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use type_core::item::Difficulty;
use type_core::source::SourceError;
use type_core::stats::GameResult;

use crate::source::{decode, get_text, HttpCatalog};

/// Name recorded when the player leaves the nickname blank.
pub const ANONYMOUS_NICKNAME: &str = "名無し";

/// Longest nickname kept on a leaderboard, in characters.
pub const MAX_NICKNAME_CHARS: usize = 20;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NicknameError {
    #[error("nickname looks like markup, a query or a path: {0:?}")]
    Disallowed(String),
}

// SQL fragments, script/markup injection and path traversal.
const DISALLOWED_PATTERNS: &[&str] = &[
    r#"(?i)['";]\s*(OR|AND)\s+"#,
    r#"['";]\s*--"#,
    r"(?i)\b(DROP|DELETE|INSERT|UPDATE|ALTER|UNION|SELECT)\b.*\b(TABLE|FROM|INTO|SET|ALL)\b",
    r"(?i)\bOR\s+1\s*=\s*1",
    r"(?i)\bUNION\s+SELECT\b",
    r"(?i)<\s*script",
    r"(?i)<\s*img\b",
    r"(?i)\bon\w+\s*=",
    r"(?i)javascript\s*:",
    r"\.\./",
    r"\.\.\\",
];

fn disallowed() -> &'static RegexSet {
    static SET: OnceLock<RegexSet> = OnceLock::new();
    SET.get_or_init(|| RegexSet::new(DISALLOWED_PATTERNS).expect("nickname patterns compile"))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordRankingEntry {
    pub nickname: String,
    pub score: u64,
    pub difficulty: Difficulty,
    pub accuracy: f64,
    pub words_per_minute: f64,
    pub total_words: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizRankingEntry {
    pub nickname: String,
    pub score: u64,
    pub correct_count: u32,
    pub miss_count: u32,
    pub accuracy: f64,
    pub total_members: u32,
}

/// One finished game, ready to post to its leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RankingSubmission {
    Word(WordRankingEntry),
    Quiz(QuizRankingEntry),
}

impl RankingSubmission {
    pub fn word(
        nickname: &str,
        difficulty: Difficulty,
        result: &GameResult,
    ) -> Result<Self, NicknameError> {
        Ok(Self::Word(WordRankingEntry {
            nickname: normalize_nickname(nickname)?,
            score: result.score,
            difficulty,
            accuracy: result.accuracy,
            words_per_minute: result.rate_per_minute,
            total_words: result.total_completed,
        }))
    }

    pub fn quiz(nickname: &str, result: &GameResult) -> Result<Self, NicknameError> {
        Ok(Self::Quiz(QuizRankingEntry {
            nickname: normalize_nickname(nickname)?,
            score: result.score,
            correct_count: result.correct_count,
            miss_count: result.miss_count,
            accuracy: result.accuracy,
            total_members: result.total_completed,
        }))
    }

    pub fn score(&self) -> u64 {
        match self {
            Self::Word(e) => e.score,
            Self::Quiz(e) => e.score,
        }
    }

    pub fn board(&self) -> RankingBoard {
        match self {
            Self::Word(e) => RankingBoard::Word(e.difficulty),
            Self::Quiz(_) => RankingBoard::Quiz,
        }
    }
}

/// Trim, reject injection-looking input, then cap the length.
/// A blank nickname becomes [`ANONYMOUS_NICKNAME`].
pub fn normalize_nickname(nickname: &str) -> Result<String, NicknameError> {
    let trimmed = nickname.trim();
    if trimmed.is_empty() {
        return Ok(ANONYMOUS_NICKNAME.to_string());
    }
    if disallowed().is_match(trimmed) {
        warn!(nickname = trimmed, "rejected leaderboard nickname");
        return Err(NicknameError::Disallowed(trimmed.to_string()));
    }
    Ok(trimmed.chars().take(MAX_NICKNAME_CHARS).collect())
}

/// Which leaderboard to read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingBoard {
    Word(Difficulty),
    Quiz,
}

impl RankingBoard {
    fn path(&self) -> &'static str {
        match self {
            Self::Word(_) => "/api/ranking",
            Self::Quiz => "/api/lig-ranking",
        }
    }
}

/// A leaderboard row as returned by the backend. Extra fields are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RankedEntry {
    pub id: String,
    pub nickname: String,
    pub score: u64,
}

/// Stored submission and its 1-based position on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub id: String,
    pub rank: usize,
}

/// 1-based rank `score` would take on a board sorted by descending score:
/// just above the first entry it strictly beats, or last.
pub fn rank_for_score(score: u64, entries: &[RankedEntry]) -> usize {
    entries
        .iter()
        .position(|e| score > e.score)
        .map_or(entries.len() + 1, |i| i + 1)
}

pub trait RankingClient: Send + Sync {
    /// Store a submission, returning the stored row.
    fn submit(&self, submission: &RankingSubmission) -> Result<RankedEntry, SourceError>;

    /// Board rows by descending score.
    fn top(&self, board: RankingBoard, limit: Option<usize>) -> Result<Vec<RankedEntry>, SourceError>;

    /// Submit, then rank the stored row against the rest of its board.
    fn submit_and_rank(&self, submission: &RankingSubmission) -> Result<SubmitOutcome, SourceError> {
        let stored = self.submit(submission)?;
        let mut board = self.top(submission.board(), None)?;
        board.retain(|e| e.id != stored.id);
        Ok(SubmitOutcome {
            rank: rank_for_score(submission.score(), &board),
            id: stored.id,
        })
    }
}

/// Leaderboard client for the game backend.
#[derive(Debug, Clone)]
pub struct HttpRankingClient {
    catalog: HttpCatalog,
}

impl HttpRankingClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            catalog: HttpCatalog::new(base_url),
        }
    }
}

impl RankingClient for HttpRankingClient {
    fn submit(&self, submission: &RankingSubmission) -> Result<RankedEntry, SourceError> {
        let url = self.catalog.url(submission.board().path());
        let payload =
            serde_json::to_string(submission).map_err(|e| SourceError::Decode(e.to_string()))?;
        let body = ureq::post(&url)
            .header("Content-Type", "application/json")
            .send(payload)
            .map_err(|e| SourceError::Http(e.to_string()))?
            .into_body()
            .read_to_string()
            .map_err(|e| SourceError::Http(e.to_string()))?;
        let stored: RankedEntry = decode(&body)?;
        debug!(%url, id = %stored.id, "ranking submitted");
        Ok(stored)
    }

    fn top(&self, board: RankingBoard, limit: Option<usize>) -> Result<Vec<RankedEntry>, SourceError> {
        let url = self.catalog.url(board.path());
        let mut request = ureq::get(&url);
        if let RankingBoard::Word(difficulty) = board {
            request = request.query("difficulty", difficulty.as_str());
        }
        if let Some(limit) = limit {
            request = request.query("limit", limit.to_string());
        }
        decode(&get_text(request)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn entry(id: &str, score: u64) -> RankedEntry {
        RankedEntry {
            id: id.to_string(),
            nickname: "p".to_string(),
            score,
        }
    }

    fn result() -> GameResult {
        GameResult {
            score: 1200,
            correct_count: 40,
            miss_count: 10,
            total_completed: 8,
            skipped_count: 1,
            accuracy: 80.0,
            rate_per_minute: 8.0,
            elapsed_secs: 60.0,
        }
    }

    #[test]
    fn test_rank_for_score() {
        let board = vec![entry("a", 900), entry("b", 500), entry("c", 500), entry("d", 100)];
        assert_eq!(rank_for_score(1000, &board), 1);
        assert_eq!(rank_for_score(500, &board), 4);
        assert_eq!(rank_for_score(600, &board), 2);
        assert_eq!(rank_for_score(50, &board), 5);
        assert_eq!(rank_for_score(0, &[]), 1);
    }

    #[test]
    fn test_word_payload_shape() {
        let sub = RankingSubmission::word("  Aki ", Difficulty::Hard, &result()).unwrap();
        let json = serde_json::to_value(&sub).unwrap();
        assert_eq!(json["nickname"], "Aki");
        assert_eq!(json["difficulty"], "hard");
        assert_eq!(json["wordsPerMinute"], 8.0);
        assert_eq!(json["totalWords"], 8);
        assert_eq!(sub.board(), RankingBoard::Word(Difficulty::Hard));
    }

    #[test]
    fn test_quiz_payload_shape() {
        let sub = RankingSubmission::quiz("", &result()).unwrap();
        let json = serde_json::to_value(&sub).unwrap();
        assert_eq!(json["nickname"], ANONYMOUS_NICKNAME);
        assert_eq!(json["correctCount"], 40);
        assert_eq!(json["missCount"], 10);
        assert_eq!(json["totalMembers"], 8);
        assert!(json.get("difficulty").is_none());
        assert_eq!(sub.board().path(), "/api/lig-ranking");
    }

    #[test]
    fn test_nickname_capped_at_twenty_chars() {
        let long = "あいうえおかきくけこさしすせそたちつてとなにぬねの";
        let name = normalize_nickname(long).unwrap();
        assert_eq!(name.chars().count(), MAX_NICKNAME_CHARS);
        assert!(long.starts_with(&name));
        assert_eq!(normalize_nickname("   ").unwrap(), ANONYMOUS_NICKNAME);
    }

    #[test]
    fn test_injection_nicknames_rejected() {
        for bad in [
            "a' OR 1=1",
            "x'; --",
            "drop table users",
            "union select *",
            "<script>alert(1)",
            "<IMG src=x>",
            "x onerror=alert(1)",
            "JavaScript:void(0)",
            "../etc/passwd",
            r"..\windows",
        ] {
            assert!(
                matches!(normalize_nickname(bad), Err(NicknameError::Disallowed(_))),
                "accepted {bad:?}"
            );
        }
        let err = RankingSubmission::quiz("<script>", &result()).unwrap_err();
        assert_eq!(err, NicknameError::Disallowed("<script>".to_string()));
    }

    #[test]
    fn test_ordinary_nicknames_accepted() {
        for ok in ["Aki", "たろう", "O'Brien", "select", "on time", "1.5"] {
            assert_eq!(normalize_nickname(ok).unwrap(), ok);
        }
    }

    struct FakeBoard {
        rows: Mutex<Vec<RankedEntry>>,
    }

    impl RankingClient for FakeBoard {
        fn submit(&self, submission: &RankingSubmission) -> Result<RankedEntry, SourceError> {
            let mut rows = self.rows.lock().unwrap();
            let stored = entry(&format!("id{}", rows.len()), submission.score());
            rows.push(stored.clone());
            rows.sort_by(|a, b| b.score.cmp(&a.score));
            Ok(stored)
        }

        fn top(&self, _board: RankingBoard, limit: Option<usize>) -> Result<Vec<RankedEntry>, SourceError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().take(limit.unwrap_or(usize::MAX)).cloned().collect())
        }
    }

    #[test]
    fn test_submit_and_rank_excludes_own_row() {
        let client = FakeBoard {
            rows: Mutex::new(vec![entry("x", 2000), entry("y", 1200), entry("z", 300)]),
        };
        let outcome = client
            .submit_and_rank(&RankingSubmission::word("p", Difficulty::Normal, &result()).unwrap())
            .unwrap();
        assert_eq!(outcome.id, "id3");
        // Ties rank below existing equal scores.
        assert_eq!(outcome.rank, 3);
    }
}
