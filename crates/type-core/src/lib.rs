//! Building blocks for the kana typing game: romaji matching, item pools,
//! countdowns, scoring, settings and the collaborator contracts.

pub mod clock;
pub mod item;
pub mod pool;
pub mod romaji;
pub mod settings;
pub mod source;
pub mod stats;
pub mod timer;
