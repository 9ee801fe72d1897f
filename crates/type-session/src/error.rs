use crate::types::GameStatus;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GameError {
    #[error("item pool is empty")]
    EmptyPool,
    #[error("pool for generation {generation} was superseded")]
    StalePool { generation: u64 },
    #[error("operation not valid while {0:?}")]
    InvalidState(GameStatus),
}
