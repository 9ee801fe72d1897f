pub mod config_ops;
pub mod remote_ops;
pub mod romaji_ops;
pub mod simulate_ops;
