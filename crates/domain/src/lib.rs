pub mod config;
pub mod error;
pub mod intent;
pub mod table;
pub mod trace;
