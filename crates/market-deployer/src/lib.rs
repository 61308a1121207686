pub mod catalog;
pub mod chain;
pub mod compiler;
pub mod config;
pub mod constants;
pub mod errors;
pub mod logging;
pub mod types;
pub mod verify;
