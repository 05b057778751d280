// Core modules
pub mod config;
pub mod error;
pub mod execution;
pub mod indicators;
pub mod models;
pub mod persistence;
pub mod risk;
pub mod runner;
pub mod strategy;

// Re-export commonly used types
pub use config::TurtleConfig;
pub use error::TurtleError;
pub use models::*;
pub use runner::{StopReason, TurtleRunner};
pub use strategy::TurtleStrategy;

// Error handling
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
