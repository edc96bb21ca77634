pub mod api;
pub mod config;
pub mod error;
pub mod resolver;
pub mod submission;
pub mod wallet;
