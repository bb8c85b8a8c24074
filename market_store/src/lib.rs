//! SQLite persistence and command-line driver for the daily scoring system.
//!
//! - [`config`]: TOML configuration and symbol normalization
//! - [`db`]: connections and embedded migrations
//! - [`repo`]: table reloads, the scoring join and latest-signal queries

#![warn(missing_docs)]

pub mod config;
pub mod db;
pub mod models;
pub mod repo;
pub mod schema;
