//! Database utilities for connections and schema migrations.
//!
//! This module provides:
//! - [`connection::connect_sqlite`], which applies WAL, foreign_keys=ON, and a 5000ms busy_timeout.
//! - Embedded Diesel migrations: [`migrate::run_sqlite`] and [`migrate::run_all`], which
//!   accepts a bare file path or a `sqlite:` / `sqlite://` URL.
//!
//! Example:
//! ```no_run
//! use market_store::db::{connection, migrate};
//!
//! let db_path = std::env::temp_dir().join("market_store_example.db");
//! migrate::run_all(db_path.to_str().unwrap()).expect("migrations");
//!
//! let _conn = connection::connect_sqlite(db_path.to_str().unwrap()).expect("connect");
//! ```

pub mod connection;
pub mod migrate;

/// Strips an optional `sqlite://` or `sqlite:` scheme so the rest can be
/// handed to SQLite as a file path.
pub fn sqlite_path(database_url: &str) -> &str {
    database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url)
}

#[cfg(test)]
mod tests {
    use super::sqlite_path;

    #[test]
    fn scheme_is_optional() {
        assert_eq!(sqlite_path("sqlite://data/market.db"), "data/market.db");
        assert_eq!(sqlite_path("sqlite:market.db"), "market.db");
        assert_eq!(sqlite_path("/tmp/market.db"), "/tmp/market.db");
    }
}
