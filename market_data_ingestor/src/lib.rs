//! Daily market data acquisition from Alpha Vantage.
//!
//! [`providers::DataProvider`] is the seam; [`providers::alpha_vantage`] is the
//! HTTP implementation and [`ingest::ingest_universe`] drives it over a
//! symbol list.

pub mod ingest;
pub mod models;
pub mod providers;
