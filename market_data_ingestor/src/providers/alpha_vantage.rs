pub mod params;
pub mod provider;
pub mod response;

pub use params::{AlphaVantageConfig, OutputSize};
pub use provider::AlphaVantageProvider;
