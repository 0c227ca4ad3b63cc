pub mod registry;
pub mod traits;

// Rate source implementations
pub mod coingecko;
pub mod er_api;
pub mod gold_api;
pub mod vang_today;
