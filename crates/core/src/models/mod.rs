pub mod rates;
pub mod report;
pub mod settings;
pub mod transaction;
