pub mod bulletin;
pub mod categorizer;
pub mod ingest_service;
pub mod keep_alive;
pub mod parser;
pub mod rate_service;
pub mod report_service;
