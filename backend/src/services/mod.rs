pub mod ingestion;
pub mod normalizer;
pub mod price_fetcher;
pub mod price_resolver;
pub mod price_service;
pub mod price_trend;
