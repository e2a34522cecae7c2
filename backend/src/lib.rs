//! Fuel Price Backend Library
//!
//! Core functionality for the fuel price service:
//! - Fetching station price snapshots from the upstream price API
//! - Normalizing and persisting stations, prices and price history
//! - Cheapest-station and price-trend queries
//! - HTTP API over the stored data

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod reference;
pub mod schema;
pub mod services;
pub mod store;
