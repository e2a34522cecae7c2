//! Persistence of stations, price details and price history.
//!
//! Reads go straight through a [`PriceStore`]. Writes go through
//! [`PriceStore::transaction`], which hands a [`StoreWriter`] to a closure and
//! commits only when the closure returns `Ok`.

use std::collections::HashMap;

use crate::error::StorageError;
use crate::models::{
    HistoryPoint, HistoryRow, Municipality, PriceDetail, PriceDetailInput, PriceDetailRow, Station,
    StationInfo, StationRow,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryPriceStore;
pub use postgres::PgPriceStore;

/// Write operations available inside a transaction.
pub trait StoreWriter {
    fn upsert_municipality(&mut self, municipality: &Municipality) -> Result<(), StorageError>;

    /// Insert if the station id is unseen, otherwise overwrite every mutable field.
    fn upsert_station(&mut self, station: &StationInfo) -> Result<(), StorageError>;

    /// Insert or update keyed by (station id, fuel type id). Returns the price detail id.
    fn upsert_price_detail(
        &mut self,
        station_id: i32,
        detail: &PriceDetailInput,
    ) -> Result<i32, StorageError>;

    /// Insert unless a point with the same (price detail id, timestamp) exists.
    /// Returns whether a row was inserted. Never updates or deletes.
    fn append_history_if_new(
        &mut self,
        price_detail_id: i32,
        point: &HistoryPoint,
    ) -> Result<bool, StorageError>;
}

pub trait PriceStore: Send + Sync {
    /// Run `f` atomically: either every write it performs is kept, or none is.
    fn transaction<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&mut dyn StoreWriter) -> Result<T, StorageError>;

    /// Stations of a municipality, ordered by station id, with price details and history attached.
    fn stations_by_municipality(&self, municipality_id: i32) -> Result<Vec<Station>, StorageError>;

    fn station_by_id(&self, station_id: i32) -> Result<Option<Station>, StorageError>;

    /// Highest municipality id on record. This is not "most recently active".
    fn latest_municipality_id(&self) -> Result<Option<i32>, StorageError>;

    fn municipalities(&self) -> Result<Vec<Municipality>, StorageError>;

    fn upsert_municipality(&self, municipality: &Municipality) -> Result<(), StorageError> {
        self.transaction(|w| w.upsert_municipality(municipality))
    }

    /// Upsert a whole reference list in one transaction.
    fn seed_municipalities(&self, municipalities: &[Municipality]) -> Result<usize, StorageError> {
        self.transaction(|w| {
            for m in municipalities {
                w.upsert_municipality(m)?;
            }
            Ok(municipalities.len())
        })
    }

    fn upsert_station(&self, station: &StationInfo) -> Result<(), StorageError> {
        self.transaction(|w| w.upsert_station(station))
    }

    fn upsert_price_detail(
        &self,
        station_id: i32,
        detail: &PriceDetailInput,
    ) -> Result<i32, StorageError> {
        self.transaction(|w| w.upsert_price_detail(station_id, detail))
    }

    fn append_history_if_new(
        &self,
        price_detail_id: i32,
        point: &HistoryPoint,
    ) -> Result<bool, StorageError> {
        self.transaction(|w| w.append_history_if_new(price_detail_id, point))
    }
}

/// Attach price details and history rows to their stations.
///
/// Rows whose parent is not in the input are dropped. Input order is kept
/// at every level.
pub(crate) fn assemble_stations(
    stations: Vec<StationRow>,
    details: Vec<PriceDetailRow>,
    history: Vec<HistoryRow>,
) -> Vec<Station> {
    let mut history_by_detail: HashMap<i32, Vec<HistoryPoint>> = HashMap::new();
    for row in history {
        history_by_detail
            .entry(row.price_detail_id)
            .or_default()
            .push(HistoryPoint {
                recorded_at: row.recorded_at,
                price: row.price,
                is_higher: row.is_higher,
            });
    }

    let mut details_by_station: HashMap<i32, Vec<PriceDetail>> = HashMap::new();
    for row in details {
        let history = history_by_detail.remove(&row.id).unwrap_or_default();
        details_by_station
            .entry(row.station_id)
            .or_default()
            .push(PriceDetail {
                id: row.id,
                station_id: row.station_id,
                fuel_type_id: row.fuel_type_id,
                fuel_type_name: row.fuel_type_name,
                current_price: row.current_price,
                history,
            });
    }

    stations
        .into_iter()
        .map(|row| {
            let price_details = details_by_station.remove(&row.id).unwrap_or_default();
            Station {
                info: row.into_info(),
                price_details,
            }
        })
        .collect()
}
