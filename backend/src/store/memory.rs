//! In-process [`PriceStore`]. Transactions stage writes on a copy of the
//! state and swap it in on success.

use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::{NaiveDateTime, Utc};

use super::{assemble_stations, PriceStore, StoreWriter};
use crate::error::StorageError;
use crate::models::{
    HistoryPoint, HistoryRow, Municipality, PriceDetailInput, PriceDetailRow, Station,
    StationInfo, StationRow,
};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    municipalities: BTreeMap<i32, Municipality>,
    stations: BTreeMap<i32, StationRow>,
    details: Vec<PriceDetailRow>,
    history: Vec<HistoryRow>,
    next_detail_id: i32,
    next_history_id: i32,
}

impl MemoryState {
    fn stations_where<P>(&self, predicate: P) -> Vec<Station>
    where
        P: Fn(&StationRow) -> bool,
    {
        let stations: Vec<StationRow> = self
            .stations
            .values()
            .filter(|row| predicate(row))
            .cloned()
            .collect();

        assemble_stations(stations, self.details.clone(), self.history.clone())
    }
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

impl StoreWriter for MemoryState {
    fn upsert_municipality(&mut self, municipality: &Municipality) -> Result<(), StorageError> {
        self.municipalities
            .insert(municipality.id, municipality.clone());
        Ok(())
    }

    fn upsert_station(&mut self, station: &StationInfo) -> Result<(), StorageError> {
        self.stations
            .insert(station.id, StationRow::from_info(station, now()));
        Ok(())
    }

    fn upsert_price_detail(
        &mut self,
        station_id: i32,
        detail: &PriceDetailInput,
    ) -> Result<i32, StorageError> {
        if !self.stations.contains_key(&station_id) {
            return Err(StorageError::Constraint(format!(
                "price detail references unknown station {}",
                station_id
            )));
        }

        if let Some(existing) = self
            .details
            .iter_mut()
            .find(|d| d.station_id == station_id && d.fuel_type_id == detail.fuel_type_id)
        {
            existing.fuel_type_name = detail.fuel_type_name.clone();
            existing.current_price = detail.current_price;
            existing.updated_at = now();
            return Ok(existing.id);
        }

        self.next_detail_id += 1;
        let id = self.next_detail_id;
        self.details.push(PriceDetailRow {
            id,
            station_id,
            fuel_type_id: detail.fuel_type_id,
            fuel_type_name: detail.fuel_type_name.clone(),
            current_price: detail.current_price,
            updated_at: now(),
        });
        Ok(id)
    }

    fn append_history_if_new(
        &mut self,
        price_detail_id: i32,
        point: &HistoryPoint,
    ) -> Result<bool, StorageError> {
        if !self.details.iter().any(|d| d.id == price_detail_id) {
            return Err(StorageError::Constraint(format!(
                "history point references unknown price detail {}",
                price_detail_id
            )));
        }

        let exists = self
            .history
            .iter()
            .any(|h| h.price_detail_id == price_detail_id && h.recorded_at == point.recorded_at);
        if exists {
            return Ok(false);
        }

        self.next_history_id += 1;
        self.history.push(HistoryRow {
            id: self.next_history_id,
            price_detail_id,
            recorded_at: point.recorded_at.clone(),
            price: point.price,
            is_higher: point.is_higher,
            created_at: now(),
        });
        Ok(true)
    }
}

#[derive(Debug, Default)]
pub struct MemoryPriceStore {
    state: RwLock<MemoryState>,
}

impl MemoryPriceStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> StorageError {
        StorageError::Unavailable("memory store lock poisoned".to_string())
    }
}

impl PriceStore for MemoryPriceStore {
    fn transaction<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&mut dyn StoreWriter) -> Result<T, StorageError>,
    {
        let mut state = self.state.write().map_err(|_| Self::poisoned())?;
        let mut staged = state.clone();
        let result = f(&mut staged)?;
        *state = staged;
        Ok(result)
    }

    fn stations_by_municipality(&self, municipality_id: i32) -> Result<Vec<Station>, StorageError> {
        let state = self.state.read().map_err(|_| Self::poisoned())?;
        Ok(state.stations_where(|row| row.municipality_id == municipality_id))
    }

    fn station_by_id(&self, station_id: i32) -> Result<Option<Station>, StorageError> {
        let state = self.state.read().map_err(|_| Self::poisoned())?;
        Ok(state.stations_where(|row| row.id == station_id).pop())
    }

    fn latest_municipality_id(&self) -> Result<Option<i32>, StorageError> {
        let state = self.state.read().map_err(|_| Self::poisoned())?;
        Ok(state.municipalities.keys().next_back().copied())
    }

    fn municipalities(&self) -> Result<Vec<Municipality>, StorageError> {
        let state = self.state.read().map_err(|_| Self::poisoned())?;
        Ok(state.municipalities.values().cloned().collect())
    }
}
