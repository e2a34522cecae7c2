use std::sync::Arc;

use crate::error::QueryError;
use crate::models::{Municipality, Station};
use crate::reference::{FuelType, FUEL_TYPES};
use crate::services::price_resolver::{find_cheapest, CheapestStation};
use crate::services::price_trend::{build_trend, PriceTrend, DEFAULT_MAX_LABELS};
use crate::store::PriceStore;

/// Read-side queries over stored stations and prices.
pub struct PriceService<S> {
    store: Arc<S>,
}

impl<S: PriceStore> PriceService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn stations_by_municipality(
        &self,
        municipality_id: i32,
    ) -> Result<Vec<Station>, QueryError> {
        Ok(self.store.stations_by_municipality(municipality_id)?)
    }

    pub fn station(&self, station_id: i32) -> Result<Station, QueryError> {
        self.store
            .station_by_id(station_id)?
            .ok_or_else(|| QueryError::NotFound(format!("station {}", station_id)))
    }

    pub fn fuel_types(&self) -> &'static [FuelType] {
        FUEL_TYPES
    }

    pub fn municipalities(&self) -> Result<Vec<Municipality>, QueryError> {
        Ok(self.store.municipalities()?)
    }

    /// Cheapest station in a municipality to fill `tank_size_liters` of a fuel type.
    pub fn cheapest(
        &self,
        municipality_id: i32,
        fuel_type_id: i32,
        tank_size_liters: f64,
    ) -> Result<CheapestStation, QueryError> {
        let stations = self.store.stations_by_municipality(municipality_id)?;
        Ok(find_cheapest(&stations, fuel_type_id, tank_size_liters)?)
    }

    pub fn price_trend(
        &self,
        station_id: i32,
        fuel_type_id: i32,
    ) -> Result<PriceTrend, QueryError> {
        let station = self.station(station_id)?;
        let detail = station.price_detail(fuel_type_id).ok_or_else(|| {
            QueryError::NotFound(format!(
                "fuel type {} at station {}",
                fuel_type_id, station_id
            ))
        })?;

        Ok(build_trend(detail, DEFAULT_MAX_LABELS))
    }
}
