use serde::Serialize;

use crate::error::ResolveError;
use crate::models::Station;

/// The winning station of a cheapest-station query.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CheapestStation {
    pub station: Station,
    pub fuel_type_id: i32,
    pub unit_price: f64,
    pub tank_size_liters: f64,
    pub total_cost: f64,
}

/// Pick the station with the lowest cost to fill `tank_size_liters` of a fuel type.
///
/// Stations without a price for the fuel type (missing detail or null price) are
/// skipped. Equal costs resolve to the station that appears first in `stations`.
pub fn find_cheapest(
    stations: &[Station],
    fuel_type_id: i32,
    tank_size_liters: f64,
) -> Result<CheapestStation, ResolveError> {
    if !tank_size_liters.is_finite() || tank_size_liters <= 0.0 {
        return Err(ResolveError::InvalidTankSize(tank_size_liters));
    }

    let mut best: Option<(&Station, f64, f64)> = None;

    for station in stations {
        let unit_price = match station
            .price_detail(fuel_type_id)
            .and_then(|d| d.current_price)
        {
            Some(p) if p.is_finite() => p,
            _ => continue,
        };

        let total_cost = unit_price * tank_size_liters;
        if !total_cost.is_finite() {
            return Err(ResolveError::InvalidTankSize(tank_size_liters));
        }

        // Strict comparison keeps the earlier station on ties.
        match best {
            Some((_, _, best_cost)) if total_cost >= best_cost => {}
            _ => best = Some((station, unit_price, total_cost)),
        }
    }

    let (station, unit_price, total_cost) =
        best.ok_or(ResolveError::NoEligibleStation { fuel_type_id })?;

    Ok(CheapestStation {
        station: station.clone(),
        fuel_type_id,
        unit_price,
        tank_size_liters,
        total_cost,
    })
}
