use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use super::query_error_response;
use crate::models::Station;
use crate::reference::fuel_type;
use crate::services::price_resolver::CheapestStation;
use crate::services::price_service::PriceService;
use crate::store::PriceStore;

// ============================================================================
// Request/Response DTOs
// ============================================================================

#[derive(Deserialize)]
pub struct CheapestQuery {
    pub municipality_id: i32,
    pub fuel_type_id: i32,
    pub tank_size: f64,
}

#[derive(Serialize)]
pub struct CheapestResponse {
    pub station: Station,
    pub fuel_type_id: i32,
    pub fuel_type_name: Option<&'static str>,
    pub unit_price: f64,
    pub tank_size_liters: f64,
    pub total_cost: f64,
    pub total_cost_formatted: String,
}

impl From<CheapestStation> for CheapestResponse {
    fn from(c: CheapestStation) -> Self {
        Self {
            fuel_type_name: fuel_type(c.fuel_type_id).map(|f| f.name),
            total_cost_formatted: format!("{:.2} KM", c.total_cost),
            station: c.station,
            fuel_type_id: c.fuel_type_id,
            unit_price: c.unit_price,
            tank_size_liters: c.tank_size_liters,
            total_cost: c.total_cost,
        }
    }
}

// ============================================================================
// Endpoints
// ============================================================================

/// Static fuel-type reference table
pub async fn list_fuel_types<S: PriceStore + 'static>(
    service: web::Data<PriceService<S>>,
) -> HttpResponse {
    HttpResponse::Ok().json(service.fuel_types())
}

pub async fn list_municipalities<S: PriceStore + 'static>(
    service: web::Data<PriceService<S>>,
) -> HttpResponse {
    match service.municipalities() {
        Ok(municipalities) => HttpResponse::Ok().json(municipalities),
        Err(e) => query_error_response(&e),
    }
}

/// Cheapest station in a municipality to fill a tank of the given fuel type
pub async fn get_cheapest<S: PriceStore + 'static>(
    service: web::Data<PriceService<S>>,
    query: web::Query<CheapestQuery>,
) -> HttpResponse {
    match service.cheapest(query.municipality_id, query.fuel_type_id, query.tank_size) {
        Ok(cheapest) => HttpResponse::Ok().json(CheapestResponse::from(cheapest)),
        Err(e) => query_error_response(&e),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Municipality, PriceDetailInput, StationInfo};
    use crate::reference::FUEL_TYPES;
    use crate::services::price_fetcher::StaticSource;
    use crate::store::MemoryPriceStore;
    use actix_web::http::StatusCode;
    use actix_web::{test as actix_test, App};
    use std::sync::Arc;

    fn station(id: i32) -> StationInfo {
        StationInfo {
            id,
            municipality_id: 1,
            full_name: format!("Gas Station {}", id),
            image_url: String::new(),
            full_address: format!("Address {}", id),
            web_address: String::new(),
            phone_number: "123-456-7890".to_string(),
            latitude: 43.97,
            longitude: 18.05,
            open_days: "Mon-Sat".to_string(),
            open_hour: 7,
            close_hour: 21,
            facilities: None,
        }
    }

    fn seeded_service() -> PriceService<MemoryPriceStore> {
        let store = MemoryPriceStore::new();
        store
            .upsert_municipality(&Municipality {
                id: 1,
                name: "Banja Luka".to_string(),
                latitude: Some(44.7722),
                longitude: Some(17.191),
            })
            .unwrap();
        for (id, price) in [(1, 1.5), (2, 1.4)] {
            store.upsert_station(&station(id)).unwrap();
            store
                .upsert_price_detail(
                    id,
                    &PriceDetailInput {
                        fuel_type_id: 2,
                        fuel_type_name: "Premium bezolovni benzin 95".to_string(),
                        current_price: Some(price),
                    },
                )
                .unwrap();
        }
        PriceService::new(Arc::new(store))
    }

    #[test]
    fn test_cheapest_query_parsing() {
        let json = r#"{"municipality_id": 1, "fuel_type_id": 2, "tank_size": 45.5}"#;
        let query: CheapestQuery = serde_json::from_str(json).unwrap();
        assert_eq!(query.fuel_type_id, 2);
        assert!((query.tank_size - 45.5).abs() < 1e-9);
    }

    #[actix_rt::test]
    async fn test_cheapest_endpoint() {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(seeded_service()))
                .configure(crate::api::config::<MemoryPriceStore, StaticSource>),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/api/cheapest?municipality_id=1&fuel_type_id=2&tank_size=10")
            .to_request();
        let body: serde_json::Value = actix_test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["station"]["id"], 2);
        assert_eq!(body["total_cost_formatted"], "14.00 KM");
    }

    #[actix_rt::test]
    async fn test_cheapest_rejects_zero_tank() {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(seeded_service()))
                .configure(crate::api::config::<MemoryPriceStore, StaticSource>),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/api/cheapest?municipality_id=1&fuel_type_id=2&tank_size=0")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_rt::test]
    async fn test_cheapest_unknown_fuel_type() {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(seeded_service()))
                .configure(crate::api::config::<MemoryPriceStore, StaticSource>),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/api/cheapest?municipality_id=1&fuel_type_id=2041&tank_size=10")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_rt::test]
    async fn test_reference_endpoints() {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(seeded_service()))
                .configure(crate::api::config::<MemoryPriceStore, StaticSource>),
        )
        .await;

        let req = actix_test::TestRequest::get().uri("/api/fuel-types").to_request();
        let fuel_types: serde_json::Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(fuel_types.as_array().unwrap().len(), FUEL_TYPES.len());

        let req = actix_test::TestRequest::get().uri("/api/municipalities").to_request();
        let municipalities: serde_json::Value =
            actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(municipalities[0]["name"], "Banja Luka");
    }
}
