use actix_web::{web, HttpResponse};
use serde::Deserialize;

use super::query_error_response;
use crate::services::price_service::PriceService;
use crate::store::PriceStore;

// ============================================================================
// Request DTOs
// ============================================================================

#[derive(Deserialize)]
pub struct MunicipalityQuery {
    pub municipality_id: i32,
}

#[derive(Deserialize)]
pub struct TrendQuery {
    pub fuel_type_id: i32,
}

// ============================================================================
// Endpoints
// ============================================================================

/// List stations of a municipality with their price details
pub async fn list_stations<S: PriceStore + 'static>(
    service: web::Data<PriceService<S>>,
    query: web::Query<MunicipalityQuery>,
) -> HttpResponse {
    match service.stations_by_municipality(query.municipality_id) {
        Ok(stations) => HttpResponse::Ok().json(stations),
        Err(e) => query_error_response(&e),
    }
}

/// Get one station with its price details
pub async fn get_station<S: PriceStore + 'static>(
    service: web::Data<PriceService<S>>,
    path: web::Path<i32>,
) -> HttpResponse {
    match service.station(path.into_inner()) {
        Ok(station) => HttpResponse::Ok().json(station),
        Err(e) => query_error_response(&e),
    }
}

/// Chronological price history of one fuel type at a station
pub async fn get_price_trend<S: PriceStore + 'static>(
    service: web::Data<PriceService<S>>,
    path: web::Path<i32>,
    query: web::Query<TrendQuery>,
) -> HttpResponse {
    match service.price_trend(path.into_inner(), query.fuel_type_id) {
        Ok(trend) => HttpResponse::Ok().json(trend),
        Err(e) => query_error_response(&e),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HistoryPoint, PriceDetailInput, StationInfo};
    use crate::services::price_fetcher::StaticSource;
    use crate::store::MemoryPriceStore;
    use actix_web::{test as actix_test, App};
    use std::sync::Arc;

    fn seeded_service() -> PriceService<MemoryPriceStore> {
        let store = MemoryPriceStore::new();
        store
            .upsert_station(&StationInfo {
                id: 1095,
                municipality_id: 3,
                full_name: "Petrol Kiseljak".to_string(),
                image_url: "https://example.org/logo.png".to_string(),
                full_address: "Sarajevska 1, Kiseljak".to_string(),
                web_address: "https://example.org".to_string(),
                phone_number: "030 123 456".to_string(),
                latitude: 43.9426,
                longitude: 18.0763,
                open_days: "Mon-Sun".to_string(),
                open_hour: 6,
                close_hour: 22,
                facilities: None,
            })
            .unwrap();
        let detail_id = store
            .upsert_price_detail(
                1095,
                &PriceDetailInput {
                    fuel_type_id: 2,
                    fuel_type_name: "Premium bezolovni benzin 95".to_string(),
                    current_price: Some(2.61),
                },
            )
            .unwrap();
        store
            .append_history_if_new(
                detail_id,
                &HistoryPoint {
                    recorded_at: "2024-02-13".to_string(),
                    price: 2.53,
                    is_higher: false,
                },
            )
            .unwrap();
        PriceService::new(Arc::new(store))
    }

    #[test]
    fn test_municipality_query_parsing() {
        let json = r#"{"municipality_id": 3}"#;
        let query: MunicipalityQuery = serde_json::from_str(json).unwrap();
        assert_eq!(query.municipality_id, 3);
    }

    #[actix_rt::test]
    async fn test_list_stations_endpoint() {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(seeded_service()))
                .configure(crate::api::config::<MemoryPriceStore, StaticSource>),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/api/stations?municipality_id=3")
            .to_request();
        let body: serde_json::Value = actix_test::call_and_read_body_json(&app, req).await;

        let stations = body.as_array().unwrap();
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0]["id"], 1095);
        assert_eq!(stations[0]["price_details"][0]["history"][0]["price"], 2.53);
    }

    #[actix_rt::test]
    async fn test_get_station_not_found() {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(seeded_service()))
                .configure(crate::api::config::<MemoryPriceStore, StaticSource>),
        )
        .await;

        let req = actix_test::TestRequest::get().uri("/api/stations/42").to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
    }

    #[actix_rt::test]
    async fn test_price_trend_endpoint() {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(seeded_service()))
                .configure(crate::api::config::<MemoryPriceStore, StaticSource>),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/api/stations/1095/trend?fuel_type_id=2")
            .to_request();
        let body: serde_json::Value = actix_test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["fuel_type_id"], 2);
        assert_eq!(body["labels"][0], "13/02/2024");
    }
}
