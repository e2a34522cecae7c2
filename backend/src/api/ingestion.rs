use actix_web::{web, HttpResponse};

use super::ingestion_error_response;
use crate::services::ingestion::IngestionService;
use crate::services::price_fetcher::PriceSource;
use crate::store::PriceStore;

/// Run one ingestion for the municipality with the highest id on record
pub async fn ingest_latest<S, P>(service: web::Data<IngestionService<S, P>>) -> HttpResponse
where
    S: PriceStore + 'static,
    P: PriceSource + 'static,
{
    match service.ingest_latest_municipality().await {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => ingestion_error_response(&e),
    }
}

/// Run one ingestion for an explicit municipality
pub async fn ingest_municipality<S, P>(
    service: web::Data<IngestionService<S, P>>,
    path: web::Path<i32>,
) -> HttpResponse
where
    S: PriceStore + 'static,
    P: PriceSource + 'static,
{
    match service.ingest_municipality(path.into_inner()).await {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => ingestion_error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::models::Municipality;
    use crate::services::price_fetcher::StaticSource;
    use crate::store::MemoryPriceStore;
    use actix_web::http::StatusCode;
    use actix_web::{test as actix_test, App};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn snapshot() -> Value {
        json!({
            "id": 1095,
            "fullName": "Petrol Kiseljak",
            "imageUrl": "",
            "fullAddress": "Sarajevska 1, Kiseljak",
            "webAddress": "",
            "phoneNumber": "030 123 456",
            "latitude": 43.9426,
            "longitude": 18.0763,
            "openDays": "Mon-Sun",
            "openTime": 6,
            "closeTime": 22,
            "priceDetails": [
                {
                    "currentPrice": 2.61,
                    "oilDerivateType": 2,
                    "oilDerivateName": "Premium bezolovni benzin 95",
                    "history": [{ "date": "2024-02-13", "price": 2.53, "isHigher": false }]
                }
            ]
        })
    }

    fn ingestion_service(
        municipalities: &[i32],
        response: Result<Vec<Value>, FetchError>,
    ) -> IngestionService<MemoryPriceStore, StaticSource> {
        let store = MemoryPriceStore::new();
        for id in municipalities {
            store
                .upsert_municipality(&Municipality {
                    id: *id,
                    name: format!("Municipality {}", id),
                    latitude: None,
                    longitude: None,
                })
                .unwrap();
        }
        IngestionService::new(Arc::new(store), Arc::new(StaticSource { response }), 1)
    }

    #[actix_rt::test]
    async fn test_ingest_latest_endpoint() {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(ingestion_service(&[1, 3], Ok(vec![snapshot()]))))
                .configure(crate::api::config::<MemoryPriceStore, StaticSource>),
        )
        .await;

        let req = actix_test::TestRequest::post().uri("/api/ingestion/latest").to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["municipality_id"], 3);
        assert_eq!(body["stations_upserted"], 1);
        assert_eq!(body["history_points_appended"], 1);
    }

    #[actix_rt::test]
    async fn test_ingest_latest_without_municipalities() {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(ingestion_service(&[], Ok(vec![snapshot()]))))
                .configure(crate::api::config::<MemoryPriceStore, StaticSource>),
        )
        .await;

        let req = actix_test::TestRequest::post().uri("/api/ingestion/latest").to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_rt::test]
    async fn test_ingest_municipality_upstream_failure() {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(ingestion_service(
                    &[3],
                    Err(FetchError::Status {
                        status: 503,
                        body: "Service Unavailable".to_string(),
                    }),
                )))
                .configure(crate::api::config::<MemoryPriceStore, StaticSource>),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/api/ingestion/municipality/3")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[actix_rt::test]
    async fn test_ingest_municipality_rejects_invalid_snapshot() {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(ingestion_service(&[3], Ok(vec![json!({ "id": 7 })]))))
                .configure(crate::api::config::<MemoryPriceStore, StaticSource>),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/api/ingestion/municipality/3")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
