use actix_web::{web, HttpResponse};

use crate::error::{IngestionError, QueryError};
use crate::services::price_fetcher::PriceSource;
use crate::store::PriceStore;

pub mod ingestion;
pub mod prices;
pub mod stations;

pub fn config<S, P>(cfg: &mut web::ServiceConfig)
where
    S: PriceStore + 'static,
    P: PriceSource + 'static,
{
    // Station routes
    cfg.service(
        web::scope("/api/stations")
            .route("", web::get().to(stations::list_stations::<S>))
            .route("/{station_id}", web::get().to(stations::get_station::<S>))
            .route(
                "/{station_id}/trend",
                web::get().to(stations::get_price_trend::<S>),
            ),
    );

    // Reference data and price queries
    cfg.route("/api/fuel-types", web::get().to(prices::list_fuel_types::<S>))
        .route(
            "/api/municipalities",
            web::get().to(prices::list_municipalities::<S>),
        )
        .route("/api/cheapest", web::get().to(prices::get_cheapest::<S>));

    // Ingestion triggers
    cfg.service(
        web::scope("/api/ingestion")
            .route("/latest", web::post().to(ingestion::ingest_latest::<S, P>))
            .route(
                "/municipality/{municipality_id}",
                web::post().to(ingestion::ingest_municipality::<S, P>),
            ),
    );
}

fn error_body(kind: &str, message: String) -> serde_json::Value {
    serde_json::json!({
        "error": kind,
        "message": message
    })
}

pub(crate) fn query_error_response(err: &QueryError) -> HttpResponse {
    match err {
        QueryError::NotFound(_) => {
            HttpResponse::NotFound().json(error_body("not_found", err.to_string()))
        }
        QueryError::InvalidInput(_) => {
            HttpResponse::BadRequest().json(error_body("invalid_input", err.to_string()))
        }
        QueryError::Storage(e) => {
            log::error!("Storage failure while serving query: {}", e);
            HttpResponse::InternalServerError().json(error_body("storage", err.to_string()))
        }
    }
}

pub(crate) fn ingestion_error_response(err: &IngestionError) -> HttpResponse {
    match err {
        IngestionError::NoMunicipality => {
            HttpResponse::NotFound().json(error_body("no_municipality", err.to_string()))
        }
        IngestionError::Validation(_) => {
            HttpResponse::UnprocessableEntity().json(error_body("validation", err.to_string()))
        }
        IngestionError::Fetch(_) => {
            HttpResponse::BadGateway().json(error_body("fetch", err.to_string()))
        }
        IngestionError::Storage(_) => {
            HttpResponse::InternalServerError().json(error_body("storage", err.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FetchError, StorageError, ValidationError};
    use actix_web::http::StatusCode;

    #[test]
    fn test_query_error_status_codes() {
        let cases = [
            (QueryError::NotFound("station 1".to_string()), StatusCode::NOT_FOUND),
            (QueryError::InvalidInput("tank".to_string()), StatusCode::BAD_REQUEST),
            (
                QueryError::Storage(StorageError::Unavailable("down".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(query_error_response(&err).status(), status);
        }
    }

    #[test]
    fn test_ingestion_error_status_codes() {
        let cases = [
            (IngestionError::NoMunicipality, StatusCode::NOT_FOUND),
            (
                IngestionError::Validation(ValidationError::MissingField("id".to_string())),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (IngestionError::Fetch(FetchError::Timeout), StatusCode::BAD_GATEWAY),
            (
                IngestionError::Storage(StorageError::Pool("exhausted".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ingestion_error_response(&err).status(), status);
        }
    }
}
