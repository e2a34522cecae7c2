use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{get, web, App, HttpResponse, HttpServer, Responder};

use fuel_backend::api;
use fuel_backend::config::AppConfig;
use fuel_backend::db;
use fuel_backend::reference::seed_municipalities_from_file;
use fuel_backend::services::ingestion::IngestionService;
use fuel_backend::services::price_fetcher::UpstreamClient;
use fuel_backend::services::price_service::PriceService;
use fuel_backend::store::PgPriceStore;

#[get("/")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "Fuel Price Backend",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    // DB Pool initialization
    let pool = match db::init_pool(&config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Database initialization failed: {}", e);
            std::process::exit(1);
        }
    };
    let store = Arc::new(PgPriceStore::new(pool));

    if let Some(path) = &config.municipalities_file {
        match seed_municipalities_from_file(store.as_ref(), path) {
            Ok(count) => log::info!("Seeded {} municipalities from {}", count, path.display()),
            Err(e) => {
                log::error!("Failed to seed municipalities from {}: {}", path.display(), e);
                std::process::exit(1);
            }
        }
    }

    let client = match UpstreamClient::new(&config.upstream_base_url, config.upstream_timeout) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            log::error!("Failed to build upstream client: {}", e);
            std::process::exit(1);
        }
    };

    let price_service = web::Data::new(PriceService::new(store.clone()));
    let ingestion_service = web::Data::new(IngestionService::new(
        store,
        client,
        config.upstream_page,
    ));

    log::info!(
        "Starting Fuel Price Backend at http://{}:{}",
        config.bind_host,
        config.bind_port
    );
    log::info!("Upstream price API: {}", config.upstream_base_url);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .app_data(price_service.clone())
            .app_data(ingestion_service.clone())
            .service(health_check)
            .configure(api::config::<PgPriceStore, UpstreamClient>)
    })
    .bind((config.bind_host.as_str(), config.bind_port))?
    .run()
    .await
}
