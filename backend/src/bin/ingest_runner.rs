//! Ingest Runner - scheduled price ingestion
//!
//! Runs as a daemon: ingests the latest municipality once at startup and then
//! on every tick of `INGEST_CRON` (default: every six hours).
//!
//! Environment variables:
//!   DATABASE_URL      - PostgreSQL connection string (required)
//!   UPSTREAM_BASE_URL - price API base URL
//!   INGEST_CRON       - six-field cron expression

use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler};

use fuel_backend::config::AppConfig;
use fuel_backend::db;
use fuel_backend::reference::seed_municipalities_from_file;
use fuel_backend::services::ingestion::IngestionService;
use fuel_backend::services::price_fetcher::UpstreamClient;
use fuel_backend::store::PgPriceStore;

type Ingestion = IngestionService<PgPriceStore, UpstreamClient>;

#[tokio::main]
async fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

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
            Ok(count) => log::info!("Seeded {} municipalities", count),
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

    let service = Arc::new(IngestionService::new(store, client, config.upstream_page));

    log::info!("Starting fuel price ingest scheduler...");

    // Run initial ingestion at startup
    run_ingestion(service.clone()).await;

    let sched = match JobScheduler::new().await {
        Ok(sched) => sched,
        Err(e) => {
            log::error!("Failed to create scheduler: {}", e);
            std::process::exit(1);
        }
    };

    let job_service = service.clone();
    let job = Job::new_async(config.ingest_cron.as_str(), move |_uuid, _l| {
        let service = job_service.clone();
        Box::pin(async move {
            log::info!("Scheduled ingestion triggered");
            run_ingestion(service).await;
        })
    });
    let job = match job {
        Ok(job) => job,
        Err(e) => {
            log::error!("Invalid INGEST_CRON {:?}: {}", config.ingest_cron, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = sched.add(job).await {
        log::error!("Failed to add ingestion job: {}", e);
        std::process::exit(1);
    }
    if let Err(e) = sched.start().await {
        log::error!("Failed to start scheduler: {}", e);
        std::process::exit(1);
    }

    log::info!("Ingest scheduler running with cron {:?}", config.ingest_cron);

    // Keep the process running
    loop {
        tokio::time::sleep(tokio::time::Duration::from_secs(3600)).await;
    }
}

/// One ingestion of the latest municipality. Failures are logged and the next tick retries.
async fn run_ingestion(service: Arc<Ingestion>) {
    match service.ingest_latest_municipality().await {
        Ok(report) => log::info!(
            "Ingested municipality {}: {} station(s), {} new history point(s)",
            report.municipality_id,
            report.stations_upserted,
            report.history_points_appended
        ),
        Err(e) => log::error!("Ingestion failed: {}", e),
    }
}
