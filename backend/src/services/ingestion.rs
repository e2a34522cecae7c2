use std::sync::Arc;

use log::{error, info, warn};
use serde::Serialize;

use crate::error::{IngestionError, StorageError};
use crate::services::normalizer::{normalize, NormalizedSnapshot};
use crate::services::price_fetcher::PriceSource;
use crate::store::{PriceStore, StoreWriter};

/// Outcome of one successful ingestion run.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestionReport {
    pub municipality_id: i32,
    pub stations_upserted: usize,
    pub price_details_upserted: usize,
    pub history_points_appended: usize,
}

/// Drives fetch, normalize and persist for one municipality per call.
///
/// No retries: a failed run is reported and the caller decides whether to try again.
pub struct IngestionService<S, P> {
    store: Arc<S>,
    source: Arc<P>,
    page: u32,
}

impl<S: PriceStore, P: PriceSource> IngestionService<S, P> {
    pub fn new(store: Arc<S>, source: Arc<P>, page: u32) -> Self {
        Self {
            store,
            source,
            page,
        }
    }

    /// Ingest the municipality with the highest id on record.
    pub async fn ingest_latest_municipality(&self) -> Result<IngestionReport, IngestionError> {
        let municipality_id = self
            .store
            .latest_municipality_id()
            .map_err(|e| {
                error!("Failed to look up latest municipality: {}", e);
                e
            })?
            .ok_or_else(|| {
                warn!("Ingestion skipped: no municipality on record");
                IngestionError::NoMunicipality
            })?;

        self.ingest_municipality(municipality_id).await
    }

    pub async fn ingest_municipality(
        &self,
        municipality_id: i32,
    ) -> Result<IngestionReport, IngestionError> {
        info!(
            "Ingesting municipality {} (page {})",
            municipality_id, self.page
        );

        let raw = self
            .source
            .fetch_snapshots(municipality_id, self.page)
            .await
            .map_err(|e| {
                error!("Fetch failed for municipality {}: {}", municipality_id, e);
                e
            })?;

        info!(
            "Fetched {} snapshot(s) for municipality {}",
            raw.len(),
            municipality_id
        );

        // Validate everything before the first write.
        let snapshots = raw
            .iter()
            .enumerate()
            .map(|(i, snapshot)| {
                normalize(snapshot, municipality_id).map_err(|e| {
                    warn!(
                        "Rejected snapshot {} for municipality {}: {}",
                        i, municipality_id, e
                    );
                    e
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let report = self
            .store
            .transaction(|w| persist(w, municipality_id, &snapshots))
            .map_err(|e| {
                error!(
                    "Persisting municipality {} failed, nothing committed: {}",
                    municipality_id, e
                );
                e
            })?;

        info!(
            "Ingestion of municipality {} complete: {} station(s), {} price detail(s), {} new history point(s)",
            report.municipality_id,
            report.stations_upserted,
            report.price_details_upserted,
            report.history_points_appended
        );

        Ok(report)
    }
}

fn persist(
    writer: &mut dyn StoreWriter,
    municipality_id: i32,
    snapshots: &[NormalizedSnapshot],
) -> Result<IngestionReport, StorageError> {
    let mut report = IngestionReport {
        municipality_id,
        ..Default::default()
    };

    for snapshot in snapshots {
        let station_id = snapshot.station.id;
        writer.upsert_station(&snapshot.station)?;
        report.stations_upserted += 1;

        for entry in &snapshot.price_details {
            let detail_id = writer.upsert_price_detail(station_id, &entry.detail)?;
            report.price_details_upserted += 1;

            for point in &entry.history {
                if writer.append_history_if_new(detail_id, point)? {
                    report.history_points_appended += 1;
                }
            }
        }
    }

    Ok(report)
}
