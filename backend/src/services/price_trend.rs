//! Chronological price series for one (station, fuel type) pair.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::models::{HistoryPoint, PriceDetail};

pub const DEFAULT_MAX_LABELS: usize = 5;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PriceTrend {
    pub station_id: i32,
    pub fuel_type_id: i32,
    pub fuel_type_name: String,
    pub current_price: Option<f64>,
    /// Oldest first.
    pub points: Vec<HistoryPoint>,
    /// Evenly spaced axis labels, `DD/MM/YYYY` where the timestamp parses.
    pub labels: Vec<String>,
    /// Last recorded price minus the one before it.
    pub latest_change: Option<f64>,
}

/// Parse the timestamp shapes seen upstream. Date-only stamps map to midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Sort history points oldest first. Unparsable timestamps go last, in their
/// original order.
pub fn sort_chronologically(points: &[HistoryPoint]) -> Vec<HistoryPoint> {
    let mut keyed: Vec<(Option<NaiveDateTime>, &HistoryPoint)> = points
        .iter()
        .map(|p| (parse_timestamp(&p.recorded_at), p))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    keyed.into_iter().map(|(_, p)| p.clone()).collect()
}

/// Keep every `ceil(n / max_labels)`-th label so the axis stays readable.
fn spaced_labels(points: &[HistoryPoint], max_labels: usize) -> Vec<String> {
    if points.is_empty() || max_labels == 0 {
        return Vec::new();
    }

    let step = points.len().div_ceil(max_labels);

    points
        .iter()
        .enumerate()
        .filter(|(i, _)| i % step == 0)
        .map(|(_, p)| match parse_timestamp(&p.recorded_at) {
            Some(ts) => ts.format("%d/%m/%Y").to_string(),
            None => p.recorded_at.clone(),
        })
        .collect()
}

pub fn build_trend(detail: &PriceDetail, max_labels: usize) -> PriceTrend {
    let points = sort_chronologically(&detail.history);
    let labels = spaced_labels(&points, max_labels);

    let latest_change = match points.as_slice() {
        [.., previous, last] => Some(last.price - previous.price),
        _ => None,
    };

    PriceTrend {
        station_id: detail.station_id,
        fuel_type_id: detail.fuel_type_id,
        fuel_type_name: detail.fuel_type_name.clone(),
        current_price: detail.current_price,
        points,
        labels,
        latest_change,
    }
}
