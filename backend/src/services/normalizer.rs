//! Turns one upstream station snapshot into local entities.
//!
//! Pure data transformation: no network, no storage. Any problem rejects the
//! whole snapshot.

use serde::Deserialize;
use serde_json::Value;

use crate::error::ValidationError;
use crate::models::{Facilities, HistoryPoint, PriceDetailInput, StationInfo};

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSnapshot {
    pub station: StationInfo,
    pub price_details: Vec<NormalizedPriceDetail>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPriceDetail {
    pub detail: PriceDetailInput,
    /// Upstream order (most recent first).
    pub history: Vec<HistoryPoint>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawStation {
    id: Option<i32>,
    full_name: Option<String>,
    image_url: Option<String>,
    full_address: Option<String>,
    web_address: Option<String>,
    phone_number: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    open_days: Option<String>,
    open_time: Option<Value>,
    close_time: Option<Value>,
    cafe_bar: Option<bool>,
    toilet: Option<bool>,
    parking: Option<bool>,
    car_wash: Option<bool>,
    price_details: Option<Vec<RawPriceDetail>>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawPriceDetail {
    current_price: Option<f64>,
    oil_derivate_type: Option<i32>,
    oil_derivate_name: Option<String>,
    history: Option<Vec<RawHistoryPoint>>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawHistoryPoint {
    date: Option<String>,
    price: Option<f64>,
    is_higher: Option<bool>,
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, ValidationError> {
    value.ok_or_else(|| ValidationError::MissingField(field.to_string()))
}

fn invalid(field: &str, reason: impl Into<String>) -> ValidationError {
    ValidationError::InvalidField {
        field: field.to_string(),
        reason: reason.into(),
    }
}

fn check_range(value: f64, min: f64, max: f64, field: &str) -> Result<f64, ValidationError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(invalid(field, format!("expected {} to {}, got {}", min, max, value)))
    }
}

fn check_price(value: f64, field: &str) -> Result<f64, ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(invalid(field, format!("expected a non-negative price, got {}", value)))
    }
}

/// Accepts an hour as an integer (`7`) or a clock string (`"07"`, `"07:00"`, `"07:00:00"`).
fn parse_hour(value: &Value, field: &str) -> Result<i32, ValidationError> {
    let hour = match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| invalid(field, format!("expected a whole hour, got {}", n)))?,
        Value::String(s) => s
            .split(':')
            .next()
            .and_then(|h| h.trim().parse::<i64>().ok())
            .ok_or_else(|| invalid(field, format!("expected an hour, got {:?}", s)))?,
        Value::Null => return Err(ValidationError::MissingField(field.to_string())),
        other => return Err(invalid(field, format!("expected an hour, got {}", other))),
    };

    if (0..=24).contains(&hour) {
        Ok(hour as i32)
    } else {
        Err(invalid(field, format!("expected 0 to 24, got {}", hour)))
    }
}

/// Validate and convert one snapshot fetched for `municipality_id`.
pub fn normalize(raw: &Value, municipality_id: i32) -> Result<NormalizedSnapshot, ValidationError> {
    if !raw.is_object() {
        return Err(ValidationError::Malformed(format!(
            "expected a station object, got {}",
            json_kind(raw)
        )));
    }

    let station: RawStation = serde_json::from_value(raw.clone())
        .map_err(|e| ValidationError::Malformed(e.to_string()))?;

    let id = required(station.id, "id")?;
    let full_name = required(station.full_name, "fullName")?;
    let image_url = required(station.image_url, "imageUrl")?;
    let full_address = required(station.full_address, "fullAddress")?;
    let web_address = required(station.web_address, "webAddress")?;
    let phone_number = required(station.phone_number, "phoneNumber")?;
    let latitude = required(station.latitude, "latitude")?;
    let longitude = required(station.longitude, "longitude")?;
    let open_days = required(station.open_days, "openDays")?;
    let open_time = required(station.open_time, "openTime")?;
    let close_time = required(station.close_time, "closeTime")?;

    let latitude = check_range(latitude, -90.0, 90.0, "latitude")?;
    let longitude = check_range(longitude, -180.0, 180.0, "longitude")?;
    let open_hour = parse_hour(&open_time, "openTime")?;
    let close_hour = parse_hour(&close_time, "closeTime")?;

    let any_facility = station.cafe_bar.is_some()
        || station.toilet.is_some()
        || station.parking.is_some()
        || station.car_wash.is_some();
    let facilities = any_facility.then(|| Facilities {
        cafe_bar: station.cafe_bar.unwrap_or(false),
        toilet: station.toilet.unwrap_or(false),
        parking: station.parking.unwrap_or(false),
        car_wash: station.car_wash.unwrap_or(false),
    });

    let price_details = station
        .price_details
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(i, detail)| normalize_price_detail(detail, i))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(NormalizedSnapshot {
        station: StationInfo {
            id,
            municipality_id,
            full_name,
            image_url,
            full_address,
            web_address,
            phone_number,
            latitude,
            longitude,
            open_days,
            open_hour,
            close_hour,
            facilities,
        },
        price_details,
    })
}

fn normalize_price_detail(
    raw: RawPriceDetail,
    index: usize,
) -> Result<NormalizedPriceDetail, ValidationError> {
    let path = |field: &str| format!("priceDetails[{}].{}", index, field);

    let fuel_type_id = required(raw.oil_derivate_type, &path("oilDerivateType"))?;
    let fuel_type_name = required(raw.oil_derivate_name, &path("oilDerivateName"))?;
    let current_price = raw
        .current_price
        .map(|p| check_price(p, &path("currentPrice")))
        .transpose()?;

    let history = raw
        .history
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(j, point)| -> Result<HistoryPoint, ValidationError> {
            let field = |name: &str| format!("priceDetails[{}].history[{}].{}", index, j, name);
            let recorded_at = required(point.date, &field("date"))?;
            let price = required(point.price, &field("price"))?;
            let is_higher = required(point.is_higher, &field("isHigher"))?;
            Ok(HistoryPoint {
                recorded_at,
                price: check_price(price, &field("price"))?,
                is_higher,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(NormalizedPriceDetail {
        detail: PriceDetailInput {
            fuel_type_id,
            fuel_type_name,
            current_price,
        },
        history,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
