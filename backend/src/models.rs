use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

// ============================================================================
// Domain entities
// ============================================================================

/// Optional amenities. Only some station sources carry them.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Facilities {
    pub cafe_bar: bool,
    pub toilet: bool,
    pub parking: bool,
    pub car_wash: bool,
}

/// Station identity and descriptive fields, without prices.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StationInfo {
    pub id: i32,
    pub municipality_id: i32,
    pub full_name: String,
    pub image_url: String,
    pub full_address: String,
    pub web_address: String,
    pub phone_number: String,
    pub latitude: f64,
    pub longitude: f64,
    pub open_days: String,
    /// Local-time hour, 0-24.
    pub open_hour: i32,
    /// Local-time hour, 0-24.
    pub close_hour: i32,
    pub facilities: Option<Facilities>,
}

/// A station together with its current price details and their history.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Station {
    #[serde(flatten)]
    pub info: StationInfo,
    pub price_details: Vec<PriceDetail>,
}

impl Station {
    pub fn id(&self) -> i32 {
        self.info.id
    }

    /// The price detail for a fuel type, if this station lists one.
    pub fn price_detail(&self, fuel_type_id: i32) -> Option<&PriceDetail> {
        self.price_details
            .iter()
            .find(|d| d.fuel_type_id == fuel_type_id)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PriceDetail {
    pub id: i32,
    pub station_id: i32,
    pub fuel_type_id: i32,
    /// Upstream free text, not canonicalized against the fuel-type table.
    pub fuel_type_name: String,
    /// `None` means not sold or unknown.
    pub current_price: Option<f64>,
    /// Storage order. Sort before presenting as a trend.
    pub history: Vec<HistoryPoint>,
}

/// The writable part of a price detail, keyed by (station id, fuel type id).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PriceDetailInput {
    pub fuel_type_id: i32,
    pub fuel_type_name: String,
    pub current_price: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HistoryPoint {
    /// Upstream timestamp, verbatim. Precision and timezone vary by source.
    pub recorded_at: String,
    pub price: f64,
    /// Upstream flag: this price is higher than or equal to the previous one.
    pub is_higher: bool,
}

#[derive(
    Queryable, Selectable, Insertable, AsChangeset, Serialize, Deserialize, Debug, Clone, PartialEq,
)]
#[diesel(table_name = crate::schema::municipalities)]
#[diesel(treat_none_as_null = true)]
pub struct Municipality {
    pub id: i32,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

// ============================================================================
// Database rows
// ============================================================================

#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::stations)]
#[diesel(treat_none_as_null = true)]
pub struct StationRow {
    pub id: i32,
    pub municipality_id: i32,
    pub full_name: String,
    pub image_url: String,
    pub full_address: String,
    pub web_address: String,
    pub phone_number: String,
    pub latitude: f64,
    pub longitude: f64,
    pub open_days: String,
    pub open_hour: i32,
    pub close_hour: i32,
    pub cafe_bar: Option<bool>,
    pub toilet: Option<bool>,
    pub parking: Option<bool>,
    pub car_wash: Option<bool>,
    pub updated_at: NaiveDateTime,
}

impl StationRow {
    pub fn from_info(info: &StationInfo, updated_at: NaiveDateTime) -> Self {
        let facilities = info.facilities;
        Self {
            id: info.id,
            municipality_id: info.municipality_id,
            full_name: info.full_name.clone(),
            image_url: info.image_url.clone(),
            full_address: info.full_address.clone(),
            web_address: info.web_address.clone(),
            phone_number: info.phone_number.clone(),
            latitude: info.latitude,
            longitude: info.longitude,
            open_days: info.open_days.clone(),
            open_hour: info.open_hour,
            close_hour: info.close_hour,
            cafe_bar: facilities.map(|f| f.cafe_bar),
            toilet: facilities.map(|f| f.toilet),
            parking: facilities.map(|f| f.parking),
            car_wash: facilities.map(|f| f.car_wash),
            updated_at,
        }
    }

    pub fn into_info(self) -> StationInfo {
        let has_facilities = self.cafe_bar.is_some()
            || self.toilet.is_some()
            || self.parking.is_some()
            || self.car_wash.is_some();

        let facilities = has_facilities.then(|| Facilities {
            cafe_bar: self.cafe_bar.unwrap_or(false),
            toilet: self.toilet.unwrap_or(false),
            parking: self.parking.unwrap_or(false),
            car_wash: self.car_wash.unwrap_or(false),
        });

        StationInfo {
            id: self.id,
            municipality_id: self.municipality_id,
            full_name: self.full_name,
            image_url: self.image_url,
            full_address: self.full_address,
            web_address: self.web_address,
            phone_number: self.phone_number,
            latitude: self.latitude,
            longitude: self.longitude,
            open_days: self.open_days,
            open_hour: self.open_hour,
            close_hour: self.close_hour,
            facilities,
        }
    }
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::price_details)]
pub struct PriceDetailRow {
    pub id: i32,
    pub station_id: i32,
    pub fuel_type_id: i32,
    pub fuel_type_name: String,
    pub current_price: Option<f64>,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::price_details)]
pub struct NewPriceDetailRow<'a> {
    pub station_id: i32,
    pub fuel_type_id: i32,
    pub fuel_type_name: &'a str,
    pub current_price: Option<f64>,
    pub updated_at: NaiveDateTime,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::price_history)]
pub struct HistoryRow {
    pub id: i32,
    pub price_detail_id: i32,
    pub recorded_at: String,
    pub price: f64,
    pub is_higher: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::price_history)]
pub struct NewHistoryRow<'a> {
    pub price_detail_id: i32,
    pub recorded_at: &'a str,
    pub price: f64,
    pub is_higher: bool,
}
