use chrono::{NaiveDateTime, Utc};
use diesel::dsl::max;
use diesel::pg::PgConnection;
use diesel::prelude::*;

use super::{assemble_stations, PriceStore, StoreWriter};
use crate::db::DbPool;
use crate::error::StorageError;
use crate::models::{
    HistoryPoint, HistoryRow, Municipality, NewHistoryRow, NewPriceDetailRow, PriceDetailInput,
    PriceDetailRow, Station, StationInfo, StationRow,
};
use crate::schema::{municipalities, price_details, price_history, stations};

/// [`PriceStore`] backed by PostgreSQL through an r2d2 pool.
#[derive(Clone)]
pub struct PgPriceStore {
    pool: DbPool,
}

impl PgPriceStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn load_stations(
        conn: &mut PgConnection,
        rows: Vec<StationRow>,
    ) -> Result<Vec<Station>, StorageError> {
        let station_ids: Vec<i32> = rows.iter().map(|s| s.id).collect();

        let details: Vec<PriceDetailRow> = price_details::table
            .filter(price_details::station_id.eq_any(&station_ids))
            .order(price_details::id.asc())
            .select(PriceDetailRow::as_select())
            .load(conn)?;

        let detail_ids: Vec<i32> = details.iter().map(|d| d.id).collect();

        let history: Vec<HistoryRow> = price_history::table
            .filter(price_history::price_detail_id.eq_any(&detail_ids))
            .order(price_history::id.asc())
            .select(HistoryRow::as_select())
            .load(conn)?;

        Ok(assemble_stations(rows, details, history))
    }
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Writer bound to the connection of an open transaction.
struct PgWriter<'a> {
    conn: &'a mut PgConnection,
}

impl StoreWriter for PgWriter<'_> {
    fn upsert_municipality(&mut self, municipality: &Municipality) -> Result<(), StorageError> {
        diesel::insert_into(municipalities::table)
            .values(municipality)
            .on_conflict(municipalities::id)
            .do_update()
            .set(municipality)
            .execute(self.conn)?;
        Ok(())
    }

    fn upsert_station(&mut self, station: &StationInfo) -> Result<(), StorageError> {
        let row = StationRow::from_info(station, now());
        diesel::insert_into(stations::table)
            .values(&row)
            .on_conflict(stations::id)
            .do_update()
            .set(&row)
            .execute(self.conn)?;
        Ok(())
    }

    fn upsert_price_detail(
        &mut self,
        station_id: i32,
        detail: &PriceDetailInput,
    ) -> Result<i32, StorageError> {
        let updated_at = now();
        let row = NewPriceDetailRow {
            station_id,
            fuel_type_id: detail.fuel_type_id,
            fuel_type_name: &detail.fuel_type_name,
            current_price: detail.current_price,
            updated_at,
        };

        let id = diesel::insert_into(price_details::table)
            .values(&row)
            .on_conflict((price_details::station_id, price_details::fuel_type_id))
            .do_update()
            .set((
                price_details::fuel_type_name.eq(&detail.fuel_type_name),
                price_details::current_price.eq(detail.current_price),
                price_details::updated_at.eq(updated_at),
            ))
            .returning(price_details::id)
            .get_result::<i32>(self.conn)?;

        Ok(id)
    }

    fn append_history_if_new(
        &mut self,
        price_detail_id: i32,
        point: &HistoryPoint,
    ) -> Result<bool, StorageError> {
        let row = NewHistoryRow {
            price_detail_id,
            recorded_at: &point.recorded_at,
            price: point.price,
            is_higher: point.is_higher,
        };

        let inserted = diesel::insert_into(price_history::table)
            .values(&row)
            .on_conflict((price_history::price_detail_id, price_history::recorded_at))
            .do_nothing()
            .execute(self.conn)?;

        Ok(inserted == 1)
    }
}

impl PriceStore for PgPriceStore {
    fn transaction<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&mut dyn StoreWriter) -> Result<T, StorageError>,
    {
        let mut pooled = self.pool.get()?;
        let conn: &mut PgConnection = &mut pooled;

        conn.transaction::<T, StorageError, _>(|conn| {
            let mut writer = PgWriter { conn };
            f(&mut writer)
        })
    }

    fn stations_by_municipality(&self, municipality_id: i32) -> Result<Vec<Station>, StorageError> {
        let mut pooled = self.pool.get()?;
        let conn: &mut PgConnection = &mut pooled;

        let rows: Vec<StationRow> = stations::table
            .filter(stations::municipality_id.eq(municipality_id))
            .order(stations::id.asc())
            .select(StationRow::as_select())
            .load(conn)?;

        Self::load_stations(conn, rows)
    }

    fn station_by_id(&self, station_id: i32) -> Result<Option<Station>, StorageError> {
        let mut pooled = self.pool.get()?;
        let conn: &mut PgConnection = &mut pooled;

        let row: Option<StationRow> = stations::table
            .filter(stations::id.eq(station_id))
            .select(StationRow::as_select())
            .first(conn)
            .optional()?;

        match row {
            Some(row) => Ok(Self::load_stations(conn, vec![row])?.pop()),
            None => Ok(None),
        }
    }

    fn latest_municipality_id(&self) -> Result<Option<i32>, StorageError> {
        let mut conn = self.pool.get()?;

        let latest = municipalities::table
            .select(max(municipalities::id))
            .first::<Option<i32>>(&mut conn)?;

        Ok(latest)
    }

    fn municipalities(&self) -> Result<Vec<Municipality>, StorageError> {
        let mut conn = self.pool.get()?;

        let rows = municipalities::table
            .order(municipalities::id.asc())
            .select(Municipality::as_select())
            .load(&mut conn)?;

        Ok(rows)
    }
}
