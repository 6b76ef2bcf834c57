use crate::error::StoreError;
use crate::schema::{device, weather};
use anyhow::Result;
use chrono::{Duration, Local, NaiveDateTime};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use log::debug;

/// Fixed-width fractional seconds keep lexicographic TEXT comparison
/// equal to chronological order, which the windowed query relies on.
pub const TIMESTAMP_FMT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

#[derive(Debug, Clone, Queryable, serde::Serialize)]
pub struct Reading {
    pub id: i32,
    pub temperature: f64,
    pub humidity: f64,
    pub device: i32,
    pub timestamp: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = weather)]
pub struct NewReading {
    pub temperature: f64,
    pub humidity: f64,
    pub device: i32,
    pub timestamp: String,
}

/// One row of the windowed listing: a reading joined with its device name.
#[derive(Debug, Clone, Queryable, serde::Serialize)]
pub struct RecentReading {
    pub id: i32,
    pub temperature: f64,
    pub humidity: f64,
    pub device: String,
    pub timestamp: String,
}

pub struct Db {
    conn: SqliteConnection,
}

impl Db {
    pub fn connect(database_url: &str) -> Result<Self> {
        let conn = SqliteConnection::establish(database_url)?;
        Ok(Self { conn })
    }

    /// Bring storage to a ready state. Idempotent; seeds the default
    /// device. A failure here must abort startup, so it propagates.
    pub fn ensure_schema(&mut self) -> Result<(), StoreError> {
        self.conn.batch_execute(
            "CREATE TABLE IF NOT EXISTS device (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 name TEXT NOT NULL UNIQUE
             );
             CREATE TABLE IF NOT EXISTS weather (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 temperature REAL NOT NULL,
                 humidity REAL NOT NULL,
                 device INTEGER NOT NULL,
                 timestamp TEXT NOT NULL
             );
             CREATE INDEX IF NOT EXISTS idx_device_timestamp ON weather(device, timestamp);
             INSERT OR IGNORE INTO device (name) VALUES ('Office');",
        )?;
        Ok(())
    }

    /// Insert a reading with a server-assigned timestamp and return the
    /// stored row. Unknown device ids are accepted; such readings simply
    /// never show up in the windowed listing.
    pub fn insert_reading(
        &mut self,
        temperature: f64,
        humidity: f64,
        device_id: i32,
    ) -> Result<Reading, StoreError> {
        let row = NewReading {
            temperature,
            humidity,
            device: device_id,
            timestamp: Local::now().naive_local().format(TIMESTAMP_FMT).to_string(),
        };
        let reading = diesel::insert_into(weather::table)
            .values(&row)
            .get_result::<Reading>(&mut self.conn)?;
        debug!("stored reading {} from device {}", reading.id, reading.device);
        Ok(reading)
    }

    /// All readings newer than `now - window`, joined with their device
    /// name, newest first. Readings whose device id has no device row are
    /// excluded by the inner join.
    pub fn recent_readings(&mut self, window: Duration) -> Result<Vec<RecentReading>, StoreError> {
        let cutoff = (Local::now().naive_local() - window)
            .format(TIMESTAMP_FMT)
            .to_string();
        let rows = weather::table
            .inner_join(device::table)
            .filter(weather::timestamp.gt(cutoff))
            .order(weather::timestamp.desc())
            .select((
                weather::id,
                weather::temperature,
                weather::humidity,
                device::name,
                weather::timestamp,
            ))
            .load::<RecentReading>(&mut self.conn)?;
        Ok(rows)
    }

    /// Point lookup by primary key, no join.
    pub fn reading_by_id(&mut self, reading_id: i32) -> Result<Reading, StoreError> {
        weather::table
            .find(reading_id)
            .first::<Reading>(&mut self.conn)
            .optional()?
            .ok_or(StoreError::NotFound(reading_id))
    }

    /// Delete by primary key. Zero rows affected is reported as
    /// `NotFound` so callers can tell "deleted" from "nothing to delete".
    pub fn delete_reading(&mut self, reading_id: i32) -> Result<usize, StoreError> {
        let n = diesel::delete(weather::table.find(reading_id)).execute(&mut self.conn)?;
        if n == 0 {
            return Err(StoreError::NotFound(reading_id));
        }
        Ok(n)
    }
}

pub fn parse_timestamp(ts: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(ts, TIMESTAMP_FMT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Db {
        let mut db = Db::connect(":memory:").unwrap();
        db.ensure_schema().unwrap();
        db
    }

    fn insert_at(db: &mut Db, temperature: f64, device_id: i32, at: NaiveDateTime) {
        let row = NewReading {
            temperature,
            humidity: 50.0,
            device: device_id,
            timestamp: at.format(TIMESTAMP_FMT).to_string(),
        };
        diesel::insert_into(weather::table)
            .values(&row)
            .execute(&mut db.conn)
            .unwrap();
    }

    #[test]
    fn ensure_schema_is_idempotent() {
        let mut db = test_db();
        db.ensure_schema().unwrap();
        db.ensure_schema().unwrap();

        let seeds: i64 = device::table
            .filter(device::name.eq("Office"))
            .count()
            .get_result(&mut db.conn)
            .unwrap();
        assert_eq!(seeds, 1);
    }

    #[test]
    fn insert_then_lookup_roundtrip() {
        let mut db = test_db();
        let stored = db.insert_reading(72.5, 40.0, 1).unwrap();
        assert!(stored.id > 0);
        assert!(parse_timestamp(&stored.timestamp).is_some());

        let found = db.reading_by_id(stored.id).unwrap();
        assert_eq!(found.temperature, 72.5);
        assert_eq!(found.humidity, 40.0);
        assert_eq!(found.device, 1);
        assert_eq!(found.timestamp, stored.timestamp);
    }

    #[test]
    fn lookup_of_unknown_id_is_not_found() {
        let mut db = test_db();
        assert!(matches!(
            db.reading_by_id(999_999),
            Err(StoreError::NotFound(999_999))
        ));
    }

    #[test]
    fn delete_succeeds_exactly_once() {
        let mut db = test_db();
        let stored = db.insert_reading(20.0, 55.0, 1).unwrap();

        assert_eq!(db.delete_reading(stored.id).unwrap(), 1);
        assert!(matches!(
            db.delete_reading(stored.id),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn delete_of_unknown_id_is_not_found() {
        let mut db = test_db();
        assert!(matches!(
            db.delete_reading(999_999),
            Err(StoreError::NotFound(999_999))
        ));
    }

    #[test]
    fn window_excludes_old_readings() {
        let mut db = test_db();
        db.insert_reading(21.0, 45.0, 1).unwrap();
        insert_at(&mut db, 1.5, 1, Local::now().naive_local() - Duration::days(2));

        let rows = db.recent_readings(Duration::hours(24)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].temperature, 21.0);
        assert_eq!(rows[0].device, "Office");
    }

    #[test]
    fn window_orders_newest_first() {
        let mut db = test_db();
        let now = Local::now().naive_local();
        insert_at(&mut db, 10.0, 1, now - Duration::hours(3));
        insert_at(&mut db, 12.0, 1, now - Duration::hours(1));
        insert_at(&mut db, 11.0, 1, now - Duration::hours(2));

        let rows = db.recent_readings(Duration::hours(24)).unwrap();
        let temps: Vec<f64> = rows.iter().map(|r| r.temperature).collect();
        assert_eq!(temps, vec![12.0, 11.0, 10.0]);
    }

    #[test]
    fn window_excludes_dangling_device_but_lookup_still_works() {
        let mut db = test_db();
        let orphan = db.insert_reading(30.0, 60.0, 42).unwrap();
        db.insert_reading(22.0, 50.0, 1).unwrap();

        let rows = db.recent_readings(Duration::hours(24)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].device, "Office");

        let found = db.reading_by_id(orphan.id).unwrap();
        assert_eq!(found.device, 42);
    }
}
