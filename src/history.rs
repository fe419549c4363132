//! Reading history: SQLite-backed persistence for weather readings.
//!
//! Every successful current-weather lookup is stored as one row. Rows are
//! keyed by the normalized city name so lookups are case-insensitive and
//! ignore surrounding whitespace.

use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};
use tokio::task;
use tracing::{debug, info, instrument};

use crate::models::{NewReading, WeatherReading, normalize_city};
use crate::{Result, WeatherDashError};

/// Number of readings returned when the caller does not ask for more
pub const DEFAULT_HISTORY_LIMIT: u32 = 5;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS weather_readings (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        city TEXT NOT NULL CHECK (length(city) <= 100),
        country TEXT NOT NULL CHECK (length(country) <= 10),
        temperature REAL NOT NULL,
        feels_like REAL NOT NULL,
        humidity INTEGER NOT NULL CHECK (humidity BETWEEN 0 AND 100),
        weather_condition TEXT NOT NULL CHECK (length(weather_condition) <= 100),
        recorded_at INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_readings_city_recorded
        ON weather_readings (city, recorded_at);";

const SELECT_COLUMNS: &str =
    "id, city, country, temperature, feels_like, humidity, weather_condition, recorded_at";

/// A stored city and how many readings it has
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySummary {
    pub city: String,
    pub readings: u64,
    pub last_recorded_at: DateTime<Utc>,
}

/// Handle to the readings database. Cheap to clone.
#[derive(Clone)]
pub struct ReadingStore {
    conn: Arc<Mutex<Connection>>,
}

impl ReadingStore {
    /// Open (and create if needed) the database at `db_path`
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(db_path)?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;",
        )?;
        info!("Opened reading history at {}", db_path.display());
        Self::init(conn)
    }

    /// Volatile database that lives as long as the store
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a closure against the connection on the blocking pool
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| WeatherDashError::storage("Reading store lock poisoned"))?;
            f(&guard)
        })
        .await
        .map_err(|e| WeatherDashError::storage(format!("Reading store task failed: {e}")))?
    }

    /// Persist a reading and return the stored row
    #[instrument(skip(self, reading), fields(city = %reading.city))]
    pub async fn insert(&self, reading: NewReading) -> Result<WeatherReading> {
        let reading = reading.normalized();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO weather_readings (city, country, temperature, feels_like,
                     humidity, weather_condition, recorded_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    reading.city,
                    reading.country,
                    reading.temperature,
                    reading.feels_like,
                    reading.humidity,
                    reading.condition,
                    reading.recorded_at.timestamp_millis(),
                ],
            )?;
            let id = conn.last_insert_rowid();
            debug!("Stored reading {} for {}", id, reading.city);
            Ok(WeatherReading {
                id,
                city: reading.city,
                country: reading.country,
                temperature: reading.temperature,
                feels_like: reading.feels_like,
                humidity: reading.humidity,
                condition: reading.condition,
                recorded_at: reading.recorded_at,
            })
        })
        .await
    }

    /// Most recent readings for a city, newest first
    #[instrument(skip(self))]
    pub async fn city_history(&self, city: &str, limit: u32) -> Result<Vec<WeatherReading>> {
        let city = normalize_city(city);
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM weather_readings
                 WHERE city = ?1
                 ORDER BY recorded_at DESC, id DESC
                 LIMIT ?2"
            ))?;
            let rows = stmt
                .query_map(params![city, limit], reading_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
    }

    /// Temperatures recorded at or after `since`, oldest first
    #[instrument(skip(self))]
    pub async fn recent_temperatures(&self, city: &str, since: DateTime<Utc>) -> Result<Vec<f64>> {
        let city = normalize_city(city);
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT temperature FROM weather_readings
                 WHERE city = ?1 AND recorded_at >= ?2
                 ORDER BY recorded_at ASC, id ASC",
            )?;
            let temps = stmt
                .query_map(params![city, since.timestamp_millis()], |row| row.get(0))?
                .collect::<std::result::Result<Vec<f64>, _>>()?;
            Ok(temps)
        })
        .await
    }

    /// Latest reading for a city, if any
    pub async fn latest(&self, city: &str) -> Result<Option<WeatherReading>> {
        let city = normalize_city(city);
        self.with_conn(move |conn| {
            let reading = conn
                .query_row(
                    &format!(
                        "SELECT {SELECT_COLUMNS} FROM weather_readings
                         WHERE city = ?1
                         ORDER BY recorded_at DESC, id DESC
                         LIMIT 1"
                    ),
                    params![city],
                    reading_from_row,
                )
                .optional()?;
            Ok(reading)
        })
        .await
    }

    /// Every stored city with its reading count, most recently updated first
    pub async fn cities(&self) -> Result<Vec<CitySummary>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT city, COUNT(*), MAX(recorded_at) FROM weather_readings
                 GROUP BY city
                 ORDER BY MAX(recorded_at) DESC, city ASC",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    let count: i64 = row.get(1)?;
                    Ok(CitySummary {
                        city: row.get(0)?,
                        readings: u64::try_from(count).unwrap_or_default(),
                        last_recorded_at: timestamp_from_millis(row.get(2)?, 2)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
    }

    /// Delete readings recorded before `cutoff`, returning how many were removed
    pub async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let removed = self
            .with_conn(move |conn| {
                Ok(conn.execute(
                    "DELETE FROM weather_readings WHERE recorded_at < ?1",
                    params![cutoff.timestamp_millis()],
                )?)
            })
            .await?;
        if removed > 0 {
            info!("Pruned {} reading(s) recorded before {}", removed, cutoff);
        }
        Ok(removed)
    }
}

fn timestamp_from_millis(millis: i64, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(column, millis))
}

fn reading_from_row(row: &Row<'_>) -> rusqlite::Result<WeatherReading> {
    Ok(WeatherReading {
        id: row.get(0)?,
        city: row.get(1)?,
        country: row.get(2)?,
        temperature: row.get(3)?,
        feels_like: row.get(4)?,
        humidity: row.get(5)?,
        condition: row.get(6)?,
        recorded_at: timestamp_from_millis(row.get(7)?, 7)?,
    })
}
