//! SQLite sink implementation
//!
//! Listings land in one denormalized table, upserted on (source,
//! external_id) so re-ingesting a portal refreshes rather than duplicates.
//! Each ingestion run is recorded with its config hash for traceability.

use crate::record::Listing;
use crate::storage::traits::{ListingSink, SinkResult};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    config_hash TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS listings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source TEXT NOT NULL,
    external_id TEXT NOT NULL,
    url TEXT NOT NULL,
    fetched_at TEXT NOT NULL,
    street_address TEXT,
    city TEXT,
    state TEXT,
    zip_code TEXT,
    latitude REAL,
    longitude REAL,
    bedrooms INTEGER,
    bathrooms REAL,
    square_feet INTEGER,
    lot_size REAL,
    year_built INTEGER,
    price_cents INTEGER,
    rent_estimate_cents INTEGER,
    property_type TEXT NOT NULL,
    listing_status TEXT NOT NULL,
    description TEXT,
    features TEXT NOT NULL,
    images TEXT NOT NULL,
    quality_score REAL NOT NULL,
    price_per_sqft REAL,
    rental_yield REAL,
    property_age INTEGER,
    price_vs_city_median REAL,
    UNIQUE(source, external_id)
);

CREATE INDEX IF NOT EXISTS idx_listings_city_state ON listings(city, state);
CREATE INDEX IF NOT EXISTS idx_listings_zip ON listings(zip_code);
";

/// SQLite-backed listing sink
pub struct SqliteSink {
    conn: Mutex<Connection>,
}

impl SqliteSink {
    /// Opens (or creates) the database at the given path
    pub fn new(path: &Path) -> SinkResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> SinkResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Records a new ingestion run and returns its id
    pub fn begin_run(&self, config_hash: &str) -> SinkResult<i64> {
        let conn = self.conn.lock().expect("sink lock poisoned");
        conn.execute(
            "INSERT INTO runs (started_at, config_hash) VALUES (?1, ?2)",
            params![Utc::now().to_rfc3339(), config_hash],
        )?;
        Ok(conn.last_insert_rowid())
    }
}

impl ListingSink for SqliteSink {
    fn persist(&self, listing: &Listing) -> SinkResult<()> {
        let features = serde_json::to_string(&listing.features)?;
        let images = serde_json::to_string(&listing.images)?;

        let conn = self.conn.lock().expect("sink lock poisoned");
        conn.execute(
            "INSERT INTO listings (
                source, external_id, url, fetched_at,
                street_address, city, state, zip_code, latitude, longitude,
                bedrooms, bathrooms, square_feet, lot_size, year_built,
                price_cents, rent_estimate_cents, property_type, listing_status,
                description, features, images, quality_score,
                price_per_sqft, rental_yield, property_age, price_vs_city_median
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20,
                ?21, ?22, ?23, ?24, ?25, ?26, ?27
            )
            ON CONFLICT(source, external_id) DO UPDATE SET
                url = excluded.url,
                fetched_at = excluded.fetched_at,
                street_address = excluded.street_address,
                city = excluded.city,
                state = excluded.state,
                zip_code = excluded.zip_code,
                latitude = excluded.latitude,
                longitude = excluded.longitude,
                bedrooms = excluded.bedrooms,
                bathrooms = excluded.bathrooms,
                square_feet = excluded.square_feet,
                lot_size = excluded.lot_size,
                year_built = excluded.year_built,
                price_cents = excluded.price_cents,
                rent_estimate_cents = excluded.rent_estimate_cents,
                property_type = excluded.property_type,
                listing_status = excluded.listing_status,
                description = excluded.description,
                features = excluded.features,
                images = excluded.images,
                quality_score = excluded.quality_score,
                price_per_sqft = excluded.price_per_sqft,
                rental_yield = excluded.rental_yield,
                property_age = excluded.property_age,
                price_vs_city_median = excluded.price_vs_city_median",
            params![
                listing.source.as_str(),
                listing.external_id,
                listing.url,
                listing.fetched_at.to_rfc3339(),
                listing.street_address,
                listing.city,
                listing.state,
                listing.zip_code,
                listing.latitude,
                listing.longitude,
                listing.bedrooms,
                listing.bathrooms,
                listing.square_feet,
                listing.lot_size,
                listing.year_built,
                listing.price_cents,
                listing.rent_estimate_cents,
                listing.property_type.as_str(),
                listing.listing_status.as_str(),
                listing.description,
                features,
                images,
                listing.quality_score,
                listing.price_per_sqft,
                listing.rental_yield,
                listing.property_age,
                listing.price_vs_city_median,
            ],
        )?;

        Ok(())
    }

    fn count(&self) -> SinkResult<usize> {
        let conn = self.conn.lock().expect("sink lock poisoned");
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM listings", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
