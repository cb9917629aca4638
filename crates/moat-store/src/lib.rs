//! Moat Storage Layer
//!
//! Implements the [`CompanyStore`] and [`AuditLog`] traits on SQLite.
//!
//! # Architecture
//!
//! - `companies`: one row per company; the full record is kept as a JSON
//!   document next to a few indexed columns (name, dedupe key, score, tier)
//! - `scoring_events`: the append-only audit log. Events are never updated
//!   or deleted, and appending an event id twice is an error
//!
//! # Examples
//!
//! ```no_run
//! use moat_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for company and audit operations
//! ```

#![warn(missing_docs)]

use moat_domain::traits::{AuditLog, CompanyStore};
use moat_domain::{current_timestamp, Company, CompanyId, ScoringEvent};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Stored document could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Scoring event appended twice
    #[error("Duplicate scoring event: {0}")]
    DuplicateEvent(String),
}

/// SQLite-based implementation of the company store and audit log
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should have its own
/// SqliteStore instance.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a store at the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Find a company by its normalised name + country key
    pub fn find_by_dedupe_key(&self, key: &str) -> Result<Option<Company>, StoreError> {
        let record: Option<String> = self
            .conn
            .query_row(
                "SELECT record FROM companies WHERE dedupe_key = ?1 LIMIT 1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        record.map(|r| Self::decode_company(&r)).transpose()
    }

    /// Number of stored companies
    pub fn company_count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM companies", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn company_id_to_bytes(id: CompanyId) -> Vec<u8> {
        id.value().to_be_bytes().to_vec()
    }

    fn decode_company(record: &str) -> Result<Company, StoreError> {
        Ok(serde_json::from_str(record)?)
    }

    fn decode_event(event: &str) -> Result<ScoringEvent, StoreError> {
        Ok(serde_json::from_str(event)?)
    }
}

impl CompanyStore for SqliteStore {
    type Error = StoreError;

    fn upsert_company(&mut self, company: &Company) -> Result<(), Self::Error> {
        let id_bytes = Self::company_id_to_bytes(company.id);
        let record = serde_json::to_string(company)?;

        self.conn.execute(
            "INSERT INTO companies (id, name, dedupe_key, hq_country, moat_score, tier, updated_at, record)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
             name = excluded.name, dedupe_key = excluded.dedupe_key, hq_country = excluded.hq_country,
             moat_score = excluded.moat_score, tier = excluded.tier,
             updated_at = excluded.updated_at, record = excluded.record",
            params![
                &id_bytes,
                &company.name,
                company.dedupe_key(),
                &company.hq_country,
                company.moat_score,
                company.tier.map(|t| t.as_str()),
                current_timestamp() as i64,
                record,
            ],
        )?;

        debug!("Stored company '{}' ({})", company.name, company.id);
        Ok(())
    }

    fn get_company(&self, id: CompanyId) -> Result<Option<Company>, Self::Error> {
        let id_bytes = Self::company_id_to_bytes(id);
        let record: Option<String> = self
            .conn
            .query_row(
                "SELECT record FROM companies WHERE id = ?1",
                params![&id_bytes],
                |row| row.get(0),
            )
            .optional()?;

        match record {
            Some(record) => {
                let company = Self::decode_company(&record)?;
                if company.id != id {
                    return Err(StoreError::InvalidData(format!(
                        "Record stored under {} carries id {}",
                        id, company.id
                    )));
                }
                Ok(Some(company))
            }
            None => Ok(None),
        }
    }

    fn list_companies(&self) -> Result<Vec<Company>, Self::Error> {
        // UUIDv7 bytes sort in creation order
        let mut stmt = self
            .conn
            .prepare("SELECT record FROM companies ORDER BY id ASC")?;
        let records = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        records.iter().map(|r| Self::decode_company(r)).collect()
    }
}

impl AuditLog for SqliteStore {
    type Error = StoreError;

    fn append_event(&mut self, event: &ScoringEvent) -> Result<(), Self::Error> {
        let id = event.id.to_string();
        let exists: bool = self
            .conn
            .query_row(
                "SELECT 1 FROM scoring_events WHERE id = ?1",
                params![&id],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);

        if exists {
            return Err(StoreError::DuplicateEvent(id));
        }

        let payload = serde_json::to_string(event)?;
        self.conn.execute(
            "INSERT INTO scoring_events (id, company_id, created_at, moat_score, tier, thesis_version, event)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                &id,
                Self::company_id_to_bytes(event.company_id),
                event.created_at as i64,
                event.moat_score,
                event.tier.as_str(),
                &event.thesis_version,
                payload,
            ],
        )?;

        debug!(
            "Appended scoring event {} for {} (score {})",
            id, event.company_id, event.moat_score
        );
        Ok(())
    }

    fn latest_event(&self, company_id: CompanyId) -> Result<Option<ScoringEvent>, Self::Error> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT event FROM scoring_events WHERE company_id = ?1 ORDER BY seq DESC LIMIT 1",
                params![Self::company_id_to_bytes(company_id)],
                |row| row.get(0),
            )
            .optional()?;

        payload.map(|p| Self::decode_event(&p)).transpose()
    }

    fn events_for(&self, company_id: CompanyId) -> Result<Vec<ScoringEvent>, Self::Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT event FROM scoring_events WHERE company_id = ?1 ORDER BY seq ASC")?;
        let payloads = stmt
            .query_map(params![Self::company_id_to_bytes(company_id)], |row| {
                row.get::<_, String>(0)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        payloads.iter().map(|p| Self::decode_event(p)).collect()
    }

    fn event_count(&self) -> Result<usize, Self::Error> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM scoring_events", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
