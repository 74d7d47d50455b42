//! SQLite storage layer for records.
//!
//! Owns the schema and translates [`Predicate`] trees into SQL. Token
//! matching inside SQL goes through a registered `regexp(pattern, text)`
//! function fed the same compiled patterns the pure evaluator uses, so
//! the two paths cannot disagree.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use log::debug;
use parking_lot::Mutex;
use regex::Regex;
use rusqlite::functions::FunctionFlags;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use thiserror::Error;

use crate::models::Record;
use crate::predicate::{token_pattern, Field, Predicate};

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Parse timestamp string from database to DateTime<Utc>
fn parse_db_timestamp(timestamp_str: &str) -> DateTime<Utc> {
    chrono::NaiveDateTime::parse_from_str(timestamp_str, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| chrono::NaiveDateTime::parse_from_str(timestamp_str, "%Y-%m-%d %H:%M:%S"))
        .map(|dt| Utc.from_utc_datetime(&dt))
        .unwrap_or_else(|_| Utc::now())
}

fn format_db_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S%.f").to_string()
}

/// Thread-safe database wrapper
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DatabaseResult<Self> {
        let conn = Connection::open(path)?;

        // WAL mode + mmap for faster concurrent reads
        conn.execute_batch(
            "
            PRAGMA journal_mode=WAL;
            PRAGMA mmap_size=67108864;
            PRAGMA cache_size=-32000;
        ",
        )?;

        Self::init(conn)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> DatabaseResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> DatabaseResult<Self> {
        add_regexp_function(&conn)?;
        let db = Self { conn: Arc::new(Mutex::new(conn)) };
        db.setup_schema()?;
        Ok(db)
    }

    /// Set up the records table and the sort index
    fn setup_schema(&self) -> DatabaseResult<()> {
        let conn = self.conn.lock();

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                id TEXT NOT NULL,
                drive TEXT NOT NULL,
                metadata TEXT NOT NULL,
                reporter TEXT NOT NULL,
                createdAt DATETIME NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_records_created ON records(createdAt)",
            [],
        )?;

        debug!("records schema ready");
        Ok(())
    }

    /// Create the per-field lookup indexes used by exact filters.
    /// Idempotent; the store calls this on every upload.
    pub fn ensure_field_indexes(&self) -> DatabaseResult<()> {
        let conn = self.conn.lock();
        conn.execute("CREATE INDEX IF NOT EXISTS idx_id ON records(id)", [])?;
        conn.execute("CREATE INDEX IF NOT EXISTS idx_drive ON records(drive)", [])?;
        conn.execute("CREATE INDEX IF NOT EXISTS idx_reporter ON records(reporter)", [])?;
        Ok(())
    }

    /// Insert records in one transaction, returning how many went in.
    pub fn insert_many(&self, records: &[Record]) -> DatabaseResult<usize> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO records (id, drive, metadata, reporter, createdAt)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for record in records {
                stmt.execute(rusqlite::params![
                    record.id,
                    record.drive,
                    record.metadata,
                    record.reporter,
                    format_db_timestamp(&record.created_at),
                ])?;
            }
        }
        tx.commit()?;
        Ok(records.len())
    }

    /// Fetch the records matching `predicate`, newest first (creation time
    /// descending, insertion order breaking ties), honoring skip/limit.
    pub fn find(&self, predicate: &Predicate, skip: u64, limit: u64) -> DatabaseResult<Vec<Record>> {
        let mut params: Vec<Value> = Vec::new();
        let clause = predicate_sql(predicate, &mut params);
        let sql = format!(
            "SELECT id, drive, metadata, reporter, createdAt FROM records
             WHERE {clause}
             ORDER BY createdAt DESC, rowid DESC
             LIMIT ? OFFSET ?"
        );
        debug!("find: {clause} skip={skip} limit={limit}");
        params.push(Value::from(limit as i64));
        params.push(Value::from(skip as i64));

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_from_iter(params), Self::row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Count the records matching `predicate`.
    pub fn count(&self, predicate: &Predicate) -> DatabaseResult<u64> {
        let mut params: Vec<Value> = Vec::new();
        let clause = predicate_sql(predicate, &mut params);
        let sql = format!("SELECT COUNT(*) FROM records WHERE {clause}");

        let conn = self.conn.lock();
        let count: i64 =
            conn.query_row(&sql, params_from_iter(params), |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Delete every record, returning how many were removed.
    pub fn delete_all(&self) -> DatabaseResult<u64> {
        let conn = self.conn.lock();
        let deleted = conn.execute("DELETE FROM records", [])?;
        Ok(deleted as u64)
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<Record> {
        let timestamp_str: String = row.get("createdAt")?;
        Ok(Record {
            id: row.get("id")?,
            drive: row.get("drive")?,
            metadata: row.get("metadata")?,
            reporter: row.get("reporter")?,
            created_at: parse_db_timestamp(&timestamp_str),
        })
    }
}

/// Register `regexp(pattern, text)` so `column REGEXP ?` works in SQL.
/// Compiled patterns are cached on the statement via auxdata.
fn add_regexp_function(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "regexp",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        move |ctx| {
            let pattern: Arc<Regex> = ctx.get_or_create_aux(0, |vr| -> Result<_, BoxError> {
                Ok(Regex::new(vr.as_str()?)?)
            })?;
            let text = ctx
                .get_raw(1)
                .as_str()
                .map_err(|e| rusqlite::Error::UserFunctionError(e.into()))?;
            Ok(pattern.is_match(text))
        },
    )
}

fn column(field: Field) -> &'static str {
    match field {
        Field::Id => "id",
        Field::Drive => "drive",
        Field::Metadata => "metadata",
        Field::Reporter => "reporter",
    }
}

/// Translate a predicate tree into a SQL boolean expression, pushing its
/// bound values onto `params` in match order.
fn predicate_sql(predicate: &Predicate, params: &mut Vec<Value>) -> String {
    match predicate {
        Predicate::FieldMatch { field, token } => {
            params.push(Value::from(token_pattern(token)));
            format!("{} REGEXP ?", column(*field))
        }
        Predicate::ExactEq { field, value } => {
            params.push(Value::from(value.clone()));
            format!("{} = ?", column(*field))
        }
        Predicate::And(children) if children.is_empty() => "1".to_string(),
        Predicate::Or(children) if children.is_empty() => "0".to_string(),
        Predicate::And(children) => {
            let parts: Vec<String> =
                children.iter().map(|child| predicate_sql(child, params)).collect();
            format!("({})", parts.join(" AND "))
        }
        Predicate::Or(children) => {
            let parts: Vec<String> =
                children.iter().map(|child| predicate_sql(child, params)).collect();
            format!("({})", parts.join(" OR "))
        }
    }
}
