//! RecordStore, the crate's main entry point.
//!
//! Wires upload, search, listing and deletion together: requests are
//! clamped, the query is tokenized and turned into a predicate, the
//! SQLite layer runs find/count, and the result page carries the numbers
//! the pagination control needs.

use std::path::Path;

use chrono::Utc;
use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::database::{Database, DatabaseError};
use crate::models::{NewRecord, Record};
use crate::predicate::{build_predicate, CombineMode, ExactFilters, Field, Predicate};
use crate::query::tokenize;

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const LIST_PAGE_SIZE: u64 = 50;
pub const MAX_PAGE_SIZE: u64 = 200;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Database(#[from] DatabaseError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// One search call, as it arrives from the transport layer.
///
/// Out-of-range `page` and `page_size` values are corrected, not
/// rejected: `page` is floored at 1 and `page_size` clamped to
/// `[1, MAX_PAGE_SIZE]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    pub fields: Vec<Field>,
    pub filters: ExactFilters,
    pub mode: CombineMode,
    pub page: u64,
    pub page_size: u64,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            query: String::new(),
            fields: Field::ALL.to_vec(),
            filters: ExactFilters::default(),
            mode: CombineMode::And,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SearchRequest {
    pub fn with_query(query: impl Into<String>) -> Self {
        Self { query: query.into(), ..Self::default() }
    }
}

/// One page of results plus the totals the pager needs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub items: Vec<Record>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

/// Outcome of an upload.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct UploadReport {
    pub inserted: usize,
    pub total: usize,
}

/// Searchable record store backed by SQLite.
///
/// All methods take `&self`; the store is `Send + Sync` and can serve
/// concurrent requests without external locking.
pub struct RecordStore {
    db: Database,
}

impl RecordStore {
    /// Open or create a store at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Ok(Self { db: Database::open(path)? })
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self { db: Database::open_in_memory()? })
    }

    /// Normalize and insert uploaded rows, stamping each with the current
    /// time. Field indexes are (re)ensured first, so exact filters stay
    /// cheap as the table grows.
    pub fn upload(&self, rows: Vec<NewRecord>) -> StoreResult<UploadReport> {
        let total = rows.len();
        if total == 0 {
            return Ok(UploadReport { inserted: 0, total: 0 });
        }

        self.db.ensure_field_indexes()?;

        let records: Vec<Record> =
            rows.into_iter().map(|row| row.into_record(Utc::now())).collect();
        let inserted = self.db.insert_many(&records)?;
        info!("uploaded {inserted} of {total} records");
        Ok(UploadReport { inserted, total })
    }

    /// Run one search request and return the requested page, newest first.
    pub fn search(&self, request: &SearchRequest) -> StoreResult<SearchPage> {
        let page = request.page.max(1);
        let page_size = request.page_size.clamp(1, MAX_PAGE_SIZE);
        let skip = (page - 1) * page_size;

        let tokens = tokenize(&request.query);
        let predicate = build_predicate(&tokens, &request.fields, &request.filters, request.mode);

        let items = self.db.find(&predicate, skip, page_size)?;
        let total = self.db.count(&predicate)?;

        Ok(SearchPage {
            items,
            total,
            page,
            page_size,
            total_pages: total.div_ceil(page_size),
        })
    }

    /// Browse mode: every record, newest first, no filtering. The page
    /// size defaults to [`LIST_PAGE_SIZE`] when not given.
    pub fn list(&self, page: u64, page_size: Option<u64>) -> StoreResult<SearchPage> {
        self.search(&SearchRequest {
            page,
            page_size: page_size.unwrap_or(LIST_PAGE_SIZE),
            ..SearchRequest::default()
        })
    }

    /// Delete every record, returning how many were removed.
    pub fn delete_all(&self) -> StoreResult<u64> {
        let deleted = self.db.delete_all()?;
        info!("deleted {deleted} records");
        Ok(deleted)
    }

    /// Total number of stored records.
    pub fn count_all(&self) -> StoreResult<u64> {
        Ok(self.db.count(&Predicate::all())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(rows: &[(&str, &str, &str, &str)]) -> RecordStore {
        let store = RecordStore::open_in_memory().unwrap();
        let rows: Vec<NewRecord> = rows
            .iter()
            .map(|(id, drive, metadata, reporter)| NewRecord::new(*id, *drive, *metadata, *reporter))
            .collect();
        store.upload(rows).unwrap();
        store
    }

    #[test]
    fn upload_reports_inserted_count() {
        let store = RecordStore::open_in_memory().unwrap();
        let report = store
            .upload(vec![
                NewRecord::new("R-1", "D-1", "Disk A", "amy"),
                NewRecord::new("R-2", "D-1", "Disk B", "bob"),
            ])
            .unwrap();
        assert_eq!(report.inserted, 2);
        assert_eq!(report.total, 2);
        assert_eq!(store.count_all().unwrap(), 2);
    }

    #[test]
    fn empty_upload_is_a_no_op() {
        let store = RecordStore::open_in_memory().unwrap();
        let report = store.upload(Vec::new()).unwrap();
        assert_eq!(report.inserted, 0);
        assert_eq!(store.count_all().unwrap(), 0);
    }

    #[test]
    fn page_and_page_size_are_clamped() {
        let store = store_with(&[("R-1", "D-1", "Disk A", "amy")]);

        let page = store
            .search(&SearchRequest { page: 0, page_size: 0, ..SearchRequest::default() })
            .unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 1);

        let page = store
            .search(&SearchRequest { page_size: 500, ..SearchRequest::default() })
            .unwrap();
        assert_eq!(page.page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn total_pages_is_ceil_of_total() {
        let store = RecordStore::open_in_memory().unwrap();
        let rows: Vec<NewRecord> = (0..45)
            .map(|i| NewRecord::new(format!("R-{i}"), "D", "m", "r"))
            .collect();
        store.upload(rows).unwrap();

        let page = store
            .search(&SearchRequest { page_size: 20, ..SearchRequest::default() })
            .unwrap();
        assert_eq!(page.total, 45);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 20);
    }

    #[test]
    fn empty_store_has_zero_total_pages() {
        let store = RecordStore::open_in_memory().unwrap();
        let page = store.search(&SearchRequest::default()).unwrap();
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
    }

    #[test]
    fn list_matches_blank_search() {
        let store = store_with(&[
            ("R-1", "D-1", "Disk A", "amy"),
            ("R-2", "D-1", "Disk B", "bob"),
        ]);

        let listed = store.list(1, None).unwrap();
        assert_eq!(listed.page_size, LIST_PAGE_SIZE);
        let searched = store
            .search(&SearchRequest { page_size: 50, ..SearchRequest::default() })
            .unwrap();
        assert_eq!(listed.items, searched.items);
        assert_eq!(listed.total, 2);
    }

    #[test]
    fn search_request_deserializes_from_wire_shape() {
        let request: SearchRequest = serde_json::from_str(
            r#"{
                "query": "disk",
                "filters": { "drive": "D-1" },
                "mode": "or",
                "page": 2,
                "pageSize": 50
            }"#,
        )
        .unwrap();
        assert_eq!(request.query, "disk");
        assert_eq!(request.filters.drive.as_deref(), Some("D-1"));
        assert_eq!(request.mode, CombineMode::Or);
        assert_eq!(request.page, 2);
        assert_eq!(request.page_size, 50);
        assert_eq!(request.fields, Field::ALL.to_vec());
    }

    #[test]
    fn delete_all_empties_the_store() {
        let store = store_with(&[
            ("R-1", "D-1", "Disk A", "amy"),
            ("R-2", "D-1", "Disk B", "bob"),
        ]);
        assert_eq!(store.delete_all().unwrap(), 2);
        assert_eq!(store.count_all().unwrap(), 0);
    }
}
