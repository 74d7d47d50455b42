//! RecordKit: a searchable store for uploaded tabular records.
//!
//! Records `(id, drive, metadata, reporter)` are uploaded append-only and
//! searched with free-text queries that combine whole-word terms and
//! quoted exact phrases across fields, AND/OR term combination, and
//! exact-match filters. Results are paginated newest-first, and matched
//! terms can be highlighted in returned rows with the same tokenization
//! the query side uses.
//!
//! # Architecture
//! - `query`: tokenization shared by the query and highlight paths
//! - `predicate`: predicate trees built from tokens and exact filters
//! - `database`: SQLite adapter translating predicates into SQL
//! - `store`: [`RecordStore`] orchestrator (upload / search / list / delete)
//! - `highlight`: display-side segment highlighting
//! - `pagination`: page-window computation for the pager control

mod database;
mod highlight;
mod models;
mod pagination;
mod predicate;
mod query;
mod store;

pub use database::{Database, DatabaseError, DatabaseResult};
pub use highlight::{highlight, Segment};
pub use models::{NewRecord, Record};
pub use pagination::{page_window, PageItem};
pub use predicate::{build_predicate, CombineMode, ExactFilters, Field, Predicate};
pub use query::{tokenize, Token};
pub use store::{
    RecordStore, SearchPage, SearchRequest, StoreError, StoreResult, UploadReport,
    DEFAULT_PAGE_SIZE, LIST_PAGE_SIZE, MAX_PAGE_SIZE,
};
