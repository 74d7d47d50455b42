//! Record models and upload-row normalization.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored record.
///
/// Uniqueness of `id` is not enforced: uploads are append-only, and rows
/// are immutable until a wholesale delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    pub drive: String,
    pub metadata: String,
    pub reporter: String,
    pub created_at: DateTime<Utc>,
}

/// A record as it arrives from an upload, before the store stamps its
/// creation time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecord {
    pub id: String,
    pub drive: String,
    pub metadata: String,
    pub reporter: String,
}

impl NewRecord {
    pub fn new(
        id: impl Into<String>,
        drive: impl Into<String>,
        metadata: impl Into<String>,
        reporter: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            drive: drive.into(),
            metadata: metadata.into(),
            reporter: reporter.into(),
        }
    }

    /// Build a record from a spreadsheet row given as a header→value map.
    ///
    /// Header aliases are resolved in priority order; a missing column
    /// defaults to the empty string.
    pub fn from_row(row: &HashMap<String, String>) -> Self {
        Self {
            id: pick(row, &["id", "ID", "Id"]),
            drive: pick(row, &["drive", "Drive", "DRIVE", "DriveName"]),
            metadata: pick(row, &["metadata", "Metadata", "METADATA"]),
            reporter: pick(row, &["reporter", "Reporter", "REPORTER", "ReporterName"]),
        }
    }

    pub fn into_record(self, created_at: DateTime<Utc>) -> Record {
        Record {
            id: self.id,
            drive: self.drive,
            metadata: self.metadata,
            reporter: self.reporter,
            created_at,
        }
    }
}

fn pick(row: &HashMap<String, String>, aliases: &[&str]) -> String {
    aliases
        .iter()
        .find_map(|key| row.get(*key))
        .cloned()
        .unwrap_or_default()
}
