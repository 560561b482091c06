// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Domain Entities
//!
//! The "Nouns" of an export run: what to extract, how to name the output,
//! the rows flowing through, and the report card at the end.

use crate::domain::errors::{ExportError, Result};
use serde::{Deserialize, Serialize};

/// `ExportTarget` identifies what to extract. Immutable for a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportTarget {
    pub table: String,
    /// The BLOB/BYTEA column whose bytes become file contents.
    pub binary_column: String,
    /// Postgres schema the table lives in. Ignored by MySQL.
    pub schema: Option<String>,
}

/// `NamingPolicy` decides where each row's filename comes from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamingPolicy {
    /// Column whose value becomes the filename stem. `None` means "use the primary key".
    pub name_column: Option<String>,
    pub file_prefix: String,
    /// Includes the leading separator, e.g. `.bin`.
    pub file_extension: String,
    /// When set, filenames become `<prefix>_<name><extension>`.
    pub prefix_filenames: bool,
}

/// The bound projection handed to the row stream once the name column is known.
#[derive(Debug, Clone, PartialEq)]
pub struct RowQuery {
    pub table: String,
    pub name_column: String,
    pub binary_column: String,
    pub schema: Option<String>,
}

/// One `(name, payload)` pair pulled from the source table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub name: Option<String>,
    pub payload: Option<Vec<u8>>,
}

impl Row {
    pub fn new(name: Option<&str>, payload: Option<&[u8]>) -> Self {
        Self {
            name: name.map(str::to_string),
            payload: payload.map(<[u8]>::to_vec),
        }
    }

    /// Payload bytes; a NULL value is written as an empty file.
    pub fn payload_bytes(&self) -> &[u8] {
        self.payload.as_deref().unwrap_or_default()
    }
}

/// `ExportResult` is the terminal summary of one run.
///
/// A failed run still reports how many rows were durably written before the
/// failing one.
#[derive(Debug)]
pub struct ExportResult {
    pub table: String,
    /// The name column actually bound for the run, once resolved.
    pub name_column: Option<String>,
    pub rows_written: u64,
    pub bytes_written: u64,
    /// Wall-clock duration in seconds.
    pub duration: f64,
    pub error: Option<ExportError>,
}

impl ExportResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Converts the summary into a `Result`, surfacing the run's single error.
    pub fn into_result(mut self) -> Result<Self> {
        match self.error.take() {
            Some(e) => Err(e),
            None => Ok(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_payload_is_empty() {
        let row = Row::new(Some("1"), None);
        assert!(row.payload_bytes().is_empty());

        let row = Row::new(Some("2"), Some(&[0x00, 0x01]));
        assert_eq!(row.payload_bytes(), &[0x00, 0x01]);
    }

    #[test]
    fn test_into_result_surfaces_error() {
        let failed = ExportResult {
            table: "docs".to_string(),
            name_column: None,
            rows_written: 3,
            bytes_written: 12,
            duration: 0.1,
            error: Some(ExportError::DuplicateFilename("a.bin".to_string())),
        };
        assert!(!failed.is_success());
        assert!(matches!(
            failed.into_result(),
            Err(ExportError::DuplicateFilename(_))
        ));
    }
}
