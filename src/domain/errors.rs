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

//! Core error definitions for the column exporter.
//!
//! Every failure in a run maps to exactly one `ExportError` variant. None of
//! them are retried: the first error ends the run and is reported once.

use std::path::PathBuf;
use thiserror::Error;

/// Boxed driver error carried as the cause of metadata and stream failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error types encountered during the export process.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unsupported database dialect: '{0}' (expected mysql or postgres)")]
    UnsupportedDialect(String),

    #[error("Failed to connect to database: {0}")]
    ConnectionFailure(String),

    #[error("Primary key lookup failed for {table}: {detail}")]
    MetadataQueryFailed {
        table: String,
        /// The cause and everything beneath it, e.g. the server's message.
        detail: String,
        #[source]
        source: BoxError,
    },

    #[error("Table {table} has no primary key; set a name column explicitly")]
    NoPrimaryKey { table: String },

    #[error("Table {table} has a composite primary key ({}); set a name column explicitly", .columns.join(", "))]
    CompositePrimaryKey { table: String, columns: Vec<String> },

    #[error("Failed to decode row {row}: {reason}")]
    RowDecodeError { row: u64, reason: String },

    #[error("Error during row iteration: {detail}")]
    StreamError {
        detail: String,
        #[source]
        source: BoxError,
    },

    #[error("Duplicate filename detected: {0}")]
    DuplicateFilename(String),

    #[error("Invalid filename derived from row value: {0:?}")]
    InvalidFilename(String),

    #[error("Failed to write file {}: {source}", .path.display())]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ExportError {
    /// Wraps a driver error raised while querying catalog metadata for `table`.
    pub fn metadata<E>(table: &str, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        let source = source.into();
        ExportError::MetadataQueryFailed {
            table: table.to_string(),
            detail: describe_chain(&*source),
            source,
        }
    }

    /// Wraps a driver error raised while pulling rows from an open stream.
    pub fn stream<E>(source: E) -> Self
    where
        E: Into<BoxError>,
    {
        let source = source.into();
        ExportError::StreamError {
            detail: describe_chain(&*source),
            source,
        }
    }
}

/// Joins an error and its `source()` chain with `": "`.
///
/// Driver errors often print a generic top line ("db error") and keep the
/// server's message one level down; consecutive repeats are skipped.
fn describe_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut cause = err.source();
    while let Some(e) = cause {
        let text = e.to_string();
        if parts.last() != Some(&text) {
            parts.push(text);
        }
        cause = e.source();
    }
    parts.join(": ")
}

/// A specialized Result type for the column exporter.
pub type Result<T> = std::result::Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_key_message_lists_columns() {
        let err = ExportError::CompositePrimaryKey {
            table: "orders".to_string(),
            columns: vec!["tenant_id".to_string(), "order_id".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Table orders has a composite primary key (tenant_id, order_id); set a name column explicitly"
        );
    }

    #[derive(Debug)]
    struct ServerError;

    impl std::fmt::Display for ServerError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("ERROR: relation \"missing_tbl\" does not exist")
        }
    }

    impl std::error::Error for ServerError {}

    /// Mimics a driver error whose own message is generic.
    #[derive(Debug)]
    struct DriverError(ServerError);

    impl std::fmt::Display for DriverError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("db error")
        }
    }

    impl std::error::Error for DriverError {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_metadata_error_shows_server_detail() {
        let err = ExportError::metadata("missing_tbl", DriverError(ServerError));
        assert_eq!(
            err.to_string(),
            "Primary key lookup failed for missing_tbl: db error: ERROR: relation \"missing_tbl\" does not exist"
        );
    }

    #[test]
    fn test_stream_error_shows_server_detail() {
        let err = ExportError::stream(DriverError(ServerError));
        assert!(err.to_string().starts_with("Error during row iteration: db error: ERROR: relation"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_metadata_error_keeps_cause() {
        let err = ExportError::metadata("docs", "permission denied");
        assert!(err.to_string().contains("permission denied"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
