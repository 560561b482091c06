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

//! # Extraction Port
//!
//! This Port defines the contract for the "Row Mover".
//!
//! Anything that implements `ExtractionPort` must be able to take a
//! `RowQuery` and hand back a forward-only stream of `(name, payload)` rows.

use crate::domain::entities::{Row, RowQuery};
use crate::domain::errors::Result;
use crate::ports::metadata_port::MetadataPort;

/// A lazy, read-once sequence of rows backed by a live server-side cursor.
///
/// Every item is either a decoded `Row` or the error that ends the scan.
/// The cursor is released by `close`, or by dropping the stream if it was
/// never closed; never both.
pub trait RowStream: Iterator<Item = Result<Row>> {
    /// Releases the cursor/result handle, reporting any error raised while
    /// doing so.
    fn close(self: Box<Self>) -> Result<()>;
}

/// `ExtractionPort` opens the two-column projection for an export run.
pub trait ExtractionPort: Send {
    /// Opens a stream over `SELECT name, payload FROM table`.
    ///
    /// The stream borrows the underlying connection until it is closed.
    fn open_row_stream<'a>(&'a mut self, query: &RowQuery) -> Result<Box<dyn RowStream + 'a>>;
}

/// A database handle that can both resolve keys and stream rows.
pub trait SourcePort: MetadataPort + ExtractionPort {}

impl<T: MetadataPort + ExtractionPort> SourcePort for T {}
