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

//! # Metadata Port
//!
//! This Port defines what it means to "find the primary key" of a table.
//! It doesn't care IF the database is MySQL, PostgreSQL, or a Mock for
//! testing: each adapter runs its own catalog query behind the same call.

use crate::domain::errors::Result;

/// `MetadataPort` resolves the column that names each exported file when
/// the caller did not pick one.
pub trait MetadataPort: Send {
    /// Returns the single primary-key column of `table`.
    ///
    /// Fails with `NoPrimaryKey` when the table has none and with
    /// `MetadataQueryFailed` when the catalog query itself fails.
    fn resolve_primary_key(&mut self, table: &str) -> Result<String>;
}
