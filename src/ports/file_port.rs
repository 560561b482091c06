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

//! # File Port
//!
//! The write side of an export: one file per row, inside a directory that
//! already exists.

use crate::domain::errors::Result;

/// Port for persisting row payloads as individual files.
pub trait FileSink {
    /// Whether a file with this name is already present in the output directory.
    fn exists(&self, filename: &str) -> bool;

    /// Writes `payload` to `filename`, creating or truncating it.
    ///
    /// A failed write may leave a truncated file behind; it is not cleaned up.
    fn write_file(&self, filename: &str, payload: &[u8]) -> Result<()>;
}
