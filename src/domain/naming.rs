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

//! Filename derivation for exported rows.
//!
//! A NULL name value becomes the empty string, so a table with several NULL
//! names collides on `<extension>` and the run fails with `DuplicateFilename`.

use crate::domain::entities::NamingPolicy;
use crate::domain::errors::{ExportError, Result};
use std::collections::HashSet;

/// Allocates one filename per row and remembers every name handed out.
///
/// Created fresh for each run; the used-name set never outlives it.
#[derive(Debug)]
pub struct FilenameAllocator {
    prefix: Option<String>,
    extension: String,
    used: HashSet<String>,
}

impl FilenameAllocator {
    pub fn new(policy: &NamingPolicy) -> Self {
        Self {
            prefix: policy
                .prefix_filenames
                .then(|| policy.file_prefix.clone())
                .filter(|p| !p.is_empty()),
            extension: policy.file_extension.clone(),
            used: HashSet::new(),
        }
    }

    /// Derives the filename for `name_value` and claims it for this run.
    pub fn allocate(&mut self, name_value: Option<&str>) -> Result<String> {
        let stem = name_value.unwrap_or_default();
        let filename = match &self.prefix {
            Some(prefix) => format!("{}_{}{}", prefix, stem, self.extension),
            None => format!("{}{}", stem, self.extension),
        };

        if filename.contains(['/', '\\', '\0']) || filename == "." || filename == ".." {
            return Err(ExportError::InvalidFilename(filename));
        }
        if !self.used.insert(filename.clone()) {
            return Err(ExportError::DuplicateFilename(filename));
        }
        Ok(filename)
    }

    /// Number of filenames allocated so far.
    pub fn allocated(&self) -> usize {
        self.used.len()
    }
}
