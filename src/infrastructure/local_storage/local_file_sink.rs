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

//! Infrastructure adapter for writing exported payloads to local storage.

use crate::domain::errors::{ExportError, Result};
use crate::ports::file_port::FileSink;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Concrete implementation of `FileSink` for a local output directory.
///
/// The directory must exist before the first write; this adapter never
/// creates it.
pub struct LocalFileSink {
    output_dir: PathBuf,
}

impl LocalFileSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    fn write_bytes(path: &Path, payload: &[u8]) -> std::io::Result<()> {
        let mut f = File::create(path)?;
        f.write_all(payload)?;
        f.flush()
    }
}

impl FileSink for LocalFileSink {
    fn exists(&self, filename: &str) -> bool {
        self.output_dir.join(filename).exists()
    }

    fn write_file(&self, filename: &str, payload: &[u8]) -> Result<()> {
        let path = self.output_dir.join(filename);
        Self::write_bytes(&path, payload).map_err(|source| ExportError::WriteError { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let sink = LocalFileSink::new(dir.path());

        let payload = [0xDE, 0x00, 0xAD, 0x00, 0xBE, 0xEF];
        sink.write_file("1.bin", &payload).unwrap();
        sink.write_file("empty.bin", &[]).unwrap();

        assert_eq!(std::fs::read(dir.path().join("1.bin")).unwrap(), payload);
        assert!(std::fs::read(dir.path().join("empty.bin"))
            .unwrap()
            .is_empty());
        assert!(sink.exists("1.bin"));
        assert!(!sink.exists("2.bin"));
    }

    #[test]
    fn test_write_truncates_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = LocalFileSink::new(dir.path());

        sink.write_file("a.bin", b"a much longer first payload").unwrap();
        sink.write_file("a.bin", b"short").unwrap();

        assert_eq!(std::fs::read(dir.path().join("a.bin")).unwrap(), b"short");
    }

    #[test]
    fn test_missing_directory_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let sink = LocalFileSink::new(dir.path().join("does_not_exist"));

        match sink.write_file("1.bin", b"x") {
            Err(ExportError::WriteError { path, .. }) => {
                assert!(path.ends_with("does_not_exist/1.bin"));
            }
            other => panic!("expected WriteError, got {:?}", other),
        }
    }
}
