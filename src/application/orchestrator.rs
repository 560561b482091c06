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

//! The core application logic that drives one export run.
//!
//! A run moves through `Init → ResolvingName → Streaming → PerRowWrite →
//! Completed | Failed`. The first error ends it: the row stream is released,
//! no later row is touched, and the error is reported once.

use crate::domain::entities::{ExportResult, ExportTarget, NamingPolicy, Row, RowQuery};
use crate::domain::errors::Result;
use crate::domain::naming::FilenameAllocator;
use crate::ports::extraction_port::SourcePort;
use crate::ports::file_port::FileSink;
use log::{debug, error, info, warn};
use std::fmt;
use std::time::Instant;

const PROGRESS_INTERVAL: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Init,
    ResolvingName,
    Streaming,
    PerRowWrite,
    Completed,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// What a run has achieved so far; survives a failure for the summary.
#[derive(Debug)]
struct Progress {
    phase: Phase,
    name_column: Option<String>,
    rows: u64,
    bytes: u64,
}

impl Progress {
    fn new() -> Self {
        Self {
            phase: Phase::Init,
            name_column: None,
            rows: 0,
            bytes: 0,
        }
    }

    fn enter(&mut self, phase: Phase) {
        debug!("Export phase {} -> {}", self.phase, phase);
        self.phase = phase;
    }
}

/// Orchestrates the export of one binary column into one file per row.
pub struct ExportOrchestrator {
    source: Box<dyn SourcePort>,
    sink: Box<dyn FileSink>,
    target: ExportTarget,
    naming: NamingPolicy,
}

impl ExportOrchestrator {
    pub fn new(
        source: Box<dyn SourcePort>,
        sink: Box<dyn FileSink>,
        target: ExportTarget,
        naming: NamingPolicy,
    ) -> Self {
        Self {
            source,
            sink,
            target,
            naming,
        }
    }

    /// Runs the export to completion or to the first failure.
    pub fn run(&mut self) -> ExportResult {
        let start_time = Instant::now();
        info!(
            "Exporting {}.{} (extension {:?})",
            self.target.table, self.target.binary_column, self.naming.file_extension
        );

        let mut progress = Progress::new();
        let error = self.execute(&mut progress).err();

        match &error {
            None => {
                progress.enter(Phase::Completed);
                info!(
                    "Export of {} complete: {} files, {} bytes",
                    self.target.table, progress.rows, progress.bytes
                );
            }
            Some(e) => {
                progress.enter(Phase::Failed);
                error!(
                    "Export of {} failed after {} files: {}",
                    self.target.table, progress.rows, e
                );
            }
        }

        ExportResult {
            table: self.target.table.clone(),
            name_column: progress.name_column,
            rows_written: progress.rows,
            bytes_written: progress.bytes,
            duration: start_time.elapsed().as_secs_f64(),
            error,
        }
    }

    fn execute(&mut self, progress: &mut Progress) -> Result<()> {
        let name_column = match &self.naming.name_column {
            Some(column) => {
                progress.enter(Phase::Streaming);
                column.clone()
            }
            None => {
                progress.enter(Phase::ResolvingName);
                let pk = self.source.resolve_primary_key(&self.target.table)?;
                progress.enter(Phase::Streaming);
                pk
            }
        };
        info!("Naming files after column {}", name_column);
        progress.name_column = Some(name_column.clone());

        let query = RowQuery {
            table: self.target.table.clone(),
            name_column,
            binary_column: self.target.binary_column.clone(),
            schema: self.target.schema.clone(),
        };

        let mut stream = self.source.open_row_stream(&query)?;
        progress.enter(Phase::PerRowWrite);

        let mut allocator = FilenameAllocator::new(&self.naming);
        let outcome = write_rows(&mut *stream, &mut allocator, self.sink.as_ref(), progress);

        match outcome {
            Ok(()) => stream.close(),
            Err(e) => {
                if let Err(close_err) = stream.close() {
                    warn!("Failed to release row stream after error: {}", close_err);
                }
                Err(e)
            }
        }
    }
}

/// Allocates a name for each row, then writes it. Allocation always comes
/// first so a collision is caught before any bytes reach the disk.
fn write_rows<I>(
    rows: &mut I,
    allocator: &mut FilenameAllocator,
    sink: &dyn FileSink,
    progress: &mut Progress,
) -> Result<()>
where
    I: Iterator<Item = Result<Row>> + ?Sized,
{
    while let Some(row) = rows.next() {
        let row = row?;
        let filename = allocator.allocate(row.name.as_deref())?;
        if sink.exists(&filename) {
            warn!("Overwriting existing file {}", filename);
        }

        let payload = row.payload_bytes();
        sink.write_file(&filename, payload)?;
        progress.rows += 1;
        progress.bytes += payload.len() as u64;
        debug!("Wrote {} ({} bytes)", filename, payload.len());

        if progress.rows % PROGRESS_INTERVAL == 0 {
            info!("{} files written", progress.rows);
        }
    }
    debug!("{} filenames allocated", allocator.allocated());
    Ok(())
}
