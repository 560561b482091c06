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

//! # Column Exporter
//!
//! Extracts the values of one binary column (BLOB/BYTEA) from a MySQL or
//! PostgreSQL table and writes each value to its own file, named after the
//! row's primary key or a chosen name column.
//!
//! This application follows the **Hexagonal Architecture** (Ports and Adapters)
//! to keep the export rules independent of the database drivers.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ports;

use crate::application::orchestrator::ExportOrchestrator;
use crate::application::runtime::RuntimeContext;
use crate::config::{AppConfig, CliArgs};
use crate::domain::errors::Result;
use crate::infrastructure::local_storage::local_file_sink::LocalFileSink;
use clap::Parser;
use log::{error, info};
use std::process;

fn main() {
    // 1. Initialize Logging
    env_logger::init();

    // 2. Parse Arguments
    let args = CliArgs::parse();

    // 3. Load Config
    let config = match load_config(&args) {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run(&config) {
        error!("Failed to export data: {}", e);
        process::exit(1);
    }
}

fn load_config(args: &CliArgs) -> Result<AppConfig> {
    let config = match &args.config {
        Some(path) => {
            let mut c = AppConfig::from_file(path)?;
            c.merge_cli(args)?;
            c
        }
        None => AppConfig::from_cli(args)?,
    };
    config.validate()?;
    Ok(config)
}

fn run(config: &AppConfig) -> Result<()> {
    // 4. Prepare Output
    std::fs::create_dir_all(&config.export.output_dir)?;

    // 5. Initialize Hexagonal Components
    let runtime = RuntimeContext::init(config)?;
    let sink = LocalFileSink::new(&config.export.output_dir);

    // 6. Run Orchestrator
    let mut orchestrator = ExportOrchestrator::new(
        runtime.source,
        Box::new(sink),
        config.target(),
        config.naming_policy(),
    );

    let result = orchestrator.run().into_result()?;
    info!(
        "Export finished. {} files ({} bytes) written to {} in {:.2}s.",
        result.rows_written, result.bytes_written, config.export.output_dir, result.duration
    );
    Ok(())
}
