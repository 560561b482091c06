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

//! # Configuration
//!
//! Settings come from an optional YAML/JSON file and from CLI flags. Flags
//! always win over the file. The merged result is validated once before any
//! connection is opened.

use crate::domain::dialect::Dialect;
use crate::domain::entities::{ExportTarget, NamingPolicy};
use crate::domain::errors::{ExportError, Result};
use clap::Parser;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::time::Duration;

pub const DEFAULT_EXTENSION: &str = ".bin";
pub const DEFAULT_BATCH_SIZE: usize = 1000;
pub const DEFAULT_SCHEMA: &str = "public";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;
pub const PASSWORD_ENV_VAR: &str = "DB_PASSWORD";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub dialect: Dialect,
    #[serde(default = "default_host")]
    pub host: String,
    /// Defaults to the dialect's standard port.
    pub port: Option<u16>,
    #[serde(default = "default_username")]
    pub username: String,
    pub password: Option<String>,
    pub database: String,
    pub connect_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExportConfig {
    pub table: String,
    /// The binary column to export (BLOB or BYTEA).
    pub column: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    pub batch_size: Option<usize>,
    pub file_prefix: Option<String>,
    pub file_extension: Option<String>,
    pub name_column: Option<String>,
    /// PostgreSQL only.
    pub schema: Option<String>,
    pub prefix_filenames: Option<bool>,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_username() -> String {
    "root".to_string()
}

fn default_output_dir() -> String {
    "./output".to_string()
}

#[derive(Parser, Debug, Default)]
#[command(
    name = "column-exporter",
    author,
    version,
    about = "Export binary column values from RDBMS to files",
    long_about = None
)]
pub struct CliArgs {
    /// Path to configuration file (YAML or JSON)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Database driver (mysql/postgres) [default: mysql]
    #[arg(long)]
    pub driver: Option<String>,
    /// Database host [default: localhost]
    #[arg(long)]
    pub host: Option<String>,
    /// Database port [default: 3306 for mysql, 5432 for postgres]
    #[arg(long)]
    pub port: Option<u16>,
    /// Database user [default: root]
    #[arg(long)]
    pub user: Option<String>,
    /// Database password (falls back to the DB_PASSWORD environment variable)
    #[arg(long)]
    pub password: Option<String>,
    /// Database name
    #[arg(long)]
    pub database: Option<String>,
    /// Table name, quoted as given and so case-sensitive (pass the schema via --schema, not schema.table)
    #[arg(long)]
    pub table: Option<String>,
    /// Binary column to export (BLOB or BINARY types only), case-sensitive
    #[arg(long)]
    pub column: Option<String>,
    /// Output directory [default: ./output]
    #[arg(short, long)]
    pub output: Option<String>,
    /// Number of rows to fetch per batch [default: 1000]
    #[arg(long)]
    pub batch_size: Option<usize>,
    /// Prefix for output files [default: <table>_<column>]
    #[arg(long)]
    pub prefix: Option<String>,
    /// File extension [default: .bin]
    #[arg(long = "ext")]
    pub ext: Option<String>,
    /// Column to use for output filenames, case-sensitive [default: primary key]
    #[arg(long)]
    pub name_column: Option<String>,
    /// Database schema, used by PostgreSQL; quoted and case-sensitive [default: public]
    #[arg(long)]
    pub schema: Option<String>,
    /// Prepend the prefix to every output filename
    #[arg(long)]
    pub prefix_filenames: bool,
    /// Seconds to wait for the database to accept connections [default: 30]
    #[arg(long)]
    pub connect_timeout: Option<u64>,
}

impl AppConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: AppConfig = if path.ends_with(".json") {
            serde_json::from_str(&contents)
                .map_err(|e| ExportError::ConfigError(format!("{}: {}", path, e)))?
        } else {
            serde_yaml::from_str(&contents)
                .map_err(|e| ExportError::ConfigError(format!("{}: {}", path, e)))?
        };

        Ok(config)
    }

    /// Builds a config purely from CLI flags, for runs without a config file.
    pub fn from_cli(args: &CliArgs) -> Result<Self> {
        let required = |value: &Option<String>, flag: &str| {
            value
                .clone()
                .ok_or_else(|| ExportError::ConfigError(format!("--{} is required", flag)))
        };

        let mut config = Self {
            database: DatabaseConfig {
                dialect: Dialect::MySql,
                host: default_host(),
                port: None,
                username: default_username(),
                password: None,
                database: required(&args.database, "database")?,
                connect_timeout_secs: None,
            },
            export: ExportConfig {
                table: required(&args.table, "table")?,
                column: required(&args.column, "column")?,
                output_dir: default_output_dir(),
                batch_size: None,
                file_prefix: None,
                file_extension: None,
                name_column: None,
                schema: None,
                prefix_filenames: None,
            },
        };
        config.merge_cli(args)?;
        Ok(config)
    }

    pub fn merge_cli(&mut self, args: &CliArgs) -> Result<()> {
        if let Some(d) = &args.driver { self.database.dialect = d.parse()?; }
        if let Some(h) = &args.host { self.database.host = h.clone(); }
        if let Some(p) = args.port { self.database.port = Some(p); }
        if let Some(u) = &args.user { self.database.username = u.clone(); }
        if let Some(p) = &args.password { self.database.password = Some(p.clone()); }
        if let Some(d) = &args.database { self.database.database = d.clone(); }
        if let Some(t) = args.connect_timeout { self.database.connect_timeout_secs = Some(t); }
        if let Some(t) = &args.table { self.export.table = t.clone(); }
        if let Some(c) = &args.column { self.export.column = c.clone(); }
        if let Some(o) = &args.output { self.export.output_dir = o.clone(); }
        if let Some(b) = args.batch_size { self.export.batch_size = Some(b); }
        if let Some(p) = &args.prefix { self.export.file_prefix = Some(p.clone()); }
        if let Some(e) = &args.ext { self.export.file_extension = Some(e.clone()); }
        if let Some(n) = &args.name_column { self.export.name_column = Some(n.clone()); }
        if let Some(s) = &args.schema { self.export.schema = Some(s.clone()); }
        if args.prefix_filenames { self.export.prefix_filenames = Some(true); }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let non_empty = [
            ("database", &self.database.database),
            ("table", &self.export.table),
            ("column", &self.export.column),
            ("output", &self.export.output_dir),
        ];
        for (name, value) in non_empty {
            if value.trim().is_empty() {
                return Err(ExportError::ConfigError(format!("{} must not be empty", name)));
            }
        }
        if self.export.batch_size == Some(0) {
            return Err(ExportError::ConfigError("batch size must be at least 1".to_string()));
        }
        if let Some(n) = &self.export.name_column {
            if n.trim().is_empty() {
                return Err(ExportError::ConfigError("name column must not be empty".to_string()));
            }
        }
        if self.extension().contains(['/', '\\']) {
            return Err(ExportError::ConfigError(format!(
                "file extension {:?} must not contain a path separator",
                self.extension()
            )));
        }
        Ok(())
    }

    pub fn port(&self) -> u16 {
        self.database
            .port
            .unwrap_or_else(|| self.database.dialect.default_port())
    }

    /// Password from the config, falling back to `DB_PASSWORD`.
    pub fn password(&self) -> String {
        self.database
            .password
            .clone()
            .or_else(|| std::env::var(PASSWORD_ENV_VAR).ok())
            .unwrap_or_default()
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(
            self.database
                .connect_timeout_secs
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        )
    }

    pub fn batch_size(&self) -> usize {
        self.export.batch_size.unwrap_or(DEFAULT_BATCH_SIZE)
    }

    pub fn schema(&self) -> &str {
        self.export.schema.as_deref().unwrap_or(DEFAULT_SCHEMA)
    }

    pub fn extension(&self) -> &str {
        self.export
            .file_extension
            .as_deref()
            .unwrap_or(DEFAULT_EXTENSION)
    }

    /// The configured prefix, or `<table>_<column>` when none was given.
    pub fn file_prefix(&self) -> String {
        match &self.export.file_prefix {
            Some(p) if !p.is_empty() => p.clone(),
            _ => format!("{}_{}", self.export.table, self.export.column),
        }
    }

    pub fn target(&self) -> ExportTarget {
        ExportTarget {
            table: self.export.table.clone(),
            binary_column: self.export.column.clone(),
            schema: match self.database.dialect {
                Dialect::Postgres => Some(self.schema().to_string()),
                Dialect::MySql => None,
            },
        }
    }

    pub fn naming_policy(&self) -> NamingPolicy {
        NamingPolicy {
            name_column: self.export.name_column.clone(),
            file_prefix: self.file_prefix(),
            file_extension: self.extension().to_string(),
            prefix_filenames: self.export.prefix_filenames.unwrap_or(false),
        }
    }
}
