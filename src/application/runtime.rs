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

//! # Runtime Context
//!
//! Sets up the database resources a run needs: a single-connection `r2d2`
//! pool for the configured dialect, and the adapter that wraps the pooled
//! connection. Picking the adapter is a plain match on the dialect tag.

use crate::config::AppConfig;
use crate::domain::dialect::Dialect;
use crate::domain::errors::{ExportError, Result};
use crate::infrastructure::mysql::connection_manager::MySqlConnectionManager;
use crate::infrastructure::mysql::mysql_adapter::MySqlAdapter;
use crate::infrastructure::postgres::connection_manager::PostgresConnectionManager;
use crate::infrastructure::postgres::postgres_adapter::PostgresAdapter;
use crate::ports::extraction_port::SourcePort;
use log::info;
use r2d2::{ManageConnection, Pool, PooledConnection};
use std::time::Duration;

/// `RuntimeContext` holds the open source connection for the life of a run.
pub struct RuntimeContext {
    pub source: Box<dyn SourcePort>,
}

impl RuntimeContext {
    /// Connects to the configured database and wraps the connection in the
    /// dialect's adapter.
    ///
    /// The pool keeps retrying until the server accepts a connection or the
    /// connect timeout expires, so a database that is still starting up is
    /// waited for rather than failed immediately.
    pub fn init(config: &AppConfig) -> Result<Self> {
        let db = &config.database;
        let timeout = config.connect_timeout();
        info!(
            "Connecting to {} database {} at {}:{} (timeout {:?})",
            db.dialect,
            db.database,
            db.host,
            config.port(),
            timeout
        );

        let password = config.password();
        let source: Box<dyn SourcePort> = match db.dialect {
            Dialect::MySql => {
                let manager = MySqlConnectionManager::new(
                    &db.host,
                    config.port(),
                    &db.username,
                    &password,
                    &db.database,
                    timeout,
                );
                Box::new(MySqlAdapter::new(checkout(manager, timeout)?))
            }
            Dialect::Postgres => {
                let manager = PostgresConnectionManager::new(
                    &db.host,
                    config.port(),
                    &db.username,
                    &password,
                    &db.database,
                    timeout,
                );
                Box::new(PostgresAdapter::new(
                    checkout(manager, timeout)?,
                    config.schema().to_string(),
                    config.batch_size(),
                ))
            }
        };

        Ok(Self { source })
    }
}

/// Builds a one-connection pool and checks the connection out of it.
///
/// `test_on_check_out` pings the server before the connection is handed over.
fn checkout<M: ManageConnection>(manager: M, timeout: Duration) -> Result<PooledConnection<M>> {
    let pool = Pool::builder()
        .max_size(1)
        .connection_timeout(timeout)
        .test_on_check_out(true)
        .build(manager)
        .map_err(|e| ExportError::ConnectionFailure(e.to_string()))?;
    pool.get()
        .map_err(|e| ExportError::ConnectionFailure(e.to_string()))
}
