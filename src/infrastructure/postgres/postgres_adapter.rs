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

//! Infrastructure adapter for resolving keys and streaming rows from PostgreSQL.

use crate::domain::dialect::{single_primary_key, Dialect};
use crate::domain::entities::{Row, RowQuery};
use crate::domain::errors::{ExportError, Result};
use crate::infrastructure::postgres::connection_manager::PostgresConnectionManager;
use crate::ports::extraction_port::{ExtractionPort, RowStream};
use crate::ports::metadata_port::MetadataPort;
use log::debug;
use postgres::{Client, Portal, Transaction};
use r2d2::PooledConnection;
use std::collections::VecDeque;

const DIALECT: Dialect = Dialect::Postgres;

/// Concrete implementation of `MetadataPort` and `ExtractionPort` for PostgreSQL.
///
/// Rows are read through a portal inside a transaction, `fetch_size` rows per
/// round trip, so arbitrarily large tables never sit in memory at once.
pub struct PostgresAdapter {
    conn: PooledConnection<PostgresConnectionManager>,
    schema: String,
    fetch_size: i32,
}

impl PostgresAdapter {
    pub fn new(
        conn: PooledConnection<PostgresConnectionManager>,
        schema: String,
        fetch_size: usize,
    ) -> Self {
        Self {
            conn,
            schema,
            fetch_size: i32::try_from(fetch_size).unwrap_or(i32::MAX).max(1),
        }
    }

    fn client(&mut self) -> &mut Client {
        &mut self.conn
    }
}

impl MetadataPort for PostgresAdapter {
    fn resolve_primary_key(&mut self, table: &str) -> Result<String> {
        let relation = DIALECT.qualified_table(Some(&self.schema), table);
        debug!("Looking up primary key of {}", relation);

        let rows = self
            .client()
            .query(DIALECT.primary_key_sql(), &[&relation])
            .map_err(|e| ExportError::metadata(table, e))?;
        let columns = rows
            .iter()
            .map(|r| r.try_get::<_, String>(0))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| ExportError::metadata(table, e))?;

        single_primary_key(table, columns)
    }
}

impl ExtractionPort for PostgresAdapter {
    fn open_row_stream<'a>(&'a mut self, query: &RowQuery) -> Result<Box<dyn RowStream + 'a>> {
        let sql = DIALECT.select_sql(query);
        let fetch_size = self.fetch_size;
        debug!("Opening portal ({} rows per fetch): {}", fetch_size, sql);

        let mut transaction = self.client().transaction().map_err(ExportError::stream)?;
        let portal = transaction.bind(sql.as_str(), &[]).map_err(ExportError::stream)?;

        Ok(Box::new(PostgresRowStream {
            transaction: Some(transaction),
            portal,
            fetch_size,
            buffer: VecDeque::new(),
            exhausted: false,
            position: 0,
        }))
    }
}

/// Forward-only cursor over a bound portal.
///
/// Dropping the stream without `close` drops the transaction, which rolls
/// it back and releases the portal.
struct PostgresRowStream<'a> {
    transaction: Option<Transaction<'a>>,
    portal: Portal,
    fetch_size: i32,
    buffer: VecDeque<postgres::Row>,
    exhausted: bool,
    position: u64,
}

impl PostgresRowStream<'_> {
    fn fetch_batch(&mut self) -> Result<()> {
        let Some(transaction) = self.transaction.as_mut() else {
            self.exhausted = true;
            return Ok(());
        };
        let rows = transaction
            .query_portal(&self.portal, self.fetch_size)
            .map_err(ExportError::stream)?;
        if rows.len() < self.fetch_size as usize {
            self.exhausted = true;
        }
        self.buffer.extend(rows);
        Ok(())
    }
}

impl Iterator for PostgresRowStream<'_> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.exhausted {
            if let Err(e) = self.fetch_batch() {
                self.exhausted = true;
                return Some(Err(e));
            }
        }
        let row = self.buffer.pop_front()?;
        self.position += 1;
        Some(decode_row(&row, self.position))
    }
}

impl RowStream for PostgresRowStream<'_> {
    fn close(mut self: Box<Self>) -> Result<()> {
        self.buffer.clear();
        match self.transaction.take() {
            Some(transaction) => transaction.commit().map_err(ExportError::stream),
            None => Ok(()),
        }
    }
}

fn decode_row(row: &postgres::Row, position: u64) -> Result<Row> {
    if row.len() != 2 {
        return Err(ExportError::RowDecodeError {
            row: position,
            reason: format!("expected 2 columns, got {}", row.len()),
        });
    }
    let name: Option<String> = row.try_get(0).map_err(|e| ExportError::RowDecodeError {
        row: position,
        reason: format!("name column: {}", e),
    })?;
    let payload: Option<Vec<u8>> = row.try_get(1).map_err(|e| ExportError::RowDecodeError {
        row: position,
        reason: format!("binary column: {}", e),
    })?;
    Ok(Row { name, payload })
}

#[cfg(test)]
mod tests {
    //! Live tests. Point `COLUMN_EXPORTER_TEST_PG` at a scratch database, e.g.
    //! `host=localhost user=postgres password=password dbname=test_export`,
    //! and run with `--ignored`.

    use super::*;
    use std::time::Duration;

    fn adapter() -> PostgresAdapter {
        let dsn = std::env::var("COLUMN_EXPORTER_TEST_PG").expect("COLUMN_EXPORTER_TEST_PG not set");
        let config: postgres::Config = dsn.parse().unwrap();
        let host = match &config.get_hosts()[0] {
            postgres::config::Host::Tcp(h) => h.clone(),
            #[allow(unreachable_patterns)]
            _ => "localhost".to_string(),
        };
        let manager = PostgresConnectionManager::new(
            &host,
            config.get_ports().first().copied().unwrap_or(5432),
            config.get_user().unwrap_or("postgres"),
            std::str::from_utf8(config.get_password().unwrap_or_default()).unwrap(),
            config.get_dbname().unwrap_or("postgres"),
            Duration::from_secs(10),
        );
        let pool = r2d2::Pool::builder().max_size(1).build(manager).unwrap();
        PostgresAdapter::new(pool.get().unwrap(), "public".to_string(), 1)
    }

    #[test]
    #[ignore]
    fn test_live_primary_key_and_stream() {
        let mut adapter = adapter();
        adapter
            .client()
            .batch_execute(
                "DROP TABLE IF EXISTS cx_docs;
                 CREATE TABLE cx_docs (id INT PRIMARY KEY, blob BYTEA);
                 INSERT INTO cx_docs VALUES (1, '\\xDEADBEEF'), (2, '\\x00'), (3, NULL);
                 DROP TABLE IF EXISTS cx_nokey;
                 CREATE TABLE cx_nokey (id INT, blob BYTEA);",
            )
            .unwrap();

        assert_eq!(adapter.resolve_primary_key("cx_docs").unwrap(), "id");
        assert!(matches!(
            adapter.resolve_primary_key("cx_nokey"),
            Err(ExportError::NoPrimaryKey { .. })
        ));
        assert!(matches!(
            adapter.resolve_primary_key("cx_missing"),
            Err(ExportError::MetadataQueryFailed { .. })
        ));

        let query = RowQuery {
            table: "cx_docs".to_string(),
            name_column: "id".to_string(),
            binary_column: "blob".to_string(),
            schema: Some("public".to_string()),
        };
        let mut stream = adapter.open_row_stream(&query).unwrap();
        let mut rows: Vec<Row> = stream.by_ref().map(|r| r.unwrap()).collect();
        stream.close().unwrap();
        rows.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], Row::new(Some("1"), Some(&[0xDE, 0xAD, 0xBE, 0xEF][..])));
        assert_eq!(rows[1], Row::new(Some("2"), Some(&[0x00][..])));
        assert_eq!(rows[2], Row::new(Some("3"), None));
    }
}
