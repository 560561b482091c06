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

//! Infrastructure adapter for resolving keys and streaming rows from MySQL.

use crate::domain::dialect::{single_primary_key, Dialect};
use crate::domain::entities::{Row, RowQuery};
use crate::domain::errors::{ExportError, Result};
use crate::infrastructure::mysql::connection_manager::MySqlConnectionManager;
use crate::ports::extraction_port::{ExtractionPort, RowStream};
use crate::ports::metadata_port::MetadataPort;
use log::debug;
use mysql::prelude::Queryable;
use mysql::{Conn, QueryResult, Text};
use r2d2::PooledConnection;

const DIALECT: Dialect = Dialect::MySql;

/// Concrete implementation of `MetadataPort` and `ExtractionPort` for MySQL.
///
/// The projection runs over the text protocol and is read unbuffered, one row
/// off the socket per pull.
pub struct MySqlAdapter {
    conn: PooledConnection<MySqlConnectionManager>,
}

impl MySqlAdapter {
    pub fn new(conn: PooledConnection<MySqlConnectionManager>) -> Self {
        Self { conn }
    }

    fn conn(&mut self) -> &mut Conn {
        &mut self.conn
    }
}

impl MetadataPort for MySqlAdapter {
    fn resolve_primary_key(&mut self, table: &str) -> Result<String> {
        debug!("Looking up primary key of {}", table);
        let columns: Vec<String> = self
            .conn()
            .exec(DIALECT.primary_key_sql(), (table,))
            .map_err(|e| ExportError::metadata(table, e))?;
        single_primary_key(table, columns)
    }
}

impl ExtractionPort for MySqlAdapter {
    fn open_row_stream<'a>(&'a mut self, query: &RowQuery) -> Result<Box<dyn RowStream + 'a>> {
        // MySQL has no schemas distinct from databases.
        let query = RowQuery {
            schema: None,
            ..query.clone()
        };
        let sql = DIALECT.select_sql(&query);
        debug!("Opening result set: {}", sql);

        let result = self.conn().query_iter(sql).map_err(ExportError::stream)?;
        Ok(Box::new(MySqlRowStream {
            result: Some(result),
            position: 0,
        }))
    }
}

/// Forward-only view of an unbuffered result set.
///
/// The text protocol has no server-side cursor to cancel: dropping the result
/// set reads and discards every row the server has not sent yet, which is what
/// frees the connection for the next statement. Closing early on a large table
/// therefore still costs a full scan of the remainder before `close` returns.
struct MySqlRowStream<'a> {
    result: Option<QueryResult<'a, 'a, 'a, Text>>,
    position: u64,
}

impl Iterator for MySqlRowStream<'_> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.result.as_mut()?;
        match result.next()? {
            Ok(row) => {
                self.position += 1;
                Some(decode_row(row, self.position))
            }
            Err(e) => {
                self.result = None;
                Some(Err(ExportError::stream(e)))
            }
        }
    }
}

impl RowStream for MySqlRowStream<'_> {
    /// Drains the rest of the result set; blocks until the server has sent
    /// every remaining row, even when the export stopped after the first one.
    fn close(mut self: Box<Self>) -> Result<()> {
        drop(self.result.take());
        Ok(())
    }
}

fn decode_row(mut row: mysql::Row, position: u64) -> Result<Row> {
    if row.len() != 2 {
        return Err(ExportError::RowDecodeError {
            row: position,
            reason: format!("expected 2 columns, got {}", row.len()),
        });
    }
    let name = take_column::<Option<String>>(&mut row, 0, position)?;
    let payload = take_column::<Option<Vec<u8>>>(&mut row, 1, position)?;
    Ok(Row { name, payload })
}

fn take_column<T: mysql::prelude::FromValue>(
    row: &mut mysql::Row,
    index: usize,
    position: u64,
) -> Result<T> {
    match row.take_opt::<T, usize>(index) {
        Some(Ok(v)) => Ok(v),
        Some(Err(e)) => Err(ExportError::RowDecodeError {
            row: position,
            reason: format!("column {}: {}", index, e),
        }),
        None => Err(ExportError::RowDecodeError {
            row: position,
            reason: format!("column {} missing", index),
        }),
    }
}
