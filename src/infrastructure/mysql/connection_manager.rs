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

use mysql::prelude::Queryable;
use mysql::{Conn, Error, Opts, OptsBuilder};
use r2d2::ManageConnection;
use std::time::Duration;

/// R2D2 connection manager for MySQL over the synchronous `mysql` driver.
#[derive(Debug)]
pub struct MySqlConnectionManager {
    opts: Opts,
}

impl MySqlConnectionManager {
    pub fn new(
        host: &str,
        port: u16,
        user: &str,
        pass: &str,
        database: &str,
        connect_timeout: Duration,
    ) -> Self {
        let builder = OptsBuilder::new()
            .ip_or_hostname(Some(host))
            .tcp_port(port)
            .user(Some(user))
            .pass(Some(pass))
            .db_name(Some(database))
            .tcp_connect_timeout(Some(connect_timeout));
        Self {
            opts: Opts::from(builder),
        }
    }
}

impl ManageConnection for MySqlConnectionManager {
    type Connection = Conn;
    type Error = Error;

    fn connect(&self) -> std::result::Result<Self::Connection, Self::Error> {
        Conn::new(self.opts.clone())
    }

    fn is_valid(&self, conn: &mut Self::Connection) -> std::result::Result<(), Self::Error> {
        conn.query_drop("SELECT 1")
    }

    fn has_broken(&self, _conn: &mut Self::Connection) -> bool {
        false
    }
}
