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

use postgres::{Client, Config, Error, NoTls};
use r2d2::ManageConnection;
use std::time::Duration;

/// R2D2 connection manager for PostgreSQL over the synchronous `postgres` driver.
#[derive(Debug)]
pub struct PostgresConnectionManager {
    config: Config,
}

impl PostgresConnectionManager {
    pub fn new(
        host: &str,
        port: u16,
        user: &str,
        pass: &str,
        database: &str,
        connect_timeout: Duration,
    ) -> Self {
        let mut config = Config::new();
        config
            .host(host)
            .port(port)
            .user(user)
            .password(pass)
            .dbname(database)
            .connect_timeout(connect_timeout);
        Self { config }
    }
}

impl ManageConnection for PostgresConnectionManager {
    type Connection = Client;
    type Error = Error;

    fn connect(&self) -> std::result::Result<Self::Connection, Self::Error> {
        self.config.connect(NoTls)
    }

    fn is_valid(&self, conn: &mut Self::Connection) -> std::result::Result<(), Self::Error> {
        conn.simple_query("SELECT 1").map(|_| ())
    }

    fn has_broken(&self, conn: &mut Self::Connection) -> bool {
        conn.is_closed()
    }
}
