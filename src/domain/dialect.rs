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

//! # Database Dialects
//!
//! Each supported backend keeps primary-key metadata in a different catalog
//! shape and quotes identifiers differently. Everything dialect-specific that
//! is not driver code lives in one static profile per dialect, looked up by
//! the `Dialect` tag carried through configuration.

use crate::domain::entities::RowQuery;
use crate::domain::errors::{ExportError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of supported database backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Dialect {
    MySql = 0,
    Postgres = 1,
}

/// Static, per-dialect SQL knowledge.
#[derive(Debug)]
pub struct DialectProfile {
    pub name: &'static str,
    pub default_port: u16,
    pub ident_quote: char,
    /// Appended to the name column in the row projection.
    pub name_cast: &'static str,
    /// Returns the key column(s) of a table; binds the table as its only parameter.
    pub primary_key_sql: &'static str,
}

// Indexed by `Dialect as usize`.
const PROFILES: [DialectProfile; 2] = [
    DialectProfile {
        name: "mysql",
        default_port: 3306,
        ident_quote: '`',
        name_cast: "",
        primary_key_sql: "
            SELECT COLUMN_NAME
            FROM INFORMATION_SCHEMA.KEY_COLUMN_USAGE
            WHERE TABLE_SCHEMA = DATABASE()
              AND TABLE_NAME = ?
              AND CONSTRAINT_NAME = 'PRIMARY'
            ORDER BY ORDINAL_POSITION
        ",
    },
    DialectProfile {
        name: "postgres",
        default_port: 5432,
        ident_quote: '"',
        name_cast: "::text",
        primary_key_sql: "
            SELECT a.attname::text
            FROM pg_index i
            JOIN pg_attribute a ON a.attrelid = i.indrelid AND a.attnum = ANY(i.indkey)
            WHERE i.indrelid = $1::text::regclass
              AND i.indisprimary
        ",
    },
];

impl Dialect {
    /// Looks up the static profile for this dialect.
    pub fn profile(self) -> &'static DialectProfile {
        &PROFILES[self as usize]
    }

    pub fn default_port(self) -> u16 {
        self.profile().default_port
    }

    pub fn primary_key_sql(self) -> &'static str {
        self.profile().primary_key_sql
    }

    /// Quotes an identifier, doubling any embedded quote character.
    pub fn quote_ident(self, ident: &str) -> String {
        let q = self.profile().ident_quote;
        let escaped = ident.replace(q, &format!("{q}{q}"));
        format!("{q}{escaped}{q}")
    }

    /// Builds the relation reference, schema-qualified when a schema is given.
    pub fn qualified_table(self, schema: Option<&str>, table: &str) -> String {
        match schema {
            Some(s) if !s.is_empty() => {
                format!("{}.{}", self.quote_ident(s), self.quote_ident(table))
            }
            _ => self.quote_ident(table),
        }
    }

    /// Builds the two-column projection `(name, payload)` streamed by an export run.
    pub fn select_sql(self, query: &RowQuery) -> String {
        format!(
            "SELECT {}{}, {} FROM {}",
            self.quote_ident(&query.name_column),
            self.profile().name_cast,
            self.quote_ident(&query.binary_column),
            self.qualified_table(query.schema.as_deref(), &query.table)
        )
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.profile().name)
    }
}

impl FromStr for Dialect {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mysql" => Ok(Dialect::MySql),
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            _ => Err(ExportError::UnsupportedDialect(s.to_string())),
        }
    }
}

impl TryFrom<String> for Dialect {
    type Error = ExportError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Dialect> for String {
    fn from(d: Dialect) -> Self {
        d.to_string()
    }
}

/// Reduces the key columns returned by a catalog query to the single name column.
pub fn single_primary_key(table: &str, mut columns: Vec<String>) -> Result<String> {
    match columns.len() {
        0 => Err(ExportError::NoPrimaryKey {
            table: table.to_string(),
        }),
        1 => Ok(columns.remove(0)),
        _ => Err(ExportError::CompositePrimaryKey {
            table: table.to_string(),
            columns,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(schema: Option<&str>) -> RowQuery {
        RowQuery {
            table: "docs".to_string(),
            name_column: "id".to_string(),
            binary_column: "blob".to_string(),
            schema: schema.map(str::to_string),
        }
    }

    #[test]
    fn test_parse_dialect() {
        assert_eq!("mysql".parse::<Dialect>().unwrap(), Dialect::MySql);
        assert_eq!("Postgres".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert_eq!("postgresql".parse::<Dialect>().unwrap(), Dialect::Postgres);

        match "sqlite".parse::<Dialect>() {
            Err(ExportError::UnsupportedDialect(d)) => assert_eq!(d, "sqlite"),
            other => panic!("expected UnsupportedDialect, got {:?}", other),
        }
    }

    #[test]
    fn test_profiles_line_up_with_tags() {
        assert_eq!(Dialect::MySql.profile().name, "mysql");
        assert_eq!(Dialect::Postgres.profile().name, "postgres");
        assert_eq!(Dialect::MySql.default_port(), 3306);
        assert_eq!(Dialect::Postgres.default_port(), 5432);
        assert!(Dialect::MySql.primary_key_sql().contains("KEY_COLUMN_USAGE"));
        assert!(Dialect::Postgres.primary_key_sql().contains("indisprimary"));
    }

    #[test]
    fn test_quote_ident_escapes_quotes() {
        assert_eq!(Dialect::MySql.quote_ident("my`col"), "`my``col`");
        assert_eq!(Dialect::Postgres.quote_ident("my\"col"), "\"my\"\"col\"");
    }

    #[test]
    fn test_select_sql() {
        assert_eq!(
            Dialect::MySql.select_sql(&query(None)),
            "SELECT `id`, `blob` FROM `docs`"
        );
        assert_eq!(
            Dialect::Postgres.select_sql(&query(Some("public"))),
            "SELECT \"id\"::text, \"blob\" FROM \"public\".\"docs\""
        );
    }

    #[test]
    fn test_single_primary_key() {
        assert_eq!(
            single_primary_key("docs", vec!["id".to_string()]).unwrap(),
            "id"
        );
        assert!(matches!(
            single_primary_key("docs", vec![]),
            Err(ExportError::NoPrimaryKey { .. })
        ));
        assert!(matches!(
            single_primary_key("docs", vec!["a".to_string(), "b".to_string()]),
            Err(ExportError::CompositePrimaryKey { .. })
        ));
    }

    #[test]
    fn test_dialect_deserializes_from_string() {
        let d: Dialect = serde_json::from_str("\"postgres\"").unwrap();
        assert_eq!(d, Dialect::Postgres);
        assert!(serde_json::from_str::<Dialect>("\"oracle\"").is_err());
    }
}
