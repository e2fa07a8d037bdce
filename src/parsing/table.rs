// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Pipe-delimited table parsing.
//!
//! Control-plane CLIs print listings as ASCII tables:
//!
//! ```text
//! +-------------------+---------+----+
//! | VM                | State   | AZ |
//! +-------------------+---------+----+
//! | batlight/0 (abcd) | running | z1 |
//! +-------------------+---------+----+
//! ```
//!
//! Only lines containing the separator survive. The first surviving line is
//! the header, every following one is a data row. Column names are
//! discovered at runtime, so rows are returned as ordered key/value records
//! rather than fixed structs.

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;

use crate::error::{Error, Result};
use crate::parsing::common::{normalize_header, split_nonempty_fields};

/// Column separator used by control-plane tables.
pub const COLUMN_SEPARATOR: char = '|';

/// One parsed data row, keyed by normalized header tokens in column order.
///
/// A key maps to `None` when the row had fewer non-empty fields than the
/// header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRecord {
    fields: Vec<(String, Option<String>)>,
}

impl TableRecord {
    /// Build a record from `(column, value)` pairs.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, Option<V>)>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.map(Into::into)))
                .collect(),
        }
    }

    /// Value of `key`, or `None` when the column is unknown or the cell was absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == key)
    }

    /// Column names in header order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for TableRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Parser for separator-delimited tables.
#[derive(Debug, Clone, Copy)]
pub struct TableParser {
    separator: char,
    strict: bool,
}

impl Default for TableParser {
    fn default() -> Self {
        Self {
            separator: COLUMN_SEPARATOR,
            strict: false,
        }
    }
}

impl TableParser {
    /// Lenient parser: ragged rows yield absent trailing values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser that rejects rows whose non-empty field count differs from the header.
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Parse `text` into one record per data row, in row order.
    ///
    /// Text without any separator-bearing line yields an empty vector.
    pub fn parse(&self, text: &str) -> Result<Vec<TableRecord>> {
        let mut lines = text
            .lines()
            .filter(|line| line.contains(self.separator))
            .map(|line| split_nonempty_fields(line, self.separator));

        let headers: Vec<String> = match lines.next() {
            Some(fields) => fields.into_iter().map(normalize_header).collect(),
            None => return Ok(Vec::new()),
        };

        let mut records = Vec::new();
        for (index, row) in lines.enumerate() {
            if row.len() != headers.len() {
                if self.strict {
                    return Err(Error::Parse(format!(
                        "row {} has {} fields, header has {}",
                        index + 1,
                        row.len(),
                        headers.len()
                    )));
                }
                debug!(
                    "Table row {} has {} fields, header has {}",
                    index + 1,
                    row.len(),
                    headers.len()
                );
            }

            let mut values = row.into_iter();
            records.push(TableRecord {
                fields: headers
                    .iter()
                    .map(|header| (header.clone(), values.next().map(str::to_string)))
                    .collect(),
            });
        }

        Ok(records)
    }
}

/// Parse a `|`-delimited table leniently.
pub fn parse_table(text: &str) -> Vec<TableRecord> {
    // The lenient parser has no failure path.
    TableParser::new().parse(text).unwrap_or_default()
}
