// Dweve FWMD - Fixed-Width Microdata Engine
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Code dictionaries and the label join.
//!
//! Survey extracts carry categorical codes (`UF = 35`); the dictionaries
//! map them to labels (`São Paulo`). Codes arrive zero-padded or not
//! depending on which vintage of dictionary produced them, so lookup
//! tries the exact form first and the padding-normalized form second.
//!
//! Labels are strictly additive: the join appends `<field>_label`
//! columns and never alters the original values.

use crate::error::{TableError, TableResult};
use fwmd_core::{Columns, Record, Value};
use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;
use tracing::debug;

/// Row cap for dictionary files; a code table is a small lookup table,
/// anything bigger is a wrong file.
pub const MAX_CODE_ROWS: usize = 1_000_000;

/// Zero-padding normalization: `"035"` and `"35"` are the same code, and
/// a run of zeros means the code `0`.
fn normalize_code(code: &str) -> &str {
    let stripped = code.trim_start_matches('0');
    if stripped.is_empty() && !code.is_empty() {
        "0"
    } else {
        stripped
    }
}

/// One field's code → label dictionary with O(1) lookup.
#[derive(Debug, Clone, Default)]
pub struct CodeTable {
    exact: HashMap<String, String>,
    normalized: HashMap<String, String>,
}

impl CodeTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(code, label)` pairs.
    pub fn from_pairs<I, C, L>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, L)>,
        C: Into<String>,
        L: Into<String>,
    {
        let mut table = Self::new();
        for (code, label) in pairs {
            table.insert(code.into(), label.into());
        }
        table
    }

    /// Load from a `code,label` CSV.
    pub fn from_reader<R: Read>(reader: R) -> TableResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let code_idx = header_position(&headers, "code")
            .ok_or_else(|| TableError::MissingColumn("code".to_string()))?;
        let label_idx = header_position(&headers, "label")
            .ok_or_else(|| TableError::MissingColumn("label".to_string()))?;

        let mut table = Self::new();
        for (row_count, row) in csv_reader.records().enumerate() {
            if row_count >= MAX_CODE_ROWS {
                return Err(TableError::RowLimit {
                    limit: MAX_CODE_ROWS,
                });
            }
            let row = row?;
            let code = row.get(code_idx).unwrap_or_default();
            let label = row.get(label_idx).unwrap_or_default();
            if !code.is_empty() {
                table.insert(code.to_string(), label.to_string());
            }
        }

        debug!(codes = table.len(), "code table loaded");
        Ok(table)
    }

    /// Insert one mapping. The first label seen for a normalized code
    /// wins the normalized slot; exact entries always win over
    /// normalized ones at lookup time.
    pub fn insert(&mut self, code: String, label: String) {
        self.normalized
            .entry(normalize_code(&code).to_string())
            .or_insert_with(|| label.clone());
        self.exact.insert(code, label);
    }

    /// Look up a raw code: exact match first, then the zero-padding
    /// normalized form.
    pub fn lookup(&self, code: &str) -> Option<&str> {
        self.exact
            .get(code)
            .or_else(|| self.normalized.get(normalize_code(code)))
            .map(String::as_str)
    }

    /// Number of exact entries.
    pub fn len(&self) -> usize {
        self.exact.len()
    }

    /// True when the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }
}

/// Joins code tables onto a record stream as `<field>_label` columns.
///
/// Registered fields that a record's schema does not carry are skipped
/// for that run. Codes that resolve to no label produce a `Missing`
/// label and bump the unmatched counter; missing codes produce a
/// `Missing` label without counting as unmatched.
#[derive(Debug, Default)]
pub struct CodeJoiner {
    tables: Vec<(String, CodeTable)>,
    lookups: u64,
    unmatched: u64,
    // (input schema, output schema, (table index, input position) per
    // appended label column)
    schema_cache: Option<(Arc<Columns>, Arc<Columns>, Vec<(usize, usize)>)>,
}

impl CodeJoiner {
    /// A joiner with no tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a field's dictionary. Registration order is label-column
    /// order in the output.
    pub fn register(&mut self, field: impl Into<String>, table: CodeTable) {
        self.tables.push((field.into(), table));
        self.schema_cache = None;
    }

    /// Append label columns to one record.
    pub fn annotate(&mut self, record: Record) -> Record {
        let (output, sources) = self.schemas_for(record.columns());

        let mut appended = Vec::with_capacity(sources.len());
        for (table_idx, position) in sources {
            let (_, table) = &self.tables[table_idx];
            let label = match code_text(record.value_at(position)) {
                Some(code) => {
                    self.lookups += 1;
                    match table.lookup(&code) {
                        Some(label) => Value::Text(label.to_string()),
                        None => {
                            self.unmatched += 1;
                            Value::Missing
                        }
                    }
                }
                None => Value::Missing,
            };
            appended.push(label);
        }

        record.into_extended(output, appended)
    }

    /// Non-missing codes looked up so far.
    pub fn lookups(&self) -> u64 {
        self.lookups
    }

    /// Lookups that found no label.
    pub fn unmatched(&self) -> u64 {
        self.unmatched
    }

    /// Fraction of lookups that found no label.
    pub fn unmatched_rate(&self) -> f64 {
        if self.lookups == 0 {
            0.0
        } else {
            self.unmatched as f64 / self.lookups as f64
        }
    }

    /// Resolve (and cache) the output schema and label sources for an
    /// input schema. Registered fields absent from the input are skipped.
    fn schemas_for(&mut self, input: &Arc<Columns>) -> (Arc<Columns>, Vec<(usize, usize)>) {
        if let Some((cached_in, cached_out, sources)) = &self.schema_cache {
            if Arc::ptr_eq(cached_in, input) {
                return (cached_out.clone(), sources.clone());
            }
        }

        let mut label_names = Vec::new();
        let mut sources = Vec::new();
        for (table_idx, (field, _)) in self.tables.iter().enumerate() {
            if let Some(position) = input.position(field) {
                label_names.push(format!("{}_label", field));
                sources.push((table_idx, position));
            }
        }
        let output = input.extended(&label_names);
        self.schema_cache = Some((input.clone(), output.clone(), sources.clone()));
        (output, sources)
    }
}

/// Case-insensitive header lookup.
fn header_position(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
}

/// Raw code text of a cell: text as-is, numbers in canonical form.
fn code_text(value: &Value) -> Option<String> {
    match value {
        Value::Missing => None,
        Value::Text(s) => Some(s.clone()),
        Value::Number(_) => Some(value.render()),
    }
}
