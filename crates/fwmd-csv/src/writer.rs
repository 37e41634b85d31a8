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

//! Tabular output stream.
//!
//! The engine's output is an ordered header-plus-rows stream consumed by
//! an external storage loader. The header comes from the first record's
//! column order (layout order plus appended derived columns); `Missing`
//! renders as the empty cell so the loader's type inference is never fed
//! a sentinel.

use crate::error::TableResult;
use fwmd_core::Record;
use std::io::Write;

/// Streaming record writer: header once, then one row per record.
pub struct RecordWriter<W: Write> {
    writer: csv::Writer<W>,
    wrote_header: bool,
    rows: u64,
}

impl<W: Write> RecordWriter<W> {
    /// Create a writer with the default comma delimiter.
    pub fn new(writer: W) -> Self {
        Self::with_delimiter(writer, b',')
    }

    /// Create a writer with a custom delimiter.
    pub fn with_delimiter(writer: W, delimiter: u8) -> Self {
        Self {
            writer: csv::WriterBuilder::new()
                .delimiter(delimiter)
                .from_writer(writer),
            wrote_header: false,
            rows: 0,
        }
    }

    /// Write one record, emitting the header first if this is the first
    /// row.
    pub fn write(&mut self, record: &Record) -> TableResult<()> {
        if !self.wrote_header {
            self.writer.write_record(record.columns().names())?;
            self.wrote_header = true;
        }
        self.writer
            .write_record(record.values().iter().map(|v| v.render()))?;
        self.rows += 1;
        Ok(())
    }

    /// Rows written so far (header excluded).
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Flush and release the underlying writer.
    pub fn finish(mut self) -> TableResult<W> {
        self.writer.flush()?;
        self.writer
            .into_inner()
            .map_err(|e| std::io::Error::other(e.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fwmd_core::{Columns, Value};

    fn sample_records() -> Vec<Record> {
        let columns = Columns::new(vec![
            "UF".to_string(),
            "renda".to_string(),
            "renda_mw".to_string(),
        ]);
        vec![
            Record::new(
                columns.clone(),
                vec![
                    Value::Text("35".to_string()),
                    Value::Number(1500.0),
                    Value::Number(0.988),
                ],
            ),
            Record::new(
                columns,
                vec![Value::Text("33".to_string()), Value::Missing, Value::Missing],
            ),
        ]
    }

    #[test]
    fn test_header_then_rows() {
        let mut w = RecordWriter::new(Vec::new());
        for r in sample_records() {
            w.write(&r).unwrap();
        }
        assert_eq!(w.rows(), 2);
        let out = String::from_utf8(w.finish().unwrap()).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], "UF,renda,renda_mw");
        assert_eq!(lines[1], "35,1500,0.988");
        assert_eq!(lines[2], "33,,");
    }

    #[test]
    fn test_missing_renders_empty() {
        let columns = Columns::new(vec!["a".to_string()]);
        let r = Record::new(columns, vec![Value::Missing]);
        let mut w = RecordWriter::new(Vec::new());
        w.write(&r).unwrap();
        let out = String::from_utf8(w.finish().unwrap()).unwrap();
        assert_eq!(out, "a\n\"\"\n");
    }

    #[test]
    fn test_custom_delimiter() {
        let mut w = RecordWriter::with_delimiter(Vec::new(), b';');
        for r in sample_records() {
            w.write(&r).unwrap();
        }
        let out = String::from_utf8(w.finish().unwrap()).unwrap();
        assert!(out.starts_with("UF;renda;renda_mw\n"));
    }

    #[test]
    fn test_empty_stream_writes_nothing() {
        let w = RecordWriter::new(Vec::new());
        let out = w.finish().unwrap();
        assert!(out.is_empty());
    }
}
