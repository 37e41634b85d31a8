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

//! Streaming fixed-width record decoder.
//!
//! [`RecordDecoder`] turns raw extract lines into typed [`Record`]s one at
//! a time. It is pull-based: a slow consumer naturally throttles the
//! upstream read, and only the current line is ever live. The sequence is
//! finite and non-restartable.
//!
//! Data-quality policy: a malformed cell degrades to `Missing` and bumps a
//! counter; a line shorter than the layout yields `Missing` for the fields
//! it cannot cover. Neither aborts the stream. Only I/O failures and the
//! line-length guard do.

use crate::error::{DecodeError, DecodeResult};
use fwmd_core::{Columns, FieldKind, FieldSpec, LayoutSpec, Record, Value};
use std::io::{BufRead, BufReader, Read};
use std::sync::Arc;
use tracing::debug;

/// Source fields for the synthetic household identifier column.
///
/// The identifier is the concatenation `{year}{quarter}-{psu}-{selection}`
/// of the trimmed raw slices, so zero-padded sampling-unit codes keep
/// their padding. Any missing component makes the identifier `Missing`.
#[derive(Debug, Clone)]
pub struct HouseholdIdSpec {
    pub year: String,
    pub quarter: String,
    pub psu: String,
    pub selection: String,
    /// Name of the appended column.
    pub output: String,
}

/// Source fields for the synthetic calendar-date column.
///
/// Assembled as `YYYY-MM-DD` from separate day/month/year fields. Out of
/// range or non-numeric components yield `Missing`, a soft failure; the
/// record itself survives.
#[derive(Debug, Clone)]
pub struct BirthDateSpec {
    pub day: String,
    pub month: String,
    pub year: String,
    /// Name of the appended column.
    pub output: String,
}

/// Row filter on a numeric year field: rows before the cutoff are dropped
/// during decoding. Rows whose year fails to parse pass through.
#[derive(Debug, Clone)]
pub struct YearFilter {
    pub field: String,
    pub min: i32,
}

/// Configuration for [`RecordDecoder`].
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// Maximum line length in bytes; protects against reading a wrong or
    /// binary file as a fixed-width extract. Default: 1MB.
    pub max_line_length: usize,
    /// Read buffer size. Default: 64KB.
    pub buffer_size: usize,
    /// Optional synthetic household identifier.
    pub household: Option<HouseholdIdSpec>,
    /// Optional synthetic calendar date.
    pub birth_date: Option<BirthDateSpec>,
    /// Optional minimum-year row filter.
    pub year_filter: Option<YearFilter>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_line_length: 1_000_000,
            buffer_size: 64 * 1024,
            household: None,
            birth_date: None,
            year_filter: None,
        }
    }
}

/// Pull-based decoder over a forward-only line source.
///
/// Implements `Iterator<Item = Result<Record, DecodeError>>`. Columns are
/// the layout's fields in declaration order, followed by any configured
/// synthetic columns; the schema is built once and shared by every
/// emitted record.
///
/// ```rust
/// use fwmd_core::parse_layout;
/// use fwmd_stream::RecordDecoder;
/// use std::io::Cursor;
///
/// let layout = parse_layout("@0001 A 3.\n@0004 B $1.\n").unwrap();
/// let mut decoder = RecordDecoder::new(Cursor::new("007X"), layout);
///
/// let record = decoder.next().unwrap().unwrap();
/// assert_eq!(record.get("A").unwrap().as_number(), Some(7.0));
/// assert_eq!(record.get("B").unwrap().as_text(), Some("X"));
/// ```
pub struct RecordDecoder<R: Read> {
    reader: BufReader<R>,
    line: String,
    line_number: usize,
    layout: LayoutSpec,
    columns: Arc<Columns>,
    config: DecoderConfig,
    finished: bool,
    records: u64,
    corrupt_fields: u64,
    short_lines: u64,
    filtered: u64,
}

impl<R: Read> RecordDecoder<R> {
    /// Create a decoder with default configuration.
    pub fn new(reader: R, layout: LayoutSpec) -> Self {
        Self::with_config(reader, layout, DecoderConfig::default())
    }

    /// Create a decoder with custom configuration.
    pub fn with_config(reader: R, layout: LayoutSpec, config: DecoderConfig) -> Self {
        let mut names = layout.column_names();
        if let Some(birth) = &config.birth_date {
            names.push(birth.output.clone());
        }
        if let Some(household) = &config.household {
            names.push(household.output.clone());
        }
        let columns = Columns::new(names);

        Self {
            reader: BufReader::with_capacity(config.buffer_size, reader),
            line: String::new(),
            line_number: 0,
            layout,
            columns,
            config,
            finished: false,
            records: 0,
            corrupt_fields: 0,
            short_lines: 0,
            filtered: 0,
        }
    }

    /// The output schema: layout columns plus synthetic columns.
    pub fn columns(&self) -> &Arc<Columns> {
        &self.columns
    }

    /// Records emitted so far.
    pub fn records(&self) -> u64 {
        self.records
    }

    /// Cells that failed numeric decoding and degraded to `Missing`.
    pub fn corrupt_fields(&self) -> u64 {
        self.corrupt_fields
    }

    /// Lines shorter than the layout's declared width.
    pub fn short_lines(&self) -> u64 {
        self.short_lines
    }

    /// Rows dropped by the year filter.
    pub fn filtered(&self) -> u64 {
        self.filtered
    }

    /// Pull the next line into the reused buffer, stripping LF/CRLF and
    /// tracking the 1-based line number. `false` at end of input.
    fn next_line(&mut self) -> DecodeResult<bool> {
        self.line.clear();
        if self.reader.read_line(&mut self.line)? == 0 {
            return Ok(false);
        }
        self.line_number += 1;
        if self.line.ends_with('\n') {
            self.line.pop();
            if self.line.ends_with('\r') {
                self.line.pop();
            }
        }
        Ok(true)
    }

    fn next_record(&mut self) -> DecodeResult<Option<Record>> {
        loop {
            if !self.next_line()? {
                return Ok(None);
            }
            let line_no = self.line_number;

            if self.line.len() > self.config.max_line_length {
                return Err(DecodeError::LineTooLong {
                    line: line_no,
                    length: self.line.len(),
                    limit: self.config.max_line_length,
                });
            }

            let bytes = self.line.as_bytes();

            if let Some(filter) = &self.config.year_filter {
                if let Some(field) = self.layout.get(&filter.field) {
                    let raw = raw_slice(bytes, field);
                    if let Ok(year) = raw.trim().parse::<i32>() {
                        if year < filter.min {
                            self.filtered += 1;
                            continue;
                        }
                    }
                }
            }

            if bytes.len() < self.layout.line_width() {
                self.short_lines += 1;
            }

            let mut values = Vec::with_capacity(self.columns.len());
            for field in self.layout.fields() {
                let value = match decode_field(bytes, field) {
                    Ok(value) => value,
                    Err(raw) => {
                        self.corrupt_fields += 1;
                        debug!(
                            field = %field.name,
                            line = line_no,
                            raw = %raw,
                            "malformed numeric cell degraded to missing"
                        );
                        Value::Missing
                    }
                };
                values.push(value);
            }

            if let Some(birth) = &self.config.birth_date {
                values.push(compose_date(bytes, &self.layout, birth));
            }
            if let Some(household) = &self.config.household {
                values.push(compose_household_id(bytes, &self.layout, household));
            }

            self.records += 1;
            return Ok(Some(Record::new(self.columns.clone(), values)));
        }
    }
}

impl<R: Read> Iterator for RecordDecoder<R> {
    type Item = DecodeResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Slice a field's declared byte range out of a line, clamped to the line
/// length. Never reads outside the range; a field entirely past the end of
/// a short line yields the empty slice.
fn raw_slice<'a>(bytes: &'a [u8], field: &FieldSpec) -> std::borrow::Cow<'a, str> {
    let start = field.start.min(bytes.len());
    let end = field.end().min(bytes.len());
    String::from_utf8_lossy(&bytes[start..end])
}

/// Decode one cell. `Err` carries the raw text of a malformed numeric
/// cell for the caller's counter and log line.
fn decode_field(bytes: &[u8], field: &FieldSpec) -> Result<Value, String> {
    let raw = raw_slice(bytes, field);
    let trimmed = raw.trim();

    // Blank and the statistical package's `.` marker are both missing.
    if trimmed.is_empty() || trimmed == "." {
        return Ok(Value::Missing);
    }

    match field.kind {
        FieldKind::Text => Ok(Value::Text(trimmed.to_string())),
        FieldKind::Numeric { decimals } => decode_number(trimmed, decimals)
            .map(Value::Number)
            .ok_or_else(|| trimmed.to_string()),
    }
}

/// Sign-aware numeric decoding with implied decimal scaling. An explicit
/// decimal point in the data overrides the implied scaling.
fn decode_number(s: &str, decimals: u8) -> Option<f64> {
    if s.contains('.') {
        return s.parse::<f64>().ok().filter(|n| n.is_finite());
    }
    let n = s.parse::<i64>().ok()?;
    Some(n as f64 / 10f64.powi(decimals as i32))
}

fn compose_household_id(bytes: &[u8], layout: &LayoutSpec, spec: &HouseholdIdSpec) -> Value {
    let part = |name: &str| -> Option<String> {
        let field = layout.get(name)?;
        let raw = raw_slice(bytes, field);
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    };

    match (
        part(&spec.year),
        part(&spec.quarter),
        part(&spec.psu),
        part(&spec.selection),
    ) {
        (Some(year), Some(quarter), Some(psu), Some(selection)) => {
            Value::Text(format!("{}{}-{}-{}", year, quarter, psu, selection))
        }
        _ => Value::Missing,
    }
}

fn compose_date(bytes: &[u8], layout: &LayoutSpec, spec: &BirthDateSpec) -> Value {
    let part = |name: &str| -> Option<u32> {
        let field = layout.get(name)?;
        raw_slice(bytes, field).trim().parse().ok()
    };

    let (Some(day), Some(month), Some(year)) =
        (part(&spec.day), part(&spec.month), part(&spec.year))
    else {
        return Value::Missing;
    };

    // Rudimentary range validation; out of range is a soft failure.
    if year < 1900 || !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Value::Missing;
    }

    Value::Text(format!("{:04}-{:02}-{:02}", year, month, day))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fwmd_core::parse_layout;
    use std::io::Cursor;

    fn decoder(layout: &str, input: &str) -> RecordDecoder<Cursor<String>> {
        RecordDecoder::new(
            Cursor::new(input.to_string()),
            parse_layout(layout).unwrap(),
        )
    }

    // ==================== Basic decoding ====================

    #[test]
    fn test_decode_numeric_and_text() {
        let mut d = decoder("@0001 A 3.\n@0004 B $1.\n", "007X\n");
        let r = d.next().unwrap().unwrap();
        assert_eq!(r.get("A"), Some(&Value::Number(7.0)));
        assert_eq!(r.get("B"), Some(&Value::Text("X".to_string())));
        assert!(d.next().is_none());
    }

    #[test]
    fn test_implied_decimal_scaling() {
        let mut d = decoder("@0001 V 6.2\n", "001234\n");
        let r = d.next().unwrap().unwrap();
        assert_eq!(r.get("V"), Some(&Value::Number(12.34)));
    }

    #[test]
    fn test_explicit_decimal_point_overrides_scaling() {
        let mut d = decoder("@0001 V 6.2\n", "  12.5\n");
        let r = d.next().unwrap().unwrap();
        assert_eq!(r.get("V"), Some(&Value::Number(12.5)));
    }

    #[test]
    fn test_negative_number() {
        let mut d = decoder("@0001 V 4.\n", "  -7\n");
        let r = d.next().unwrap().unwrap();
        assert_eq!(r.get("V"), Some(&Value::Number(-7.0)));
    }

    #[test]
    fn test_text_is_trimmed() {
        let mut d = decoder("@0001 T $5.\n", " ab  \n");
        let r = d.next().unwrap().unwrap();
        assert_eq!(r.get("T"), Some(&Value::Text("ab".to_string())));
    }

    #[test]
    fn test_multiple_lines_multiple_records() {
        let d = decoder("@0001 A 1.\n", "1\n2\n3\n");
        let values: Vec<_> = d
            .map(|r| r.unwrap().get("A").unwrap().as_number().unwrap())
            .collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let d = decoder("@0001 A 1.\n", "1\r\n2\r\n");
        let values: Vec<_> = d
            .map(|r| r.unwrap().get("A").unwrap().as_number().unwrap())
            .collect();
        assert_eq!(values, vec![1.0, 2.0]);
    }

    #[test]
    fn test_missing_trailing_newline() {
        let mut d = decoder("@0001 A 1.\n", "7");
        let r = d.next().unwrap().unwrap();
        assert_eq!(r.get("A"), Some(&Value::Number(7.0)));
        assert!(d.next().is_none());
    }

    #[test]
    fn test_blank_line_is_an_all_missing_record() {
        let mut d = decoder("@0001 A 1.\n@0002 B $1.\n", "\nXY\n");
        let first = d.next().unwrap().unwrap();
        assert_eq!(first.get("A"), Some(&Value::Missing));
        assert_eq!(first.get("B"), Some(&Value::Missing));
        let second = d.next().unwrap().unwrap();
        assert_eq!(second.get("B"), Some(&Value::Text("Y".to_string())));
        assert_eq!(d.short_lines(), 1);
    }

    // ==================== Missing and degraded cells ====================

    #[test]
    fn test_blank_cell_is_missing() {
        let mut d = decoder("@0001 A 3.\n", "   \n");
        let r = d.next().unwrap().unwrap();
        assert_eq!(r.get("A"), Some(&Value::Missing));
    }

    #[test]
    fn test_dot_marker_is_missing() {
        let mut d = decoder("@0001 A 3.\n", "  .\n");
        let r = d.next().unwrap().unwrap();
        assert_eq!(r.get("A"), Some(&Value::Missing));
    }

    #[test]
    fn test_short_line_yields_missing_trailing_fields() {
        let mut d = decoder("@0001 A 2.\n@0003 B 2.\n@0005 C $2.\n", "42\n");
        let r = d.next().unwrap().unwrap();
        assert_eq!(r.get("A"), Some(&Value::Number(42.0)));
        assert_eq!(r.get("B"), Some(&Value::Missing));
        assert_eq!(r.get("C"), Some(&Value::Missing));
        assert_eq!(d.short_lines(), 1);
    }

    #[test]
    fn test_partially_covered_field() {
        // B declared 4 wide but the line only covers its first byte.
        let mut d = decoder("@0001 A 2.\n@0003 B 4.\n", "4212\n");
        let r = d.next().unwrap().unwrap();
        assert_eq!(r.get("B"), Some(&Value::Number(12.0)));
    }

    #[test]
    fn test_malformed_numeric_degrades_and_counts() {
        let mut d = decoder("@0001 A 3.\n@0004 B 2.\n", "x2z34\n");
        let r = d.next().unwrap().unwrap();
        assert_eq!(r.get("A"), Some(&Value::Missing));
        assert_eq!(r.get("B"), Some(&Value::Number(34.0)));
        assert_eq!(d.corrupt_fields(), 1);
        // The stream continues.
        assert!(d.next().is_none());
    }

    #[test]
    fn test_corrupt_cell_never_aborts_stream() {
        let d = decoder("@0001 A 2.\n", "zz\n11\nzz\n22\n");
        let decoded: Vec<_> = d.map(|r| r.unwrap()).collect();
        assert_eq!(decoded.len(), 4);
        assert_eq!(decoded[1].get("A"), Some(&Value::Number(11.0)));
        assert_eq!(decoded[2].get("A"), Some(&Value::Missing));
    }

    // ==================== Synthetic columns ====================

    fn household_config() -> DecoderConfig {
        DecoderConfig {
            household: Some(HouseholdIdSpec {
                year: "Ano".to_string(),
                quarter: "Trimestre".to_string(),
                psu: "UPA".to_string(),
                selection: "V1008".to_string(),
                output: "household_id".to_string(),
            }),
            ..Default::default()
        }
    }

    const HH_LAYOUT: &str = "\
@0001 Ano 4.
@0005 Trimestre 1.
@0006 UPA $9.
@0015 V1008 $2.
";

    #[test]
    fn test_household_id_concatenation() {
        let layout = parse_layout(HH_LAYOUT).unwrap();
        let mut d = RecordDecoder::with_config(
            Cursor::new("2025100012345601\n".to_string()),
            layout,
            household_config(),
        );
        let r = d.next().unwrap().unwrap();
        assert_eq!(
            r.get("household_id"),
            Some(&Value::Text("20251-000123456-01".to_string()))
        );
    }

    #[test]
    fn test_household_id_missing_component() {
        let layout = parse_layout(HH_LAYOUT).unwrap();
        let mut d = RecordDecoder::with_config(
            // UPA blank
            Cursor::new("20251         01\n".to_string()),
            layout,
            household_config(),
        );
        let r = d.next().unwrap().unwrap();
        assert_eq!(r.get("household_id"), Some(&Value::Missing));
    }

    const BIRTH_LAYOUT: &str = "\
@0001 V2008 2.
@0003 V20081 2.
@0005 V20082 4.
";

    fn birth_config() -> DecoderConfig {
        DecoderConfig {
            birth_date: Some(BirthDateSpec {
                day: "V2008".to_string(),
                month: "V20081".to_string(),
                year: "V20082".to_string(),
                output: "birth_date".to_string(),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_birth_date_assembly() {
        let layout = parse_layout(BIRTH_LAYOUT).unwrap();
        let mut d = RecordDecoder::with_config(
            Cursor::new("21031987\n".to_string()),
            layout,
            birth_config(),
        );
        let r = d.next().unwrap().unwrap();
        assert_eq!(
            r.get("birth_date"),
            Some(&Value::Text("1987-03-21".to_string()))
        );
    }

    #[test]
    fn test_birth_date_out_of_range_is_missing() {
        let layout = parse_layout(BIRTH_LAYOUT).unwrap();
        let mut d = RecordDecoder::with_config(
            Cursor::new("99991987\n".to_string()),
            layout,
            birth_config(),
        );
        let r = d.next().unwrap().unwrap();
        assert_eq!(r.get("birth_date"), Some(&Value::Missing));
    }

    #[test]
    fn test_birth_date_absent_component_is_missing() {
        let layout = parse_layout(BIRTH_LAYOUT).unwrap();
        let mut d = RecordDecoder::with_config(
            Cursor::new("21  1987\n".to_string()),
            layout,
            birth_config(),
        );
        let r = d.next().unwrap().unwrap();
        assert_eq!(r.get("birth_date"), Some(&Value::Missing));
    }

    // ==================== Year filter ====================

    #[test]
    fn test_year_filter_drops_early_rows() {
        let layout = parse_layout("@0001 Ano 4.\n@0005 V 2.\n").unwrap();
        let config = DecoderConfig {
            year_filter: Some(YearFilter {
                field: "Ano".to_string(),
                min: 2015,
            }),
            ..Default::default()
        };
        let mut d = RecordDecoder::with_config(
            Cursor::new("201411\n201522\n202533\n".to_string()),
            layout,
            config,
        );
        let first = d.next().unwrap().unwrap();
        assert_eq!(first.get("V"), Some(&Value::Number(22.0)));
        let second = d.next().unwrap().unwrap();
        assert_eq!(second.get("V"), Some(&Value::Number(33.0)));
        assert!(d.next().is_none());
        assert_eq!(d.filtered(), 1);
        assert_eq!(d.records(), 2);
    }

    // ==================== Guards ====================

    #[test]
    fn test_line_length_guard() {
        let layout = parse_layout("@0001 A 1.\n").unwrap();
        let config = DecoderConfig {
            max_line_length: 8,
            ..Default::default()
        };
        let mut d = RecordDecoder::with_config(
            Cursor::new("123456789012\n".to_string()),
            layout,
            config,
        );
        assert!(matches!(
            d.next(),
            Some(Err(DecodeError::LineTooLong { line: 1, .. }))
        ));
        // The guard is fatal: the iterator is exhausted afterwards.
        assert!(d.next().is_none());
    }

    #[test]
    fn test_columns_in_declaration_order_plus_synthetic() {
        let layout = parse_layout(HH_LAYOUT).unwrap();
        let d = RecordDecoder::with_config(
            Cursor::new(String::new()),
            layout,
            household_config(),
        );
        let names = d.columns().names().to_vec();
        assert_eq!(
            names,
            vec!["Ano", "Trimestre", "UPA", "V1008", "household_id"]
        );
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        let mut d = decoder("@0001 A 1.\n", "");
        assert!(d.next().is_none());
        assert_eq!(d.records(), 0);
    }
}
