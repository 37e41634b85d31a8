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

//! Loaders for monthly series files.
//!
//! The price-index series comes in two header shapes, depending on which
//! statistics office export produced it:
//!
//! ```text
//! date,index              # date as YYYY-MM
//! year,month,index        # integer year and month
//! ```
//!
//! The minimum-wage history is always `date,value`. Decimal commas are
//! tolerated in numeric cells (the files are frequently saved from
//! pt-BR locales). Rows with an unparsable key or value are skipped,
//! not fatal; a file that yields nothing at all is.

use crate::error::{TableError, TableResult};
use fwmd_npv::MonthlySeries;
use fwmd_core::YearMonth;
use std::io::Read;
use tracing::debug;

/// Parse a numeric cell, tolerating a decimal comma.
fn parse_decimal(s: &str) -> Option<f64> {
    let s = s.trim().replace(',', ".");
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn header_position(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
}

/// Load a monthly price-index series, accepting either header shape.
pub fn read_index_series<R: Read>(reader: R) -> TableResult<MonthlySeries> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let index_idx = header_position(&headers, "index");
    let date_idx = header_position(&headers, "date");
    let year_idx = header_position(&headers, "year");
    let month_idx = header_position(&headers, "month");

    let Some(index_idx) = index_idx else {
        return Err(TableError::HeaderShape {
            expected: "(date,index) or (year,month,index)",
        });
    };

    enum Shape {
        Date(usize),
        YearMonthCols(usize, usize),
    }
    let shape = match (date_idx, year_idx, month_idx) {
        (Some(d), _, _) => Shape::Date(d),
        (None, Some(y), Some(m)) => Shape::YearMonthCols(y, m),
        _ => {
            return Err(TableError::HeaderShape {
                expected: "(date,index) or (year,month,index)",
            })
        }
    };

    let mut series = MonthlySeries::new();
    let mut skipped = 0usize;
    for row in csv_reader.records() {
        let row = row?;
        let month = match &shape {
            Shape::Date(d) => row.get(*d).and_then(|s| s.parse::<YearMonth>().ok()),
            Shape::YearMonthCols(y, m) => {
                let year = row.get(*y).and_then(|s| s.trim().parse::<i32>().ok());
                let month = row.get(*m).and_then(|s| s.trim().parse::<u8>().ok());
                match (year, month) {
                    (Some(year), Some(month)) => YearMonth::new(year, month),
                    _ => None,
                }
            }
        };
        let level = row.get(index_idx).and_then(parse_decimal);
        match (month, level) {
            (Some(month), Some(level)) => series.insert(month, level),
            _ => skipped += 1,
        }
    }

    if series.is_empty() {
        return Err(TableError::EmptySeries);
    }
    debug!(months = series.len(), skipped, "index series loaded");
    Ok(series)
}

/// Load a minimum-wage history (`date,value`).
pub fn read_wage_series<R: Read>(reader: R) -> TableResult<MonthlySeries> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let date_idx = header_position(&headers, "date")
        .ok_or_else(|| TableError::MissingColumn("date".to_string()))?;
    let value_idx = header_position(&headers, "value")
        .ok_or_else(|| TableError::MissingColumn("value".to_string()))?;

    let mut series = MonthlySeries::new();
    let mut skipped = 0usize;
    for row in csv_reader.records() {
        let row = row?;
        let month = row.get(date_idx).and_then(|s| s.parse::<YearMonth>().ok());
        let value = row.get(value_idx).and_then(parse_decimal);
        match (month, value) {
            (Some(month), Some(value)) => series.insert(month, value),
            _ => skipped += 1,
        }
    }

    if series.is_empty() {
        return Err(TableError::EmptySeries);
    }
    debug!(months = series.len(), skipped, "wage series loaded");
    Ok(series)
}
