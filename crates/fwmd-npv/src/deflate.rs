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

//! Deflation of monetary columns to a target month.
//!
//! `factor(m) = index[target] / index[m]`: multiplying a value observed
//! at month `m` by its factor expresses it in the purchasing power of the
//! target month. Each deflated column also gets a minimum-wage multiple,
//! with the wage resolved once per run from the wage history.
//!
//! Per-record policy: a record whose reference month has no factor gets
//! `Missing` in the derived columns, never a fabricated zero and never
//! a run-wide failure. A missing target month, by contrast, is fatal at
//! construction time.

use crate::error::{NpvError, NpvResult};
use crate::series::MonthlySeries;
use fwmd_core::{Columns, QuarterMap, Record, Value, YearMonth};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Multipliers-to-target derived from a price-index series.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorTable {
    target: YearMonth,
    factors: BTreeMap<YearMonth, f64>,
}

impl FactorTable {
    /// The target month every factor converts to.
    pub fn target(&self) -> YearMonth {
        self.target
    }

    /// Factor for a month, if the index covered it.
    pub fn factor(&self, month: YearMonth) -> Option<f64> {
        self.factors.get(&month).copied()
    }

    /// Number of months covered.
    pub fn len(&self) -> usize {
        self.factors.len()
    }

    /// True when no months are covered.
    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    /// Factors in month order.
    pub fn iter(&self) -> impl Iterator<Item = (YearMonth, f64)> + '_ {
        self.factors.iter().map(|(&m, &v)| (m, v))
    }
}

/// Build the factor table for a target month.
///
/// Fails with [`NpvError::MissingTarget`] when the index does not cover
/// the target; every downstream monetary column would be silently wrong
/// otherwise. Months with a zero or non-finite index level are skipped.
pub fn build_factors(index: &MonthlySeries, target: YearMonth) -> NpvResult<FactorTable> {
    let target_level = index
        .get(target)
        .ok_or(NpvError::MissingTarget { target })?;

    let factors: BTreeMap<YearMonth, f64> = index
        .iter()
        .filter(|(_, level)| *level != 0.0 && level.is_finite())
        .map(|(month, level)| (month, target_level / level))
        .collect();

    debug!(months = factors.len(), target = %target, "deflator factor table built");
    Ok(FactorTable { target, factors })
}

/// Configuration for [`Deflator`].
#[derive(Debug, Clone)]
pub struct DeflateConfig {
    /// Monetary columns to deflate.
    pub columns: Vec<String>,
    /// Column carrying an explicit `YYYY-MM` (or full date) reference;
    /// when absent or unparsable the year/quarter pair is used instead.
    pub date_field: Option<String>,
    /// Survey year column.
    pub year_field: String,
    /// Survey quarter column.
    pub quarter_field: String,
    /// Quarter → reference month policy.
    pub quarter_map: QuarterMap,
}

impl DeflateConfig {
    /// Deflate `columns`, resolving reference months from the canonical
    /// year/quarter column pair.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            date_field: None,
            year_field: "Ano".to_string(),
            quarter_field: "Trimestre".to_string(),
            quarter_map: QuarterMap::default(),
        }
    }
}

/// Per-run deflation state: factor table, resolved minimum wage, and the
/// derived-column schema cache.
#[derive(Debug)]
pub struct Deflator {
    factors: FactorTable,
    config: DeflateConfig,
    wage: f64,
    wage_month: YearMonth,
    appended: Vec<String>,
    schema_cache: Option<(Arc<Columns>, Arc<Columns>)>,
}

impl Deflator {
    /// Build a deflator, resolving the minimum wage at the target month
    /// (latest entry at or before it) exactly once.
    pub fn new(
        factors: FactorTable,
        wages: &MonthlySeries,
        config: DeflateConfig,
    ) -> NpvResult<Self> {
        let target = factors.target();
        let (wage_month, wage) = wages
            .value_at_or_before(target)
            .ok_or(NpvError::NoWage { target })?;
        if wage <= 0.0 || !wage.is_finite() {
            return Err(NpvError::InvalidWage { month: wage_month });
        }
        if wage_month != target {
            info!(
                target = %target,
                resolved = %wage_month,
                wage,
                "minimum wage resolved from an earlier month"
            );
        }

        let suffix = target.suffix();
        let appended = config
            .columns
            .iter()
            .flat_map(|c| [format!("{}_{}", c, suffix), format!("{}_mw", c)])
            .collect();

        Ok(Self {
            factors,
            config,
            wage,
            wage_month,
            appended,
            schema_cache: None,
        })
    }

    /// The minimum wage in force at the target month.
    pub fn wage(&self) -> f64 {
        self.wage
    }

    /// The month the wage entry actually came from.
    pub fn wage_month(&self) -> YearMonth {
        self.wage_month
    }

    /// The target month.
    pub fn target(&self) -> YearMonth {
        self.factors.target()
    }

    /// Names of the columns this deflator appends, in order.
    pub fn appended_columns(&self) -> &[String] {
        &self.appended
    }

    /// Append the deflated and minimum-wage columns to one record.
    pub fn annotate(&mut self, record: Record) -> Record {
        let factor = self
            .reference_month(&record)
            .and_then(|m| self.factors.factor(m));

        let mut appended = Vec::with_capacity(self.appended.len());
        for column in &self.config.columns {
            let raw = record.get(column).and_then(Value::as_number);
            match (raw, factor) {
                (Some(raw), Some(factor)) => {
                    let deflated = raw * factor;
                    appended.push(Value::Number(deflated));
                    appended.push(Value::Number(deflated / self.wage));
                }
                _ => {
                    appended.push(Value::Missing);
                    appended.push(Value::Missing);
                }
            }
        }

        let columns = self.output_schema(record.columns());
        record.into_extended(columns, appended)
    }

    /// Resolve the record's reference month: explicit date column first,
    /// year/quarter fallback.
    fn reference_month(&self, record: &Record) -> Option<YearMonth> {
        if let Some(date_field) = &self.config.date_field {
            if let Some(Value::Text(s)) = record.get(date_field) {
                if let Ok(month) = s.parse::<YearMonth>() {
                    return Some(month);
                }
            }
        }

        let year = numeric_cell(record, &self.config.year_field)? as i32;
        let quarter = numeric_cell(record, &self.config.quarter_field)?;
        if quarter < 1.0 || quarter > 4.0 {
            return None;
        }
        self.config.quarter_map.resolve(year, quarter as u8)
    }

    fn output_schema(&mut self, input: &Arc<Columns>) -> Arc<Columns> {
        match &self.schema_cache {
            Some((cached_in, cached_out)) if Arc::ptr_eq(cached_in, input) => cached_out.clone(),
            _ => {
                let output = input.extended(&self.appended);
                self.schema_cache = Some((input.clone(), output.clone()));
                output
            }
        }
    }
}

/// A cell that may be numeric or numeric-looking text.
fn numeric_cell(record: &Record, name: &str) -> Option<f64> {
    match record.get(name)? {
        Value::Number(n) => Some(*n),
        Value::Text(s) => s.trim().parse().ok(),
        Value::Missing => None,
    }
}

/// Lazily deflate a record stream. The adapter owns the per-run state;
/// upstream stays pull-based and unbuffered.
pub fn apply_deflation<I>(records: I, deflator: Deflator) -> impl Iterator<Item = Record>
where
    I: Iterator<Item = Record>,
{
    let mut deflator = deflator;
    records.map(move |record| deflator.annotate(record))
}
