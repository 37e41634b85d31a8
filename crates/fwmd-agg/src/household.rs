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

//! Person-to-household aggregation.
//!
//! Groups person records by a composite household key, summing income
//! columns (missing contributes zero) and carrying the first non-missing
//! value of every other configured column. The carry is deliberately
//! order-sensitive: first in stream order wins, not last-wins and not
//! most-common. The source format does not guarantee a canonical order,
//! and silently changing the policy changes the output.
//!
//! Household membership is not contiguous in source order, so nothing is
//! emitted until the whole input has been consumed.

use crate::error::{AggError, AggResult};
use fwmd_core::{Record, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Which columns key, sum and carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateConfig {
    /// Composite key columns, in key order (survey year, quarter,
    /// primary sampling unit, household selection number).
    pub key_fields: Vec<String>,
    /// Income columns to sum with missing-as-zero.
    pub sum_fields: Vec<String>,
    /// Columns carried as first-non-missing.
    pub carry_fields: Vec<String>,
}

impl AggregateConfig {
    /// Validate the configuration.
    fn check(&self) -> AggResult<()> {
        if self.key_fields.is_empty() {
            return Err(AggError::NoKeyFields);
        }
        Ok(())
    }
}

/// Composite household key, canonicalized to strings so zero-padded
/// sampling-unit codes compare exactly as they appeared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HouseholdKey(Vec<String>);

impl HouseholdKey {
    /// Key components in configured order.
    pub fn components(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for HouseholdKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("-"))
    }
}

/// One aggregated household.
#[derive(Debug, Clone)]
pub struct HouseholdRecord {
    config: Arc<AggregateConfig>,
    key: HouseholdKey,
    persons: u64,
    sums: Vec<f64>,
    carried: Vec<Value>,
}

impl HouseholdRecord {
    /// The household key.
    pub fn key(&self) -> &HouseholdKey {
        &self.key
    }

    /// Contributing person records.
    pub fn persons(&self) -> u64 {
        self.persons
    }

    /// Summed value of a configured income column.
    pub fn sum(&self, field: &str) -> Option<f64> {
        let i = self.config.sum_fields.iter().position(|f| f == field)?;
        Some(self.sums[i])
    }

    /// Carried value of a configured carry column.
    pub fn carried(&self, field: &str) -> Option<&Value> {
        let i = self.config.carry_fields.iter().position(|f| f == field)?;
        Some(&self.carried[i])
    }

    /// Sum columns as `(name, total)` pairs in configured order.
    pub fn sums(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.config
            .sum_fields
            .iter()
            .map(String::as_str)
            .zip(self.sums.iter().copied())
    }
}

struct State {
    key: HouseholdKey,
    persons: u64,
    sums: Vec<f64>,
    carried: Vec<Value>,
}

/// Streaming aggregator: push person records, then [`finish`] after the
/// input is exhausted.
///
/// The accumulation map is owned by this value and scoped to one run;
/// partial aggregators from sharded runs combine with [`merge`].
///
/// [`finish`]: HouseholdAggregator::finish
/// [`merge`]: HouseholdAggregator::merge
pub struct HouseholdAggregator {
    config: Arc<AggregateConfig>,
    index: HashMap<HouseholdKey, usize>,
    households: Vec<State>,
    records: u64,
    skipped_unkeyed: u64,
}

impl HouseholdAggregator {
    /// Create an aggregator for one run.
    pub fn new(config: AggregateConfig) -> AggResult<Self> {
        config.check()?;
        Ok(Self {
            config: Arc::new(config),
            index: HashMap::new(),
            households: Vec::new(),
            records: 0,
            skipped_unkeyed: 0,
        })
    }

    /// Fold one person record into its household.
    ///
    /// Records with any missing key component cannot be attributed to a
    /// household; they are counted and skipped.
    pub fn push(&mut self, record: &Record) {
        self.records += 1;

        let mut components = Vec::with_capacity(self.config.key_fields.len());
        for field in &self.config.key_fields {
            match record.get(field) {
                Some(value) if !value.is_missing() => components.push(value.render()),
                _ => {
                    self.skipped_unkeyed += 1;
                    return;
                }
            }
        }
        let key = HouseholdKey(components);

        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = self.households.len();
                self.households.push(State {
                    key: key.clone(),
                    persons: 0,
                    sums: vec![0.0; self.config.sum_fields.len()],
                    carried: vec![Value::Missing; self.config.carry_fields.len()],
                });
                self.index.insert(key, slot);
                slot
            }
        };
        let state = &mut self.households[slot];

        state.persons += 1;
        for (i, field) in self.config.sum_fields.iter().enumerate() {
            if let Some(value) = record.get(field) {
                state.sums[i] += value.number_or_zero();
            }
        }
        for (i, field) in self.config.carry_fields.iter().enumerate() {
            if state.carried[i].is_missing() {
                if let Some(value) = record.get(field) {
                    if !value.is_missing() {
                        state.carried[i] = value.clone();
                    }
                }
            }
        }
    }

    /// Person records seen.
    pub fn records(&self) -> u64 {
        self.records
    }

    /// Records skipped for lacking a complete key.
    pub fn skipped_unkeyed(&self) -> u64 {
        self.skipped_unkeyed
    }

    /// Distinct households so far.
    pub fn len(&self) -> usize {
        self.households.len()
    }

    /// True before the first keyed record.
    pub fn is_empty(&self) -> bool {
        self.households.is_empty()
    }

    /// Absorb a partial aggregator from another shard.
    ///
    /// Sums and person counts are commutative and merge exactly. The
    /// first-non-missing carry needs a tie-break across shards: the
    /// receiver (`self`, the earlier shard) wins, and the other shard
    /// only fills values the receiver never saw.
    pub fn merge(&mut self, other: HouseholdAggregator) -> AggResult<()> {
        if self.config != other.config {
            return Err(AggError::ConfigMismatch);
        }

        for state in other.households {
            match self.index.get(&state.key) {
                Some(&slot) => {
                    let mine = &mut self.households[slot];
                    mine.persons += state.persons;
                    for (a, b) in mine.sums.iter_mut().zip(state.sums) {
                        *a += b;
                    }
                    for (a, b) in mine.carried.iter_mut().zip(state.carried) {
                        if a.is_missing() {
                            *a = b;
                        }
                    }
                }
                None => {
                    let slot = self.households.len();
                    self.index.insert(state.key.clone(), slot);
                    self.households.push(state);
                }
            }
        }
        self.records += other.records;
        self.skipped_unkeyed += other.skipped_unkeyed;
        Ok(())
    }

    /// Emit one record per household, in first-encounter order. Only
    /// meaningful after the entire input stream has been pushed.
    pub fn finish(self) -> Vec<HouseholdRecord> {
        debug!(
            households = self.households.len(),
            records = self.records,
            skipped = self.skipped_unkeyed,
            "household aggregation finished"
        );
        let config = self.config;
        self.households
            .into_iter()
            .map(|state| HouseholdRecord {
                config: config.clone(),
                key: state.key,
                persons: state.persons,
                sums: state.sums,
                carried: state.carried,
            })
            .collect()
    }
}

/// Aggregate a full record stream in one call.
pub fn aggregate_households<I>(records: I, config: AggregateConfig) -> AggResult<Vec<HouseholdRecord>>
where
    I: IntoIterator<Item = Record>,
{
    let mut aggregator = HouseholdAggregator::new(config)?;
    for record in records {
        aggregator.push(&record);
    }
    Ok(aggregator.finish())
}
