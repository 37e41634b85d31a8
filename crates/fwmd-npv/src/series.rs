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

//! Monthly time series used by the deflator engine.
//!
//! Both the price-index series and the minimum-wage history are ordered
//! `YearMonth → value` maps. The one lookup rule beyond exact match is
//! "latest at or before": a wage series only carries months where the
//! wage changed, so resolving a target month walks back to the entry in
//! force.

use fwmd_core::YearMonth;
use std::collections::BTreeMap;

/// An ordered month-indexed series of values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlySeries {
    entries: BTreeMap<YearMonth, f64>,
}

impl MonthlySeries {
    /// An empty series.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a series from `(month, value)` pairs. Later duplicates of a
    /// month overwrite earlier ones.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (YearMonth, f64)>,
    {
        Self {
            entries: pairs.into_iter().collect(),
        }
    }

    /// Insert or replace one month's value.
    pub fn insert(&mut self, month: YearMonth, value: f64) {
        self.entries.insert(month, value);
    }

    /// Exact-month lookup.
    pub fn get(&self, month: YearMonth) -> Option<f64> {
        self.entries.get(&month).copied()
    }

    /// The latest entry at or before `target`, with the month it came
    /// from.
    pub fn value_at_or_before(&self, target: YearMonth) -> Option<(YearMonth, f64)> {
        self.entries
            .range(..=target)
            .next_back()
            .map(|(&m, &v)| (m, v))
    }

    /// The most recent entry in the series.
    pub fn latest(&self) -> Option<(YearMonth, f64)> {
        self.entries.iter().next_back().map(|(&m, &v)| (m, v))
    }

    /// Months in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (YearMonth, f64)> + '_ {
        self.entries.iter().map(|(&m, &v)| (m, v))
    }

    /// Number of months present.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no months are present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(YearMonth, f64)> for MonthlySeries {
    fn from_iter<I: IntoIterator<Item = (YearMonth, f64)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}
