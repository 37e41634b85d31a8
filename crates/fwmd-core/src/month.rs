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

//! Calendar month arithmetic for time-indexed series.
//!
//! Deflator indices and minimum-wage histories are keyed by calendar month.
//! [`YearMonth`] is the shared key type: totally ordered, parsed from and
//! rendered as `YYYY-MM`.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A calendar month, the key for all monthly series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct YearMonth {
    pub year: i32,
    pub month: u8,
}

/// Error parsing a `YYYY-MM` month string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid year-month `{0}`, expected YYYY-MM")]
pub struct YearMonthParseError(pub String);

impl YearMonth {
    /// Create a month, rejecting out-of-range month numbers.
    pub fn new(year: i32, month: u8) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// Compact `YYYYMM` form used as a derived-column suffix.
    pub fn suffix(&self) -> String {
        format!("{:04}{:02}", self.year, self.month)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = YearMonthParseError;

    /// Parse `YYYY-MM`. A longer string with a full date (`YYYY-MM-DD`)
    /// is accepted and truncated to its month, which is how records with
    /// an explicit date column resolve their reference month.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut parts = s.splitn(3, '-');
        let year = parts
            .next()
            .filter(|y| y.len() == 4)
            .and_then(|y| y.parse::<i32>().ok());
        let month = parts.next().and_then(|m| m.parse::<u8>().ok());
        match (year, month) {
            (Some(year), Some(month)) => {
                YearMonth::new(year, month).ok_or_else(|| YearMonthParseError(s.to_string()))
            }
            _ => Err(YearMonthParseError(s.to_string())),
        }
    }
}

/// Mapping from survey quarter to its reference month.
///
/// Records without an explicit date column resolve their reference month
/// from the quarter. The default uses the last month of each quarter, but
/// this is a policy choice, not a property of the format, so it stays
/// configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuarterMap([u8; 4]);

impl QuarterMap {
    /// Build a custom mapping; every entry must be a valid month.
    pub fn new(months: [u8; 4]) -> Option<Self> {
        if months.iter().all(|m| (1..=12).contains(m)) {
            Some(Self(months))
        } else {
            None
        }
    }

    /// Reference month for a quarter in `1..=4`.
    pub fn month_for(&self, quarter: u8) -> Option<u8> {
        match quarter {
            1..=4 => Some(self.0[quarter as usize - 1]),
            _ => None,
        }
    }

    /// Resolve a full [`YearMonth`] from a survey year and quarter.
    pub fn resolve(&self, year: i32, quarter: u8) -> Option<YearMonth> {
        self.month_for(quarter)
            .and_then(|m| YearMonth::new(year, m))
    }
}

impl Default for QuarterMap {
    /// Last month of each quarter: Q1→March, Q2→June, Q3→September,
    /// Q4→December.
    fn default() -> Self {
        Self([3, 6, 9, 12])
    }
}
