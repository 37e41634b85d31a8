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

//! Income band classification.
//!
//! Buckets a numeric value (typically an income expressed as a multiple
//! of the minimum wage) into half-open bands `[lower, upper)` built from
//! an ordered boundary set. The final band is unbounded above. Missing
//! values classify into an explicit no-data bucket rather than being
//! dropped, so population shares can report the excluded fraction.

use crate::error::{NpvError, NpvResult};
use fwmd_core::Value;
use std::fmt;

/// One half-open band `[lower, upper)`; `upper == None` means unbounded.
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    lower: f64,
    upper: Option<f64>,
    label: String,
}

impl Band {
    /// Inclusive lower bound.
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// Exclusive upper bound; `None` for the final band.
    pub fn upper(&self) -> Option<f64> {
        self.upper
    }

    /// Human-readable label, e.g. `2-5` or `10+`.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// Classification result: a band, or the explicit no-data bucket.
#[derive(Debug, Clone, PartialEq)]
pub enum Bucket<'a> {
    Band(&'a Band),
    NoData,
}

impl Bucket<'_> {
    /// Label of the band, or `"no data"`.
    pub fn label(&self) -> &str {
        match self {
            Self::Band(band) => band.label(),
            Self::NoData => "no data",
        }
    }
}

/// An ordered set of bands partitioning the whole numeric line.
///
/// Built from strictly increasing boundaries `b1 < b2 < … < bn`:
/// `[0, b1), [b1, b2), …, [bn, ∞)`. Every finite value classifies into
/// exactly one band (values below `b1`, not expected for incomes, land
/// in the first).
#[derive(Debug, Clone, PartialEq)]
pub struct BandSet {
    bands: Vec<Band>,
}

impl BandSet {
    /// Build bands from an ordered boundary set.
    pub fn new(boundaries: &[f64]) -> NpvResult<Self> {
        if boundaries.is_empty() {
            return Err(NpvError::InvalidBoundaries {
                reason: "no boundaries given",
            });
        }
        if boundaries.iter().any(|b| !b.is_finite() || *b <= 0.0) {
            return Err(NpvError::InvalidBoundaries {
                reason: "boundaries must be finite and positive",
            });
        }
        if boundaries.windows(2).any(|w| w[0] >= w[1]) {
            return Err(NpvError::InvalidBoundaries {
                reason: "boundaries must be strictly increasing",
            });
        }

        let mut bands = Vec::with_capacity(boundaries.len() + 1);
        let mut lower = 0.0;
        for &upper in boundaries {
            bands.push(Band {
                lower,
                upper: Some(upper),
                label: format!("{}-{}", fmt_bound(lower), fmt_bound(upper)),
            });
            lower = upper;
        }
        bands.push(Band {
            lower,
            upper: None,
            label: format!("{}+", fmt_bound(lower)),
        });

        Ok(Self { bands })
    }

    /// All bands in ascending order.
    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    /// The band containing a finite value. Total: exactly one band
    /// matches any input.
    pub fn classify(&self, value: f64) -> &Band {
        for band in &self.bands {
            match band.upper {
                Some(upper) if value < upper => return band,
                None => return band,
                _ => {}
            }
        }
        // The last band is unbounded, so the loop always returns.
        unreachable!("band set does not partition the line")
    }

    /// Classify a cell value; `Missing` (and text) goes to the no-data
    /// bucket instead of being silently dropped.
    pub fn classify_value(&self, value: &Value) -> Bucket<'_> {
        match value.as_number() {
            Some(n) if n.is_finite() => Bucket::Band(self.classify(n)),
            _ => Bucket::NoData,
        }
    }
}

impl Default for BandSet {
    /// The conventional minimum-wage bands: `0-2`, `2-5`, `5-10`, `10+`.
    fn default() -> Self {
        Self::new(&[2.0, 5.0, 10.0]).expect("default boundaries are valid")
    }
}

fn fmt_bound(b: f64) -> String {
    if b.fract() == 0.0 {
        format!("{}", b as i64)
    } else {
        format!("{}", b)
    }
}
