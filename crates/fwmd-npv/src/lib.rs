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

//! Monetary adjustment for microdata: inflation deflators, minimum-wage
//! normalization, and income band classification.
//!
//! ```rust
//! use fwmd_npv::{build_factors, BandSet, Deflator, DeflateConfig, MonthlySeries};
//!
//! let index = MonthlySeries::from_pairs([
//!     ("2025-06".parse().unwrap(), 100.0),
//!     ("2025-07".parse().unwrap(), 102.0),
//! ]);
//! let wages = MonthlySeries::from_pairs([("2025-01".parse().unwrap(), 1518.0)]);
//!
//! let factors = build_factors(&index, "2025-07".parse().unwrap()).unwrap();
//! let deflator = Deflator::new(
//!     factors,
//!     &wages,
//!     DeflateConfig::new(vec!["VD4020".to_string()]),
//! )
//! .unwrap();
//! assert_eq!(deflator.wage(), 1518.0);
//!
//! let bands = BandSet::default();
//! assert_eq!(bands.classify(0.67).label(), "0-2");
//! ```

mod bands;
mod deflate;
mod error;
mod series;

pub use bands::{Band, BandSet, Bucket};
pub use deflate::{apply_deflation, build_factors, DeflateConfig, Deflator, FactorTable};
pub use error::{NpvError, NpvResult};
pub use series::MonthlySeries;

/// Re-export core types for convenience.
pub use fwmd_core::{QuarterMap, YearMonth};
