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

//! Household aggregation for person-level microdata.
//!
//! Streams person records into per-household sums, person counts and
//! first-non-missing carried columns, emitting households only once the
//! whole input is consumed. Sharded runs merge partial aggregators with
//! a documented carry tie-break.

mod error;
mod household;

pub use error::{AggError, AggResult};
pub use household::{
    aggregate_households, AggregateConfig, HouseholdAggregator, HouseholdKey, HouseholdRecord,
};
