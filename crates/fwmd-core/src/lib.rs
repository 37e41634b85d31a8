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

//! Core data model for fixed-width microdata processing.
//!
//! This crate holds the pieces every other FWMD crate builds on:
//!
//! - [`Value`]: the three-way typed cell value (missing / text / number)
//! - [`layout`]: the column-layout grammar parser producing [`LayoutSpec`]
//! - [`Record`] and [`Columns`]: ephemeral decoded records over a shared
//!   column schema
//! - [`YearMonth`] and [`QuarterMap`]: calendar keys for time-indexed
//!   series
//!
//! Decoding, expression evaluation, deflation and aggregation live in the
//! sibling crates; nothing here performs I/O.

mod error;
pub mod layout;
mod month;
mod record;
mod value;

pub use error::{LayoutError, LayoutResult};
pub use layout::{parse_layout, FieldKind, FieldSpec, LayoutSpec};
pub use month::{QuarterMap, YearMonth, YearMonthParseError};
pub use record::{Columns, Record};
pub use value::Value;
