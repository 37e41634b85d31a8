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

//! CSV-facing edges of the microdata pipeline.
//!
//! Everything delimited lives here, behind the `csv` crate:
//!
//! - [`CodeTable`] / [`CodeJoiner`]: categorical code dictionaries and
//!   the additive `<field>_label` join
//! - [`read_index_series`] / [`read_wage_series`]: monthly series
//!   loaders for the deflator engine
//! - [`RecordWriter`]: the ordered header-plus-rows output stream

mod codes;
mod error;
mod series;
mod writer;

pub use codes::{CodeJoiner, CodeTable, MAX_CODE_ROWS};
pub use error::{TableError, TableResult};
pub use series::{read_index_series, read_wage_series};
pub use writer::RecordWriter;
