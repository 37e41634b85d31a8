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

//! Error types for CSV-backed tables and the output stream.

use thiserror::Error;

/// Errors loading dictionaries and series, or writing the output stream.
#[derive(Debug, Error)]
pub enum TableError {
    /// I/O error during reading or writing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from the underlying CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Required column missing from a table's header.
    #[error("missing required column: {0}")]
    MissingColumn(String),

    /// A series file whose header matches none of the accepted shapes.
    #[error("unrecognized header: expected {expected}")]
    HeaderShape { expected: &'static str },

    /// A series file that yielded no usable entries.
    #[error("series contains no usable entries")]
    EmptySeries,

    /// Row count exceeded the configured limit.
    #[error("row count exceeds the {limit} row limit")]
    RowLimit { limit: usize },
}

/// Convenience alias for table operations.
pub type TableResult<T> = std::result::Result<T, TableError>;
