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

//! # FWMD - Fixed-Width Microdata Engine
//!
//! A streaming transformation engine for large fixed-width survey
//! extracts: layout grammar in, typed records through a memory-bounded
//! pipeline, ordered tabular stream out.
//!
//! ## Quick Start
//!
//! ```rust
//! use fwmd::{compile_expression, decode, guard_query, parse_layout};
//! use std::io::Cursor;
//!
//! let layout = parse_layout("@0001 A 3.\n@0004 B $1.\n").unwrap();
//! let filter = compile_expression("A > 5").unwrap();
//!
//! let selected: Vec<_> = decode(Cursor::new("007X\n003Y\n009Z\n"), layout)
//!     .filter_map(|r| r.ok())
//!     .filter(|r| filter.matches(r))
//!     .collect();
//! assert_eq!(selected.len(), 2);
//!
//! assert!(guard_query("SELECT 1").is_ok());
//! assert!(guard_query("DROP TABLE base").is_err());
//! ```
//!
//! ## Pipeline stages
//!
//! Data flows strictly forward, one record live at a time:
//!
//! 1. [`parse_layout`]: layout grammar into a [`LayoutSpec`]
//! 2. [`decode`]: extract lines into a lazy [`Record`] sequence
//! 3. [`compile_expression`]: sandboxed row filters and derivations
//! 4. `CodeJoiner`: additive `<field>_label` columns
//! 5. [`build_factors`] / [`apply_deflation`]: monetary adjustment
//! 6. [`aggregate_households`]: person records into household records
//!
//! ## Modules
//!
//! - [`stream`]: streaming decoder internals and configuration
//! - [`expr`]: expression sandbox and query guard
//! - [`csv`]: code dictionaries, series loaders, output writer
//! - [`npv`]: deflators, minimum wage, income bands
//! - [`agg`]: household aggregation

use std::io::Read;

// Re-export core types
pub use fwmd_core::{
    // Layout grammar
    parse_layout,
    Columns,
    FieldKind,
    FieldSpec,
    // Errors
    LayoutError,
    LayoutSpec,
    QuarterMap,
    Record,
    // Main types
    Value,
    YearMonth,
};

pub use fwmd_agg::{aggregate_households, AggregateConfig, HouseholdRecord};
pub use fwmd_expr::{compile_expression, guard_query, Evaluator, ExprError};
pub use fwmd_npv::{apply_deflation, build_factors, DeflateConfig, Deflator};
pub use fwmd_stream::{DecodeError, DecoderConfig, RecordDecoder};

/// Decode fixed-width lines into a lazy, single-pass record sequence.
pub fn decode<R: Read>(reader: R, layout: LayoutSpec) -> RecordDecoder<R> {
    RecordDecoder::new(reader, layout)
}

// Re-export streaming internals
pub mod stream {
    //! Streaming decoder internals
    pub use fwmd_stream::{
        BirthDateSpec, DecodeError, DecodeResult, DecoderConfig, HouseholdIdSpec, RecordDecoder,
        YearFilter,
    };
}

// Re-export the expression sandbox and query guard
pub mod expr {
    //! Sandboxed expressions and the query guard
    pub use fwmd_expr::{
        compile_expression, guard_query, guard_query_with, Evaluator, ExprError, ExprResult,
        ExprValue, GuardConfig,
    };
}

// Re-export CSV edges
pub mod csv {
    //! Code dictionaries, monthly series loaders, output stream
    pub use fwmd_csv::{
        read_index_series, read_wage_series, CodeJoiner, CodeTable, RecordWriter, TableError,
        TableResult,
    };
}

// Re-export monetary adjustment
pub mod npv {
    //! Deflators, minimum-wage normalization and income bands
    pub use fwmd_npv::{
        apply_deflation, build_factors, Band, BandSet, Bucket, DeflateConfig, Deflator,
        FactorTable, MonthlySeries, NpvError, NpvResult,
    };
}

// Re-export aggregation
pub mod agg {
    //! Household aggregation
    pub use fwmd_agg::{
        aggregate_households, AggError, AggResult, AggregateConfig, HouseholdAggregator,
        HouseholdKey, HouseholdRecord,
    };
}
