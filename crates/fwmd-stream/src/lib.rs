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

//! Streaming decoder for fixed-width survey extracts.
//!
//! Turns multi-gigabyte extract files into a lazy sequence of typed
//! records without ever materializing the file: one line is live at a
//! time, and the consumer pulls.
//!
//! ```rust,no_run
//! use fwmd_core::parse_layout;
//! use fwmd_stream::RecordDecoder;
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let layout = parse_layout(&std::fs::read_to_string("layout.sas")?)?;
//! let file = File::open("extract.txt")?;
//! let decoder = RecordDecoder::new(BufReader::new(file), layout);
//!
//! for record in decoder {
//!     let record = record?;
//!     // process one record; nothing upstream is buffered
//! }
//! # Ok(())
//! # }
//! ```

mod decoder;
mod error;

pub use decoder::{
    BirthDateSpec, DecoderConfig, HouseholdIdSpec, RecordDecoder, YearFilter,
};
pub use error::{DecodeError, DecodeResult};

/// Re-export core types for convenience.
pub use fwmd_core::{LayoutSpec, Record, Value};
