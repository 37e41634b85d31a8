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

//! Error types for the streaming decoder.
//!
//! Only environmental problems surface as errors here. Data-quality
//! problems inside a line (malformed numbers, short lines) degrade the
//! affected cell to `Missing` and are counted on the decoder instead;
//! a multi-gigabyte run must never abort over a few bad rows.

use thiserror::Error;

/// Errors that abort the record stream.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// IO error reading the input.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A line exceeded the configured length guard. This is a structural
    /// signal (wrong file, binary input), not a data-quality one.
    #[error("line {line} is {length} bytes, exceeding the {limit} byte limit")]
    LineTooLong {
        line: usize,
        length: usize,
        limit: usize,
    },
}

impl DecodeError {
    /// Get the line number if available.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::LineTooLong { line, .. } => Some(*line),
            Self::Io(_) => None,
        }
    }
}

/// Result type for decode operations.
pub type DecodeResult<T> = Result<T, DecodeError>;
