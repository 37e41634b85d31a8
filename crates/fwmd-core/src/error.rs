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

//! Error types for layout grammar parsing.
//!
//! Layout problems are structural: every column downstream depends on the
//! declared byte ranges, so a bad layout aborts the run up front rather
//! than producing silently misaligned output. All variants that originate
//! from a source line carry its 1-based line number.

use thiserror::Error;

/// Errors raised while parsing a column-layout grammar.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// Malformed field declaration.
    #[error("layout syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// A format/informat token the grammar does not recognize.
    #[error("unrecognized informat `{token}` at line {line}")]
    UnknownFormat { line: usize, token: String },

    /// The same field name declared twice.
    #[error("duplicate field `{name}` at line {line}")]
    DuplicateField { line: usize, name: String },

    /// A field's byte range overlaps a previously declared field.
    #[error("field `{name}` at line {line} overlaps an earlier field")]
    Overlap { line: usize, name: String },

    /// The grammar text contained no field declarations at all.
    #[error("layout declares no fields")]
    Empty,
}

impl LayoutError {
    /// Create a syntax error.
    #[inline]
    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: message.into(),
        }
    }

    /// Get the offending line number if available.
    #[inline]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Syntax { line, .. }
            | Self::UnknownFormat { line, .. }
            | Self::DuplicateField { line, .. }
            | Self::Overlap { line, .. } => Some(*line),
            Self::Empty => None,
        }
    }
}

/// Result type for layout operations.
pub type LayoutResult<T> = Result<T, LayoutError>;
