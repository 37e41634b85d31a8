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

//! Error types for deflation and band classification.
//!
//! These are configuration-level failures and they are fatal: a deflation
//! run with a bad target would make every downstream monetary column
//! silently wrong, which is worse than stopping.

use fwmd_core::YearMonth;
use thiserror::Error;

/// Errors from deflator construction and band configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NpvError {
    /// The deflation target month is absent from the index series.
    #[error("target month {target} missing from the index series")]
    MissingTarget { target: YearMonth },

    /// No minimum-wage entry exists at or before the target month.
    #[error("no minimum-wage entry at or before {target}")]
    NoWage { target: YearMonth },

    /// The resolved minimum wage is zero or negative.
    #[error("minimum wage at {month} is not a positive value")]
    InvalidWage { month: YearMonth },

    /// Band boundaries must be finite, positive and strictly increasing.
    #[error("invalid band boundaries: {reason}")]
    InvalidBoundaries { reason: &'static str },
}

/// Result type for deflation operations.
pub type NpvResult<T> = Result<T, NpvError>;
