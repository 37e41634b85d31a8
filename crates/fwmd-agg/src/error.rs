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

//! Error types for aggregation configuration.
//!
//! Aggregation itself has no fatal data conditions (unattributable
//! records are counted and skipped); only configuration can fail.

use thiserror::Error;

/// Aggregation configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggError {
    /// A household key needs at least one component column.
    #[error("aggregation requires at least one key field")]
    NoKeyFields,

    /// Merging partial aggregators built with different configurations.
    #[error("cannot merge aggregators with different configurations")]
    ConfigMismatch,
}

/// Result type for aggregation operations.
pub type AggResult<T> = Result<T, AggError>;
