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

//! Error types for expression compilation and query guarding.
//!
//! Every variant here is fatal to the expression or query that produced
//! it. These are security boundaries: a disallowed construct is never
//! degraded, retried, or partially evaluated.

use thiserror::Error;

/// Errors from the expression compiler and the query guard.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExprError {
    /// Malformed expression text.
    #[error("expression syntax error: {0}")]
    Syntax(String),

    /// A construct outside the allowed grammar: attribute access,
    /// subscripting, assignment and the like.
    #[error("disallowed construct in expression: {0}")]
    Disallowed(&'static str),

    /// A call to anything but the fixed coercion/length whitelist.
    #[error("call to `{name}` is not allowed; permitted functions: int, float, str, len")]
    UnknownFunction { name: String },

    /// Query text whose leading statement keyword is not read-only.
    #[error("query rejected: statement keyword `{keyword}` is not in the read-only allow-list")]
    QueryRejected { keyword: String },

    /// Query text with no statement at all (empty or comments only).
    #[error("query rejected: no statement found")]
    EmptyQuery,
}

/// Result type for expression operations.
pub type ExprResult<T> = Result<T, ExprError>;
