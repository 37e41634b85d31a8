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

//! Read-only query guard.
//!
//! A smaller instance of the same sandboxing problem as the expression
//! compiler: classify arbitrary query text by its leading statement
//! keyword against a fixed allow-list, after stripping anything that
//! could hide the keyword. This is a keyword guard, not a SQL parser;
//! its job is to fail closed.

use crate::error::{ExprError, ExprResult};
use tracing::warn;

/// Statement keywords considered read-only.
const ALLOWED: [&str; 4] = ["SELECT", "WITH", "PRAGMA", "EXPLAIN"];

/// Configuration for [`guard_query_with`].
#[derive(Debug, Clone, Default)]
pub struct GuardConfig {
    /// Explicit override: let non-allow-listed statements through. Every
    /// use is logged, so overrides stay auditable.
    pub allow_writes: bool,
}

/// Classify query text with the default (read-only) configuration.
pub fn guard_query(sql: &str) -> ExprResult<()> {
    guard_query_with(sql, &GuardConfig::default())
}

/// Classify query text against the read-only allow-list.
///
/// Leading whitespace and leading `--` / `/* ... */` comments are
/// stripped first: a forbidden statement behind a comment prefix is
/// still forbidden. Matching is case-insensitive.
pub fn guard_query_with(sql: &str, config: &GuardConfig) -> ExprResult<()> {
    let stmt = strip_leading_trivia(sql);

    let keyword: String = stmt
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_ascii_uppercase();

    if keyword.is_empty() {
        return Err(ExprError::EmptyQuery);
    }

    if ALLOWED.contains(&keyword.as_str()) {
        return Ok(());
    }

    if config.allow_writes {
        warn!(keyword = %keyword, "non-read-only statement allowed by explicit override");
        return Ok(());
    }

    Err(ExprError::QueryRejected { keyword })
}

/// Strip leading whitespace and comments, repeatedly, until the first
/// token of the actual statement is exposed.
fn strip_leading_trivia(sql: &str) -> &str {
    let mut rest = sql;
    loop {
        let trimmed = rest.trim_start();
        if let Some(after) = trimmed.strip_prefix("--") {
            rest = match after.find('\n') {
                Some(i) => &after[i + 1..],
                None => "",
            };
        } else if let Some(after) = trimmed.strip_prefix("/*") {
            rest = match after.find("*/") {
                Some(i) => &after[i + 2..],
                None => "",
            };
        } else {
            return trimmed;
        }
    }
}
