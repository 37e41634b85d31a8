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

//! Sandboxed user expressions for microdata pipelines.
//!
//! Two hard security boundaries live here, both of the fail-closed kind:
//!
//! - [`compile_expression`]: compiles user-authored filter/derivation
//!   expressions into reusable evaluators over a record namespace. The
//!   grammar is closed: literals, field references, arithmetic,
//!   comparisons, boolean operators, and four whitelisted coercion
//!   functions. Nothing that compiles can reach process, filesystem, or
//!   network state.
//! - [`guard_query`]: classifies query text by its leading statement
//!   keyword against a read-only allow-list, with comment-prefix
//!   stripping so nothing hides the keyword.
//!
//! ```rust
//! use fwmd_core::{Columns, Record, Value};
//! use fwmd_expr::compile_expression;
//!
//! let filter = compile_expression("renda > 1000 and UF == '35'").unwrap();
//!
//! let columns = Columns::new(vec!["renda".into(), "UF".into()]);
//! let record = Record::new(
//!     columns,
//!     vec![Value::Number(1500.0), Value::Text("35".into())],
//! );
//! assert!(filter.matches(&record));
//!
//! // Anything outside the grammar fails compilation.
//! assert!(compile_expression("__import__('os').system('rm -rf /')").is_err());
//! ```

mod ast;
mod error;
mod eval;
mod guard;
mod parser;

pub use ast::{BinaryOp, Expr, ExprLiteral, ExprValue, Func, UnaryOp};
pub use error::{ExprError, ExprResult};
pub use eval::{compile_expression, Evaluator};
pub use guard::{guard_query, guard_query_with, GuardConfig};
