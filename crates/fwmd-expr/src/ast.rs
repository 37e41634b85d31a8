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

//! Syntax tree for sandboxed row expressions.
//!
//! The tree is deliberately closed: literals, field references, a fixed
//! operator set, and a fixed function whitelist. There is no node kind
//! through which an expression could reach anything beyond the record it
//! is evaluated against.

use fwmd_core::Value;

/// A compiled expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal constant.
    Literal(ExprLiteral),
    /// A reference to a record field by column name.
    Field(String),
    /// Unary operation.
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// Binary operation.
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Call to a whitelisted function.
    Call { func: Func, arg: Box<Expr> },
}

/// A literal constant.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprLiteral {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Arithmetic negation.
    Neg,
    /// Boolean negation (`not`).
    Not,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

/// The closed function whitelist: pure coercions and length. Being an
/// enum rather than a name lookup, there is no path to any other callable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Int,
    Float,
    Str,
    Len,
}

impl Func {
    /// Resolve a whitelisted function by name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int" => Some(Self::Int),
            "float" => Some(Self::Float),
            "str" => Some(Self::Str),
            "len" => Some(Self::Len),
            _ => None,
        }
    }
}

/// The result of evaluating an expression against one record.
///
/// Richer than the record cell type by one variant: comparisons and
/// boolean operators produce `Bool`, which collapses back into a numeric
/// cell (1/0) if the expression result is stored in a column.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprValue {
    Missing,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl ExprValue {
    /// Filter semantics: `Missing` is false, so filters over optional
    /// columns fail closed.
    pub fn truthy(&self) -> bool {
        match self {
            Self::Missing => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0,
            Self::Text(s) => !s.is_empty(),
        }
    }

    /// Collapse into a record cell value.
    pub fn into_value(self) -> Value {
        match self {
            Self::Missing => Value::Missing,
            Self::Bool(b) => Value::Number(if b { 1.0 } else { 0.0 }),
            Self::Number(n) => Value::Number(n),
            Self::Text(s) => Value::Text(s),
        }
    }
}

impl From<&Value> for ExprValue {
    fn from(v: &Value) -> Self {
        match v {
            Value::Missing => Self::Missing,
            Value::Text(s) => Self::Text(s.clone()),
            Value::Number(n) => Self::Number(*n),
        }
    }
}
