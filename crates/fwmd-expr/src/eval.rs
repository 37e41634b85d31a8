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

//! Tree-walking evaluator for compiled expressions.
//!
//! Evaluation is total: no input record can make it panic or error.
//! Missing values propagate through arithmetic, compare as false, and are
//! falsy, so a filter over an optional column excludes the row instead
//! of crashing the run. Coercion failures and division by zero also
//! resolve to `Missing` rather than raising.

use crate::ast::{BinaryOp, Expr, ExprLiteral, ExprValue, Func, UnaryOp};
use crate::error::ExprResult;
use crate::parser::parse;
use fwmd_core::Record;

/// A compiled, reusable expression.
///
/// Holds nothing but the syntax tree, so it is `Send + Sync` and can be
/// shared across worker threads and evaluated against any number of
/// records without synchronization.
#[derive(Debug, Clone)]
pub struct Evaluator {
    expr: Expr,
    source: String,
}

/// Compile expression text into a reusable [`Evaluator`].
///
/// This is the sandbox boundary: compilation fails for any construct
/// outside the restricted grammar, and what does compile can only ever
/// read fields of the record it is handed.
pub fn compile_expression(text: &str) -> ExprResult<Evaluator> {
    let expr = parse(text)?;
    Ok(Evaluator {
        expr,
        source: text.to_string(),
    })
}

impl Evaluator {
    /// The original expression text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate against one record.
    pub fn eval(&self, record: &Record) -> ExprValue {
        eval_expr(&self.expr, record)
    }

    /// Filter form: truthiness of the result, with `Missing` as false.
    pub fn matches(&self, record: &Record) -> bool {
        self.eval(record).truthy()
    }
}

fn eval_expr(expr: &Expr, record: &Record) -> ExprValue {
    match expr {
        Expr::Literal(lit) => eval_literal(lit),
        Expr::Field(name) => match record.get(name) {
            Some(value) => ExprValue::from(value),
            None => ExprValue::Missing,
        },
        Expr::Unary { op, operand } => eval_unary(*op, eval_expr(operand, record)),
        Expr::Binary { op, lhs, rhs } => match op {
            // Boolean operators short-circuit on truthiness.
            BinaryOp::And => {
                if !eval_expr(lhs, record).truthy() {
                    ExprValue::Bool(false)
                } else {
                    ExprValue::Bool(eval_expr(rhs, record).truthy())
                }
            }
            BinaryOp::Or => {
                if eval_expr(lhs, record).truthy() {
                    ExprValue::Bool(true)
                } else {
                    ExprValue::Bool(eval_expr(rhs, record).truthy())
                }
            }
            _ => eval_binary(*op, eval_expr(lhs, record), eval_expr(rhs, record)),
        },
        Expr::Call { func, arg } => eval_call(*func, eval_expr(arg, record)),
    }
}

fn eval_literal(lit: &ExprLiteral) -> ExprValue {
    match lit {
        ExprLiteral::Int(n) => ExprValue::Number(*n as f64),
        ExprLiteral::Float(n) => ExprValue::Number(*n),
        ExprLiteral::Text(s) => ExprValue::Text(s.clone()),
        ExprLiteral::Bool(b) => ExprValue::Bool(*b),
    }
}

fn eval_unary(op: UnaryOp, operand: ExprValue) -> ExprValue {
    match op {
        UnaryOp::Not => ExprValue::Bool(!operand.truthy()),
        UnaryOp::Neg => match operand {
            ExprValue::Number(n) => ExprValue::Number(-n),
            _ => ExprValue::Missing,
        },
    }
}

fn eval_binary(op: BinaryOp, lhs: ExprValue, rhs: ExprValue) -> ExprValue {
    use ExprValue::*;

    match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
            match (lhs, rhs) {
                (Number(a), Number(b)) => arith(op, a, b),
                // String concatenation is the one non-numeric arithmetic
                // form the grammar admits.
                (Text(a), Text(b)) if op == BinaryOp::Add => Text(format!("{}{}", a, b)),
                _ => Missing,
            }
        }
        BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            compare(op, lhs, rhs)
        }
        // And/Or are handled with short-circuiting in eval_expr.
        BinaryOp::And | BinaryOp::Or => Missing,
    }
}

fn arith(op: BinaryOp, a: f64, b: f64) -> ExprValue {
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => {
            if b == 0.0 {
                return ExprValue::Missing;
            }
            a / b
        }
        BinaryOp::Rem => {
            if b == 0.0 {
                return ExprValue::Missing;
            }
            a % b
        }
        _ => unreachable!("non-arithmetic operator in arith"),
    };
    if result.is_finite() {
        ExprValue::Number(result)
    } else {
        ExprValue::Missing
    }
}

/// Comparison semantics: a missing operand compares false, always, even
/// for `!=`. Operands of different types are never equal and never
/// ordered.
fn compare(op: BinaryOp, lhs: ExprValue, rhs: ExprValue) -> ExprValue {
    use ExprValue::*;

    if matches!(lhs, Missing) || matches!(rhs, Missing) {
        return Bool(false);
    }

    let result = match (&lhs, &rhs) {
        (Number(a), Number(b)) => match op {
            BinaryOp::Eq => a == b,
            BinaryOp::Ne => a != b,
            BinaryOp::Lt => a < b,
            BinaryOp::Le => a <= b,
            BinaryOp::Gt => a > b,
            BinaryOp::Ge => a >= b,
            _ => false,
        },
        (Text(a), Text(b)) => match op {
            BinaryOp::Eq => a == b,
            BinaryOp::Ne => a != b,
            BinaryOp::Lt => a < b,
            BinaryOp::Le => a <= b,
            BinaryOp::Gt => a > b,
            BinaryOp::Ge => a >= b,
            _ => false,
        },
        (Bool(a), Bool(b)) => match op {
            BinaryOp::Eq => a == b,
            BinaryOp::Ne => a != b,
            _ => false,
        },
        // Mixed types: unequal, unordered.
        _ => matches!(op, BinaryOp::Ne),
    };
    Bool(result)
}

fn eval_call(func: Func, arg: ExprValue) -> ExprValue {
    use ExprValue::*;

    match func {
        Func::Int => match arg {
            Number(n) => Number(n.trunc()),
            Text(s) => match s.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => Number(n.trunc()),
                _ => Missing,
            },
            Bool(b) => Number(if b { 1.0 } else { 0.0 }),
            Missing => Missing,
        },
        Func::Float => match arg {
            Number(n) => Number(n),
            Text(s) => match s.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => Number(n),
                _ => Missing,
            },
            Bool(b) => Number(if b { 1.0 } else { 0.0 }),
            Missing => Missing,
        },
        Func::Str => match arg {
            Text(s) => Text(s),
            Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    Text(format!("{}", n as i64))
                } else {
                    Text(format!("{}", n))
                }
            }
            Bool(b) => Text(if b { "true" } else { "false" }.to_string()),
            Missing => Missing,
        },
        Func::Len => match arg {
            Text(s) => Number(s.chars().count() as f64),
            _ => Missing,
        },
    }
}
