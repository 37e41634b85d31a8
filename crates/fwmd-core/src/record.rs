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

//! Decoded records and their shared column schema.
//!
//! Records are ephemeral: the engine produces and consumes them one at a
//! time and never retains them as a collection. The column name list, on
//! the other hand, is identical for every record of a run, so it lives
//! once behind an [`Arc`] and each record carries only its values.

use crate::value::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// An ordered column schema with O(1) name lookup.
#[derive(Debug)]
pub struct Columns {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl Columns {
    /// Build a schema from ordered column names.
    pub fn new(names: Vec<String>) -> Arc<Self> {
        let index = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();
        Arc::new(Self { names, index })
    }

    /// Column names in order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Position of a column by name.
    #[inline]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True for a schema with no columns.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// A new schema with extra columns appended. Used by stages that add
    /// derived columns: the extended schema is built once and shared by
    /// every record the stage emits.
    pub fn extended(&self, extra: &[String]) -> Arc<Self> {
        let mut names = self.names.clone();
        names.extend_from_slice(extra);
        Columns::new(names)
    }
}

/// One decoded micro-data record: a value per column.
#[derive(Debug, Clone)]
pub struct Record {
    columns: Arc<Columns>,
    values: Vec<Value>,
}

impl Record {
    /// Assemble a record; the value count must match the schema.
    pub fn new(columns: Arc<Columns>, values: Vec<Value>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    /// The record's schema.
    pub fn columns(&self) -> &Arc<Columns> {
        &self.columns
    }

    /// Value of a column by name; `None` when the column does not exist.
    /// An existing-but-absent cell is `Some(&Value::Missing)`; the two
    /// cases are deliberately distinct.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns.position(name).map(|i| &self.values[i])
    }

    /// Value at a column position.
    #[inline]
    pub fn value_at(&self, i: usize) -> &Value {
        &self.values[i]
    }

    /// All values in column order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Consume the record, appending derived values under an extended
    /// schema produced by [`Columns::extended`].
    pub fn into_extended(self, columns: Arc<Columns>, appended: Vec<Value>) -> Self {
        debug_assert_eq!(columns.len(), self.values.len() + appended.len());
        let mut values = self.values;
        values.extend(appended);
        Self { columns, values }
    }
}
