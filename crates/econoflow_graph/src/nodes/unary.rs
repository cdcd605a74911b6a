// SPDX-License-Identifier: MIT OR Apache-2.0
//! Unary column operation node.

use crate::node::{GuardedInput, NodeContent, TransformError};
use crate::nodes::base::{numeric_column, sanitize, table_input};
use crate::nodes::TYPE_PREPROCESSING;
use crate::persist::PersistError;
use crate::socket::SocketType;
use crate::table::Column;
use crate::value::{OutputValue, Payload};
use serde::{Deserialize, Serialize};
use std::any::Any;

/// Available unary operations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnaryFn {
    /// Natural logarithm, with non-numeric artifacts zeroed
    #[default]
    Log,
    /// Sign flip
    Negate,
}

impl UnaryFn {
    fn label(self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Negate => "negate",
        }
    }

    fn apply(self, x: f64) -> f64 {
        match self {
            Self::Log => sanitize(x.ln()),
            Self::Negate => -x,
        }
    }
}

/// Applies a unary operation to one numeric column, inserting the derived
/// column at the front or replacing the original.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UnaryOp {
    /// Selected column
    pub column: Option<String>,
    /// Selected operation
    pub operation: UnaryFn,
    /// Replace the source column instead of keeping both
    pub replace: bool,
}

impl NodeContent for UnaryOp {
    fn op_code(&self) -> &'static str {
        "unary"
    }

    fn type_code(&self) -> &'static str {
        TYPE_PREPROCESSING
    }

    fn title(&self) -> &'static str {
        "Unary"
    }

    fn input_sockets(&self) -> Vec<SocketType> {
        vec![SocketType::Table]
    }

    fn output_sockets(&self) -> Vec<SocketType> {
        vec![SocketType::Table]
    }

    fn compute(&mut self, inputs: &[GuardedInput]) -> Result<OutputValue, TransformError> {
        let table = table_input(inputs, 0)?;
        let (name, values) = numeric_column(table, self.column.as_deref())?;

        let derived: Vec<f64> = values.iter().map(|x| self.operation.apply(*x)).collect();
        let new_name = format!("{}({})", self.operation.label(), name);

        let mut out = table.clone();
        out.insert_front(new_name, Column::Number(derived));
        if self.replace {
            out.remove(&name);
        }
        Ok(OutputValue::Single(Payload::Table(out)))
    }

    fn serialize_content(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    fn deserialize_content(&mut self, data: &serde_json::Value) -> Result<(), PersistError> {
        *self = serde_json::from_value(data.clone())
            .map_err(|e| PersistError::Content(e.to_string()))?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
