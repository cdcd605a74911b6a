// SPDX-License-Identifier: MIT OR Apache-2.0
//! Binary column operation node.

use crate::node::{GuardedInput, NodeContent, TransformError};
use crate::nodes::base::{numeric_column, sanitize, table_input};
use crate::nodes::TYPE_PREPROCESSING;
use crate::persist::PersistError;
use crate::socket::SocketType;
use crate::table::Column;
use crate::value::{OutputValue, Payload};
use serde::{Deserialize, Serialize};
use std::any::Any;

/// Available binary operations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryFn {
    /// Row-wise addition
    #[default]
    Sum,
    /// Row-wise subtraction
    Diff,
    /// Row-wise multiplication
    Mult,
    /// Row-wise division, with non-numeric artifacts zeroed
    Div,
}

impl BinaryFn {
    fn symbol(self) -> char {
        match self {
            Self::Sum => '+',
            Self::Diff => '-',
            Self::Mult => '*',
            Self::Div => '/',
        }
    }

    fn apply(self, a: f64, b: f64) -> f64 {
        let v = match self {
            Self::Sum => a + b,
            Self::Diff => a - b,
            Self::Mult => a * b,
            Self::Div => a / b,
        };
        sanitize(v)
    }
}

/// Combines two numeric columns row-wise into a derived column inserted at
/// the front of the table.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BinaryOp {
    /// First operand column
    pub first: Option<String>,
    /// Second operand column
    pub second: Option<String>,
    /// Selected operation
    pub operation: BinaryFn,
}

impl NodeContent for BinaryOp {
    fn op_code(&self) -> &'static str {
        "binary"
    }

    fn type_code(&self) -> &'static str {
        TYPE_PREPROCESSING
    }

    fn title(&self) -> &'static str {
        "Binary"
    }

    fn input_sockets(&self) -> Vec<SocketType> {
        vec![SocketType::Table]
    }

    fn output_sockets(&self) -> Vec<SocketType> {
        vec![SocketType::Table]
    }

    fn compute(&mut self, inputs: &[GuardedInput]) -> Result<OutputValue, TransformError> {
        let table = table_input(inputs, 0)?;
        let (first_name, first) = numeric_column(table, self.first.as_deref())?;
        let (second_name, second) = numeric_column(table, self.second.as_deref())?;

        let derived: Vec<f64> = first
            .iter()
            .zip(second)
            .map(|(a, b)| self.operation.apply(*a, *b))
            .collect();
        let new_name = format!(
            "({}) {} ({})",
            first_name,
            self.operation.symbol(),
            second_name
        );

        let mut out = table.clone();
        out.insert_front(new_name, Column::Number(derived));
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
