// SPDX-License-Identifier: MIT OR Apache-2.0
//! Adstock (carry-over) operation node.

use crate::node::{GuardedInput, NodeContent, TransformError};
use crate::nodes::base::{numeric_column, table_input};
use crate::nodes::TYPE_PREPROCESSING;
use crate::persist::PersistError;
use crate::socket::SocketType;
use crate::table::Column;
use crate::value::{OutputValue, Payload};
use serde::{Deserialize, Serialize};
use std::any::Any;

fn default_rate() -> u8 {
    30
}

/// First-order carry-over filter on a numeric column:
/// `y[t] = x[t] + rate * y[t-1]`, with the rate given in percent.
#[derive(Debug, Serialize, Deserialize)]
pub struct Adstock {
    /// Selected column
    pub column: Option<String>,
    /// Carry-over rate in percent, 0 to 100
    #[serde(default = "default_rate")]
    pub rate: u8,
    /// Replace the source column instead of keeping both
    pub replace: bool,
}

impl Default for Adstock {
    fn default() -> Self {
        Self {
            column: None,
            rate: default_rate(),
            replace: false,
        }
    }
}

impl NodeContent for Adstock {
    fn op_code(&self) -> &'static str {
        "adstock"
    }

    fn type_code(&self) -> &'static str {
        TYPE_PREPROCESSING
    }

    fn title(&self) -> &'static str {
        "Adstock"
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
        if self.rate > 100 {
            return Err(TransformError::Precondition(
                "Check node configuration".into(),
            ));
        }

        let rate = f64::from(self.rate) / 100.0;
        let mut derived = Vec::with_capacity(values.len());
        let mut carried = 0.0;
        for x in values {
            carried = x + rate * carried;
            derived.push(carried);
        }
        let new_name = format!("{} adstock {}", name, self.rate);

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
