// SPDX-License-Identifier: MIT OR Apache-2.0
//! Lag operation node.

use crate::node::{GuardedInput, NodeContent, TransformError};
use crate::nodes::base::{numeric_column, table_input};
use crate::nodes::TYPE_PREPROCESSING;
use crate::persist::PersistError;
use crate::socket::SocketType;
use crate::table::Column;
use crate::value::{OutputValue, Payload};
use serde::{Deserialize, Serialize};
use std::any::Any;

fn default_periods() -> usize {
    1
}

/// Shifts a numeric column down by a number of rows, zero-filling the head
#[derive(Debug, Serialize, Deserialize)]
pub struct LagOp {
    /// Selected column
    pub column: Option<String>,
    /// How many rows to shift by
    #[serde(default = "default_periods")]
    pub periods: usize,
    /// Replace the source column instead of keeping both
    pub replace: bool,
}

impl Default for LagOp {
    fn default() -> Self {
        Self {
            column: None,
            periods: default_periods(),
            replace: false,
        }
    }
}

impl NodeContent for LagOp {
    fn op_code(&self) -> &'static str {
        "lag"
    }

    fn type_code(&self) -> &'static str {
        TYPE_PREPROCESSING
    }

    fn title(&self) -> &'static str {
        "Lag"
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
        if self.periods == 0 {
            return Err(TransformError::Precondition(
                "Check node configuration".into(),
            ));
        }

        let derived: Vec<f64> = (0..values.len())
            .map(|row| {
                if row < self.periods {
                    0.0
                } else {
                    values[row - self.periods]
                }
            })
            .collect();
        let new_name = format!("{} lag {}", name, self.periods);

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Table;

    fn slot() -> GuardedInput {
        let table = Table::new().with_column("sales", Column::Number(vec![10.0, 20.0, 30.0]));
        (Some(Payload::Table(table)), Some(SocketType::Table))
    }

    #[test]
    fn test_shift_zero_fills_head() {
        let mut op = LagOp {
            column: Some("sales".into()),
            periods: 2,
            replace: false,
        };
        let value = op.compute(&[slot()]).unwrap();
        let OutputValue::Single(Payload::Table(table)) = value else {
            panic!("expected a single table");
        };
        assert_eq!(table.numeric("sales lag 2").unwrap(), &[0.0, 0.0, 10.0]);
        assert!(table.has_column("sales"));
    }

    #[test]
    fn test_replace_drops_source_column() {
        let mut op = LagOp {
            column: Some("sales".into()),
            periods: 1,
            replace: true,
        };
        let value = op.compute(&[slot()]).unwrap();
        let OutputValue::Single(Payload::Table(table)) = value else {
            panic!("expected a single table");
        };
        assert!(!table.has_column("sales"));
        assert_eq!(table.numeric("sales lag 1").unwrap(), &[0.0, 10.0, 20.0]);
    }

    #[test]
    fn test_zero_periods_is_misconfiguration() {
        let mut op = LagOp {
            column: Some("sales".into()),
            periods: 0,
            replace: false,
        };
        assert!(matches!(
            op.compute(&[slot()]),
            Err(TransformError::Precondition(_))
        ));
    }
}
