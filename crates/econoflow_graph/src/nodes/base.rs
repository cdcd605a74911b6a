// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shared plumbing for the table-in/table-out node types.

use crate::node::{GuardedInput, TransformError};
use crate::socket::SocketType;
use crate::table::Table;
use crate::value::Payload;

/// Resolve a guarded input slot to a table, or fail as an unmet
/// precondition.
pub(crate) fn table_input(
    inputs: &[GuardedInput],
    index: usize,
) -> Result<&Table, TransformError> {
    match inputs.get(index) {
        Some((Some(Payload::Table(table)), Some(SocketType::Table))) => Ok(table),
        _ => Err(TransformError::Precondition("Input is not valid".into())),
    }
}

/// Resolve a configured column selection to numeric rows.
///
/// No selection reads as "Select column"; a selection that does not resolve
/// to a numeric column reads as "Check node configuration".
pub(crate) fn numeric_column<'a>(
    table: &'a Table,
    selection: Option<&str>,
) -> Result<(String, &'a [f64]), TransformError> {
    let name = selection.ok_or_else(|| TransformError::Precondition("Select column".into()))?;
    let values = table.numeric(name).ok_or_else(|| {
        TransformError::Precondition("Check node configuration".into())
    })?;
    Ok((name.to_string(), values))
}

/// Zero out non-finite artifacts of column arithmetic
pub(crate) fn sanitize(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value
    }
}
