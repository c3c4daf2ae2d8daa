//! Projection of positional query results into keyed records
//!
//! Drivers return rows as value arrays next to a list of column metadata.
//! Callers usually want one map per row instead:
//!
//! ```
//! use orasession_core::{QueryResult, RowProjector, Value};
//!
//! let result = QueryResult::new(
//!     ["ID", "NAME"],
//!     vec![vec![1.into(), "JOHN".into()], vec![2.into(), "JARYN".into()]],
//! );
//! let records = RowProjector::project(&result).unwrap();
//! assert_eq!(records[1]["NAME"], Value::from("JARYN"));
//! ```

use indexmap::IndexMap;

use crate::{QueryResult, Result, SessionError, Value};


/// One row keyed by column name, in declared column order
pub type Record = IndexMap<String, Value>;

/// Stateless row-to-record transformer
#[derive(Debug, Clone, Copy, Default)]
pub struct RowProjector;

impl RowProjector {
    /// Build one record per row
    ///
    /// Duplicate column names collapse into a single key holding the value
    /// of the last such column. A row whose length differs from the column
    /// count yields [`SessionError::MalformedResult`].
    pub fn project(result: &QueryResult) -> Result<Vec<Record>> {
        let width = result.columns.len();
        let mut records = Vec::with_capacity(result.rows.len());

        for (index, row) in result.rows.iter().enumerate() {
            if row.len() != width {
                return Err(SessionError::MalformedResult(format!(
                    "row {} has {} values but result has {} columns",
                    index,
                    row.len(),
                    width
                )));
            }

            let mut record = Record::with_capacity(width);
            for (column, value) in result.columns.iter().zip(row) {
                record.insert(column.name.clone(), value.clone());
            }
            records.push(record);
        }

        tracing::trace!(rows = records.len(), columns = width, "projected result");
        Ok(records)
    }
}

/// Shorthand for [`RowProjector::project`]
pub fn project_to_records(result: &QueryResult) -> Result<Vec<Record>> {
    RowProjector::project(result)
}

/// Render records as a JSON array of objects
pub fn records_to_json(records: &[Record]) -> serde_json::Value {
    serde_json::Value::Array(
        records
            .iter()
            .map(|record| {
                serde_json::Value::Object(
                    record
                        .iter()
                        .map(|(name, value)| (name.clone(), value.to_json()))
                        .collect(),
                )
            })
            .collect(),
    )
}
