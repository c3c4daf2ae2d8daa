//! Core types for orasession

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A database value that can represent any column or bind parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// NULL value
    Null,
    /// Boolean
    Bool(bool),
    /// Integer (NUMBER without scale)
    Int64(i64),
    /// Floating point (BINARY_DOUBLE)
    Float64(f64),
    /// NUMBER with scale, stored as string for precision
    Decimal(String),
    /// VARCHAR2 / CHAR / CLOB
    String(String),
    /// RAW / BLOB
    Bytes(Vec<u8>),
    /// DATE without time component
    Date(NaiveDate),
    /// TIMESTAMP
    DateTime(NaiveDateTime),
    /// TIMESTAMP WITH TIME ZONE, normalised to UTC
    DateTimeUtc(DateTime<Utc>),
    /// JSON value
    Json(serde_json::Value),
}

impl Value {
    /// Check if the value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to get as a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as i64
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(v) => Some(*v),
            Value::Decimal(s) | Value::String(s) => s.parse::<i64>().ok(),
            _ => None,
        }
    }

    /// Try to get as f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int64(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            Value::Decimal(s) | Value::String(s) => s.parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Try to get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Render as a plain JSON value (no enum tagging)
    ///
    /// Non-finite floats become `null`; dates use their ISO-8601 form.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Null => Json::Null,
            Value::Bool(v) => Json::Bool(*v),
            Value::Int64(v) => Json::from(*v),
            Value::Float64(v) => serde_json::Number::from_f64(*v)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::Decimal(v) | Value::String(v) => Json::String(v.clone()),
            Value::Bytes(v) => Json::Array(v.iter().map(|b| Json::from(*b)).collect()),
            Value::Date(v) => Json::String(v.to_string()),
            Value::DateTime(v) => Json::String(v.to_string()),
            Value::DateTimeUtc(v) => Json::String(v.to_rfc3339()),
            Value::Json(v) => v.clone(),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            Value::Decimal(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{}", v),
            Value::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            Value::Date(v) => write!(f, "{}", v),
            Value::DateTime(v) => write!(f, "{}", v),
            Value::DateTimeUtc(v) => write!(f, "{}", v),
            Value::Json(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int64(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Column metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ColumnMeta {
    /// Column name as reported by the driver
    #[serde(default)]
    pub name: String,
    /// Data type (database-specific string)
    #[serde(default)]
    pub data_type: String,
    /// Whether the column can be NULL
    #[serde(default)]
    pub nullable: bool,
}

impl ColumnMeta {
    /// Create column metadata with just a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the data type
    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = data_type.into();
        self
    }

    /// Set nullability
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }
}

/// Raw query result as produced by a driver
///
/// Rows are positional; `rows[i][j]` belongs to `columns[j]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryResult {
    /// Column metadata in declared order
    pub columns: Vec<ColumnMeta>,
    /// Result rows
    pub rows: Vec<Vec<Value>>,
    /// Rows affected (for DML statements)
    pub affected_rows: u64,
    /// Execution time in milliseconds
    pub execution_time_ms: u64,
}

impl QueryResult {
    /// Create a new empty query result
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a result from column names and rows
    pub fn new<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        rows: Vec<Vec<Value>>,
    ) -> Self {
        Self {
            columns: columns.into_iter().map(ColumnMeta::new).collect(),
            rows,
            ..Default::default()
        }
    }

    /// Result of a DML statement with no rows
    pub fn affected(rows: u64) -> Self {
        Self {
            affected_rows: rows,
            ..Default::default()
        }
    }

    /// Check if the result has rows
    pub fn has_rows(&self) -> bool {
        !self.rows.is_empty()
    }

    /// Get the number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_conversions() {
        assert_eq!(Value::from(42_i32), Value::Int64(42));
        assert_eq!(Value::from("JOHN").as_str(), Some("JOHN"));
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::Decimal("12".into()).as_i64(), Some(12));
        assert!(Value::Null.is_null());
    }

    #[test]
    fn test_value_to_json() {
        assert_eq!(Value::Int64(1).to_json(), serde_json::json!(1));
        assert_eq!(Value::from("JARYN").to_json(), serde_json::json!("JARYN"));
        assert_eq!(Value::Float64(f64::NAN).to_json(), serde_json::Value::Null);
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(Value::Date(date).to_json(), serde_json::json!("2024-02-29"));
    }

    #[test]
    fn test_query_result_new() {
        let result = QueryResult::new(["ID", "NAME"], vec![vec![1.into(), "JOHN".into()]]);
        assert_eq!(result.column_count(), 2);
        assert_eq!(result.row_count(), 1);
        assert!(result.has_rows());
        assert_eq!(result.columns[1].name, "NAME");
    }

    #[test]
    fn test_query_result_affected() {
        let result = QueryResult::affected(3);
        assert!(!result.has_rows());
        assert_eq!(result.affected_rows, 3);
    }
}
