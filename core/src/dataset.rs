//! Tabular Data Module
//!
//! Parses the `Data` field of a request into a rectangular table of cells and
//! runs the content checks every operation shares. Shapes follow what a
//! dataframe constructor accepts: rows as arrays, rows as records, or an
//! object of columns.

use ndarray::{Array1, Array2};
use serde_json::{Map, Value};

/// A single table cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    /// `null` or absent from a ragged row
    Missing,
    /// Any JSON number
    Number(f64),
    /// Strings, booleans, nested arrays or objects
    NonNumeric,
}

impl Cell {
    fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Missing,
            Value::Number(n) => n.as_f64().map_or(Cell::NonNumeric, Cell::Number),
            _ => Cell::NonNumeric,
        }
    }
}

/// Data validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataError {
    #[error("wrong input format")]
    Malformed,

    #[error("Data contains NaN")]
    MissingValues,

    #[error("Data contains non-numeric values")]
    NonNumeric,
}

/// Row-major table; short rows are padded with `Cell::Missing`
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    n_rows: usize,
    n_cols: usize,
    cells: Vec<Cell>,
}

impl Table {
    /// Parse a JSON value into a table
    pub fn from_json(value: &Value) -> Result<Self, DataError> {
        match value {
            Value::Array(items) => Self::from_array(items),
            Value::Object(columns) => Self::from_columns(columns),
            _ => Err(DataError::Malformed),
        }
    }

    fn from_array(items: &[Value]) -> Result<Self, DataError> {
        if items.iter().all(Value::is_array) {
            let rows: Vec<Vec<Cell>> = items
                .iter()
                .filter_map(Value::as_array)
                .map(|row| row.iter().map(Cell::from_json).collect())
                .collect();
            return Ok(Self::from_rows(rows));
        }

        if items.iter().all(Value::is_object) {
            let records: Vec<&Map<String, Value>> =
                items.iter().filter_map(Value::as_object).collect();
            return Ok(Self::from_records(&records));
        }

        // A flat list is a single column
        if items.iter().all(|v| !v.is_array() && !v.is_object()) {
            let rows = items.iter().map(|v| vec![Cell::from_json(v)]).collect();
            return Ok(Self::from_rows(rows));
        }

        Err(DataError::Malformed)
    }

    fn from_records(records: &[&Map<String, Value>]) -> Self {
        let mut keys: Vec<&str> = Vec::new();
        for record in records {
            for key in record.keys() {
                if !keys.contains(&key.as_str()) {
                    keys.push(key.as_str());
                }
            }
        }

        let rows = records
            .iter()
            .map(|record| {
                keys.iter()
                    .map(|key| record.get(*key).map_or(Cell::Missing, Cell::from_json))
                    .collect()
            })
            .collect();
        Self::from_rows(rows)
    }

    fn from_columns(columns: &Map<String, Value>) -> Result<Self, DataError> {
        if columns.is_empty() {
            return Ok(Self::from_rows(Vec::new()));
        }

        if columns.values().all(Value::is_array) {
            let columns: Vec<&Vec<Value>> = columns.values().filter_map(Value::as_array).collect();
            let n_rows = columns[0].len();
            if columns.iter().any(|c| c.len() != n_rows) {
                return Err(DataError::Malformed);
            }
            let rows = (0..n_rows)
                .map(|r| columns.iter().map(|c| Cell::from_json(&c[r])).collect())
                .collect();
            return Ok(Self::with_width(rows, columns.len()));
        }

        if columns.values().all(Value::is_object) {
            let columns: Vec<&Map<String, Value>> =
                columns.values().filter_map(Value::as_object).collect();
            let mut labels: Vec<&str> = Vec::new();
            for column in &columns {
                for label in column.keys() {
                    if !labels.contains(&label.as_str()) {
                        labels.push(label.as_str());
                    }
                }
            }
            let rows = labels
                .iter()
                .map(|label| {
                    columns
                        .iter()
                        .map(|c| c.get(*label).map_or(Cell::Missing, Cell::from_json))
                        .collect()
                })
                .collect();
            return Ok(Self::with_width(rows, columns.len()));
        }

        Err(DataError::Malformed)
    }

    fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        let n_cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        Self::with_width(rows, n_cols)
    }

    /// Rows padded to `n_cols`, which holds even when there are no rows
    fn with_width(rows: Vec<Vec<Cell>>, n_cols: usize) -> Self {
        let n_rows = rows.len();
        let mut cells = Vec::with_capacity(n_rows * n_cols);
        for mut row in rows {
            row.resize(n_cols, Cell::Missing);
            cells.extend(row);
        }
        Self {
            n_rows,
            n_cols,
            cells,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.n_cols
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<Cell> {
        if row < self.n_rows && col < self.n_cols {
            Some(self.cells[row * self.n_cols + col])
        } else {
            None
        }
    }

    /// Fails if any cell is missing
    pub fn ensure_complete(&self) -> Result<(), DataError> {
        if self.cells.iter().any(|c| matches!(c, Cell::Missing)) {
            return Err(DataError::MissingValues);
        }
        Ok(())
    }

    /// Fails if any cell is not a number
    pub fn ensure_numeric(&self) -> Result<(), DataError> {
        if self.cells.iter().any(|c| !matches!(c, Cell::Number(_))) {
            return Err(DataError::NonNumeric);
        }
        Ok(())
    }

    /// Missing-value check, then numeric check
    pub fn validate(&self) -> Result<(), DataError> {
        self.ensure_complete()?;
        self.ensure_numeric()
    }

    /// Whole table as a feature matrix
    pub fn to_matrix(&self) -> Result<Array2<f64>, DataError> {
        let values = self.numbers()?;
        Array2::from_shape_vec((self.n_rows, self.n_cols), values).map_err(|_| DataError::Malformed)
    }

    /// Split into (features, target) with the first column as the target.
    ///
    /// Returns `Ok(None)` when the table has no columns at all.
    pub fn split_target(&self) -> Result<Option<(Array2<f64>, Array1<f64>)>, DataError> {
        if self.n_cols == 0 {
            return Ok(None);
        }
        let matrix = self.to_matrix()?;
        let targets = matrix.column(0).to_owned();
        let features = matrix.slice(ndarray::s![.., 1..]).to_owned();
        Ok(Some((features, targets)))
    }

    fn numbers(&self) -> Result<Vec<f64>, DataError> {
        self.cells
            .iter()
            .map(|c| match c {
                Cell::Number(v) => Ok(*v),
                Cell::Missing => Err(DataError::MissingValues),
                Cell::NonNumeric => Err(DataError::NonNumeric),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rows_of_arrays() {
        let table = Table::from_json(&json!([[1, 10], [2, 20], [3, 30]])).unwrap();
        assert_eq!(table.n_rows(), 3);
        assert_eq!(table.n_columns(), 2);
        assert_eq!(table.cell(2, 1), Some(Cell::Number(30.0)));
        assert!(table.validate().is_ok());
    }

    #[test]
    fn test_ragged_rows_are_padded_with_missing() {
        let table = Table::from_json(&json!([[1, 2, 3], [4]])).unwrap();
        assert_eq!(table.n_columns(), 3);
        assert_eq!(table.cell(1, 2), Some(Cell::Missing));
        assert_eq!(table.validate(), Err(DataError::MissingValues));
    }

    #[test]
    fn test_records_union_keys_in_first_seen_order() {
        let table = Table::from_json(&json!([{"y": 1, "x": 2}, {"x": 3, "z": 4}])).unwrap();
        assert_eq!(table.n_columns(), 3);
        assert_eq!(table.cell(0, 0), Some(Cell::Number(1.0)));
        assert_eq!(table.cell(1, 1), Some(Cell::Number(3.0)));
        assert_eq!(table.cell(0, 2), Some(Cell::Missing));
    }

    #[test]
    fn test_columns_object_of_arrays() {
        let table = Table::from_json(&json!({"y": [1, 2], "x": [10, 20]})).unwrap();
        let matrix = table.to_matrix().unwrap();
        assert_eq!(matrix.shape(), &[2, 2]);
        assert_eq!(matrix[[1, 0]], 2.0);
        assert_eq!(matrix[[1, 1]], 20.0);
    }

    #[test]
    fn test_columns_object_of_indexed_values() {
        let table = Table::from_json(&json!({"0": {"0": 1, "1": 2}, "1": {"1": 20}})).unwrap();
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.cell(0, 1), Some(Cell::Missing));
        assert_eq!(table.cell(1, 1), Some(Cell::Number(20.0)));
    }

    #[test]
    fn test_empty_columns_keep_their_width() {
        let table = Table::from_json(&json!({"a": [], "b": []})).unwrap();
        assert_eq!(table.n_rows(), 0);
        assert_eq!(table.n_columns(), 2);

        let table = Table::from_json(&json!({"a": {}, "b": {}, "c": {}})).unwrap();
        assert_eq!(table.n_rows(), 0);
        assert_eq!(table.n_columns(), 3);
    }

    #[test]
    fn test_unequal_column_arrays_are_malformed() {
        let result = Table::from_json(&json!({"a": [1, 2], "b": [1]}));
        assert_eq!(result, Err(DataError::Malformed));
    }

    #[test]
    fn test_flat_list_is_single_column() {
        let table = Table::from_json(&json!([15, 16])).unwrap();
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.n_columns(), 1);
    }

    #[test]
    fn test_scalar_and_mixed_shapes_are_malformed() {
        assert_eq!(Table::from_json(&json!(5)), Err(DataError::Malformed));
        assert_eq!(Table::from_json(&json!(null)), Err(DataError::Malformed));
        assert_eq!(Table::from_json(&json!([[1], 2])), Err(DataError::Malformed));
    }

    #[test]
    fn test_missing_is_reported_before_non_numeric() {
        let table = Table::from_json(&json!([["a", null]])).unwrap();
        assert_eq!(table.validate(), Err(DataError::MissingValues));

        let table = Table::from_json(&json!([["a", 1], [true, 2]])).unwrap();
        assert_eq!(table.validate(), Err(DataError::NonNumeric));
    }

    #[test]
    fn test_split_target_uses_first_column() {
        let table = Table::from_json(&json!([[1, 10, 100], [2, 20, 200]])).unwrap();
        let (features, targets) = table.split_target().unwrap().unwrap();
        assert_eq!(targets.to_vec(), vec![1.0, 2.0]);
        assert_eq!(features.shape(), &[2, 2]);
        assert_eq!(features[[1, 1]], 200.0);
    }

    #[test]
    fn test_split_target_without_columns() {
        let table = Table::from_json(&json!([])).unwrap();
        assert_eq!(table.n_rows(), 0);
        assert!(table.split_target().unwrap().is_none());
    }
}
