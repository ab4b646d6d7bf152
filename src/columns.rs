//! Column-selection policy shared by every chart renderer.
//!
//! Renderers never scan the table themselves: "first numeric column",
//! "first two numeric columns" and "first categorical column" are decided
//! here, in file order, so the tie-break rule is testable in isolation and
//! swappable without touching the renderers.

use crate::dataset::{ColumnKind, Table};

/// Indices of all numeric columns, in file order.
pub fn numeric_columns(table: &Table) -> Vec<usize> {
    table
        .columns
        .iter()
        .enumerate()
        .filter(|(_, c)| c.kind() == ColumnKind::Numeric)
        .map(|(i, _)| i)
        .collect()
}

/// Indices of all categorical columns, in file order.
pub fn categorical_columns(table: &Table) -> Vec<usize> {
    table
        .columns
        .iter()
        .enumerate()
        .filter(|(_, c)| c.kind() == ColumnKind::Categorical)
        .map(|(i, _)| i)
        .collect()
}

/// Index of the first numeric column, if any.
pub fn first_numeric(table: &Table) -> Option<usize> {
    numeric_columns(table).into_iter().next()
}

/// Indices of the first two numeric columns, if at least two exist.
pub fn numeric_pair(table: &Table) -> Option<(usize, usize)> {
    let numeric = numeric_columns(table);
    match numeric.as_slice() {
        [first, second, ..] => Some((*first, *second)),
        _ => None,
    }
}

/// Index of the first categorical column, if any.
pub fn first_categorical(table: &Table) -> Option<usize> {
    categorical_columns(table).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{sample_dataset, Column, Table, Value};

    fn text_column(name: &str, values: &[&str]) -> Column {
        Column {
            name: name.to_string(),
            values: values.iter().map(|v| Value::Text(v.to_string())).collect(),
        }
    }

    #[test]
    fn selects_columns_in_file_order() {
        let table = sample_dataset();
        assert_eq!(first_numeric(&table), Some(0)); // PatientID comes first
        assert_eq!(numeric_pair(&table), Some((0, 1)));
        assert_eq!(first_categorical(&table), Some(5)); // HeartDisease
    }

    #[test]
    fn absent_classes_give_none() {
        let table = Table {
            columns: vec![text_column("Status", &["on", "off", "on"])],
        };
        assert_eq!(first_numeric(&table), None);
        assert_eq!(numeric_pair(&table), None);
        assert_eq!(first_categorical(&table), Some(0));
    }

    #[test]
    fn single_numeric_column_has_no_pair() {
        let table = Table {
            columns: vec![Column {
                name: "Age".to_string(),
                values: vec![Value::Number(30.0), Value::Number(41.0)],
            }],
        };
        assert_eq!(first_numeric(&table), Some(0));
        assert_eq!(numeric_pair(&table), None);
        assert_eq!(first_categorical(&table), None);
    }
}
