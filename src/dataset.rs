use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

/// Default location of the cached dataset file.
pub const DATASET_FILE: &str = "healthcare_data.csv";

/// A text column counts as categorical when it has at most this many
/// distinct values.
const CATEGORY_LIMIT: usize = 12;

/// A single cell value in a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// A numeric value (integers are stored as whole floats)
    Number(f64),

    /// A free-text or categorical value
    Text(String),
}

impl Value {
    /// Returns the numeric value, if this cell holds one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(_) => None,
        }
    }

    /// Renders the cell the way it is written to CSV.
    pub fn render(&self) -> String {
        match self {
            Value::Number(n) => format!("{}", n),
            Value::Text(t) => t.clone(),
        }
    }
}

/// How a column is treated by the chart renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Every cell parses as a number
    Numeric,

    /// Non-numeric with a small set of distinct values
    Categorical,

    /// Free text
    Text,
}

/// A named column of values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column header
    pub name: String,

    /// Cell values in row order
    pub values: Vec<Value>,
}

impl Column {
    /// Classify the column for the selection policy in [`crate::columns`].
    ///
    /// A column is numeric when every cell holds a number. A non-numeric
    /// column is categorical when it has at most 12 distinct values,
    /// otherwise it is free text.
    pub fn kind(&self) -> ColumnKind {
        if self.values.iter().all(|v| v.as_number().is_some()) {
            return ColumnKind::Numeric;
        }
        if self.distinct_count() <= CATEGORY_LIMIT {
            ColumnKind::Categorical
        } else {
            ColumnKind::Text
        }
    }

    /// All numeric cell values, in row order.
    pub fn numbers(&self) -> Vec<f64> {
        self.values.iter().filter_map(Value::as_number).collect()
    }

    /// Number of distinct rendered values in the column.
    pub fn distinct_count(&self) -> usize {
        let mut seen: Vec<String> = Vec::new();
        for value in &self.values {
            let rendered = value.render();
            if !seen.contains(&rendered) {
                seen.push(rendered);
            }
        }
        seen.len()
    }
}

/// An ordered collection of rows sharing a fixed set of named, typed columns.
///
/// Stored column-major; the renderers only ever read whole columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Columns in file order
    pub columns: Vec<Column>,
}

impl Table {
    /// Number of data rows (all columns share the same length).
    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    /// Index of the column with the given header, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }
}

/// Errors from loading or parsing a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to access dataset file: {0}")]
    Io(#[from] std::io::Error),

    #[error("dataset file is empty")]
    Empty,
}

/// Load the dataset from `path`, synthesizing the fixed sample if absent.
///
/// If a file exists at `path` it is parsed as a CSV table. Otherwise the
/// fixed 10-row healthcare sample is constructed and persisted to `path`,
/// so subsequent calls hit the cached copy and return identical data.
///
/// # Arguments
/// * `path` - Location of the cached dataset file
///
/// # Errors
/// * Returns an error if the file cannot be read, written, or parsed
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Table, DatasetError> {
    let path = path.as_ref();
    if path.exists() {
        return from_csv(path);
    }

    let table = sample_dataset();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, to_csv(&table))?;
    Ok(table)
}

/// The fixed 10-row sample dataset used when no file is present.
pub fn sample_dataset() -> Table {
    let patient_id = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
    let age = [45.0, 50.0, 39.0, 60.0, 55.0, 40.0, 65.0, 70.0, 30.0, 50.0];
    let bmi = [28.5, 30.2, 24.8, 32.0, 29.5, 27.0, 31.0, 33.5, 22.5, 28.0];
    let blood_pressure = [130.0, 135.0, 120.0, 140.0, 132.0, 125.0, 145.0, 150.0, 115.0, 130.0];
    let cholesterol = [220.0, 240.0, 200.0, 260.0, 230.0, 210.0, 250.0, 270.0, 190.0, 220.0];
    let heart_disease = ["Yes", "No", "No", "Yes", "Yes", "No", "Yes", "Yes", "No", "No"];

    let numeric = |name: &str, values: &[f64]| Column {
        name: name.to_string(),
        values: values.iter().map(|v| Value::Number(*v)).collect(),
    };

    Table {
        columns: vec![
            numeric("PatientID", &patient_id),
            numeric("Age", &age),
            numeric("BMI", &bmi),
            numeric("BloodPressure", &blood_pressure),
            numeric("Cholesterol", &cholesterol),
            Column {
                name: "HeartDisease".to_string(),
                values: heart_disease
                    .iter()
                    .map(|v| Value::Text(v.to_string()))
                    .collect(),
            },
        ],
    }
}

/// Parse a CSV file into a table.
///
/// The first line is taken as the header row. Rows shorter than the header
/// are padded with empty cells and longer rows are truncated; no further
/// schema validation happens here - the renderers reject unsuitable shapes.
pub fn from_csv(path: impl AsRef<Path>) -> Result<Table, DatasetError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let lines: Vec<String> = reader.lines().collect::<Result<_, _>>()?;
    from_csv_lines(&lines)
}

/// Parse CSV content held in memory (e.g. an uploaded file).
pub fn from_csv_str(content: &str) -> Result<Table, DatasetError> {
    let lines: Vec<String> = content.lines().map(|l| l.to_string()).collect();
    from_csv_lines(&lines)
}

fn from_csv_lines(lines: &[String]) -> Result<Table, DatasetError> {
    let lines: Vec<&String> = lines.iter().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return Err(DatasetError::Empty);
    }

    let headers = parse_csv_row(lines[0]);
    let cols = headers.len();

    // Collect the raw string grid first, then infer column types
    let mut grid: Vec<Vec<String>> = vec![Vec::with_capacity(lines.len() - 1); cols];
    for line in &lines[1..] {
        let mut row = parse_csv_row(line);
        row.resize(cols, String::new());
        for (c, cell) in row.into_iter().take(cols).enumerate() {
            grid[c].push(cell);
        }
    }

    let columns = headers
        .into_iter()
        .zip(grid)
        .map(|(name, cells)| {
            let numeric = cells.iter().all(|cell| cell.trim().parse::<f64>().is_ok());
            let values = cells
                .into_iter()
                .map(|cell| {
                    if numeric {
                        Value::Number(cell.trim().parse::<f64>().unwrap_or(0.0))
                    } else {
                        Value::Text(cell)
                    }
                })
                .collect();
            Column { name, values }
        })
        .collect();

    Ok(Table { columns })
}

/// Render a table as CSV with a header row.
///
/// Fields containing commas, quotes or newlines are quoted with doubled
/// inner quotes, matching what the parser accepts.
pub fn to_csv(table: &Table) -> String {
    let mut out = String::new();

    for (c, column) in table.columns.iter().enumerate() {
        if c > 0 {
            out.push(',');
        }
        out.push_str(&escape_csv_field(&column.name));
    }
    out.push('\n');

    for r in 0..table.n_rows() {
        for (c, column) in table.columns.iter().enumerate() {
            if c > 0 {
                out.push(',');
            }
            out.push_str(&escape_csv_field(&column.values[r].render()));
        }
        out.push('\n');
    }

    out
}

fn escape_csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

// Parse a CSV row into a vector of strings
fn parse_csv_row(line: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current_field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if let Some(&next) = chars.peek() {
                    if next == '"' && in_quotes {
                        // Double quote inside quoted field - add a single quote
                        current_field.push('"');
                        chars.next();
                    } else {
                        in_quotes = !in_quotes;
                    }
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                result.push(current_field);
                current_field = String::new();
            }
            _ => {
                current_field.push(c);
            }
        }
    }

    result.push(current_field);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_has_expected_shape() {
        let table = sample_dataset();
        assert_eq!(table.columns.len(), 6);
        assert_eq!(table.n_rows(), 10);
        assert_eq!(table.columns[0].name, "PatientID");
        assert_eq!(table.columns[5].name, "HeartDisease");
    }

    #[test]
    fn column_kinds_are_inferred() {
        let table = sample_dataset();
        assert_eq!(table.columns[1].kind(), ColumnKind::Numeric);
        assert_eq!(table.columns[5].kind(), ColumnKind::Categorical);

        let free_text = Column {
            name: "Notes".to_string(),
            values: (0..40).map(|i| Value::Text(format!("note {}", i))).collect(),
        };
        assert_eq!(free_text.kind(), ColumnKind::Text);
    }

    #[test]
    fn load_dataset_synthesizes_and_persists_sample() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("healthcare_data.csv");

        let first = load_dataset(&path).unwrap();
        assert!(path.exists());
        assert_eq!(first, sample_dataset());

        // Second call must hit the cached copy and return identical data
        let persisted = fs::read(&path).unwrap();
        let second = load_dataset(&path).unwrap();
        assert_eq!(first, second);
        assert_eq!(to_csv(&second).as_bytes(), persisted.as_slice());
    }

    #[test]
    fn csv_quoting_round_trips() {
        let table = Table {
            columns: vec![Column {
                name: "Remark".to_string(),
                values: vec![
                    Value::Text("plain".to_string()),
                    Value::Text("has, comma".to_string()),
                    Value::Text("has \"quote\"".to_string()),
                ],
            }],
        };

        let parsed = from_csv_str(&to_csv(&table)).unwrap();
        assert_eq!(parsed, table);
    }

    #[test]
    fn uploaded_table_of_arbitrary_shape_parses() {
        let csv = "Name,Score\nalice,12\nbob,9\n";
        let table = from_csv_str(csv).unwrap();
        assert_eq!(table.columns.len(), 2);
        assert_eq!(table.columns[1].kind(), ColumnKind::Numeric);
        assert_eq!(table.columns[1].numbers(), vec![12.0, 9.0]);
    }

    #[test]
    fn empty_content_is_rejected() {
        assert!(matches!(from_csv_str("  \n"), Err(DatasetError::Empty)));
    }

    #[test]
    fn short_rows_are_padded() {
        let table = from_csv_str("A,B\n1\n2,3\n").unwrap();
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.columns[1].values[0], Value::Text(String::new()));
    }
}
