//! A restricted interpreter for one-line chart requests.
//!
//! This replaces the "have a model write plotting code and execute it"
//! feature of earlier dashboard revisions with a capability-limited
//! evaluator: the only things a request can do are listed below, each
//! mapping onto a fixed chart constructor with caller-named columns.
//! There is no other evaluation and no code execution of any kind.
//!
//! Grammar, one request per line:
//!
//! ```text
//! scatter(Age, Cholesterol)
//! bar(HeartDisease)
//! line(Age, BMI)
//! histogram(BMI)
//! boxplot(Age)
//! heatmap
//! best
//! ```

use crate::chart::{self, ChartError, Figure};
use crate::dataset::{ColumnKind, Table};
use thiserror::Error;

/// A parsed, validated chart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartRequest {
    Scatter { x: String, y: String },
    Bar { column: String },
    Line { x: String, y: String },
    Histogram { column: String },
    Boxplot { column: String },
    Heatmap,
    Best,
}

/// Failures from parsing or evaluating a chart request.
#[derive(Debug, Error)]
pub enum ChartSpecError {
    #[error("empty chart request")]
    Empty,

    #[error("unknown chart type: {0}")]
    UnknownChart(String),

    #[error("{chart} takes {expected} column argument(s), got {got}")]
    WrongArity {
        chart: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("malformed chart request: {0}")]
    Malformed(String),

    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("column {0} is not numeric")]
    NotNumeric(String),

    #[error("column {0} is not categorical")]
    NotCategorical(String),

    #[error(transparent)]
    Chart(#[from] ChartError),
}

/// Parse a single chart request.
///
/// Only the allow-listed chart names are accepted; anything else -
/// including anything that looks like code - is a named parse error.
pub fn parse_request(input: &str) -> Result<ChartRequest, ChartSpecError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ChartSpecError::Empty);
    }

    let (name, args) = match input.find('(') {
        Some(open) => {
            let close = input
                .rfind(')')
                .filter(|&close| close == input.len() - 1 && close > open)
                .ok_or_else(|| ChartSpecError::Malformed(input.to_string()))?;
            let args: Vec<String> = input[open + 1..close]
                .split(',')
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .collect();
            (input[..open].trim(), args)
        }
        None => (input, Vec::new()),
    };

    if !name.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ChartSpecError::Malformed(input.to_string()));
    }

    let expect = |chart: &'static str, expected: usize| -> Result<(), ChartSpecError> {
        if args.len() == expected {
            Ok(())
        } else {
            Err(ChartSpecError::WrongArity {
                chart,
                expected,
                got: args.len(),
            })
        }
    };

    match name.to_ascii_lowercase().as_str() {
        "scatter" => {
            expect("scatter", 2)?;
            Ok(ChartRequest::Scatter {
                x: args[0].clone(),
                y: args[1].clone(),
            })
        }
        "bar" => {
            expect("bar", 1)?;
            Ok(ChartRequest::Bar {
                column: args[0].clone(),
            })
        }
        "line" => {
            expect("line", 2)?;
            Ok(ChartRequest::Line {
                x: args[0].clone(),
                y: args[1].clone(),
            })
        }
        "histogram" => {
            expect("histogram", 1)?;
            Ok(ChartRequest::Histogram {
                column: args[0].clone(),
            })
        }
        "boxplot" => {
            expect("boxplot", 1)?;
            Ok(ChartRequest::Boxplot {
                column: args[0].clone(),
            })
        }
        "heatmap" => {
            expect("heatmap", 0)?;
            Ok(ChartRequest::Heatmap)
        }
        "best" => {
            expect("best", 0)?;
            Ok(ChartRequest::Best)
        }
        other => Err(ChartSpecError::UnknownChart(other.to_string())),
    }
}

/// Evaluate a parsed request against a table.
///
/// Column names are resolved here; the actual drawing happens through the
/// same renderers the rest of the system uses.
pub fn evaluate(request: &ChartRequest, table: &Table) -> Result<Figure, ChartSpecError> {
    match request {
        ChartRequest::Scatter { x, y } => {
            let (x, y) = (numeric_index(table, x)?, numeric_index(table, y)?);
            Ok(chart::scatter_between(table, x, y)?)
        }
        ChartRequest::Line { x, y } => {
            let (x, y) = (numeric_index(table, x)?, numeric_index(table, y)?);
            Ok(chart::line_between(table, x, y)?)
        }
        ChartRequest::Bar { column } => {
            let col = categorical_index(table, column)?;
            Ok(chart::bar_counts(table, col)?)
        }
        ChartRequest::Histogram { column } => {
            let col = numeric_index(table, column)?;
            Ok(chart::histogram_of(table, col)?)
        }
        ChartRequest::Boxplot { column } => {
            let col = numeric_index(table, column)?;
            Ok(chart::boxplot_of(table, col)?)
        }
        ChartRequest::Heatmap => Ok(chart::heatmap(table)?),
        ChartRequest::Best => Ok(chart::best_visualization(table)?),
    }
}

fn numeric_index(table: &Table, name: &str) -> Result<usize, ChartSpecError> {
    let index = table
        .column_index(name)
        .ok_or_else(|| ChartSpecError::UnknownColumn(name.to_string()))?;
    if table.columns[index].kind() != ColumnKind::Numeric {
        return Err(ChartSpecError::NotNumeric(name.to_string()));
    }
    Ok(index)
}

fn categorical_index(table: &Table, name: &str) -> Result<usize, ChartSpecError> {
    let index = table
        .column_index(name)
        .ok_or_else(|| ChartSpecError::UnknownColumn(name.to_string()))?;
    if table.columns[index].kind() != ColumnKind::Categorical {
        return Err(ChartSpecError::NotCategorical(name.to_string()));
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartKind;
    use crate::dataset::sample_dataset;

    #[test]
    fn parses_allow_listed_requests() {
        assert_eq!(
            parse_request("scatter(Age, Cholesterol)").unwrap(),
            ChartRequest::Scatter {
                x: "Age".to_string(),
                y: "Cholesterol".to_string()
            }
        );
        assert_eq!(
            parse_request("bar(HeartDisease)").unwrap(),
            ChartRequest::Bar {
                column: "HeartDisease".to_string()
            }
        );
        assert_eq!(parse_request(" heatmap ").unwrap(), ChartRequest::Heatmap);
        assert_eq!(parse_request("BEST").unwrap(), ChartRequest::Best);
    }

    #[test]
    fn rejects_unknown_charts_and_code() {
        assert!(matches!(
            parse_request("pie(Age)"),
            Err(ChartSpecError::UnknownChart(_))
        ));
        assert!(matches!(
            parse_request("import os"),
            Err(ChartSpecError::Malformed(_))
        ));
        assert!(matches!(
            parse_request("exec('rm -rf /')"),
            Err(ChartSpecError::UnknownChart(_))
        ));
        assert!(matches!(parse_request("   "), Err(ChartSpecError::Empty)));
    }

    #[test]
    fn rejects_wrong_arity() {
        assert!(matches!(
            parse_request("scatter(Age)"),
            Err(ChartSpecError::WrongArity {
                chart: "scatter",
                expected: 2,
                got: 1
            })
        ));
        assert!(matches!(
            parse_request("heatmap(Age)"),
            Err(ChartSpecError::WrongArity { .. })
        ));
    }

    #[test]
    fn evaluates_named_columns() {
        let table = sample_dataset();
        let request = parse_request("scatter(Age, Cholesterol)").unwrap();
        let figure = evaluate(&request, &table).unwrap();
        assert_eq!(figure.kind, ChartKind::Scatter);
        assert_eq!(figure.title, "Age vs. Cholesterol");
    }

    #[test]
    fn evaluation_checks_column_kinds() {
        let table = sample_dataset();
        assert!(matches!(
            evaluate(&parse_request("histogram(HeartDisease)").unwrap(), &table),
            Err(ChartSpecError::NotNumeric(_))
        ));
        assert!(matches!(
            evaluate(&parse_request("bar(Age)").unwrap(), &table),
            Err(ChartSpecError::NotCategorical(_))
        ));
        assert!(matches!(
            evaluate(&parse_request("boxplot(Nope)").unwrap(), &table),
            Err(ChartSpecError::UnknownColumn(_))
        ));
    }
}
