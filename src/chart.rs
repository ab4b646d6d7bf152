use crate::columns;
use crate::dataset::Table;
use plotters::prelude::*;
use thiserror::Error;

/// Default figure dimensions in pixels.
pub const FIGURE_WIDTH: u32 = 800;
pub const FIGURE_HEIGHT: u32 = 600;

/// Number of bins used by the histogram renderer.
const HISTOGRAM_BINS: usize = 10;

/// Which renderer produced a figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Scatter,
    Bar,
    Line,
    Histogram,
    Boxplot,
    Heatmap,
}

/// An in-memory rendered chart: an RGB pixel buffer plus its metadata.
///
/// Not yet serialized to an image file or document page; the report
/// generator embeds the raw pixels and the web layer encodes them as PNG.
#[derive(Debug, Clone)]
pub struct Figure {
    /// Renderer that produced this figure
    pub kind: ChartKind,

    /// Title drawn at the top of the chart
    pub title: String,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Raw RGB pixel data, `width * height * 3` bytes
    pub rgb: Vec<u8>,
}

impl Figure {
    fn new(kind: ChartKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            width: FIGURE_WIDTH,
            height: FIGURE_HEIGHT,
            rgb: vec![255; (FIGURE_WIDTH * FIGURE_HEIGHT * 3) as usize],
        }
    }

    /// Encode the figure as a PNG image for serving over HTTP.
    #[cfg(feature = "web")]
    pub fn to_png(&self) -> Result<Vec<u8>, ChartError> {
        let img = image::RgbImage::from_raw(self.width, self.height, self.rgb.clone())
            .ok_or_else(|| ChartError::Render("figure buffer size mismatch".to_string()))?;

        let mut buffer = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(
                &mut std::io::Cursor::new(&mut buffer),
                image::ImageOutputFormat::Png,
            )
            .map_err(|e| ChartError::Render(e.to_string()))?;
        Ok(buffer)
    }
}

/// A renderer's named failure modes.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("insufficient numeric columns: needed {needed}, found {found}")]
    InsufficientNumericColumns { needed: usize, found: usize },

    #[error("no numeric columns in table")]
    NoNumericColumns,

    #[error("no categorical column in table")]
    NoCategoricalColumn,

    #[error("chart rendering failed: {0}")]
    Render(String),
}

fn insufficient(table: &Table, needed: usize) -> ChartError {
    ChartError::InsufficientNumericColumns {
        needed,
        found: columns::numeric_columns(table).len(),
    }
}

fn render_err(e: Box<dyn std::error::Error>) -> ChartError {
    ChartError::Render(e.to_string())
}

/// Axis range covering the given values, with a fallback for empty input.
fn axis_range(values: impl Iterator<Item = f64>) -> std::ops::Range<f64> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        if v < min {
            min = v;
        }
        if v > max {
            max = v;
        }
    }
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    min..max + 1.0
}

/// Scatter plot of the first two numeric columns.
///
/// # Errors
/// * `InsufficientNumericColumns` when fewer than two numeric columns exist
pub fn scatter(table: &Table) -> Result<Figure, ChartError> {
    let (x, y) = columns::numeric_pair(table).ok_or_else(|| insufficient(table, 2))?;
    scatter_between(table, x, y)
}

/// Scatter plot of two specific numeric columns.
pub fn scatter_between(table: &Table, x: usize, y: usize) -> Result<Figure, ChartError> {
    let x_col = &table.columns[x];
    let y_col = &table.columns[y];
    let points: Vec<(f64, f64)> = x_col
        .numbers()
        .into_iter()
        .zip(y_col.numbers())
        .collect();

    let mut figure = Figure::new(
        ChartKind::Scatter,
        format!("{} vs. {}", x_col.name, y_col.name),
    );
    let (x_label, y_label) = (x_col.name.clone(), y_col.name.clone());
    draw_scatter(&mut figure, &x_label, &y_label, &points).map_err(render_err)?;
    Ok(figure)
}

fn draw_scatter(
    figure: &mut Figure,
    x_label: &str,
    y_label: &str,
    points: &[(f64, f64)],
) -> Result<(), Box<dyn std::error::Error>> {
    let title = figure.title.clone();
    let size = (figure.width, figure.height);
    let root = BitMapBackend::with_buffer(&mut figure.rgb, size).into_drawing_area();
    root.fill(&WHITE)?;

    let x_range = axis_range(points.iter().map(|p| p.0));
    let y_range = axis_range(points.iter().map(|p| p.1));

    let mut chart = ChartBuilder::on(&root)
        .caption(&title, ("sans-serif", 30).into_font())
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_desc(x_label)
        .y_desc(y_label)
        .draw()?;

    chart.draw_series(
        points
            .iter()
            .map(|&(x, y)| Circle::new((x, y), 4, BLUE.filled())),
    )?;

    root.present()?;
    Ok(())
}

/// Line plot of the first numeric column against the second.
///
/// Fails under the same two-numeric-columns rule as [`scatter`].
pub fn line(table: &Table) -> Result<Figure, ChartError> {
    let (x, y) = columns::numeric_pair(table).ok_or_else(|| insufficient(table, 2))?;
    line_between(table, x, y)
}

/// Line plot of two specific numeric columns, points in row order.
pub fn line_between(table: &Table, x: usize, y: usize) -> Result<Figure, ChartError> {
    let x_col = &table.columns[x];
    let y_col = &table.columns[y];
    let points: Vec<(f64, f64)> = x_col
        .numbers()
        .into_iter()
        .zip(y_col.numbers())
        .collect();

    let mut figure = Figure::new(
        ChartKind::Line,
        format!("{} vs. {}", x_col.name, y_col.name),
    );
    let (x_label, y_label) = (x_col.name.clone(), y_col.name.clone());
    draw_line(&mut figure, &x_label, &y_label, &points).map_err(render_err)?;
    Ok(figure)
}

fn draw_line(
    figure: &mut Figure,
    x_label: &str,
    y_label: &str,
    points: &[(f64, f64)],
) -> Result<(), Box<dyn std::error::Error>> {
    let title = figure.title.clone();
    let size = (figure.width, figure.height);
    let root = BitMapBackend::with_buffer(&mut figure.rgb, size).into_drawing_area();
    root.fill(&WHITE)?;

    let x_range = axis_range(points.iter().map(|p| p.0));
    let y_range = axis_range(points.iter().map(|p| p.1));

    let mut chart = ChartBuilder::on(&root)
        .caption(&title, ("sans-serif", 30).into_font())
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_desc(x_label)
        .y_desc(y_label)
        .draw()?;

    let orange = RGBColor(255, 140, 0);
    chart.draw_series(LineSeries::new(points.iter().copied(), &orange))?;
    chart.draw_series(
        points
            .iter()
            .map(|&(x, y)| Circle::new((x, y), 3, orange.filled())),
    )?;

    root.present()?;
    Ok(())
}

/// Bar chart of value frequencies in the first categorical column.
///
/// Counts occurrences of each distinct value (e.g. "Yes"/"No") in
/// first-seen order, the way the original dashboards chart heart-disease
/// counts.
///
/// # Errors
/// * `NoCategoricalColumn` when the table has no categorical column
pub fn bar(table: &Table) -> Result<Figure, ChartError> {
    let col = columns::first_categorical(table).ok_or(ChartError::NoCategoricalColumn)?;
    bar_counts(table, col)
}

/// Frequency-count bar chart of a specific column.
pub fn bar_counts(table: &Table, col: usize) -> Result<Figure, ChartError> {
    let column = &table.columns[col];
    let counts = value_counts(column);

    let mut figure = Figure::new(ChartKind::Bar, format!("{} Count", column.name));
    let x_label = column.name.clone();
    draw_bar(&mut figure, &x_label, &counts).map_err(render_err)?;
    Ok(figure)
}

/// Frequencies of a column's values, labelled in first-seen order.
pub(crate) fn value_counts(column: &crate::dataset::Column) -> Vec<(String, u32)> {
    let mut counts: Vec<(String, u32)> = Vec::new();
    for value in &column.values {
        let rendered = value.render();
        match counts.iter_mut().find(|(label, _)| *label == rendered) {
            Some((_, n)) => *n += 1,
            None => counts.push((rendered, 1)),
        }
    }
    counts
}

fn draw_bar(
    figure: &mut Figure,
    x_label: &str,
    counts: &[(String, u32)],
) -> Result<(), Box<dyn std::error::Error>> {
    let title = figure.title.clone();
    let size = (figure.width, figure.height);
    let root = BitMapBackend::with_buffer(&mut figure.rgb, size).into_drawing_area();
    root.fill(&WHITE)?;

    let labels: Vec<String> = counts.iter().map(|(label, _)| label.clone()).collect();
    let max_count = counts.iter().map(|(_, n)| *n).max().unwrap_or(1);

    let mut chart = ChartBuilder::on(&root)
        .caption(&title, ("sans-serif", 30).into_font())
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(
            0f64..counts.len().max(1) as f64,
            0f64..max_count as f64 + 1.0,
        )?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len().max(1))
        .x_label_formatter(&|x| {
            labels
                .get(x.floor() as usize)
                .cloned()
                .unwrap_or_default()
        })
        .x_desc(x_label)
        .y_desc("Count")
        .draw()?;

    chart.draw_series(counts.iter().enumerate().map(|(i, (_, n))| {
        let color = if i % 2 == 0 { GREEN } else { RED };
        Rectangle::new(
            [(i as f64 + 0.15, 0.0), (i as f64 + 0.85, *n as f64)],
            color.filled(),
        )
    }))?;

    root.present()?;
    Ok(())
}

/// Histogram of the first numeric column with a smoothed density overlay.
///
/// # Errors
/// * `NoNumericColumns` when the table has no numeric column
pub fn histogram(table: &Table) -> Result<Figure, ChartError> {
    let col = columns::first_numeric(table).ok_or(ChartError::NoNumericColumns)?;
    histogram_of(table, col)
}

/// Histogram of a specific numeric column.
pub fn histogram_of(table: &Table, col: usize) -> Result<Figure, ChartError> {
    let column = &table.columns[col];
    let values = column.numbers();

    let mut figure = Figure::new(ChartKind::Histogram, format!("Histogram of {}", column.name));
    let x_label = column.name.clone();
    draw_histogram(&mut figure, &x_label, &values).map_err(render_err)?;
    Ok(figure)
}

fn draw_histogram(
    figure: &mut Figure,
    x_label: &str,
    values: &[f64],
) -> Result<(), Box<dyn std::error::Error>> {
    let title = figure.title.clone();
    let size = (figure.width, figure.height);
    let root = BitMapBackend::with_buffer(&mut figure.rgb, size).into_drawing_area();
    root.fill(&WHITE)?;

    let range = axis_range(values.iter().copied());
    let bin_width = (range.end - range.start) / HISTOGRAM_BINS as f64;

    let mut bins = [0u32; HISTOGRAM_BINS];
    for &v in values {
        let i = (((v - range.start) / bin_width) as usize).min(HISTOGRAM_BINS - 1);
        bins[i] += 1;
    }
    let max_count = bins.iter().copied().max().unwrap_or(1).max(1);

    let mut chart = ChartBuilder::on(&root)
        .caption(&title, ("sans-serif", 30).into_font())
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(range.clone(), 0f64..max_count as f64 * 1.2 + 1.0)?;

    chart
        .configure_mesh()
        .x_desc(x_label)
        .y_desc("Frequency")
        .draw()?;

    chart.draw_series(bins.iter().enumerate().map(|(i, &count)| {
        let x0 = range.start + i as f64 * bin_width;
        Rectangle::new([(x0, 0.0), (x0 + bin_width, count as f64)], BLUE.mix(0.5).filled())
    }))?;

    // Gaussian KDE overlay, scaled from density to counts
    if let Some(density) = kde_curve(values, &range) {
        let scale = values.len() as f64 * bin_width;
        chart.draw_series(LineSeries::new(
            density.into_iter().map(|(x, d)| (x, d * scale)),
            &RED,
        ))?;
    }

    root.present()?;
    Ok(())
}

/// Gaussian kernel density estimate over 100 grid points, using the
/// Silverman rule-of-thumb bandwidth. None when the data cannot support
/// an estimate (fewer than two points or zero spread).
fn kde_curve(values: &[f64], range: &std::ops::Range<f64>) -> Option<Vec<(f64, f64)>> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let nf = n as f64;
    let mean = values.iter().sum::<f64>() / nf;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (nf - 1.0);
    let std = variance.sqrt();
    if std <= 0.0 {
        return None;
    }

    let bandwidth = 1.06 * std * nf.powf(-0.2);
    let step = (range.end - range.start) / 99.0;
    let curve = (0..100)
        .map(|i| {
            let x = range.start + i as f64 * step;
            let density = values
                .iter()
                .map(|&v| {
                    let u = (x - v) / bandwidth;
                    (-0.5 * u * u).exp()
                })
                .sum::<f64>()
                / (nf * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
            (x, density)
        })
        .collect();
    Some(curve)
}

/// Boxplot summary of the first numeric column.
///
/// # Errors
/// * `NoNumericColumns` when the table has no numeric column
pub fn boxplot(table: &Table) -> Result<Figure, ChartError> {
    let col = columns::first_numeric(table).ok_or(ChartError::NoNumericColumns)?;
    boxplot_of(table, col)
}

/// Boxplot of a specific numeric column.
pub fn boxplot_of(table: &Table, col: usize) -> Result<Figure, ChartError> {
    let column = &table.columns[col];
    let values = column.numbers();

    let mut figure = Figure::new(
        ChartKind::Boxplot,
        format!("Distribution of {}", column.name),
    );
    let label = column.name.clone();
    draw_boxplot(&mut figure, &label, &values).map_err(render_err)?;
    Ok(figure)
}

fn draw_boxplot(
    figure: &mut Figure,
    label: &str,
    values: &[f64],
) -> Result<(), Box<dyn std::error::Error>> {
    let title = figure.title.clone();
    let size = (figure.width, figure.height);
    let root = BitMapBackend::with_buffer(&mut figure.rgb, size).into_drawing_area();
    root.fill(&WHITE)?;

    let range = axis_range(values.iter().copied());
    let pad = (range.end - range.start) * 0.1 + 1.0;
    let labels = [label];

    let mut chart = ChartBuilder::on(&root)
        .caption(&title, ("sans-serif", 30).into_font())
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(
            labels[..].into_segmented(),
            (range.start - pad) as f32..(range.end + pad) as f32,
        )?;

    chart.configure_mesh().y_desc(label).draw()?;

    if !values.is_empty() {
        let quartiles = Quartiles::new(values);
        chart.draw_series(std::iter::once(
            Boxplot::new_vertical(SegmentValue::CenterOf(&label), &quartiles).width(60),
        ))?;
    }

    root.present()?;
    Ok(())
}

/// Annotated pairwise-correlation heatmap over all numeric columns.
///
/// # Errors
/// * `InsufficientNumericColumns` when fewer than two numeric columns exist
pub fn heatmap(table: &Table) -> Result<Figure, ChartError> {
    let numeric = columns::numeric_columns(table);
    if numeric.len() < 2 {
        return Err(insufficient(table, 2));
    }

    let names: Vec<String> = numeric
        .iter()
        .map(|&i| table.columns[i].name.clone())
        .collect();
    let series: Vec<Vec<f64>> = numeric
        .iter()
        .map(|&i| table.columns[i].numbers())
        .collect();

    let n = series.len();
    let mut cells: Vec<(usize, usize, f64)> = Vec::with_capacity(n * n);
    for i in 0..n {
        for j in 0..n {
            cells.push((i, j, pearson(&series[i], &series[j])));
        }
    }

    let mut figure = Figure::new(ChartKind::Heatmap, "Correlation Heatmap".to_string());
    draw_heatmap(&mut figure, &names, &cells).map_err(render_err)?;
    Ok(figure)
}

fn draw_heatmap(
    figure: &mut Figure,
    names: &[String],
    cells: &[(usize, usize, f64)],
) -> Result<(), Box<dyn std::error::Error>> {
    let title = figure.title.clone();
    let size = (figure.width, figure.height);
    let n = names.len();
    let root = BitMapBackend::with_buffer(&mut figure.rgb, size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&title, ("sans-serif", 30).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(90)
        .build_cartesian_2d(0f64..n as f64, 0f64..n as f64)?;

    let label_for = |v: &f64| {
        names
            .get(v.floor() as usize)
            .cloned()
            .unwrap_or_default()
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(n)
        .y_labels(n)
        .x_label_formatter(&label_for)
        .y_label_formatter(&label_for)
        .draw()?;

    chart.draw_series(cells.iter().map(|&(i, j, r)| {
        Rectangle::new(
            [(i as f64, j as f64), (i as f64 + 1.0, j as f64 + 1.0)],
            correlation_color(r).filled(),
        )
    }))?;

    chart.draw_series(cells.iter().map(|&(i, j, r)| {
        Text::new(
            format!("{:.2}", r),
            (i as f64 + 0.35, j as f64 + 0.5),
            ("sans-serif", 16).into_font().color(&BLACK),
        )
    }))?;

    root.present()?;
    Ok(())
}

/// Map a correlation in [-1, 1] onto a blue-white-red scale.
fn correlation_color(r: f64) -> RGBColor {
    let r = r.clamp(-1.0, 1.0);
    if r >= 0.0 {
        let fade = (255.0 * (1.0 - r)) as u8;
        RGBColor(255, fade, fade)
    } else {
        let fade = (255.0 * (1.0 + r)) as u8;
        RGBColor(fade, fade, 255)
    }
}

/// Pearson correlation, 0.0 when either series has zero variance.
fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n == 0 {
        return 0.0;
    }
    let nf = n as f64;
    let mean_x = xs[..n].iter().sum::<f64>() / nf;
    let mean_y = ys[..n].iter().sum::<f64>() / nf;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for k in 0..n {
        let dx = xs[k] - mean_x;
        let dy = ys[k] - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 { 0.0 } else { cov / denom }
}

/// Pick the most suitable renderer by numeric-column count.
///
/// Exactly one numeric column gives a histogram, exactly two a scatter
/// plot, three or more a correlation heatmap.
///
/// # Errors
/// * `NoNumericColumns` when the table has no numeric column at all
pub fn best_visualization(table: &Table) -> Result<Figure, ChartError> {
    match columns::numeric_columns(table).len() {
        0 => Err(ChartError::NoNumericColumns),
        1 => histogram(table),
        2 => scatter(table),
        _ => heatmap(table),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{sample_dataset, Column, Table, Value};

    fn numeric_column(name: &str, values: &[f64]) -> Column {
        Column {
            name: name.to_string(),
            values: values.iter().map(|v| Value::Number(*v)).collect(),
        }
    }

    fn numeric_table(specs: &[(&str, &[f64])]) -> Table {
        Table {
            columns: specs
                .iter()
                .map(|(name, values)| numeric_column(name, values))
                .collect(),
        }
    }

    #[test]
    fn scatter_renders_sample() {
        let figure = scatter(&sample_dataset()).unwrap();
        assert_eq!(figure.kind, ChartKind::Scatter);
        assert_eq!(figure.rgb.len(), (FIGURE_WIDTH * FIGURE_HEIGHT * 3) as usize);
        // Something must have been drawn over the white background
        assert!(figure.rgb.iter().any(|&b| b != 255));
    }

    #[test]
    fn two_column_renderers_fail_on_single_numeric_column() {
        let table = numeric_table(&[("Age", &[45.0, 50.0, 39.0])]);
        let renderers: [fn(&Table) -> Result<Figure, ChartError>; 3] = [scatter, line, heatmap];
        for renderer in renderers {
            match renderer(&table) {
                Err(ChartError::InsufficientNumericColumns { needed: 2, found: 1 }) => {}
                other => panic!("expected insufficient-columns error, got {:?}", other.map(|f| f.kind)),
            }
        }
    }

    #[test]
    fn renderers_accept_zero_rows() {
        let table = numeric_table(&[("Age", &[]), ("BMI", &[])]);
        assert!(scatter(&table).is_ok());
        assert!(line(&table).is_ok());
        assert!(histogram(&table).is_ok());
        assert!(boxplot(&table).is_ok());
        assert!(heatmap(&table).is_ok());
    }

    #[test]
    fn bar_counts_sample_heart_disease() {
        let figure = bar(&sample_dataset()).unwrap();
        assert_eq!(figure.kind, ChartKind::Bar);
        assert_eq!(figure.title, "HeartDisease Count");

        // The sample's HeartDisease column splits 5/5, Yes seen first
        let table = sample_dataset();
        let counts = value_counts(&table.columns[5]);
        assert_eq!(
            counts,
            vec![("Yes".to_string(), 5), ("No".to_string(), 5)]
        );
    }

    #[test]
    fn bar_fails_without_categorical_column() {
        let table = numeric_table(&[("Age", &[45.0, 50.0])]);
        assert!(matches!(bar(&table), Err(ChartError::NoCategoricalColumn)));
    }

    #[test]
    fn histogram_fails_without_numeric_column() {
        let table = Table {
            columns: vec![Column {
                name: "Status".to_string(),
                values: vec![Value::Text("on".to_string()), Value::Text("off".to_string())],
            }],
        };
        assert!(matches!(histogram(&table), Err(ChartError::NoNumericColumns)));
        assert!(matches!(boxplot(&table), Err(ChartError::NoNumericColumns)));
    }

    #[test]
    fn best_visualization_tie_break() {
        let age: &[f64] = &[45.0, 50.0, 39.0, 60.0];
        let bmi: &[f64] = &[28.5, 30.2, 24.8, 32.0];
        let chol: &[f64] = &[220.0, 240.0, 200.0, 260.0];

        let one = numeric_table(&[("Age", age)]);
        assert_eq!(best_visualization(&one).unwrap().kind, ChartKind::Histogram);

        let two = numeric_table(&[("Age", age), ("BMI", bmi)]);
        assert_eq!(best_visualization(&two).unwrap().kind, ChartKind::Scatter);

        let three = numeric_table(&[("Age", age), ("BMI", bmi), ("Cholesterol", chol)]);
        assert_eq!(best_visualization(&three).unwrap().kind, ChartKind::Heatmap);

        let none = Table {
            columns: vec![Column {
                name: "Status".to_string(),
                values: vec![Value::Text("on".to_string())],
            }],
        };
        assert!(matches!(
            best_visualization(&none),
            Err(ChartError::NoNumericColumns)
        ));
    }

    #[test]
    fn pearson_basics() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let doubled = [2.0, 4.0, 6.0, 8.0];
        let negated = [4.0, 3.0, 2.0, 1.0];
        assert!((pearson(&xs, &doubled) - 1.0).abs() < 1e-9);
        assert!((pearson(&xs, &negated) + 1.0).abs() < 1e-9);
        assert_eq!(pearson(&xs, &[5.0, 5.0, 5.0, 5.0]), 0.0);
    }
}
