use crate::chart::{self, ChartError, Figure};
use crate::dataset::Table;
use log::warn;
use printpdf::image_crate::{DynamicImage, RgbImage};
use printpdf::{Image, ImageTransform, Mm, PdfDocument};
use thiserror::Error;

/// Download filename associated with a generated report.
pub const REPORT_FILENAME: &str = "healthcare_report.pdf";

/// MIME type of a generated report.
pub const REPORT_MIME: &str = "application/pdf";

/// A4 page size in millimetres.
const PAGE_WIDTH_MM: f64 = 210.0;
const PAGE_HEIGHT_MM: f64 = 297.0;

/// Resolution at which figure pixels are placed on the page.
const PAGE_DPI: f64 = 110.0;

type Renderer = fn(&Table) -> Result<Figure, ChartError>;

/// The fixed page order of the report.
const REPORT_PAGES: [(&str, Renderer); 6] = [
    ("scatter", chart::scatter),
    ("bar", chart::bar),
    ("line", chart::line),
    ("histogram", chart::histogram),
    ("boxplot", chart::boxplot),
    ("heatmap", chart::heatmap),
];

/// Fatal report-generation failures.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("pdf generation failed: {0}")]
    Pdf(String),
}

/// Compose the fixed, ordered list of chart renderers into a PDF buffer.
///
/// Runs each renderer in [`REPORT_PAGES`] order against `table`. A renderer
/// that fails is logged and skipped so a partial report is still produced;
/// pages appear in list order for whatever succeeded. The buffer is fully
/// in memory and begins at the document header.
///
/// # Errors
/// * Returns an error only when the PDF itself cannot be assembled
pub fn generate_report(table: &Table) -> Result<Vec<u8>, ReportError> {
    let figures: Vec<Figure> = REPORT_PAGES
        .iter()
        .filter_map(|(name, renderer)| match renderer(table) {
            Ok(figure) => Some(figure),
            Err(e) => {
                warn!("skipping {} page: {}", name, e);
                None
            }
        })
        .collect();

    figures_to_pdf("Healthcare Report", &figures)
}

/// Serialize rendered figures into a paginated PDF, one figure per page.
///
/// An empty figure list still yields a valid single-page document.
pub fn figures_to_pdf(title: &str, figures: &[Figure]) -> Result<Vec<u8>, ReportError> {
    let page_width = Mm(PAGE_WIDTH_MM as f32);
    let page_height = Mm(PAGE_HEIGHT_MM as f32);

    let (doc, first_page, first_layer) = PdfDocument::new(title, page_width, page_height, "Chart");

    let mut pages = vec![(first_page, first_layer)];
    for _ in 1..figures.len() {
        pages.push(doc.add_page(page_width, page_height, "Chart"));
    }

    for (figure, (page, layer)) in figures.iter().zip(pages) {
        let layer = doc.get_page(page).get_layer(layer);

        let img = RgbImage::from_raw(figure.width, figure.height, figure.rgb.clone())
            .ok_or_else(|| ReportError::Pdf("figure buffer size mismatch".to_string()))?;
        let image = Image::from_dynamic_image(&DynamicImage::ImageRgb8(img));

        // Centre the figure horizontally near the top of the page
        let width_mm = figure.width as f64 * 25.4 / PAGE_DPI;
        let height_mm = figure.height as f64 * 25.4 / PAGE_DPI;
        image.add_to_layer(
            layer,
            ImageTransform {
                translate_x: Some(Mm(((PAGE_WIDTH_MM - width_mm) / 2.0) as f32)),
                translate_y: Some(Mm((PAGE_HEIGHT_MM - height_mm - 20.0) as f32)),
                dpi: Some(PAGE_DPI as f32),
                ..Default::default()
            },
        );
    }

    doc.save_to_bytes().map_err(|e| ReportError::Pdf(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{sample_dataset, Column, Table, Value};

    #[test]
    fn report_on_sample_is_a_pdf() {
        let buffer = generate_report(&sample_dataset()).unwrap();
        assert!(!buffer.is_empty());
        assert!(buffer.starts_with(b"%PDF"));
    }

    #[test]
    fn report_skips_failed_pages() {
        // Only the bar page can succeed here; the rest need numeric columns
        let table = Table {
            columns: vec![Column {
                name: "Status".to_string(),
                values: vec![
                    Value::Text("on".to_string()),
                    Value::Text("off".to_string()),
                    Value::Text("on".to_string()),
                ],
            }],
        };

        let buffer = generate_report(&table).unwrap();
        assert!(buffer.starts_with(b"%PDF"));
    }

    #[test]
    fn empty_figure_list_still_yields_a_document() {
        let buffer = figures_to_pdf("Empty", &[]).unwrap();
        assert!(buffer.starts_with(b"%PDF"));
    }
}
