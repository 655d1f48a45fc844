//! Stacked completeness bar charts rendered to PNG.
//!
//! Each column gets one bar: the available share at the bottom, the missing
//! share stacked on top, both on a 0-100 % scale. Required fields without any
//! header mapping are drawn as a white, hatched bar.
//!
//! Bars, gridlines and legend swatches are drawn with `imageproc`. Text
//! (title, axis labels, column names, in-bar percentages, legend entries) is
//! laid out as an SVG layer, rasterized with `resvg` and composited on top.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use image::{Rgba, RgbaImage, imageops};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree};
use tracing::{debug, info, warn};

use mcc_model::{ColumnCompleteness, RecordCompletenessReport};

use crate::error::{ReportError, Result};

pub const RAW_CHART_TITLE: &str = "Completeness of fields present in Metadata";
pub const REQUIRED_CHART_TITLE: &str = "Required Field Completeness Summary";

const LEFT: u32 = 70;
const TOP: u32 = 50;
const RIGHT: u32 = 190;
const BOTTOM: u32 = 160;
const PLOT_HEIGHT: u32 = 300;
const BAR_WIDTH: u32 = 24;
const BAR_GAP: u32 = 12;
const HATCH_SPACING: u32 = 8;
const GRID_STEPS: u32 = 5;
const SWATCH: u32 = 14;
const LEGEND_ROW: u32 = 22;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const GRID: Rgba<u8> = Rgba([210, 210, 210, 255]);

const PREFERRED_FAMILIES: [&str; 5] = [
    "DejaVu Sans",
    "Liberation Sans",
    "Noto Sans",
    "Arial",
    "Helvetica",
];

/// Bar colors for the available and missing shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub available: Rgba<u8>,
    pub missing: Rgba<u8>,
}

impl Palette {
    /// Raw dataset columns.
    pub const RAW: Self = Self {
        available: Rgba([0x55, 0xCC, 0x99, 255]),
        missing: Rgba([0xDD, 0x33, 0x33, 255]),
    };

    /// Required fields after canonicalization.
    pub const REQUIRED: Self = Self {
        available: Rgba([0x55, 0x77, 0xDD, 255]),
        missing: Rgba([0xDD, 0x33, 0x33, 255]),
    };
}

/// Title, colors and legend of one chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartStyle {
    pub title: &'static str,
    pub palette: Palette,
    /// Adds the hatched "Header Missing" legend entry.
    pub marks_missing_headers: bool,
}

impl ChartStyle {
    pub const RAW: Self = Self {
        title: RAW_CHART_TITLE,
        palette: Palette::RAW,
        marks_missing_headers: false,
    };

    pub const REQUIRED: Self = Self {
        title: REQUIRED_CHART_TITLE,
        palette: Palette::REQUIRED,
        marks_missing_headers: true,
    };

    fn legend(&self) -> Vec<(&'static str, Swatch)> {
        let mut entries = vec![
            ("Available (%)", Swatch::Solid(self.palette.available)),
            ("Unavailable (%)", Swatch::Solid(self.palette.missing)),
        ];
        if self.marks_missing_headers {
            entries.push(("Header Missing", Swatch::Hatched));
        }
        entries
    }
}

#[derive(Debug, Clone, Copy)]
enum Swatch {
    Solid(Rgba<u8>),
    Hatched,
}

/// Pixel geometry shared by the bar layer and the text layer.
#[derive(Debug, Clone, Copy)]
struct Layout {
    width: u32,
    height: u32,
    plot_right: u32,
    baseline: u32,
}

impl Layout {
    fn new(bars: usize) -> Self {
        let bars = u32::try_from(bars).unwrap_or(u32::MAX);
        let plot_width = bars.saturating_mul(BAR_WIDTH + BAR_GAP);
        let plot_right = LEFT.saturating_add(plot_width);
        Self {
            width: plot_right.saturating_add(RIGHT),
            height: TOP + PLOT_HEIGHT + BOTTOM,
            plot_right,
            baseline: TOP + PLOT_HEIGHT,
        }
    }

    fn bar_x(idx: usize) -> u32 {
        let idx = u32::try_from(idx).unwrap_or(u32::MAX);
        LEFT + BAR_GAP / 2 + idx.saturating_mul(BAR_WIDTH + BAR_GAP)
    }

    fn bar_center(idx: usize) -> u32 {
        Self::bar_x(idx) + BAR_WIDTH / 2
    }

    fn legend_x(&self) -> u32 {
        self.plot_right + 20
    }

    fn legend_y(row: usize) -> u32 {
        TOP + 10 + u32::try_from(row).unwrap_or(0) * LEGEND_ROW
    }
}

/// Renders charts, with system fonts for the text layer.
///
/// When no font is available the text is left out and the bars are still
/// drawn.
pub struct ChartRenderer {
    options: Options<'static>,
}

impl ChartRenderer {
    pub fn with_system_fonts() -> Self {
        let mut options = Options::default();
        let fontdb = options.fontdb_mut();
        fontdb.load_system_fonts();
        let family = preferred_family(fontdb);
        match family {
            Some(family) => {
                debug!(%family, faces = fontdb.len(), "chart font selected");
                fontdb.set_sans_serif_family(family);
            }
            None => warn!("no system fonts found, chart labels will be omitted"),
        }
        Self { options }
    }

    /// Bars plus text for one chart.
    pub fn render(&self, columns: &[ColumnCompleteness], style: ChartStyle) -> Result<RgbaImage> {
        let mut img = render_bar_chart(columns, style);
        let layout = Layout::new(columns.len());
        let svg = chart_labels_svg(columns, style);
        let tree = Tree::from_str(&svg, &self.options).map_err(|e| ReportError::ChartLabels {
            message: e.to_string(),
        })?;
        let Some(mut pixmap) = Pixmap::new(layout.width, layout.height) else {
            return Ok(img);
        };
        resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());

        let mut layer = RgbaImage::new(layout.width, layout.height);
        for (pixel, source) in layer.pixels_mut().zip(pixmap.pixels()) {
            let color = source.demultiply();
            *pixel = Rgba([color.red(), color.green(), color.blue(), color.alpha()]);
        }
        imageops::overlay(&mut img, &layer, 0, 0);
        Ok(img)
    }
}

fn preferred_family(fontdb: &resvg::usvg::fontdb::Database) -> Option<String> {
    let has_family = |name: &str| {
        fontdb
            .faces()
            .any(|face| face.families.iter().any(|(family, _)| family == name))
    };
    if let Some(name) = PREFERRED_FAMILIES.into_iter().find(|&name| has_family(name)) {
        return Some(name.to_string());
    }
    fontdb
        .faces()
        .find_map(|face| face.families.first().map(|(family, _)| family.clone()))
}

/// Renders the graphical part of a chart: gridlines, axes, stacked bars and
/// legend swatches.
pub fn render_bar_chart(columns: &[ColumnCompleteness], style: ChartStyle) -> RgbaImage {
    let layout = Layout::new(columns.len());
    let mut img = RgbaImage::from_pixel(layout.width, layout.height, WHITE);
    let palette = style.palette;

    let left = LEFT as f32;
    let right = layout.plot_right as f32;
    let baseline = layout.baseline;
    for step in 1..=GRID_STEPS {
        let y = (baseline - PLOT_HEIGHT * step / GRID_STEPS) as f32;
        draw_line_segment_mut(&mut img, (left, y), (right, y), GRID);
    }

    for (idx, column) in columns.iter().enumerate() {
        let x = Layout::bar_x(idx);
        let available = scaled(column.available_percentage);
        let missing = scaled(column.missing_percentage).min(PLOT_HEIGHT - available);

        let available_top = baseline - available;
        fill_segment(&mut img, x, available_top, BAR_WIDTH, available, palette.available);

        let missing_top = available_top - missing;
        if column.header_present {
            fill_segment(&mut img, x, missing_top, BAR_WIDTH, missing, palette.missing);
        } else {
            fill_segment(&mut img, x, missing_top, BAR_WIDTH, missing, WHITE);
            hatch_segment(&mut img, x, missing_top, BAR_WIDTH, missing);
        }
        outline_segment(&mut img, x, available_top, BAR_WIDTH, available);
        outline_segment(&mut img, x, missing_top, BAR_WIDTH, missing);
    }

    draw_line_segment_mut(&mut img, (left, baseline as f32), (right, baseline as f32), BLACK);
    draw_line_segment_mut(&mut img, (left, TOP as f32), (left, baseline as f32), BLACK);

    let swatch_x = layout.legend_x();
    for (row, (_, swatch)) in style.legend().into_iter().enumerate() {
        let y = Layout::legend_y(row);
        match swatch {
            Swatch::Solid(color) => fill_segment(&mut img, swatch_x, y, SWATCH, SWATCH, color),
            Swatch::Hatched => hatch_segment(&mut img, swatch_x, y, SWATCH, SWATCH),
        }
        outline_segment(&mut img, swatch_x, y, SWATCH, SWATCH);
    }
    img
}

/// SVG document holding every text element of a chart.
pub fn chart_labels_svg(columns: &[ColumnCompleteness], style: ChartStyle) -> String {
    let layout = Layout::new(columns.len());
    let baseline = layout.baseline;
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" font-family="sans-serif">"#,
        w = layout.width,
        h = layout.height,
    );

    svg.push_str(&text_element(
        layout.width / 2,
        TOP / 2 + 6,
        "font-size=\"16\" text-anchor=\"middle\"",
        style.title,
    ));
    svg.push_str(&text_element(
        (LEFT + layout.plot_right) / 2,
        layout.height - 12,
        "font-size=\"12\" text-anchor=\"middle\"",
        "Columns",
    ));
    let y_label_y = TOP + PLOT_HEIGHT / 2;
    svg.push_str(&text_element(
        18,
        y_label_y,
        &format!("font-size=\"12\" text-anchor=\"middle\" transform=\"rotate(-90 18 {y_label_y})\""),
        "Percentage (%)",
    ));
    for step in 0..=GRID_STEPS {
        let y = baseline - PLOT_HEIGHT * step / GRID_STEPS;
        svg.push_str(&text_element(
            LEFT - 6,
            y + 4,
            "font-size=\"10\" text-anchor=\"end\"",
            &(100 * step / GRID_STEPS).to_string(),
        ));
    }

    for (idx, column) in columns.iter().enumerate() {
        let center = Layout::bar_center(idx);
        let label_y = baseline + 14;
        svg.push_str(&text_element(
            center,
            label_y,
            &format!(
                "font-size=\"10\" text-anchor=\"end\" transform=\"rotate(-45 {center} {label_y})\""
            ),
            &column.column,
        ));

        let available = scaled(column.available_percentage);
        let missing = scaled(column.missing_percentage).min(PLOT_HEIGHT - available);
        if column.available_percentage > 0.0 {
            svg.push_str(&bar_value(
                center,
                baseline - available / 2,
                column.available_percentage,
            ));
        }
        if column.missing_percentage > 0.0 && column.header_present {
            svg.push_str(&bar_value(
                center,
                baseline - available - missing / 2,
                column.missing_percentage,
            ));
        }
    }

    let text_x = layout.legend_x() + SWATCH + 8;
    for (row, (label, _)) in style.legend().into_iter().enumerate() {
        svg.push_str(&text_element(
            text_x,
            Layout::legend_y(row) + SWATCH - 2,
            "font-size=\"12\"",
            label,
        ));
    }

    svg.push_str("</svg>");
    svg
}

/// Vertical white percentage label centered in a bar segment.
fn bar_value(x: u32, y: u32, percentage: f64) -> String {
    format!(
        r#"<text x="{x}" y="{y}" dy="0.35em" font-size="8" fill="white" text-anchor="middle" transform="rotate(-90 {x} {y})">{percentage:.1}%</text>"#
    )
}

fn text_element(x: u32, y: u32, attributes: &str, content: &str) -> String {
    format!(
        r#"<text x="{x}" y="{y}" {attributes}>{}</text>"#,
        escape_xml(content)
    )
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// `<title>_<YYYYmmdd_HHMMSS>.png`
pub fn chart_file_name(title: &str, timestamp: DateTime<Local>) -> String {
    format!("{title}_{}.png", timestamp.format("%Y%m%d_%H%M%S"))
}

/// Saves `img` under `dir`, creating the directory when missing.
pub fn save_chart(
    img: &RgbaImage,
    dir: &Path,
    title: &str,
    timestamp: DateTime<Local>,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|source| ReportError::OutputDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(chart_file_name(title, timestamp));
    img.save(&path).map_err(|source| ReportError::ChartWrite {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), "chart saved");
    Ok(path)
}

/// Writes the raw-column chart and, when present, the required-field chart.
pub fn write_completeness_charts(
    report: &RecordCompletenessReport,
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    let renderer = ChartRenderer::with_system_fonts();
    let timestamp = Local::now();
    let mut written = vec![save_chart(
        &renderer.render(&report.column_completeness, ChartStyle::RAW)?,
        dir,
        RAW_CHART_TITLE,
        timestamp,
    )?];
    if let Some(required) = &report.required_column_completeness {
        written.push(save_chart(
            &renderer.render(required, ChartStyle::REQUIRED)?,
            dir,
            REQUIRED_CHART_TITLE,
            timestamp,
        )?);
    }
    Ok(written)
}

fn scaled(percentage: f64) -> u32 {
    let clamped = percentage.clamp(0.0, 100.0);
    (f64::from(PLOT_HEIGHT) * clamped / 100.0).round() as u32
}

fn fill_segment(img: &mut RgbaImage, x: u32, top: u32, width: u32, height: u32, color: Rgba<u8>) {
    if width == 0 || height == 0 {
        return;
    }
    draw_filled_rect_mut(
        img,
        Rect::at(x as i32, top as i32).of_size(width, height),
        color,
    );
}

fn outline_segment(img: &mut RgbaImage, x: u32, top: u32, width: u32, height: u32) {
    if width == 0 || height == 0 {
        return;
    }
    draw_hollow_rect_mut(
        img,
        Rect::at(x as i32, top as i32).of_size(width, height),
        BLACK,
    );
}

/// `//` hatching inside the segment.
fn hatch_segment(img: &mut RgbaImage, x: u32, top: u32, width: u32, height: u32) {
    for py in top..top + height {
        for px in x..x + width {
            if (px + py) % HATCH_SPACING == 0 {
                img.put_pixel(px, py, BLACK);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn column(name: &str, available: f64, header_present: bool) -> ColumnCompleteness {
        ColumnCompleteness {
            column: name.to_string(),
            missing_count: 0,
            available_percentage: available,
            missing_percentage: 100.0 - available,
            header_present,
        }
    }

    #[test]
    fn file_name_uses_timestamp() {
        let ts = Local.with_ymd_and_hms(2025, 3, 7, 9, 5, 1).unwrap();
        assert_eq!(
            chart_file_name(REQUIRED_CHART_TITLE, ts),
            "Required Field Completeness Summary_20250307_090501.png"
        );
    }

    #[test]
    fn bars_are_stacked_with_palette_colors() {
        let img = render_bar_chart(&[column("Age", 75.0, true)], ChartStyle::RAW);
        assert_eq!(img.width(), LEFT + BAR_WIDTH + BAR_GAP + RIGHT);
        assert_eq!(img.height(), TOP + PLOT_HEIGHT + BOTTOM);

        let x = Layout::bar_center(0);
        let baseline = TOP + PLOT_HEIGHT;
        // 75 % of the plot is available, the top quarter missing
        assert_eq!(*img.get_pixel(x, baseline - 10), Palette::RAW.available);
        assert_eq!(*img.get_pixel(x, TOP + 10), Palette::RAW.missing);
    }

    #[test]
    fn unmapped_field_is_white_and_hatched() {
        let img = render_bar_chart(&[column("Sex", 0.0, false)], ChartStyle::REQUIRED);
        let x0 = Layout::bar_x(0);
        let mut white = 0;
        let mut black = 0;
        for py in TOP + 2..TOP + PLOT_HEIGHT - 2 {
            for px in x0 + 2..x0 + BAR_WIDTH - 2 {
                let pixel = *img.get_pixel(px, py);
                if pixel == WHITE {
                    white += 1;
                } else if pixel == BLACK {
                    black += 1;
                } else {
                    panic!("unexpected color {pixel:?}");
                }
            }
        }
        assert!(white > 0);
        assert!(black > 0);
    }

    #[test]
    fn legend_swatches_follow_style() {
        let img = render_bar_chart(&[column("Age", 50.0, true)], ChartStyle::REQUIRED);
        let layout = Layout::new(1);
        let x = layout.legend_x() + SWATCH / 2;
        assert_eq!(
            *img.get_pixel(x, Layout::legend_y(0) + SWATCH / 2),
            Palette::REQUIRED.available
        );
        assert_eq!(
            *img.get_pixel(x, Layout::legend_y(1) + SWATCH / 2),
            Palette::REQUIRED.missing
        );
    }

    #[test]
    fn labels_cover_title_axes_columns_and_legend() {
        let columns = [column("Age", 75.0, true), column("Sex", 0.0, false)];
        let svg = chart_labels_svg(&columns, ChartStyle::REQUIRED);

        assert!(svg.contains(REQUIRED_CHART_TITLE));
        assert!(svg.contains(">Columns<"));
        assert!(svg.contains(">Percentage (%)<"));
        assert!(svg.contains(">Age<"));
        assert!(svg.contains(">Sex<"));
        assert!(svg.contains(">75.0%<"));
        assert!(svg.contains(">25.0%<"));
        assert!(svg.contains(">Header Missing<"));
        // the hatched bar carries no percentage
        assert!(!svg.contains(">100.0%<"));
    }

    #[test]
    fn raw_chart_legend_has_no_header_entry() {
        let svg = chart_labels_svg(&[column("Age", 100.0, true)], ChartStyle::RAW);
        assert!(svg.contains(">Available (%)<"));
        assert!(svg.contains(">Unavailable (%)<"));
        assert!(!svg.contains("Header Missing"));
    }

    #[test]
    fn column_names_are_escaped() {
        let svg = chart_labels_svg(&[column("Height <cm> & \"Weight\"", 50.0, true)], ChartStyle::RAW);
        assert!(svg.contains("Height &lt;cm&gt; &amp; &quot;Weight&quot;"));
        assert!(Tree::from_str(&svg, &Options::default()).is_ok());
    }

    #[test]
    fn rendered_chart_keeps_bar_layer_size() {
        let columns = [column("Age", 75.0, true)];
        let img = ChartRenderer::with_system_fonts()
            .render(&columns, ChartStyle::RAW)
            .unwrap();
        let layout = Layout::new(1);
        assert_eq!((img.width(), img.height()), (layout.width, layout.height));
    }

    #[test]
    fn empty_chart_still_renders() {
        let img = render_bar_chart(&[], ChartStyle::RAW);
        assert_eq!(img.width(), LEFT + RIGHT);
        let svg = chart_labels_svg(&[], ChartStyle::RAW);
        assert!(Tree::from_str(&svg, &Options::default()).is_ok());
    }
}
