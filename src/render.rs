//! Chart rendering: the `Renderer` seam plus an SVG line-chart renderer.
//!
//! The renderer receives a finished [`ChartRequest`] and produces exactly one
//! artifact at a well-known path, which the transport attaches to its reply.
//! Each render overwrites the previous artifact.

use std::path::{Path, PathBuf};

use crate::config::ChartConfig;
use crate::error::{RenderError, RenderResult};

// Palette (dark chat-client background).
const BACKGROUND: &str = "#36393f";
const FOREGROUND: &str = "#ffffff";
const GRID: &str = "#4f545c";
const LINE: &str = "#e24a33";
const MARKER: &str = "#bbbbbb";

const MARGIN_LEFT: f64 = 170.0;
const MARGIN_RIGHT: f64 = 120.0;
const MARGIN_TOP: f64 = 110.0;
const MARGIN_BOTTOM: f64 = 150.0;
const Y_TICKS: usize = 5;

/// Everything a renderer needs to draw one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRequest {
    pub values: Vec<f64>,
    pub min_year: i32,
    pub max_year: i32,
    pub search_term: String,
    pub start_year: i32,
    pub end_year: i32,
    /// X-axis tick spacing in years.
    pub step: i32,
}

/// A rendered chart on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartArtifact {
    pub path: PathBuf,
    pub media_type: &'static str,
}

/// Turns a chart request into an artifact.
pub trait Renderer: Send + Sync {
    fn render(&self, request: &ChartRequest) -> RenderResult<ChartArtifact>;
}

/// Writes an SVG line chart to `<output_dir>/<file_stem>.svg`.
#[derive(Debug, Clone)]
pub struct SvgRenderer {
    output_dir: PathBuf,
    file_stem: String,
    width: f64,
    height: f64,
}

impl SvgRenderer {
    pub fn new(output_dir: impl Into<PathBuf>, config: &ChartConfig) -> Self {
        Self {
            output_dir: output_dir.into(),
            file_stem: config.file_stem.clone(),
            width: f64::from(config.width),
            height: f64::from(config.height),
        }
    }

    /// Where the artifact is written.
    pub fn artifact_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.svg", self.file_stem))
    }

    /// Build the SVG document for `request`.
    pub fn to_svg(&self, request: &ChartRequest) -> RenderResult<String> {
        if request.values.is_empty() {
            return Err(RenderError::Empty {
                message: "series has no values".into(),
            });
        }

        let plot_w = self.width - MARGIN_LEFT - MARGIN_RIGHT;
        let plot_h = self.height - MARGIN_TOP - MARGIN_BOTTOM;
        // Years span at least one unit so a single-year chart still has width.
        let last_year = request
            .end_year
            .max(request.start_year + request.values.len() as i32 - 1)
            .max(request.start_year + 1);
        let year_span = f64::from(last_year - request.start_year);
        let peak = request
            .values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(1.0_f64, f64::max);

        let x_of = |year: f64| MARGIN_LEFT + (year - f64::from(request.start_year)) / year_span * plot_w;
        let y_of = |value: f64| MARGIN_TOP + plot_h - value / peak * plot_h;

        let mut lines: Vec<String> = Vec::new();
        lines.push(format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="monospace">"#,
            w = self.width,
            h = self.height,
        ));
        lines.push(format!(
            r#"<rect width="100%" height="100%" fill="{BACKGROUND}"/>"#
        ));
        lines.push(format!(
            r#"<text x="{}" y="{}" font-size="35" font-weight="bold" fill="{FOREGROUND}" text-anchor="middle">"{}"</text>"#,
            self.width / 2.0,
            MARGIN_TOP / 2.0 + 10.0,
            escape_xml(&request.search_term),
        ));

        // X ticks. The end year itself is not labelled.
        let step = request.step.max(1);
        let mut year = request.start_year;
        while year < request.end_year.max(request.start_year + 1) {
            let x = x_of(f64::from(year));
            lines.push(format!(
                r#"<line x1="{x:.1}" y1="{MARGIN_TOP}" x2="{x:.1}" y2="{:.1}" stroke="{GRID}"/>"#,
                MARGIN_TOP + plot_h,
            ));
            lines.push(format!(
                r#"<text x="{x:.1}" y="{:.1}" font-size="30" fill="{FOREGROUND}" text-anchor="middle">{year}</text>"#,
                MARGIN_TOP + plot_h + 40.0,
            ));
            year += step;
        }

        // Y ticks.
        for i in 0..=Y_TICKS {
            let value = peak * i as f64 / Y_TICKS as f64;
            let y = y_of(value);
            lines.push(format!(
                r#"<line x1="{MARGIN_LEFT}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="{GRID}"/>"#,
                MARGIN_LEFT + plot_w,
            ));
            lines.push(format!(
                r#"<text x="{:.1}" y="{:.1}" font-size="30" fill="{FOREGROUND}" text-anchor="end">{}</text>"#,
                MARGIN_LEFT - 15.0,
                y + 10.0,
                format_value(value),
            ));
        }

        lines.push(format!(
            r#"<text x="{:.1}" y="{:.1}" font-size="33" font-style="italic" fill="{FOREGROUND}" text-anchor="middle">year</text>"#,
            MARGIN_LEFT + plot_w / 2.0,
            self.height - 30.0,
        ));
        lines.push(format!(
            r#"<text transform="translate(40 {:.1}) rotate(-90)" font-size="30" font-style="italic" fill="{FOREGROUND}" text-anchor="middle">frequency</text>"#,
            MARGIN_TOP + plot_h / 2.0,
        ));

        for marker_year in [request.max_year, request.min_year] {
            let x = x_of(f64::from(marker_year));
            lines.push(format!(
                r#"<line x1="{x:.1}" y1="{MARGIN_TOP}" x2="{x:.1}" y2="{:.1}" stroke="{MARKER}" stroke-dasharray="12 8" stroke-width="2"/>"#,
                MARGIN_TOP + plot_h,
            ));
        }

        let points: Vec<String> = request
            .values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .map(|(i, &v)| {
                format!(
                    "{:.1},{:.1}",
                    x_of(f64::from(request.start_year) + i as f64),
                    y_of(v)
                )
            })
            .collect();
        lines.push(format!(
            r#"<polyline fill="none" stroke="{LINE}" stroke-width="3" points="{}"/>"#,
            points.join(" "),
        ));
        lines.push("</svg>\n".to_string());
        Ok(lines.join("\n"))
    }
}

impl Renderer for SvgRenderer {
    fn render(&self, request: &ChartRequest) -> RenderResult<ChartArtifact> {
        let svg = self.to_svg(request)?;
        let path = self.artifact_path();
        write_artifact(&path, &svg)?;
        tracing::debug!(path = %path.display(), term = %request.search_term, "chart written");
        Ok(ChartArtifact {
            path,
            media_type: "image/svg+xml",
        })
    }
}

fn write_artifact(path: &Path, content: &str) -> RenderResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| RenderError::Write {
            path: parent.display().to_string(),
            source: e,
        })?;
    }
    std::fs::write(path, content).map_err(|e| RenderError::Write {
        path: path.display().to_string(),
        source: e,
    })
}

/// Axis label: integers plainly, otherwise one decimal.
fn format_value(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{}", value.round() as i64)
    } else {
        format!("{value:.1}")
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
