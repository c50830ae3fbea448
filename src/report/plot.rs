use std::fmt;
use std::io::Cursor;
use std::ops::Range;
use std::path::PathBuf;

use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;

use crate::color::RelevanceColors;
use crate::config::ReportConfig;
use crate::data::model::{AnalyzedProtein, ProteinTable};
use crate::error::{PipelineError, Result};

// ---------------------------------------------------------------------------
// Plot kinds and image formats
// ---------------------------------------------------------------------------

/// The three comparison charts. The file stem of each is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlotKind {
    /// Liquid intensity vs. dried intensity.
    IntensityVariation,
    /// Abundance (log2 fold change) vs. average intensity.
    AbundanceIntensity,
    /// Abundance vs. replicate variation.
    AbundanceVariation,
}

impl PlotKind {
    pub const ALL: [PlotKind; 3] = [
        PlotKind::IntensityVariation,
        PlotKind::AbundanceIntensity,
        PlotKind::AbundanceVariation,
    ];

    pub fn file_stem(self) -> &'static str {
        match self {
            PlotKind::IntensityVariation => "intensity_variation",
            PlotKind::AbundanceIntensity => "abundance_intensity",
            PlotKind::AbundanceVariation => "abundance_variation",
        }
    }

    fn title(self) -> &'static str {
        match self {
            PlotKind::IntensityVariation => "Liquid vs. dried intensity",
            PlotKind::AbundanceIntensity => "Abundance vs. intensity",
            PlotKind::AbundanceVariation => "Abundance vs. variation",
        }
    }

    fn x_desc(self) -> &'static str {
        match self {
            PlotKind::IntensityVariation => "log10(dried mean intensity + 1)",
            PlotKind::AbundanceIntensity => "log10(average intensity + 1)",
            PlotKind::AbundanceVariation => "max replicate CV",
        }
    }

    fn y_desc(self) -> &'static str {
        match self {
            PlotKind::IntensityVariation => "log10(liquid mean intensity + 1)",
            PlotKind::AbundanceIntensity | PlotKind::AbundanceVariation => {
                "log2 fold change (liquid / dried)"
            }
        }
    }

    /// Coordinates of one protein on this chart, if it can be placed.
    pub fn point(self, protein: &AnalyzedProtein) -> Option<(f64, f64)> {
        let stats = &protein.stats;
        match self {
            PlotKind::IntensityVariation => Some((
                log10_intensity(stats.dried.mean),
                log10_intensity(stats.liquid.mean),
            )),
            PlotKind::AbundanceIntensity => stats
                .abundance
                .map(|fc| (log10_intensity(stats.average_intensity), fc)),
            PlotKind::AbundanceVariation => stats.abundance.map(|fc| (stats.max_cv(), fc)),
        }
    }
}

impl fmt::Display for PlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

/// Image encoding of written charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ImageFormat {
    Svg,
    Png,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Svg => "svg",
            ImageFormat::Png => "png",
        }
    }
}

/// Negative intensities are clamped to zero before taking the log.
fn log10_intensity(value: f64) -> f64 {
    (value.max(0.0) + 1.0).log10()
}

// ---------------------------------------------------------------------------
// Data extraction
// ---------------------------------------------------------------------------

/// A placed point and the class it is coloured by.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotPoint {
    pub x: f64,
    pub y: f64,
    pub clinically_relevant: bool,
}

/// All placeable, finite points of a chart, in table order.
pub fn plot_points(kind: PlotKind, table: &ProteinTable) -> Vec<PlotPoint> {
    table
        .iter()
        .filter_map(|p| {
            let (x, y) = kind.point(p)?;
            (x.is_finite() && y.is_finite()).then_some(PlotPoint {
                x,
                y,
                clinically_relevant: p.clinically_relevant,
            })
        })
        .collect()
}

/// Padded axis range covering `values`; `0..1` when there is nothing to show.
fn axis_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    if (max - min).abs() < f64::EPSILON {
        return (min - 1.0)..(max + 1.0);
    }
    let pad = (max - min) * 0.05;
    (min - pad)..(max + pad)
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Whether bitmap output can rasterize text. Without a TrueType font
/// backend plotters cannot draw glyphs into a pixel buffer.
const BITMAP_TEXT: bool = cfg!(feature = "ttf");

/// Draw one chart onto any plotters drawing area.
///
/// With `with_text` off, the caption, tick labels and legend are skipped.
/// An empty table still produces a chart with axes.
pub fn draw_plot<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    kind: PlotKind,
    table: &ProteinTable,
    colors: &RelevanceColors,
    with_text: bool,
) -> Result<()> {
    let fail = |e: DrawingAreaErrorKind<DB::ErrorType>| PipelineError::Plot {
        kind,
        reason: e.to_string(),
    };

    let points = plot_points(kind, table);
    let x_range = axis_range(points.iter().map(|p| p.x));
    let y_range = axis_range(points.iter().map(|p| p.y));

    area.fill(&WHITE).map_err(fail)?;

    let mut builder = ChartBuilder::on(area);
    builder.margin(20).x_label_area_size(60).y_label_area_size(80);
    if with_text {
        builder.caption(kind.title(), ("sans-serif", 32));
    }
    let mut chart = builder
        .build_cartesian_2d(x_range.clone(), y_range.clone())
        .map_err(fail)?;

    let mut mesh = chart.configure_mesh();
    if with_text {
        mesh.x_desc(kind.x_desc())
            .y_desc(kind.y_desc())
            .label_style(("sans-serif", 18));
    } else {
        mesh.x_labels(0).y_labels(0);
    }
    mesh.draw().map_err(fail)?;

    // Reference line: y = x for the intensity chart, y = 0 for the others.
    let guide: Vec<(f64, f64)> = match kind {
        PlotKind::IntensityVariation => {
            let lo = x_range.start.max(y_range.start);
            let hi = x_range.end.min(y_range.end);
            if lo < hi {
                vec![(lo, lo), (hi, hi)]
            } else {
                Vec::new()
            }
        }
        _ if y_range.start < 0.0 && y_range.end > 0.0 => {
            vec![(x_range.start, 0.0), (x_range.end, 0.0)]
        }
        _ => Vec::new(),
    };
    if !guide.is_empty() {
        chart
            .draw_series(LineSeries::new(guide, BLACK.mix(0.4)))
            .map_err(fail)?;
    }

    for (relevant, label, color) in colors.legend_entries() {
        chart
            .draw_series(
                points
                    .iter()
                    .filter(|p| p.clinically_relevant == relevant)
                    .map(|p| Circle::new((p.x, p.y), 3, color.mix(0.8).filled())),
            )
            .map_err(fail)?
            .label(label)
            .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
    }

    if with_text {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(fail)?;
    }

    area.present().map_err(fail)?;
    Ok(())
}

/// Render a chart to an SVG document.
pub fn render_svg(kind: PlotKind, table: &ProteinTable, size: (u32, u32)) -> Result<String> {
    let mut svg = String::new();
    {
        let area = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        draw_plot(&area, kind, table, &RelevanceColors::default(), true)?;
    }
    Ok(svg)
}

/// Render a chart to PNG bytes.
pub fn render_png(kind: PlotKind, table: &ProteinTable, size: (u32, u32)) -> Result<Vec<u8>> {
    let (width, height) = size;
    let mut pixels = vec![0u8; width as usize * height as usize * 3];
    {
        let area = BitMapBackend::with_buffer(&mut pixels, size).into_drawing_area();
        draw_plot(&area, kind, table, &RelevanceColors::default(), BITMAP_TEXT)?;
    }

    let image = image::RgbImage::from_raw(width, height, pixels).ok_or_else(|| {
        PipelineError::Plot {
            kind,
            reason: "pixel buffer does not match image size".into(),
        }
    })?;
    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| PipelineError::Plot {
            kind,
            reason: e.to_string(),
        })?;
    Ok(png)
}

/// Render a chart in the configured format and write it to the output
/// directory. Returns the written path.
pub fn write_plot(kind: PlotKind, table: &ProteinTable, config: &ReportConfig) -> Result<PathBuf> {
    let size = (config.width, config.height);
    let bytes = match config.format {
        ImageFormat::Svg => render_svg(kind, table, size)?.into_bytes(),
        ImageFormat::Png => render_png(kind, table, size)?,
    };

    let path = config.artifact_path(kind.file_stem(), config.format.extension());
    super::write_atomic(&path, |out| {
        use std::io::Write;
        out.write_all(&bytes).map_err(|e| PipelineError::io(&path, e))
    })?;
    log::info!("Wrote {kind} plot to {}", path.display());
    Ok(path)
}
