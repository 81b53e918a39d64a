use std::{
    fs,
    ops::Range,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context, Result};
use image::{codecs::png::PngEncoder, ColorType, ImageEncoder};
use plotters::prelude::*;
use tracing::info;

/// Largest accepted canvas side, in pixels.
pub const MAX_DIMENSION: u32 = 16_384;

/// Byte length of an RGB8 buffer for a `width` x `height` canvas.
pub fn rgb_buffer_len(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        bail!(
            "chart size must be between 1 and {} pixels per side, got {}x{}",
            MAX_DIMENSION,
            width,
            height
        );
    }
    Ok(width as usize * height as usize * 3)
}

/// Named colors used for chart series.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SeriesColor {
    Red,
    Green,
    Blue,
    Cyan,
    Magenta,
    Yellow,
    LightSalmon,
    LightGreen,
    Purple,
}

impl SeriesColor {
    pub fn rgb(&self) -> RGBColor {
        match self {
            Self::Red => RGBColor(255, 0, 0),
            Self::Green => RGBColor(0, 128, 0),
            Self::Blue => RGBColor(0, 0, 255),
            Self::Cyan => RGBColor(0, 255, 255),
            Self::Magenta => RGBColor(255, 0, 255),
            Self::Yellow => RGBColor(255, 255, 0),
            Self::LightSalmon => RGBColor(255, 160, 122),
            Self::LightGreen => RGBColor(144, 238, 144),
            Self::Purple => RGBColor(128, 0, 128),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    pub label: String,
    pub color: SeriesColor,
    pub points: Vec<(f64, f64)>,
    /// Trials averaged into each point.
    pub samples: Vec<usize>,
}

/// A fully resolved figure, ready to draw.
#[derive(Clone, Debug, PartialEq)]
pub struct Chart {
    pub file_stem: String,
    pub x_label: String,
    pub y_label: String,
    pub legend_title: Option<String>,
    pub series: Vec<Series>,
}

impl Chart {
    pub fn shows_legend(&self) -> bool {
        self.series.len() > 1
    }

    /// x spans the data; y starts at zero.
    pub fn axis_bounds(&self) -> (Range<f64>, Range<f64>) {
        let points = || self.series.iter().flat_map(|s| s.points.iter().copied());

        let (x_min, x_max) = points()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (x, _)| {
                (lo.min(x), hi.max(x))
            });
        let y_max = points()
            .map(|(_, y)| y)
            .filter(|y| y.is_finite())
            .fold(0.0f64, f64::max);

        let x_range = if !x_min.is_finite() || !x_max.is_finite() {
            0.0..1.0
        } else if x_min == x_max {
            x_min - 1.0..x_max + 1.0
        } else {
            let pad = (x_max - x_min) * 0.05;
            x_min - pad..x_max + pad
        };
        let y_range = if y_max > 0.0 { 0.0..y_max * 1.05 } else { 0.0..1.0 };

        (x_range, y_range)
    }
}

/// Draws charts into a reusable RGB canvas and saves them as PNG files.
pub struct Renderer {
    output_dir: PathBuf,
    width: u32,
    height: u32,
    canvas: Vec<u8>,
}

impl Renderer {
    pub fn new(output_dir: impl Into<PathBuf>, width: u32, height: u32) -> Result<Self> {
        let len = rgb_buffer_len(width, height)?;
        Ok(Self {
            output_dir: output_dir.into(),
            width,
            height,
            canvas: vec![u8::MAX; len],
        })
    }

    pub fn canvas(&self) -> &[u8] {
        &self.canvas
    }

    pub fn output_path(&self, chart: &Chart) -> PathBuf {
        self.output_dir.join(format!("{}.png", chart.file_stem))
    }

    /// Draw `chart`, write it to `<output_dir>/<stem>.png` and reset the canvas.
    pub fn render(&mut self, chart: &Chart) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("failed to create plots directory {}", self.output_dir.display())
        })?;
        let path = self.output_path(chart);

        let result = self
            .draw(chart)
            .with_context(|| format!("failed to draw chart {}", chart.file_stem))
            .and_then(|()| write_png(&path, self.width, self.height, &self.canvas));
        self.clear();
        result?;

        info!(chart = %chart.file_stem, path = %path.display(), "wrote chart");
        Ok(path)
    }

    pub fn clear(&mut self) {
        self.canvas.fill(u8::MAX);
    }

    fn draw(&mut self, chart: &Chart) -> Result<()> {
        let (x_range, y_range) = chart.axis_bounds();
        let root = BitMapBackend::with_buffer(&mut self.canvas, (self.width, self.height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(|e| anyhow!("{e}"))?;

        let mut plot = ChartBuilder::on(&root)
            .margin(20)
            .x_label_area_size(45)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, y_range)
            .map_err(|e| anyhow!("{e}"))?;

        plot.configure_mesh()
            .x_desc(chart.x_label.as_str())
            .y_desc(chart.y_label.as_str())
            .draw()
            .map_err(|e| anyhow!("{e}"))?;

        if chart.shows_legend() {
            if let Some(title) = &chart.legend_title {
                // label-only entry heads the legend box
                plot.draw_series(std::iter::empty::<PathElement<(f64, f64)>>())
                    .map_err(|e| anyhow!("{e}"))?
                    .label(title.as_str());
            }
        }

        for series in &chart.series {
            let color = series.color.rgb();
            plot.draw_series(LineSeries::new(
                series.points.iter().copied(),
                color.stroke_width(2),
            ))
            .map_err(|e| anyhow!("{e}"))?
            .label(series.label.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });

            plot.draw_series(
                series
                    .points
                    .iter()
                    .map(|&point| Cross::new(point, 4, color.stroke_width(2))),
            )
            .map_err(|e| anyhow!("{e}"))?;
        }

        if chart.shows_legend() {
            plot.configure_series_labels()
                .position(SeriesLabelPosition::UpperLeft)
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()
                .map_err(|e| anyhow!("{e}"))?;
        }

        root.present().map_err(|e| anyhow!("{e}"))?;
        Ok(())
    }
}

/// Encode an RGB8 buffer as PNG and write it to `path`.
pub fn write_png(path: &Path, width: u32, height: u32, pixels: &[u8]) -> Result<()> {
    let expected_len = rgb_buffer_len(width, height)?;
    if pixels.len() != expected_len {
        bail!(
            "pixel buffer length {} does not match RGB image size {}x{}",
            pixels.len(),
            width,
            height
        );
    }

    let mut buffer = Vec::new();
    let encoder = PngEncoder::new(&mut buffer);
    encoder
        .write_image(pixels, width, height, ColorType::Rgb8)
        .context("failed to encode PNG data")?;

    fs::write(path, buffer).with_context(|| format!("failed to write {}", path.display()))
}
