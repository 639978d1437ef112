//! A reusable plotting surface for histogram scatter plots.
//!
//! One `Figure` owns one RGB pixel buffer.  Each plot clears that buffer
//! and redraws into it, so that nothing from a previous run can show up in
//! the next one, and then encodes it as a PNG.

use crate::atomicfile::AtomicFile;
use crate::error::{Error, Result};
use crate::histogram::Histogram;

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use plotters::prelude::*;
use std::path::Path;

/// How a figure looks.  The defaults are fixed: every run of a batch is
/// drawn on identical axes so the plots can be flipped through like the
/// frames of an oscilloscope trace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigureStyle {
    /// The x axis limits.
    pub x_range: (f64, f64),
    /// The y axis limits.
    pub y_range: (f64, f64),
    /// Spacing of the x axis tick marks.
    pub x_tick: f64,
    /// Spacing of the y axis tick marks.
    pub y_tick: f64,
    /// The figure size in inches, width then height.
    pub size_inches: (f64, f64),
    /// Resolution in dots per inch.
    pub dpi: u32,
    /// Radius of each point marker, in pixels.
    pub marker_radius: u32,
}

impl Default for FigureStyle {
    fn default() -> Self {
        FigureStyle {
            x_range: (-5.0, 5.0),
            y_range: (0.0, 4400.0),
            x_tick: 2.0,
            y_tick: 500.0,
            size_inches: (6.4, 4.8),
            dpi: 150,
            marker_radius: 2,
        }
    }
}

impl FigureStyle {
    /// The image size in pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        let dpi = self.dpi as f64;
        ((self.size_inches.0 * dpi).round() as u32,
         (self.size_inches.1 * dpi).round() as u32)
    }

    /// Is this point within the axis limits?  Points outside them are
    /// not drawn.
    pub fn contains(&self, (x, y): (f64, f64)) -> bool {
        x >= self.x_range.0 && x <= self.x_range.1
            && y >= self.y_range.0 && y <= self.y_range.1
    }
}

/// A figure that is cleared and redrawn for each plot.
pub struct Figure {
    style: FigureStyle,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Figure {
    /// Allocate a figure.
    pub fn new(style: FigureStyle) -> Figure {
        let (width, height) = style.pixel_size();
        Figure {
            style,
            width,
            height,
            pixels: vec![0; 3 * width as usize * height as usize],
        }
    }

    /// The style this figure draws with.
    pub fn style(&self) -> &FigureStyle {
        &self.style
    }

    /// The current contents, as packed RGB rows.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Clear the figure and draw `histogram` on it as (value, count)
    /// points.  Returns how many points landed within the axes.
    pub fn draw(&mut self, histogram: &Histogram) -> Result<usize> {
        let style = self.style;
        let (w, h) = (self.width, self.height);
        let (x0, x1) = style.x_range;
        let (y0, y1) = style.y_range;

        let root = BitMapBackend::with_buffer(&mut self.pixels, (w, h)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_error)?;

        // Leave the same fraction of the figure around the axes that
        // matplotlib does.
        let mut chart = ChartBuilder::on(&root)
            .margin_left((0.125 * w as f64) as i32)
            .margin_right((0.1 * w as f64) as i32)
            .margin_top((0.12 * h as f64) as i32)
            .margin_bottom((0.11 * h as f64) as i32)
            .build_cartesian_2d(x0..x1, y0..y1)
            .map_err(draw_error)?;

        let area = chart.plotting_area();
        area.draw(&Rectangle::new([(x0, y0), (x1, y1)], BLACK.stroke_width(1)))
            .map_err(draw_error)?;
        let x_tick_len = 0.015 * (y1 - y0);
        for x in ticks(x0, x1, style.x_tick) {
            area.draw(&PathElement::new(vec![(x, y0), (x, y0 + x_tick_len)], &BLACK))
                .map_err(draw_error)?;
        }
        let y_tick_len = 0.01 * (x1 - x0);
        for y in ticks(y0, y1, style.y_tick) {
            area.draw(&PathElement::new(vec![(x0, y), (x0 + y_tick_len, y)], &BLACK))
                .map_err(draw_error)?;
        }

        let points: Vec<(f64, f64)> = histogram
            .points()
            .map(|(v, c)| (v, c as f64))
            .filter(|&p| style.contains(p))
            .collect();
        let plotted = points.len();
        let radius = style.marker_radius;
        chart
            .draw_series(points.into_iter().map(|p| Circle::new(p, radius, BLUE.filled())))
            .map_err(draw_error)?;

        root.present().map_err(draw_error)?;
        Ok(plotted)
    }

    /// Write the current contents as a PNG.  The file appears all at
    /// once, or not at all.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut f = AtomicFile::create(path).map_err(|e| Error::io(path, e))?;
        PngEncoder::new(&mut f)
            .write_image(&self.pixels, self.width, self.height, ColorType::Rgb8)
            .map_err(|source| Error::Encode { path: path.to_path_buf(), source })?;
        f.finish().map_err(|e| Error::io(path, e))
    }

    /// Draw `histogram` and save it to `path`.
    pub fn plot<P: AsRef<Path>>(&mut self, histogram: &Histogram, path: P) -> Result<usize> {
        let plotted = self.draw(histogram)?;
        self.save(path)?;
        Ok(plotted)
    }
}

fn draw_error<E: std::fmt::Display>(e: E) -> Error {
    Error::Draw(e.to_string())
}

/// Multiples of `step` within `[lo, hi]`.
fn ticks(lo: f64, hi: f64, step: f64) -> Vec<f64> {
    if !(step > 0.0) || !(hi >= lo) {
        return Vec::new();
    }
    let first = (lo / step).ceil() as i64;
    let last = (hi / step).floor() as i64;
    (first..=last).map(|i| i as f64 * step).collect()
}
