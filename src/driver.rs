//! The driver loop: run the generator, read its histogram, plot it, and
//! do it all again.

use crate::error::{Error, Result};
use crate::figure::{Figure, FigureStyle};
use crate::generator::{ExternalProgram, Generator, Request, OUTPUT_FILE};
use crate::histogram::Histogram;
use crate::seed::SeedClock;

use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

/// The parameters of a batch of runs.  The defaults are the only values
/// the `histogram-scope` binary ever uses.
#[derive(Debug, Clone)]
pub struct DriverParams {
    /// How many times to run the generator.
    pub iterations: usize,
    /// How many samples the generator should draw each time.
    pub sample_count: u64,
    /// The generator program.
    pub program: PathBuf,
    /// Where the images go.  Each run's scratch directory is created
    /// here too.
    pub output_dir: PathBuf,
    /// Images are named `<prefix>NNN.png`.
    pub image_prefix: String,
    /// How each plot looks.
    pub figure: FigureStyle,
}

impl Default for DriverParams {
    fn default() -> Self {
        DriverParams {
            iterations: 20,
            sample_count: 500_000,
            program: PathBuf::from("./test_histogram.exe"),
            output_dir: PathBuf::from("."),
            image_prefix: "histogram".to_string(),
            figure: FigureStyle::default(),
        }
    }
}

/// The name of the image for run `iteration`.
pub fn image_name(prefix: &str, iteration: usize) -> String {
    format!("{}{:03}.png", prefix, iteration)
}

/// What happened in one successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    /// Which run this was, counting from zero.
    pub iteration: usize,
    /// The seed the generator was given.
    pub seed: u64,
    /// The number of samples it was asked for.
    pub sample_count: u64,
    /// Its exit code.
    pub code: Option<i32>,
    /// What it printed.
    pub stdout: String,
    /// How many bins its histogram had.
    pub bins: usize,
    /// How many of them were within the axes.
    pub plotted: usize,
    /// The image we saved.
    pub image: PathBuf,
}

/// Runs a generator over and over, plotting each result.
pub struct Driver<G> {
    params: DriverParams,
    generator: G,
    seeds: SeedClock,
    figure: Figure,
}

impl Driver<ExternalProgram> {
    /// A driver for the external program named in `params`.
    pub fn from_params(params: DriverParams) -> Result<Self> {
        let generator = ExternalProgram::new(&params.program)?;
        Ok(Driver::new(params, generator))
    }
}

impl<G: Generator> Driver<G> {
    /// A driver for an arbitrary generator.
    pub fn new(params: DriverParams, generator: G) -> Self {
        let figure = Figure::new(params.figure);
        Driver {
            params,
            generator,
            seeds: SeedClock::new(),
            figure,
        }
    }

    /// The parameters we run with.
    pub fn params(&self) -> &DriverParams {
        &self.params
    }

    /// The generator we drive.
    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Run every iteration in turn, echoing the generator's output to
    /// `echo`.  The first failure stops the batch; images from earlier
    /// runs are left where they are.
    pub fn run<W: Write>(&mut self, mut echo: W) -> Result<Vec<Run>> {
        let mut runs = Vec::with_capacity(self.params.iterations);
        for iteration in 0..self.params.iterations {
            runs.push(self.run_once(iteration, &mut echo)?);
        }
        Ok(runs)
    }

    /// Do a single run.
    pub fn run_once<W: Write>(&mut self, iteration: usize, echo: &mut W) -> Result<Run> {
        let start = Instant::now();
        let request = Request {
            iteration,
            sample_count: self.params.sample_count,
            seed: self.seeds.next_seed(),
        };

        // The generator always writes the same file name, so each run
        // gets a directory to itself, which goes away once we have read
        // the histogram.
        let scratch = tempfile::Builder::new()
            .prefix(".histogram-run")
            .tempdir_in(&self.params.output_dir)
            .map_err(|e| Error::io(&self.params.output_dir, e))?;

        let invocation = self.generator.generate(&request, scratch.path())?;
        if !invocation.success() {
            tracing::warn!(iteration, seed = request.seed, code = ?invocation.code,
                           stdout = %invocation.stdout, "generator failed");
            return Err(Error::Invocation {
                program: self.generator.name(),
                iteration,
                seed: request.seed,
                code: invocation.code,
            });
        }

        writeln!(echo, "{}", invocation.stdout)
            .and_then(|_| echo.flush())
            .map_err(|e| Error::io("<stdout>", e))?;

        let histogram = Histogram::load(scratch.path().join(OUTPUT_FILE))?;
        let scratch_path = scratch.path().to_path_buf();
        scratch.close().map_err(|e| Error::io(scratch_path, e))?;

        let image = self.params.output_dir.join(image_name(&self.params.image_prefix, iteration));
        let plotted = self.figure.plot(&histogram, &image)?;

        tracing::info!(iteration, seed = request.seed, bins = histogram.len(),
                       total = histogram.total_count(), plotted,
                       image = ?image, "run complete");
        if let Some((value, count)) = histogram.peak() {
            tracing::debug!(iteration, value, count, "histogram peak");
        }
        tracing::debug!(iteration, elapsed = ?start.elapsed(), "run timing");

        Ok(Run {
            iteration,
            seed: request.seed,
            sample_count: request.sample_count,
            code: invocation.code,
            stdout: invocation.stdout,
            bins: histogram.len(),
            plotted,
            image,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let p = DriverParams::default();
        assert_eq!(p.iterations, 20);
        assert_eq!(p.sample_count, 500000);
        assert_eq!(p.program, PathBuf::from("./test_histogram.exe"));
        assert_eq!(p.figure.x_range, (-5.0, 5.0));
        assert_eq!(p.figure.y_range, (0.0, 4400.0));
        assert_eq!(p.figure.dpi, 150);
    }

    #[test]
    fn image_names_are_zero_padded() {
        assert_eq!(image_name("histogram", 0), "histogram000.png");
        assert_eq!(image_name("histogram", 7), "histogram007.png");
        assert_eq!(image_name("histogram", 19), "histogram019.png");
        assert_eq!(image_name("histogram", 1234), "histogram1234.png");
    }
}
