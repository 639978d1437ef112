#[macro_use]
extern crate difference;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use hscope::driver::{image_name, Driver, DriverParams};
use hscope::generator::{Generator, Invocation, Request, OUTPUT_FILE};
use hscope::histogram::Histogram;
use hscope::{Error, Result};

/// A stand-in for the external generator, which writes the same histogram
/// every time and remembers how it was called.
struct Mock {
    fixture: Vec<u8>,
    /// Fail at this iteration, with this exit code.
    fail_on: Option<(usize, Option<i32>)>,
    calls: Vec<[String; 2]>,
}

impl Mock {
    fn new(histogram: &Histogram) -> Mock {
        let mut fixture = Vec::new();
        histogram.write_to(&mut fixture).unwrap();
        Mock { fixture, fail_on: None, calls: Vec::new() }
    }
    fn failing_on(mut self, iteration: usize) -> Mock {
        self.fail_on = Some((iteration, Some(1)));
        self
    }
    fn killed_on(mut self, iteration: usize) -> Mock {
        self.fail_on = Some((iteration, None));
        self
    }
    fn truncated(mut self) -> Mock {
        let n = self.fixture.len() - 3;
        self.fixture.truncate(n);
        self
    }
}

impl Generator for Mock {
    fn generate(&mut self, request: &Request, workdir: &Path) -> Result<Invocation> {
        self.calls.push(request.args());
        if let Some((iteration, code)) = self.fail_on {
            if iteration == request.iteration {
                return Ok(Invocation { code, stdout: "ERROR.\n".to_string() });
            }
        }
        fs::write(workdir.join(OUTPUT_FILE), &self.fixture)
            .map_err(|e| Error::io(workdir, e))?;
        Ok(Invocation {
            code: Some(0),
            stdout: format!("Created {} normally distributed pseudo-random numbers...\n",
                            request.sample_count),
        })
    }
    fn name(&self) -> PathBuf {
        PathBuf::from("mock")
    }
}

fn fixture() -> Histogram {
    Histogram::new(vec![-1.0, 0.0, 2.5], vec![10, 20, 30])
}

fn params(dir: &Path, iterations: usize) -> DriverParams {
    DriverParams {
        iterations,
        sample_count: 1000,
        output_dir: dir.to_path_buf(),
        ..DriverParams::default()
    }
}

fn dir_contents(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn three_runs_make_three_images() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = Driver::new(params(dir.path(), 3), Mock::new(&fixture()));
    let mut echoed = Vec::new();
    let runs = driver.run(&mut echoed).unwrap();

    assert_eq!(runs.len(), 3);
    for (i, run) in runs.iter().enumerate() {
        assert_eq!(run.iteration, i);
        assert_eq!(run.bins, 3);
        assert_eq!(run.plotted, 3);
        assert_eq!(run.code, Some(0));
        assert_eq!(run.image, dir.path().join(image_name("histogram", i)));
    }
    // The scratch directories are gone, leaving only the images.
    assert_eq!(dir_contents(dir.path()),
               vec!["histogram000.png", "histogram001.png", "histogram002.png"]);

    let calls = &driver.generator().calls;
    assert_eq!(calls.len(), 3);
    assert!(calls.iter().all(|c| c[0] == "1000"));
    let seeds: HashSet<&String> = calls.iter().map(|c| &c[1]).collect();
    assert_eq!(seeds.len(), 3);
    for (run, call) in runs.iter().zip(calls.iter()) {
        assert_eq!(run.seed.to_string(), call[1]);
    }

    let expected = "Created 1000 normally distributed pseudo-random numbers...\n\n".repeat(3);
    assert_diff!(&expected, &String::from_utf8(echoed).unwrap(), "\n", 0);
}

#[test]
fn identical_data_gives_identical_images() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = Driver::new(params(dir.path(), 2), Mock::new(&fixture()));
    driver.run(Vec::new()).unwrap();
    assert_eq!(fs::read(dir.path().join("histogram000.png")).unwrap(),
               fs::read(dir.path().join("histogram001.png")).unwrap());
}

#[test]
fn empty_histograms_are_plotted() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = Driver::new(params(dir.path(), 1), Mock::new(&Histogram::default()));
    let runs = driver.run(Vec::new()).unwrap();
    assert_eq!(runs[0].bins, 0);
    assert_eq!(runs[0].plotted, 0);
    assert!(dir.path().join("histogram000.png").exists());
}

#[test]
fn first_failure_stops_everything() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = Driver::new(params(dir.path(), 3), Mock::new(&fixture()).failing_on(0));
    let mut echoed = Vec::new();
    match driver.run(&mut echoed) {
        Err(Error::Invocation { iteration, code, program, .. }) => {
            assert_eq!(iteration, 0);
            assert_eq!(code, Some(1));
            assert_eq!(program, PathBuf::from("mock"));
        }
        other => panic!("expected an invocation error, got {:?}", other),
    }
    assert_eq!(driver.generator().calls.len(), 1);
    assert!(dir_contents(dir.path()).is_empty());
    assert!(echoed.is_empty());
}

#[test]
fn killed_generator_stops_everything() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = Driver::new(params(dir.path(), 3), Mock::new(&fixture()).killed_on(0));
    let mut echoed = Vec::new();
    match driver.run(&mut echoed) {
        Err(e @ Error::Invocation { code: None, .. }) => {
            assert!(e.to_string().contains("killed by a signal"), "unhelpful message: {}", e);
        }
        other => panic!("expected an invocation error without a code, got {:?}", other),
    }
    assert_eq!(driver.generator().calls.len(), 1);
    assert!(dir_contents(dir.path()).is_empty());
    assert!(echoed.is_empty());
}

#[test]
fn later_failure_keeps_earlier_images() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = Driver::new(params(dir.path(), 5), Mock::new(&fixture()).failing_on(2));
    let e = driver.run(Vec::new()).unwrap_err();
    assert!(e.to_string().contains("run 2"), "unhelpful message: {}", e);
    assert_eq!(driver.generator().calls.len(), 3);
    assert_eq!(dir_contents(dir.path()), vec!["histogram000.png", "histogram001.png"]);
}

#[test]
fn truncated_histogram_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = Driver::new(params(dir.path(), 3), Mock::new(&fixture()).truncated());
    match driver.run(Vec::new()) {
        Err(Error::Truncated { nbins, .. }) => assert_eq!(nbins, 3),
        other => panic!("expected a truncation error, got {:?}", other),
    }
    assert_eq!(driver.generator().calls.len(), 1);
    assert!(dir_contents(dir.path()).is_empty());
}
