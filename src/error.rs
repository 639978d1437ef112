//! The ways a scope run can fail.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Anything that aborts a batch of runs.  There is no recovery: every one
/// of these is fatal to the whole batch.
#[derive(Debug, Error)]
pub enum Error {
    /// We could not even start the external program.
    #[error("unable to launch {program:?} for run {iteration}: {source}")]
    Spawn {
        /// The program we tried to run.
        program: PathBuf,
        /// Which run this was.
        iteration: usize,
        /// Why the launch failed.
        source: io::Error,
    },
    /// The external program ran, but did not exit successfully.  A `None`
    /// code means it was killed by a signal.
    #[error("error running {program:?} (run {iteration}, seed {seed}): {}", describe_exit(.code))]
    Invocation {
        /// The program that failed.
        program: PathBuf,
        /// Which run this was.
        iteration: usize,
        /// The seed it was given.
        seed: u64,
        /// Its exit code, if it had one.
        code: Option<i32>,
    },
    /// Reading or writing a file went wrong.
    #[error("{path:?}: {source}")]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
    /// The histogram file ended before all declared bins were read.
    #[error("{path:?} is truncated: expected {expected} bytes for {nbins} bins, found {found}")]
    Truncated {
        /// The histogram file.
        path: PathBuf,
        /// The bin count declared in its header.
        nbins: u32,
        /// How many bytes a complete file would hold.
        expected: u64,
        /// How many bytes we actually got.
        found: u64,
    },
    /// The plotting layer could not draw.
    #[error("unable to draw the plot: {0}")]
    Draw(String),
    /// The drawn plot could not be encoded as an image.
    #[error("unable to encode {path:?}: {source}")]
    Encode {
        /// The image we were producing.
        path: PathBuf,
        /// Why encoding failed.
        source: image::ImageError,
    },
}

impl Error {
    /// Attach a path to an I/O error.
    pub fn io<P: Into<PathBuf>>(path: P, source: io::Error) -> Error {
        Error::Io { path: path.into(), source }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {}", c),
        None => "killed by a signal".to_string(),
    }
}

/// A result with our error type.
pub type Result<T> = std::result::Result<T, Error>;

#[test]
fn failed_runs_say_how_they_failed() {
    let failed = |code| Error::Invocation {
        program: PathBuf::from("/tmp/test_histogram.exe"),
        iteration: 3,
        seed: 42,
        code,
    };
    assert_eq!(failed(Some(1)).to_string(),
               "error running \"/tmp/test_histogram.exe\" (run 3, seed 42): exit code 1");
    assert_eq!(failed(None).to_string(),
               "error running \"/tmp/test_histogram.exe\" (run 3, seed 42): killed by a signal");
}
