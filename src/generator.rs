//! The external histogram generator, and the seam through which the driver
//! talks to it.

use crate::error::{Error, Result};

use std::env;
use std::path::{Component, Path, PathBuf};
use std::process::{Command, Stdio};

/// The file the generator writes, relative to its working directory.
pub const OUTPUT_FILE: &str = "histogram.bin";

/// What we ask of one generator run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    /// Which run this is, counting from zero.
    pub iteration: usize,
    /// How many random samples to draw.
    pub sample_count: u64,
    /// The seed for the generator's random number generator.
    pub seed: u64,
}

impl Request {
    /// The positional arguments the generator expects:
    /// `<sample_count> <seed>`.
    pub fn args(&self) -> [String; 2] {
        [self.sample_count.to_string(), self.seed.to_string()]
    }
}

/// How a generator run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// The exit code, or `None` if the process was killed by a signal.
    pub code: Option<i32>,
    /// Everything the generator printed to standard output.
    pub stdout: String,
}

impl Invocation {
    /// Did the generator exit with the success code?
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Something that can produce a histogram file on request.
pub trait Generator {
    /// Run once in `workdir` and wait for completion.  A successful run
    /// leaves [`OUTPUT_FILE`] in `workdir`.  An `Err` means we could not
    /// run at all; a run that failed is an `Ok` with a non-zero code.
    fn generate(&mut self, request: &Request, workdir: &Path) -> Result<Invocation>;

    /// A name for this generator, for error messages.
    fn name(&self) -> PathBuf;
}

/// A generator that is a program on disk, run as
/// `<program> <sample_count> <seed>`.
#[derive(Debug, Clone)]
pub struct ExternalProgram {
    program: PathBuf,
}

impl ExternalProgram {
    /// Refer to `program`.  A relative path with a directory in it (like
    /// `./test_histogram.exe`) is taken relative to the current directory
    /// now, since each run happens in a directory of its own.  A bare name
    /// is left for the operating system to look up on `PATH`.
    pub fn new<P: AsRef<Path>>(program: P) -> Result<ExternalProgram> {
        let program = program.as_ref();
        if program.is_absolute() || program.components().count() < 2 {
            return Ok(ExternalProgram { program: program.to_path_buf() });
        }
        let cwd = env::current_dir().map_err(|e| Error::io(".", e))?;
        let relative: PathBuf = program
            .components()
            .filter(|c| *c != Component::CurDir)
            .collect();
        Ok(ExternalProgram { program: cwd.join(relative) })
    }

    /// The program we will run.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Generator for ExternalProgram {
    fn generate(&mut self, request: &Request, workdir: &Path) -> Result<Invocation> {
        tracing::debug!(program = ?self.program, workdir = ?workdir,
                        args = ?request.args(), "launching generator");
        let out = Command::new(&self.program)
            .args(&request.args())
            .current_dir(workdir)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|source| Error::Spawn {
                program: self.program.clone(),
                iteration: request.iteration,
                source,
            })?;
        Ok(Invocation {
            code: out.status.code(),
            stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
        })
    }

    fn name(&self) -> PathBuf {
        self.program.clone()
    }
}

#[test]
fn request_arguments_are_count_then_seed() {
    let r = Request { iteration: 3, sample_count: 500000, seed: 1234567890123 };
    assert_eq!(r.args(), ["500000".to_string(), "1234567890123".to_string()]);
}

#[test]
fn relative_programs_are_pinned_to_the_current_directory() {
    let p = ExternalProgram::new("./test_histogram.exe").unwrap();
    assert!(p.program().is_absolute());
    assert!(p.program().ends_with("test_histogram.exe"));
    assert!(p.program().components().all(|c| c != Component::CurDir),
            "{:?} still has a ./ in it", p.program());
    assert_eq!(p.program(), env::current_dir().unwrap().join("test_histogram.exe"));

    let p = ExternalProgram::new("./bin/./gen").unwrap();
    assert_eq!(p.program(), env::current_dir().unwrap().join("bin/gen"));

    let p = ExternalProgram::new("test_histogram").unwrap();
    assert_eq!(p.program(), Path::new("test_histogram"));
}

#[cfg(unix)]
#[test]
fn runs_a_real_program() {
    let dir = tempfile::tempdir().unwrap();
    let mut echo = ExternalProgram::new("echo").unwrap();
    let r = Request { iteration: 0, sample_count: 10, seed: 42 };
    let inv = echo.generate(&r, dir.path()).unwrap();
    assert!(inv.success());
    assert_eq!(inv.stdout, "10 42\n");

    let mut missing = ExternalProgram::new("./no-such-generator").unwrap();
    match missing.generate(&r, dir.path()) {
        Err(Error::Spawn { iteration, .. }) => assert_eq!(iteration, 0),
        other => panic!("expected a spawn error, got {:?}", other),
    }
}
