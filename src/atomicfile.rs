//! A simple thing to atomically write to a file.

use tempfile::NamedTempFile;

use std::io::{Error, ErrorKind, Result, Write};
use std::path::{Path, PathBuf};

/// A version of File that should never leave a partially-written
/// file.  This is only useful for creating files, and will overwrite
/// an existing file with the same name.  Nothing appears at the
/// destination until `finish` is called; dropping an unfinished
/// `AtomicFile` throws away what was written.
pub struct AtomicFile {
    path: PathBuf,
    file: NamedTempFile,
}

impl AtomicFile {
    /// Create a file.
    pub fn create<P: AsRef<Path>>(p: P) -> Result<AtomicFile> {
        let filepath = p.as_ref();
        let dir = match filepath.parent() {
            None => {
                return Err(Error::new(ErrorKind::Other,
                                      format!("Cannot create a file named {:?}",
                                              filepath)));
            }
            Some(p) if p.as_os_str().is_empty() => Path::new("."),
            Some(p) => p,
        };
        // The temporary file must live in the same directory, so the
        // final rename cannot cross filesystems.
        let file = NamedTempFile::new_in(dir)?;
        Ok(AtomicFile {
            path: PathBuf::from(filepath),
            file,
        })
    }

    /// Make sure everything is on disk, then move the file into place.
    pub fn finish(mut self) -> Result<()> {
        self.file.flush()?;
        self.file.as_file().sync_data()?;
        self.file.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl Write for AtomicFile {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.file.write(buf)
    }
    fn flush(&mut self) -> Result<()> {
        self.file.flush()
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        self.file.write_all(buf)
    }
}
