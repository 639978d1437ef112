//! The binary histogram file written by the external generator.
//!
//! The layout is flat, in the native byte order of the machine (the
//! generator runs on the same host we do):
//!
//! ```text
//! u32          nbins
//! [f64; nbins] bin values
//! [u64; nbins] bin counts
//! ```
//!
//! There is no length prefix beyond `nbins` and no trailer.

use crate::error::{Error, Result};

use std::convert::TryFrom;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

/// The size in bytes of the `nbins` header.
pub const HEADER_BYTES: u64 = 4;

/// The number of bytes a complete file with `nbins` bins holds.
pub fn file_size(nbins: u32) -> u64 {
    HEADER_BYTES + 16 * nbins as u64
}

/// One parsed histogram: a representative value and a count for each bin.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Histogram {
    values: Vec<f64>,
    counts: Vec<u64>,
}

impl Histogram {
    /// Create a histogram.
    ///
    /// # Panics
    ///
    /// Panics if `values` and `counts` differ in length.  Histograms read
    /// from a file always have one count per value, so this only guards
    /// against mistakes in code that builds a histogram by hand.
    pub fn new(values: Vec<f64>, counts: Vec<u64>) -> Histogram {
        assert_eq!(values.len(), counts.len(), "every bin needs a value and a count");
        Histogram { values, counts }
    }

    /// The bin values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }
    /// The bin counts.
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }
    /// The number of bins.
    pub fn len(&self) -> usize {
        self.values.len()
    }
    /// Are there no bins at all?
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The (value, count) pairs, in file order.
    pub fn points(&self) -> impl Iterator<Item = (f64, u64)> + '_ {
        self.values.iter().cloned().zip(self.counts.iter().cloned())
    }

    /// The total number of samples that landed in some bin.
    pub fn total_count(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// The bin with the highest count.  Ties go to the first such bin.
    pub fn peak(&self) -> Option<(f64, u64)> {
        self.points().fold(None, |best, (v, c)| match best {
            Some((_, bc)) if bc >= c => best,
            _ => Some((v, c)),
        })
    }

    /// Read exactly one histogram from `r`.  This reads the header and
    /// then exactly as many bytes as it declares, and nothing more.
    pub fn read_from<R: Read>(mut r: R) -> io::Result<Histogram> {
        let mut word = [0u8; 4];
        r.read_exact(&mut word)?;
        let nbins = u32::from_ne_bytes(word) as usize;

        // We don't trust nbins enough to preallocate for it: a corrupt
        // header could ask for gigabytes.
        let mut values = Vec::new();
        let mut buf = [0u8; 8];
        for _ in 0..nbins {
            r.read_exact(&mut buf)?;
            values.push(f64::from_ne_bytes(buf));
        }
        let mut counts = Vec::with_capacity(values.len());
        for _ in 0..nbins {
            r.read_exact(&mut buf)?;
            counts.push(u64::from_ne_bytes(buf));
        }
        Ok(Histogram { values, counts })
    }

    /// Write this histogram in the generator's format.
    pub fn write_to<W: Write>(&self, mut w: W) -> io::Result<()> {
        let nbins = u32::try_from(self.len()).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidInput,
                           format!("{} bins will not fit in the header", self.len()))
        })?;
        w.write_all(&nbins.to_ne_bytes())?;
        for v in self.values.iter() {
            w.write_all(&v.to_ne_bytes())?;
        }
        for c in self.counts.iter() {
            w.write_all(&c.to_ne_bytes())?;
        }
        w.flush()
    }

    /// Load a histogram file, refusing any file that is shorter than its
    /// header says it should be.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Histogram> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
        let found = bytes.len() as u64;
        if found < HEADER_BYTES {
            return Err(Error::Truncated {
                path: path.to_path_buf(),
                nbins: 0,
                expected: HEADER_BYTES,
                found,
            });
        }
        let mut word = [0u8; 4];
        word.copy_from_slice(&bytes[..4]);
        let nbins = u32::from_ne_bytes(word);
        let expected = file_size(nbins);
        if found < expected {
            return Err(Error::Truncated { path: path.to_path_buf(), nbins, expected, found });
        }
        if found > expected {
            tracing::debug!(path = ?path, extra = found - expected,
                            "ignoring trailing bytes after histogram");
        }
        Histogram::read_from(&bytes[..]).map_err(|e| Error::io(path, e))
    }

    /// Save this histogram to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let f = fs::File::create(path).map_err(|e| Error::io(path, e))?;
        self.write_to(io::BufWriter::new(f)).map_err(|e| Error::io(path, e))
    }
}

#[cfg(test)]
fn raw_file(nbins: u32, values: &[f64], counts: &[u64]) -> Vec<u8> {
    let mut bytes = nbins.to_ne_bytes().to_vec();
    for v in values {
        bytes.extend_from_slice(&v.to_ne_bytes());
    }
    for c in counts {
        bytes.extend_from_slice(&c.to_ne_bytes());
    }
    bytes
}

#[test]
fn reads_three_bins_in_order() {
    let bytes = raw_file(3, &[-1.0, 0.0, 2.5], &[10, 20, 30]);
    let mut r = &bytes[..];
    let h = Histogram::read_from(&mut r).unwrap();
    assert_eq!(h.points().collect::<Vec<_>>(),
               vec![(-1.0, 10), (0.0, 20), (2.5, 30)]);
    assert!(r.is_empty());
}

#[test]
fn does_not_read_past_the_declared_bins() {
    let mut bytes = raw_file(1, &[0.5], &[7]);
    bytes.extend_from_slice(b"trailing garbage");
    let mut r = &bytes[..];
    let h = Histogram::read_from(&mut r).unwrap();
    assert_eq!(h.points().collect::<Vec<_>>(), vec![(0.5, 7)]);
    assert_eq!(r, &b"trailing garbage"[..]);
}

#[test]
fn zero_bins() {
    let bytes = raw_file(0, &[], &[]);
    let h = Histogram::read_from(&bytes[..]).unwrap();
    assert!(h.is_empty());
    assert_eq!(h.total_count(), 0);
    assert_eq!(h.peak(), None);
}

#[test]
fn short_read_is_an_error() {
    let bytes = raw_file(3, &[-1.0, 0.0, 2.5], &[10, 20]);
    let e = Histogram::read_from(&bytes[..]).unwrap_err();
    assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof);
}

#[test]
fn load_refuses_truncated_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("histogram.bin");
    fs::write(&path, raw_file(3, &[-1.0, 0.0, 2.5], &[10, 20])).unwrap();
    match Histogram::load(&path) {
        Err(Error::Truncated { nbins, expected, found, .. }) => {
            assert_eq!(nbins, 3);
            assert_eq!(expected, 52);
            assert_eq!(found, 44);
        }
        r => panic!("expected a truncation error, got {:?}", r),
    }

    fs::write(&path, [1u8, 0]).unwrap();
    match Histogram::load(&path) {
        Err(Error::Truncated { expected, found, .. }) => {
            assert_eq!(expected, HEADER_BYTES);
            assert_eq!(found, 2);
        }
        r => panic!("expected a truncation error, got {:?}", r),
    }
}

#[test]
fn load_does_not_trust_a_huge_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("histogram.bin");
    fs::write(&path, raw_file(u32::MAX, &[1.0], &[1])).unwrap();
    match Histogram::load(&path) {
        Err(Error::Truncated { nbins, .. }) => assert_eq!(nbins, u32::MAX),
        r => panic!("expected a truncation error, got {:?}", r),
    }
}

#[test]
fn save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("histogram.bin");
    let h = Histogram::new(vec![-8.0, -7.968, 4.0], vec![0, 3, 4321]);
    h.save(&path).unwrap();
    assert_eq!(fs::metadata(&path).unwrap().len(), file_size(3));
    assert_eq!(Histogram::load(&path).unwrap(), h);
}

#[test]
#[should_panic(expected = "every bin needs a value and a count")]
fn mismatched_bins_panic() {
    Histogram::new(vec![0.0, 1.0], vec![3]);
}

#[test]
fn load_ignores_trailing_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("histogram.bin");
    let mut bytes = raw_file(3, &[-1.0, 0.0, 2.5], &[10, 20, 30]);
    bytes.extend_from_slice(&[0xff; 13]);
    fs::write(&path, &bytes).unwrap();
    let h = Histogram::load(&path).unwrap();
    assert_eq!(h.points().collect::<Vec<_>>(),
               vec![(-1.0, 10), (0.0, 20), (2.5, 30)]);
}

#[test]
fn summary() {
    let h = Histogram::new(vec![-1.0, 0.0, 1.0, 2.0], vec![5, 9, 9, 1]);
    assert_eq!(h.total_count(), 24);
    assert_eq!(h.peak(), Some((0.0, 9)));
}
