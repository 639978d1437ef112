//! This crate is for watching a random histogram generator at work: it
//! runs the generator over and over with fresh seeds and plots every
//! histogram it produces on identical axes.

#![cfg_attr(feature = "strict", deny(warnings))]
#![deny(missing_docs)]

pub mod atomicfile;
pub mod driver;
pub mod error;
pub mod figure;
pub mod generator;
pub mod histogram;
pub mod logging;
pub mod seed;

pub use crate::error::{Error, Result};
