//! Readers and writers for the file formats handled by the crate.
//!
//! CP2K input errors have their own [`SyntaxError`] and [`FormatError`]
//! types; line-oriented data formats report through [`Error::Parse`] tagged
//! with a [`Format`].

use std::fmt;

pub mod error;
pub mod inp;
pub mod xyz;

pub use error::{Error, FormatError, SyntaxError};

/// Line-oriented data format named in [`Error::Parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Xyz,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Xyz => write!(f, "XYZ"),
        }
    }
}
