//! Multi-frame XYZ coordinate files.
//!
//! Each frame is an atom count line, a free-form comment line and one
//! `symbol x y z` line per atom. CP2K trajectories put the MD step into the
//! comment, which [`clean_restarts`] uses to drop frames recomputed after a
//! restart.

mod reader;
mod restart;
mod writer;

pub use reader::read;
pub use restart::{MdStep, RestartEvent, RestartReport, clean_restarts};
pub use writer::{write, write_frame};

use crate::io::error::Error;
use crate::model::frame::Frame;
use std::io::BufRead;

/// Reads every frame and keeps only the last one.
pub fn read_last<R: BufRead>(reader: R) -> Result<Option<Frame>, Error> {
    Ok(read(reader)?.pop())
}
