//! CP2K input files: the section/keyword grammar and its canonical writer.
//!
//! ```
//! use cp2k_tools::io::inp::{self, Dialect, Parameters};
//!
//! let text = "&GLOBAL\n  PROJECT water\n  RUN_TYPE MD\n&END GLOBAL\n";
//! let tree = inp::parse(text, &Dialect::default())?;
//! let again = inp::generate(&tree, &Parameters::new())?;
//! assert_eq!(again, "&GLOBAL\n   PROJECT water\n   RUN_TYPE MD\n&END GLOBAL");
//! # Ok::<(), cp2k_tools::io::Error>(())
//! ```

mod dialect;
mod lines;
mod reader;
mod template;
mod writer;

pub use dialect::{Dialect, EndMismatch};
pub use reader::{parse, read};
pub use template::{Parameters, substitute};
pub use writer::{generate, write};

use crate::io::error::Error;
use crate::model::tree::ConfigTree;
use std::io::{Read, Write};

/// Serializes `tree` as pretty-printed JSON in the interchange layout.
pub fn to_json<W: Write>(writer: W, tree: &ConfigTree) -> Result<(), Error> {
    serde_json::to_writer_pretty(writer, tree)?;
    Ok(())
}

pub fn to_json_string(tree: &ConfigTree) -> Result<String, Error> {
    Ok(serde_json::to_string_pretty(tree)?)
}

/// Reads a tree from its JSON interchange form.
pub fn from_json<R: Read>(reader: R) -> Result<ConfigTree, Error> {
    Ok(serde_json::from_reader(reader)?)
}

pub fn from_json_str(text: &str) -> Result<ConfigTree, Error> {
    Ok(serde_json::from_str(text)?)
}
