//! Parsing, generation and conversion of CP2K files.
//!
//! The core of the crate is the CP2K input grammar: nested `&SECTION` ...
//! `&END` blocks of keyword lines, read into an ordered [`ConfigTree`] and
//! written back in a canonical layout with optional `{name}` template
//! placeholders. Around it sit the collaborators needed to work with a
//! simulation end to end:
//!
//! - [`io::inp`] – Input files, their JSON interchange form and templating.
//! - [`io::xyz`] – Multi-frame XYZ trajectories and restart cleaning.
//! - [`log`] – Scanning of CP2K output logs, path queries and the references
//!   table.
//!
//! # Quick Start
//!
//! ```
//! use cp2k_tools::io::inp::{self, Dialect, Parameters};
//! use cp2k_tools::{Node, Value};
//!
//! let text = "\
//! &GLOBAL
//!   PROJECT {project}
//! &END GLOBAL
//! &FORCE_EVAL
//!   &DFT
//!     &MGRID
//!       CUTOFF [Ry] 400
//!     &END MGRID
//!   &END DFT
//!   METHOD Quickstep
//! &END FORCE_EVAL
//! ";
//!
//! let tree = inp::parse(text, &Dialect::default())?;
//! let mgrid = tree.section(&["force_eval", "dft", "mgrid"]).unwrap();
//! assert_eq!(
//!     mgrid.get("cutoff"),
//!     Some(&Node::Tuple(vec![Value::Str("[ry]".into()), Value::Int(400)]))
//! );
//!
//! let mut params = Parameters::new();
//! params.insert("project".into(), "water".into());
//! let generated = inp::generate(&tree, &params)?;
//! assert!(generated.starts_with("&FORCE_EVAL\n   METHOD Quickstep\n"));
//! assert!(generated.contains("PROJECT water"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod io;
pub mod log;
pub mod model;

pub use io::{Error, FormatError, SyntaxError};
pub use model::frame::{Atom, Frame};
pub use model::tree::{ConfigTree, Node, Section};
pub use model::value::Value;
