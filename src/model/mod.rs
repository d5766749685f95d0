//! Core data structures shared by the readers, writers and the log scanner.
//!
//! - [`value`] – Scalar keyword values and their token coercion.
//! - [`tree`] – The ordered section/keyword tree of a CP2K input file.
//! - [`interchange`] – JSON (serde) mapping of the tree.
//! - [`frame`] – Atoms and frames of multi-frame coordinate files.
//!
//! The tree keeps every key lower-cased and in insertion order; reading
//! preserves source order while writing canonicalizes it.

pub mod frame;
pub mod interchange;
pub mod tree;
pub mod value;
