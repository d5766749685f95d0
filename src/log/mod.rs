//! Scanning of CP2K output logs into a queryable key/value store.
//!
//! ```
//! use cp2k_tools::log::OutputParser;
//!
//! let mut parser = OutputParser::new();
//! parser.parse_str(" GLOBAL| Run type                                     ENERGY\n");
//! assert_eq!(parser.query(".GLOBAL.Run type"), "ENERGY");
//! assert_eq!(parser.query(".GLOBAL.missing"), serde_json::json!({}));
//! ```

pub mod element;
pub mod error;
pub mod query;
pub mod references;

pub use element::{ElementParser, ProgramInfo, SectionSummary};
pub use error::Error;
pub use references::{Reference, extract as extract_references};

use serde_json::{Map, Value};
use std::io::BufRead;
use tracing::debug;

/// Line-by-line scanner over a CP2K output log.
pub struct OutputParser {
    elements: Vec<Box<dyn ElementParser>>,
    active: Option<usize>,
}

impl Default for OutputParser {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputParser {
    pub fn new() -> Self {
        Self::with_elements(vec![
            Box::new(SectionSummary::default()),
            Box::new(ProgramInfo::default()),
        ])
    }

    /// Uses a custom set of element parsers, tried in order.
    pub fn with_elements(elements: Vec<Box<dyn ElementParser>>) -> Self {
        Self {
            elements,
            active: None,
        }
    }

    pub fn parse<R: BufRead>(&mut self, reader: R) -> Result<(), Error> {
        let mut count = 0usize;
        for line in reader.lines() {
            self.feed(&line?);
            count += 1;
        }
        debug!(lines = count, "scanned CP2K output");
        Ok(())
    }

    pub fn parse_str(&mut self, text: &str) {
        for line in text.lines() {
            self.feed(line);
        }
    }

    fn feed(&mut self, line: &str) {
        if let Some(index) = self.active {
            let element = &mut self.elements[index];
            if !element.finished() && element.parse(line) {
                return;
            }
        }

        self.active = None;
        for (index, element) in self.elements.iter_mut().enumerate() {
            if element.matches(line) {
                element.parse(line);
                self.active = Some(index);
                break;
            }
        }
    }

    /// Everything collected so far, merged from all element parsers.
    pub fn data(&self) -> Value {
        let mut merged = Map::new();
        for element in &self.elements {
            merged.extend(element.data());
        }
        Value::Object(merged)
    }

    /// See [`query::query`] for the path syntax.
    pub fn query(&self, path: &str) -> Value {
        query::query(&self.data(), path)
    }
}
