use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use tracing::warn;

static SECTION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ (?P<key>[a-zA-Z0-9]+)\| (?P<value>.*)").expect("section line pattern is valid")
});

static DESCRIPTION_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<desc>.+?)\s{2,}(?P<value>.+)").expect("description pattern is valid")
});

static PROGRAM_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^ [* ]{13,} PROGRAM (?P<key>STARTED (?:AT|ON|BY|IN)|RAN (?:ON|BY)|STOPPED IN|PROCESS ID|ENDED AT)\s+(?P<value>.*)$",
    )
    .expect("program line pattern is valid")
});

static CONTINUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ \s{42}(?P<value>.+)").expect("continuation pattern is valid"));

/// Sections whose summary lines are collected.
pub const SECTION_KEYS: [&str; 4] = ["DBCSR", "CP2K", "GLOBAL", "ENERGY"];

/// Recognizes one kind of line in a CP2K output log and accumulates what it
/// finds.
///
/// The driver offers each line to [`ElementParser::matches`] in turn and
/// hands it to [`ElementParser::parse`] on the first match. While
/// [`ElementParser::finished`] is false the next line goes straight to
/// `parse`, which returns `false` to give the line back.
pub trait ElementParser {
    fn matches(&mut self, line: &str) -> bool;

    fn parse(&mut self, line: &str) -> bool;

    fn finished(&self) -> bool {
        true
    }

    /// Top-level entries this parser contributes to the store.
    fn data(&self) -> Map<String, Value>;
}

/// ` KEY| description    value` summary lines.
#[derive(Debug, Clone)]
pub struct SectionSummary {
    sections: Map<String, Value>,
    key: String,
    value: String,
}

impl Default for SectionSummary {
    fn default() -> Self {
        let sections = SECTION_KEYS
            .iter()
            .map(|key| (key.to_string(), Value::Object(Map::new())))
            .collect();
        Self {
            sections,
            key: String::new(),
            value: String::new(),
        }
    }
}

impl ElementParser for SectionSummary {
    fn matches(&mut self, line: &str) -> bool {
        match SECTION_LINE.captures(line) {
            Some(caps) => {
                self.key = caps["key"].to_string();
                self.value = caps["value"].to_string();
                true
            }
            None => false,
        }
    }

    fn parse(&mut self, _line: &str) -> bool {
        let Some(Value::Object(entries)) = self.sections.get_mut(&self.key) else {
            return true;
        };
        match DESCRIPTION_VALUE.captures(&self.value) {
            Some(caps) => {
                let description = caps["desc"].trim_end_matches(':').to_string();
                entries.insert(description, Value::String(caps["value"].to_string()));
            }
            None => warn!(
                key = %self.key,
                value = %self.value,
                "summary line has no description/value split"
            ),
        }
        true
    }

    fn data(&self) -> Map<String, Value> {
        self.sections.clone()
    }
}

/// `**** PROGRAM STARTED AT ...` style banner lines, stored under `PROGRAM`.
#[derive(Debug, Clone)]
pub struct ProgramInfo {
    entries: Map<String, Value>,
    key: String,
    value: String,
    finished: bool,
}

impl Default for ProgramInfo {
    fn default() -> Self {
        Self {
            entries: Map::new(),
            key: String::new(),
            value: String::new(),
            finished: true,
        }
    }
}

impl ElementParser for ProgramInfo {
    fn matches(&mut self, line: &str) -> bool {
        self.finished = true;
        match PROGRAM_LINE.captures(line) {
            Some(caps) => {
                self.key = caps["key"].to_string();
                self.value = caps["value"].to_string();
                true
            }
            None => false,
        }
    }

    fn parse(&mut self, line: &str) -> bool {
        if self.finished {
            self.entries
                .insert(self.key.clone(), Value::String(self.value.clone()));
            // Paths can wrap onto the following lines.
            if self.key == "STARTED IN" || self.key == "STOPPED IN" {
                self.finished = false;
            }
            return true;
        }

        if let Some(caps) = CONTINUATION.captures(line)
            && let Some(Value::String(current)) = self.entries.get_mut(&self.key)
        {
            current.push_str(caps["value"].trim());
            return true;
        }

        self.finished = true;
        false
    }

    fn finished(&self) -> bool {
        self.finished
    }

    fn data(&self) -> Map<String, Value> {
        let mut data = Map::new();
        data.insert("PROGRAM".to_string(), Value::Object(self.entries.clone()));
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(parser: &mut dyn ElementParser, line: &str) -> bool {
        parser.matches(line) && parser.parse(line)
    }

    #[test]
    fn summary_lines_of_known_sections_are_collected() {
        let mut parser = SectionSummary::default();
        assert!(feed(&mut parser, " GLOBAL| Run type                                                 ENERGY"));
        assert!(feed(&mut parser, " CP2K| version string:                                 CP2K version 2.6.2"));
        assert!(feed(&mut parser, " MEMORY| system memory details [Kb]"));
        assert!(!parser.matches("  no key here"));

        let data = parser.data();
        assert_eq!(data["GLOBAL"]["Run type"], "ENERGY");
        assert_eq!(data["CP2K"]["version string"], "CP2K version 2.6.2");
        assert_eq!(data["DBCSR"], Value::Object(Map::new()));
        assert!(!data.contains_key("MEMORY"));
    }

    #[test]
    fn unsplittable_summary_line_is_skipped() {
        let mut parser = SectionSummary::default();
        feed(&mut parser, " GLOBAL| Total number of message passing processes");
        assert_eq!(parser.data()["GLOBAL"], Value::Object(Map::new()));
    }

    #[test]
    fn program_paths_continue_on_indented_lines() {
        let mut parser = ProgramInfo::default();
        assert!(feed(&mut parser, " **** **** ******  **  PROGRAM STARTED IN /scratch/users/someone/projects/"));
        assert!(!parser.finished());
        let continuation = format!(" {}water/run1", " ".repeat(42));
        assert!(parser.parse(&continuation));
        assert!(!parser.parse(" next unrelated line"));
        assert!(parser.finished());

        let data = parser.data();
        assert_eq!(
            data["PROGRAM"]["STARTED IN"],
            "/scratch/users/someone/projects/water/run1"
        );
    }

    #[test]
    fn program_banner_keys() {
        let mut parser = ProgramInfo::default();
        feed(&mut parser, " **** **** ******  **  PROGRAM STARTED AT               2015-06-09 10:27:34.151");
        feed(&mut parser, " **** **** ******  **  PROGRAM PROCESS ID                                  1234");
        let data = parser.data();
        assert_eq!(data["PROGRAM"]["STARTED AT"], "2015-06-09 10:27:34.151");
        assert_eq!(data["PROGRAM"]["PROCESS ID"], "1234");
    }
}
