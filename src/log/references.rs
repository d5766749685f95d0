//! The `R E F E R E N C E S` table printed at the end of a CP2K run.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use tracing::{debug, warn};

static TABLE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^ -+\n - +-\n - +R E F E R E N C E S +-\n - +-\n -+\n ?\n(?: CP2K.+\n){2} ?\n",
    )
    .expect("reference header pattern is valid")
});

static TABLE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^ -+\n").expect("table end pattern is valid"));

static ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\s*(?P<authors>[\w\s,\-]+(?:;[\w\s,\-]+)*)\.\s*",
        r"(?P<journal>[\w\s\-]+),\s",
        r"(?P<volume>[\d\s()\-]+),\s",
        r"(?P<pages>\d+-\d+)\s",
        r"\((?P<year>\d{4})\)\.\s*",
        r"(?P<title>[^.]+)\.\s*",
        r"(?P<url>https?://(?:[a-zA-Z0-9]|[$-_@.&+]|[!*(),]|%[0-9a-fA-F]{2})+)",
    ))
    .expect("reference entry pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    pub authors: Vec<String>,
    pub journal: String,
    pub volume: String,
    pub pages: String,
    pub year: String,
    pub title: String,
    pub url: String,
}

impl Reference {
    /// Parses one reference entry with its line breaks already removed.
    pub fn parse(entry: &str) -> Option<Self> {
        let caps = ENTRY.captures(entry)?;
        Some(Self {
            authors: caps["authors"]
                .split(';')
                .map(|a| a.trim().to_string())
                .collect(),
            journal: caps["journal"].to_string(),
            volume: caps["volume"].to_string(),
            pages: caps["pages"].to_string(),
            year: caps["year"].to_string(),
            title: caps["title"].to_string(),
            url: caps["url"].to_string(),
        })
    }
}

/// Extracts the references table from a complete log.
///
/// Returns the parsed entries and the log with the table removed. Without a
/// references table the text comes back unchanged.
pub fn extract(text: &str) -> (Vec<Reference>, String) {
    let normalized;
    let text = if text.contains('\r') {
        normalized = text.replace("\r\n", "\n");
        normalized.as_str()
    } else {
        text
    };

    let Some(header) = TABLE_HEADER.find(text) else {
        debug!("no references table found");
        return (Vec::new(), text.to_string());
    };
    let Some(end) = TABLE_END.find_at(text, header.end()) else {
        warn!("references table is not terminated");
        return (Vec::new(), text.to_string());
    };

    let body = &text[header.end()..end.start()];
    let references = body
        .split("\n\n")
        .map(|block| block.trim_matches('\n'))
        .filter(|block| !block.trim().is_empty())
        .filter_map(|block| {
            let joined = block.replace('\n', "");
            let parsed = Reference::parse(&joined);
            if parsed.is_none() {
                warn!(entry = %joined, "unrecognized reference entry");
            }
            parsed
        })
        .collect();

    let mut rest = String::with_capacity(text.len() - (end.start() - header.start()));
    rest.push_str(&text[..header.start()]);
    rest.push_str(&text[end.start()..]);
    (references, rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
 -------------------------------------------------------------------------------
 -                                                                             -
 -                                R E F E R E N C E S                          -
 -                                                                             -
 -------------------------------------------------------------------------------

 CP2K version 2.6.2, the CP2K developers group (2015).
 CP2K is freely available from http://www.cp2k.org/ .

 VandeVondele, J; Krack, M; Mohamed, F; Parrinello, M; Chassaing, T;
 Hutter, J. COMPUTER PHYSICS COMMUNICATIONS, 167 (2), 103-128 (2005).
 QUICKSTEP: Fast and accurate density functional calculations using a
 mixed Gaussian and plane waves approach.
 http://dx.doi.org/10.1016/j.cpc.2004.12.014

 Frigo, M; Johnson, SG. PROCEEDINGS OF THE IEEE, 93 (2), 216-231 (2005).
 The design and implementation of FFTW3.
 http://dx.doi.org/10.1109/JPROC.2004.840301

 -------------------------------------------------------------------------------
 -                                                                             -
 -                                T I M I N G                                  -
";

    #[test]
    fn parses_entries_and_removes_the_table() {
        let log = format!(" ENERGY| Total FORCE_EVAL ( QS ) energy (a.u.):  -17.15\n{TABLE}");
        let (references, rest) = extract(&log);

        assert_eq!(references.len(), 2);
        let quickstep = &references[0];
        assert_eq!(
            quickstep.authors,
            vec![
                "VandeVondele, J",
                "Krack, M",
                "Mohamed, F",
                "Parrinello, M",
                "Chassaing, T",
                "Hutter, J"
            ]
        );
        assert_eq!(quickstep.journal, "COMPUTER PHYSICS COMMUNICATIONS");
        assert_eq!(quickstep.volume, "167 (2)");
        assert_eq!(quickstep.pages, "103-128");
        assert_eq!(quickstep.year, "2005");
        assert_eq!(
            quickstep.title,
            "QUICKSTEP: Fast and accurate density functional calculations using a mixed Gaussian and plane waves approach"
        );
        assert_eq!(quickstep.url, "http://dx.doi.org/10.1016/j.cpc.2004.12.014");
        assert_eq!(references[1].authors, vec!["Frigo, M", "Johnson, SG"]);

        assert!(rest.starts_with(" ENERGY| Total"));
        assert!(!rest.contains("R E F E R E N C E S"));
        assert!(rest.contains("T I M I N G"));
    }

    #[test]
    fn text_without_table_is_returned_unchanged() {
        let (references, rest) = extract("nothing to see\n");
        assert!(references.is_empty());
        assert_eq!(rest, "nothing to see\n");
    }
}
