use crate::io::error::Error;
use serde::Deserialize;
use std::collections::BTreeMap;

/// What to do when `&END <name>` names a different section than the one
/// being closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndMismatch {
    /// Abort with [`SyntaxError::MismatchedEnd`](crate::io::SyntaxError::MismatchedEnd).
    #[default]
    Strict,
    /// Log a warning and close the current section.
    Warn,
}

/// Parser tunables for the CP2K input grammar.
///
/// Sections listed in `positional` treat the first token of each line as
/// data rather than a keyword name, unless the token is one of the listed
/// keywords. Such rows are stored under [`POSITIONAL_KEY`](crate::model::tree::POSITIONAL_KEY).
///
/// A dialect can be read from TOML:
///
/// ```toml
/// end_mismatch = "warn"
///
/// [positional]
/// coord = ["scaled", "unit"]
/// velocity = []
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Dialect {
    pub positional: BTreeMap<String, Vec<String>>,
    pub end_mismatch: EndMismatch,
}

impl Default for Dialect {
    fn default() -> Self {
        let mut positional = BTreeMap::new();
        positional.insert("coord".to_string(), vec!["scaled".into(), "unit".into()]);
        Self {
            positional,
            end_mismatch: EndMismatch::Strict,
        }
    }
}

impl Dialect {
    pub fn from_toml_str(text: &str) -> Result<Self, Error> {
        let mut dialect: Dialect = toml::from_str(text)?;
        dialect.normalize();
        Ok(dialect)
    }

    pub fn with_end_mismatch(mut self, policy: EndMismatch) -> Self {
        self.end_mismatch = policy;
        self
    }

    /// Keywords that stay keywords inside `section`, or `None` when the
    /// section has no positional rows.
    pub fn positional_keywords(&self, section: &str) -> Option<&[String]> {
        self.positional.get(section).map(Vec::as_slice)
    }

    fn normalize(&mut self) {
        self.positional = std::mem::take(&mut self.positional)
            .into_iter()
            .map(|(name, keywords)| {
                let keywords = keywords.into_iter().map(|k| k.to_lowercase()).collect();
                (name.to_lowercase(), keywords)
            })
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_treats_coord_as_positional() {
        let dialect = Dialect::default();
        assert_eq!(
            dialect.positional_keywords("coord"),
            Some(&["scaled".to_string(), "unit".to_string()][..])
        );
        assert!(dialect.positional_keywords("kind").is_none());
        assert_eq!(dialect.end_mismatch, EndMismatch::Strict);
    }

    #[test]
    fn toml_overrides_are_lower_cased() {
        let dialect = Dialect::from_toml_str(
            "end_mismatch = \"warn\"\n[positional]\nCOORD = [\"UNIT\"]\nvelocity = []\n",
        )
        .expect("valid dialect");
        assert_eq!(dialect.end_mismatch, EndMismatch::Warn);
        assert_eq!(
            dialect.positional_keywords("coord"),
            Some(&["unit".to_string()][..])
        );
        assert_eq!(dialect.positional_keywords("velocity"), Some(&[][..]));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let dialect = Dialect::from_toml_str("").expect("empty dialect");
        assert_eq!(dialect, Dialect::default());
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let err = Dialect::from_toml_str("end_mismatch = \"maybe\"").unwrap_err();
        assert!(matches!(err, Error::Dialect(_)));
    }
}
