use super::value::Value;
use indexmap::IndexMap;
use indexmap::map::Entry;

/// Key under which positional rows of a section are collected.
pub const POSITIONAL_KEY: &str = "*";

/// Reserved interchange key holding a section's default parameter.
pub const PARAM_KEY: &str = "_";

/// A child value stored under a key of a [`Section`] or [`ConfigTree`].
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A keyword given without any value.
    Flag,
    /// A keyword with exactly one value.
    Scalar(Value),
    /// A keyword with two or more values on one line (unit tag first, if any).
    Tuple(Vec<Value>),
    /// Every occurrence of a key that appeared more than once, in order.
    ///
    /// Elements that are themselves sequences of scalars are written as one
    /// line per row, like tuples.
    Sequence(Vec<Node>),
    Section(Section),
}

impl Node {
    pub fn is_section(&self) -> bool {
        matches!(self, Node::Section(_))
    }

    /// True for sections and for sequences made of sections; these are
    /// emitted after plain keywords.
    pub fn is_section_like(&self) -> bool {
        match self {
            Node::Section(_) => true,
            Node::Sequence(items) => items.first().is_some_and(Node::is_section),
            _ => false,
        }
    }

    pub fn as_section(&self) -> Option<&Section> {
        match self {
            Node::Section(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Node::Scalar(v) => Some(v),
            _ => None,
        }
    }

    /// Short name of the node's shape, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Flag => "flag",
            Node::Scalar(_) => "scalar",
            Node::Tuple(_) => "tuple",
            Node::Sequence(_) => "sequence",
            Node::Section(_) => "section",
        }
    }

    /// Builds a keyword node from its values, collapsing zero values to a
    /// flag and exactly one value to a scalar.
    pub fn from_values(mut values: Vec<Value>) -> Self {
        match values.len() {
            0 => Node::Flag,
            1 => Node::Scalar(values.remove(0)),
            _ => Node::Tuple(values),
        }
    }
}

impl From<Section> for Node {
    fn from(section: Section) -> Self {
        Node::Section(section)
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        Node::Scalar(value)
    }
}

/// A `&NAME ... &END` block: an optional default parameter and its ordered
/// children. The section's own name is the key it is stored under.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    pub param: Option<Value>,
    pub entries: IndexMap<String, Node>,
}

impl Section {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_param(param: impl Into<Value>) -> Self {
        Self {
            param: Some(param.into()),
            entries: IndexMap::new(),
        }
    }

    /// Builder-style [`Section::insert`].
    pub fn entry(mut self, key: &str, node: impl Into<Node>) -> Self {
        self.insert(key, node.into());
        self
    }

    /// Adds a child under the lower-cased `key`. A key that is already
    /// present turns into a [`Node::Sequence`] of all its occurrences.
    pub fn insert(&mut self, key: &str, node: Node) {
        insert_repeating(&mut self.entries, key.to_lowercase(), node);
    }

    /// Case-insensitive child lookup.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.get(&key.to_lowercase())
    }

    /// Follows a chain of nested sections, e.g. `["force_eval", "dft"]`.
    /// The first occurrence is taken where a section repeats.
    pub fn section(&self, path: &[&str]) -> Option<&Section> {
        let mut current = self;
        for name in path {
            current = match current.get(name)? {
                Node::Section(s) => s,
                Node::Sequence(items) => items.first()?.as_section()?,
                _ => return None,
            };
        }
        Some(current)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.param.is_none()
    }
}

/// A parsed or programmatically built input file: its top-level sections
/// in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigTree {
    pub sections: IndexMap<String, Node>,
}

impl ConfigTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`ConfigTree::insert`].
    pub fn with(mut self, name: &str, section: Section) -> Self {
        self.insert(name, section);
        self
    }

    /// Adds a top-level section; repeated names collect into a sequence.
    pub fn insert(&mut self, name: &str, section: Section) {
        insert_repeating(&mut self.sections, name.to_lowercase(), Node::Section(section));
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.sections.get(&name.to_lowercase())
    }

    /// Resolves a path of section names starting at the top level.
    pub fn section(&self, path: &[&str]) -> Option<&Section> {
        let (first, rest) = path.split_first()?;
        let top = match self.get(first)? {
            Node::Section(s) => s,
            Node::Sequence(items) => items.first()?.as_section()?,
            _ => return None,
        };
        top.section(rest)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

pub(crate) fn insert_repeating(map: &mut IndexMap<String, Node>, key: String, node: Node) {
    match map.entry(key) {
        Entry::Vacant(slot) => {
            slot.insert(node);
        }
        Entry::Occupied(mut slot) => match slot.get_mut() {
            Node::Sequence(items) => items.push(node),
            existing => {
                let first = std::mem::replace(existing, Node::Flag);
                *existing = Node::Sequence(vec![first, node]);
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_insert_becomes_ordered_sequence() {
        let mut section = Section::new();
        section.insert("X", Node::Scalar(Value::Int(1)));
        section.insert("y", Node::Flag);
        section.insert("x", Node::Scalar(Value::Int(2)));
        section.insert("X", Node::Scalar(Value::Int(3)));

        let keys: Vec<_> = section.entries.keys().cloned().collect();
        assert_eq!(keys, vec!["x", "y"]);
        assert_eq!(
            section.get("x"),
            Some(&Node::Sequence(vec![
                Node::Scalar(Value::Int(1)),
                Node::Scalar(Value::Int(2)),
                Node::Scalar(Value::Int(3)),
            ]))
        );
    }

    #[test]
    fn from_values_collapses_by_length() {
        assert_eq!(Node::from_values(vec![]), Node::Flag);
        assert_eq!(
            Node::from_values(vec![Value::Int(4)]),
            Node::Scalar(Value::Int(4))
        );
        assert!(matches!(
            Node::from_values(vec![Value::Int(4), Value::Int(5)]),
            Node::Tuple(v) if v.len() == 2
        ));
    }

    #[test]
    fn section_like_covers_sections_and_sequences_of_sections() {
        assert!(Node::Section(Section::new()).is_section_like());
        assert!(Node::Sequence(vec![Node::Section(Section::new())]).is_section_like());
        assert!(!Node::Sequence(vec![Node::Scalar(Value::Int(1))]).is_section_like());
        assert!(!Node::Tuple(vec![Value::Int(1), Value::Int(2)]).is_section_like());
    }

    #[test]
    fn nested_lookup_follows_first_occurrence() {
        let tree = ConfigTree::new().with(
            "FORCE_EVAL",
            Section::new().entry(
                "DFT",
                Section::new().entry("BASIS_SET_FILE_NAME", Value::from("BASIS")),
            ),
        );

        let dft = tree.section(&["force_eval", "dft"]).expect("dft section");
        assert_eq!(
            dft.get("basis_set_file_name").and_then(Node::as_scalar),
            Some(&Value::from("BASIS"))
        );
        assert!(tree.section(&["force_eval", "missing"]).is_none());
    }
}
