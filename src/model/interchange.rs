//! JSON-compatible (serde) representation of [`ConfigTree`].
//!
//! Sections map to objects whose default parameter lives under the reserved
//! `"_"` key, flags to `null`, and tuples and sequences to arrays. Reading an
//! array back yields a [`Node::Tuple`] when every element is a scalar and a
//! [`Node::Sequence`] otherwise; both forms generate the same input text.

use super::tree::{ConfigTree, Node, PARAM_KEY, Section, insert_repeating};
use super::value::Value;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) if f.is_finite() => serializer.serialize_f64(*f),
            // JSON has no infinities or NaN; keep the token text instead.
            Value::Float(_) => serializer.collect_str(self),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Bool(b) => serializer.serialize_bool(*b),
        }
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Flag => serializer.serialize_unit(),
            Node::Scalar(v) => v.serialize(serializer),
            Node::Tuple(values) => serializer.collect_seq(values),
            Node::Sequence(items) => serializer.collect_seq(items),
            Node::Section(section) => section.serialize(serializer),
        }
    }
}

impl Serialize for Section {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.entries.len() + usize::from(self.param.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        for (key, node) in &self.entries {
            map.serialize_entry(key, node)?;
        }
        if let Some(param) = &self.param {
            map.serialize_entry(PARAM_KEY, param)?;
        }
        map.end()
    }
}

impl Serialize for ConfigTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(&self.sections)
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a keyword value, an array or a section object")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Node, E> {
        Ok(Node::Scalar(Value::Bool(v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Node, E> {
        Ok(Node::Scalar(Value::Int(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Node, E> {
        i64::try_from(v)
            .map(|i| Node::Scalar(Value::Int(i)))
            .map_err(|_| E::custom(format!("integer {v} does not fit into 64 signed bits")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Node, E> {
        Ok(Node::Scalar(Value::Float(v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Node, E> {
        Ok(Node::Scalar(Value::Str(v.to_owned())))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Node, E> {
        Ok(Node::Scalar(Value::Str(v)))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Node, E> {
        Ok(Node::Flag)
    }

    fn visit_none<E: de::Error>(self) -> Result<Node, E> {
        Ok(Node::Flag)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Node, D::Error> {
        Node::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Node, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<Node>()? {
            items.push(item);
        }
        Ok(classify_array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Node, A::Error> {
        section_from_map(map).map(Node::Section)
    }
}

fn classify_array(items: Vec<Node>) -> Node {
    if !items.is_empty() && items.iter().all(|n| matches!(n, Node::Scalar(_))) {
        let values = items
            .into_iter()
            .filter_map(|n| match n {
                Node::Scalar(v) => Some(v),
                _ => None,
            })
            .collect();
        Node::Tuple(values)
    } else {
        Node::Sequence(items)
    }
}

fn section_from_map<'de, A: MapAccess<'de>>(mut map: A) -> Result<Section, A::Error> {
    let mut section = Section::new();
    while let Some(key) = map.next_key::<String>()? {
        if key == PARAM_KEY {
            match map.next_value::<Node>()? {
                Node::Scalar(v) => section.param = Some(v),
                Node::Flag => section.param = None,
                other => {
                    return Err(de::Error::custom(format!(
                        "section parameter \"{PARAM_KEY}\" must be a scalar, found a {}",
                        other.kind()
                    )));
                }
            }
        } else {
            let node = map.next_value::<Node>()?;
            section.insert(&key, node);
        }
    }
    Ok(section)
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NodeVisitor)
    }
}

struct SectionVisitor;

impl<'de> Visitor<'de> for SectionVisitor {
    type Value = Section;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a section object")
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Section, A::Error> {
        section_from_map(map)
    }
}

impl<'de> Deserialize<'de> for Section {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SectionVisitor)
    }
}

struct TreeVisitor;

impl<'de> Visitor<'de> for TreeVisitor {
    type Value = ConfigTree;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object mapping top-level section names to sections")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<ConfigTree, A::Error> {
        let mut tree = ConfigTree::new();
        while let Some(name) = map.next_key::<String>()? {
            let node = map.next_value::<Node>()?;
            let valid = match &node {
                Node::Section(_) => true,
                Node::Sequence(items) => !items.is_empty() && items.iter().all(Node::is_section),
                _ => false,
            };
            if !valid {
                return Err(de::Error::custom(format!(
                    "top-level entry \"{name}\" must be a section object, found a {}",
                    node.kind()
                )));
            }
            insert_repeating(&mut tree.sections, name.to_lowercase(), node);
        }
        Ok(tree)
    }
}

impl<'de> Deserialize<'de> for ConfigTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(TreeVisitor)
    }
}
