use super::template::{Parameters, substitute};
use crate::io::error::{Error, FormatError};
use crate::model::tree::{ConfigTree, Node, POSITIONAL_KEY, Section};
use crate::model::value::Value;
use indexmap::IndexMap;
use std::io::Write;
use tracing::debug;

const INDENT: &str = "   ";

pub fn write<W: Write>(mut writer: W, tree: &ConfigTree, params: &Parameters) -> Result<(), Error> {
    let text = generate(tree, params)?;
    writer.write_all(text.as_bytes())?;
    if !text.is_empty() {
        writer.write_all(b"\n")?;
    }
    Ok(())
}

/// Renders `tree` as input text in canonical order: within every section,
/// keywords come before subsections and each group is sorted by name.
///
/// The result has no trailing newline. Parameter placeholders are
/// substituted after rendering.
pub fn generate(tree: &ConfigTree, params: &Parameters) -> Result<String, FormatError> {
    let mut lines = Vec::new();
    emit_entries(&tree.sections, 0, &mut lines)?;
    debug!(lines = lines.len(), "generated CP2K input");
    substitute(&lines.join("\n"), params)
}

fn emit_entries(
    entries: &IndexMap<String, Node>,
    level: usize,
    out: &mut Vec<String>,
) -> Result<(), FormatError> {
    let mut ordered: Vec<_> = entries.iter().collect();
    ordered.sort_by_cached_key(|(key, node)| (node.is_section_like(), key.to_lowercase()));

    for (key, node) in ordered {
        emit_node(key, node, level, out)?;
    }
    Ok(())
}

fn emit_node(key: &str, node: &Node, level: usize, out: &mut Vec<String>) -> Result<(), FormatError> {
    let indent = INDENT.repeat(level);
    match node {
        Node::Section(section) => emit_section(key, section, level, out)?,
        Node::Sequence(items) => emit_sequence(key, items, level, out)?,
        Node::Tuple(values) => out.push(format!("{indent}{}", keyword_line(key, values)?)),
        Node::Scalar(value) => {
            out.push(format!("{indent}{}", keyword_line(key, std::slice::from_ref(value))?))
        }
        Node::Flag if key == POSITIONAL_KEY => {
            return Err(FormatError::shape(key, "positional rows must carry values"));
        }
        Node::Flag => out.push(format!("{indent}{}", key.to_uppercase())),
    }
    Ok(())
}

fn emit_section(
    key: &str,
    section: &Section,
    level: usize,
    out: &mut Vec<String>,
) -> Result<(), FormatError> {
    let indent = INDENT.repeat(level);
    let name = key.to_uppercase();
    match &section.param {
        Some(param) => out.push(format!("{indent}&{name} {param}")),
        None => out.push(format!("{indent}&{name}")),
    }
    emit_entries(&section.entries, level + 1, out)?;
    out.push(format!("{indent}&END {name}"));
    Ok(())
}

fn emit_sequence(
    key: &str,
    items: &[Node],
    level: usize,
    out: &mut Vec<String>,
) -> Result<(), FormatError> {
    let indent = INDENT.repeat(level);
    match items.first() {
        None => Err(FormatError::shape(key, "empty sequence has no text form")),
        Some(Node::Section(_)) => items.iter().try_for_each(|item| match item {
            Node::Section(section) => emit_section(key, section, level, out),
            other => Err(mixed(key, "section", other)),
        }),
        Some(_) if items.iter().all(|item| matches!(item, Node::Scalar(_))) => {
            let values: Vec<_> = items.iter().filter_map(Node::as_scalar).cloned().collect();
            out.push(format!("{indent}{}", keyword_line(key, &values)?));
            Ok(())
        }
        // Repeated keyword lines of differing shapes stay one line each.
        Some(_) => items.iter().try_for_each(|item| {
            let line = match item {
                Node::Flag if key == POSITIONAL_KEY => {
                    return Err(FormatError::shape(key, "positional rows must carry values"));
                }
                Node::Flag => key.to_uppercase(),
                Node::Scalar(value) => keyword_line(key, std::slice::from_ref(value))?,
                Node::Tuple(values) => keyword_line(key, values)?,
                Node::Sequence(row) => keyword_line(key, &scalar_row(key, row)?)?,
                other => return Err(mixed(key, "keyword", other)),
            };
            out.push(format!("{indent}{line}"));
            Ok(())
        }),
    }
}

/// Values of a row given as a nested sequence; only scalars qualify.
fn scalar_row(key: &str, row: &[Node]) -> Result<Vec<Value>, FormatError> {
    row.iter()
        .map(|node| {
            node.as_scalar()
                .cloned()
                .ok_or_else(|| FormatError::shape(key, format!("row contains a {}", node.kind())))
        })
        .collect()
}

fn mixed(key: &str, expected: &str, found: &Node) -> FormatError {
    FormatError::shape(
        key,
        format!("sequence of {expected}s also contains a {}", found.kind()),
    )
}

/// `KEY v1 v2 ...`, or just the values for positional rows.
fn keyword_line(key: &str, values: &[Value]) -> Result<String, FormatError> {
    if values.is_empty() {
        return Err(FormatError::shape(key, "empty tuple has no text form"));
    }
    let joined = values
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    if key == POSITIONAL_KEY {
        Ok(joined)
    } else {
        Ok(format!("{} {joined}", key.to_uppercase()))
    }
}
