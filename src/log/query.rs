use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

static SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<key>[^\[\]]*)(?:\[(?P<index>[\d\[\]]+)\])?$").expect("segment pattern is valid")
});

/// Looks up `path` in `data`.
///
/// `.` selects everything, `.a.b` walks nested keys and `a[1][0]` indexes
/// into arrays, strings (by character) and objects (as key-sorted
/// `[key, value]` pairs). Anything that cannot be resolved yields an empty
/// object.
pub fn query(data: &Value, path: &str) -> Value {
    resolve(data, path).unwrap_or_else(|| Value::Object(Map::new()))
}

fn resolve(data: &Value, path: &str) -> Option<Value> {
    let mut segments = path.split('.');
    if !segments.next()?.is_empty() {
        return None;
    }
    let segments: Vec<_> = segments.collect();
    match segments.as_slice() {
        [] => return None,
        [""] => return Some(data.clone()),
        _ => {}
    }

    let mut current = data.clone();
    for segment in segments {
        let caps = SEGMENT.captures(segment)?;
        current = match current {
            Value::Object(mut map) => map.remove(&caps["key"])?,
            _ => return None,
        };
        if let Some(indexes) = caps.name("index") {
            for index in indexes.as_str().split("][") {
                current = index_into(current, index.parse().ok()?)?;
            }
        }
    }
    Some(current)
}

fn index_into(value: Value, index: usize) -> Option<Value> {
    match value {
        Value::Array(items) => items.into_iter().nth(index),
        Value::Object(map) => {
            let mut pairs: Vec<_> = map.into_iter().collect();
            pairs.sort_by(|a, b| a.0.cmp(&b.0));
            let (key, value) = pairs.into_iter().nth(index)?;
            Some(Value::Array(vec![Value::String(key), value]))
        }
        Value::String(text) => text
            .chars()
            .nth(index)
            .map(|c| Value::String(c.to_string())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> Value {
        json!({
            "GLOBAL": {"Run type": "ENERGY", "Method name": "CP2K"},
            "PROGRAM": {"STARTED AT": "2015-06-09 10:27:34.151"},
            "list": [[1, 2], [3, 4]]
        })
    }

    #[test]
    fn dot_returns_everything() {
        assert_eq!(query(&store(), "."), store());
    }

    #[test]
    fn nested_keys_are_case_sensitive() {
        assert_eq!(query(&store(), ".GLOBAL.Run type"), json!("ENERGY"));
        assert_eq!(query(&store(), ".global"), json!({}));
    }

    #[test]
    fn indexes_walk_arrays_objects_and_strings() {
        assert_eq!(query(&store(), ".list[1][0]"), json!(3));
        assert_eq!(
            query(&store(), ".GLOBAL[0]"),
            json!(["Method name", "CP2K"])
        );
        assert_eq!(query(&store(), ".GLOBAL[1][1]"), json!("ENERGY"));
        assert_eq!(query(&store(), ".PROGRAM.STARTED AT[3]"), json!("5"));
    }

    #[test]
    fn unresolvable_paths_give_an_empty_object() {
        for path in [
            ".nonexistent.deep.path",
            "GLOBAL",
            "",
            ".list[7]",
            ".list[0].x",
            ".GLOBAL.",
            ".GLOBAL[x]",
        ] {
            assert_eq!(query(&store(), path), json!({}), "path {path:?}");
        }
    }
}
