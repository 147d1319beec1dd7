//! Order-insensitive structural comparison of JSON documents.
//!
//! Expected resource shapes are written as literals whose array ordering is
//! not meaningful (link lists, service name lists), while `kubectl` returns
//! them in whatever order the API server felt like. Both sides are
//! normalized by recursively sorting arrays on their canonical rendering
//! before a strict walk collects the differences.

use serde_json::Value;

use super::Result;

/// One difference between an expected and an observed document.
#[derive(Debug, PartialEq)]
pub struct Difference {
    /// Path to the differing node, such as `[1].spec.links[0].peer_intf`.
    pub path: String,
    pub expected: Option<Value>,
    pub actual: Option<Value>,
}

impl std::fmt::Display for Difference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.expected, &self.actual) {
            (Some(expected), Some(actual)) => {
                write!(f, "{}: expected {expected}, found {actual}", self.path)
            }
            (Some(expected), None) => write!(f, "{}: missing (expected {expected})", self.path),
            (None, Some(actual)) => write!(f, "{}: unexpected {actual}", self.path),
            (None, None) => write!(f, "{}", self.path),
        }
    }
}

fn normalize(value: &Value) -> Value {
    match value {
        Value::Array(items) => {
            let mut items: Vec<Value> = items.iter().map(normalize).collect();
            items.sort_by_cached_key(Value::to_string);
            Value::Array(items)
        }
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), normalize(value)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn collect(path: &str, expected: &Value, actual: &Value, differences: &mut Vec<Difference>) {
    match (expected, actual) {
        (Value::Object(expected_map), Value::Object(actual_map)) => {
            for (key, expected_value) in expected_map {
                match actual_map.get(key) {
                    Some(actual_value) => {
                        collect(&format!("{path}.{key}"), expected_value, actual_value, differences)
                    }
                    None => differences.push(Difference {
                        path: format!("{path}.{key}"),
                        expected: Some(expected_value.clone()),
                        actual: None,
                    }),
                }
            }
            for (key, actual_value) in actual_map {
                if !expected_map.contains_key(key) {
                    differences.push(Difference {
                        path: format!("{path}.{key}"),
                        expected: None,
                        actual: Some(actual_value.clone()),
                    });
                }
            }
        }
        (Value::Array(expected_items), Value::Array(actual_items)) => {
            for (index, (expected_item, actual_item)) in
                expected_items.iter().zip(actual_items).enumerate()
            {
                collect(
                    &format!("{path}[{index}]"),
                    expected_item,
                    actual_item,
                    differences,
                );
            }
            for (index, expected_item) in
                expected_items.iter().enumerate().skip(actual_items.len())
            {
                differences.push(Difference {
                    path: format!("{path}[{index}]"),
                    expected: Some(expected_item.clone()),
                    actual: None,
                });
            }
            for (index, actual_item) in actual_items.iter().enumerate().skip(expected_items.len())
            {
                differences.push(Difference {
                    path: format!("{path}[{index}]"),
                    expected: None,
                    actual: Some(actual_item.clone()),
                });
            }
        }
        _ => {
            if expected != actual {
                differences.push(Difference {
                    path: path.to_owned(),
                    expected: Some(expected.clone()),
                    actual: Some(actual.clone()),
                });
            }
        }
    }
}

/// Compare two documents, ignoring array ordering on both sides.
pub fn differences(expected: &Value, actual: &Value) -> Vec<Difference> {
    let mut found = Vec::new();
    collect("", &normalize(expected), &normalize(actual), &mut found);
    found
}

/// Fail with a readable report when the documents do not match.
pub fn assert_matches(expected: &Value, actual: &Value) -> Result<()> {
    let differences = differences(expected, actual);
    if differences.is_empty() {
        return Ok(());
    }
    let report: Vec<String> = differences
        .iter()
        .map(std::string::ToString::to_string)
        .collect();
    Err(format!("documents differ:\n  {}", report.join("\n  ")).into())
}
