//! Node model for configuration trees
//!
//! A [`Node`] is exactly one of a mapping (string keys, insertion order
//! preserved), a sequence, or a scalar. Booleans are the only scalars the
//! evaluator looks inside; everything else passes through untouched.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::context::{KeyPath, PathSegment};
use crate::error::{Error, Result};

/// Ordered string-keyed mapping
pub type Mapping = IndexMap<String, Node>;

/// A value in a configuration tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    /// Ordered mapping of string keys to nodes
    Mapping(Mapping),
    /// Ordered list of nodes
    Sequence(Vec<Node>),
    /// Leaf value
    Scalar(Scalar),
}

/// Leaf value of a configuration tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// `null` / `~`
    Null,
    /// `true` / `false`
    Bool(bool),
    /// Integer or float
    Number(serde_yaml::Number),
    /// Any string
    String(String),
}

/// Top-level shape of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// [`Node::Mapping`]
    Mapping,
    /// [`Node::Sequence`]
    Sequence,
    /// [`Node::Scalar`]
    Scalar,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Shape::Mapping => "mapping",
            Shape::Sequence => "sequence",
            Shape::Scalar => "scalar",
        })
    }
}

impl Node {
    /// The `null` scalar
    pub fn null() -> Self {
        Node::Scalar(Scalar::Null)
    }

    /// Top-level shape
    pub fn shape(&self) -> Shape {
        match self {
            Node::Mapping(_) => Shape::Mapping,
            Node::Sequence(_) => Shape::Sequence,
            Node::Scalar(_) => Shape::Scalar,
        }
    }

    /// Human-readable type name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Mapping(_) => "mapping",
            Node::Sequence(_) => "sequence",
            Node::Scalar(Scalar::Null) => "null",
            Node::Scalar(Scalar::Bool(_)) => "boolean",
            Node::Scalar(Scalar::Number(_)) => "number",
            Node::Scalar(Scalar::String(_)) => "string",
        }
    }

    /// The boolean value, if this is a boolean scalar
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Node::Scalar(Scalar::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// The string value, if this is a string scalar
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    /// The entries, if this is a mapping
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Node::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// The items, if this is a sequence
    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self {
            Node::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a key, if this is a mapping
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_mapping().and_then(|m| m.get(key))
    }

    /// Sequence items, or this node wrapped as a one-element list
    pub fn into_items(self) -> Vec<Node> {
        match self {
            Node::Sequence(items) => items,
            other => vec![other],
        }
    }

    /// Inverse of [`Node::into_items`]: a single item is unwrapped,
    /// anything else becomes a sequence.
    pub fn from_items(items: Vec<Node>) -> Node {
        match <[Node; 1]>::try_from(items) {
            Ok([only]) => only,
            Err(items) => Node::Sequence(items),
        }
    }

    /// Convert a parsed YAML value, stringifying scalar mapping keys.
    ///
    /// Tagged values and non-scalar keys fail with
    /// [`Error::UnsupportedType`].
    pub fn from_yaml(value: serde_yaml::Value) -> Result<Node> {
        let mut path = KeyPath::root();
        from_yaml_at(value, &mut path)
    }

    /// Parse a YAML document into a node
    pub fn from_yaml_str(text: &str) -> Result<Node> {
        let value: serde_yaml::Value = serde_yaml::from_str(text)?;
        Node::from_yaml(value)
    }
}

impl Default for Node {
    fn default() -> Self {
        Node::null()
    }
}

fn from_yaml_at(value: serde_yaml::Value, path: &mut KeyPath) -> Result<Node> {
    use serde_yaml::Value;

    Ok(match value {
        Value::Null => Node::null(),
        Value::Bool(b) => Node::Scalar(Scalar::Bool(b)),
        Value::Number(n) => Node::Scalar(Scalar::Number(n)),
        Value::String(s) => Node::Scalar(Scalar::String(s)),
        Value::Sequence(items) => {
            let mut nodes = Vec::with_capacity(items.len());
            for (index, item) in items.into_iter().enumerate() {
                path.push(PathSegment::Index(index));
                let node = from_yaml_at(item, path);
                path.pop();
                nodes.push(node?);
            }
            Node::Sequence(nodes)
        }
        Value::Mapping(entries) => {
            let mut mapping = Mapping::with_capacity(entries.len());
            for (key, item) in entries {
                let key = match key {
                    Value::String(s) => s,
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    Value::Null => "null".to_string(),
                    other => {
                        return Err(Error::UnsupportedType {
                            path: path.to_string(),
                            found: format!("non-scalar mapping key {:?}", other),
                        });
                    }
                };
                path.push(PathSegment::Key(key.clone()));
                let node = from_yaml_at(item, path);
                path.pop();
                mapping.insert(key, node?);
            }
            Node::Mapping(mapping)
        }
        Value::Tagged(tagged) => {
            return Err(Error::UnsupportedType {
                path: path.to_string(),
                found: format!("tagged value {}", tagged.tag),
            });
        }
    })
}

impl TryFrom<serde_yaml::Value> for Node {
    type Error = Error;

    fn try_from(value: serde_yaml::Value) -> Result<Self> {
        Node::from_yaml(value)
    }
}

impl From<serde_json::Value> for Node {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Node::null(),
            Value::Bool(b) => b.into(),
            Value::Number(n) => {
                let number = if let Some(i) = n.as_i64() {
                    serde_yaml::Number::from(i)
                } else if let Some(u) = n.as_u64() {
                    serde_yaml::Number::from(u)
                } else {
                    serde_yaml::Number::from(n.as_f64().unwrap_or(f64::NAN))
                };
                Node::Scalar(Scalar::Number(number))
            }
            Value::String(s) => s.into(),
            Value::Array(items) => Node::Sequence(items.into_iter().map(Node::from).collect()),
            Value::Object(entries) => Node::Mapping(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Node::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Node> for serde_yaml::Value {
    fn from(node: Node) -> Self {
        use serde_yaml::Value;

        match node {
            Node::Mapping(entries) => Value::Mapping(
                entries
                    .into_iter()
                    .map(|(k, v)| (Value::String(k), Value::from(v)))
                    .collect(),
            ),
            Node::Sequence(items) => Value::Sequence(items.into_iter().map(Value::from).collect()),
            Node::Scalar(Scalar::Null) => Value::Null,
            Node::Scalar(Scalar::Bool(b)) => Value::Bool(b),
            Node::Scalar(Scalar::Number(n)) => Value::Number(n),
            Node::Scalar(Scalar::String(s)) => Value::String(s),
        }
    }
}

impl From<Node> for serde_json::Value {
    fn from(node: Node) -> Self {
        use serde_json::Value;

        match node {
            Node::Mapping(entries) => Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
            Node::Sequence(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Node::Scalar(Scalar::Null) => Value::Null,
            Node::Scalar(Scalar::Bool(b)) => Value::Bool(b),
            Node::Scalar(Scalar::Number(n)) => {
                if let Some(i) = n.as_i64() {
                    Value::from(i)
                } else if let Some(u) = n.as_u64() {
                    Value::from(u)
                } else {
                    n.as_f64()
                        .and_then(serde_json::Number::from_f64)
                        .map(Value::Number)
                        .unwrap_or(Value::Null)
                }
            }
            Node::Scalar(Scalar::String(s)) => Value::String(s),
        }
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Scalar(Scalar::Bool(b))
    }
}

impl From<i64> for Node {
    fn from(i: i64) -> Self {
        Node::Scalar(Scalar::Number(i.into()))
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::Scalar(Scalar::String(s.to_string()))
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::Scalar(Scalar::String(s))
    }
}

impl From<Vec<Node>> for Node {
    fn from(items: Vec<Node>) -> Self {
        Node::Sequence(items)
    }
}

impl From<Mapping> for Node {
    fn from(entries: Mapping) -> Self {
        Node::Mapping(entries)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("null"),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::String(s) => write!(f, "{:?}", s),
        }
    }
}

/// Compact flow-style rendering, e.g. `{a: [true, "x"]}`
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Mapping(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("}")
            }
            Node::Sequence(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Node::Scalar(scalar) => write!(f, "{}", scalar),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_yaml_preserves_key_order() {
        let node = Node::from_yaml_str("zeta: 1\nalpha: 2\nmid: 3\n").unwrap();
        let keys: Vec<&str> = node
            .as_mapping()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_from_yaml_stringifies_scalar_keys() {
        let node = Node::from_yaml_str("1: one\ntrue: yes\n").unwrap();
        assert_eq!(node.get("1"), Some(&Node::from("one")));
        assert_eq!(node.get("true"), Some(&Node::from("yes")));
    }

    #[test]
    fn test_from_yaml_rejects_tagged_values() {
        let err = Node::from_yaml_str("outer:\n  - !custom 5\n").unwrap_err();
        match err {
            Error::UnsupportedType { path, found } => {
                assert_eq!(path, "outer[0]");
                assert!(found.contains("!custom"));
            }
            other => panic!("Expected UnsupportedType, got {other:?}"),
        }
    }

    #[test]
    fn test_json_round_trip_keeps_shape() {
        let value = json!({"a": [1, 2.5, "x", null, true], "b": {"c": -3}});
        let node = Node::from(value.clone());
        assert_eq!(serde_json::Value::from(node), value);
    }

    #[test]
    fn test_yaml_and_json_agree() {
        let from_yaml = Node::from_yaml_str("a:\n  - 1\n  - x\nb: false\n").unwrap();
        let from_json = Node::from(json!({"a": [1, "x"], "b": false}));
        assert_eq!(from_yaml, from_json);
    }

    #[test]
    fn test_deserialize_untagged_from_json() {
        let node: Node = serde_json::from_str(r#"{"a": [true, 1, "s", null]}"#).unwrap();
        assert_eq!(node, Node::from(json!({"a": [true, 1, "s", null]})));
    }

    #[test]
    fn test_items_helpers() {
        assert_eq!(Node::from(true).into_items(), vec![Node::from(true)]);
        assert_eq!(Node::from_items(vec![Node::from(1)]), Node::from(1));
        assert_eq!(
            Node::from_items(vec![Node::from(1), Node::from(2)]),
            Node::from(json!([1, 2]))
        );
        assert_eq!(Node::from_items(vec![]), Node::Sequence(vec![]));
    }

    #[test]
    fn test_display_is_flow_style() {
        let node = Node::from(json!({"a": [true, "x"], "b": null}));
        assert_eq!(node.to_string(), r#"{a: [true, "x"], b: null}"#);
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Node::from(json!({})).type_name(), "mapping");
        assert_eq!(Node::from(json!([])).type_name(), "sequence");
        assert_eq!(Node::from(json!(1)).type_name(), "number");
        assert_eq!(Node::null().type_name(), "null");
        assert_eq!(Node::from(json!({})).shape(), Shape::Mapping);
    }
}
