//! Deep-merge engine
//!
//! Combines same-shaped values:
//!
//! - Sequences are concatenated in argument order, fully flattened when
//!   `recursive` is set, and reduced to first occurrences when `dedup` is
//!   set. Dedup compares by structural equality, so mappings and nested
//!   sequences deduplicate too.
//! - Mappings are unioned left to right. Without `recursive` the later value
//!   wins on a collision; with it, colliding sequences and colliding mappings
//!   are merged again and anything else is overwritten.
//!
//! The same primitives back promotion keys and are public for other
//! transforms that need to merge their own value sets.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::keys::PromotionMode;
use crate::node::{Mapping, Node};

/// `levels` value for [`flatten`] that removes all nesting
pub const FULL_DEPTH: usize = usize::MAX;

/// Flags of a merge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOptions {
    /// Keep only the first occurrence of structurally equal list items
    #[serde(default = "default_true")]
    pub dedup: bool,

    /// Flatten joined lists and merge colliding mapping values
    #[serde(default = "default_true")]
    pub recursive: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            dedup: true,
            recursive: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl MergeOptions {
    /// Options from explicit flags
    pub fn new(dedup: bool, recursive: bool) -> Self {
        Self { dedup, recursive }
    }

    /// Flags implied by a promotion key modifier
    pub fn for_promotion(mode: PromotionMode) -> Self {
        match mode {
            PromotionMode::Replace => Self::new(false, false),
            PromotionMode::Merge => Self::new(false, true),
            PromotionMode::MergeDedup => Self::new(true, true),
        }
    }
}

/// A set of values to merge, with the key they are merged for
#[derive(Debug, Clone)]
pub struct MergeRequest {
    /// Values to merge; all sequences or all mappings
    pub values: Vec<Node>,
    /// Merge flags
    pub options: MergeOptions,
    /// Key the merge is performed for, used in error messages
    pub context: String,
}

impl MergeRequest {
    /// Create a request
    pub fn new(values: Vec<Node>, options: MergeOptions, context: impl Into<String>) -> Self {
        Self {
            values,
            options,
            context: context.into(),
        }
    }

    /// Perform the merge
    pub fn run(self) -> Result<Node> {
        deep_merge(self.values, self.options, &self.context)
    }
}

/// Merge `values`, which must all be sequences or all be mappings.
///
/// An empty input merges to an empty sequence. Scalars cannot be merged.
pub fn deep_merge(values: Vec<Node>, options: MergeOptions, context: &str) -> Result<Node> {
    let Some(first) = values.first() else {
        return Ok(Node::Sequence(Vec::new()));
    };
    match first {
        Node::Sequence(_) => merge_sequences(values, options, context).map(Node::Sequence),
        Node::Mapping(_) => merge_mappings(values, options, context).map(Node::Mapping),
        Node::Scalar(_) => Err(Error::MergeTypeMismatch {
            context: context.to_string(),
            expected: "sequences or mappings".to_string(),
            found: first.type_name().to_string(),
        }),
    }
}

fn merge_sequences(values: Vec<Node>, options: MergeOptions, context: &str) -> Result<Vec<Node>> {
    check_shape(&values, "sequences", context, |v| matches!(v, Node::Sequence(_)))?;

    let mut merged = Vec::new();
    for value in values {
        merged.extend(value.into_items());
    }
    if options.recursive {
        merged = flatten(merged, FULL_DEPTH);
    }
    if options.dedup {
        merged = dedup(merged);
    }
    Ok(merged)
}

fn merge_mappings(values: Vec<Node>, options: MergeOptions, context: &str) -> Result<Mapping> {
    check_shape(&values, "mappings", context, |v| matches!(v, Node::Mapping(_)))?;

    let mut merged = Mapping::new();
    for value in values {
        let Node::Mapping(entries) = value else {
            continue;
        };
        for (key, incoming) in entries {
            if options.recursive {
                if let Some(existing) = merged.get_mut(&key) {
                    let current = std::mem::take(existing);
                    let nested_context = format!("{}.{}", context, key);
                    *existing = merge_colliding(current, incoming, options, &nested_context)?;
                    continue;
                }
            }
            merged.insert(key, incoming);
        }
    }
    Ok(merged)
}

fn merge_colliding(
    existing: Node,
    incoming: Node,
    options: MergeOptions,
    context: &str,
) -> Result<Node> {
    match (existing, incoming) {
        (existing @ Node::Sequence(_), incoming @ Node::Sequence(_)) => {
            merge_sequences(vec![existing, incoming], options, context).map(Node::Sequence)
        }
        (existing @ Node::Mapping(_), incoming @ Node::Mapping(_)) => {
            merge_mappings(vec![existing, incoming], options, context).map(Node::Mapping)
        }
        (_, incoming) => Ok(incoming),
    }
}

fn check_shape(
    values: &[Node],
    expected: &str,
    context: &str,
    is_expected: impl Fn(&Node) -> bool,
) -> Result<()> {
    match values.iter().find(|v| !is_expected(v)) {
        Some(offender) => Err(Error::MergeTypeMismatch {
            context: context.to_string(),
            expected: expected.to_string(),
            found: offender.type_name().to_string(),
        }),
        None => Ok(()),
    }
}

/// Splice nested sequences into their parent, up to `levels` deep.
///
/// `levels == 0` returns the items unchanged; [`FULL_DEPTH`] removes all
/// nesting.
pub fn flatten(items: Vec<Node>, levels: usize) -> Vec<Node> {
    let mut flat = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Node::Sequence(inner) if levels > 0 => flat.extend(flatten(inner, levels - 1)),
            other => flat.push(other),
        }
    }
    flat
}

/// Keep the first occurrence of each structurally equal item, in order.
///
/// Quadratic; items may be mappings or sequences, which have no hash.
pub fn dedup(items: Vec<Node>) -> Vec<Node> {
    let mut unique: Vec<Node> = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(value: serde_json::Value) -> Node {
        Node::from(value)
    }

    const JOIN: MergeOptions = MergeOptions {
        dedup: false,
        recursive: true,
    };

    #[test]
    fn test_sequences_concatenate_in_order() {
        let merged = deep_merge(vec![node(json!([1, 2])), node(json!([2, 3]))], JOIN, "a").unwrap();
        assert_eq!(merged, node(json!([1, 2, 2, 3])));
    }

    #[test]
    fn test_sequences_dedup_keeps_first_occurrence() {
        let merged = deep_merge(
            vec![node(json!([3, 1, 2])), node(json!([2, 3, 4]))],
            MergeOptions::new(true, true),
            "a",
        )
        .unwrap();
        assert_eq!(merged, node(json!([3, 1, 2, 4])));
    }

    #[test]
    fn test_dedup_compares_structurally() {
        let items = node(json!([{"a": 1}, [1, 2], {"a": 1}, [1, 2], {"a": 2}])).into_items();
        assert_eq!(dedup(items), node(json!([{"a": 1}, [1, 2], {"a": 2}])).into_items());
    }

    #[test]
    fn test_recursive_sequence_merge_flattens_fully() {
        let merged = deep_merge(
            vec![node(json!([1, [2, [3, [4]]]])), node(json!([[5]]))],
            JOIN,
            "a",
        )
        .unwrap();
        assert_eq!(merged, node(json!([1, 2, 3, 4, 5])));
    }

    #[test]
    fn test_non_recursive_sequence_merge_keeps_nesting() {
        let merged = deep_merge(
            vec![node(json!([1, [2]])), node(json!([[2]]))],
            MergeOptions::new(true, false),
            "a",
        )
        .unwrap();
        assert_eq!(merged, node(json!([1, [2]])));
    }

    #[test]
    fn test_shallow_mapping_merge_later_wins() {
        let merged = deep_merge(
            vec![
                node(json!({"a": {"x": 1}, "b": [1]})),
                node(json!({"a": {"y": 2}, "c": 3})),
            ],
            MergeOptions::new(false, false),
            "m",
        )
        .unwrap();
        assert_eq!(merged, node(json!({"a": {"y": 2}, "b": [1], "c": 3})));
    }

    #[test]
    fn test_recursive_mapping_merge() {
        let merged = deep_merge(
            vec![
                node(json!({"a": {"x": 1, "l": [1]}, "s": "old", "k": [1]})),
                node(json!({"a": {"y": 2, "l": [1, 2]}, "s": "new", "k": {"now": "map"}})),
            ],
            MergeOptions::new(true, true),
            "m",
        )
        .unwrap();
        assert_eq!(
            merged,
            node(json!({
                "a": {"x": 1, "l": [1, 2], "y": 2},
                "s": "new",
                "k": {"now": "map"}
            }))
        );
    }

    #[test]
    fn test_recursive_mapping_merge_keeps_key_position() {
        let merged = deep_merge(
            vec![node(json!({"first": [1], "second": 2})), node(json!({"first": [3]}))],
            JOIN,
            "m",
        )
        .unwrap();
        let keys: Vec<&str> = merged
            .as_mapping()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["first", "second"]);
    }

    #[test]
    fn test_mixed_shapes_fail() {
        let err = deep_merge(vec![node(json!([1])), node(json!({"a": 1}))], JOIN, "pkgs").unwrap_err();
        match err {
            Error::MergeTypeMismatch {
                context,
                expected,
                found,
            } => {
                assert_eq!(context, "pkgs");
                assert_eq!(expected, "sequences");
                assert_eq!(found, "mapping");
            }
            other => panic!("Expected MergeTypeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_scalars_cannot_merge() {
        let err = deep_merge(vec![node(json!(1)), node(json!(2))], JOIN, "n").unwrap_err();
        assert!(matches!(err, Error::MergeTypeMismatch { .. }));
    }

    #[test]
    fn test_empty_merge_is_empty_sequence() {
        assert_eq!(deep_merge(vec![], JOIN, "e").unwrap(), Node::Sequence(vec![]));
    }

    #[test]
    fn test_flatten_respects_levels() {
        let items = node(json!([1, [2, [3, [4]]]])).into_items();
        assert_eq!(flatten(items.clone(), 0), items);
        assert_eq!(flatten(items.clone(), 1), node(json!([1, 2, [3, [4]]])).into_items());
        assert_eq!(flatten(items.clone(), 2), node(json!([1, 2, 3, [4]])).into_items());
        assert_eq!(flatten(items, FULL_DEPTH), node(json!([1, 2, 3, 4])).into_items());
    }

    #[test]
    fn test_merge_request_runs_deep_merge() {
        let request = MergeRequest::new(
            vec![node(json!({"a": [1]})), node(json!({"a": [1, 2]}))],
            MergeOptions::default(),
            "vars",
        );
        assert_eq!(request.run().unwrap(), node(json!({"a": [1, 2]})));
    }

    #[test]
    fn test_promotion_flags() {
        assert_eq!(
            MergeOptions::for_promotion(PromotionMode::Replace),
            MergeOptions::new(false, false)
        );
        assert_eq!(
            MergeOptions::for_promotion(PromotionMode::Merge),
            MergeOptions::new(false, true)
        );
        assert_eq!(
            MergeOptions::for_promotion(PromotionMode::MergeDedup),
            MergeOptions::new(true, true)
        );
    }
}
