//! `if` / `elif` / `else` chains inside sequences
//!
//! A chain is a run of adjacent single-key `if`/`elif`/`else` items in one
//! sequence. Each item's value is evaluated first; `if` and `elif` values
//! must then be a list whose first element is the boolean condition and
//! whose remaining elements are the body. An `else` value is all body.
//! Selected bodies are spliced into the enclosing sequence in place of the
//! chain.
//!
//! | state    | `if`                  | `elif`                | `else`        |
//! |----------|-----------------------|-----------------------|---------------|
//! | Looking  | emit if true          | orphan error          | orphan error  |
//! | Awaiting | emit if true          | emit if true          | emit, Looking |
//! | Skipping | emit if true          | stay Skipping         | Looking       |
//!
//! Wherever a condition is tested, true moves to Skipping and false to
//! Awaiting. An `if` seen while Skipping opens a new chain in place, so
//! chains do not need to nest lexically.

use std::fmt;

use crate::context::EvalContext;
use crate::error::{Error, Result};
use crate::keys::KeyKind;
use crate::node::Node;

/// Where the scanner is within a chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChainState {
    /// No chain open
    #[default]
    Looking,
    /// Chain open, no branch taken yet
    Awaiting,
    /// Chain open, a branch was taken; later `elif`/`else` are discarded
    Skipping,
}

/// One link of a chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    /// `if`
    If,
    /// `elif`
    Elif,
    /// `else`
    Else,
}

impl Branch {
    /// Branch for a single-key sequence item, if it is one
    pub fn of(item: &Node) -> Option<Self> {
        let mapping = item.as_mapping()?;
        if mapping.len() != 1 {
            return None;
        }
        let (key, _) = mapping.first()?;
        match KeyKind::classify(key) {
            KeyKind::If => Some(Branch::If),
            KeyKind::Elif => Some(Branch::Elif),
            KeyKind::Else => Some(Branch::Else),
            _ => None,
        }
    }

    /// Keyword text
    pub fn as_str(self) -> &'static str {
        match self {
            Branch::If => "if",
            Branch::Elif => "elif",
            Branch::Else => "else",
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State machine for one sequence evaluation pass
#[derive(Debug, Default)]
pub struct ChainScanner {
    state: ChainState,
}

impl ChainScanner {
    /// Scanner with no open chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn state(&self) -> ChainState {
        self.state
    }

    /// A non-conditional item ends any open chain
    pub fn reset(&mut self) {
        self.state = ChainState::Looking;
    }

    /// Feed one evaluated conditional item, appending any selected body to
    /// `output`.
    pub fn step(
        &mut self,
        branch: Branch,
        evaluated: Node,
        output: &mut Vec<Node>,
        ctx: &EvalContext,
    ) -> Result<()> {
        let from = self.state;

        // Validated before the state is consulted, so a malformed `elif`
        // fails even when its chain is being skipped.
        let (condition, body) = match branch {
            Branch::If | Branch::Elif => {
                let (condition, body) = split_condition(branch, evaluated, ctx)?;
                (Some(condition), body)
            }
            Branch::Else => (None, evaluated.into_items()),
        };

        let to = match (from, branch) {
            (ChainState::Looking, Branch::Elif | Branch::Else) => {
                return Err(Error::OrphanConditional {
                    path: ctx.path_string(),
                    keyword: branch.as_str().to_string(),
                });
            }
            (_, Branch::If) | (ChainState::Awaiting, Branch::Elif) => {
                if condition == Some(true) {
                    output.extend(body);
                    ChainState::Skipping
                } else {
                    ChainState::Awaiting
                }
            }
            (ChainState::Skipping, Branch::Elif) => ChainState::Skipping,
            (ChainState::Awaiting, Branch::Else) => {
                output.extend(body);
                ChainState::Looking
            }
            (ChainState::Skipping, Branch::Else) => ChainState::Looking,
        };

        ctx.trace(format_args!("{}: {:?} -> {:?}", branch, from, to));
        self.state = to;
        Ok(())
    }
}

/// Split an evaluated `if`/`elif` value into condition and body
fn split_condition(
    branch: Branch,
    evaluated: Node,
    ctx: &EvalContext,
) -> Result<(bool, Vec<Node>)> {
    let malformed = |found: &Node| Error::MalformedConditional {
        path: ctx.path_string(),
        keyword: branch.as_str().to_string(),
        found: found.to_string(),
    };
    match evaluated {
        Node::Sequence(items) if items.len() > 1 => match items[0].as_bool() {
            Some(condition) => Ok((condition, items.into_iter().skip(1).collect())),
            None => Err(malformed(&Node::Sequence(items))),
        },
        other => Err(malformed(&other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EvalOptions;
    use rstest::rstest;
    use serde_json::json;

    fn node(value: serde_json::Value) -> Node {
        Node::from(value)
    }

    fn scanner_in(state: ChainState) -> ChainScanner {
        ChainScanner { state }
    }

    fn step(
        scanner: &mut ChainScanner,
        branch: Branch,
        value: serde_json::Value,
    ) -> Result<Vec<Node>> {
        let ctx = EvalContext::new(&EvalOptions::default());
        let mut output = Vec::new();
        scanner.step(branch, node(value), &mut output, &ctx)?;
        Ok(output)
    }

    #[rstest]
    #[case(ChainState::Looking, Branch::If, json!([true, "A"]), vec!["A"], ChainState::Skipping)]
    #[case(ChainState::Looking, Branch::If, json!([false, "A"]), vec![], ChainState::Awaiting)]
    #[case(ChainState::Awaiting, Branch::If, json!([true, "A"]), vec!["A"], ChainState::Skipping)]
    #[case(ChainState::Awaiting, Branch::If, json!([false, "A"]), vec![], ChainState::Awaiting)]
    #[case(ChainState::Awaiting, Branch::Elif, json!([true, "B"]), vec!["B"], ChainState::Skipping)]
    #[case(ChainState::Awaiting, Branch::Elif, json!([false, "B"]), vec![], ChainState::Awaiting)]
    #[case(ChainState::Awaiting, Branch::Else, json!(["C", "D"]), vec!["C", "D"], ChainState::Looking)]
    #[case(ChainState::Skipping, Branch::If, json!([true, "A"]), vec!["A"], ChainState::Skipping)]
    #[case(ChainState::Skipping, Branch::If, json!([false, "A"]), vec![], ChainState::Awaiting)]
    #[case(ChainState::Skipping, Branch::Elif, json!([true, "B"]), vec![], ChainState::Skipping)]
    #[case(ChainState::Skipping, Branch::Elif, json!([false, "B"]), vec![], ChainState::Skipping)]
    #[case(ChainState::Skipping, Branch::Else, json!(["C"]), vec![], ChainState::Looking)]
    fn test_transition_table(
        #[case] from: ChainState,
        #[case] branch: Branch,
        #[case] value: serde_json::Value,
        #[case] emitted: Vec<&str>,
        #[case] to: ChainState,
    ) {
        let mut scanner = scanner_in(from);
        let output = step(&mut scanner, branch, value).unwrap();
        let expected: Vec<Node> = emitted.into_iter().map(Node::from).collect();
        assert_eq!(output, expected);
        assert_eq!(scanner.state(), to);
    }

    #[rstest]
    #[case(Branch::Elif, json!([true, "X"]))]
    #[case(Branch::Else, json!(["X"]))]
    fn test_orphans_fail_when_looking(#[case] branch: Branch, #[case] value: serde_json::Value) {
        let mut scanner = ChainScanner::new();
        let err = step(&mut scanner, branch, value).unwrap_err();
        match err {
            Error::OrphanConditional { keyword, .. } => assert_eq!(keyword, branch.as_str()),
            other => panic!("Expected OrphanConditional, got {other:?}"),
        }
    }

    #[rstest]
    #[case(json!([true]))]
    #[case(json!(["yes", "A"]))]
    #[case(json!(true))]
    #[case(json!({"a": 1}))]
    #[case(json!([]))]
    fn test_malformed_if(#[case] value: serde_json::Value) {
        let mut scanner = ChainScanner::new();
        let err = step(&mut scanner, Branch::If, value).unwrap_err();
        assert!(matches!(err, Error::MalformedConditional { .. }));
    }

    #[test]
    fn test_malformed_elif_fails_even_when_skipping() {
        let mut scanner = scanner_in(ChainState::Skipping);
        let err = step(&mut scanner, Branch::Elif, json!("oops")).unwrap_err();
        assert!(matches!(err, Error::MalformedConditional { .. }));
    }

    #[test]
    fn test_scalar_else_body_is_single_item() {
        let mut scanner = scanner_in(ChainState::Awaiting);
        let output = step(&mut scanner, Branch::Else, json!("only")).unwrap();
        assert_eq!(output, vec![Node::from("only")]);
    }

    #[test]
    fn test_body_keeps_nested_structure() {
        let mut scanner = ChainScanner::new();
        let output = step(&mut scanner, Branch::If, json!([true, {"a": 1}, [1, 2]])).unwrap();
        assert_eq!(output, vec![node(json!({"a": 1})), node(json!([1, 2]))]);
    }

    #[test]
    fn test_reset_closes_chain() {
        let mut scanner = scanner_in(ChainState::Awaiting);
        scanner.reset();
        assert_eq!(scanner.state(), ChainState::Looking);
    }

    #[test]
    fn test_branch_of_single_key_items() {
        assert_eq!(Branch::of(&node(json!({"if": [true, 1]}))), Some(Branch::If));
        assert_eq!(Branch::of(&node(json!({"elif": [true, 1]}))), Some(Branch::Elif));
        assert_eq!(Branch::of(&node(json!({"else": [1]}))), Some(Branch::Else));
        assert_eq!(Branch::of(&node(json!({"and": [true]}))), None);
        assert_eq!(Branch::of(&node(json!({"if": [true], "x": 1}))), None);
        assert_eq!(Branch::of(&node(json!("if"))), None);
    }
}
