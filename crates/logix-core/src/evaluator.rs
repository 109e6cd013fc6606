//! Tree evaluator
//!
//! Walks a configuration tree bottom-up and returns a new tree with every
//! operator key resolved. The input is never modified.

use crate::conditional::{Branch, ChainScanner};
use crate::config::EvalOptions;
use crate::context::{EvalContext, PathSegment};
use crate::error::{Error, Result};
use crate::keys::{KeyKind, PromotionKey};
use crate::logic::{BoolOp, evaluate_bool_op, evaluate_not};
use crate::node::{Mapping, Node};
use crate::promote::{self, Promotion};

/// Evaluate `root` with default options
pub fn evaluate(root: &Node) -> Result<Node> {
    evaluate_with(root, &EvalOptions::default())
}

/// Evaluate `root` with explicit options.
///
/// Scalars come back unchanged. Each call gets its own [`EvalContext`], so
/// calls on different trees may run concurrently.
pub fn evaluate_with(root: &Node, options: &EvalOptions) -> Result<Node> {
    tracing::debug!("Evaluating {} root", root.shape());
    let mut ctx = EvalContext::new(options);
    evaluate_node(root, &mut ctx)
}

/// Parse a YAML document and evaluate it
pub fn evaluate_yaml_str(text: &str, options: &EvalOptions) -> Result<Node> {
    let root = Node::from_yaml_str(text)?;
    evaluate_with(&root, options)
}

pub(crate) fn evaluate_node(node: &Node, ctx: &mut EvalContext) -> Result<Node> {
    match node {
        Node::Mapping(mapping) => evaluate_mapping(mapping, ctx),
        Node::Sequence(items) => evaluate_sequence(items, ctx),
        Node::Scalar(_) => Ok(node.clone()),
    }
}

fn evaluate_mapping(mapping: &Mapping, ctx: &mut EvalContext) -> Result<Node> {
    if let Some((kind, key)) = KeyKind::operator_of(mapping) {
        if mapping.len() > 1 {
            return Err(Error::MultipleOperatorKeys {
                path: ctx.path_string(),
                operator: key.to_string(),
                keys: mapping.keys().cloned().collect(),
            });
        }
        let operand = &mapping[key];
        return ctx.descend(PathSegment::key(key), |ctx| {
            ctx.trace(format_args!("{}", kind));
            match (BoolOp::from_kind(kind), kind) {
                (Some(op), _) => evaluate_bool_op(op, operand, ctx),
                (None, KeyKind::Not) => evaluate_not(operand, ctx),
                // A conditional outside a sequence is evaluated as its
                // value; the chain only applies to sequence items.
                (None, _) => evaluate_node(operand, ctx),
            }
        });
    }

    let mut output = Mapping::with_capacity(mapping.len());
    let mut promotions = Vec::new();
    for (key, value) in mapping {
        if let Some(parsed) = PromotionKey::parse(key) {
            promotions.push(Promotion {
                key,
                parsed,
                raw: value,
            });
            continue;
        }
        let evaluated = ctx.descend(PathSegment::key(key.as_str()), |ctx| evaluate_node(value, ctx))?;
        output.insert(key.clone(), evaluated);
    }

    if promotions.is_empty() {
        return Ok(Node::Mapping(output));
    }
    promote::resolve(output, promotions, mapping.len() == 1, ctx)
}

fn evaluate_sequence(items: &[Node], ctx: &mut EvalContext) -> Result<Node> {
    let mut output = Vec::with_capacity(items.len());
    let mut chain = ChainScanner::new();
    for (index, item) in items.iter().enumerate() {
        let conditional =
            Branch::of(item).and_then(|branch| Some((branch, item.get(branch.as_str())?)));
        ctx.descend(PathSegment::Index(index), |ctx| match conditional {
            Some((branch, operand)) => ctx.descend(PathSegment::key(branch.as_str()), |ctx| {
                let evaluated = evaluate_node(operand, ctx)?;
                chain.step(branch, evaluated, &mut output, ctx)
            }),
            None => {
                let evaluated = evaluate_node(item, ctx)?;
                chain.reset();
                output.push(evaluated);
                Ok(())
            }
        })?;
    }
    Ok(Node::Sequence(output))
}
