//! Boolean operators: `and`, `or`, `xor`, `not`
//!
//! `and`/`or`/`xor` reduce their evaluated operand list to one boolean.
//! Nested lists inside the operand list are reduced with the same operator
//! first, so `{or: [[a, b], c]}` groups without another operator key.
//!
//! `not` maps instead of reducing: it negates every boolean it finds in the
//! evaluated value and leaves other scalars alone.

use crate::context::{EvalContext, PathSegment};
use crate::error::{Error, Result};
use crate::evaluator::evaluate_node;
use crate::keys::KeyKind;
use crate::node::{Node, Scalar};

/// A reducing boolean operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    /// True iff every operand is true
    And,
    /// True iff any operand is true
    Or,
    /// True iff exactly one operand is true
    Xor,
}

impl BoolOp {
    /// The reducing operator for a key, if it has one
    pub fn from_kind(kind: KeyKind) -> Option<Self> {
        match kind {
            KeyKind::And => Some(BoolOp::And),
            KeyKind::Or => Some(BoolOp::Or),
            KeyKind::Xor => Some(BoolOp::Xor),
            _ => None,
        }
    }

    /// Operator key text
    pub fn as_str(self) -> &'static str {
        match self {
            BoolOp::And => "and",
            BoolOp::Or => "or",
            BoolOp::Xor => "xor",
        }
    }

    fn combine(self, truths: usize, total: usize) -> bool {
        match self {
            BoolOp::And => truths == total,
            BoolOp::Or => truths > 0,
            BoolOp::Xor => truths == 1,
        }
    }
}

/// Evaluate the operand of `and`/`or`/`xor` and reduce it to a boolean
pub(crate) fn evaluate_bool_op(op: BoolOp, operand: &Node, ctx: &mut EvalContext) -> Result<Node> {
    let evaluated = evaluate_node(operand, ctx)?;
    let result = reduce(op, evaluated.into_items(), ctx)?;
    ctx.trace(format_args!("{} -> {}", op.as_str(), result));
    Ok(Node::from(result))
}

fn reduce(op: BoolOp, operands: Vec<Node>, ctx: &mut EvalContext) -> Result<bool> {
    let total = operands.len();
    let mut truths = 0;
    for (index, operand) in operands.into_iter().enumerate() {
        let truth = ctx.descend(PathSegment::Index(index), |ctx| match operand {
            Node::Sequence(group) => reduce(op, group, ctx),
            other => other.as_bool().ok_or_else(|| Error::NonBooleanOperand {
                path: ctx.path_string(),
                operator: op.as_str().to_string(),
                found: format!("{} ({})", other, other.type_name()),
            }),
        })?;
        if truth {
            truths += 1;
        }
    }
    Ok(op.combine(truths, total))
}

/// Evaluate the operand of `not` and negate it
pub(crate) fn evaluate_not(operand: &Node, ctx: &mut EvalContext) -> Result<Node> {
    let evaluated = evaluate_node(operand, ctx)?;
    let negated = negate(evaluated);
    ctx.trace(format_args!("not -> {}", negated));
    Ok(negated)
}

/// Negate every boolean in `node`.
///
/// Sequences are negated item by item and a single-item result is unwrapped;
/// mappings keep their keys; non-boolean scalars pass through.
pub fn negate(node: Node) -> Node {
    match node {
        Node::Sequence(items) => Node::from_items(items.into_iter().map(negate).collect()),
        Node::Mapping(entries) => {
            Node::Mapping(entries.into_iter().map(|(k, v)| (k, negate(v))).collect())
        }
        Node::Scalar(Scalar::Bool(b)) => Node::from(!b),
        scalar => scalar,
    }
}
