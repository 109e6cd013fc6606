//! Promotion keys: `<<`, `<<|`, `<<-` with an optional target suffix
//!
//! A promotion key's value is evaluated, coerced to a list, and walked in
//! reverse. Every mapping in the list has its entries spliced into the
//! enclosing mapping; without a merge modifier an entry replaces what is
//! there, so earlier list items end up winning. Non-mapping leftovers go
//! to the suffix key when one is named.

use crate::context::{EvalContext, PathSegment};
use crate::error::Result;
use crate::evaluator::evaluate_node;
use crate::keys::{PromotionKey, PromotionMode};
use crate::merge::{MergeOptions, deep_merge};
use crate::node::{Mapping, Node};

/// A promotion key found in a mapping, with its unevaluated value
pub(crate) struct Promotion<'a> {
    pub key: &'a str,
    pub parsed: PromotionKey<'a>,
    pub raw: &'a Node,
}

/// Resolve `promotions` against the already-evaluated `output`.
///
/// `sole_key` is set when the promotion key was the mapping's only key; if
/// its content then leaves nothing but non-mapping values, those values
/// replace the mapping itself.
pub(crate) fn resolve(
    mut output: Mapping,
    promotions: Vec<Promotion<'_>>,
    sole_key: bool,
    ctx: &mut EvalContext,
) -> Result<Node> {
    let mut collapsed = None;

    for promotion in promotions {
        let Promotion { key, parsed, raw } = promotion;
        ctx.descend(PathSegment::key(key), |ctx| {
            let evaluated = evaluate_node(raw, ctx)?;
            ctx.trace(format_args!("promoting {} ({:?})", key, parsed.mode));

            let options = MergeOptions::for_promotion(parsed.mode);
            let context = ctx.path_string();
            let leftovers = splice(&mut output, evaluated.into_items(), parsed.mode, options, &context)?;
            if leftovers.is_empty() {
                return Ok(());
            }

            if !parsed.suffix.is_empty() {
                assign_suffix(&mut output, parsed.suffix, leftovers, parsed.mode, options, &context)?;
            } else if sole_key && output.is_empty() {
                collapsed = Some(Node::from_items(leftovers));
            } else {
                tracing::warn!(
                    path = %ctx.path(),
                    dropped = leftovers.len(),
                    "promotion key '{}' has no target for non-mapping values; dropping them",
                    key
                );
            }
            Ok(())
        })?;
    }

    Ok(collapsed.unwrap_or(Node::Mapping(output)))
}

/// Splice mapping items into `output`, last item first, and return the
/// remaining non-mapping items in their original order.
fn splice(
    output: &mut Mapping,
    items: Vec<Node>,
    mode: PromotionMode,
    options: MergeOptions,
    context: &str,
) -> Result<Vec<Node>> {
    let mut leftovers = Vec::new();
    for item in items.into_iter().rev() {
        match item {
            Node::Mapping(entries) => {
                for (key, value) in entries {
                    promote_entry(output, key, value, mode, options, context)?;
                }
            }
            other => leftovers.push(other),
        }
    }
    leftovers.reverse();
    Ok(leftovers)
}

fn promote_entry(
    output: &mut Mapping,
    key: String,
    value: Node,
    mode: PromotionMode,
    options: MergeOptions,
    context: &str,
) -> Result<()> {
    if mode.merges() {
        if let Some(existing) = output.get_mut(&key) {
            let current = std::mem::take(existing);
            *existing = deep_merge(vec![current, value], options, context)?;
            return Ok(());
        }
    }
    output.insert(key, value);
    Ok(())
}

fn assign_suffix(
    output: &mut Mapping,
    suffix: &str,
    leftovers: Vec<Node>,
    mode: PromotionMode,
    options: MergeOptions,
    context: &str,
) -> Result<()> {
    let mut items = leftovers;
    if mode.merges() {
        if let Some(existing) = output.get_mut(suffix) {
            let current = std::mem::take(existing);
            items = deep_merge(vec![current, Node::Sequence(items)], options, context)?.into_items();
        }
    }
    output.insert(suffix.to_string(), Node::from_items(items));
    Ok(())
}
