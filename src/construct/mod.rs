//! Construction functor: semantic graph → diagram.
//!
//! The source language carries no static type discipline, so arities are
//! discovered structurally and the compiler infers the wiring: pipe when
//! output and input arities agree, accumulative tap when two single-input
//! stages sit side by side without a pipe relationship, broadcast/reduce/
//! discard reconciliation otherwise. The fold lives in [`combine`]; the
//! per-kind dispatch in [`construct`].

use miette::Diagnostic;
use thiserror::Error;
use tracing::debug;

use crate::algebra::{AlgebraError, Diagram};
use crate::semantic::{SemanticKind, SemanticNode};

#[cfg(test)]
mod tests;

/// Errors from compiling a semantic graph.
#[derive(Debug, Error, Diagnostic)]
pub enum ConstructError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Algebra(#[from] AlgebraError),

    /// An alias node without a referenced name, or similar malformed input.
    #[error("malformed {kind} node: {detail}")]
    #[diagnostic(
        code(yawl::construct::malformed_node),
        help("The front-end must uphold the semantic graph contract; this input does not.")
    )]
    MalformedNode {
        kind: SemanticKind,
        detail: &'static str,
    },
}

/// Compile a stream into one diagram per document.
///
/// Documents stay separate on purpose: the document boundary is where the
/// executor clears anchor bindings and prints results, so it must survive
/// compilation. A non-stream root compiles to a single-document stream.
pub fn compile_stream(root: &SemanticNode) -> Result<Vec<Diagram>, ConstructError> {
    match root.kind {
        SemanticKind::Stream => root.children.iter().map(|doc| compile(doc)).collect(),
        _ => Ok(vec![compile(root)?]),
    }
}

/// Compile one document (or bare node) into a diagram.
pub fn compile(node: &SemanticNode) -> Result<Diagram, ConstructError> {
    construct(node, true)
}

/// The construction functor proper. `at_root` marks the document root,
/// where a mapping gets the copy/merge fan treatment.
pub fn construct(node: &SemanticNode, at_root: bool) -> Result<Diagram, ConstructError> {
    // Anchor definitions wrap any kind: build the inner node first, then
    // bind. The anchor box inherits the inner diagram's arities.
    if let Some(name) = &node.anchor {
        let mut inner = node.clone();
        inner.anchor = None;
        let inner = construct(&inner, at_root)?;
        debug!(anchor = %name, inputs = inner.inputs(), outputs = inner.outputs(), "anchored diagram");
        return Ok(Diagram::anchor(name.clone(), inner));
    }

    match node.kind {
        SemanticKind::Scalar => Ok(construct_scalar(node)),
        SemanticKind::Alias => {
            let name = node.value.as_deref().filter(|v| !v.is_empty()).ok_or(
                ConstructError::MalformedNode {
                    kind: SemanticKind::Alias,
                    detail: "alias without a referenced anchor name",
                },
            )?;
            Ok(Diagram::alias(name))
        }
        SemanticKind::Sequence => construct_sequence(node),
        SemanticKind::Mapping => construct_mapping(node, at_root),
        SemanticKind::Document => match node.children.as_slice() {
            [] => Ok(Diagram::id(1)),
            [root] => construct(root, true),
            many => {
                // Front-ends should wrap multiple roots in documents of a
                // stream; tolerate the shape by folding like a sequence.
                fold_children(many)
            }
        },
        SemanticKind::Stream => {
            // A stream below the top level degenerates to its documents
            // folded with the same reconciliation rule.
            fold_children(&node.children)
        }
    }
}

fn construct_scalar(node: &SemanticNode) -> Diagram {
    let text = node.scalar_text();
    match &node.tag {
        // `!cmd value` bakes the value in as the single static argument.
        Some(tag) => {
            let args: Vec<String> = if text.is_empty() {
                vec![]
            } else {
                vec![text.to_string()]
            };
            Diagram::program(tag.clone(), args)
        }
        None if text.is_empty() => Diagram::id(1),
        None => Diagram::data(text),
    }
}

fn construct_sequence(node: &SemanticNode) -> Result<Diagram, ConstructError> {
    match &node.tag {
        // `!cmd [a, b]` claims the literal children as its argument vector.
        Some(tag) => Ok(Diagram::program(tag.clone(), extract_args(&node.children))),
        None => fold_children(&node.children),
    }
}

/// Literal argument extraction for tagged sequences: untagged scalars
/// contribute their text, anything tagged or structured contributes nothing.
fn extract_args(children: &[SemanticNode]) -> Vec<String> {
    children
        .iter()
        .filter(|c| c.kind == SemanticKind::Scalar && c.tag.is_none())
        .filter_map(|c| c.value.clone())
        .filter(|v| !v.is_empty())
        .collect()
}

fn fold_children(children: &[SemanticNode]) -> Result<Diagram, ConstructError> {
    let mut iter = children.iter();
    let Some(first) = iter.next() else {
        return Ok(Diagram::id(1));
    };
    let mut res = construct(first, false)?;
    for child in iter {
        let layer = construct(child, false)?;
        res = combine(res, layer)?;
    }
    Ok(res)
}

/// Output/input reconciliation for adjacent stages of a sequence.
///
/// In priority order:
/// 1. matching nonzero arities pipe (`res >> layer`);
/// 2. two single-input stages tap: both see the same input and both
///    contribute to the output (`copy >> (res ⊗ layer) >> merge`);
/// 3. a closed layer (no inputs) attaches in parallel;
/// 4. an exhausted accumulator (no outputs) pipes relaxed; the layer's
///    inputs are fed empty bytes at run time;
/// 5. too few outputs broadcast through `Copy` when there is exactly one,
///    otherwise pipe relaxed as a best effort;
/// 6. too many outputs reduce through `Merge` when the layer takes exactly
///    one, otherwise the excess is discarded before piping.
pub fn combine(res: Diagram, layer: Diagram) -> Result<Diagram, ConstructError> {
    let (ro, li) = (res.outputs(), layer.inputs());

    if ro == li && ro > 0 {
        debug!(arity = ro, "pipe");
        return Ok(res.then(layer)?);
    }

    if res.inputs() == 1 && li == 1 {
        debug!(res_out = ro, "accumulative tap");
        return tap(res, layer);
    }

    if li == 0 {
        debug!(res_out = ro, layer_out = layer.outputs(), "tensor");
        return Ok(res.tensor(layer));
    }

    if ro == 0 {
        debug!(layer_in = li, "relaxed pipe from closed stage");
        return Ok(res.then_relaxed(layer));
    }

    if ro < li {
        if ro == 1 {
            debug!(fan = li, "broadcast");
            return Ok(res.then(Diagram::copy(li))?.then(layer)?);
        }
        debug!(res_out = ro, layer_in = li, "relaxed pipe (under-supplied)");
        return Ok(res.then_relaxed(layer));
    }

    // ro > li
    if li == 1 {
        debug!(fan = ro, "reduce");
        return Ok(res.then(Diagram::merge(ro))?.then(layer)?);
    }
    let excess = ro - li;
    debug!(keep = li, excess, "discard excess");
    let trim = Diagram::id(li).tensor(Diagram::discard(excess));
    Ok(res.then(trim)?.then(layer)?)
}

/// Accumulative tap: both stages see the same input, both contribute.
fn tap(res: Diagram, layer: Diagram) -> Result<Diagram, ConstructError> {
    let total_out = res.outputs() + layer.outputs();
    let fanned = Diagram::copy(2).then(res.tensor(layer))?;
    Ok(if total_out > 1 {
        fanned.then(Diagram::merge(total_out))?
    } else {
        fanned
    })
}

fn construct_mapping(node: &SemanticNode, at_root: bool) -> Result<Diagram, ConstructError> {
    let mut pairs = node.pairs();
    let Some((k, v)) = pairs.next() else {
        return Ok(Diagram::id(1));
    };
    let mut product = pair_diagram(k, v)?;
    for (k, v) in pairs {
        product = product.tensor(pair_diagram(k, v)?);
    }

    // Untagged, non-root mappings return the raw tensor; fan-out/fan-in is
    // deferred to the surrounding context.
    if node.tag.is_none() && !at_root {
        return Ok(product);
    }

    // Tagged or root mappings behave as "apply the same input to every
    // pair, concatenate the results".
    let (total_in, total_out) = (product.inputs(), product.outputs());
    let mut wired = product;
    if total_in > 1 {
        wired = Diagram::copy(total_in).then(wired)?;
    }
    if total_out > 1 {
        wired = wired.then(Diagram::merge(total_out))?;
    }
    Ok(wired)
}

fn pair_diagram(key: &SemanticNode, value: &SemanticNode) -> Result<Diagram, ConstructError> {
    let k = construct(key, false)?;
    let v = construct(value, false)?;
    combine(k, v)
}
