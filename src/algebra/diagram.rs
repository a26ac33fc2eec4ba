//! Diagrams: immutable compositions of boxes.

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use super::boxes::AlgebraBox;

/// Errors from composing diagrams.
#[derive(Debug, Error, Diagnostic)]
pub enum AlgebraError {
    /// Sequential composition where the left side's outputs do not line up
    /// with the right side's inputs.
    #[error("cannot pipe {outputs} output(s) into {inputs} input(s)")]
    #[diagnostic(
        code(yawl::algebra::arity_mismatch),
        help("Insert a copy (broadcast) or merge (reduce) stage, or compose in parallel with tensor.")
    )]
    ArityMismatch { outputs: usize, inputs: usize },
}

/// An immutable wiring of boxes.
///
/// `Then` is sequential composition (left feeds right), `Tensor` is parallel
/// composition (arities add), `Id` is a bundle of pass-through wires.
/// Composition never mutates; every combinator returns a new diagram.
///
/// # Examples
///
/// ```
/// use yawl::algebra::Diagram;
///
/// let hello = Diagram::data("hello");
/// let count = Diagram::program("wc", ["-c"]);
/// let pipe = hello.then(count).unwrap();
/// assert_eq!((pipe.inputs(), pipe.outputs()), (0, 1));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Diagram {
    /// `arity` parallel wires that pass their inputs through untouched.
    Id { arity: usize },
    /// A single primitive box.
    Leaf(AlgebraBox),
    /// Sequential composition: run left, feed its outputs to right.
    Then(Box<Diagram>, Box<Diagram>),
    /// Parallel composition: run both sides on disjoint slots.
    Tensor(Box<Diagram>, Box<Diagram>),
}

impl Diagram {
    /// A bundle of `arity` identity wires.
    #[must_use]
    pub fn id(arity: usize) -> Self {
        Diagram::Id { arity }
    }

    /// A constant literal.
    pub fn data(value: impl Into<String>) -> Self {
        Diagram::Leaf(AlgebraBox::Data {
            value: value.into(),
        })
    }

    /// An external command with static arguments.
    pub fn program<I, S>(name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Diagram::Leaf(AlgebraBox::Program {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
        })
    }

    /// A 1→n fan-out.
    #[must_use]
    pub fn copy(n: usize) -> Self {
        Diagram::Leaf(AlgebraBox::Copy { n })
    }

    /// An n→1 fan-in (concatenation policy).
    #[must_use]
    pub fn merge(n: usize) -> Self {
        Diagram::Leaf(AlgebraBox::Merge { n })
    }

    /// An n→0 sink that drains its inputs.
    #[must_use]
    pub fn discard(n: usize) -> Self {
        Diagram::Leaf(AlgebraBox::Discard { n })
    }

    /// Bind `inner` to `name` and run it in place.
    pub fn anchor(name: impl Into<String>, inner: Diagram) -> Self {
        Diagram::Leaf(AlgebraBox::Anchor {
            name: name.into(),
            inner: Arc::new(inner),
        })
    }

    /// A call-time reference to the diagram bound to `name`.
    pub fn alias(name: impl Into<String>) -> Self {
        Diagram::Leaf(AlgebraBox::Alias { name: name.into() })
    }

    /// Total input arity.
    #[must_use]
    pub fn inputs(&self) -> usize {
        match self {
            Diagram::Id { arity } => *arity,
            Diagram::Leaf(b) => b.inputs(),
            Diagram::Then(a, _) => a.inputs(),
            Diagram::Tensor(a, b) => a.inputs() + b.inputs(),
        }
    }

    /// Total output arity.
    #[must_use]
    pub fn outputs(&self) -> usize {
        match self {
            Diagram::Id { arity } => *arity,
            Diagram::Leaf(b) => b.outputs(),
            Diagram::Then(_, b) => b.outputs(),
            Diagram::Tensor(a, b) => a.outputs() + b.outputs(),
        }
    }

    /// Sequential composition with the arity check.
    ///
    /// Fails with [`AlgebraError::ArityMismatch`] unless `self.outputs() ==
    /// other.inputs()`.
    pub fn then(self, other: Diagram) -> Result<Diagram, AlgebraError> {
        let (outputs, inputs) = (self.outputs(), other.inputs());
        if outputs != inputs {
            return Err(AlgebraError::ArityMismatch { outputs, inputs });
        }
        Ok(Diagram::Then(Box::new(self), Box::new(other)))
    }

    /// Sequential composition without the arity check.
    ///
    /// Used by the wiring heuristics for their best-effort arms; at run time
    /// missing input slots are fed empty bytes and surplus outputs are
    /// drained. Prefer [`then`](Self::then) everywhere else.
    #[must_use]
    pub fn then_relaxed(self, other: Diagram) -> Diagram {
        Diagram::Then(Box::new(self), Box::new(other))
    }

    /// Parallel composition; always valid, arities add.
    #[must_use]
    pub fn tensor(self, other: Diagram) -> Diagram {
        Diagram::Tensor(Box::new(self), Box::new(other))
    }
}

impl fmt::Display for Diagram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagram::Id { arity } => write!(f, "id({arity})"),
            Diagram::Leaf(b) => write!(f, "{b}"),
            Diagram::Then(a, b) => write!(f, "({a} >> {b})"),
            Diagram::Tensor(a, b) => write!(f, "({a} ⊗ {b})"),
        }
    }
}
