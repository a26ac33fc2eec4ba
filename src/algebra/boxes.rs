//! The primitive box kinds of the algebra.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::diagram::Diagram;

/// One primitive box, with fixed input/output arities per kind.
///
/// | Kind      | Inputs | Outputs |
/// |-----------|--------|---------|
/// | `Data`    | 0      | 1       |
/// | `Program` | 1      | 1       |
/// | `Copy`    | 1      | n       |
/// | `Merge`   | n      | 1       |
/// | `Discard` | n      | 0       |
/// | `Anchor`  | inner  | inner   |
/// | `Alias`   | 1      | 1       |
///
/// `Anchor` and `Alias` are the recursion mechanism: an anchor binds its
/// inner diagram to a name for the rest of the current document, an alias
/// re-enters whatever is bound under that name at call time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AlgebraBox {
    /// A literal value; produces it as a constant.
    Data { value: String },
    /// An external command (or a bound anchor of the same name), with
    /// static arguments baked in at compile time.
    Program { name: String, args: Vec<String> },
    /// Duplicate one runtime value into `n` independent views.
    Copy { n: usize },
    /// Concatenate `n` runtime values in argument order; nulls contribute
    /// nothing.
    Merge { n: usize },
    /// Fully drain `n` inputs and yield nothing.
    Discard { n: usize },
    /// Bind `inner` to `name` for the rest of the document, then run it.
    Anchor { name: String, inner: Arc<Diagram> },
    /// Re-enter the diagram bound to `name`, looked up at call time.
    Alias { name: String },
}

impl AlgebraBox {
    /// Number of input slots this box consumes.
    #[must_use]
    pub fn inputs(&self) -> usize {
        match self {
            AlgebraBox::Data { .. } => 0,
            AlgebraBox::Program { .. } | AlgebraBox::Alias { .. } => 1,
            AlgebraBox::Copy { .. } => 1,
            AlgebraBox::Merge { n } | AlgebraBox::Discard { n } => *n,
            AlgebraBox::Anchor { inner, .. } => inner.inputs(),
        }
    }

    /// Number of output slots this box produces.
    #[must_use]
    pub fn outputs(&self) -> usize {
        match self {
            AlgebraBox::Data { .. } => 1,
            AlgebraBox::Program { .. } | AlgebraBox::Alias { .. } => 1,
            AlgebraBox::Copy { n } => *n,
            AlgebraBox::Merge { .. } => 1,
            AlgebraBox::Discard { .. } => 0,
            AlgebraBox::Anchor { inner, .. } => inner.outputs(),
        }
    }
}

impl fmt::Display for AlgebraBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlgebraBox::Data { value } => write!(f, "data({value:?})"),
            AlgebraBox::Program { name, args } => {
                write!(f, "program({name}")?;
                for a in args {
                    write!(f, " {a}")?;
                }
                write!(f, ")")
            }
            AlgebraBox::Copy { n } => write!(f, "copy({n})"),
            AlgebraBox::Merge { n } => write!(f, "merge({n})"),
            AlgebraBox::Discard { n } => write!(f, "discard({n})"),
            AlgebraBox::Anchor { name, .. } => write!(f, "anchor(&{name})"),
            AlgebraBox::Alias { name } => write!(f, "alias(*{name})"),
        }
    }
}
