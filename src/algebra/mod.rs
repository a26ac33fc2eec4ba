//! The diagram algebra: typed boxes and their compositions.
//!
//! Programs compile down to a closed set of primitives (constants, external
//! commands, copy fan-out, merge fan-in, discard) wired together with
//! sequential (`then`) and parallel (`tensor`) composition. Diagrams are
//! immutable once built; arities are checked at construction, not at run
//! time.

pub mod boxes;
pub mod diagram;

pub use boxes::AlgebraBox;
pub use diagram::{AlgebraError, Diagram};
