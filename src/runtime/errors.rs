//! Runtime error taxonomy.
//!
//! Compile-time failures (arity mismatches, malformed graphs) live with the
//! construction functor; everything here can only happen while a diagram is
//! executing. Stream faults are deliberately *not* errors: a broken pipe
//! degrades that branch to empty bytes with a warning, and `Merge`/`Discard`
//! absorb the zero contribution.

use miette::Diagnostic;
use thiserror::Error;

/// Fatal errors during diagram execution.
#[derive(Debug, Error, Diagnostic)]
pub enum ExecError {
    /// An alias named an anchor with no live binding.
    #[error("alias *{name} referenced before any anchor bound it")]
    #[diagnostic(
        code(yawl::exec::unresolved_reference),
        help(
            "Anchors are scoped to one document: a binding made in an earlier \
             document of a stream is not visible in later ones."
        )
    )]
    UnresolvedReference { name: String },

    /// A self-referential alias expanded past the configured bound.
    #[error("recursion limit {limit} exceeded while expanding *{name}")]
    #[diagnostic(
        code(yawl::exec::recursion_overrun),
        help(
            "Give the loop a base case (a guard command that exits nonzero), \
             or raise the limit via --recursion-limit / YAWL_RECURSION_LIMIT."
        )
    )]
    RecursionOverrun { name: String, limit: usize },

    /// The external command could not be started at all.
    #[error("failed to spawn command `{command}`")]
    #[diagnostic(
        code(yawl::exec::process_spawn),
        help("Check that the command exists and is on PATH.")
    )]
    ProcessSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The output sink failed; nothing sensible can continue.
    #[error("i/o error at the output sink")]
    #[diagnostic(code(yawl::exec::sink_io))]
    SinkIo(#[from] std::io::Error),
}
