//! # yawl: YAML as a pipeline shell
//!
//! `yawl` runs YAML documents as programs. A document is compiled into a
//! diagram over a small algebra (constants, external commands, copy
//! fan-out, merge fan-in, discard) and the diagram is executed on an async
//! runtime, wiring subprocesses together with streamed stdin/stdout.
//!
//! ## Core concepts
//!
//! - **Semantic graph**: the YAML-shaped input contract ([`semantic`])
//! - **Algebra**: typed boxes and their sequential/parallel compositions
//!   ([`algebra`])
//! - **Construction**: arity-driven wiring inference: pipe, tap, fan-out,
//!   fan-in ([`construct`])
//! - **Runtime**: the execution functor, anchor/alias recursion, subprocess
//!   orchestration and the unwrap discipline ([`runtime`])
//!
//! ## Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use yawl::construct::compile_stream;
//! use yawl::loader::load_str;
//! use yawl::runtime::{ExecutionContext, Executor, RuntimeConfig, StdOutSink, Value};
//!
//! # async fn example() -> miette::Result<()> {
//! // `!echo hello` piped into `!wc -c`
//! let graph = load_str("[!echo hello, !wc -c]").map_err(miette::Report::from)?;
//! let documents = compile_stream(&graph).map_err(miette::Report::from)?;
//!
//! let ctx = ExecutionContext::new(RuntimeConfig::from_env(), Arc::new(StdOutSink::default()));
//! let executor = Executor::new(Arc::new(ctx));
//! executor
//!     .run_stream(&documents, Value::empty())
//!     .await
//!     .map_err(miette::Report::from)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Recursion
//!
//! Anchors bind a sub-diagram to a name for the rest of the current
//! document; aliases (and tags naming a bound anchor) re-enter it at call
//! time. Bindings never leak across document boundaries in a multi-document
//! stream.
//!
//! ## Module guide
//!
//! - [`semantic`] - Semantic graph contract consumed by the compiler
//! - [`loader`] - YAML event adapter producing semantic graphs
//! - [`algebra`] - Boxes, diagrams, and arity-checked composition
//! - [`construct`] - The construction functor and wiring heuristics
//! - [`runtime`] - Values, execution, subprocesses, sinks
//! - [`telemetry`] - Tracing bootstrap

pub mod algebra;
pub mod construct;
pub mod loader;
pub mod runtime;
pub mod semantic;
pub mod telemetry;
