//! Runtime execution: values, subprocess orchestration, anchors, output.
//!
//! The split mirrors the compile/run boundary: [`crate::construct`] builds
//! immutable diagrams, this module runs them. An [`ExecutionContext`] holds
//! the per-run state (anchor bindings, recursion budget, sink); the
//! [`Executor`] walks diagrams and maps each box to its asynchronous
//! contract.

pub mod context;
pub mod errors;
pub mod exec;
pub mod printer;
mod process;
pub mod runtime_config;
pub mod unwrap;
pub mod value;

pub use context::ExecutionContext;
pub use errors::ExecError;
pub use exec::Executor;
pub use printer::{MemorySink, Sink, StdOutSink, print};
pub use runtime_config::RuntimeConfig;
pub use unwrap::{materialize, unwrap};
pub use value::{ByteStream, DeferredValue, Value};
