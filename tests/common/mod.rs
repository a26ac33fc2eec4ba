//! Shared helpers for integration tests.
#![allow(dead_code)] // not every test binary uses every helper

use std::sync::Arc;

use yawl::algebra::Diagram;
use yawl::runtime::{ExecutionContext, Executor, MemorySink, RuntimeConfig, Value};

/// An executor wired to a memory sink, so tests can assert on exact output.
pub fn memory_executor(config: RuntimeConfig) -> (Executor, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::default());
    let ctx = ExecutionContext::new(config, sink.clone());
    (Executor::new(Arc::new(ctx)), sink)
}

/// Shorthand for a `sh -c` program box.
pub fn sh(script: &str) -> Diagram {
    Diagram::program("sh", ["-c", script])
}

/// Run documents against empty input and return everything printed.
pub async fn run_to_string(
    config: RuntimeConfig,
    documents: &[Diagram],
) -> Result<String, yawl::runtime::ExecError> {
    let (executor, sink) = memory_executor(config);
    executor.run_stream(documents, Value::empty()).await?;
    Ok(sink.contents_string())
}
