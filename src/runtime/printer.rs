//! Output sinks.
//!
//! One printer receives every resolved value: raw bytes go out as-is,
//! scalars are stringified and newline-terminated, streams and tuples are
//! flushed in order as their content arrives.

use async_trait::async_trait;
use std::io;
use std::sync::Mutex;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tokio::io::AsyncWriteExt;

use super::value::{Value, line_bytes};

/// Nesting bound while printing; deferred residue past this is dropped.
const PRINT_DEPTH: usize = 64;

/// Destination for resolved output bytes.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Write one chunk of output.
    async fn write_chunk(&self, chunk: &[u8]) -> io::Result<()>;
}

/// Print a resolved value to a sink.
///
/// Streams are flushed chunk-by-chunk as they arrive, so long-running
/// pipelines emit output live rather than after completion.
pub async fn print(sink: &dyn Sink, value: Value) -> io::Result<()> {
    print_inner(sink, value, PRINT_DEPTH).await
}

fn print_inner<'a>(
    sink: &'a dyn Sink,
    value: Value,
    budget: usize,
) -> BoxFuture<'a, io::Result<()>> {
    async move {
        if budget == 0 {
            tracing::warn!("print depth exhausted; dropping unresolved residue");
            return Ok(());
        }
        match value {
            Value::Null => Ok(()),
            Value::Text(s) => sink.write_chunk(&line_bytes(&s)).await,
            Value::Bytes(b) => sink.write_chunk(&b).await,
            Value::Stream(mut s) => {
                while let Some(chunk) = s.next_chunk().await {
                    sink.write_chunk(&chunk).await?;
                }
                Ok(())
            }
            Value::Tuple(vs) => {
                for v in vs {
                    print_inner(sink, v, budget - 1).await?;
                }
                Ok(())
            }
            Value::Deferred(d) => print_inner(sink, d.get().await, budget - 1).await,
        }
    }
    .boxed()
}

/// Standard-output sink used by the CLI.
pub struct StdOutSink {
    stdout: tokio::sync::Mutex<tokio::io::Stdout>,
}

impl Default for StdOutSink {
    fn default() -> Self {
        Self {
            stdout: tokio::sync::Mutex::new(tokio::io::stdout()),
        }
    }
}

#[async_trait]
impl Sink for StdOutSink {
    async fn write_chunk(&self, chunk: &[u8]) -> io::Result<()> {
        let mut out = self.stdout.lock().await;
        out.write_all(chunk).await?;
        // Flush per chunk so interactive pipelines stay live.
        out.flush().await
    }
}

/// In-memory sink for tests and embedding.
#[derive(Default)]
pub struct MemorySink {
    buf: Mutex<Vec<u8>>,
}

impl MemorySink {
    /// Everything written so far.
    #[must_use]
    pub fn contents(&self) -> Vec<u8> {
        self.buf.lock().expect("memory sink poisoned").clone()
    }

    /// Everything written so far, lossily decoded.
    #[must_use]
    pub fn contents_string(&self) -> String {
        String::from_utf8_lossy(&self.contents()).into_owned()
    }
}

#[async_trait]
impl Sink for MemorySink {
    async fn write_chunk(&self, chunk: &[u8]) -> io::Result<()> {
        self.buf
            .lock()
            .expect("memory sink poisoned")
            .extend_from_slice(chunk);
        Ok(())
    }
}
