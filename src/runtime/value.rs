//! Runtime values: the things that flow along diagram wires.
//!
//! A wire carries either nothing (`Null`, the suppression marker), a scalar
//! literal, raw bytes, a lazy byte stream, a bundle of values, or a deferred
//! computation. Deferred values are shared futures: whoever awaits first
//! pays for the computation, everyone else gets the cached result.

use bytes::{Bytes, BytesMut};
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use std::fmt;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, warn};

/// Default chunk size for stream pumps.
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

/// Channel depth for stream pumps; bounds in-flight buffering so pipelines
/// get OS-pipe-like backpressure instead of unbounded growth.
const STREAM_DEPTH: usize = 32;

/// A value on a wire.
#[derive(Clone)]
pub enum Value {
    /// "No value": a suppressed branch. Distinct from empty bytes; empty
    /// input is ordinary, `Null` short-circuits programs and aliases.
    Null,
    /// A scalar literal; stringifies newline-terminated.
    Text(String),
    /// Concrete raw bytes.
    Bytes(Bytes),
    /// A lazy byte stream (typically live subprocess output).
    Stream(ByteStream),
    /// A bundle of values occupying one wire (collapsed multi-output).
    Tuple(Vec<Value>),
    /// A shared, memoized pending computation.
    Deferred(DeferredValue),
}

impl Value {
    /// Empty concrete bytes: the ordinary "nothing to say" input.
    #[must_use]
    pub fn empty() -> Self {
        Value::Bytes(Bytes::new())
    }

    /// Wrap a future as a lazily computed, memoized value.
    pub fn deferred<F>(fut: F) -> Self
    where
        F: Future<Output = Value> + Send + 'static,
    {
        Value::Deferred(DeferredValue {
            inner: fut.boxed().shared(),
        })
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Await through deferred layers without draining streams or tuples.
    ///
    /// This is the resolution programs apply to their input before deciding
    /// whether to spawn: cheap enough to keep pipelines streaming, deep
    /// enough to see a guard's suppression.
    pub async fn resolve_shallow(mut self) -> Value {
        while let Value::Deferred(d) = self {
            self = d.get().await;
        }
        self
    }

    /// Drain this value to concrete bytes.
    ///
    /// `Null` contributes nothing, scalars are newline-terminated, streams
    /// are read to EOF, tuples concatenate element-wise in order.
    pub fn into_bytes(self) -> BoxFuture<'static, Bytes> {
        async move {
            match self {
                Value::Null => Bytes::new(),
                Value::Text(s) => line_bytes(&s),
                Value::Bytes(b) => b,
                Value::Stream(s) => s.collect().await,
                Value::Tuple(vs) => {
                    let mut buf = BytesMut::new();
                    for v in vs {
                        buf.extend_from_slice(&v.into_bytes().await);
                    }
                    buf.freeze()
                }
                Value::Deferred(d) => d.get().await.into_bytes().await,
            }
        }
        .boxed()
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Text(s) => f.debug_tuple("Text").field(s).finish(),
            Value::Bytes(b) => write!(f, "Bytes({} bytes)", b.len()),
            Value::Stream(_) => write!(f, "Stream(..)"),
            Value::Tuple(vs) => f.debug_tuple("Tuple").field(vs).finish(),
            Value::Deferred(_) => write!(f, "Deferred(..)"),
        }
    }
}

/// A pending value; cloning shares the computation, not repeats it.
#[derive(Clone)]
pub struct DeferredValue {
    inner: Shared<BoxFuture<'static, Value>>,
}

impl DeferredValue {
    /// Await the computation (or its cached result).
    pub async fn get(&self) -> Value {
        self.inner.clone().await
    }
}

/// Scalar text as newline-terminated bytes.
#[must_use]
pub fn line_bytes(text: &str) -> Bytes {
    if text.ends_with('\n') {
        Bytes::copy_from_slice(text.as_bytes())
    } else {
        let mut buf = BytesMut::with_capacity(text.len() + 1);
        buf.extend_from_slice(text.as_bytes());
        buf.extend_from_slice(b"\n");
        buf.freeze()
    }
}

/// A lazy byte stream: a bounded chunk channel fed by a background pump.
///
/// Cloning shares the single underlying receiver (clones *compete* for
/// chunks); independent byte-identical views come from [`tee`](Self::tee),
/// which is what the `Copy` box uses.
#[derive(Clone)]
pub struct ByteStream {
    rx: flume::Receiver<Bytes>,
}

impl fmt::Debug for ByteStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteStream(pending={})", self.rx.len())
    }
}

impl ByteStream {
    /// A fresh stream and the sender that feeds it. Dropping the sender
    /// ends the stream.
    #[must_use]
    pub fn channel() -> (flume::Sender<Bytes>, Self) {
        let (tx, rx) = flume::bounded(STREAM_DEPTH);
        (tx, Self { rx })
    }

    /// A single-chunk stream over already-concrete bytes.
    #[must_use]
    pub fn from_bytes(bytes: Bytes) -> Self {
        let (tx, rx) = flume::bounded(1);
        if !bytes.is_empty() {
            // Capacity 1 and no other sender: this cannot fail.
            let _ = tx.send(bytes);
        }
        Self { rx }
    }

    /// Pump an async reader into a stream on a background task.
    ///
    /// Read failures end the stream early with a warning; the consumer sees
    /// EOF and the branch degrades to what was already delivered.
    pub fn from_reader<R>(mut reader: R, chunk_size: usize) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        let (tx, stream) = Self::channel();
        tokio::spawn(async move {
            loop {
                let mut buf = BytesMut::with_capacity(chunk_size);
                match reader.read_buf(&mut buf).await {
                    Ok(0) => break,
                    Ok(_) => {
                        if tx.send_async(buf.freeze()).await.is_err() {
                            // Consumer went away; stop pumping.
                            break;
                        }
                    }
                    Err(error) => {
                        warn!(%error, "stream read failed; ending stream early");
                        break;
                    }
                }
            }
        });
        stream
    }

    /// Next chunk, or `None` at end of stream.
    pub async fn next_chunk(&mut self) -> Option<Bytes> {
        self.rx.recv_async().await.ok()
    }

    /// Read to EOF and return everything as one buffer.
    pub async fn collect(mut self) -> Bytes {
        let mut buf = BytesMut::new();
        while let Some(chunk) = self.next_chunk().await {
            buf.extend_from_slice(&chunk);
        }
        buf.freeze()
    }

    /// Split into `n` independent byte-identical streams.
    ///
    /// A distributor task relays every chunk to every branch; a branch that
    /// drops its receiver is skipped without disturbing its siblings. The
    /// branch channels are unbounded, since branches are routinely consumed at
    /// very different paces (one side of a tap may not be read until a
    /// downstream merge resolves), so a slow branch buffers rather than
    /// stalling its siblings. The bound on memory is the source itself,
    /// which still sees backpressure from its own pump.
    #[must_use]
    pub fn tee(mut self, n: usize) -> Vec<ByteStream> {
        match n {
            0 => {
                tokio::spawn(async move {
                    let drained = self.collect().await;
                    debug!(bytes = drained.len(), "tee(0) drained stream");
                });
                Vec::new()
            }
            1 => vec![self],
            _ => {
                let (senders, streams): (Vec<_>, Vec<_>) = (0..n)
                    .map(|_| {
                        let (tx, rx) = flume::unbounded();
                        (tx, Self { rx })
                    })
                    .unzip();
                tokio::spawn(async move {
                    while let Some(chunk) = self.next_chunk().await {
                        for tx in &senders {
                            let _ = tx.send(chunk.clone());
                        }
                    }
                });
                streams
            }
        }
    }
}
