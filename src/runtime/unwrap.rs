//! The unwrap discipline: reduce lazy values to concrete ones, once.
//!
//! Deferred values are shared futures, so a sub-result consumed by several
//! branches (the output of a `Copy`, say) is computed exactly once and the
//! result cloned to every consumer. The depth bound is the cycle guard: a
//! pathological self-referential value is handed back unresolved instead of
//! recursing forever.

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, join_all};
use tracing::warn;

use super::value::Value;

/// Resolve deferred layers and tuple elements to concrete values.
///
/// Byte streams stay as stream handles: unwrapping makes a value *ready*,
/// not *drained*. `depth` bounds nesting; on exhaustion the value is
/// returned as-is with a warning.
pub async fn unwrap(value: Value, depth: usize) -> Value {
    unwrap_inner(value, depth).await
}

fn unwrap_inner(value: Value, budget: usize) -> BoxFuture<'static, Value> {
    async move {
        if budget == 0 {
            warn!("unwrap depth exhausted; returning value unresolved");
            return value;
        }
        match value {
            Value::Deferred(d) => unwrap_inner(d.get().await, budget - 1).await,
            Value::Tuple(vs) => {
                let resolved =
                    join_all(vs.into_iter().map(|v| unwrap_inner(v, budget - 1))).await;
                Value::Tuple(resolved)
            }
            concrete => concrete,
        }
    }
    .boxed()
}

/// Fully materialize: unwrap *and* drain streams to concrete bytes.
///
/// Used at document boundaries, where the previous document's result must
/// be fully resolved before the next document starts.
pub async fn materialize(value: Value, depth: usize) -> Value {
    materialize_inner(value, depth).await
}

fn materialize_inner(value: Value, budget: usize) -> BoxFuture<'static, Value> {
    async move {
        if budget == 0 {
            warn!("materialize depth exhausted; draining value to bytes");
            return Value::Bytes(value.into_bytes().await);
        }
        match value {
            Value::Deferred(d) => materialize_inner(d.get().await, budget - 1).await,
            Value::Tuple(vs) => {
                let resolved =
                    join_all(vs.into_iter().map(|v| materialize_inner(v, budget - 1))).await;
                Value::Tuple(resolved)
            }
            Value::Stream(s) => Value::Bytes(s.collect().await),
            concrete => concrete,
        }
    }
    .boxed()
}
