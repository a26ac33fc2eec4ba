//! The execution functor: diagrams → running asynchronous processes.
//!
//! Evaluation follows the diagram's data dependencies: `Then` hands the
//! upstream's output *handles* downstream without waiting for completion
//! (subprocess pipelines stream), `Tensor` branches run concurrently, and
//! each box kind maps to its runtime contract. Suppressed branches travel
//! as [`Value::Null`] and short-circuit programs and aliases; merges and
//! discards absorb them as zero contributions.

use bytes::BytesMut;
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, join_all, try_join};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::algebra::{AlgebraBox, Diagram};

use super::context::ExecutionContext;
use super::errors::ExecError;
use super::printer;
use super::process;
use super::unwrap::{materialize, unwrap};
use super::value::Value;

/// Executes diagrams against an [`ExecutionContext`].
///
/// The executor itself is stateless; everything mutable lives in the
/// context, so one executor can run any number of documents in sequence.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use yawl::algebra::Diagram;
/// use yawl::runtime::{ExecutionContext, Executor, MemorySink, RuntimeConfig, Value};
///
/// # async fn example() -> Result<(), yawl::runtime::ExecError> {
/// let sink = Arc::new(MemorySink::default());
/// let ctx = ExecutionContext::new(RuntimeConfig::default(), sink.clone());
/// let executor = Executor::new(Arc::new(ctx));
/// executor
///     .run_stream(&[Diagram::data("hello")], Value::empty())
///     .await?;
/// assert_eq!(sink.contents_string(), "hello\n");
/// # Ok(())
/// # }
/// ```
pub struct Executor {
    ctx: Arc<ExecutionContext>,
}

impl Executor {
    pub fn new(ctx: Arc<ExecutionContext>) -> Self {
        Self { ctx }
    }

    #[must_use]
    pub fn context(&self) -> &Arc<ExecutionContext> {
        &self.ctx
    }

    /// Run a stream of documents strictly in sequence.
    ///
    /// Anchor bindings are cleared at every document boundary. A document's
    /// fully resolved result feeds the next document when that document
    /// takes input; a result nothing consumes is printed as soon as it
    /// resolves, so output arrives in document order.
    #[instrument(skip_all, fields(documents = documents.len()))]
    pub async fn run_stream(&self, documents: &[Diagram], input: Value) -> Result<(), ExecError> {
        let depth = self.ctx.config().unwrap_depth;
        let mut carry = input;

        for (idx, doc) in documents.iter().enumerate() {
            self.ctx.clear_bindings();
            let fed = std::mem::replace(&mut carry, Value::empty());
            let result = self.run_document(doc, fed).await?;

            match documents.get(idx + 1) {
                Some(next) if next.inputs() > 0 => {
                    // Strict sequencing: the next document starts only once
                    // this result is fully resolved.
                    carry = materialize(result, depth).await;
                }
                // Unconsumed result: print it. Printing drains, which also
                // satisfies the strict-sequencing requirement.
                _ => {
                    let resolved = unwrap(result, depth).await;
                    printer::print(self.ctx.sink().as_ref(), resolved).await?;
                }
            }
        }
        Ok(())
    }

    /// Run one document's diagram against a single input value.
    #[instrument(skip_all, fields(inputs = diagram.inputs(), outputs = diagram.outputs()))]
    pub async fn run_document(&self, diagram: &Diagram, input: Value) -> Result<Value, ExecError> {
        let slots = match diagram.inputs() {
            0 => {
                drain_background(vec![input]);
                Vec::new()
            }
            1 => vec![input],
            n => self.fan_value(input.resolve_shallow().await, n).await,
        };
        let outputs = self.eval(diagram, slots).await?;
        Ok(collapse(outputs))
    }

    fn eval<'a>(
        &'a self,
        diagram: &'a Diagram,
        inputs: Vec<Value>,
    ) -> BoxFuture<'a, Result<Vec<Value>, ExecError>> {
        async move {
            let inputs = fit_slots(inputs, diagram.inputs());
            match diagram {
                Diagram::Id { .. } => Ok(inputs),
                Diagram::Leaf(b) => self.eval_box(b, inputs).await,
                Diagram::Then(a, b) => {
                    let mid = self.eval(a, inputs).await?;
                    self.eval(b, mid).await
                }
                Diagram::Tensor(a, b) => {
                    let mut left = inputs;
                    let right = left.split_off(a.inputs().min(left.len()));
                    let (mut la, lb) =
                        try_join(self.eval(a, left), self.eval(b, right)).await?;
                    la.extend(lb);
                    Ok(la)
                }
            }
        }
        .boxed()
    }

    async fn eval_box(
        &self,
        algebra_box: &AlgebraBox,
        inputs: Vec<Value>,
    ) -> Result<Vec<Value>, ExecError> {
        match algebra_box {
            AlgebraBox::Data { value } => Ok(vec![Value::Text(value.clone())]),

            AlgebraBox::Copy { n } => {
                let input = take_single(inputs).resolve_shallow().await;
                Ok(self.fan_value(input, *n).await)
            }

            AlgebraBox::Merge { .. } => {
                // Lazy: downstream decides when the concatenation is paid
                // for. Inputs drain concurrently (a tee'd sibling may be
                // feeding us) but concatenate in argument order.
                let values = inputs;
                Ok(vec![Value::deferred(async move {
                    let drained = join_all(values.into_iter().map(Value::into_bytes)).await;
                    let mut buf = BytesMut::new();
                    for bytes in drained {
                        buf.extend_from_slice(&bytes);
                    }
                    Value::Bytes(buf.freeze())
                })])
            }

            AlgebraBox::Discard { .. } => {
                // Drain fully so subprocess pipes are read to EOF and
                // children get reaped.
                let drained = join_all(inputs.into_iter().map(Value::into_bytes)).await;
                debug!(
                    bytes = drained.iter().map(bytes::Bytes::len).sum::<usize>(),
                    "discarded"
                );
                Ok(Vec::new())
            }

            AlgebraBox::Anchor { name, inner } => {
                // Bind before running the body: the body may call itself.
                self.ctx.bind(name, inner.clone());
                self.eval(inner, inputs).await
            }

            AlgebraBox::Alias { name } => {
                let input = take_single(inputs).resolve_shallow().await;
                if input.is_null() {
                    return Ok(vec![Value::Null]);
                }
                let Some(bound) = self.ctx.lookup(name) else {
                    return Err(ExecError::UnresolvedReference { name: name.clone() });
                };
                let out = self.run_bound(name, bound, input).await?;
                Ok(vec![out])
            }

            AlgebraBox::Program { name, args } => {
                let input = take_single(inputs).resolve_shallow().await;
                if input.is_null() {
                    return Ok(vec![Value::Null]);
                }
                // The live anchor environment shadows external commands, so
                // a tag can invoke a recursive "command" defined in-document.
                if let Some(bound) = self.ctx.lookup(name) {
                    let out = self.run_bound(name, bound, input).await?;
                    return Ok(vec![out]);
                }
                let out = process::run_program(name, args, input, self.ctx.config())?;
                Ok(vec![out])
            }
        }
    }

    /// Re-enter the functor on a bound diagram (alias or anchored command).
    async fn run_bound(
        &self,
        name: &str,
        bound: Arc<Diagram>,
        input: Value,
    ) -> Result<Value, ExecError> {
        let Some(_guard) = self.ctx.enter_alias() else {
            return Err(ExecError::RecursionOverrun {
                name: name.to_string(),
                limit: self.ctx.config().recursion_limit,
            });
        };
        let outputs = self.eval(&bound, vec![input]).await?;
        Ok(collapse(outputs))
    }

    /// Duplicate one value into `n` independent views.
    async fn fan_value(&self, value: Value, n: usize) -> Vec<Value> {
        match value {
            Value::Stream(s) => s.tee(n).into_iter().map(Value::Stream).collect(),
            Value::Tuple(_) => {
                // A tuple may hide stream handles; materialize once so the
                // clones cannot compete for chunks.
                let concrete = materialize(value, self.ctx.config().unwrap_depth).await;
                (0..n).map(|_| concrete.clone()).collect()
            }
            other => (0..n).map(|_| other.clone()).collect(),
        }
    }
}

/// Collapse an output row into a single wire value.
fn collapse(mut outputs: Vec<Value>) -> Value {
    match outputs.len() {
        0 => Value::Null,
        1 => outputs.remove(0),
        _ => Value::Tuple(outputs),
    }
}

/// Normalize a slot row to the expected width: missing slots are fed empty
/// bytes (best-effort wiring), surplus slots are drained in the background.
fn fit_slots(mut inputs: Vec<Value>, want: usize) -> Vec<Value> {
    if inputs.len() > want {
        let surplus = inputs.split_off(want);
        drain_background(surplus);
    }
    while inputs.len() < want {
        inputs.push(Value::empty());
    }
    inputs
}

/// Drain values nobody consumes, off the critical path.
fn drain_background(values: Vec<Value>) {
    let live = values
        .into_iter()
        .filter(|v| !matches!(v, Value::Null))
        .collect::<Vec<_>>();
    if live.is_empty() {
        return;
    }
    tokio::spawn(async move {
        let drained = join_all(live.into_iter().map(Value::into_bytes)).await;
        debug!(
            slots = drained.len(),
            bytes = drained.iter().map(bytes::Bytes::len).sum::<usize>(),
            "drained surplus outputs"
        );
    });
}

/// First slot of a row, defaulting to empty input.
fn take_single(inputs: Vec<Value>) -> Value {
    inputs.into_iter().next().unwrap_or_else(Value::empty)
}
