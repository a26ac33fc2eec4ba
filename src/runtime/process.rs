//! Subprocess orchestration for `Program` boxes.
//!
//! Commands are spawned with piped stdin/stdout and `kill_on_drop`, so a
//! cancelled run leaves no orphans. The input value is fed to stdin by a
//! background task; stdout is pumped into a [`ByteStream`] so downstream
//! stages can start consuming before the command finishes (true pipe
//! semantics, with backpressure from the bounded chunk channel).

use bytes::BytesMut;
use std::process::Stdio;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{ChildStdin, Command};
use tracing::{debug, warn};

use super::errors::ExecError;
use super::runtime_config::RuntimeConfig;
use super::value::{ByteStream, Value};

/// Run an external command against `input`.
///
/// The returned value is lazy: for ordinary commands a live stdout stream,
/// for the configured guard command a deferred value that resolves to the
/// captured output on success and to `Null` on nonzero exit.
pub(crate) fn run_program(
    name: &str,
    args: &[String],
    input: Value,
    config: &RuntimeConfig,
) -> Result<Value, ExecError> {
    let mut cmd = Command::new(name);
    cmd.args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|source| ExecError::ProcessSpawn {
        command: name.to_string(),
        source,
    })?;
    debug!(command = name, ?args, "spawned");

    if let Some(stdin) = child.stdin.take() {
        tokio::spawn(feed_stdin(stdin, input));
    }

    if name == config.guard_command {
        // Guard semantics need the exit status, so the guard buffers where
        // ordinary commands stream.
        let command = name.to_string();
        return Ok(Value::deferred(async move {
            match child.wait_with_output().await {
                Ok(out) if out.status.success() => Value::Bytes(out.stdout.into()),
                Ok(out) => {
                    debug!(command, status = %out.status, "guard suppressed output");
                    Value::Null
                }
                Err(error) => {
                    warn!(command, %error, "guard wait failed; suppressing");
                    Value::Null
                }
            }
        }));
    }

    let stdout = child.stdout.take().expect("stdout was piped");
    let (tx, stream) = ByteStream::channel();
    let command = name.to_string();
    let chunk_size = config.chunk_size;
    tokio::spawn(async move {
        let mut reader = stdout;
        loop {
            let mut buf = BytesMut::with_capacity(chunk_size);
            match reader.read_buf(&mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    if tx.send_async(buf.freeze()).await.is_err() {
                        break;
                    }
                }
                Err(error) => {
                    warn!(command, %error, "stdout read failed; ending stream");
                    break;
                }
            }
        }
        drop(tx);
        // Reap the child; nonzero exits are informational for ordinary
        // commands (stdout has already been delivered).
        match child.wait().await {
            Ok(status) if !status.success() => {
                warn!(command, %status, "command exited nonzero");
            }
            Ok(_) => {}
            Err(error) => warn!(command, %error, "failed to reap command"),
        }
    });
    Ok(Value::Stream(stream))
}

/// Relay the input value into a child's stdin, then close it.
///
/// Write failures are expected when the child exits without reading (broken
/// pipe) and only logged at debug level.
async fn feed_stdin(mut stdin: ChildStdin, input: Value) {
    let result = async {
        match input {
            Value::Stream(mut s) => {
                while let Some(chunk) = s.next_chunk().await {
                    stdin.write_all(&chunk).await?;
                }
                Ok::<_, std::io::Error>(())
            }
            other => {
                let bytes = other.into_bytes().await;
                if bytes.is_empty() {
                    Ok(())
                } else {
                    stdin.write_all(&bytes).await
                }
            }
        }
    }
    .await;
    if let Err(error) = result {
        debug!(%error, "stdin feed ended early");
    }
    let _ = stdin.shutdown().await;
}
