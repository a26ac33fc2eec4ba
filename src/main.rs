//! `yawl` CLI: run YAML pipeline programs.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use miette::Report;
use tracing::debug;

use yawl::construct::compile_stream;
use yawl::loader::load_str;
use yawl::runtime::{
    ByteStream, ExecutionContext, Executor, RuntimeConfig, StdOutSink, Value,
};
use yawl::telemetry;

/// Exit codes: 0 success, 1 runtime failure, 2 compile failure,
/// 3 end of interactive session, 130 interrupt.
const EXIT_RUNTIME: u8 = 1;
const EXIT_COMPILE: u8 = 2;
const EXIT_END_OF_SESSION: u8 = 3;
const EXIT_INTERRUPT: u8 = 130;

#[derive(Parser, Debug)]
#[command(
    name = "yawl",
    version,
    about = "Run YAML documents as byte-stream pipelines"
)]
struct Cli {
    /// Program file. When omitted (and without -c), the program is read
    /// from standard input.
    source: Option<PathBuf>,

    /// Inline program text.
    #[arg(short = 'c', long = "command", conflicts_with = "source")]
    command: Option<String>,

    /// Print the compiled diagrams as JSON instead of executing.
    #[arg(long)]
    dump_diagram: bool,

    /// Override the guard command name (default: test, or YAWL_GUARD_COMMAND).
    #[arg(long)]
    guard: Option<String>,

    /// Override the alias recursion limit.
    #[arg(long)]
    recursion_limit: Option<usize>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    telemetry::init();
    let cli = Cli::parse();

    let interactive =
        cli.source.is_none() && cli.command.is_none() && std::io::stdin().is_terminal();
    let program_from_stdin = cli.source.is_none() && cli.command.is_none();

    let text = match read_program(&cli).await {
        Ok(text) => text,
        Err(report) => {
            eprintln!("{report:?}");
            return ExitCode::from(EXIT_COMPILE);
        }
    };

    // Compile errors are fatal and reported before anything executes.
    let documents = match load_str(&text)
        .map_err(Report::from)
        .and_then(|graph| compile_stream(&graph).map_err(Report::from))
    {
        Ok(documents) => documents,
        Err(report) => {
            eprintln!("{report:?}");
            return ExitCode::from(EXIT_COMPILE);
        }
    };

    if cli.dump_diagram {
        match serde_json::to_string_pretty(&documents) {
            Ok(json) => {
                println!("{json}");
                return ExitCode::SUCCESS;
            }
            Err(error) => {
                eprintln!("{:?}", Report::msg(error.to_string()));
                return ExitCode::from(EXIT_RUNTIME);
            }
        }
    }

    let mut config = RuntimeConfig::from_env();
    if let Some(guard) = cli.guard {
        config = config.with_guard_command(guard);
    }
    if let Some(limit) = cli.recursion_limit {
        config = config.with_recursion_limit(limit);
    }

    // When the program came from a file or -c, a piped stdin becomes the
    // pipeline's input stream; otherwise the pipeline starts from nothing.
    let input = if !program_from_stdin && !std::io::stdin().is_terminal() {
        let chunk_size = config.chunk_size;
        Value::Stream(ByteStream::from_reader(tokio::io::stdin(), chunk_size))
    } else {
        Value::empty()
    };

    let ctx = ExecutionContext::new(config, Arc::new(StdOutSink::default()));
    let executor = Executor::new(Arc::new(ctx));

    // Dropping the run future on interrupt also drops its children; they
    // are spawned kill_on_drop, so no orphans survive the select.
    tokio::select! {
        result = executor.run_stream(&documents, input) => match result {
            Ok(()) => {
                debug!(interactive, "run complete");
                if interactive {
                    ExitCode::from(EXIT_END_OF_SESSION)
                } else {
                    ExitCode::SUCCESS
                }
            }
            Err(error) => {
                eprintln!("{:?}", Report::from(error));
                ExitCode::from(EXIT_RUNTIME)
            }
        },
        _ = tokio::signal::ctrl_c() => {
            eprintln!("interrupted");
            ExitCode::from(EXIT_INTERRUPT)
        }
    }
}

async fn read_program(cli: &Cli) -> Result<String, Report> {
    if let Some(text) = &cli.command {
        return Ok(text.clone());
    }
    if let Some(path) = &cli.source {
        return std::fs::read_to_string(path)
            .map_err(|e| Report::msg(format!("cannot read {}: {e}", path.display())));
    }
    let mut buf = String::new();
    tokio::io::AsyncReadExt::read_to_string(&mut tokio::io::stdin(), &mut buf)
        .await
        .map_err(|e| Report::msg(format!("cannot read program from stdin: {e}")))?;
    Ok(buf)
}
