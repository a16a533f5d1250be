//! gridview CLI
//!
//! Reads JSON documents, one per line, and renders them through any of the
//! output formats. Each document becomes one entry keyed by its position, so
//! the table format shows the header unification at work.

mod args;
mod input;

use std::io::{BufWriter, Write};
use std::process::ExitCode;

use clap::Parser;
use gridview_output::{BatchSource, OutputConfig, OutputError, renderer_for, stream_channel};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use args::Args;

/// Cancel `cancel` on the first Ctrl-C.
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupted");
            cancel.cancel();
        }
    });
}

async fn run(args: &Args, config: &OutputConfig, cancel: &CancellationToken) -> Result<usize, OutputError> {
    let renderer = renderer_for(config);
    let reader = input::open(args.input.as_deref()).await?;
    let mut sink = BufWriter::new(std::io::stdout());

    let count = if args.stream {
        let (tx, mut source) = stream_channel(config.channel_capacity);
        let producer = input::spawn_reader(reader, tx, cancel.clone());
        let rendered = renderer.render(&mut source, &mut sink, cancel).await;
        if rendered.is_err() {
            cancel.cancel();
        }
        match producer.await {
            Ok(Ok(n)) => debug!("producer delivered {n} rows"),
            Ok(Err(err)) if !err.is_cancelled() => warn!("input failed: {err}"),
            Ok(Err(_)) => {}
            Err(err) => warn!("input task failed: {err}"),
        }
        rendered?
    } else {
        let rows = input::read_documents(reader).await?;
        renderer
            .render(&mut BatchSource::new(rows), &mut sink, cancel)
            .await?
    };

    sink.flush()?;
    Ok(count)
}

/// Runs the CLI.
///
/// 1. Initializes logging on stderr
/// 2. Parses arguments and merges them with the config file
/// 3. Renders the input to stdout
/// 4. Prints the row count footer unless quiet
#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();
    let config = match args.to_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::from(2);
        }
    };

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    match run(&args, &config, &cancel).await {
        Ok(count) => {
            if !config.quiet {
                eprintln!("OK Returned {count} rows.");
            }
            ExitCode::SUCCESS
        }
        Err(err) if err.is_cancelled() => {
            if !config.quiet {
                eprintln!("Cancelled.");
            }
            ExitCode::from(130)
        }
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
