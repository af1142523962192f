//! Host driver: parses CLI arguments, reads records from stdin, and drives
//! a [`pipeline_core::Pipeline`] to completion. Spec §6's "Host CLI
//! contract" and "Host input contract".

use clap::Parser;
use pipeline_core::{Pipeline, QueueError, Record, StageError, StageSpec};
use std::io::{BufRead, Write};
use std::process::ExitCode;

/// `<program> <queue_size> <stage_name>...`
#[derive(Parser, Debug)]
#[command(
    name = "pipe",
    about = "Streams stdin through a chain of string-transformation stages"
)]
struct Args {
    /// Capacity shared by every stage's queue. Must be a positive integer.
    queue_size: String,
    /// One or more stage names, applied in order (uppercase, reverse,
    /// rotate, expand, log, typewriter).
    #[arg(required = true)]
    stages: Vec<String>,
}

fn main() -> ExitCode {
    env_logger::init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(1);
        }
    };

    let queue_size: usize = match args.queue_size.parse() {
        Ok(n) if n > 0 => n,
        _ => {
            eprintln!(
                "usage: pipe <queue_size> <stage_name>...\n\
                 queue_size must be a positive integer, got {:?}",
                args.queue_size
            );
            return ExitCode::from(1);
        }
    };

    let mut specs = Vec::with_capacity(args.stages.len());
    for name in &args.stages {
        match pipeline_core::transforms::lookup(name) {
            Some(transform) => specs.push(StageSpec {
                name: name.clone(),
                transform,
            }),
            None => {
                eprintln!(
                    "unknown stage {name:?}; known stages are: {}",
                    pipeline_core::transforms::NAMES.join(", ")
                );
                return ExitCode::from(1);
            }
        }
    }

    let pipeline = match Pipeline::new(specs, queue_size) {
        Ok(p) => p,
        Err(e) => {
            log::error!("stage initialization failed: {e}");
            return ExitCode::from(2);
        }
    };

    if let Err(e) = drive(&pipeline) {
        log::error!("pipeline shutdown failed: {e}");
        return ExitCode::from(2);
    }

    ExitCode::SUCCESS
}

/// Feeds stdin into `pipeline`, then places the sentinel and waits for a
/// clean shutdown.
///
/// Reads raw bytes rather than `BufRead::lines()` — the latter requires
/// every line to be valid UTF-8, but spec §6's host input contract only
/// forbids embedded NULs. A line with invalid UTF-8 is a perfectly valid
/// record; reading bytes means one bad line is just one bad line, not a
/// reason to stop reading every line after it.
fn drive(pipeline: &Pipeline) -> Result<(), StageError> {
    let stdin = std::io::stdin();
    let mut stdin = stdin.lock();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let n = match stdin.read_until(b'\n', &mut buf) {
            Ok(n) => n,
            Err(e) => {
                log::warn!("error reading stdin, stopping early: {e}");
                break;
            }
        };
        if n == 0 {
            break; // EOF
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
        }

        if !pipeline_core::record_is_valid(&buf) {
            log::warn!("dropping line with embedded NUL");
            continue;
        }

        let record = Record::new(std::mem::take(&mut buf));

        if pipeline_core::is_sentinel(&record) {
            // The host contract lets the literal sentinel line end input
            // early; place it and stop reading, exactly as a normal
            // shutdown would.
            break;
        }

        match pipeline.place_work(&record) {
            Ok(()) => {}
            Err(StageError::Queue(QueueError::QueueFinished)) => break,
            Err(e) => return Err(e),
        }
    }

    pipeline.shutdown()?;
    let _ = std::io::stdout().flush();
    Ok(())
}
