//! Line pipeline: reader -> subject -> debounce -> writer

use anyhow::{Context, Result};
use hush_core::{Event, Observer, ObserverRef, Scheduler, Subject, TokioScheduler};
use hush_debounce::{DebounceConfig, DebounceExt, Subscription};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, info, trace, warn};

/// Upstream failure type: read errors, shared so the subject can fan out
type LineError = Arc<std::io::Error>;

/// Debounce the lines of `reader` into `writer`
///
/// A line is written once `config.due_time()` passes without a newer one.
/// At end of input the pending line is flushed (unless disabled in
/// `config`). Returns the number of lines written.
pub async fn debounce_lines<R, W>(
    reader: R,
    writer: &mut W,
    config: &DebounceConfig,
    scheduler: Arc<dyn Scheduler>,
) -> Result<usize>
where
    R: AsyncBufRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin,
{
    let subject = Arc::new(Subject::<String, LineError>::new());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let observer: ObserverRef<String, LineError> =
        Arc::new(move |event: Event<String, LineError>| {
            let _ = tx.send(event);
        });

    let subscription = subject
        .clone()
        .debounce_with(config, scheduler)
        .run(observer);
    let feeder = tokio::spawn(feed_lines(reader, subject));
    let _cleanup = Cleanup {
        subscription,
        feeder: feeder.abort_handle(),
    };

    let mut written = 0;
    while let Some(event) = rx.recv().await {
        match event {
            Event::Value(line) => {
                writer.write_all(line.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
                written += 1;
            }
            Event::Error(error) => {
                return Err(anyhow::Error::new(error)).context("Failed to read input");
            }
            Event::Completed => break,
        }
    }

    debug!("Wrote {} debounced lines", written);
    Ok(written)
}

/// Debounce stdin into stdout until end of input or Ctrl-C
pub async fn run(config: &DebounceConfig) -> Result<()> {
    let scheduler: Arc<dyn Scheduler> = Arc::new(
        TokioScheduler::try_current().context("Debouncing requires a Tokio runtime")?,
    );
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();

    info!(due_time = ?config.due_time(), flush = config.flush_on_complete, "Debouncing stdin");

    tokio::select! {
        written = debounce_lines(stdin, &mut stdout, config, scheduler) => {
            written?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, dropping pending line");
        }
    }

    Ok(())
}

/// Push every line of `reader` into `subject`, then terminate it
async fn feed_lines<R>(reader: R, subject: Arc<Subject<String, LineError>>)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                trace!("Read line ({} bytes)", line.len());
                subject.on_value(line);
            }
            Ok(None) => {
                debug!("End of input");
                subject.on_completed();
                break;
            }
            Err(e) => {
                warn!("Failed to read input: {}", e);
                subject.on_error(Arc::new(e));
                break;
            }
        }
    }
}

/// Stops the pipeline on every exit path, including cancellation
struct Cleanup {
    subscription: Subscription,
    feeder: AbortHandle,
}

impl Drop for Cleanup {
    fn drop(&mut self) {
        self.subscription.dispose();
        self.feeder.abort();
    }
}
