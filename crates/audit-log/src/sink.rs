use std::path::Path;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::entry::AuditEntry;
use crate::writer::{AuditWriteError, AuditWriter};

/// Channel buffer size used between producers and the background writer task.
const CHANNEL_BUFFER: usize = 1024;

/// Flush the writer after this much channel inactivity.
const FLUSH_INTERVAL: Duration = Duration::from_secs(1);

/// A cheap, cloneable handle used to submit [`AuditEntry`] values into the
/// background audit-log writer.
///
/// `AuditSink` is `Clone + Send + Sync` so it can be shared freely across
/// tasks and request handlers.
#[derive(Clone)]
pub struct AuditSink {
    tx: mpsc::Sender<AuditEntry>,
}

impl AuditSink {
    /// Spawn the background writer task and return a `(sink, join_handle)` pair.
    ///
    /// The task writes each entry as a JSON line, flushes after a second of
    /// inactivity, and flushes once more and exits when
    /// the last `AuditSink` clone is dropped.  I/O errors are logged via
    /// `tracing::error` and the entry is skipped.
    pub async fn start(
        path: impl AsRef<Path>,
    ) -> Result<(Self, JoinHandle<()>), AuditWriteError> {
        let (tx, rx) = mpsc::channel::<AuditEntry>(CHANNEL_BUFFER);

        let writer = AuditWriter::new(path).await?;
        tracing::debug!(path = %writer.path().display(), "audit writer started");

        let handle = tokio::spawn(run_writer_loop(writer, rx));

        Ok((Self { tx }, handle))
    }

    /// Send an audit entry to the background writer.
    ///
    /// Waits for channel space when the buffer is full.  If the background
    /// task has already exited the entry is dropped and a warning is logged.
    pub async fn log(&self, entry: AuditEntry) {
        if let Err(err) = self.tx.send(entry).await {
            tracing::warn!(
                event_type = ?err.0.event_type,
                "audit sink channel closed; entry dropped"
            );
        }
    }

    /// Drop this handle and wait for the writer to drain and flush.
    ///
    /// Other live clones keep the writer running, in which case this waits
    /// until they are dropped too.
    pub async fn close(self, handle: JoinHandle<()>) {
        drop(self);
        if let Err(err) = handle.await {
            tracing::error!(%err, "audit writer task failed");
        }
    }
}

/// Core loop executed inside the background task.
async fn run_writer_loop(mut writer: AuditWriter, mut rx: mpsc::Receiver<AuditEntry>) {
    let mut dirty = false;

    loop {
        match tokio::time::timeout(FLUSH_INTERVAL, rx.recv()).await {
            Ok(Some(entry)) => match writer.write(&entry).await {
                Ok(()) => dirty = true,
                Err(err) => tracing::error!(%err, "failed to write audit entry"),
            },
            Ok(None) => {
                if dirty {
                    if let Err(err) = writer.flush().await {
                        tracing::error!(%err, "failed to flush audit log on shutdown");
                    }
                }
                tracing::debug!("audit writer background task shutting down");
                return;
            }
            Err(_) if dirty => match writer.flush().await {
                Ok(()) => dirty = false,
                Err(err) => tracing::error!(%err, "periodic audit log flush failed"),
            },
            Err(_) => {}
        }
    }
}
