//! Startup readiness detection
//!
//! A spawned launch signals readiness by printing a marker line on its
//! diagnostic stream. The watcher scans that stream on a background task and
//! resolves a one-shot signal so the caller can bound the wait with a deadline.

use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Resolution of one readiness watch.
///
/// The deadline case is not represented here: an elapsed timeout is observed
/// by the waiting side in [`ReadinessWatcher::wait_ready`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessSignal {
    /// A line containing the startup marker was seen
    Detected,
    /// The stream ended before the marker appeared
    StreamClosed,
}

/// Scans a launch's diagnostic stream for a startup marker line.
///
/// Every line read is echoed to the host's stderr so operators still see the
/// service's startup output. Once the marker is detected the watcher stops
/// reading but keeps holding the stream: the remainder is not drained, and the
/// read end stays open for as long as the supervising program runs.
pub struct ReadinessWatcher {
    rx: oneshot::Receiver<ReadinessSignal>,
}

impl ReadinessWatcher {
    /// Spawn a watcher task over the given stream.
    ///
    /// Read errors are logged and end the watch without a signal; the waiting
    /// side then resolves via its deadline.
    pub fn spawn<R>(stream: R, marker: impl Into<String>) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        let marker = marker.into();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let mut lines = BufReader::new(stream).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        // Pass through for operator visibility
                        eprintln!("{line}");
                        if line.contains(&marker) {
                            debug!(marker = %marker, "Startup marker detected");
                            let _ = tx.send(ReadinessSignal::Detected);
                            // Keep the read end open without reading further.
                            // Dropping it would close the pipe and the service
                            // would take SIGPIPE on its next write; at worst it
                            // now blocks once the pipe fills.
                            std::future::pending::<()>().await;
                            return;
                        }
                    }
                    Ok(None) => {
                        debug!("Diagnostic stream closed before startup marker appeared");
                        let _ = tx.send(ReadinessSignal::StreamClosed);
                        return;
                    }
                    Err(e) => {
                        warn!(error = %e, "Error reading diagnostic stream");
                        return;
                    }
                }
            }
        });

        Self { rx }
    }

    /// Wait up to `deadline` for the readiness signal.
    ///
    /// Returns `true` only when the marker was detected in time. A closed
    /// stream, an elapsed deadline, and a watcher that died without signalling
    /// all count as startup failure.
    pub async fn wait_ready(self, deadline: Duration) -> bool {
        matches!(
            tokio::time::timeout(deadline, self.rx).await,
            Ok(Ok(ReadinessSignal::Detected))
        )
    }
}
