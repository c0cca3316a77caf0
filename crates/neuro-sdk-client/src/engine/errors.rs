use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::Stream;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use neuro_sdk_core::error::NeuroError;

use crate::obs::ClientMetrics;

/// Asynchronous failures observed by the background read task.
///
/// Ends once the read task has terminated.
#[derive(Debug)]
pub struct ErrorStream {
    rx: mpsc::Receiver<NeuroError>,
}

impl ErrorStream {
    pub(crate) fn new(rx: mpsc::Receiver<NeuroError>) -> Self {
        Self { rx }
    }

    pub async fn next(&mut self) -> Option<NeuroError> {
        self.rx.recv().await
    }
}

impl Stream for ErrorStream {
    type Item = NeuroError;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

/// Publishing side, owned by the read task. Never blocks.
pub(crate) struct ErrorSink {
    tx: mpsc::Sender<NeuroError>,
    metrics: Arc<ClientMetrics>,
}

impl ErrorSink {
    pub(crate) fn new(tx: mpsc::Sender<NeuroError>, metrics: Arc<ClientMetrics>) -> Self {
        Self { tx, metrics }
    }

    pub(crate) fn publish(&self, err: NeuroError) {
        match self.tx.try_send(err) {
            Ok(()) => {}
            Err(TrySendError::Full(err)) => {
                self.metrics.dropped_errors.inc();
                tracing::warn!(error = %err, "error stream full, dropping error");
            }
            Err(TrySendError::Closed(err)) => {
                tracing::debug!(error = %err, "error stream receiver dropped");
            }
        }
    }
}
