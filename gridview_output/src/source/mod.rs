//! Row sources.
//!
//! Renderers pull rows one at a time through [`RowSource`]. A
//! [`BatchSource`] hands out an already materialized result; a
//! [`StreamedSource`] receives rows from a concurrent producer through a
//! bounded channel, so a full channel holds the producer back.
//!
//! Cancellation is cooperative: both ends watch the same
//! [`CancellationToken`]. Once the consumer observes it, no further rows are
//! handed out, and the producer stops sending as soon as its pending send
//! loses the race against the token.

mod cursor;

pub use cursor::*;

use std::collections::VecDeque;

use async_trait::async_trait;
use gridview_types::Row;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::OutputError;

/// A pull-based sequence of rows.
#[async_trait]
pub trait RowSource: Send {
    /// The next row, or `None` once the source is exhausted.
    ///
    /// # Errors
    ///
    /// [`OutputError::StreamCancelled`] once `cancel` has fired on a live
    /// source; [`OutputError::Source`] when the producer failed.
    async fn next_row(&mut self, cancel: &CancellationToken) -> Result<Option<Row>, OutputError>;
}

/// A finished result held in memory.
///
/// The rows are already complete, so cancellation is not consulted here;
/// renderers check it between rows themselves.
#[derive(Debug, Default)]
pub struct BatchSource {
    rows: VecDeque<Row>,
}

impl BatchSource {
    /// Wrap a materialized result.
    pub fn new(rows: impl IntoIterator<Item = Row>) -> Self {
        Self {
            rows: rows.into_iter().collect(),
        }
    }

    /// Rows not yet pulled.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }
}

#[async_trait]
impl RowSource for BatchSource {
    async fn next_row(&mut self, _cancel: &CancellationToken) -> Result<Option<Row>, OutputError> {
        Ok(self.rows.pop_front())
    }
}

/// What a producer puts on the stream channel.
pub type StreamItem = Result<Row, OutputError>;

/// Consumer end of a streaming channel.
#[derive(Debug)]
pub struct StreamedSource {
    rx: mpsc::Receiver<StreamItem>,
}

/// Producer end of a streaming channel.
#[derive(Debug, Clone)]
pub struct RowSender {
    tx: mpsc::Sender<StreamItem>,
}

/// Create a bounded streaming channel holding at most `capacity` rows.
///
/// A zero capacity is raised to one.
#[must_use]
pub fn stream_channel(capacity: usize) -> (RowSender, StreamedSource) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (RowSender { tx }, StreamedSource { rx })
}

impl RowSender {
    /// Send a row, waiting for channel space unless `cancel` fires first.
    ///
    /// # Errors
    ///
    /// [`OutputError::StreamCancelled`] when the token fired or the consumer
    /// has gone away; the row is dropped in both cases.
    pub async fn send(&self, row: Row, cancel: &CancellationToken) -> Result<(), OutputError> {
        self.send_item(Ok(row), cancel).await
    }

    /// Report a producer failure to the consumer.
    ///
    /// # Errors
    ///
    /// Same as [`RowSender::send`].
    pub async fn fail(&self, err: OutputError, cancel: &CancellationToken) -> Result<(), OutputError> {
        self.send_item(Err(err), cancel).await
    }

    async fn send_item(&self, item: StreamItem, cancel: &CancellationToken) -> Result<(), OutputError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(OutputError::StreamCancelled),
            sent = self.tx.send(item) => sent.map_err(|_| {
                debug!("row consumer dropped, stopping producer");
                OutputError::StreamCancelled
            }),
        }
    }
}

#[async_trait]
impl RowSource for StreamedSource {
    async fn next_row(&mut self, cancel: &CancellationToken) -> Result<Option<Row>, OutputError> {
        if cancel.is_cancelled() {
            return Err(OutputError::StreamCancelled);
        }
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(OutputError::StreamCancelled),
            item = self.rx.recv() => item.transpose(),
        }
    }
}

/// Pull every remaining row into memory.
///
/// # Errors
///
/// Whatever [`RowSource::next_row`] returns.
pub async fn collect_rows(
    source: &mut dyn RowSource,
    cancel: &CancellationToken,
) -> Result<Vec<Row>, OutputError> {
    let mut rows = Vec::new();
    while let Some(row) = source.next_row(cancel).await? {
        rows.push(row);
    }
    Ok(rows)
}
