//! Bounded channel carrying per-PDF reports to the aggregator.

use tokio::sync::mpsc;

use crate::config::PipelineConfig;

/// Create a bounded channel pair with the configured buffer size.
///
/// When the buffer is full, senders wait until the aggregator catches up.
pub fn bounded_channel<T>(config: &PipelineConfig) -> (mpsc::Sender<T>, mpsc::Receiver<T>) {
    mpsc::channel(config.buffer_size.max(1))
}

/// Drain `rx` into `sink` until every sender is dropped.
///
/// Returns the number of items received.
pub async fn drain<T, F>(mut rx: mpsc::Receiver<T>, mut sink: F) -> usize
where
    F: FnMut(T),
{
    let mut count = 0;
    while let Some(item) = rx.recv().await {
        sink(item);
        count += 1;
    }
    count
}
