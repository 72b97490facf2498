// ── Reactive door stream ──
//
// Subscription type for consuming snapshot replacements from the
// DoorStore.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::store::DoorTable;

/// A subscription to the door snapshot sequence.
///
/// Provides both point-in-time snapshot access and change notification
/// via the `changed()` method or by converting to a `Stream`.
pub struct DoorStream {
    current: Arc<DoorTable>,
    receiver: watch::Receiver<Arc<DoorTable>>,
}

impl DoorStream {
    pub(crate) fn new(receiver: watch::Receiver<Arc<DoorTable>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Get the snapshot captured at creation time (or last `changed()`).
    pub fn current(&self) -> &Arc<DoorTable> {
        &self.current
    }

    /// Get the latest snapshot (may have changed since creation).
    pub fn latest(&self) -> Arc<DoorTable> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next snapshot replacement, returning the new table.
    /// Returns `None` if the sender (DoorStore) has been dropped.
    pub async fn changed(&mut self) -> Option<Arc<DoorTable>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> DoorWatchStream {
        DoorWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
///
/// Yields a new `Arc<DoorTable>` each time the store snapshot is
/// replaced.
pub struct DoorWatchStream {
    inner: WatchStream<Arc<DoorTable>>,
}

impl Stream for DoorWatchStream {
    type Item = Arc<DoorTable>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        // WatchStream is Unpin when the inner type is Unpin, and
        // Arc<DoorTable> always is.
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
