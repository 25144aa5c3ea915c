use super::{BlobAddress, BlobHandle, BlobManager};
use bytes::Bytes;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Which path reclaimed a leased blob
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleasePath {
    Timer,
    Teardown,
}

/// Single-assignment release token shared by the timer and the lease.
///
/// Only the first `consume` reaches the manager.
#[derive(Clone)]
struct ReleaseToken {
    consumed: Arc<AtomicBool>,
    manager: BlobManager,
    address: BlobAddress,
}

impl ReleaseToken {
    fn consume(&self, path: ReleasePath) -> bool {
        if self.consumed.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.manager.release(&self.address);
        tracing::debug!(address = %self.address, ?path, "blob lease released");
        true
    }

    fn is_consumed(&self) -> bool {
        self.consumed.load(Ordering::Acquire)
    }
}

/// RAII guard for a blob with bounded retention
///
/// The blob is released when the retention timer fires or when the lease is
/// dropped, whichever comes first. The later path finds the token consumed
/// and does nothing.
pub struct BlobLease {
    handle: BlobHandle,
    token: ReleaseToken,
    timer: Option<JoinHandle<()>>,
}

impl BlobLease {
    pub(super) fn start(manager: BlobManager, handle: BlobHandle, ttl: Duration) -> Self {
        let token = ReleaseToken {
            consumed: Arc::new(AtomicBool::new(false)),
            manager,
            address: handle.address.clone(),
        };

        let timer = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let token = token.clone();
                Some(runtime.spawn(async move {
                    tokio::time::sleep(ttl).await;
                    token.consume(ReleasePath::Timer);
                }))
            }
            Err(_) => {
                tracing::warn!(
                    address = %handle.address,
                    "no async runtime; blob will only be released on teardown"
                );
                None
            }
        };

        Self {
            handle,
            token,
            timer,
        }
    }

    pub fn handle(&self) -> &BlobHandle {
        &self.handle
    }

    pub fn address(&self) -> &BlobAddress {
        &self.handle.address
    }

    /// The payload, or `None` once the blob has been reclaimed
    pub fn bytes(&self) -> Option<Bytes> {
        self.token.manager.read(&self.handle.address)
    }

    pub fn is_released(&self) -> bool {
        self.token.is_consumed()
    }

    /// Release now instead of waiting for the timer or drop
    pub fn release(mut self) -> bool {
        self.teardown()
    }

    fn teardown(&mut self) -> bool {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.token.consume(ReleasePath::Teardown)
    }
}

impl std::fmt::Debug for BlobLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobLease")
            .field("handle", &self.handle)
            .field("released", &self.is_released())
            .finish()
    }
}

impl Drop for BlobLease {
    fn drop(&mut self) {
        self.teardown();
    }
}
