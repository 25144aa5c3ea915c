//! Blob lifecycle management
//!
//! Fetched payloads are held in memory behind a locally addressable
//! [`BlobHandle`], the client-side equivalent of an object URL. Whoever
//! creates a blob owns it and must release it exactly once. Releasing an
//! address that is already gone, or was never issued, is a silent no-op.
//!
//! [`BlobManager::lease`] wraps a blob in a [`BlobLease`] that releases it
//! either when its retention timer fires or when the lease is dropped,
//! whichever happens first.

mod lease;

pub use lease::{BlobLease, ReleasePath};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

const ADDRESS_SCHEME: &str = "blob:docvault/";

/// Local address of an in-memory blob
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobAddress(String);

impl BlobAddress {
    fn generate() -> Self {
        Self(format!("{ADDRESS_SCHEME}{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Descriptor of a created blob. The payload itself stays in the manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobHandle {
    pub address: BlobAddress,
    pub content_type: String,
    pub size: usize,
    pub created_at: DateTime<Utc>,
    pub ttl: Option<Duration>,
}

struct BlobEntry {
    bytes: Bytes,
    content_type: String,
}

/// Registry of live blobs
struct BlobRegistry {
    blobs: HashMap<BlobAddress, BlobEntry>,
}

impl BlobRegistry {
    fn new() -> Self {
        Self {
            blobs: HashMap::with_capacity(8),
        }
    }
}

#[derive(Default)]
struct BlobStats {
    created: AtomicU64,
    released: AtomicU64,
    redundant_releases: AtomicU64,
}

/// Counters describing the manager's history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlobStatsSnapshot {
    pub created: u64,
    pub released: u64,
    pub redundant_releases: u64,
    pub live: usize,
}

/// Owns every blob created by the client. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct BlobManager {
    registry: Arc<Mutex<BlobRegistry>>,
    stats: Arc<BlobStats>,
}

impl Default for BlobManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BlobManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobManager")
            .field("live", &self.live_count())
            .finish()
    }
}

impl BlobManager {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(BlobRegistry::new())),
            stats: Arc::new(BlobStats::default()),
        }
    }

    /// Store a payload and hand back its handle. The caller owns the release.
    pub fn create(&self, bytes: impl Into<Bytes>, content_type: impl Into<String>) -> BlobHandle {
        self.create_with_ttl(bytes.into(), content_type.into(), None)
    }

    fn create_with_ttl(
        &self,
        bytes: Bytes,
        content_type: String,
        ttl: Option<Duration>,
    ) -> BlobHandle {
        let address = BlobAddress::generate();
        let handle = BlobHandle {
            address: address.clone(),
            content_type: content_type.clone(),
            size: bytes.len(),
            created_at: Utc::now(),
            ttl,
        };

        self.registry
            .lock()
            .blobs
            .insert(address, BlobEntry { bytes, content_type });
        self.stats.created.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(address = %handle.address, size = handle.size, "created blob");
        handle
    }

    /// Reclaim a blob. Unknown or already released addresses are ignored.
    pub fn release(&self, address: &BlobAddress) {
        let removed = self.registry.lock().blobs.remove(address);
        match removed {
            Some(entry) => {
                self.stats.released.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(%address, size = entry.bytes.len(), "released blob");
            }
            None => {
                self.stats.redundant_releases.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(%address, "release of unknown blob ignored");
            }
        }
    }

    /// Store a payload under a lease that releases it after `ttl` or on drop
    pub fn lease(
        &self,
        bytes: impl Into<Bytes>,
        content_type: impl Into<String>,
        ttl: Duration,
    ) -> BlobLease {
        let handle = self.create_with_ttl(bytes.into(), content_type.into(), Some(ttl));
        BlobLease::start(self.clone(), handle, ttl)
    }

    /// The payload behind an address, if it is still live
    pub fn read(&self, address: &BlobAddress) -> Option<Bytes> {
        self.registry
            .lock()
            .blobs
            .get(address)
            .map(|entry| entry.bytes.clone())
    }

    pub fn content_type(&self, address: &BlobAddress) -> Option<String> {
        self.registry
            .lock()
            .blobs
            .get(address)
            .map(|entry| entry.content_type.clone())
    }

    pub fn is_live(&self, address: &BlobAddress) -> bool {
        self.registry.lock().blobs.contains_key(address)
    }

    pub fn live_count(&self) -> usize {
        self.registry.lock().blobs.len()
    }

    pub fn stats(&self) -> BlobStatsSnapshot {
        BlobStatsSnapshot {
            created: self.stats.created.load(Ordering::Relaxed),
            released: self.stats.released.load(Ordering::Relaxed),
            redundant_releases: self.stats.redundant_releases.load(Ordering::Relaxed),
            live: self.live_count(),
        }
    }
}
