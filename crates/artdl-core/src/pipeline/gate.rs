//! Two-tier admission control: article page fetches and image downloads.
//!
//! Each lane is a FIFO tokio semaphore. A [`GatePermit`] holds one slot and
//! releases it when dropped, on every exit path. The lanes also track how
//! many permits are out and the highest count seen.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};

#[derive(Debug)]
struct Lane {
    name: &'static str,
    capacity: usize,
    semaphore: Arc<Semaphore>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl Lane {
    fn new(name: &'static str, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            name,
            capacity,
            semaphore: Arc::new(Semaphore::new(capacity)),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }
}

/// Slot in one lane of the gate. Dropping it frees the slot.
#[derive(Debug)]
pub struct GatePermit {
    lane: Arc<Lane>,
    _permit: OwnedSemaphorePermit,
}

impl Drop for GatePermit {
    fn drop(&mut self) {
        self.lane.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Snapshot of one lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneUsage {
    pub capacity: usize,
    pub in_flight: usize,
    pub peak: usize,
}

/// Page lane and download lane, shared by every article in a run.
#[derive(Debug, Clone)]
pub struct ConcurrencyGate {
    page: Arc<Lane>,
    download: Arc<Lane>,
}

impl ConcurrencyGate {
    /// Capacities below 1 are raised to 1.
    pub fn new(page_capacity: usize, download_capacity: usize) -> Self {
        Self {
            page: Arc::new(Lane::new("page", page_capacity)),
            download: Arc::new(Lane::new("download", download_capacity)),
        }
    }

    /// Wait for a page-fetch slot.
    pub async fn acquire_page(&self) -> Result<GatePermit, AcquireError> {
        Self::acquire(&self.page).await
    }

    /// Wait for an image-download slot.
    pub async fn acquire_download(&self) -> Result<GatePermit, AcquireError> {
        Self::acquire(&self.download).await
    }

    pub fn page_usage(&self) -> LaneUsage {
        Self::usage(&self.page)
    }

    pub fn download_usage(&self) -> LaneUsage {
        Self::usage(&self.download)
    }

    async fn acquire(lane: &Arc<Lane>) -> Result<GatePermit, AcquireError> {
        let permit = Arc::clone(&lane.semaphore).acquire_owned().await?;
        let now = lane.in_flight.fetch_add(1, Ordering::AcqRel) + 1;
        lane.peak.fetch_max(now, Ordering::AcqRel);
        tracing::trace!(lane = lane.name, in_flight = now, "gate acquired");
        Ok(GatePermit {
            lane: Arc::clone(lane),
            _permit: permit,
        })
    }

    fn usage(lane: &Lane) -> LaneUsage {
        LaneUsage {
            capacity: lane.capacity,
            in_flight: lane.in_flight.load(Ordering::Acquire),
            peak: lane.peak.load(Ordering::Acquire),
        }
    }
}
