//! Time-windowed, thread-safe storage for decoded readings.
//!
//! One writer (the ingestion loop) appends at the tail; any number of
//! readers take snapshots or block for the next append. A single
//! mutex-plus-condvar pair guards the underlying deque. Blocking waits
//! release the lock while suspended, and every append wakes every waiter.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use padwatch_types::Reading;
use parking_lot::{Condvar, Mutex};

/// Default sliding window of history the buffer retains.
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(10);

/// One reading stamped with its receipt instant. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct TimestampedReading {
    /// When the frame was received off the wire.
    pub timestamp: Instant,
    /// The decoded frame.
    pub reading: Reading,
}

/// Ordered store of recent readings with retention-based eviction.
///
/// Entries are strictly non-decreasing by timestamp: the single writer
/// appends in arrival order and eviction only ever removes from the head,
/// so readers never observe a reordering.
#[derive(Debug)]
pub struct ReadingBuffer {
    entries: Mutex<VecDeque<TimestampedReading>>,
    updated: Condvar,
    retention: Duration,
    max_entries: Option<usize>,
}

impl ReadingBuffer {
    /// Create an empty buffer keeping `retention` worth of history.
    pub fn new(retention: Duration) -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            updated: Condvar::new(),
            retention,
            max_entries: None,
        }
    }

    /// Create a buffer that additionally caps the entry count.
    ///
    /// Time-based pruning alone leaves memory unbounded against a
    /// pathologically fast writer; the cap evicts from the head once the
    /// count exceeds `max_entries`.
    pub fn with_max_entries(retention: Duration, max_entries: usize) -> Self {
        Self {
            max_entries: Some(max_entries),
            ..Self::new(retention)
        }
    }

    /// The retention window fixed at construction.
    pub fn retention(&self) -> Duration {
        self.retention
    }

    /// Append a reading stamped with the current instant.
    pub fn push(&self, reading: Reading) {
        self.push_at(Instant::now(), reading);
    }

    /// Append a reading with an explicit timestamp, prune expired entries,
    /// and wake every blocked reader.
    ///
    /// The caller guarantees timestamps are non-decreasing across calls
    /// (single-writer assumption). Pruning is anchored to the appended
    /// timestamp, which for the live writer is the receipt instant.
    pub fn push_at(&self, timestamp: Instant, reading: Reading) {
        let mut entries = self.entries.lock();
        entries.push_back(TimestampedReading { timestamp, reading });
        Self::prune(&mut entries, timestamp, self.retention);
        if let Some(cap) = self.max_entries {
            while entries.len() > cap {
                entries.pop_front();
            }
        }
        self.updated.notify_all();
    }

    /// Drop head entries older than `now - retention`.
    fn prune(entries: &mut VecDeque<TimestampedReading>, now: Instant, retention: Duration) {
        let Some(cutoff) = now.checked_sub(retention) else {
            return;
        };
        while entries.front().is_some_and(|e| e.timestamp < cutoff) {
            entries.pop_front();
        }
    }

    /// An ordered copy of the current contents. Never blocks.
    pub fn snapshot(&self) -> Vec<TimestampedReading> {
        self.entries.lock().iter().cloned().collect()
    }

    /// Entries no older than `window`.
    ///
    /// A window wider than the retention period is simply bounded by what
    /// pruning already discarded; nothing is resurrected.
    pub fn snapshot_since(&self, window: Duration) -> Vec<TimestampedReading> {
        let Some(cutoff) = Instant::now().checked_sub(window) else {
            return self.snapshot();
        };
        self.entries
            .lock()
            .iter()
            .filter(|e| e.timestamp >= cutoff)
            .cloned()
            .collect()
    }

    /// Block until the next append or until `timeout` elapses, whichever
    /// comes first, then return the full snapshot.
    ///
    /// Safe to call from any number of reader threads concurrently; an
    /// append wakes all of them.
    pub fn wait_for_update(&self, timeout: Duration) -> Vec<TimestampedReading> {
        let mut entries = self.entries.lock();
        // Whether an append or the timeout woke us, the answer is the same:
        // whatever the buffer holds now.
        let _ = self.updated.wait_for(&mut entries, timeout);
        entries.iter().cloned().collect()
    }

    /// The most recent entry, if any. O(1).
    pub fn latest(&self) -> Option<TimestampedReading> {
        self.entries.lock().back().cloned()
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the buffer holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Discard all entries. Waiters are not woken; nothing new arrived.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    fn reading(tag: i32) -> Reading {
        Reading {
            raw: [tag, tag, tag, tag],
            sensor: [tag as f64; 4],
            keys: [false; 4],
            threshold: 0.0,
        }
    }

    #[test]
    fn retention_prunes_only_expired_head_entries() {
        let buffer = ReadingBuffer::new(Duration::from_secs(10));
        let base = Instant::now();

        for secs in [0u64, 3, 9, 12] {
            buffer.push_at(base + Duration::from_secs(secs), reading(secs as i32));
        }

        let snapshot = buffer.snapshot();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot[0].timestamp, base + Duration::from_secs(3));
        assert_eq!(snapshot[1].timestamp, base + Duration::from_secs(9));
        assert_eq!(snapshot[2].timestamp, base + Duration::from_secs(12));
    }

    #[test]
    fn snapshot_is_ordered_by_timestamp() {
        let buffer = ReadingBuffer::new(Duration::from_secs(60));
        let base = Instant::now();
        for secs in 0..5u64 {
            buffer.push_at(base + Duration::from_secs(secs), reading(secs as i32));
        }

        let snapshot = buffer.snapshot();
        assert!(snapshot.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn snapshot_is_idempotent_without_appends() {
        let buffer = ReadingBuffer::new(Duration::from_secs(60));
        buffer.push(reading(1));
        buffer.push(reading(2));

        assert_eq!(buffer.snapshot(), buffer.snapshot());
    }

    #[test]
    fn snapshot_does_not_drain_the_buffer() {
        let buffer = ReadingBuffer::new(Duration::from_secs(60));
        buffer.push(reading(7));
        let _ = buffer.snapshot();
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn snapshot_since_filters_by_window() {
        let buffer = ReadingBuffer::new(Duration::from_secs(60));
        let base = Instant::now() - Duration::from_secs(6);
        buffer.push_at(base, reading(1));
        buffer.push_at(base + Duration::from_secs(5), reading(2));

        let recent = buffer.snapshot_since(Duration::from_secs(2));
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].reading.raw, [2, 2, 2, 2]);
    }

    #[test]
    fn snapshot_since_cannot_resurrect_pruned_entries() {
        let buffer = ReadingBuffer::new(Duration::from_secs(1));
        let base = Instant::now() - Duration::from_secs(5);
        buffer.push_at(base, reading(1));
        buffer.push_at(Instant::now(), reading(2));

        // Window wider than retention: only what survived pruning remains.
        let all = buffer.snapshot_since(Duration::from_secs(60));
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].reading.raw, [2, 2, 2, 2]);
    }

    #[test]
    fn latest_returns_newest_entry() {
        let buffer = ReadingBuffer::new(Duration::from_secs(60));
        assert!(buffer.latest().is_none());

        buffer.push(reading(1));
        buffer.push(reading(2));
        assert_eq!(buffer.latest().unwrap().reading.raw, [2, 2, 2, 2]);
    }

    #[test]
    fn wait_for_update_times_out_without_appends() {
        let buffer = ReadingBuffer::new(Duration::from_secs(60));
        let timeout = Duration::from_millis(100);

        let started = Instant::now();
        let snapshot = buffer.wait_for_update(timeout);
        let elapsed = started.elapsed();

        assert!(snapshot.is_empty());
        assert!(elapsed >= timeout);
        assert!(elapsed < timeout + Duration::from_millis(250), "took {elapsed:?}");
    }

    #[test]
    fn wait_for_update_returns_early_on_append() {
        let buffer = Arc::new(ReadingBuffer::new(Duration::from_secs(60)));

        let writer = {
            let buffer = Arc::clone(&buffer);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(50));
                buffer.push(reading(9));
            })
        };

        let started = Instant::now();
        let snapshot = buffer.wait_for_update(Duration::from_secs(5));
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(snapshot.len(), 1);

        writer.join().unwrap();
    }

    #[test]
    fn single_append_wakes_every_waiter() {
        let buffer = Arc::new(ReadingBuffer::new(Duration::from_secs(60)));

        let readers: Vec<_> = (0..2)
            .map(|_| {
                let buffer = Arc::clone(&buffer);
                thread::spawn(move || buffer.wait_for_update(Duration::from_secs(5)))
            })
            .collect();

        // Give both readers time to block before the append.
        thread::sleep(Duration::from_millis(100));
        buffer.push(reading(3));

        for reader in readers {
            let snapshot = reader.join().unwrap();
            assert_eq!(snapshot.len(), 1);
            assert_eq!(snapshot[0].reading.raw, [3, 3, 3, 3]);
        }
    }

    #[test]
    fn entry_cap_evicts_from_the_head() {
        let buffer = ReadingBuffer::with_max_entries(Duration::from_secs(60), 3);
        for tag in 0..5 {
            buffer.push(reading(tag));
        }

        let snapshot = buffer.snapshot();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot[0].reading.raw, [2, 2, 2, 2]);
        assert_eq!(snapshot[2].reading.raw, [4, 4, 4, 4]);
    }

    #[test]
    fn clear_empties_the_buffer() {
        let buffer = ReadingBuffer::new(Duration::from_secs(60));
        buffer.push(reading(1));
        buffer.clear();
        assert!(buffer.is_empty());
        assert!(buffer.latest().is_none());
    }
}
