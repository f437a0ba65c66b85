use pulse_core::Sample;
use std::collections::VecDeque;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Samples kept when no capacity is configured.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Rolling history of samples shared between the sampling task and request
/// handlers.
///
/// Every access goes through the lock, and [`snapshot`](Self::snapshot) hands
/// out an owned copy, so readers never observe the deque while it is being
/// modified.
#[derive(Debug)]
pub struct HistoryBuffer {
    samples:  RwLock<VecDeque<Sample>>,
    capacity: usize,
}

impl HistoryBuffer {
    /// Empty buffer holding at most `capacity` samples.  Storage grows on
    /// demand past the default size.
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: RwLock::new(VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY))),
            capacity,
        }
    }

    /// Push a new sample, evicting the oldest while over capacity.
    pub fn append(&self, sample: Sample) {
        let mut samples = self.write();
        samples.push_back(sample);
        while samples.len() > self.capacity {
            samples.pop_front();
        }
    }

    /// Copy of the current contents, oldest first.
    pub fn snapshot(&self) -> Vec<Sample> {
        self.read().iter().copied().collect()
    }

    /// Most recently appended sample.
    pub fn latest(&self) -> Option<Sample> {
        self.read().back().copied()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // Samples are plain values, so a writer that panicked cannot have left a
    // half-written entry behind; recover the guard instead of propagating.
    fn read(&self) -> RwLockReadGuard<'_, VecDeque<Sample>> {
        self.samples.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, VecDeque<Sample>> {
        self.samples.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Arc;
    use std::thread;

    /// Sample tagged with a sequence number in `api_requests`.
    fn tagged(seq: u32) -> Sample {
        Sample::new(Utc::now(), 1.0, 2.0, 3.0, seq, 0.5, 0, 0)
    }

    fn tags(samples: &[Sample]) -> Vec<u32> {
        samples.iter().map(|s| s.api_requests()).collect()
    }

    #[test]
    fn empty_snapshot() {
        let history = HistoryBuffer::new(5);
        assert!(history.snapshot().is_empty());
        assert!(history.is_empty());
        assert_eq!(history.latest(), None);
    }

    #[test]
    fn length_is_min_of_appends_and_capacity() {
        for capacity in [0usize, 1, 3, 50] {
            for appends in [0u32, 1, 2, 3, 49, 50, 51, 120] {
                let history = HistoryBuffer::new(capacity);
                for seq in 0..appends {
                    history.append(tagged(seq));
                }
                assert_eq!(
                    history.snapshot().len(),
                    (appends as usize).min(capacity),
                    "capacity={capacity} appends={appends}"
                );
            }
        }
    }

    #[test]
    fn huge_capacity_does_not_preallocate() {
        let history = HistoryBuffer::new(usize::MAX);
        assert_eq!(history.capacity(), usize::MAX);
        for seq in 0..3 {
            history.append(tagged(seq));
        }
        assert_eq!(tags(&history.snapshot()), vec![0, 1, 2]);
    }

    #[test]
    fn overflow_keeps_last_c_in_order() {
        let history = HistoryBuffer::new(4);
        for seq in 1..=10 {
            history.append(tagged(seq));
        }
        assert_eq!(tags(&history.snapshot()), vec![7, 8, 9, 10]);
        assert_eq!(history.latest().map(|s| s.api_requests()), Some(10));
    }

    #[test]
    fn snapshot_is_detached_from_buffer() {
        let history = HistoryBuffer::new(3);
        history.append(tagged(1));
        let before = history.snapshot();
        history.append(tagged(2));
        assert_eq!(tags(&before), vec![1]);
        assert_eq!(tags(&history.snapshot()), vec![1, 2]);
    }

    #[test]
    fn fifty_two_ticks_evict_first_two() {
        let history = HistoryBuffer::default();
        for tick in 1..=52 {
            history.append(tagged(tick));
        }
        let snap = history.snapshot();
        assert_eq!(snap.len(), 50);
        assert_eq!(snap[0].api_requests(), 3);
        assert_eq!(snap[49].api_requests(), 52);
    }

    #[test]
    fn concurrent_readers_see_contiguous_windows() {
        const CAPACITY: usize = 16;
        const APPENDS: u32 = 5_000;

        let history = Arc::new(HistoryBuffer::new(CAPACITY));

        let writer = {
            let history = Arc::clone(&history);
            thread::spawn(move || {
                for seq in 0..APPENDS {
                    history.append(tagged(seq));
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let history = Arc::clone(&history);
                thread::spawn(move || {
                    for _ in 0..2_000 {
                        let seqs = tags(&history.snapshot());
                        assert!(seqs.len() <= CAPACITY);
                        for pair in seqs.windows(2) {
                            assert_eq!(pair[1], pair[0] + 1, "torn window: {seqs:?}");
                        }
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }

        let last = tags(&history.snapshot());
        assert_eq!(last.len(), CAPACITY);
        assert_eq!(*last.last().unwrap(), APPENDS - 1);
    }
}
