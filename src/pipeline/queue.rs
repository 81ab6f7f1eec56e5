//! Bounded circular queue carrying file paths from the walker to the hashers.
//!
//! # Overview
//!
//! [`BoundedPathQueue`] is a fixed-capacity ring buffer protected by a
//! single mutex. Producers block in [`enqueue`](BoundedPathQueue::enqueue)
//! while the ring is full; consumers block in
//! [`dequeue`](BoundedPathQueue::dequeue) while it is empty, up to a
//! timeout.
//!
//! Taking an item is a single critical section: the slot at `head` is
//! moved out, `head` advances and a producer is woken before the lock is
//! released. No consumer can observe a slot another consumer has already
//! taken.
//!
//! # Example
//!
//! ```
//! use dupehound::pipeline::BoundedPathQueue;
//! use dupehound::scanner::PathEntry;
//! use std::path::PathBuf;
//! use std::time::Duration;
//!
//! let queue = BoundedPathQueue::new(2);
//! queue.enqueue(PathEntry::new(PathBuf::from("/a")).unwrap());
//! assert_eq!(queue.free_space(), 1);
//!
//! let entry = queue.dequeue(Duration::from_millis(10)).unwrap();
//! assert_eq!(entry.to_string(), "/a");
//! assert!(queue.dequeue(Duration::from_millis(10)).is_none());
//! ```

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::scanner::PathEntry;

/// Ring storage and indices. Only touched with the queue mutex held.
#[derive(Debug)]
struct Ring {
    slots: Vec<Option<PathEntry>>,
    /// Next slot to consume.
    head: usize,
    /// Next slot to produce into.
    tail: usize,
    /// Distinguishes full from empty when `head == tail`.
    full: bool,
    /// Set once no consumer is left; further enqueues are refused.
    closed: bool,
}

impl Ring {
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn is_empty(&self) -> bool {
        !self.full && self.head == self.tail
    }

    fn len(&self) -> usize {
        if self.full {
            self.capacity()
        } else if self.tail >= self.head {
            self.tail - self.head
        } else {
            self.capacity() - self.head + self.tail
        }
    }

    fn push(&mut self, entry: PathEntry) {
        debug_assert!(!self.full);
        self.slots[self.tail] = Some(entry);
        self.tail = (self.tail + 1) % self.capacity();
        self.full = self.tail == self.head;
    }

    fn take(&mut self) -> Option<PathEntry> {
        if self.is_empty() {
            return None;
        }
        let entry = self.slots[self.head].take();
        self.head = (self.head + 1) % self.capacity();
        self.full = false;
        entry
    }
}

/// Fixed-capacity, multi-consumer path queue with blocking backpressure.
///
/// One mutex guards the ring. Two condition variables hang off it so that
/// a producer signal only ever wakes consumers and vice versa.
#[derive(Debug)]
pub struct BoundedPathQueue {
    ring: Mutex<Ring>,
    /// Signalled when an item is added.
    not_empty: Condvar,
    /// Signalled when a slot is freed.
    not_full: Condvar,
}

impl BoundedPathQueue {
    /// Create a queue holding at most `capacity` paths.
    ///
    /// A capacity of zero is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            ring: Mutex::new(Ring {
                slots: (0..capacity).map(|_| None).collect(),
                head: 0,
                tail: 0,
                full: false,
                closed: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
        }
    }

    /// Fixed capacity chosen at construction.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.ring.lock().capacity()
    }

    /// Append `entry`, blocking while the queue is full.
    ///
    /// Wakes one waiting consumer once the entry is stored. Returns `false`
    /// without storing anything if the queue is, or becomes, closed while
    /// waiting.
    pub fn enqueue(&self, entry: PathEntry) -> bool {
        let mut ring = self.ring.lock();
        while ring.full && !ring.closed {
            self.not_full.wait(&mut ring);
        }
        if ring.closed {
            return false;
        }
        ring.push(entry);
        self.not_empty.notify_one();
        true
    }

    /// Take the oldest entry, waiting up to `timeout` for one to arrive.
    ///
    /// Returns `None` if the queue stayed empty for the whole timeout.
    /// Callers treat that as a cue to re-check whether more work can
    /// still arrive.
    pub fn dequeue(&self, timeout: Duration) -> Option<PathEntry> {
        // An unrepresentable deadline means waiting without one.
        let deadline = Instant::now().checked_add(timeout);
        let mut ring = self.ring.lock();
        while ring.is_empty() {
            match deadline {
                Some(deadline) => {
                    if self.not_empty.wait_until(&mut ring, deadline).timed_out() {
                        break;
                    }
                }
                None => self.not_empty.wait(&mut ring),
            }
        }
        let entry = ring.take()?;
        self.not_full.notify_one();
        Some(entry)
    }

    /// Whether the queue currently holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.lock().is_empty()
    }

    /// Number of entries currently queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.lock().len()
    }

    /// Number of free slots.
    #[must_use]
    pub fn free_space(&self) -> usize {
        let ring = self.ring.lock();
        ring.capacity() - ring.len()
    }

    /// Refuse all further enqueues and release blocked producers.
    ///
    /// Entries already queued can still be dequeued. Closing is permanent,
    /// `clear` does not reopen the queue.
    pub fn close(&self) {
        let mut ring = self.ring.lock();
        ring.closed = true;
        self.not_full.notify_all();
    }

    /// Whether [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.ring.lock().closed
    }

    /// Drop every queued entry and reset the indices.
    ///
    /// Blocked producers are woken since the whole ring is free again.
    pub fn clear(&self) {
        let mut ring = self.ring.lock();
        ring.slots.iter_mut().for_each(|slot| *slot = None);
        ring.head = 0;
        ring.tail = 0;
        ring.full = false;
        self.not_full.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::thread;

    const SHORT: Duration = Duration::from_millis(20);

    fn entry(name: &str) -> PathEntry {
        PathEntry::new(PathBuf::from(name)).unwrap()
    }

    #[test]
    fn test_new_queue_is_empty() {
        let queue = BoundedPathQueue::new(4);
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.capacity(), 4);
        assert_eq!(queue.free_space(), 4);
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let queue = BoundedPathQueue::new(0);
        assert_eq!(queue.capacity(), 1);
    }

    #[test]
    fn test_fifo_order() {
        let queue = BoundedPathQueue::new(3);
        queue.enqueue(entry("a"));
        queue.enqueue(entry("b"));
        queue.enqueue(entry("c"));

        assert_eq!(queue.dequeue(SHORT), Some(entry("a")));
        assert_eq!(queue.dequeue(SHORT), Some(entry("b")));
        assert_eq!(queue.dequeue(SHORT), Some(entry("c")));
        assert_eq!(queue.dequeue(SHORT), None);
    }

    #[test]
    fn test_full_flag_and_wraparound() {
        let queue = BoundedPathQueue::new(2);
        queue.enqueue(entry("test1"));
        queue.enqueue(entry("test2"));
        assert_eq!(queue.free_space(), 0);
        assert_eq!(queue.len(), 2);

        assert_eq!(queue.dequeue(SHORT), Some(entry("test1")));
        assert_eq!(queue.free_space(), 1);

        // tail wraps to slot 0
        queue.enqueue(entry("test3"));
        assert_eq!(queue.free_space(), 0);
        assert_eq!(queue.dequeue(SHORT), Some(entry("test2")));
        assert_eq!(queue.dequeue(SHORT), Some(entry("test3")));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_dequeue_times_out_when_empty() {
        let queue = BoundedPathQueue::new(1);
        let start = Instant::now();
        assert!(queue.dequeue(Duration::from_millis(50)).is_none());
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_dequeue_wakes_on_enqueue() {
        let queue = Arc::new(BoundedPathQueue::new(1));
        let consumer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.dequeue(Duration::from_secs(5)))
        };

        thread::sleep(Duration::from_millis(50));
        queue.enqueue(entry("late"));

        assert_eq!(consumer.join().unwrap(), Some(entry("late")));
    }

    #[test]
    fn test_enqueue_blocks_when_full() {
        let queue = Arc::new(BoundedPathQueue::new(2));
        queue.enqueue(entry("test1"));
        queue.enqueue(entry("test2"));

        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                queue.enqueue(entry("test3"));
                Instant::now()
            })
        };

        thread::sleep(Duration::from_millis(100));
        // The producer is still parked on a full ring.
        assert_eq!(queue.len(), 2);

        let released_at = Instant::now();
        assert_eq!(queue.dequeue(SHORT), Some(entry("test1")));
        let enqueued_at = producer.join().unwrap();

        assert!(enqueued_at >= released_at);
        assert_eq!(queue.dequeue(SHORT), Some(entry("test2")));
        assert_eq!(queue.dequeue(SHORT), Some(entry("test3")));
    }

    #[test]
    fn test_clear_resets_and_releases_producer() {
        let queue = Arc::new(BoundedPathQueue::new(1));
        queue.enqueue(entry("stuck"));

        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.enqueue(entry("after-clear")))
        };

        thread::sleep(Duration::from_millis(50));
        queue.clear();
        producer.join().unwrap();

        assert_eq!(queue.dequeue(SHORT), Some(entry("after-clear")));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_close_refuses_enqueue_but_keeps_entries() {
        let queue = BoundedPathQueue::new(2);
        assert!(queue.enqueue(entry("kept")));
        queue.close();

        assert!(queue.is_closed());
        assert!(!queue.enqueue(entry("refused")));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.dequeue(SHORT), Some(entry("kept")));
        assert!(queue.is_empty());

        queue.clear();
        assert!(queue.is_closed());
    }

    #[test]
    fn test_close_releases_blocked_producer() {
        let queue = Arc::new(BoundedPathQueue::new(1));
        assert!(queue.enqueue(entry("stuck")));

        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.enqueue(entry("never-stored")))
        };

        thread::sleep(Duration::from_millis(50));
        queue.close();

        assert!(!producer.join().unwrap());
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.dequeue(SHORT), Some(entry("stuck")));
    }

    #[test]
    fn test_dequeue_with_unbounded_timeout() {
        let queue = Arc::new(BoundedPathQueue::new(1));
        queue.enqueue(entry("ready"));
        assert_eq!(queue.dequeue(Duration::MAX), Some(entry("ready")));

        let consumer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.dequeue(Duration::MAX))
        };
        thread::sleep(Duration::from_millis(50));
        queue.enqueue(entry("late"));

        assert_eq!(consumer.join().unwrap(), Some(entry("late")));
    }

    #[test]
    fn test_capacity_invariant_through_cycle() {
        let queue = BoundedPathQueue::new(3);
        for i in 0..10 {
            queue.enqueue(entry(&format!("p{i}")));
            assert_eq!(queue.free_space() + queue.len(), 3);
            if i % 2 == 1 {
                queue.dequeue(SHORT);
                assert_eq!(queue.free_space() + queue.len(), 3);
            }
            while queue.free_space() == 0 {
                queue.dequeue(SHORT);
            }
        }
    }

    #[test]
    fn test_many_consumers_exactly_once() {
        const ITEMS: usize = 2_000;
        const CONSUMERS: usize = 8;

        let queue = Arc::new(BoundedPathQueue::new(4));
        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for i in 0..ITEMS {
                    queue.enqueue(entry(&format!("item-{i:05}")));
                }
            })
        };

        let consumers: Vec<_> = (0..CONSUMERS)
            .map(|_| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || {
                    let mut seen = Vec::new();
                    while let Some(item) = queue.dequeue(Duration::from_millis(200)) {
                        seen.push(item);
                    }
                    seen
                })
            })
            .collect();

        producer.join().unwrap();
        let mut all = Vec::new();
        for consumer in consumers {
            let seen = consumer.join().unwrap();
            // Each consumer sees a strictly increasing subsequence.
            assert!(seen.windows(2).all(|w| w[0] < w[1]));
            all.extend(seen);
        }

        assert_eq!(all.len(), ITEMS);
        let unique: HashSet<_> = all.into_iter().collect();
        assert_eq!(unique.len(), ITEMS);
    }
}
