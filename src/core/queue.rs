//! Blocking, unbounded priority queue shared by the scheduler's workers.
//!
//! Items are ordered by priority (highest first) and FIFO within a priority:
//! every item is stamped with a sequence number under the queue lock, so ties are
//! broken by the order in which `enqueue` calls completed.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::util::Priority;

/// Anything the queue can order.
pub trait Prioritized {
    /// Priority used for queue ordering.
    fn priority(&self) -> Priority;
}

/// Outcome of a blocking dequeue.
#[derive(Debug, PartialEq, Eq)]
pub enum Dequeued<T> {
    /// The highest-priority, earliest-submitted item.
    Item(T),
    /// The queue has been shut down and fully drained.
    Closed,
}

impl<T> Dequeued<T> {
    /// Returns the item, or `None` for [`Dequeued::Closed`].
    pub fn into_item(self) -> Option<T> {
        match self {
            Self::Item(item) => Some(item),
            Self::Closed => None,
        }
    }
}

/// Wrapper to make items orderable by priority (highest first) and FIFO within priority.
struct Entry<T> {
    priority: Priority,
    seq: u64,
    item: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.priority.cmp(&other.priority) {
            // FIFO within same priority: lower sequence wins (reversed for max-heap)
            Ordering::Equal => other.seq.cmp(&self.seq),
            unequal => unequal,
        }
    }
}

struct QueueState<T> {
    heap: BinaryHeap<Entry<T>>,
    next_seq: u64,
    shutdown: bool,
}

/// Mutex/Condvar protected priority queue with shutdown-and-drain semantics.
///
/// - `enqueue` never blocks and has no capacity bound.
/// - `dequeue` blocks while the queue is empty and open.
/// - `shutdown` wakes every blocked consumer; queued items are still handed out
///   and only then does `dequeue` report [`Dequeued::Closed`].
pub struct BlockingPriorityQueue<T> {
    state: Mutex<QueueState<T>>,
    not_empty: Condvar,
}

impl<T: Prioritized> BlockingPriorityQueue<T> {
    /// Create an empty, open queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                heap: BinaryHeap::new(),
                next_seq: 0,
                shutdown: false,
            }),
            not_empty: Condvar::new(),
        }
    }

    /// Insert `item` behind every queued item of equal or higher priority and wake
    /// one blocked consumer.
    ///
    /// # Errors
    ///
    /// Hands the item back if the queue has already been shut down, since no
    /// worker is guaranteed to be left to run it.
    pub fn enqueue(&self, item: T) -> Result<(), T> {
        let mut state = self.state.lock();
        if state.shutdown {
            return Err(item);
        }
        let seq = state.next_seq;
        state.next_seq += 1;
        state.heap.push(Entry {
            priority: item.priority(),
            seq,
            item,
        });
        drop(state);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Block until an item is available or the queue is closed and drained.
    pub fn dequeue(&self) -> Dequeued<T> {
        let mut state = self.state.lock();
        self.not_empty
            .wait_while(&mut state, |s| s.heap.is_empty() && !s.shutdown);
        Self::pop_locked(&mut state)
    }

    /// Like [`dequeue`](Self::dequeue) but gives up after `timeout`.
    ///
    /// Returns `None` if nothing arrived in time and the queue is still open.
    pub fn dequeue_timeout(&self, timeout: Duration) -> Option<Dequeued<T>> {
        let mut state = self.state.lock();
        let result = self.not_empty.wait_while_for(
            &mut state,
            |s| s.heap.is_empty() && !s.shutdown,
            timeout,
        );
        if result.timed_out() && state.heap.is_empty() && !state.shutdown {
            return None;
        }
        Some(Self::pop_locked(&mut state))
    }

    /// Non-blocking pop of the head item.
    pub fn try_dequeue(&self) -> Option<T> {
        self.state.lock().heap.pop().map(|e| e.item)
    }

    fn pop_locked(state: &mut QueueState<T>) -> Dequeued<T> {
        state
            .heap
            .pop()
            .map_or(Dequeued::Closed, |entry| Dequeued::Item(entry.item))
    }
}

impl<T> BlockingPriorityQueue<T> {
    /// Mark the queue closed and wake all blocked consumers. Idempotent.
    pub fn shutdown(&self) {
        let mut state = self.state.lock();
        state.shutdown = true;
        drop(state);
        self.not_empty.notify_all();
    }

    /// Whether [`shutdown`](Self::shutdown) has been called.
    pub fn is_shutdown(&self) -> bool {
        self.state.lock().shutdown
    }

    /// Instantaneous item count, for diagnostics only.
    pub fn len(&self) -> usize {
        self.state.lock().heap.len()
    }

    /// Whether the queue currently holds no items.
    pub fn is_empty(&self) -> bool {
        self.state.lock().heap.is_empty()
    }
}

impl<T: Prioritized> Default for BlockingPriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[derive(Debug, PartialEq, Eq)]
    struct Item {
        id: u32,
        priority: Priority,
    }

    impl Prioritized for Item {
        fn priority(&self) -> Priority {
            self.priority
        }
    }

    fn item(id: u32, priority: Priority) -> Item {
        Item { id, priority }
    }

    fn drain_ids(q: &BlockingPriorityQueue<Item>) -> Vec<u32> {
        std::iter::from_fn(|| q.try_dequeue()).map(|i| i.id).collect()
    }

    #[test]
    fn test_priority_ordering() {
        let q = BlockingPriorityQueue::new();
        q.enqueue(item(1, Priority::Low)).unwrap();
        q.enqueue(item(2, Priority::Critical)).unwrap();
        q.enqueue(item(3, Priority::Medium)).unwrap();
        q.enqueue(item(4, Priority::High)).unwrap();

        assert_eq!(drain_ids(&q), vec![2, 4, 3, 1]);
    }

    #[test]
    fn test_fifo_within_priority() {
        let q = BlockingPriorityQueue::new();
        for id in 0..5 {
            q.enqueue(item(id, Priority::High)).unwrap();
        }
        q.enqueue(item(100, Priority::Low)).unwrap();
        for id in 5..10 {
            q.enqueue(item(id, Priority::High)).unwrap();
        }

        assert_eq!(drain_ids(&q), vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 100]);
    }

    #[test]
    fn test_shutdown_drains_before_closed() {
        let q = BlockingPriorityQueue::new();
        q.enqueue(item(1, Priority::Low)).unwrap();
        q.enqueue(item(2, Priority::High)).unwrap();
        q.shutdown();
        q.shutdown();

        assert_eq!(q.dequeue(), Dequeued::Item(item(2, Priority::High)));
        assert_eq!(q.dequeue(), Dequeued::Item(item(1, Priority::Low)));
        assert_eq!(q.dequeue(), Dequeued::Closed);
        assert_eq!(q.dequeue(), Dequeued::Closed);
    }

    #[test]
    fn test_enqueue_after_shutdown_hands_item_back() {
        let q = BlockingPriorityQueue::new();
        q.shutdown();
        let rejected = q.enqueue(item(7, Priority::Critical)).unwrap_err();
        assert_eq!(rejected.id, 7);
        assert!(q.is_empty());
        assert!(q.is_shutdown());
    }

    #[test]
    fn test_dequeue_timeout_on_empty_queue() {
        let q = BlockingPriorityQueue::<Item>::new();
        assert!(q.dequeue_timeout(Duration::from_millis(20)).is_none());

        q.enqueue(item(1, Priority::Medium)).unwrap();
        let got = q.dequeue_timeout(Duration::from_millis(20)).unwrap();
        assert_eq!(got.into_item().map(|i| i.id), Some(1));

        q.shutdown();
        assert_eq!(q.dequeue_timeout(Duration::from_millis(20)), Some(Dequeued::Closed));
    }

    #[test]
    fn test_blocked_consumer_wakes_on_enqueue() {
        let q = Arc::new(BlockingPriorityQueue::new());
        let consumer = {
            let q = Arc::clone(&q);
            thread::spawn(move || q.dequeue())
        };

        thread::sleep(Duration::from_millis(30));
        q.enqueue(item(42, Priority::Low)).unwrap();

        assert_eq!(consumer.join().unwrap(), Dequeued::Item(item(42, Priority::Low)));
        assert_eq!(q.len(), 0);
    }
}
