//! Integration tests for BlockingPriorityQueue
//!
//! Producer/consumer behaviour across threads and shutdown wake-ups.

use prometheus_task_scheduler::core::{BlockingPriorityQueue, Dequeued, Prioritized};
use prometheus_task_scheduler::util::Priority;
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Job {
    producer: usize,
    seq: usize,
    priority: Priority,
}

impl Prioritized for Job {
    fn priority(&self) -> Priority {
        self.priority
    }
}

#[test]
fn test_multi_producer_multi_consumer_delivers_everything_once() {
    const PRODUCERS: usize = 4;
    const PER_PRODUCER: usize = 250;
    let queue = Arc::new(BlockingPriorityQueue::new());

    let consumers: Vec<_> = (0..3)
        .map(|_| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                let mut got = Vec::new();
                while let Dequeued::Item(job) = queue.dequeue() {
                    got.push(job);
                }
                got
            })
        })
        .collect();

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|producer| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for seq in 0..PER_PRODUCER {
                    let priority = Priority::ALL[seq % 4];
                    queue.enqueue(Job { producer, seq, priority }).unwrap();
                }
            })
        })
        .collect();

    for producer in producers {
        producer.join().unwrap();
    }
    queue.shutdown();

    let all: Vec<Job> = consumers.into_iter().flat_map(|c| c.join().unwrap()).collect();
    assert_eq!(all.len(), PRODUCERS * PER_PRODUCER);
    assert_eq!(all.iter().collect::<HashSet<_>>().len(), PRODUCERS * PER_PRODUCER);
    assert!(queue.is_empty());
}

#[test]
fn test_shutdown_wakes_every_blocked_consumer() {
    let queue = Arc::new(BlockingPriorityQueue::<Job>::new());
    let consumers: Vec<_> = (0..4)
        .map(|_| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.dequeue())
        })
        .collect();

    thread::sleep(Duration::from_millis(30));
    queue.shutdown();

    for consumer in consumers {
        assert_eq!(consumer.join().unwrap(), Dequeued::Closed);
    }
}

#[test]
fn test_items_queued_before_shutdown_are_still_delivered() {
    let queue = BlockingPriorityQueue::new();
    for seq in 0..3 {
        queue
            .enqueue(Job { producer: 0, seq, priority: Priority::Low })
            .unwrap();
    }
    queue
        .enqueue(Job { producer: 0, seq: 3, priority: Priority::Critical })
        .unwrap();
    queue.shutdown();
    assert!(queue
        .enqueue(Job { producer: 1, seq: 0, priority: Priority::Critical })
        .is_err());

    let seqs: Vec<usize> = std::iter::from_fn(|| queue.dequeue().into_item())
        .map(|j| j.seq)
        .collect();
    assert_eq!(seqs, vec![3, 0, 1, 2]);
    assert_eq!(queue.dequeue(), Dequeued::Closed);
}

#[test]
fn test_higher_priority_arriving_later_jumps_ahead() {
    let queue = BlockingPriorityQueue::new();
    queue.enqueue(Job { producer: 0, seq: 0, priority: Priority::Medium }).unwrap();
    queue.enqueue(Job { producer: 0, seq: 1, priority: Priority::Medium }).unwrap();
    assert_eq!(queue.try_dequeue().map(|j| j.seq), Some(0));

    queue.enqueue(Job { producer: 0, seq: 2, priority: Priority::High }).unwrap();
    queue.enqueue(Job { producer: 0, seq: 3, priority: Priority::Medium }).unwrap();

    assert_eq!(queue.len(), 3);
    let seqs: Vec<usize> = std::iter::from_fn(|| queue.try_dequeue()).map(|j| j.seq).collect();
    assert_eq!(seqs, vec![2, 1, 3]);
}
