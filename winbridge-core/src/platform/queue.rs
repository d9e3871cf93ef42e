//! The window-system event queue.
//!
//! Native adapters post events from any thread; the main thread drains them in arrival
//! order. The queue is unbounded: a native source flooding events grows memory without
//! limit, there is no backpressure.

use crate::platform::events::NativeEvent;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::ThreadId;

type Waker = Arc<dyn Fn() + Send + Sync>;

struct QueueInner {
    events: Mutex<VecDeque<NativeEvent>>,
    waker: Mutex<Option<Waker>>,
    consumer: ThreadId,
    posted: AtomicU64,
}

/// Multi-producer, single-consumer queue of [NativeEvent]s.
#[derive(Clone)]
pub struct WsiQueue {
    inner: Arc<QueueInner>,
}

impl WsiQueue {
    /// Create a new queue. The calling thread becomes the consuming (main) thread.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(QueueInner {
                events: Mutex::new(VecDeque::new()),
                waker: Mutex::new(None),
                consumer: std::thread::current().id(),
                posted: AtomicU64::new(0),
            }),
        }
    }

    /// Set a callback invoked after every post, e.g. to wake a sleeping event loop.
    pub fn set_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        *self.inner.waker.lock() = Some(Arc::new(waker));
    }

    /// Append an event. Callable from any thread.
    pub fn post(&self, event: NativeEvent) {
        self.inner.events.lock().push_back(event);
        self.inner.posted.fetch_add(1, Ordering::Relaxed);
        self.wake();
    }

    /// Append several events atomically, preserving their order.
    pub fn post_all(&self, events: impl IntoIterator<Item = NativeEvent>) {
        let count = {
            let mut queue = self.inner.events.lock();
            let before = queue.len();
            queue.extend(events);
            queue.len() - before
        };
        if count > 0 {
            self.inner.posted.fetch_add(count as u64, Ordering::Relaxed);
            self.wake();
        }
    }

    fn wake(&self) {
        let waker = self.inner.waker.lock().clone();
        if let Some(waker) = waker {
            waker();
        }
    }

    /// Take all queued events in arrival order, leaving the queue empty.
    ///
    /// Must only be called from the thread that created the queue.
    pub fn drain(&self) -> Vec<NativeEvent> {
        debug_assert_eq!(
            std::thread::current().id(),
            self.inner.consumer,
            "WsiQueue drained off the main thread"
        );
        let mut events = self.inner.events.lock();
        if events.is_empty() {
            Vec::new()
        } else {
            std::mem::take(&mut *events).into()
        }
    }

    pub fn len(&self) -> usize {
        self.inner.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.events.lock().is_empty()
    }

    /// Total number of events ever posted.
    pub fn total_posted(&self) -> u64 {
        self.inner.posted.load(Ordering::Relaxed)
    }
}

impl Default for WsiQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for WsiQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsiQueue")
            .field("len", &self.len())
            .field("posted", &self.total_posted())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::events::NativeEventKind;
    use std::sync::atomic::AtomicUsize;

    fn theme_event(timestamp: u64) -> NativeEvent {
        NativeEvent::global(timestamp, NativeEventKind::ThemeChanged)
    }

    #[test]
    fn test_drain_returns_arrival_order() {
        let queue = WsiQueue::new();
        queue.post(theme_event(1));
        queue.post_all([theme_event(2), theme_event(3)]);

        let drained: Vec<u64> = queue.drain().iter().map(|e| e.timestamp).collect();
        assert_eq!(drained, vec![1, 2, 3]);
        assert!(queue.is_empty());
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_per_thread_order_preserved() {
        let queue = WsiQueue::new();
        let producers: Vec<_> = (0..4u64)
            .map(|thread| {
                let queue = queue.clone();
                std::thread::spawn(move || {
                    for i in 0..250u64 {
                        queue.post(theme_event(thread * 1000 + i));
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.join().unwrap();
        }

        let events = queue.drain();
        assert_eq!(events.len(), 1000);
        for thread in 0..4u64 {
            let own: Vec<u64> = events
                .iter()
                .map(|e| e.timestamp)
                .filter(|t| t / 1000 == thread)
                .collect();
            assert!(own.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_waker_called_on_post() {
        let queue = WsiQueue::new();
        let wakes = Arc::new(AtomicUsize::new(0));
        let counter = wakes.clone();
        queue.set_waker(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        queue.post(theme_event(1));
        queue.post_all(Vec::new());
        assert_eq!(wakes.load(Ordering::SeqCst), 1);
        assert_eq!(queue.total_posted(), 1);
    }
}
