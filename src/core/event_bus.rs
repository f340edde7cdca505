//! Deferred gallery event queue.
//!
//! The shell emits `GalleryEvent`s as it reacts to input and timers; the app
//! drains them once per frame with `poll()` and dispatches. Emission order is
//! preserved. Components that only send hold an `EventEmitter` cloned off the
//! bus, so the shell never sees the draining side.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use log::warn;

use super::events::GalleryEvent;

/// Queue bound; the oldest events are dropped past this.
const MAX_QUEUE: usize = 256;

type SharedQueue = Arc<Mutex<VecDeque<GalleryEvent>>>;

/// Frame-drained event queue shared between the shell and the app.
///
/// Clone-able; all clones share the same queue.
#[derive(Clone, Default)]
pub struct EventBus {
    queue: SharedQueue,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event for the next `poll`.
    pub fn emit(&self, event: GalleryEvent) {
        push(&self.queue, event);
    }

    /// Drain everything emitted since the last poll, in emission order.
    pub fn poll(&self) -> Vec<GalleryEvent> {
        lock(&self.queue).drain(..).collect()
    }

    /// Send-only handle for components that emit but never drain.
    pub fn emitter(&self) -> EventEmitter {
        EventEmitter {
            queue: Arc::clone(&self.queue),
        }
    }

    pub fn queue_len(&self) -> usize {
        lock(&self.queue).len()
    }
}

/// Cloneable sender half of the bus.
#[derive(Clone)]
pub struct EventEmitter {
    queue: SharedQueue,
}

impl EventEmitter {
    pub fn emit(&self, event: GalleryEvent) {
        push(&self.queue, event);
    }
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("queue_len", &lock(&self.queue).len())
            .finish()
    }
}

fn push(queue: &SharedQueue, event: GalleryEvent) {
    let mut q = lock(queue);
    if q.len() >= MAX_QUEUE {
        warn!("Event queue full ({} events), dropping oldest", q.len());
        q.pop_front();
    }
    q.push_back(event);
}

// A panic while holding the lock poisons it; the queue itself is still
// consistent, so keep going with whatever is in it.
fn lock(queue: &SharedQueue) -> MutexGuard<'_, VecDeque<GalleryEvent>> {
    queue.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::events::ViewMode;

    fn replaced(generation: u64) -> GalleryEvent {
        GalleryEvent::DisplaySetReplaced {
            generation,
            real_cards: 3,
            filler_cards: 27,
        }
    }

    #[test]
    fn test_poll_drains_in_emission_order() {
        let bus = EventBus::new();
        bus.emit(GalleryEvent::ViewModeChanged(ViewMode::Album));
        bus.emit(replaced(1));

        let events = bus.poll();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[0],
            GalleryEvent::ViewModeChanged(ViewMode::Album)
        ));
        assert!(matches!(
            events[1],
            GalleryEvent::DisplaySetReplaced { generation: 1, .. }
        ));

        // Nothing left after a drain.
        assert!(bus.poll().is_empty());
    }

    #[test]
    fn test_emitter_shares_queue() {
        let bus = EventBus::new();
        let emitter = bus.emitter();
        emitter.emit(GalleryEvent::ViewModeChanged(ViewMode::Sphere));
        assert_eq!(bus.queue_len(), 1);
        assert_eq!(bus.poll().len(), 1);
    }

    #[test]
    fn test_overflow_drops_oldest() {
        let bus = EventBus::new();
        for g in 0..(MAX_QUEUE as u64 + 5) {
            bus.emit(replaced(g));
        }
        let events = bus.poll();
        assert_eq!(events.len(), MAX_QUEUE);
        assert!(matches!(
            events[0],
            GalleryEvent::DisplaySetReplaced { generation: 5, .. }
        ));
    }
}
