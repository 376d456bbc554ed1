//! Container width tracking.
//!
//! The dashboard observes the trend panel width on every frame; views that
//! cache pixel surfaces subscribe and re-render only when it actually moves.

use tokio::sync::watch;

#[derive(Debug)]
pub struct ViewportTracker {
    tx: watch::Sender<u32>,
}

impl ViewportTracker {
    pub fn new(initial: u32) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    /// Records the current width. Listeners are notified only when it differs
    /// from the last published value.
    pub fn observe(&self, width: u32) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if *current == width {
                return false;
            }
            *current = width;
            true
        });
        if changed {
            tracing::trace!(width, listeners = self.tx.receiver_count(), "viewport width changed");
        }
        changed
    }

    pub fn width(&self) -> u32 {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> WidthListener {
        WidthListener {
            rx: self.tx.subscribe(),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Subscription to width changes; dropping it detaches from the tracker.
#[derive(Debug)]
pub struct WidthListener {
    rx: watch::Receiver<u32>,
}

impl WidthListener {
    /// The new width if it changed since the last call, otherwise `None`.
    pub fn changed(&mut self) -> Option<u32> {
        match self.rx.has_changed() {
            Ok(true) => Some(*self.rx.borrow_and_update()),
            _ => None,
        }
    }

    pub fn width(&self) -> u32 {
        *self.rx.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_publishes_only_on_change() {
        let tracker = ViewportTracker::new(300);
        let mut listener = tracker.subscribe();
        assert_eq!(listener.changed(), None);

        assert!(!tracker.observe(300));
        assert_eq!(listener.changed(), None);

        assert!(tracker.observe(480));
        assert!(tracker.observe(520));
        assert_eq!(tracker.width(), 520);
        assert_eq!(listener.changed(), Some(520));
        assert_eq!(listener.changed(), None);
        assert_eq!(listener.width(), 520);
    }

    #[test]
    fn test_listener_detaches_on_drop() {
        let tracker = ViewportTracker::new(0);
        let first = tracker.subscribe();
        let second = tracker.subscribe();
        assert_eq!(tracker.listener_count(), 2);

        drop(first);
        assert_eq!(tracker.listener_count(), 1);
        drop(second);
        assert_eq!(tracker.listener_count(), 0);

        // Publishing without listeners still records the width.
        assert!(tracker.observe(64));
        assert_eq!(tracker.width(), 64);
    }

    #[test]
    fn test_late_subscriber_starts_at_current_width() {
        let tracker = ViewportTracker::new(100);
        tracker.observe(200);
        let mut listener = tracker.subscribe();
        assert_eq!(listener.width(), 200);
        assert_eq!(listener.changed(), None);
    }
}
