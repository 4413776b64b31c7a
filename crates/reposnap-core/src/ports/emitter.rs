//! Notification delivery port.
//!
//! The engine emits [`FetchEvent`]s without coupling to how a caller consumes
//! them; implementations deliver through channels, logs, or nothing at all.

use tokio::sync::mpsc;

use crate::events::FetchEvent;

/// Port for emitting job notifications.
///
/// `emit` must not block: a slow consumer cannot be allowed to stall the
/// traversal's state transitions.
pub trait EventEmitter: Send + Sync {
    /// Emit one notification.
    fn emit(&self, event: FetchEvent);

    /// Clone this emitter into a boxed trait object.
    ///
    /// Enables cloning through `Arc<dyn EventEmitter>` without requiring the
    /// underlying type to implement `Clone`.
    fn clone_box(&self) -> Box<dyn EventEmitter>;
}

/// An emitter that discards every notification.
///
/// Suitable for tests that only assert on filesystem outcomes, and for
/// embedders that poll the result instead of streaming events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEmitter;

impl NoopEmitter {
    /// Create a new no-op emitter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl EventEmitter for NoopEmitter {
    fn emit(&self, _event: FetchEvent) {
        // Intentionally do nothing
    }

    fn clone_box(&self) -> Box<dyn EventEmitter> {
        Box::new(*self)
    }
}

/// An emitter backed by an unbounded tokio channel.
///
/// Unbounded keeps `emit` non-blocking; event volume is proportional to the
/// repository's entry count, which is the same order as the traversal's own
/// allocations.
#[derive(Debug, Clone)]
pub struct ChannelEmitter {
    tx: mpsc::UnboundedSender<FetchEvent>,
}

impl ChannelEmitter {
    /// Create an emitter and the receiver that observes it.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<FetchEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventEmitter for ChannelEmitter {
    fn emit(&self, event: FetchEvent) {
        // A dropped receiver means nobody is listening anymore; events are
        // advisory, so that is not an error.
        let _ = self.tx.send(event);
    }

    fn clone_box(&self) -> Box<dyn EventEmitter> {
        Box::new(self.clone())
    }
}
