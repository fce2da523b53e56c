//! Cancellation targets registered by engines on a connection.

use std::sync::atomic::{AtomicBool, Ordering};

/// The engine-side object a [`Connection`](crate::Connection) forwards stop
/// requests to.
///
/// Implementations are shared between the owner and the worker executing the
/// operation, so they must be thread-safe. `stop` may be called any number of
/// times.
pub trait Controlled: Send + Sync {
    /// Requests that the operation stop as soon as possible.
    fn stop(&self);

    /// Whether a stop has been requested.
    fn is_stopped(&self) -> bool;
}

/// A flag-based [`Controlled`] suitable for most workers.
///
/// Workers poll [`is_stopped`](Controlled::is_stopped) between units of work.
#[derive(Debug, Default)]
pub struct StopToken {
    /// Set once a stop was requested.
    stopped: AtomicBool,
}

impl StopToken {
    /// Creates a token that has not been stopped.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Controlled for StopToken {
    fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_is_sticky_and_idempotent() {
        let token = StopToken::new();
        assert!(!token.is_stopped());
        token.stop();
        token.stop();
        assert!(token.is_stopped());
    }
}
