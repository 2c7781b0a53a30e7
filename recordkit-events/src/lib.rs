//! Named-event publish/subscribe for recordkit.
//!
//! Models do not inherit event handling; they hold an injected [`Emitter`]
//! and publish through it. This crate defines:
//! - [`Emitter`] — the three-operation collaborator contract
//! - [`EventBus`] — the default in-memory implementation
//! - [`SubscriptionId`] — the handle returned by `subscribe`, used to unsubscribe
//!
//! Everything here is synchronous and single-threaded: handlers run on the
//! publishing call stack, in subscription order.

mod bus;
mod id;

pub use bus::{EventBus, Handler};
pub use id::SubscriptionId;

/// A collaborator that routes named events to registered handlers.
pub trait Emitter<P> {
    /// Registers `handler` for `event` and returns a handle for later removal.
    fn subscribe(&mut self, event: &str, handler: Handler<P>) -> SubscriptionId;

    /// Removes one handler, or every handler of `event` when `id` is `None`.
    /// Returns how many handlers were removed.
    fn unsubscribe(&mut self, event: &str, id: Option<SubscriptionId>) -> usize;

    /// Invokes every handler of `event` with `payload`.
    /// Returns how many handlers ran.
    fn publish(&mut self, event: &str, payload: &P) -> usize;

    /// Number of handlers currently registered for `event`.
    fn handler_count(&self, event: &str) -> usize;
}
