use crate::{Emitter, SubscriptionId};
use std::collections::HashMap;
use std::fmt;
use tracing::trace;

/// A boxed event handler receiving the published payload.
pub type Handler<P> = Box<dyn FnMut(&P)>;

/// In-memory [`Emitter`] keyed by event name.
pub struct EventBus<P> {
    handlers: HashMap<String, Vec<(SubscriptionId, Handler<P>)>>,
}

impl<P> EventBus<P> {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Names of events that currently have at least one handler.
    pub fn events(&self) -> impl Iterator<Item = &str> {
        self.handlers
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(name, _)| name.as_str())
    }
}

impl<P> Default for EventBus<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for EventBus<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<&str, usize> = self
            .handlers
            .iter()
            .map(|(name, list)| (name.as_str(), list.len()))
            .collect();
        f.debug_struct("EventBus").field("handlers", &counts).finish()
    }
}

impl<P> Emitter<P> for EventBus<P> {
    fn subscribe(&mut self, event: &str, handler: Handler<P>) -> SubscriptionId {
        let id = SubscriptionId::new();
        self.handlers
            .entry(event.to_string())
            .or_default()
            .push((id, handler));
        id
    }

    fn unsubscribe(&mut self, event: &str, id: Option<SubscriptionId>) -> usize {
        let Some(list) = self.handlers.get_mut(event) else {
            return 0;
        };
        let before = list.len();
        match id {
            Some(id) => list.retain(|(existing, _)| *existing != id),
            None => list.clear(),
        }
        let removed = before - list.len();
        if list.is_empty() {
            self.handlers.remove(event);
        }
        removed
    }

    fn publish(&mut self, event: &str, payload: &P) -> usize {
        let Some(list) = self.handlers.get_mut(event) else {
            return 0;
        };
        trace!("Publishing {} to {} handler(s)", event, list.len());
        for (_, handler) in list.iter_mut() {
            handler(payload);
        }
        list.len()
    }

    fn handler_count(&self, event: &str) -> usize {
        self.handlers.get(event).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn unsubscribe_last_handler_drops_event_entry() {
        let mut bus: EventBus<u32> = EventBus::new();
        let id = bus.subscribe("tick", Box::new(|_| {}));
        assert_eq!(bus.events().count(), 1);
        assert_eq!(bus.unsubscribe("tick", Some(id)), 1);
        assert_eq!(bus.events().count(), 0);
    }

    #[test]
    fn handlers_run_in_subscription_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut bus: EventBus<u32> = EventBus::new();
        for n in 0..3 {
            let order = Rc::clone(&order);
            bus.subscribe("tick", Box::new(move |_| order.borrow_mut().push(n)));
        }
        bus.publish("tick", &0);
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }
}
