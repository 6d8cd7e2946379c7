//! Fan-out dispatcher for domain events.

use std::sync::{Arc, RwLock};

use super::handler::EventHandler;
use super::GestockEvent;

/// Dispatches every event to all registered handlers, in registration order.
/// Cloning shares the handler list.
#[derive(Clone, Default)]
pub struct EventDispatcher {
    handlers: Arc<RwLock<Vec<Arc<dyn EventHandler>>>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. Handlers live until the dispatcher is dropped.
    pub fn subscribe(&self, handler: Arc<dyn EventHandler>) {
        self.handlers.write().unwrap().push(handler);
    }

    pub fn emit(&self, event: &GestockEvent) {
        let handlers = self.handlers.read().unwrap();
        for handler in handlers.iter() {
            handler.handle(event);
        }
        tracing::trace!(?event, handlers = handlers.len(), "event dispatched");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::handler::ChannelSubscriber;
    use super::*;
    use crate::types::identifiers::ProduitId;

    #[test]
    fn channel_subscriber_receives_events() {
        let dispatcher = EventDispatcher::new();
        let (subscriber, rx) = ChannelSubscriber::new();
        dispatcher.subscribe(Arc::new(subscriber));

        let event = GestockEvent::StockChanged {
            produit_id: ProduitId(7),
            quantite: 12,
        };
        dispatcher.emit(&event);

        assert_eq!(rx.try_recv().unwrap(), event);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn emit_without_handlers_is_a_no_op() {
        let dispatcher = EventDispatcher::new();
        dispatcher.emit(&GestockEvent::ProduitRemoved {
            produit_id: ProduitId(1),
        });
    }
}
