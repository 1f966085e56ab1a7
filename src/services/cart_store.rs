use tracing::debug;

use crate::models::cart::{reduce, CartIntent, CartLedger, PricingPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&CartLedger)>;

/// Owns the ledger, runs intents through the reducer and notifies listeners.
///
/// Meant to live on a single UI/event thread and be handed to whatever
/// renders the cart. Listeners run synchronously after each dispatch, in
/// registration order.
pub struct CartStore {
    ledger: CartLedger,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener_id: u64,
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new(PricingPolicy::default())
    }
}

impl CartStore {
    pub fn new(policy: PricingPolicy) -> Self {
        Self::with_ledger(CartLedger::new(policy))
    }

    pub fn with_ledger(ledger: CartLedger) -> Self {
        Self {
            ledger,
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }

    pub fn ledger(&self) -> &CartLedger {
        &self.ledger
    }

    pub fn dispatch(&mut self, intent: CartIntent) -> &CartLedger {
        debug!("Dispatching cart intent: {}", intent.name());

        let state = std::mem::take(&mut self.ledger);
        self.ledger = reduce(state, intent);

        for (_, listener) in self.listeners.iter_mut() {
            listener(&self.ledger);
        }
        &self.ledger
    }

    /// Swaps in a whole ledger (e.g. one restored from storage) and notifies.
    pub fn replace(&mut self, ledger: CartLedger) -> &CartLedger {
        self.ledger = ledger;
        for (_, listener) in self.listeners.iter_mut() {
            listener(&self.ledger);
        }
        &self.ledger
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&CartLedger) + 'static,
    {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(listener)));
        debug!("Registered cart listener {:?}", id);
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        before != self.listeners.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::line_item::LineItem;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_listeners_see_every_dispatch_in_order() {
        let mut store = CartStore::default();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let first = seen.clone();
        store.subscribe(move |ledger| first.borrow_mut().push(("first", ledger.item_count())));
        let second = seen.clone();
        store.subscribe(move |ledger| second.borrow_mut().push(("second", ledger.item_count())));

        store.dispatch(CartIntent::Add {
            item: LineItem::new("a", "A", 10.0),
            quantity: 2,
        });
        store.dispatch(CartIntent::Open);

        assert_eq!(
            *seen.borrow(),
            vec![("first", 2), ("second", 2), ("first", 2), ("second", 2)]
        );
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let mut store = CartStore::default();
        let calls = Rc::new(RefCell::new(0));

        let counter = calls.clone();
        let id = store.subscribe(move |_| *counter.borrow_mut() += 1);
        store.dispatch(CartIntent::ToggleVisibility);
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.dispatch(CartIntent::ToggleVisibility);

        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn test_dispatch_keeps_policy() {
        let policy = PricingPolicy {
            tax_rate: 0.0,
            shipping_fee: 0.0,
            free_shipping_threshold: 0.0,
        };
        let mut store = CartStore::new(policy);
        let ledger = store.dispatch(CartIntent::Add {
            item: LineItem::new("a", "A", 10.0),
            quantity: 1,
        });

        assert_eq!(ledger.policy(), &policy);
        assert_eq!(ledger.total(), 10.0);
    }
}
