use serde::{Deserialize, Serialize};

use crate::models::line_item::LineItem;

pub const DEFAULT_TAX_RATE: f64 = 0.08;
pub const DEFAULT_SHIPPING_FEE: f64 = 5.99;
pub const DEFAULT_FREE_SHIPPING_THRESHOLD: f64 = 50.0;

/// Rates used by the totals recompute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingPolicy {
    pub tax_rate: f64,
    pub shipping_fee: f64,
    /// Shipping is free once the subtotal is strictly above this amount.
    pub free_shipping_threshold: f64,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            tax_rate: DEFAULT_TAX_RATE,
            shipping_fee: DEFAULT_SHIPPING_FEE,
            free_shipping_threshold: DEFAULT_FREE_SHIPPING_THRESHOLD,
        }
    }
}

impl PricingPolicy {
    /// Derives every total from the item list.
    pub fn compute(&self, items: &[LineItem]) -> CartTotals {
        // Folding from +0.0 keeps an empty cart at 0 rather than -0.
        let subtotal = items
            .iter()
            .fold(0.0, |acc, item| acc + item.price * item.quantity as f64);
        let tax = subtotal * self.tax_rate;
        let shipping = if subtotal > self.free_shipping_threshold {
            0.0
        } else {
            self.shipping_fee
        };
        let item_count = items.iter().map(|item| item.quantity as u64).sum();

        CartTotals {
            subtotal,
            tax,
            shipping,
            total: subtotal + tax + shipping,
            item_count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub subtotal: f64,
    pub tax: f64,
    pub shipping: f64,
    pub total: f64,
    pub item_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Closed,
    Open,
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Visibility::Closed => write!(f, "closed"),
            Visibility::Open => write!(f, "open"),
        }
    }
}

/// Aggregate cart state: ordered rows, visibility and derived totals.
///
/// Totals are private and only written by `recompute` or `clear`, so they
/// always describe the current rows. A fresh or cleared ledger reports all
/// zeroes; any other state reports the policy's recompute of its rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "LedgerState")]
pub struct CartLedger {
    items: Vec<LineItem>,
    visibility: Visibility,
    #[serde(flatten)]
    totals: CartTotals,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    cleared: bool,
    #[serde(skip)]
    policy: PricingPolicy,
}

// Persisted shape; derived totals are ignored on the way in.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LedgerState {
    #[serde(default)]
    items: Vec<LineItem>,
    #[serde(default)]
    visibility: Visibility,
    #[serde(default)]
    cleared: bool,
}

impl From<LedgerState> for CartLedger {
    fn from(state: LedgerState) -> Self {
        let mut ledger = CartLedger::new(PricingPolicy::default());
        ledger.items = state.items;
        ledger.visibility = state.visibility;
        ledger.cleared = state.cleared && ledger.items.is_empty();
        ledger.settle();
        ledger
    }
}

impl Default for CartLedger {
    fn default() -> Self {
        Self::new(PricingPolicy::default())
    }
}

impl CartLedger {
    pub fn new(policy: PricingPolicy) -> Self {
        Self {
            items: Vec::new(),
            visibility: Visibility::Closed,
            totals: CartTotals::default(),
            cleared: true,
            policy,
        }
    }

    /// Swaps the pricing policy and re-derives the totals under it.
    pub fn with_policy(mut self, policy: PricingPolicy) -> Self {
        self.policy = policy;
        self.settle();
        self
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    pub fn totals(&self) -> CartTotals {
        self.totals
    }

    pub fn subtotal(&self) -> f64 {
        self.totals.subtotal
    }

    pub fn tax(&self) -> f64 {
        self.totals.tax
    }

    pub fn shipping(&self) -> f64 {
        self.totals.shipping
    }

    pub fn total(&self) -> f64 {
        self.totals.total
    }

    pub fn item_count(&self) -> u64 {
        self.totals.item_count
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_open(&self) -> bool {
        matches!(self.visibility, Visibility::Open)
    }

    /// How much more the subtotal needs before shipping becomes free.
    pub fn amount_until_free_shipping(&self) -> f64 {
        if self.totals.shipping == 0.0 {
            return 0.0;
        }
        (self.policy.free_shipping_threshold - self.totals.subtotal).max(0.0)
    }

    pub fn total_savings(&self) -> f64 {
        self.items.iter().filter_map(LineItem::savings).sum()
    }

    /// Merges into an existing row with the same id, or appends a new one.
    /// A zero quantity counts as one.
    pub fn add(&mut self, item: LineItem, quantity: u32) {
        let quantity = if quantity == 0 { 1 } else { quantity };

        match self.items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(quantity),
            None => self.items.push(LineItem { quantity, ..item }),
        }
        self.recompute();
    }

    pub fn remove(&mut self, id: &str) {
        self.items.retain(|item| item.id != id);
        self.recompute();
    }

    /// Sets a row's quantity exactly; zero or less removes the row.
    pub fn set_quantity(&mut self, id: &str, quantity: i64) {
        if quantity <= 0 {
            self.remove(id);
            return;
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
            item.quantity = quantity;
            self.recompute();
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.totals = CartTotals::default();
        self.cleared = true;
    }

    pub fn open(&mut self) {
        self.visibility = Visibility::Open;
    }

    pub fn close(&mut self) {
        self.visibility = Visibility::Closed;
    }

    pub fn toggle_visibility(&mut self) {
        self.visibility = match self.visibility {
            Visibility::Open => Visibility::Closed,
            Visibility::Closed => Visibility::Open,
        };
    }

    /// Drops the row and hands it back so the caller can record it elsewhere.
    pub fn move_to_wishlist(&mut self, id: &str) -> Option<LineItem> {
        let removed = self
            .items
            .iter()
            .position(|item| item.id == id)
            .map(|index| self.items.remove(index));
        self.recompute();
        removed
    }

    fn recompute(&mut self) {
        self.totals = self.policy.compute(&self.items);
        self.cleared = false;
    }

    fn settle(&mut self) {
        if self.cleared {
            self.totals = CartTotals::default();
        } else {
            self.recompute();
        }
    }
}

/// Everything the presentation layer can ask the ledger to do.
#[derive(Debug, Clone, PartialEq)]
pub enum CartIntent {
    Add { item: LineItem, quantity: u32 },
    Remove { id: String },
    SetQuantity { id: String, quantity: i64 },
    Clear,
    Open,
    Close,
    ToggleVisibility,
    MoveToWishlist { id: String },
}

impl CartIntent {
    pub fn name(&self) -> &'static str {
        match self {
            CartIntent::Add { .. } => "add",
            CartIntent::Remove { .. } => "remove",
            CartIntent::SetQuantity { .. } => "set_quantity",
            CartIntent::Clear => "clear",
            CartIntent::Open => "open",
            CartIntent::Close => "close",
            CartIntent::ToggleVisibility => "toggle_visibility",
            CartIntent::MoveToWishlist { .. } => "move_to_wishlist",
        }
    }
}

/// Applies one intent to an owned ledger and returns the next state.
pub fn reduce(mut state: CartLedger, intent: CartIntent) -> CartLedger {
    match intent {
        CartIntent::Add { item, quantity } => state.add(item, quantity),
        CartIntent::Remove { id } => state.remove(&id),
        CartIntent::SetQuantity { id, quantity } => state.set_quantity(&id, quantity),
        CartIntent::Clear => state.clear(),
        CartIntent::Open => state.open(),
        CartIntent::Close => state.close(),
        CartIntent::ToggleVisibility => state.toggle_visibility(),
        CartIntent::MoveToWishlist { id } => {
            state.move_to_wishlist(&id);
        }
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close_to(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_add_merges_existing_row() {
        let mut ledger = CartLedger::default();
        ledger.add(LineItem::new("a", "Tee", 10.0), 2);
        ledger.add(LineItem::new("a", "Tee", 10.0), 3);

        assert_eq!(ledger.items().len(), 1);
        assert_eq!(ledger.items()[0].quantity, 5);
        assert_eq!(ledger.item_count(), 5);
        assert!(close_to(ledger.subtotal(), 50.0));
    }

    #[test]
    fn test_add_zero_quantity_defaults_to_one() {
        let mut ledger = CartLedger::default();
        ledger.add(LineItem::new("a", "Tee", 10.0), 0);
        assert_eq!(ledger.items()[0].quantity, 1);
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let mut ledger = CartLedger::default();
        ledger.add(LineItem::new("b", "B", 1.0), 1);
        ledger.add(LineItem::new("a", "A", 1.0), 1);
        ledger.add(LineItem::new("b", "B", 1.0), 1);

        let ids: Vec<&str> = ledger.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_set_quantity_absent_is_noop() {
        let mut ledger = CartLedger::default();
        ledger.add(LineItem::new("a", "A", 5.0), 1);
        let before = ledger.clone();
        ledger.set_quantity("missing", 4);
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_set_quantity_negative_removes() {
        let mut ledger = CartLedger::default();
        ledger.add(LineItem::new("a", "A", 5.0), 1);
        ledger.set_quantity("a", -3);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_shipping_threshold_is_strict() {
        let mut ledger = CartLedger::default();
        ledger.add(LineItem::new("a", "A", 50.0), 1);
        assert!(close_to(ledger.shipping(), 5.99));
        assert!(close_to(ledger.amount_until_free_shipping(), 0.0));

        ledger.add(LineItem::new("b", "B", 0.01), 1);
        assert_eq!(ledger.shipping(), 0.0);
    }

    #[test]
    fn test_amount_until_free_shipping() {
        let mut ledger = CartLedger::default();
        ledger.add(LineItem::new("a", "A", 20.0), 1);
        assert!(close_to(ledger.amount_until_free_shipping(), 30.0));
    }

    #[test]
    fn test_visibility_transitions_leave_totals_alone() {
        let mut ledger = CartLedger::default();
        ledger.add(LineItem::new("a", "A", 20.0), 1);
        let totals = ledger.totals();

        assert_eq!(ledger.visibility(), Visibility::Closed);
        ledger.toggle_visibility();
        assert!(ledger.is_open());
        ledger.open();
        assert!(ledger.is_open());
        ledger.close();
        assert!(!ledger.is_open());
        ledger.toggle_visibility();
        ledger.toggle_visibility();
        assert!(!ledger.is_open());
        assert_eq!(ledger.totals(), totals);
    }

    #[test]
    fn test_move_to_wishlist_returns_removed_row() {
        let mut ledger = CartLedger::default();
        ledger.add(LineItem::new("a", "A", 20.0), 2);

        let moved = ledger.move_to_wishlist("a").unwrap();
        assert_eq!(moved.quantity, 2);
        assert!(ledger.is_empty());
        assert!(ledger.move_to_wishlist("a").is_none());
    }

    #[test]
    fn test_custom_policy() {
        let policy = PricingPolicy {
            tax_rate: 0.1,
            shipping_fee: 3.0,
            free_shipping_threshold: 100.0,
        };
        let mut ledger = CartLedger::new(policy);
        ledger.add(LineItem::new("a", "A", 60.0), 1);

        assert!(close_to(ledger.tax(), 6.0));
        assert!(close_to(ledger.shipping(), 3.0));
        assert!(close_to(ledger.total(), 69.0));
    }

    #[test]
    fn test_reduce_matches_methods() {
        let state = reduce(
            CartLedger::default(),
            CartIntent::Add {
                item: LineItem::new("a", "A", 10.0),
                quantity: 2,
            },
        );
        let state = reduce(state, CartIntent::ToggleVisibility);

        let mut direct = CartLedger::default();
        direct.add(LineItem::new("a", "A", 10.0), 2);
        direct.toggle_visibility();

        assert_eq!(state, direct);
    }

    #[test]
    fn test_deserialize_recomputes_totals() {
        let json = r#"{
            "items": [{"id":"a","name":"A","price":10.0,"image":"","quantity":3,"category":""}],
            "visibility": "open",
            "subtotal": 999.0,
            "itemCount": 1
        }"#;
        let ledger: CartLedger = serde_json::from_str(json).unwrap();

        assert!(close_to(ledger.subtotal(), 30.0));
        assert_eq!(ledger.item_count(), 3);
        assert!(ledger.is_open());
    }

    #[test]
    fn test_removing_last_row_keeps_positive_zero() {
        let mut ledger = CartLedger::default();
        ledger.add(LineItem::new("a", "A", 10.0), 1);
        ledger.remove("a");

        assert_eq!(ledger.subtotal(), 0.0);
        assert!(ledger.subtotal().is_sign_positive());
        assert!(ledger.tax().is_sign_positive());
        assert_eq!(ledger.shipping(), DEFAULT_SHIPPING_FEE);
        assert_eq!(ledger.total(), DEFAULT_SHIPPING_FEE);
    }

    #[test]
    fn test_emptied_ledger_json_round_trip() {
        let mut ledger = CartLedger::default();
        ledger.add(LineItem::new("a", "A", 10.0), 1);
        ledger.remove("a");

        let json = serde_json::to_string(&ledger).unwrap();
        assert!(!json.contains("-0.0"));
        let restored: CartLedger = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, ledger);
        assert_eq!(restored.shipping(), DEFAULT_SHIPPING_FEE);
        assert_eq!(restored.total(), DEFAULT_SHIPPING_FEE);
    }

    #[test]
    fn test_cleared_ledger_json_round_trip() {
        let mut ledger = CartLedger::default();
        ledger.add(LineItem::new("a", "A", 10.0), 1);
        ledger.clear();

        let json = serde_json::to_string(&ledger).unwrap();
        let restored: CartLedger = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, ledger);
        assert_eq!(restored.totals(), CartTotals::default());

        let fresh: CartLedger =
            serde_json::from_str(&serde_json::to_string(&CartLedger::default()).unwrap()).unwrap();
        assert_eq!(fresh, CartLedger::default());
    }

    #[test]
    fn test_with_policy_reprices_emptied_ledger() {
        let policy = PricingPolicy {
            tax_rate: 0.1,
            shipping_fee: 3.0,
            free_shipping_threshold: 100.0,
        };

        let mut removed = CartLedger::default();
        removed.add(LineItem::new("a", "A", 10.0), 1);
        removed.remove("a");
        let removed = removed.with_policy(policy);
        assert_eq!(removed.totals(), policy.compute(&[]));
        assert_eq!(removed.shipping(), 3.0);

        let mut cleared = CartLedger::default();
        cleared.add(LineItem::new("a", "A", 10.0), 1);
        cleared.clear();
        let cleared = cleared.with_policy(policy);
        assert_eq!(cleared.totals(), CartTotals::default());
    }
}
