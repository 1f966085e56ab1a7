use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    models::{
        cart::{CartIntent, CartLedger, PricingPolicy},
        line_item::{AddItemRequest, LineItem},
        snapshot::CartSnapshot,
    },
    services::cart_store::{CartStore, ListenerId},
    storage::repositories::{CartRepository, CartRepositoryError},
};

#[derive(Error, Debug)]
pub enum CartServiceError {
    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Item '{id}' is not in the cart")]
    ItemNotFound { id: String },

    #[error("Repository error: {0}")]
    RepositoryError(#[from] CartRepositoryError),
}

/// Application-facing cart API: validation, dispatch, wishlist and persistence.
pub struct CartService {
    cart_repository: Arc<dyn CartRepository>,
    store: CartStore,
    wishlist: Vec<LineItem>,
    session_id: Uuid,
    policy: PricingPolicy,
}

impl CartService {
    pub fn new(cart_repository: Arc<dyn CartRepository>, policy: PricingPolicy) -> Self {
        Self {
            cart_repository,
            store: CartStore::new(policy),
            wishlist: Vec::new(),
            session_id: Uuid::new_v4(),
            policy,
        }
    }

    /// Restore the last saved session, or keep the empty cart when none exists
    pub async fn load(&mut self) -> Result<&CartLedger, CartServiceError> {
        match self.cart_repository.load().await {
            Ok(Some(snapshot)) => {
                info!(
                    "Restored cart session {} ({} rows, {} wishlisted)",
                    snapshot.session_id,
                    snapshot.ledger.items().len(),
                    snapshot.wishlist.len()
                );
                self.session_id = snapshot.session_id;
                self.wishlist = snapshot.wishlist;
                Ok(self.store.replace(snapshot.ledger.with_policy(self.policy)))
            }
            Ok(None) => {
                debug!("No saved cart, starting session {}", self.session_id);
                Ok(self.store.ledger())
            }
            Err(e) => {
                error!("Failed to load cart: {}", e);
                Err(CartServiceError::RepositoryError(e))
            }
        }
    }

    pub async fn save(&self) -> Result<(), CartServiceError> {
        let snapshot = CartSnapshot::new(
            self.session_id,
            self.store.ledger().clone(),
            self.wishlist.clone(),
        );
        self.cart_repository.save(&snapshot).await.map_err(|e| {
            error!("Failed to save cart session {}: {}", self.session_id, e);
            CartServiceError::RepositoryError(e)
        })
    }

    /// Drop the saved session and start over with an empty cart and wishlist
    pub async fn reset(&mut self) -> Result<bool, CartServiceError> {
        let deleted = self.cart_repository.delete().await?;
        self.wishlist.clear();
        self.session_id = Uuid::new_v4();
        self.store.replace(CartLedger::new(self.policy));
        info!("Cart reset, new session {}", self.session_id);
        Ok(deleted)
    }

    /// Validate an add-to-cart request and merge it into the ledger
    pub fn add_item(&mut self, request: AddItemRequest) -> Result<&CartLedger, CartServiceError> {
        request
            .validate()
            .map_err(|e| CartServiceError::ValidationError {
                message: format!("Add to cart validation failed: {}", e),
            })?;

        let (item, quantity) = request.into_line_item();
        info!("Adding {} x '{}' ({}) to cart", quantity, item.name, item.id);

        Ok(self.store.dispatch(CartIntent::Add { item, quantity }))
    }

    pub fn remove_item(&mut self, id: &str) -> &CartLedger {
        if !self.store.ledger().contains(id) {
            warn!("Remove requested for item not in cart: {}", id);
        }
        self.store.dispatch(CartIntent::Remove { id: id.to_string() })
    }

    pub fn set_quantity(&mut self, id: &str, quantity: i64) -> &CartLedger {
        debug!("Setting quantity of {} to {}", id, quantity);
        self.store.dispatch(CartIntent::SetQuantity {
            id: id.to_string(),
            quantity,
        })
    }

    pub fn clear(&mut self) -> &CartLedger {
        info!("Clearing cart session {}", self.session_id);
        self.store.dispatch(CartIntent::Clear)
    }

    pub fn open(&mut self) -> &CartLedger {
        self.store.dispatch(CartIntent::Open)
    }

    pub fn close(&mut self) -> &CartLedger {
        self.store.dispatch(CartIntent::Close)
    }

    pub fn toggle(&mut self) -> &CartLedger {
        self.store.dispatch(CartIntent::ToggleVisibility)
    }

    /// Remove the row from the cart and record it on the wishlist
    pub fn move_to_wishlist(&mut self, id: &str) -> Result<LineItem, CartServiceError> {
        let item = self
            .store
            .ledger()
            .get(id)
            .cloned()
            .ok_or_else(|| CartServiceError::ItemNotFound { id: id.to_string() })?;

        self.store.dispatch(CartIntent::MoveToWishlist { id: id.to_string() });

        if !self.wishlist.iter().any(|saved| saved.id == item.id) {
            self.wishlist.push(item.clone());
        }
        info!("Moved '{}' to wishlist", item.id);
        Ok(item)
    }

    pub fn wishlist(&self) -> &[LineItem] {
        &self.wishlist
    }

    pub fn ledger(&self) -> &CartLedger {
        self.store.ledger()
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&CartLedger) + 'static,
    {
        self.store.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.store.unsubscribe(id)
    }
}
