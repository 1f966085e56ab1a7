use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{cart::CartLedger, line_item::LineItem};

/// What gets persisted between sessions: the ledger plus the caller-owned wishlist.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    pub session_id: Uuid,
    pub ledger: CartLedger,
    #[serde(default)]
    pub wishlist: Vec<LineItem>,
    pub saved_at: DateTime<Utc>,
}

impl CartSnapshot {
    pub fn new(session_id: Uuid, ledger: CartLedger, wishlist: Vec<LineItem>) -> Self {
        Self {
            session_id,
            ledger,
            wishlist,
            saved_at: Utc::now(),
        }
    }
}
