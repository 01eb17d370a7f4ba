//! # Cart Snapshots
//!
//! Reads and writes the serialized cart under a storage key.
//!
//! ## Load Outcomes
//! ```text
//! get_item(key)
//!      │
//!      ├── None            → Ok(None)         (first session)
//!      ├── valid JSON cart → Ok(Some(cart))
//!      └── anything else   → Err(CorruptSnapshot)
//! ```
//!
//! Deciding what to do with a corrupt snapshot is the caller's policy; this
//! module only reports it.

use rocket_core::Cart;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use crate::kv::KeyValueStore;

/// Loads the cart persisted under `key`.
pub async fn load_cart<S>(store: &S, key: &str) -> DbResult<Option<Cart>>
where
    S: KeyValueStore + ?Sized,
{
    let Some(raw) = store.get_item(key).await? else {
        debug!(key = %key, "No persisted cart");
        return Ok(None);
    };

    match serde_json::from_str::<Cart>(&raw) {
        Ok(cart) => {
            debug!(key = %key, items = cart.len(), "Loaded persisted cart");
            Ok(Some(cart))
        }
        Err(e) => {
            warn!(key = %key, error = %e, "Persisted cart could not be parsed");
            Err(DbError::corrupt(key, e))
        }
    }
}

/// Persists the full cart under `key`, replacing the previous snapshot.
pub async fn save_cart<S>(store: &S, key: &str, cart: &Cart) -> DbResult<()>
where
    S: KeyValueStore + ?Sized,
{
    let json = serde_json::to_string(cart).map_err(|e| DbError::Serialization(e.to_string()))?;
    store.set_item(key, &json).await
}
