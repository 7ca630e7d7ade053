//! `ss-cli visitors`

use std::io::Write;

use solestyle_storefront::services::VisitorStore;
use solestyle_storefront::storage::FileStorage;

use super::CliError;

/// Print one line per visitor: id, cart quantity, order count.
pub fn list(storage: &FileStorage, out: &mut impl Write) -> Result<(), CliError> {
    let scopes = storage.scopes()?;
    if scopes.is_empty() {
        writeln!(out, "No visitors in {}", storage.root().display())?;
        return Ok(());
    }

    for visitor in &scopes {
        let store = VisitorStore::new(storage, visitor);
        let cart = store.load_cart()?;
        let orders = store.load_orders()?;
        writeln!(
            out,
            "{visitor}  cart: {} item(s)  orders: {}",
            cart.total_items(),
            orders.len()
        )?;
    }

    tracing::debug!(count = scopes.len(), "Listed visitors");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use solestyle_core::storage::{ScopedStorage, Storage, keys};

    use super::*;

    #[test]
    fn test_list_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();

        let mut out = Vec::new();
        list(&storage, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("No visitors"));
    }

    #[test]
    fn test_list_counts_orders() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        ScopedStorage::new(&storage, "v1")
            .set_item(keys::ORDERS, "[]")
            .unwrap();

        let mut out = Vec::new();
        list(&storage, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert_eq!(out.trim(), "v1  cart: 0 item(s)  orders: 0");
    }
}
