//! `ss-cli orders list|show`

use std::io::Write;

use solestyle_core::OrderId;
use solestyle_storefront::services::VisitorStore;
use solestyle_storefront::storage::FileStorage;

use super::CliError;

/// One line per order, oldest first.
pub fn list(storage: &FileStorage, visitor: &str, out: &mut impl Write) -> Result<(), CliError> {
    let orders = VisitorStore::new(storage, visitor).load_orders()?;

    if orders.is_empty() {
        writeln!(out, "No orders for {visitor}")?;
        return Ok(());
    }

    for order in &orders {
        writeln!(
            out,
            "{}  {}  {:>10}  {}  {}",
            order.order_id,
            order.order_date.format("%Y-%m-%d %H:%M"),
            order.totals.total.display(),
            order.payment.method.as_str(),
            order.payment.status.as_str(),
        )?;
    }
    Ok(())
}

/// Print one stored order as pretty JSON.
pub fn show(
    storage: &FileStorage,
    visitor: &str,
    order_id: &str,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let order = VisitorStore::new(storage, visitor)
        .find_order(&OrderId::new(order_id))?
        .ok_or_else(|| CliError::OrderNotFound(order_id.to_string()))?;

    writeln!(out, "{}", serde_json::to_string_pretty(&order)?)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use solestyle_core::checkout::CheckoutForm;
    use solestyle_core::{Cart, NewCartItem, Order, Price, ProductId};

    use super::*;

    fn seeded() -> (tempfile::TempDir, FileStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();

        let mut cart = Cart::new();
        cart.add(NewCartItem {
            product_id: ProductId::new("court-classic"),
            name: "Court Classic".into(),
            price: Price::from_cents(10000),
            image: "court.jpg".into(),
            color: None,
            size: None,
        });
        let checkout = CheckoutForm {
            first_name: "Sam".into(),
            last_name: "Lee".into(),
            email: "sam@example.com".into(),
            phone: "555-0100".into(),
            address: "1 Main St".into(),
            city: "Springfield".into(),
            state: "IL".into(),
            zip: "62701".into(),
            country: "US".into(),
            payment_method: "cod".into(),
            ..CheckoutForm::default()
        }
        .validate()
        .unwrap();
        let date = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let order = Order::new(OrderId::new("SS-1772366400-7"), date, &cart, checkout);

        VisitorStore::new(&storage, "v1").append_order(order).unwrap();
        (dir, storage)
    }

    #[test]
    fn test_list_orders() {
        let (_dir, storage) = seeded();

        let mut out = Vec::new();
        list(&storage, "v1", &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("SS-1772366400-7  2026-03-01 12:00"));
        assert!(out.contains("$108.00"));
        assert!(out.trim_end().ends_with("cod  pending"));
    }

    #[test]
    fn test_show_order_as_json() {
        let (_dir, storage) = seeded();

        let mut out = Vec::new();
        show(&storage, "v1", "SS-1772366400-7", &mut out).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["orderId"], "SS-1772366400-7");
    }

    #[test]
    fn test_show_missing_order() {
        let (_dir, storage) = seeded();

        let err = show(&storage, "v1", "SS-0-0", &mut Vec::new()).unwrap_err();
        assert!(matches!(err, CliError::OrderNotFound(id) if id == "SS-0-0"));
    }
}
