//! Order records created at checkout.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartItem};
use crate::types::{Email, OrderId, PaymentMethod, PaymentStatus, Price};

/// Sales tax applied to every order (8%).
pub const TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

/// Money breakdown shown on the cart page, the checkout summary, and the
/// order itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Price,
    pub tax: Price,
    pub shipping: Price,
    pub total: Price,
}

impl OrderTotals {
    /// Shipping is always free; tax is [`TAX_RATE`] of the subtotal.
    #[must_use]
    pub fn from_subtotal(subtotal: Price) -> Self {
        let tax = subtotal * TAX_RATE;
        let shipping = Price::ZERO;
        Self {
            subtotal,
            tax,
            shipping,
            total: subtotal + tax + shipping,
        }
    }

    /// Totals for everything in `cart`.
    #[must_use]
    pub fn for_cart(cart: &Cart) -> Self {
        Self::from_subtotal(cart.subtotal())
    }

    /// `Free` or the shipping amount.
    #[must_use]
    pub fn shipping_label(&self) -> String {
        if self.shipping == Price::ZERO {
            "Free".to_owned()
        } else {
            self.shipping.display()
        }
    }
}

/// Who placed the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: String,
}

impl CustomerInfo {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Where the order ships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

/// Payment choice and state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub method: PaymentMethod,
    pub status: PaymentStatus,
}

impl From<PaymentMethod> for Payment {
    fn from(method: PaymentMethod) -> Self {
        Self {
            method,
            status: method.initial_status(),
        }
    }
}

/// A completed checkout. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: OrderId,
    pub order_date: DateTime<Utc>,
    pub customer_info: CustomerInfo,
    pub shipping_address: ShippingAddress,
    pub items: Vec<CartItem>,
    pub totals: OrderTotals,
    pub payment: Payment,
}

impl Order {
    /// Build an order from a checkout snapshot and validated form data.
    #[must_use]
    pub fn new(
        order_id: OrderId,
        order_date: DateTime<Utc>,
        snapshot: &Cart,
        checkout: super::ValidCheckout,
    ) -> Self {
        Self {
            order_id,
            order_date,
            customer_info: checkout.customer,
            shipping_address: checkout.shipping,
            items: snapshot.items().to_vec(),
            totals: OrderTotals::for_cart(snapshot),
            payment: Payment::from(checkout.payment_method),
        }
    }

    /// Number of units across all lines.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, item| acc.saturating_add(item.quantity))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::cart::NewCartItem;
    use crate::checkout::ValidCheckout;
    use crate::types::ProductId;

    fn snapshot() -> Cart {
        let mut cart = Cart::new();
        for _ in 0..2 {
            cart.add(NewCartItem {
                product_id: ProductId::new("runner"),
                name: "Runner".into(),
                price: Price::from_cents(12999),
                image: "runner.jpg".into(),
                color: Some("black".into()),
                size: Some("10".into()),
            });
        }
        cart
    }

    fn checkout(method: PaymentMethod) -> ValidCheckout {
        ValidCheckout {
            customer: CustomerInfo {
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                email: Email::parse("ada@example.com").unwrap(),
                phone: "555-0100".into(),
            },
            shipping: ShippingAddress {
                address: "1 Analytical Way".into(),
                city: "London".into(),
                state: "LDN".into(),
                zip: "12345".into(),
                country: "UK".into(),
            },
            payment_method: method,
        }
    }

    #[test]
    fn test_tax_is_eight_percent() {
        let totals = OrderTotals::from_subtotal(Price::from_cents(25998));
        assert_eq!(totals.tax, Price::new(Decimal::new(2079_84, 4)));
        assert_eq!(totals.shipping, Price::ZERO);
        assert_eq!(totals.total, totals.subtotal + totals.tax);
        assert_eq!(totals.tax.display(), "$20.80");
        assert_eq!(totals.total.display(), "$280.78");
        assert_eq!(totals.shipping_label(), "Free");
    }

    #[test]
    fn test_order_from_snapshot() {
        let date = Utc.with_ymd_and_hms(2024, 5, 4, 10, 30, 0).unwrap();
        let order = Order::new(
            OrderId::new("SS-1714818600-42"),
            date,
            &snapshot(),
            checkout(PaymentMethod::CreditCard),
        );

        assert_eq!(order.items.len(), 1);
        assert_eq!(order.total_items(), 2);
        assert_eq!(order.totals.subtotal, Price::from_cents(25998));
        assert_eq!(order.payment.status, PaymentStatus::Paid);
        assert_eq!(order.customer_info.full_name(), "Ada Lovelace");
    }

    #[test]
    fn test_cod_order_pending() {
        let order = Order::new(
            OrderId::new("SS-1-1"),
            Utc::now(),
            &snapshot(),
            checkout(PaymentMethod::CashOnDelivery),
        );
        assert_eq!(order.payment.method, PaymentMethod::CashOnDelivery);
        assert_eq!(order.payment.status, PaymentStatus::Pending);
    }

    #[test]
    fn test_order_json_shape() {
        let date = Utc.with_ymd_and_hms(2024, 5, 4, 10, 30, 0).unwrap();
        let order = Order::new(
            OrderId::new("SS-1714818600-42"),
            date,
            &snapshot(),
            checkout(PaymentMethod::CashOnDelivery),
        );
        let value = serde_json::to_value(&order).unwrap();

        assert_eq!(value["orderId"], "SS-1714818600-42");
        assert_eq!(value["orderDate"], "2024-05-04T10:30:00Z");
        assert_eq!(value["customerInfo"]["firstName"], "Ada");
        assert_eq!(value["shippingAddress"]["zip"], "12345");
        assert_eq!(value["payment"]["method"], "cod");
        assert_eq!(value["payment"]["status"], "pending");
        assert_eq!(value["totals"]["shipping"], "0");

        let back: Order = serde_json::from_value(value).unwrap();
        assert_eq!(back, order);
    }
}
