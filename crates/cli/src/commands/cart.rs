//! `ss-cli cart show|clear`

use std::io::Write;

use solestyle_core::OrderTotals;
use solestyle_storefront::services::VisitorStore;
use solestyle_storefront::storage::FileStorage;

use super::CliError;

/// Print the visitor's cart lines followed by the derived totals.
pub fn show(storage: &FileStorage, visitor: &str, out: &mut impl Write) -> Result<(), CliError> {
    let cart = VisitorStore::new(storage, visitor).load_cart()?;

    if cart.is_empty() {
        writeln!(out, "Cart for {visitor} is empty")?;
        return Ok(());
    }

    writeln!(out, "Cart for {visitor}")?;
    for item in cart.items() {
        let variant = [item.color.as_deref(), item.size.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" / ");
        writeln!(
            out,
            "  {} x{}  {} ({})  {}",
            item.name,
            item.quantity,
            item.price,
            if variant.is_empty() { "-" } else { variant.as_str() },
            item.line_total()
        )?;
    }

    let totals = OrderTotals::for_cart(&cart);
    writeln!(out, "Items:    {}", cart.total_items())?;
    writeln!(out, "Subtotal: {}", totals.subtotal)?;
    writeln!(out, "Tax:      {}", totals.tax)?;
    writeln!(out, "Shipping: {}", totals.shipping_label())?;
    writeln!(out, "Total:    {}", totals.total)?;
    Ok(())
}

/// Replace the visitor's cart with an empty one.
pub fn clear(storage: &FileStorage, visitor: &str, out: &mut impl Write) -> Result<(), CliError> {
    VisitorStore::new(storage, visitor).reset_cart()?;
    tracing::info!(visitor, "Cart cleared");
    writeln!(out, "Cleared cart for {visitor}")?;
    Ok(())
}
