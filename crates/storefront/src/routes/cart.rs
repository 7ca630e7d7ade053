//! Cart route handlers.
//!
//! Each handler loads the visitor's cart, applies one operation and writes
//! the whole cart back. Requests sent with `HX-Request` get an HTML fragment
//! to swap in; plain form posts are redirected (POST-redirect-GET).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::{HeaderMap, header::REFERER},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use solestyle_core::cart::MAX_SELECTABLE_QUANTITY;
use solestyle_core::checkout::OrderTotals;
use solestyle_core::{Cart, CartItem, LineKey, LineSelector, NewCartItem, Price, ProductId};
use tower_sessions::Session;
use tracing::instrument;
use url::Url;

use super::{PageChrome, is_htmx};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{CspNonce, VisitorId};
use crate::models::Notice;
use crate::models::session::set_notice;
use crate::services::checkout::save_snapshot;
use crate::state::AppState;

/// Shown by the update button.
pub const CART_UPDATED_MESSAGE: &str = "Cart updated successfully!";

/// Shown when checkout is attempted with nothing in the cart.
pub const EMPTY_CART_MESSAGE: &str = "Your cart is empty. Please add items before checkout.";

/// Placeholder for a missing color or size.
const DEFAULT_VARIANT: &str = "Default";

/// Tells client scripts to refresh anything showing the cart count.
const CART_UPDATED_TRIGGER: (&str, &str) = ("HX-Trigger", "cart-updated");

/// One entry of a line's quantity selector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuantityOption {
    pub value: u32,
    pub selected: bool,
}

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub product_id: String,
    pub name: String,
    pub href: String,
    pub image: String,
    /// Raw variant values, posted back to identify the line.
    pub color: String,
    pub size: String,
    /// `Color: X | Size: Y`
    pub variant_label: String,
    pub quantity: u32,
    pub quantity_options: Vec<QuantityOption>,
    pub unit_price: String,
    pub line_total: String,
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        let mut values: Vec<u32> = (1..=MAX_SELECTABLE_QUANTITY).collect();
        if item.quantity > MAX_SELECTABLE_QUANTITY {
            values.push(item.quantity);
        }
        let quantity_options = values
            .into_iter()
            .map(|value| QuantityOption {
                value,
                selected: value == item.quantity,
            })
            .collect();

        Self {
            product_id: item.product_id.to_string(),
            name: item.name.clone(),
            href: format!("/{}.html", item.product_id),
            image: item.image.clone(),
            color: item.color.clone().unwrap_or_default(),
            size: item.size.clone().unwrap_or_default(),
            variant_label: format!(
                "Color: {} | Size: {}",
                item.color.as_deref().unwrap_or(DEFAULT_VARIANT),
                item.size.as_deref().unwrap_or(DEFAULT_VARIANT)
            ),
            quantity: item.quantity,
            quantity_options,
            unit_price: item.price.display(),
            line_total: item.line_total().display(),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub item_count: u32,
    pub subtotal: String,
    pub tax: String,
    pub total: String,
}

impl CartView {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        let totals = OrderTotals::for_cart(cart);
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            item_count: cart.total_items(),
            subtotal: totals.subtotal.display(),
            tax: totals.tax.display(),
            total: totals.total.display(),
        }
    }
}

// =============================================================================
// Forms
// =============================================================================

/// Add to cart form data, as posted by a product card.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    #[serde(default)]
    pub product_id: String,
    /// Product page link, used for the id when none is given.
    #[serde(default)]
    pub product_link: String,
    pub name: String,
    /// Price text as displayed, e.g. `$89.99` or `$89.99 $129.99`.
    pub price: String,
    #[serde(default)]
    pub image: String,
    pub color: Option<String>,
    pub size: Option<String>,
}

impl AddToCartForm {
    /// Resolve the product id: explicit id, then the product link, then the name.
    fn product_id(&self) -> ProductId {
        if !self.product_id.trim().is_empty() {
            ProductId::new(self.product_id.trim())
        } else if !self.product_link.trim().is_empty() {
            ProductId::from_product_link(self.product_link.trim())
        } else {
            ProductId::from_product_name(&self.name)
        }
    }

    fn into_new_item(self) -> Result<NewCartItem> {
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return Err(AppError::BadRequest("product name is required".to_string()));
        }
        let price = Price::parse_display(&self.price)
            .map_err(|e| AppError::BadRequest(format!("invalid price '{}': {e}", self.price)))?;

        Ok(NewCartItem {
            product_id: self.product_id(),
            name,
            price,
            image: self.image,
            color: self.color,
            size: self.size,
        })
    }
}

fn line_key(product_id: &str, color: Option<&String>, size: Option<&String>) -> LineKey {
    LineKey::new(ProductId::new(product_id), color.cloned(), size.cloned())
}

/// Identifies one cart line.
#[derive(Debug, Deserialize)]
pub struct LineForm {
    pub product_id: String,
    pub color: Option<String>,
    pub size: Option<String>,
}

impl LineForm {
    fn key(&self) -> LineKey {
        line_key(&self.product_id, self.color.as_ref(), self.size.as_ref())
    }
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: String,
    pub color: Option<String>,
    pub size: Option<String>,
    pub quantity: u32,
}

impl UpdateCartForm {
    fn key(&self) -> LineKey {
        line_key(&self.product_id, self.color.as_ref(), self.size.as_ref())
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub chrome: PageChrome,
    pub cart: CartView,
}

/// Cart contents fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Count badge plus the "added" toast (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_added.html")]
pub struct CartAddedTemplate {
    pub count: u32,
    pub notice: Notice,
}

/// Toast fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/toast.html")]
pub struct ToastTemplate {
    pub notice: Notice,
}

// =============================================================================
// Helpers
// =============================================================================

/// Respond to a cart mutation: the contents fragment for HTMX, otherwise a
/// redirect back to the cart page.
fn cart_changed(headers: &HeaderMap, cart: &Cart) -> Response {
    if is_htmx(headers) {
        (
            AppendHeaders([CART_UPDATED_TRIGGER]),
            CartItemsTemplate {
                cart: CartView::from(cart),
            },
        )
            .into_response()
    } else {
        Redirect::to("/cart").into_response()
    }
}

/// Same-site path of the page the visitor came from.
fn back_path(headers: &HeaderMap) -> String {
    headers
        .get(REFERER)
        .and_then(|value| value.to_str().ok())
        .and_then(|referer| Url::parse(referer).ok())
        .map_or_else(
            || "/cart".to_string(),
            |url| match url.query() {
                Some(query) => format!("{}?{query}", url.path()),
                None => url.path().to_string(),
            },
        )
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(state, session, nonce), fields(visitor = %visitor))]
pub async fn show(
    State(state): State<AppState>,
    visitor: VisitorId,
    session: Session,
    nonce: CspNonce,
) -> Result<CartShowTemplate> {
    let cart = state.visitor_store(&visitor).load_cart()?;
    let chrome = PageChrome::load(&state, &visitor, &session, nonce).await?;

    Ok(CartShowTemplate {
        chrome,
        cart: CartView::from(&cart),
    })
}

/// Add one unit of a product to the cart.
///
/// HTMX requests get the new count badge and a toast; plain posts go back
/// to the referring page with the toast queued as a notice.
#[instrument(skip(state, session, headers, form), fields(visitor = %visitor))]
pub async fn add(
    State(state): State<AppState>,
    visitor: VisitorId,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let item = form.into_new_item()?;
    let notice = Notice::added_to_cart(&item.name);
    let product_id = item.product_id.clone();

    let store = state.visitor_store(&visitor);
    let mut cart = store.load_cart()?;
    let quantity = cart.add(item);
    store.save_cart(&cart)?;

    add_breadcrumb("cart", "Added to cart", &[("product_id", product_id.as_str())]);
    tracing::info!(product_id = %product_id, quantity, "Added to cart");

    if is_htmx(&headers) {
        return Ok((
            AppendHeaders([CART_UPDATED_TRIGGER]),
            CartAddedTemplate {
                count: cart.total_items(),
                notice,
            },
        )
            .into_response());
    }

    set_notice(&session, &notice).await?;
    Ok(Redirect::to(&back_path(&headers)).into_response())
}

/// Set the quantity of one cart line.
#[instrument(skip(state, headers), fields(visitor = %visitor))]
pub async fn update(
    State(state): State<AppState>,
    visitor: VisitorId,
    headers: HeaderMap,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let store = state.visitor_store(&visitor);
    let mut cart = store.load_cart()?;
    let key = form.key();

    match cart
        .set_quantity(LineSelector::Line(&key), form.quantity)
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        Some(delta) => {
            store.save_cart(&cart)?;
            tracing::info!(product_id = %key.product_id, delta, "Cart quantity updated");
        }
        None => tracing::debug!(product_id = %key.product_id, "Update for unknown cart line"),
    }

    Ok(cart_changed(&headers, &cart))
}

/// Remove one cart line.
#[instrument(skip(state, headers), fields(visitor = %visitor))]
pub async fn remove(
    State(state): State<AppState>,
    visitor: VisitorId,
    headers: HeaderMap,
    Form(form): Form<LineForm>,
) -> Result<Response> {
    let store = state.visitor_store(&visitor);
    let mut cart = store.load_cart()?;
    let key = form.key();

    if let Some(removed) = cart.remove(LineSelector::Line(&key)) {
        store.save_cart(&cart)?;
        tracing::info!(
            product_id = %removed.product_id,
            quantity = removed.quantity,
            "Removed from cart"
        );
    }

    Ok(cart_changed(&headers, &cart))
}

/// Remove every line.
#[instrument(skip(state, headers), fields(visitor = %visitor))]
pub async fn clear(
    State(state): State<AppState>,
    visitor: VisitorId,
    headers: HeaderMap,
) -> Result<Response> {
    let store = state.visitor_store(&visitor);
    let mut cart = store.load_cart()?;
    cart.clear();
    store.save_cart(&cart)?;
    tracing::info!("Cart cleared");

    Ok(cart_changed(&headers, &cart))
}

/// Acknowledge the update button. Quantity changes are saved as they are
/// made, so there is nothing left to write.
#[instrument(skip(session, headers))]
pub async fn update_all(session: Session, headers: HeaderMap) -> Result<Response> {
    let notice = Notice::success(CART_UPDATED_MESSAGE);
    if is_htmx(&headers) {
        return Ok(ToastTemplate { notice }.into_response());
    }
    set_notice(&session, &notice).await?;
    Ok(Redirect::to("/cart").into_response())
}

/// Start checkout: copy the cart into the session and go to the checkout page.
#[instrument(skip(state, session), fields(visitor = %visitor))]
pub async fn checkout(
    State(state): State<AppState>,
    visitor: VisitorId,
    session: Session,
) -> Result<Redirect> {
    let cart = state.visitor_store(&visitor).load_cart()?;

    if cart.is_empty() {
        set_notice(&session, &Notice::info(EMPTY_CART_MESSAGE)).await?;
        return Ok(Redirect::to("/cart"));
    }

    save_snapshot(&session, &cart).await?;
    add_breadcrumb("checkout", "Checkout started", &[]);
    Ok(Redirect::to("/checkout"))
}

/// Get cart count badge (HTMX).
#[instrument(skip(state), fields(visitor = %visitor))]
pub async fn count(State(state): State<AppState>, visitor: VisitorId) -> Result<CartCountTemplate> {
    let count = state.visitor_store(&visitor).load_cart()?.total_items();
    Ok(CartCountTemplate { count })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn add_form(product_id: &str, link: &str, name: &str, price: &str) -> AddToCartForm {
        AddToCartForm {
            product_id: product_id.into(),
            product_link: link.into(),
            name: name.into(),
            price: price.into(),
            image: "shoe.jpg".into(),
            color: None,
            size: None,
        }
    }

    #[test]
    fn test_product_id_fallbacks() {
        assert_eq!(
            add_form("explicit", "x.html", "X", "$1").product_id().as_str(),
            "explicit"
        );
        assert_eq!(
            add_form("", "air-max.html", "Air Max", "$1").product_id().as_str(),
            "air-max"
        );
        assert_eq!(
            add_form("", "", "Trail Runner Pro", "$1").product_id().as_str(),
            "trail-runner-pro"
        );
    }

    #[test]
    fn test_add_form_parses_sale_price() {
        let item = add_form("runner", "", "Runner", "$89.99 $129.99")
            .into_new_item()
            .unwrap();
        assert_eq!(item.price, Price::from_cents(8999));
    }

    #[test]
    fn test_add_form_rejects_bad_input() {
        assert!(matches!(
            add_form("runner", "", "  ", "$10").into_new_item(),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            add_form("runner", "", "Runner", "free").into_new_item(),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            add_form("runner", "", "Runner", "$79228162514264337593543950335").into_new_item(),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_item_view_labels_and_options() {
        let mut cart = Cart::new();
        cart.add(NewCartItem {
            product_id: ProductId::new("runner"),
            name: "Runner".into(),
            price: Price::from_cents(5000),
            image: "runner.jpg".into(),
            color: None,
            size: Some("10".into()),
        });
        let key = cart.items().first().unwrap().key();
        cart.set_quantity(LineSelector::Line(&key), 7).unwrap();

        let view = CartView::from(&cart);
        let item = view.items.first().unwrap();
        assert_eq!(item.variant_label, "Color: Default | Size: 10");
        let values: Vec<u32> = item.quantity_options.iter().map(|o| o.value).collect();
        assert_eq!(values, vec![1, 2, 3, 4, 5, 7]);
        assert!(item.quantity_options.last().unwrap().selected);
        assert_eq!(item.quantity_options.iter().filter(|o| o.selected).count(), 1);
        assert_eq!(item.line_total, "$350.00");
        assert_eq!(item.href, "/runner.html");
        assert_eq!(view.item_count, 7);
        assert_eq!(view.tax, "$28.00");
        assert_eq!(view.total, "$378.00");
    }

    #[test]
    fn test_back_path() {
        let mut headers = HeaderMap::new();
        assert_eq!(back_path(&headers), "/cart");

        headers.insert(
            REFERER,
            HeaderValue::from_static("https://evil.example/men?page=2"),
        );
        assert_eq!(back_path(&headers), "/men?page=2");
    }

    #[test]
    fn test_cart_changed_redirects_without_htmx() {
        let response = cart_changed(&HeaderMap::new(), &Cart::new());
        assert!(response.status().is_redirection());

        let mut headers = HeaderMap::new();
        headers.insert("hx-request", HeaderValue::from_static("true"));
        let response = cart_changed(&headers, &Cart::new());
        assert!(response.status().is_success());
        assert_eq!(response.headers()["HX-Trigger"], "cart-updated");
    }
}
