//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Redirect to the cart
//! GET  /health                 - Health check
//!
//! # Cart (HTMX fragments when HX-Request is set, redirects otherwise)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add one unit (count badge + toast)
//! POST /cart/update            - Set line quantity (cart contents fragment)
//! POST /cart/remove            - Remove line (cart contents fragment)
//! POST /cart/clear             - Empty the cart (cart contents fragment)
//! POST /cart/update-all        - Acknowledge with a notice
//! POST /cart/checkout          - Snapshot the cart into the session
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout
//! GET  /checkout               - Order summary and form
//! POST /checkout               - Validate and place the order
//! GET  /order-confirmation     - Last placed order
//! ```

pub mod cart;
pub mod checkout;

use axum::{
    Router,
    http::HeaderMap,
    response::Redirect,
    routing::{get, post},
};
use tower_sessions::Session;

use crate::error::Result;
use crate::middleware::{CspNonce, VisitorId};
use crate::models::{Notice, session::take_notice};
use crate::state::AppState;

/// Header set by HTMX (and the storefront's own scripts) on fragment requests.
pub const HX_REQUEST_HEADER: &str = "hx-request";

/// Whether the request wants a fragment rather than a full page.
#[must_use]
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key(HX_REQUEST_HEADER)
}

/// Data every full page needs for the shared layout.
pub struct PageChrome {
    pub nonce: String,
    pub cart_count: u32,
    pub notice: Option<Notice>,
}

impl PageChrome {
    /// Gather the layout data, consuming any pending notice.
    ///
    /// # Errors
    ///
    /// Returns an error if the visitor's cart cannot be read.
    pub async fn load(
        state: &AppState,
        visitor: &VisitorId,
        session: &Session,
        nonce: CspNonce,
    ) -> Result<Self> {
        let cart_count = state.visitor_store(visitor).load_cart()?.total_items();
        Ok(Self {
            nonce: nonce.0,
            cart_count,
            notice: take_notice(session).await,
        })
    }
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/update-all", post(cart::update_all))
        .route("/checkout", post(cart::checkout))
        .route("/count", get(cart::count))
}

/// Build the complete router with all routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/cart") }))
        .nest("/cart", cart_routes())
        .route("/checkout", get(checkout::show).post(checkout::submit))
        .route("/order-confirmation", get(checkout::confirmation))
}
