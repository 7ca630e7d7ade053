//! Integration tests for the SoleStyle storefront.
//!
//! Each test starts the full router (all middleware, in-memory sessions) on
//! an ephemeral port and drives it over HTTP with a cookie-keeping client,
//! the way a browser would.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p solestyle-integration-tests
//! ```

use std::net::SocketAddr;

use solestyle_core::{MemoryStorage, Storage};
use solestyle_storefront::{AppState, StorefrontConfig, app};
use tokio::net::TcpListener;

/// A running storefront plus a client that behaves like one browser.
pub struct TestContext {
    pub client: reqwest::Client,
    pub base_url: String,
}

impl TestContext {
    /// Start a storefront backed by in-memory storage.
    ///
    /// # Panics
    ///
    /// Panics if the server cannot be started.
    pub async fn new() -> Self {
        Self::with_storage(MemoryStorage::new()).await
    }

    /// Start a storefront backed by `storage`.
    ///
    /// # Panics
    ///
    /// Panics if the server cannot be started.
    pub async fn with_storage(storage: impl Storage + 'static) -> Self {
        let state = AppState::new(StorefrontConfig::default(), storage);
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");

        tokio::spawn(async move {
            axum::serve(listener, app(state)).await.ok();
        });

        Self {
            client: browser(),
            base_url: format!("http://{addr}"),
        }
    }

    /// A second visitor against the same server.
    #[must_use]
    pub fn new_visitor(&self) -> Self {
        Self {
            client: browser(),
            base_url: self.base_url.clone(),
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// POST a form without following the redirect.
    ///
    /// # Panics
    ///
    /// Panics if the request fails.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST request")
    }

    /// GET a page and return status and body.
    ///
    /// # Panics
    ///
    /// Panics if the request fails.
    pub async fn get_page(&self, path: &str) -> (reqwest::StatusCode, String) {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request");
        let status = response.status();
        (status, response.text().await.expect("response body"))
    }

    /// Add one unit of a product.
    pub async fn add_to_cart(
        &self,
        name: &str,
        price: &str,
        color: &str,
        size: &str,
    ) -> reqwest::Response {
        self.post_form(
            "/cart/add",
            &[
                ("name", name),
                ("price", price),
                ("image", "images/shoe.jpg"),
                ("color", color),
                ("size", size),
            ],
        )
        .await
    }

    /// Body of the cart count badge.
    pub async fn cart_count(&self) -> String {
        self.get_page("/cart/count").await.1
    }
}

/// A client with its own cookie jar that never follows redirects.
fn browser() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("build HTTP client")
}

/// Location header of a redirect response.
///
/// # Panics
///
/// Panics if the response is not a redirect.
#[must_use]
pub fn location(response: &reqwest::Response) -> String {
    assert!(
        response.status().is_redirection(),
        "expected redirect, got {}",
        response.status()
    );
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .expect("Location header")
        .to_string()
}
