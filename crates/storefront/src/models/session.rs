//! Session-related types.
//!
//! Besides the checkout snapshot and the last order number (see
//! [`solestyle_core::storage::keys`]), the session carries one-shot notices
//! shown as a toast on the next rendered page.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

/// Session keys owned by the web layer.
pub mod keys {
    /// Key for the pending toast notice.
    pub const NOTICE: &str = "notice";
}

/// Visual weight of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Info,
}

impl NoticeKind {
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        match self {
            Self::Success => "toast-success",
            Self::Info => "toast-info",
        }
    }
}

/// A short message for the visitor, optionally with one link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub link: Option<NoticeLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticeLink {
    pub label: String,
    pub href: String,
}

impl Notice {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
            link: None,
        }
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
            link: None,
        }
    }

    #[must_use]
    pub fn with_link(mut self, label: impl Into<String>, href: impl Into<String>) -> Self {
        self.link = Some(NoticeLink {
            label: label.into(),
            href: href.into(),
        });
        self
    }

    /// The toast shown after a product was added.
    #[must_use]
    pub fn added_to_cart(product_name: &str) -> Self {
        Self::success(format!("\"{product_name}\" added to your cart!"))
            .with_link("View Cart", "/cart")
    }
}

/// Queue a notice for the next page render, replacing any pending one.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn set_notice(
    session: &Session,
    notice: &Notice,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::NOTICE, notice).await
}

/// Take the pending notice, if any. A notice is shown once.
///
/// Session failures are logged and treated as "no notice".
pub async fn take_notice(session: &Session) -> Option<Notice> {
    session
        .remove::<Notice>(keys::NOTICE)
        .await
        .inspect_err(|e| tracing::warn!("Failed to read notice from session: {e}"))
        .ok()
        .flatten()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    #[test]
    fn test_added_to_cart_notice() {
        let notice = Notice::added_to_cart("Trail Runner");
        assert_eq!(notice.message, "\"Trail Runner\" added to your cart!");
        assert_eq!(notice.kind, NoticeKind::Success);
        assert_eq!(notice.link.unwrap().href, "/cart");
    }

    #[tokio::test]
    async fn test_notice_is_shown_once() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        set_notice(&session, &Notice::info("Cart updated successfully!"))
            .await
            .unwrap();

        let notice = take_notice(&session).await.unwrap();
        assert_eq!(notice.message, "Cart updated successfully!");
        assert!(take_notice(&session).await.is_none());
    }
}
