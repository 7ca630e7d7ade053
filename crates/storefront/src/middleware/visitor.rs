//! Visitor identification.
//!
//! Every browser gets a long-lived `ss_visitor` cookie holding a random id.
//! The id names the visitor's namespace in persistent storage, so carts and
//! order history survive browser restarts the same way they would in the
//! browser's own storage.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{
        HeaderValue,
        header::{COOKIE, SET_COOKIE},
        request::Parts,
    },
    middleware::Next,
    response::Response,
};
use tower_sessions::cookie::{Cookie, SameSite, time::Duration};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

/// Visitor cookie name.
pub const VISITOR_COOKIE_NAME: &str = "ss_visitor";

/// Visitor cookie lifetime in days.
const VISITOR_COOKIE_DAYS: i64 = 365;

/// Opaque identifier of one browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitorId(String);

impl VisitorId {
    /// Generate a fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Accept a cookie value only if it is an id we could have issued.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::try_parse(raw)
            .ok()
            .map(|uuid| Self(uuid.simple().to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VisitorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Find the visitor cookie among the request's `Cookie` headers.
fn visitor_from_headers(headers: &axum::http::HeaderMap) -> Option<VisitorId> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == VISITOR_COOKIE_NAME)
        .and_then(|cookie| VisitorId::parse(cookie.value()))
}

fn visitor_cookie(visitor: &VisitorId, secure: bool) -> Cookie<'static> {
    Cookie::build((VISITOR_COOKIE_NAME, visitor.as_str().to_owned()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::days(VISITOR_COOKIE_DAYS))
        .build()
}

/// Middleware that makes sure every request carries a [`VisitorId`].
///
/// A missing or unreadable cookie gets a new id, and the response sets the
/// cookie.
pub async fn visitor_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let (visitor, is_new) = match visitor_from_headers(request.headers()) {
        Some(visitor) => (visitor, false),
        None => (VisitorId::generate(), true),
    };

    tracing::Span::current().record("visitor", visitor.as_str());
    request.extensions_mut().insert(visitor.clone());

    let mut response = next.run(request).await;

    if is_new {
        let cookie = visitor_cookie(&visitor, state.config().is_secure());
        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::error!("Failed to encode visitor cookie: {e}"),
        }
    }

    response
}

impl<S> FromRequestParts<S> for VisitorId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Self>().cloned().ok_or_else(|| {
            AppError::Internal("visitor id missing - middleware may be misconfigured".to_string())
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderMap;

    use super::*;

    #[test]
    fn test_parse_accepts_uuids_only() {
        let id = VisitorId::generate();
        assert_eq!(VisitorId::parse(id.as_str()), Some(id));
        assert!(VisitorId::parse("../../etc").is_none());
        assert!(VisitorId::parse("").is_none());
    }

    #[test]
    fn test_parse_normalizes_hyphenated_form() {
        let id = VisitorId::parse("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        assert_eq!(id.as_str(), "67e5504410b1426f9247bb680e5fe0c8");
    }

    #[test]
    fn test_visitor_from_headers() {
        let id = VisitorId::generate();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("ss_session=abc; {VISITOR_COOKIE_NAME}={id}"))
                .unwrap(),
        );
        assert_eq!(visitor_from_headers(&headers), Some(id));

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("ss_visitor=garbage"));
        assert_eq!(visitor_from_headers(&headers), None);
    }

    #[test]
    fn test_visitor_cookie_attributes() {
        let cookie = visitor_cookie(&VisitorId::generate(), true).to_string();
        assert!(cookie.starts_with("ss_visitor="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("Max-Age=31536000"));
    }
}
