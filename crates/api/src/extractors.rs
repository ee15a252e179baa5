//! Request extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::Deserialize;
use sharegraph_common::{AppError, PageRequest};
use validator::Validate;

/// Actor id placed in request extensions by the actor middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor(pub i64);

/// Authenticated actor extractor. Rejects anonymous requests with 401.
#[derive(Debug, Clone, Copy)]
pub struct AuthActor(pub i64);

impl<S> FromRequestParts<S> for AuthActor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Actor>()
            .map(|actor| Self(actor.0))
            .ok_or(AppError::Unauthorized)
    }
}

/// Optional actor extractor.
#[derive(Debug, Clone, Copy)]
pub struct MaybeActor(pub Option<i64>);

impl<S> FromRequestParts<S> for MaybeActor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<Actor>().map(|actor| actor.0)))
    }
}

/// `?search=&page=&size=` query for listings.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ListQuery {
    /// Username filter; trimmed, empty means no filter.
    #[serde(default)]
    #[validate(length(max = 100))]
    pub search: String,
    /// 1-based page number; unparseable values fall back to the default.
    pub page: Option<String>,
    /// Items per page; unparseable values fall back to the default.
    pub size: Option<String>,
}

impl ListQuery {
    /// The requested window, unclamped.
    #[must_use]
    pub fn window(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest::new(
            lenient_int(self.page.as_deref()).unwrap_or(defaults.page),
            lenient_int(self.size.as_deref()).unwrap_or(defaults.size),
        )
    }
}

/// Parse an integer query value, treating anything unparseable as absent.
#[must_use]
pub fn lenient_int(value: Option<&str>) -> Option<i64> {
    value.and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<&str>, size: Option<&str>) -> ListQuery {
        ListQuery {
            search: String::new(),
            page: page.map(str::to_string),
            size: size.map(str::to_string),
        }
    }

    #[test]
    fn test_window_defaults_unparseable_values() {
        assert_eq!(query(None, None).window(), PageRequest::default());
        assert_eq!(query(Some("abc"), Some("")).window(), PageRequest::default());
        assert_eq!(
            query(Some("99999999999999999999"), Some("1.5")).window(),
            PageRequest::default()
        );
    }

    #[test]
    fn test_window_keeps_given_values() {
        assert_eq!(query(Some(" 3 "), Some("-4")).window(), PageRequest::new(3, -4));
    }
}
