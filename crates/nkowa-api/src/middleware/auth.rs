//! Caller identity extraction.
//!
//! Authentication happens upstream; the gateway forwards the verified user
//! in the `x-user-uid` and `x-user-email` headers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use nkowa_core::defaults::{USER_EMAIL_HEADER, USER_UID_HEADER};
use nkowa_core::Author;

use crate::ApiError;

fn header_value(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Identity of the caller, when one was forwarded.
///
/// Read-only endpoints use this to tag log lines without requiring a user.
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<Author>);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for OptionalUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let author = header_value(parts, USER_UID_HEADER).map(|uid| Author {
            uid,
            email: header_value(parts, USER_EMAIL_HEADER),
        });
        Ok(OptionalUser(author))
    }
}

/// Extractor that requires a caller identity.
///
/// Rejects with 400 `User uid is required` when the uid header is absent.
#[derive(Debug, Clone)]
pub struct RequireUser(pub Author);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let OptionalUser(author) = OptionalUser::from_request_parts(parts, state).await?;
        author
            .map(RequireUser)
            .ok_or_else(|| ApiError::BadRequest("User uid is required".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_require_user_reads_headers() {
        let mut parts = parts(&[("x-user-uid", "uid-1"), ("x-user-email", "a@b.c")]);
        let RequireUser(author) = RequireUser::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(author.uid, "uid-1");
        assert_eq!(author.email.as_deref(), Some("a@b.c"));
    }

    #[tokio::test]
    async fn test_require_user_rejects_missing_uid() {
        let mut parts = parts(&[("x-user-email", "a@b.c")]);
        let err = RequireUser::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(msg) if msg == "User uid is required"));
    }

    #[tokio::test]
    async fn test_blank_uid_counts_as_missing() {
        let mut parts = parts(&[("x-user-uid", "   ")]);
        let OptionalUser(author) = OptionalUser::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(author.is_none());
    }
}
