//! Network service consumed by [`use_fetch`](crate::resource::use_fetch).

use futures_util::future::LocalBoxFuture;
use serde::de::DeserializeOwned;

use crate::error::FetchError;

/// A raw HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// A 200 response with a JSON body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode a successful response as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        if !self.is_success() {
            return Err(FetchError::Http {
                status: self.status,
            });
        }
        serde_json::from_str(&self.body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

/// Issues requests. Implementations own transport, retries and timeouts.
pub trait Fetcher {
    /// Request `url`, failing with [`FetchError::Network`] when no response
    /// arrives.
    fn request(&self, url: &str) -> LocalBoxFuture<'static, Result<HttpResponse, FetchError>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct User {
        name: String,
    }

    #[test]
    fn json_decodes_success_bodies() {
        let user: User = HttpResponse::ok(r#"{"name":"ada"}"#).json().unwrap();
        assert_eq!(user.name, "ada");
    }

    #[test]
    fn non_success_status_is_http_error() {
        let err = HttpResponse::new(503, "busy").json::<User>().unwrap_err();
        assert_eq!(err, FetchError::Http { status: 503 });
    }

    #[test]
    fn malformed_body_is_decode_error() {
        let err = HttpResponse::ok("{").json::<User>().unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }
}
