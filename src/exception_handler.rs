//! Default translation of handler errors into responses.
//!
//! # Mapping
//! - [`Error::NotFound`] → 404 `{"detail": "Not Found"}`
//! - [`Error::PermissionDenied`] → 403 `{"detail": "Forbidden"}`
//! - [`Error::Api`] → its own status, detail and headers
//! - anything else → handed back unchanged as `Err`

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use crate::error::{ApiException, Error};
use crate::http::request::Request;
use crate::http::response::{JsonResponse, Response};

/// Turns an error into a response, or hands it back to propagate further.
pub type ExceptionHandler = Arc<dyn Fn(&Request, Error) -> Result<Response, Error> + Send + Sync>;

pub fn default_exception_handler() -> ExceptionHandler {
    Arc::new(exception_handler)
}

pub fn exception_handler(_request: &Request, error: Error) -> Result<Response, Error> {
    let exception = match error {
        Error::Api(exception) => exception,
        Error::NotFound => ApiException::new(StatusCode::NOT_FOUND),
        Error::PermissionDenied => ApiException::new(StatusCode::FORBIDDEN),
        other => return Err(other),
    };

    Ok(JsonResponse::new(json!({ "detail": exception.detail }))
        .status(exception.status)
        .headers(exception.headers)
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use axum::http::{HeaderName, HeaderValue};

    fn request() -> Request {
        Request::new(
            axum::http::Request::builder()
                .uri("/")
                .body(Bytes::new())
                .unwrap(),
        )
    }

    async fn body(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    #[tokio::test]
    async fn test_api_exception() {
        let exc = ApiException::new(StatusCode::BAD_REQUEST)
            .with_detail("Error")
            .with_header(HeaderName::from_static("x-test"), HeaderValue::from_static("1"));

        let response = exception_handler(&request(), exc.into()).unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().contains_key("x-test"));
        assert_eq!(body(response).await, br#"{"detail": "Error"}"#);
    }

    #[tokio::test]
    async fn test_framework_conditions() {
        let cases = [
            (Error::NotFound, StatusCode::NOT_FOUND, r#"{"detail": "Not Found"}"#),
            (Error::PermissionDenied, StatusCode::FORBIDDEN, r#"{"detail": "Forbidden"}"#),
            (
                ApiException::new(StatusCode::BAD_REQUEST).into(),
                StatusCode::BAD_REQUEST,
                r#"{"detail": "Bad Request"}"#,
            ),
        ];
        for (error, status, content) in cases {
            let response = exception_handler(&request(), error).unwrap();
            assert_eq!(response.status(), status);
            assert_eq!(body(response).await, content.as_bytes());
        }
    }

    #[test]
    fn test_unknown_error_is_handed_back() {
        let err = exception_handler(&request(), Error::other("Unknown error")).unwrap_err();
        assert_eq!(err.to_string(), "Unknown error");
    }
}
