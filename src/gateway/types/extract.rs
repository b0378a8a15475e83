//! Extractors whose rejections use the `ApiResponse` envelope
//!
//! axum's own `Json` and `Path` reject with a plain-text body. These wrap
//! them and keep the rejection's status while rendering `{code, msg}`.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use super::response::{ApiError, error_codes};

/// JSON body extractor
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            ApiError::new(
                e.status(),
                error_codes::INVALID_PARAMETER,
                format!("Invalid JSON: {}", e.body_text()),
            )
        })?;
        Ok(ApiJson(value))
    }
}

/// Path parameter extractor
#[derive(Debug)]
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                ApiError::new(
                    e.status(),
                    error_codes::INVALID_PARAMETER,
                    format!("Invalid path: {}", e.body_text()),
                )
            })?;
        Ok(ApiPath(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::types::AssetAmountRequest;
    use axum::{body::Body, http::StatusCode};

    fn request(content_type: Option<&str>, body: &'static str) -> Request {
        let mut builder = Request::builder().method("POST").uri("/");
        if let Some(ct) = content_type {
            builder = builder.header("content-type", ct);
        }
        builder.body(Body::from(body)).unwrap()
    }

    #[tokio::test]
    async fn test_json_accepts_valid_body() {
        let req = request(
            Some("application/json"),
            r#"{"reference_id":"s1","asset":"GOLD","amount":30}"#,
        );
        let ApiJson(body) = ApiJson::<AssetAmountRequest>::from_request(req, &())
            .await
            .unwrap();
        assert_eq!(body.reference_id, "s1");
        assert_eq!(body.amount, 30);
    }

    #[tokio::test]
    async fn test_malformed_json_is_400() {
        let req = request(Some("application/json"), "{not json");
        let err = ApiJson::<AssetAmountRequest>::from_request(req, &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, error_codes::INVALID_PARAMETER);
        assert!(err.msg.starts_with("Invalid JSON"));
    }

    #[tokio::test]
    async fn test_wrong_field_type_keeps_422() {
        let req = request(
            Some("application/json"),
            r#"{"reference_id":"s1","asset":"GOLD","amount":"thirty"}"#,
        );
        let err = ApiJson::<AssetAmountRequest>::from_request(req, &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.code, error_codes::INVALID_PARAMETER);
    }

    #[tokio::test]
    async fn test_missing_content_type_is_415() {
        let req = request(None, r#"{"reference_id":"s1","asset":"GOLD","amount":30}"#);
        let err = ApiJson::<AssetAmountRequest>::from_request(req, &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(err.code, error_codes::INVALID_PARAMETER);
    }
}
