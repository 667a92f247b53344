//! Request body extraction for the create routes.

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::{header::CONTENT_TYPE, HeaderMap},
    Form, Json,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ApiError;

/// Create payload read from a JSON or urlencoded form body.
///
/// A body that carries no usable fields (empty, another content type, or
/// JSON whose values have the wrong types) yields `T::default()`, so the
/// handler's presence check reports it. Only unparseable input is rejected
/// here, with the parser's message.
#[derive(Debug)]
pub struct Payload<T>(pub T);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Json,
    Form,
    Other,
}

impl BodyKind {
    fn of(headers: &HeaderMap) -> Self {
        let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
            return BodyKind::Other;
        };
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if mime == "application/x-www-form-urlencoded" {
            BodyKind::Form
        } else if mime == "application/json"
            || (mime.starts_with("application/") && mime.ends_with("+json"))
        {
            BodyKind::Json
        } else {
            BodyKind::Other
        }
    }
}

impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match BodyKind::of(req.headers()) {
            BodyKind::Form => {
                let Form(input) = Form::<T>::from_request(req, state)
                    .await
                    .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
                Ok(Self(input))
            }
            BodyKind::Json => {
                let bytes = Bytes::from_request(req, state)
                    .await
                    .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
                if bytes.is_empty() {
                    return Ok(Self(T::default()));
                }
                match Json::<T>::from_bytes(&bytes) {
                    Ok(Json(input)) => Ok(Self(input)),
                    Err(JsonRejection::JsonDataError(err)) => {
                        debug!(error = %err.body_text(), "body fields have unexpected types");
                        Ok(Self(T::default()))
                    }
                    Err(rejection) => Err(ApiError::bad_request(rejection.body_text())),
                }
            }
            BodyKind::Other => {
                debug!("request body is neither JSON nor a form");
                Ok(Self(T::default()))
            }
        }
    }
}
