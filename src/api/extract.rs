//! Request body extraction
//!
//! Account endpoints take either a JSON body or an HTML-form body.

use axum::{
    Form, Json, async_trait,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Body decoded from `application/x-www-form-urlencoded` or JSON
///
/// The Content-Type header picks the decoder; anything that is not a form
/// goes through the JSON extractor and its content-type check. Rejections
/// become 400s in the standard error envelope.
#[derive(Debug, Clone)]
pub struct JsonOrForm<T>(pub T);

fn is_form(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with(FORM_CONTENT_TYPE))
}

#[async_trait]
impl<T, S> FromRequest<S> for JsonOrForm<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(&request) {
            let Form(value) = Form::<T>::from_request(request, state)
                .await
                .map_err(|rejection| reject_body(rejection.body_text()))?;
            return Ok(JsonOrForm(value));
        }

        let Json(value) = Json::<T>::from_request(request, state)
            .await
            .map_err(|rejection| reject_body(rejection.body_text()))?;
        Ok(JsonOrForm(value))
    }
}

fn reject_body(message: String) -> AppError {
    tracing::debug!(error = %message, "Rejected request body");
    AppError::Validation(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RegisterRequest;
    use axum::body::Body;

    fn request(content_type: &str, body: &'static str) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .uri("/api/register")
            .header(CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn decodes_form_body() {
        let JsonOrForm(req) = JsonOrForm::<RegisterRequest>::from_request(
            request(FORM_CONTENT_TYPE, "username=alice&password=pw1&email=a%40x.com"),
            &(),
        )
        .await
        .unwrap();

        assert_eq!(req.username.as_deref(), Some("alice"));
        assert_eq!(req.password.as_deref(), Some("pw1"));
        assert_eq!(req.email.as_deref(), Some("a@x.com"));
    }

    #[tokio::test]
    async fn decodes_json_body() {
        let JsonOrForm(req) = JsonOrForm::<RegisterRequest>::from_request(
            request("application/json", r#"{"username":"alice"}"#),
            &(),
        )
        .await
        .unwrap();

        assert_eq!(req.username.as_deref(), Some("alice"));
        assert_eq!(req.email, None);
    }

    #[tokio::test]
    async fn rejects_unsupported_content_type() {
        let result = JsonOrForm::<RegisterRequest>::from_request(
            request("text/plain", "username=alice"),
            &(),
        )
        .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
