use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use retro_core::RetroError;

// ---------------------------------------------------------------------------
// AppError — unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(e) = self.0.downcast_ref::<RetroError>() {
            // Validation failures carry their per-field messages so the
            // board can render them inline.
            if let RetroError::Validation(errors) = e {
                let body = serde_json::json!({
                    "error": e.to_string(),
                    "fields": errors.fields,
                });
                return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(body)).into_response();
            }

            let status = match e {
                RetroError::SprintIdRequired(_) | RetroError::InvalidColor(_) => {
                    StatusCode::BAD_REQUEST
                }
                RetroError::SprintNotFound(_) | RetroError::ItemNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                RetroError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                RetroError::Store(_) | RetroError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            let body = serde_json::json!({ "error": e.to_string() });
            return (status, axum::Json(body)).into_response();
        }

        let body = serde_json::json!({ "error": self.0.to_string() });
        (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
