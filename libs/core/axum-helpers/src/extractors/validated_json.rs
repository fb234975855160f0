use crate::errors::{AppError, validation_response};
use axum::{
    extract::{FromRequest, Json, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// `Json<T>` that also runs `T::validate()`.
///
/// Malformed bodies reject through [`AppError::JsonExtractorRejection`];
/// validation failures reject with 400 and per-field details.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::from(e).into_response())?;

        data.validate().map_err(|e| {
            tracing::debug!(error = %e, "Request body failed validation");
            (StatusCode::BAD_REQUEST, axum::Json(validation_response(&e))).into_response()
        })?;

        Ok(ValidatedJson(data))
    }
}
