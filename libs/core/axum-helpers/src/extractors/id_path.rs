use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
    response::{IntoResponse, Response},
};

/// Positive `i64` path parameter, such as the `{id}` in `/todos/{id}`.
///
/// ```ignore
/// async fn get_todo(IdPath(id): IdPath) -> String {
///     format!("todo {id}")
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdPath(pub i64);

impl IdPath {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        match raw.parse::<i64>() {
            Ok(id) if id > 0 => Ok(IdPath(id)),
            _ => Err(AppError::InvalidId(format!(
                "Invalid id '{}': expected a positive integer",
                raw
            ))),
        }
    }
}

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| e.into_response())?;

        IdPath::parse(&raw).map_err(IntoResponse::into_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_positive_integers() {
        assert_eq!(IdPath::parse("1").unwrap(), IdPath(1));
        assert_eq!(IdPath::parse("9007199254740993").unwrap().0, 9_007_199_254_740_993);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for raw in ["", "abc", "0", "-3", "1.5", "99999999999999999999"] {
            assert!(
                matches!(IdPath::parse(raw), Err(AppError::InvalidId(_))),
                "{raw:?} should be rejected"
            );
        }
    }
}
