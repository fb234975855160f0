use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use observability::Outcome;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum TodoError {
    #[error("{0}")]
    Validation(String),

    #[error("Todo with title '{0}' already exists")]
    Conflict(String),

    #[error("Todo not found: {0}")]
    NotFound(i64),

    #[error("Database error: {0}")]
    Database(String),
}

pub type TodoResult<T> = Result<T, TodoError>;

impl TodoError {
    /// Label used by the `todo_operations_total` metric.
    pub fn outcome(&self) -> Outcome {
        match self {
            TodoError::Validation(_) => Outcome::Validation,
            TodoError::Conflict(_) => Outcome::Conflict,
            TodoError::NotFound(_) => Outcome::NotFound,
            TodoError::Database(_) => Outcome::Database,
        }
    }
}

impl From<sea_orm::DbErr> for TodoError {
    fn from(err: sea_orm::DbErr) -> Self {
        TodoError::Database(err.to_string())
    }
}

/// Collapses field errors into their messages, e.g. `"title required"`.
impl From<ValidationErrors> for TodoError {
    fn from(errors: ValidationErrors) -> Self {
        let messages: Vec<String> = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
            })
            .collect();

        TodoError::Validation(messages.join(", "))
    }
}

impl From<TodoError> for AppError {
    fn from(err: TodoError) -> Self {
        match err {
            TodoError::Validation(msg) => AppError::BadRequest(msg),
            TodoError::Conflict(title) => {
                AppError::Conflict(format!("Todo with title '{}' already exists", title))
            }
            TodoError::NotFound(id) => AppError::NotFound(format!("Todo {} not found", id)),
            TodoError::Database(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for TodoError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
