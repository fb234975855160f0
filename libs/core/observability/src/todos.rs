use metrics::{counter, histogram};

/// Result classification for a todo operation, used as the `outcome` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Validation,
    Conflict,
    NotFound,
    Database,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Ok => "ok",
            Outcome::Validation => "validation",
            Outcome::Conflict => "conflict",
            Outcome::NotFound => "not_found",
            Outcome::Database => "database",
        }
    }
}

pub struct TodoMetrics;

impl TodoMetrics {
    /// Count one service call and record how long it took.
    pub fn record(operation: &'static str, outcome: Outcome, duration_secs: f64) {
        counter!(
            "todo_operations_total",
            "operation" => operation,
            "outcome" => outcome.as_str()
        )
        .increment(1);

        histogram!(
            "todo_operation_duration_seconds",
            "operation" => operation
        )
        .record(duration_secs);
    }
}
