//! Shared application state.

/// Cloned per handler; the connection is an Arc-backed pool.
#[derive(Clone)]
pub struct AppState {
    /// Loaded from environment variables at startup
    pub config: crate::config::Config,
    /// PostgreSQL connection pool
    pub db: database::postgres::DatabaseConnection,
}
