//! Shared test infrastructure for the todo workspace.
//!
//! - `TestDatabase`: throwaway PostgreSQL container with migrations applied
//!   (feature `postgres`, on by default)
//! - [`TestDataBuilder`]: deterministic titles so parallel tests never collide
//! - [`assertions`]: small helpers with readable failure messages
//!
//! ```rust,no_run
//! use test_utils::{TestDatabase, TestDataBuilder};
//!
//! #[tokio::test]
//! async fn creates_a_todo() {
//!     let db = TestDatabase::new().await;
//!     let builder = TestDataBuilder::from_test_name("creates_a_todo");
//!     let title = builder.title("todo", "main");
//! }
//! ```

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::TestDatabase;

/// Deterministic test data seeded from the test name.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// A title unique to this test, e.g. `test-todo-1234-main`.
    pub fn title(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }

    /// An id that is valid but will not exist in a fresh database.
    pub fn missing_id(&self) -> i64 {
        (self.seed % 1_000_000) as i64 + 1_000_000_000
    }
}

pub mod assertions {
    use std::fmt::Debug;

    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }

    /// Unwrap an `Err`, failing with the `Ok` value when there isn't one.
    pub fn assert_err<T: Debug, E>(result: Result<T, E>, context: &str) -> E {
        match result {
            Ok(value) => panic!("{}: expected Err, got Ok({:?})", context, value),
            Err(e) => e,
        }
    }
}
