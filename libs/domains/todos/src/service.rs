use observability::{Outcome, TodoMetrics};
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;
use validator::Validate;

use crate::error::{TodoError, TodoResult};
use crate::models::{CreateTodo, Todo, UpdateTodo};
use crate::repository::TodoRepository;

/// Business rules for todos: validation, title uniqueness and existence checks.
///
/// Nothing is retried here; the first failure is returned to the caller.
#[derive(Clone)]
pub struct TodoService<R: TodoRepository> {
    repository: Arc<R>,
}

fn observe<T>(operation: &'static str, started: Instant, result: TodoResult<T>) -> TodoResult<T> {
    let outcome = match &result {
        Ok(_) => Outcome::Ok,
        Err(e) => e.outcome(),
    };
    TodoMetrics::record(operation, outcome, started.elapsed().as_secs_f64());
    result
}

impl<R: TodoRepository> TodoService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    #[instrument(skip(self))]
    pub async fn list_todos(&self) -> TodoResult<Vec<Todo>> {
        let started = Instant::now();
        let result = self.repository.find_all().await;
        observe("list", started, result)
    }

    /// Create a todo after checking its title is free.
    ///
    /// The check-then-insert is not atomic; a concurrent duplicate is caught by
    /// the store and still surfaces as [`TodoError::Conflict`].
    #[instrument(skip(self, input), fields(todo_title = %input.title))]
    pub async fn create_todo(&self, input: CreateTodo) -> TodoResult<Todo> {
        let started = Instant::now();
        let result = self.create_checked(input).await;
        observe("create", started, result)
    }

    async fn create_checked(&self, input: CreateTodo) -> TodoResult<Todo> {
        input.validate()?;

        if self.repository.find_by_title(&input.title).await?.is_some() {
            tracing::debug!("title already taken");
            return Err(TodoError::Conflict(input.title));
        }

        self.repository.insert(input).await
    }

    #[instrument(skip(self), fields(todo_id = id))]
    pub async fn get_todo(&self, id: i64) -> TodoResult<Todo> {
        let started = Instant::now();
        let result = self.find_existing(id).await;
        observe("get", started, result)
    }

    async fn find_existing(&self, id: i64) -> TodoResult<Todo> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(TodoError::NotFound(id))
    }

    /// Apply a partial update. The title is not re-checked for uniqueness.
    #[instrument(skip(self, input), fields(todo_id = id))]
    pub async fn update_todo(&self, id: i64, input: UpdateTodo) -> TodoResult<Todo> {
        let started = Instant::now();
        let result = self.update_checked(id, input).await;
        observe("update", started, result)
    }

    async fn update_checked(&self, id: i64, input: UpdateTodo) -> TodoResult<Todo> {
        input.validate()?;
        self.find_existing(id).await?;
        self.repository.update(id, input).await
    }

    #[instrument(skip(self), fields(todo_id = id))]
    pub async fn delete_todo(&self, id: i64) -> TodoResult<()> {
        let started = Instant::now();
        let result = self.delete_checked(id).await;
        observe("delete", started, result)
    }

    async fn delete_checked(&self, id: i64) -> TodoResult<()> {
        self.find_existing(id).await?;

        // Someone else may have deleted it since the check
        if !self.repository.delete(id).await? {
            return Err(TodoError::NotFound(id));
        }

        Ok(())
    }
}
