use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

use crate::error::{TodoError, TodoResult};
use crate::models::{CreateTodo, Todo, UpdateTodo};

/// Persistence operations for todos.
///
/// Implementations do not enforce business rules; title uniqueness is checked
/// by the service. A store-level unique violation is reported as
/// [`TodoError::Conflict`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// All todos, in store order
    async fn find_all(&self) -> TodoResult<Vec<Todo>>;

    async fn find_by_id(&self, id: i64) -> TodoResult<Option<Todo>>;

    /// Exact, case-sensitive title match
    async fn find_by_title(&self, title: &str) -> TodoResult<Option<Todo>>;

    /// Insert a todo, assigning its id and timestamps
    async fn insert(&self, input: CreateTodo) -> TodoResult<Todo>;

    /// Apply the present fields and refresh `updated_at`.
    ///
    /// Returns [`TodoError::NotFound`] when no row has this id.
    async fn update(&self, id: i64, input: UpdateTodo) -> TodoResult<Todo>;

    /// Returns `false` when no row was removed
    async fn delete(&self, id: i64) -> TodoResult<bool>;
}

/// In-memory implementation of TodoRepository (for development/testing)
#[derive(Debug, Clone)]
pub struct InMemoryTodoRepository {
    todos: Arc<RwLock<BTreeMap<i64, Todo>>>,
    next_id: Arc<AtomicI64>,
}

impl Default for InMemoryTodoRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTodoRepository {
    pub fn new() -> Self {
        Self {
            todos: Arc::new(RwLock::new(BTreeMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

fn title_taken(todos: &BTreeMap<i64, Todo>, title: &str, except: Option<i64>) -> bool {
    todos
        .values()
        .any(|t| t.title == title && Some(t.id) != except)
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    async fn find_all(&self) -> TodoResult<Vec<Todo>> {
        let todos = self.todos.read().await;
        Ok(todos.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> TodoResult<Option<Todo>> {
        let todos = self.todos.read().await;
        Ok(todos.get(&id).cloned())
    }

    async fn find_by_title(&self, title: &str) -> TodoResult<Option<Todo>> {
        let todos = self.todos.read().await;
        Ok(todos.values().find(|t| t.title == title).cloned())
    }

    async fn insert(&self, input: CreateTodo) -> TodoResult<Todo> {
        let mut todos = self.todos.write().await;

        // Mirrors the unique index on todos.title
        if title_taken(&todos, &input.title, None) {
            return Err(TodoError::Conflict(input.title));
        }

        let now = Utc::now();
        let todo = Todo {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            title: input.title,
            description: input.description,
            completed: input.completed,
            created_at: now,
            updated_at: now,
        };
        todos.insert(todo.id, todo.clone());

        tracing::info!(todo_id = todo.id, "Created todo");
        Ok(todo)
    }

    async fn update(&self, id: i64, input: UpdateTodo) -> TodoResult<Todo> {
        let mut todos = self.todos.write().await;

        if let Some(title) = input.title.as_deref() {
            if title_taken(&todos, title, Some(id)) {
                return Err(TodoError::Conflict(title.to_string()));
            }
        }

        let todo = todos.get_mut(&id).ok_or(TodoError::NotFound(id))?;
        input.apply_to(todo);
        todo.updated_at = Utc::now();

        tracing::info!(todo_id = id, "Updated todo");
        Ok(todo.clone())
    }

    async fn delete(&self, id: i64) -> TodoResult<bool> {
        let mut todos = self.todos.write().await;

        if todos.remove(&id).is_some() {
            tracing::info!(todo_id = id, "Deleted todo");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let repo = InMemoryTodoRepository::new();

        let a = repo.insert(CreateTodo::new("a")).await.unwrap();
        let b = repo.insert(CreateTodo::new("b")).await.unwrap();

        assert!(b.id > a.id);
        assert_eq!(a.created_at, a.updated_at);
        assert!(!a.completed);
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let repo = InMemoryTodoRepository::new();

        let first = repo.insert(CreateTodo::new("first")).await.unwrap();
        assert!(repo.delete(first.id).await.unwrap());

        let second = repo.insert(CreateTodo::new("second")).await.unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_find_by_title_is_case_sensitive() {
        let repo = InMemoryTodoRepository::new();
        repo.insert(CreateTodo::new("Buy milk")).await.unwrap();

        assert!(repo.find_by_title("Buy milk").await.unwrap().is_some());
        assert!(repo.find_by_title("buy milk").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_duplicate_title_conflicts() {
        let repo = InMemoryTodoRepository::new();
        repo.insert(CreateTodo::new("Buy milk")).await.unwrap();

        let result = repo.insert(CreateTodo::new("Buy milk")).await;
        assert!(matches!(result, Err(TodoError::Conflict(_))));
        assert_eq!(repo.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_merges_present_fields() {
        let repo = InMemoryTodoRepository::new();
        let created = repo
            .insert(CreateTodo {
                title: "Buy milk".to_string(),
                description: Some("2 litres".to_string()),
                completed: false,
            })
            .await
            .unwrap();

        let updated = repo
            .update(
                created.id,
                UpdateTodo {
                    completed: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(updated.completed);
        assert_eq!(updated.title, created.title);
        assert_eq!(updated.description, created.description);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let repo = InMemoryTodoRepository::new();

        let result = repo.update(42, UpdateTodo::default()).await;
        assert!(matches!(result, Err(TodoError::NotFound(42))));
    }

    #[tokio::test]
    async fn test_update_keeping_own_title_is_allowed() {
        let repo = InMemoryTodoRepository::new();
        let created = repo.insert(CreateTodo::new("same")).await.unwrap();

        let result = repo
            .update(
                created.id,
                UpdateTodo {
                    title: Some("same".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_update_to_another_title_conflicts() {
        let repo = InMemoryTodoRepository::new();
        repo.insert(CreateTodo::new("Buy milk")).await.unwrap();
        let other = repo.insert(CreateTodo::new("Walk dog")).await.unwrap();

        let result = repo
            .update(
                other.id,
                UpdateTodo {
                    title: Some("Buy milk".to_string()),
                    completed: Some(true),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(TodoError::Conflict(ref t)) if t == "Buy milk"));

        let unchanged = repo.find_by_id(other.id).await.unwrap().unwrap();
        assert_eq!(unchanged, other);
    }

    #[tokio::test]
    async fn test_delete_missing_returns_false() {
        let repo = InMemoryTodoRepository::new();
        assert!(!repo.delete(1).await.unwrap());
    }

    #[tokio::test]
    async fn test_find_all_orders_by_id() {
        let repo = InMemoryTodoRepository::new();
        for title in ["c", "a", "b"] {
            repo.insert(CreateTodo::new(title)).await.unwrap();
        }

        let titles: Vec<String> = repo
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["c", "a", "b"]);
    }
}
