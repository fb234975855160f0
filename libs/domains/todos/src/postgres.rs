use async_trait::async_trait;
use chrono::Utc;
use database::BaseRepository;
use sea_orm::ActiveValue::{Set, Unchanged};
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, SqlErr};

use crate::{
    entity,
    error::{TodoError, TodoResult},
    models::{CreateTodo, Todo, UpdateTodo},
    repository::TodoRepository,
};

pub struct PgTodoRepository {
    base: BaseRepository<entity::Entity>,
}

impl PgTodoRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }
}

/// Map a failed write. Violations of `idx_todos_title_unique` become `Conflict`.
fn map_write_error(err: DbErr, title: Option<&str>) -> TodoError {
    match (err.sql_err(), title) {
        (Some(SqlErr::UniqueConstraintViolation(_)), Some(title)) => {
            TodoError::Conflict(title.to_string())
        }
        _ => err.into(),
    }
}

#[async_trait]
impl TodoRepository for PgTodoRepository {
    async fn find_all(&self) -> TodoResult<Vec<Todo>> {
        let models = entity::Entity::find()
            .order_by_asc(entity::Column::Id)
            .all(self.base.db())
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_by_id(&self, id: i64) -> TodoResult<Option<Todo>> {
        let model = self.base.find_by_id(id).await?;
        Ok(model.map(Into::into))
    }

    async fn find_by_title(&self, title: &str) -> TodoResult<Option<Todo>> {
        let model = entity::Entity::find()
            .filter(entity::Column::Title.eq(title))
            .one(self.base.db())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn insert(&self, input: CreateTodo) -> TodoResult<Todo> {
        let title = input.title.clone();
        let active_model: entity::ActiveModel = input.into();

        let model = self
            .base
            .insert(active_model)
            .await
            .map_err(|e| map_write_error(e, Some(&title)))?;

        tracing::info!(todo_id = model.id, "Created todo");
        Ok(model.into())
    }

    /// `updated_at` is always written, so an update with no fields still
    /// touches the row.
    async fn update(&self, id: i64, input: UpdateTodo) -> TodoResult<Todo> {
        let mut active_model = entity::ActiveModel {
            id: Unchanged(id),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };
        if let Some(title) = input.title.clone() {
            active_model.title = Set(title);
        }
        if let Some(description) = input.description {
            active_model.description = Set(Some(description));
        }
        if let Some(completed) = input.completed {
            active_model.completed = Set(completed);
        }

        let model = self
            .base
            .update(active_model)
            .await
            .map_err(|e| match e {
                DbErr::RecordNotUpdated => TodoError::NotFound(id),
                e => map_write_error(e, input.title.as_deref()),
            })?;

        tracing::info!(todo_id = id, "Updated todo");
        Ok(model.into())
    }

    async fn delete(&self, id: i64) -> TodoResult<bool> {
        let rows_affected = self.base.delete_by_id(id).await?;

        if rows_affected > 0 {
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
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn model(id: i64, title: &str, completed: bool) -> entity::Model {
        let now = Utc::now().into();
        entity::Model {
            id,
            title: title.to_string(),
            description: None,
            completed,
            created_at: now,
            updated_at: now,
        }
    }

    fn repo(db: MockDatabase) -> PgTodoRepository {
        PgTodoRepository::new(db.into_connection())
    }

    #[tokio::test]
    async fn test_find_all_maps_models() {
        let repo = repo(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![model(1, "a", false), model(2, "b", true)]]),
        );

        let todos = repo.find_all().await.unwrap();
        assert_eq!(todos.len(), 2);
        assert_eq!(todos[0].id, 1);
        assert!(todos[1].completed);
    }

    #[tokio::test]
    async fn test_find_by_title_none() {
        let repo = repo(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<entity::Model>::new()]),
        );

        assert!(repo.find_by_title("Buy milk").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_returns_stored_todo() {
        let repo = repo(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![model(10, "Buy milk", false)]]),
        );

        let todo = repo.insert(CreateTodo::new("Buy milk")).await.unwrap();
        assert_eq!(todo.id, 10);
        assert_eq!(todo.title, "Buy milk");
    }

    #[tokio::test]
    async fn test_update_with_no_matching_row_is_not_found() {
        let repo = repo(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<entity::Model>::new()]),
        );

        let result = repo
            .update(
                5,
                UpdateTodo {
                    completed: Some(true),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(TodoError::NotFound(5))));
    }

    #[tokio::test]
    async fn test_update_writes_updated_at() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model(5, "a", true)]])
            .into_connection();
        let repo = PgTodoRepository::new(db.clone());

        repo.update(
            5,
            UpdateTodo {
                completed: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let log = db.into_transaction_log();
        let sql = &log[0].statements()[0].sql;
        assert!(sql.starts_with("UPDATE"));
        assert!(sql.contains(r#""updated_at""#));
        assert!(sql.contains(r#""completed""#));
        assert!(!sql.contains(r#""title""#));
    }

    #[tokio::test]
    async fn test_delete_reports_rows_affected() {
        let repo = repo(MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
        ]));

        assert!(repo.delete(3).await.unwrap());
        assert!(!repo.delete(3).await.unwrap());
    }

    #[tokio::test]
    async fn test_query_failure_is_database_error() {
        let repo = repo(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_errors([DbErr::Custom("connection reset".to_string())]),
        );

        let result = repo.find_by_id(1).await;
        assert!(matches!(result, Err(TodoError::Database(_))));
    }

    #[test]
    fn test_non_unique_write_error_is_database() {
        let err = map_write_error(DbErr::Custom("disk full".to_string()), Some("x"));
        assert!(matches!(err, TodoError::Database(_)));
    }
}
