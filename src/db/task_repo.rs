// src/db/task_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::tasks::{Task, TaskStatus},
};

const TASK_COLUMNS: &str = "id, workspace_id, project_id, assignee_id, name, description, \
                            status, position, due_date, created_at, updated_at";

// Filtros opcionais da listagem de tarefas
#[derive(Debug, Default)]
pub struct TaskFilters {
    pub project_id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<DateTime<Utc>>,
    pub search: Option<String>,
}

#[derive(Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_by_workspace(
        &self,
        workspace_id: Uuid,
        filters: &TaskFilters,
    ) -> Result<Vec<Task>, AppError> {
        let sql = format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE workspace_id = $1
              AND ($2::uuid IS NULL OR project_id = $2)
              AND ($3::uuid IS NULL OR assignee_id = $3)
              AND ($4::task_status IS NULL OR status = $4)
              AND ($5::timestamptz IS NULL OR due_date = $5)
              AND ($6::text IS NULL OR name ILIKE '%' || $6 || '%')
            ORDER BY created_at DESC
            "#
        );

        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(workspace_id)
            .bind(filters.project_id)
            .bind(filters.assignee_id)
            .bind(filters.status)
            .bind(filters.due_date)
            .bind(filters.search.as_deref())
            .fetch_all(&self.pool)
            .await?;

        Ok(tasks)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");

        let maybe_task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(maybe_task)
    }

    pub async fn find_many_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Task>, AppError> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ANY($1)");

        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(tasks)
    }

    // A posição é calculada no próprio INSERT: última posição da coluna
    // (workspace + status) + 1000, começando em 1000.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        workspace_id: Uuid,
        project_id: Uuid,
        assignee_id: Uuid,
        name: &str,
        description: Option<&str>,
        status: TaskStatus,
        due_date: DateTime<Utc>,
    ) -> Result<Task, AppError> {
        let sql = format!(
            r#"
            INSERT INTO tasks
                (workspace_id, project_id, assignee_id, name, description, status, position, due_date)
            VALUES
                ($1, $2, $3, $4, $5, $6,
                 (SELECT COALESCE(MAX(position), 0) + 1000
                  FROM tasks
                  WHERE workspace_id = $1 AND status = $6),
                 $7)
            RETURNING {TASK_COLUMNS}
            "#
        );

        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(workspace_id)
            .bind(project_id)
            .bind(assignee_id)
            .bind(name)
            .bind(description)
            .bind(status)
            .bind(due_date)
            .fetch_one(&self.pool)
            .await?;

        Ok(task)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
        status: Option<TaskStatus>,
        project_id: Option<Uuid>,
        assignee_id: Option<Uuid>,
        due_date: Option<DateTime<Utc>>,
    ) -> Result<Task, AppError> {
        let sql = format!(
            r#"
            UPDATE tasks
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                project_id = COALESCE($5, project_id),
                assignee_id = COALESCE($6, assignee_id),
                due_date = COALESCE($7, due_date),
                updated_at = now()
            WHERE id = $1
            RETURNING {TASK_COLUMNS}
            "#
        );

        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(name)
            .bind(description)
            .bind(status)
            .bind(project_id)
            .bind(assignee_id)
            .bind(due_date)
            .fetch_one(&self.pool)
            .await?;

        Ok(task)
    }

    // Usado pelo bulk-update do kanban, sempre dentro de uma transação
    pub async fn update_position<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: TaskStatus,
        position: i32,
    ) -> Result<Task, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE tasks
            SET status = $2,
                position = $3,
                updated_at = now()
            WHERE id = $1
            RETURNING {TASK_COLUMNS}
            "#
        );

        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(status)
            .bind(position)
            .fetch_one(executor)
            .await?;

        Ok(task)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
