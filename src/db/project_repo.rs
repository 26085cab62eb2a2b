// src/db/project_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, models::projects::Project};

#[derive(Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_by_workspace(&self, workspace_id: Uuid) -> Result<Vec<Project>, AppError> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, workspace_id, name, image_url, created_at, updated_at
            FROM projects
            WHERE workspace_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(projects)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Project>, AppError> {
        let maybe_project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, workspace_id, name, image_url, created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(maybe_project)
    }

    pub async fn create(
        &self,
        workspace_id: Uuid,
        name: &str,
        image_url: Option<&str>,
    ) -> Result<Project, AppError> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (workspace_id, name, image_url)
            VALUES ($1, $2, $3)
            RETURNING id, workspace_id, name, image_url, created_at, updated_at
            "#,
        )
        .bind(workspace_id)
        .bind(name)
        .bind(image_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(project)
    }

    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<Project, AppError> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET name = COALESCE($2, name),
                image_url = COALESCE($3, image_url),
                updated_at = now()
            WHERE id = $1
            RETURNING id, workspace_id, name, image_url, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(image_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(project)
    }

    // Hard delete; as tarefas do projeto não são excluídas em cascata
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
