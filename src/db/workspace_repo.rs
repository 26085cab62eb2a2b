// src/db/workspace_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::workspaces::Workspace};

#[derive(Clone)]
pub struct WorkspaceRepository {
    pool: PgPool,
}

impl WorkspaceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Workspaces em que o usuário é membro, mais recentes primeiro
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Workspace>, AppError> {
        let workspaces = sqlx::query_as::<_, Workspace>(
            r#"
            SELECT w.id, w.name, w.user_id, w.image_url, w.invite_code,
                   w.created_at, w.updated_at
            FROM workspaces w
            INNER JOIN members m ON m.workspace_id = w.id
            WHERE m.user_id = $1
            ORDER BY w.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(workspaces)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Workspace>, AppError> {
        let maybe_workspace = sqlx::query_as::<_, Workspace>(
            r#"
            SELECT id, name, user_id, image_url, invite_code, created_at, updated_at
            FROM workspaces
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(maybe_workspace)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        name: &str,
        user_id: Uuid,
        image_url: Option<&str>,
        invite_code: &str,
    ) -> Result<Workspace, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let workspace = sqlx::query_as::<_, Workspace>(
            r#"
            INSERT INTO workspaces (name, user_id, image_url, invite_code)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, user_id, image_url, invite_code, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(user_id)
        .bind(image_url)
        .bind(invite_code)
        .fetch_one(executor)
        .await?;

        Ok(workspace)
    }

    // Atualização parcial: campo ausente mantém o valor atual
    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<Workspace, AppError> {
        let workspace = sqlx::query_as::<_, Workspace>(
            r#"
            UPDATE workspaces
            SET name = COALESCE($2, name),
                image_url = COALESCE($3, image_url),
                updated_at = now()
            WHERE id = $1
            RETURNING id, name, user_id, image_url, invite_code, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(image_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(workspace)
    }

    pub async fn reset_invite_code(
        &self,
        id: Uuid,
        invite_code: &str,
    ) -> Result<Workspace, AppError> {
        let workspace = sqlx::query_as::<_, Workspace>(
            r#"
            UPDATE workspaces
            SET invite_code = $2,
                updated_at = now()
            WHERE id = $1
            RETURNING id, name, user_id, image_url, invite_code, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(invite_code)
        .fetch_one(&self.pool)
        .await?;

        Ok(workspace)
    }

    // Hard delete. Membros, projetos e registros de inventário do workspace
    // NÃO são excluídos em cascata.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM workspaces WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
