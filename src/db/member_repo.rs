// src/db/member_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::members::{Member, MemberRole, MemberWithUser},
};

#[derive(Clone)]
pub struct MemberRepository {
    pool: PgPool,
}

impl MemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // O vínculo (workspace, usuário), se existir. É a consulta do guard de
    // autorização, então roda em toda rota de recurso.
    pub async fn find_membership(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Member>, AppError> {
        let maybe_member = sqlx::query_as::<_, Member>(
            r#"
            SELECT id, workspace_id, user_id, role, created_at, updated_at
            FROM members
            WHERE workspace_id = $1 AND user_id = $2
            "#,
        )
        .bind(workspace_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(maybe_member)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Member>, AppError> {
        let maybe_member = sqlx::query_as::<_, Member>(
            r#"
            SELECT id, workspace_id, user_id, role, created_at, updated_at
            FROM members
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(maybe_member)
    }

    // Listagem com nome e e-mail do usuário
    pub async fn list_with_users(
        &self,
        workspace_id: Uuid,
    ) -> Result<Vec<MemberWithUser>, AppError> {
        let members = sqlx::query_as::<_, MemberWithUser>(
            r#"
            SELECT m.id, m.workspace_id, m.user_id, m.role,
                   u.name, u.email,
                   m.created_at, m.updated_at
            FROM members m
            INNER JOIN users u ON u.id = m.user_id
            WHERE m.workspace_id = $1
            ORDER BY m.created_at DESC
            "#,
        )
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }

    pub async fn count_in_workspace(&self, workspace_id: Uuid) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM members WHERE workspace_id = $1",
        )
        .bind(workspace_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        workspace_id: Uuid,
        user_id: Uuid,
        role: MemberRole,
    ) -> Result<Member, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let member = sqlx::query_as::<_, Member>(
            r#"
            INSERT INTO members (workspace_id, user_id, role)
            VALUES ($1, $2, $3)
            RETURNING id, workspace_id, user_id, role, created_at, updated_at
            "#,
        )
        .bind(workspace_id)
        .bind(user_id)
        .bind(role)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                // UNIQUE (workspace_id, user_id)
                if db_err.is_unique_violation() {
                    return AppError::AlreadyMember;
                }
            }
            e.into()
        })?;

        Ok(member)
    }

    pub async fn update_role(&self, id: Uuid, role: MemberRole) -> Result<Member, AppError> {
        let member = sqlx::query_as::<_, Member>(
            r#"
            UPDATE members
            SET role = $2,
                updated_at = now()
            WHERE id = $1
            RETURNING id, workspace_id, user_id, role, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(role)
        .fetch_one(&self.pool)
        .await?;

        Ok(member)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
