// src/db/estoque_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::estoques::{Estoque, EstoqueType},
};

const ESTOQUE_COLUMNS: &str = "id, workspace_id, name, type, location, responsible, capacity, \
                               observations, created_at, updated_at";

#[derive(Clone)]
pub struct EstoqueRepository {
    pool: PgPool,
}

impl EstoqueRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_by_workspace(&self, workspace_id: Uuid) -> Result<Vec<Estoque>, AppError> {
        let sql = format!(
            "SELECT {ESTOQUE_COLUMNS} FROM estoques WHERE workspace_id = $1 ORDER BY created_at DESC"
        );

        let estoques = sqlx::query_as::<_, Estoque>(&sql)
            .bind(workspace_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(estoques)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Estoque>, AppError> {
        let sql = format!("SELECT {ESTOQUE_COLUMNS} FROM estoques WHERE id = $1");

        let maybe_estoque = sqlx::query_as::<_, Estoque>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(maybe_estoque)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        workspace_id: Uuid,
        name: &str,
        estoque_type: EstoqueType,
        location: &str,
        responsible: Option<&str>,
        capacity: Option<i32>,
        observations: Option<&str>,
    ) -> Result<Estoque, AppError> {
        let sql = format!(
            r#"
            INSERT INTO estoques
                (workspace_id, name, type, location, responsible, capacity, observations)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ESTOQUE_COLUMNS}
            "#
        );

        let estoque = sqlx::query_as::<_, Estoque>(&sql)
            .bind(workspace_id)
            .bind(name)
            .bind(estoque_type)
            .bind(location)
            .bind(responsible)
            .bind(capacity)
            .bind(observations)
            .fetch_one(&self.pool)
            .await?;

        Ok(estoque)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        estoque_type: Option<EstoqueType>,
        location: Option<&str>,
        responsible: Option<&str>,
        capacity: Option<i32>,
        observations: Option<&str>,
    ) -> Result<Estoque, AppError> {
        let sql = format!(
            r#"
            UPDATE estoques
            SET name = COALESCE($2, name),
                type = COALESCE($3, type),
                location = COALESCE($4, location),
                responsible = COALESCE($5, responsible),
                capacity = COALESCE($6, capacity),
                observations = COALESCE($7, observations),
                updated_at = now()
            WHERE id = $1
            RETURNING {ESTOQUE_COLUMNS}
            "#
        );

        let estoque = sqlx::query_as::<_, Estoque>(&sql)
            .bind(id)
            .bind(name)
            .bind(estoque_type)
            .bind(location)
            .bind(responsible)
            .bind(capacity)
            .bind(observations)
            .fetch_one(&self.pool)
            .await?;

        Ok(estoque)
    }

    // Hard delete do local. As movimentações que o referenciam são mantidas
    // intactas no livro-razão.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM estoques WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
