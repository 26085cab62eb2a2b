// src/db/epi_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::epis::{Epi, LifespanUnit},
};

const EPI_COLUMNS: &str = "id, workspace_id, name, ca, category, protection_type, lifespan, \
                           lifespan_unit, unit_of_measure, application, has_uv_protection, \
                           observations, image_url, created_at, updated_at";

// Campos de um EPI novo. A struct evita uma assinatura com doze argumentos
// posicionais fáceis de trocar.
#[derive(Debug)]
pub struct NewEpi<'a> {
    pub workspace_id: Uuid,
    pub name: &'a str,
    pub ca: Option<&'a str>,
    pub category: &'a str,
    pub protection_type: &'a str,
    pub lifespan: Option<i32>,
    pub lifespan_unit: Option<LifespanUnit>,
    pub unit_of_measure: &'a str,
    pub application: &'a str,
    pub has_uv_protection: bool,
    pub observations: Option<&'a str>,
    pub image_url: Option<&'a str>,
}

// Campos alterados de um EPI; `None` mantém o valor atual
#[derive(Debug, Default)]
pub struct EpiChanges<'a> {
    pub name: Option<&'a str>,
    pub ca: Option<&'a str>,
    pub category: Option<&'a str>,
    pub protection_type: Option<&'a str>,
    pub lifespan: Option<i32>,
    pub lifespan_unit: Option<LifespanUnit>,
    pub unit_of_measure: Option<&'a str>,
    pub application: Option<&'a str>,
    pub has_uv_protection: Option<bool>,
    pub observations: Option<&'a str>,
    pub image_url: Option<&'a str>,
}

#[derive(Clone)]
pub struct EpiRepository {
    pool: PgPool,
}

impl EpiRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_by_workspace(&self, workspace_id: Uuid) -> Result<Vec<Epi>, AppError> {
        let sql = format!(
            "SELECT {EPI_COLUMNS} FROM epis WHERE workspace_id = $1 ORDER BY created_at DESC"
        );

        let epis = sqlx::query_as::<_, Epi>(&sql)
            .bind(workspace_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(epis)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Epi>, AppError> {
        let sql = format!("SELECT {EPI_COLUMNS} FROM epis WHERE id = $1");

        let maybe_epi = sqlx::query_as::<_, Epi>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(maybe_epi)
    }

    pub async fn create(&self, epi: NewEpi<'_>) -> Result<Epi, AppError> {
        let sql = format!(
            r#"
            INSERT INTO epis
                (workspace_id, name, ca, category, protection_type, lifespan, lifespan_unit,
                 unit_of_measure, application, has_uv_protection, observations, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {EPI_COLUMNS}
            "#
        );

        let created = sqlx::query_as::<_, Epi>(&sql)
            .bind(epi.workspace_id)
            .bind(epi.name)
            .bind(epi.ca)
            .bind(epi.category)
            .bind(epi.protection_type)
            .bind(epi.lifespan)
            .bind(epi.lifespan_unit)
            .bind(epi.unit_of_measure)
            .bind(epi.application)
            .bind(epi.has_uv_protection)
            .bind(epi.observations)
            .bind(epi.image_url)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    pub async fn update(&self, id: Uuid, changes: EpiChanges<'_>) -> Result<Epi, AppError> {
        let sql = format!(
            r#"
            UPDATE epis
            SET name = COALESCE($2, name),
                ca = COALESCE($3, ca),
                category = COALESCE($4, category),
                protection_type = COALESCE($5, protection_type),
                lifespan = COALESCE($6, lifespan),
                lifespan_unit = COALESCE($7, lifespan_unit),
                unit_of_measure = COALESCE($8, unit_of_measure),
                application = COALESCE($9, application),
                has_uv_protection = COALESCE($10, has_uv_protection),
                observations = COALESCE($11, observations),
                image_url = COALESCE($12, image_url),
                updated_at = now()
            WHERE id = $1
            RETURNING {EPI_COLUMNS}
            "#
        );

        let updated = sqlx::query_as::<_, Epi>(&sql)
            .bind(id)
            .bind(changes.name)
            .bind(changes.ca)
            .bind(changes.category)
            .bind(changes.protection_type)
            .bind(changes.lifespan)
            .bind(changes.lifespan_unit)
            .bind(changes.unit_of_measure)
            .bind(changes.application)
            .bind(changes.has_uv_protection)
            .bind(changes.observations)
            .bind(changes.image_url)
            .fetch_one(&self.pool)
            .await?;

        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM epis WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
