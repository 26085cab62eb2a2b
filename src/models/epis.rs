// src/models/epis.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "lifespan_unit", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LifespanUnit {
    Dias,
    Meses,
    Anos,
}

// Equipamento de Proteção Individual do catálogo do workspace.
// category / protectionType / unitOfMeasure / application são texto livre:
// o vocabulário ("Cabeça", "Impacto", "Par", "Obra"...) vem da UI, a API
// exige apenas não-vazio.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Epi {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub name: String,
    // Certificado de Aprovação
    pub ca: Option<String>,
    pub category: String,
    pub protection_type: String,
    pub lifespan: Option<i32>,
    pub lifespan_unit: Option<LifespanUnit>,
    pub unit_of_measure: String,
    pub application: String,
    pub has_uv_protection: bool,
    pub observations: Option<String>,
    // Data-URL (base64) gerada no upload, ou URL informada diretamente
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
