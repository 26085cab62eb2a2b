// src/models/workspaces.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// Workspace: a unidade de isolamento multi-tenant. Todo recurso da API
// pertence a exatamente um workspace.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: Uuid,
    pub name: String,
    // Usuário que criou o workspace (vira o primeiro ADMIN)
    pub user_id: Uuid,
    pub image_url: Option<String>,
    // Código de convite de 10 caracteres alfanuméricos
    pub invite_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
