// src/handlers/workspaces.rs

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    handlers::forms,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{normalize, workspaces::Workspace},
};

// ---
// Payload: criação de workspace (multipart)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateWorkspacePayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[serde(deserialize_with = "normalize::trimmed")]
    #[schema(example = "Obra Vila Nova")]
    pub name: String,

    // URL já resolvida; o upload de arquivo chega como parte binária
    #[serde(default, deserialize_with = "normalize::opt_image_flex")]
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateWorkspacePayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[serde(default, deserialize_with = "normalize::opt_trimmed")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "normalize::opt_image_flex")]
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct JoinWorkspacePayload {
    #[validate(length(min = 1, message = "O código de convite é obrigatório."))]
    pub code: String,
}

// GET /api/workspaces
#[utoipa::path(
    get,
    path = "/api/workspaces",
    tag = "Workspaces",
    responses(
        (status = 200, description = "Workspaces dos quais o usuário é membro", body = [Workspace])
    ),
    security(("api_jwt" = []))
)]
pub async fn get_workspaces(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let workspaces = app_state
        .workspace_repo
        .list_for_user(user.id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    let total = workspaces.len();

    Ok(Json(
        json!({ "data": { "documents": workspaces, "total": total } }),
    ))
}

// POST /api/workspaces
#[utoipa::path(
    post,
    path = "/api/workspaces",
    tag = "Workspaces",
    request_body(content = CreateWorkspacePayload, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Workspace criado com o criador como ADMIN", body = Workspace),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_workspace(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let (payload, image) = forms::parse_form::<CreateWorkspacePayload>(multipart)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let staged = match image {
        Some(file) => Some(
            app_state
                .storage
                .stage_image(&file.filename, &file.content_type, file.bytes)
                .await
                .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?,
        ),
        None => None,
    };

    let image_url = staged
        .as_ref()
        .map(|s| s.data_url.as_str())
        .or(payload.image.as_deref());

    let result = app_state
        .workspace_service
        .create_with_owner(&payload.name, image_url, user.id)
        .await;

    match result {
        Ok(workspace) => Ok((StatusCode::CREATED, Json(json!({ "data": workspace })))),
        Err(err) => {
            // O banco falhou depois do upload: remove o arquivo órfão
            if let Some(staged) = staged {
                app_state.storage.discard(&staged.file_id).await;
            }
            Err(err.to_api_error(&locale, &app_state.i18n_store))
        }
    }
}

// GET /api/workspaces/{workspaceId}
#[utoipa::path(
    get,
    path = "/api/workspaces/{workspaceId}",
    tag = "Workspaces",
    params(("workspaceId" = Uuid, Path, description = "ID do workspace")),
    responses(
        (status = 200, description = "Detalhes do workspace", body = Workspace),
        (status = 401, description = "Usuário não é membro"),
        (status = 404, description = "Workspace não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_workspace(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(workspace_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let workspace = app_state
        .workspace_repo
        .find_by_id(workspace_id)
        .await
        .and_then(|w| w.ok_or(AppError::NotFound))
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .access
        .ensure_member_of(&workspace, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(json!({ "data": workspace })))
}

// PATCH /api/workspaces/{workspaceId}
#[utoipa::path(
    patch,
    path = "/api/workspaces/{workspaceId}",
    tag = "Workspaces",
    params(("workspaceId" = Uuid, Path, description = "ID do workspace")),
    request_body(content = UpdateWorkspacePayload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Workspace atualizado", body = Workspace),
        (status = 401, description = "Apenas ADMIN pode alterar o workspace"),
        (status = 404, description = "Workspace não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_workspace(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(workspace_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let workspace = app_state
        .workspace_repo
        .find_by_id(workspace_id)
        .await
        .and_then(|w| w.ok_or(AppError::NotFound))
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .access
        .ensure_admin_of(&workspace, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let (payload, image) = forms::parse_form::<UpdateWorkspacePayload>(multipart)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let staged = match image {
        Some(file) => Some(
            app_state
                .storage
                .stage_image(&file.filename, &file.content_type, file.bytes)
                .await
                .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?,
        ),
        None => None,
    };

    let image_url = staged
        .as_ref()
        .map(|s| s.data_url.as_str())
        .or(payload.image.as_deref());

    let result = app_state
        .workspace_repo
        .update(workspace_id, payload.name.as_deref(), image_url)
        .await;

    match result {
        Ok(updated) => Ok(Json(json!({ "data": updated }))),
        Err(err) => {
            if let Some(staged) = staged {
                app_state.storage.discard(&staged.file_id).await;
            }
            Err(err.to_api_error(&locale, &app_state.i18n_store))
        }
    }
}

// DELETE /api/workspaces/{workspaceId}
#[utoipa::path(
    delete,
    path = "/api/workspaces/{workspaceId}",
    tag = "Workspaces",
    params(("workspaceId" = Uuid, Path, description = "ID do workspace")),
    responses(
        (status = 200, description = "Workspace excluído (membros e registros ficam órfãos)"),
        (status = 401, description = "Apenas ADMIN pode excluir o workspace"),
        (status = 404, description = "Workspace não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_workspace(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(workspace_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let workspace = app_state
        .workspace_repo
        .find_by_id(workspace_id)
        .await
        .and_then(|w| w.ok_or(AppError::NotFound))
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .access
        .ensure_admin_of(&workspace, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .workspace_repo
        .delete(workspace_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(json!({ "data": { "id": workspace_id } })))
}

// POST /api/workspaces/{workspaceId}/join
#[utoipa::path(
    post,
    path = "/api/workspaces/{workspaceId}/join",
    tag = "Workspaces",
    params(("workspaceId" = Uuid, Path, description = "ID do workspace")),
    request_body = JoinWorkspacePayload,
    responses(
        (status = 200, description = "Usuário entrou no workspace como MEMBER", body = Workspace),
        (status = 400, description = "Código inválido ou usuário já é membro"),
        (status = 404, description = "Workspace não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn join_workspace(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(workspace_id): Path<Uuid>,
    Json(payload): Json<JoinWorkspacePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let workspace = app_state
        .workspace_repo
        .find_by_id(workspace_id)
        .await
        .and_then(|w| w.ok_or(AppError::NotFound))
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let joined = app_state
        .workspace_service
        .join(&workspace, user.id, &payload.code)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(json!({ "data": joined })))
}

// POST /api/workspaces/{workspaceId}/reset-invite-code
#[utoipa::path(
    post,
    path = "/api/workspaces/{workspaceId}/reset-invite-code",
    tag = "Workspaces",
    params(("workspaceId" = Uuid, Path, description = "ID do workspace")),
    responses(
        (status = 200, description = "Novo código de convite gerado", body = Workspace),
        (status = 401, description = "Apenas ADMIN pode trocar o código"),
        (status = 404, description = "Workspace não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn reset_invite_code(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(workspace_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let workspace = app_state
        .workspace_repo
        .find_by_id(workspace_id)
        .await
        .and_then(|w| w.ok_or(AppError::NotFound))
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .access
        .ensure_admin_of(&workspace, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let updated = app_state
        .workspace_service
        .reset_invite_code(workspace_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(json!({ "data": updated })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_de_criacao_exige_nome_nao_vazio() {
        let payload: CreateWorkspacePayload =
            serde_json::from_value(json!({ "name": "   " })).unwrap();

        // O trim acontece na desserialização, a validação vê a string vazia
        assert_eq!(payload.name, "");
        assert!(payload.validate().is_err());
    }

    #[test]
    fn imagem_como_string_vazia_e_descartada() {
        let payload: CreateWorkspacePayload =
            serde_json::from_value(json!({ "name": "Obra", "image": "" })).unwrap();

        assert_eq!(payload.image, None);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn atualizacao_sem_campos_e_aceita() {
        let payload: UpdateWorkspacePayload = serde_json::from_value(json!({})).unwrap();

        assert_eq!(payload.name, None);
        assert_eq!(payload.image, None);
        assert!(payload.validate().is_ok());
    }
}
