// src/handlers/projects.rs

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
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
    models::{normalize, projects::Project},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectsQuery {
    pub workspace_id: Uuid,
}

// ---
// Payload: criação de projeto (multipart)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[serde(deserialize_with = "normalize::trimmed")]
    #[schema(example = "Fundação Bloco B")]
    pub name: String,

    pub workspace_id: Uuid,

    #[serde(default, deserialize_with = "normalize::opt_image_flex")]
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProjectPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[serde(default, deserialize_with = "normalize::opt_trimmed")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "normalize::opt_image_flex")]
    pub image: Option<String>,
}

// GET /api/projects?workspaceId=
#[utoipa::path(
    get,
    path = "/api/projects",
    tag = "Projetos",
    params(("workspaceId" = Uuid, Query, description = "ID do workspace")),
    responses(
        (status = 200, description = "Projetos do workspace", body = [Project]),
        (status = 401, description = "Usuário não é membro do workspace")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_projects(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<ProjectsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .access
        .require_member(query.workspace_id, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let projects = app_state
        .project_repo
        .list_by_workspace(query.workspace_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let total = projects.len();

    Ok(Json(
        json!({ "data": { "documents": projects, "total": total } }),
    ))
}

// POST /api/projects
#[utoipa::path(
    post,
    path = "/api/projects",
    tag = "Projetos",
    request_body(content = CreateProjectPayload, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Projeto criado", body = Project),
        (status = 400, description = "Dados inválidos"),
        (status = 401, description = "Usuário não é membro do workspace")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_project(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let (payload, image) = forms::parse_form::<CreateProjectPayload>(multipart)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .access
        .require_member(payload.workspace_id, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

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
        .project_repo
        .create(payload.workspace_id, &payload.name, image_url)
        .await;

    match result {
        Ok(project) => Ok((StatusCode::CREATED, Json(json!({ "data": project })))),
        Err(err) => {
            if let Some(staged) = staged {
                app_state.storage.discard(&staged.file_id).await;
            }
            Err(err.to_api_error(&locale, &app_state.i18n_store))
        }
    }
}

// GET /api/projects/{projectId}
#[utoipa::path(
    get,
    path = "/api/projects/{projectId}",
    tag = "Projetos",
    params(("projectId" = Uuid, Path, description = "ID do projeto")),
    responses(
        (status = 200, description = "Detalhes do projeto", body = Project),
        (status = 401, description = "Usuário não é membro do workspace"),
        (status = 404, description = "Projeto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_project(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(project_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let project = app_state
        .project_repo
        .find_by_id(project_id)
        .await
        .and_then(|p| p.ok_or(AppError::NotFound))
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .access
        .ensure_member_of(&project, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(json!({ "data": project })))
}

// PATCH /api/projects/{projectId}
#[utoipa::path(
    patch,
    path = "/api/projects/{projectId}",
    tag = "Projetos",
    params(("projectId" = Uuid, Path, description = "ID do projeto")),
    request_body(content = UpdateProjectPayload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Projeto atualizado", body = Project),
        (status = 401, description = "Usuário não é membro do workspace"),
        (status = 404, description = "Projeto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_project(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(project_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let project = app_state
        .project_repo
        .find_by_id(project_id)
        .await
        .and_then(|p| p.ok_or(AppError::NotFound))
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .access
        .ensure_member_of(&project, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let (payload, image) = forms::parse_form::<UpdateProjectPayload>(multipart)
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
        .project_repo
        .update(project_id, payload.name.as_deref(), image_url)
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

// DELETE /api/projects/{projectId}
#[utoipa::path(
    delete,
    path = "/api/projects/{projectId}",
    tag = "Projetos",
    params(("projectId" = Uuid, Path, description = "ID do projeto")),
    responses(
        (status = 200, description = "Projeto excluído (tarefas não cascateiam)"),
        (status = 401, description = "Usuário não é membro do workspace"),
        (status = 404, description = "Projeto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_project(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(project_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let project = app_state
        .project_repo
        .find_by_id(project_id)
        .await
        .and_then(|p| p.ok_or(AppError::NotFound))
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .access
        .ensure_member_of(&project, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .project_repo
        .delete(project_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(json!({ "data": { "id": project_id } })))
}
