// src/handlers/members.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::members::{Member, MemberRole, MemberWithUser},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembersQuery {
    pub workspace_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateMemberPayload {
    pub role: MemberRole,
}

// GET /api/members?workspaceId=
#[utoipa::path(
    get,
    path = "/api/members",
    tag = "Membros",
    params(("workspaceId" = Uuid, Query, description = "ID do workspace")),
    responses(
        (status = 200, description = "Membros do workspace com nome e email", body = [MemberWithUser]),
        (status = 401, description = "Usuário não é membro do workspace")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_members(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<MembersQuery>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .access
        .require_member(query.workspace_id, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let members = app_state
        .member_repo
        .list_with_users(query.workspace_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let total = members.len();

    Ok(Json(
        json!({ "data": { "documents": members, "total": total } }),
    ))
}

// PATCH /api/members/{memberId}
#[utoipa::path(
    patch,
    path = "/api/members/{memberId}",
    tag = "Membros",
    params(("memberId" = Uuid, Path, description = "ID do membro")),
    request_body = UpdateMemberPayload,
    responses(
        (status = 200, description = "Papel do membro atualizado", body = Member),
        (status = 400, description = "Workspace não pode ficar sem membros"),
        (status = 401, description = "Apenas ADMIN pode alterar papéis"),
        (status = 404, description = "Membro não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_member(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(member_id): Path<Uuid>,
    Json(payload): Json<UpdateMemberPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let member = app_state
        .member_repo
        .find_by_id(member_id)
        .await
        .and_then(|m| m.ok_or(AppError::NotFound))
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .access
        .require_admin(member.workspace_id, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let updated = app_state
        .workspace_service
        .change_member_role(&member, payload.role)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(json!({ "data": updated })))
}

// DELETE /api/members/{memberId}
//
// Sair do workspace (o próprio membro) ou remoção por um ADMIN.
#[utoipa::path(
    delete,
    path = "/api/members/{memberId}",
    tag = "Membros",
    params(("memberId" = Uuid, Path, description = "ID do membro")),
    responses(
        (status = 200, description = "Membro removido"),
        (status = 400, description = "Workspace não pode ficar sem membros"),
        (status = 401, description = "Remoção permitida ao próprio membro ou a um ADMIN"),
        (status = 404, description = "Membro não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_member(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(member_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let member = app_state
        .member_repo
        .find_by_id(member_id)
        .await
        .and_then(|m| m.ok_or(AppError::NotFound))
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let requester = app_state
        .access
        .require_member(member.workspace_id, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    if member.user_id != user.id && !requester.is_admin() {
        return Err(AppError::Unauthorized.to_api_error(&locale, &app_state.i18n_store));
    }

    app_state
        .workspace_service
        .remove_member(&member)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(json!({ "data": { "id": member_id } })))
}
