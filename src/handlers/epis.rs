// src/handlers/epis.rs

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
    db::epi_repo::{EpiChanges, NewEpi},
    handlers::forms,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        epis::{Epi, LifespanUnit},
        normalize,
    },
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisQuery {
    pub workspace_id: Uuid,
}

// ---
// Payload: cadastro de EPI (multipart)
//
// Formulários mandam tudo como string; os desserializadores de
// normalize aceitam "12" para números e "true" para booleanos.
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEpiPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[serde(deserialize_with = "normalize::trimmed")]
    #[schema(example = "Capacete classe B")]
    pub name: String,

    pub workspace_id: Uuid,

    // Certificado de Aprovação
    #[serde(default, deserialize_with = "normalize::opt_trimmed")]
    pub ca: Option<String>,

    #[validate(length(min = 1, message = "A categoria é obrigatória."))]
    #[schema(example = "Proteção da cabeça")]
    pub category: String,

    #[validate(length(min = 1, message = "O tipo de proteção é obrigatório."))]
    pub protection_type: String,

    #[validate(range(min = 0, max = 2_147_483_647, message = "A vida útil não pode ser negativa."))]
    #[serde(default, deserialize_with = "normalize::opt_int_flex")]
    pub lifespan: Option<i64>,

    pub lifespan_unit: Option<LifespanUnit>,

    #[validate(length(min = 1, message = "A unidade de medida é obrigatória."))]
    pub unit_of_measure: String,

    #[validate(length(min = 1, message = "A aplicação é obrigatória."))]
    pub application: String,

    #[serde(default, deserialize_with = "normalize::bool_flex")]
    pub has_uv_protection: bool,

    #[serde(default, deserialize_with = "normalize::opt_trimmed")]
    pub observations: Option<String>,

    #[serde(default, deserialize_with = "normalize::opt_image_flex")]
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEpiPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[serde(default, deserialize_with = "normalize::opt_trimmed")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "normalize::opt_trimmed")]
    pub ca: Option<String>,

    #[validate(length(min = 1, message = "A categoria é obrigatória."))]
    pub category: Option<String>,

    #[validate(length(min = 1, message = "O tipo de proteção é obrigatório."))]
    pub protection_type: Option<String>,

    #[validate(range(min = 0, max = 2_147_483_647, message = "A vida útil não pode ser negativa."))]
    #[serde(default, deserialize_with = "normalize::opt_int_flex")]
    pub lifespan: Option<i64>,

    pub lifespan_unit: Option<LifespanUnit>,

    #[validate(length(min = 1, message = "A unidade de medida é obrigatória."))]
    pub unit_of_measure: Option<String>,

    #[validate(length(min = 1, message = "A aplicação é obrigatória."))]
    pub application: Option<String>,

    #[serde(default, deserialize_with = "normalize::opt_bool_flex")]
    pub has_uv_protection: Option<bool>,

    #[serde(default, deserialize_with = "normalize::opt_trimmed")]
    pub observations: Option<String>,

    #[serde(default, deserialize_with = "normalize::opt_image_flex")]
    pub image: Option<String>,
}

// GET /api/epis?workspaceId=
#[utoipa::path(
    get,
    path = "/api/epis",
    tag = "EPIs",
    params(("workspaceId" = Uuid, Query, description = "ID do workspace")),
    responses(
        (status = 200, description = "EPIs cadastrados no workspace", body = [Epi]),
        (status = 401, description = "Usuário não é membro do workspace")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_epis(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<EpisQuery>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .access
        .require_member(query.workspace_id, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let epis = app_state
        .epi_repo
        .list_by_workspace(query.workspace_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let total = epis.len();

    Ok(Json(
        json!({ "data": { "documents": epis, "total": total } }),
    ))
}

// POST /api/epis
#[utoipa::path(
    post,
    path = "/api/epis",
    tag = "EPIs",
    request_body(content = CreateEpiPayload, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "EPI cadastrado", body = Epi),
        (status = 400, description = "Dados inválidos"),
        (status = 401, description = "Usuário não é membro do workspace")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_epi(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let (payload, image) = forms::parse_form::<CreateEpiPayload>(multipart)
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
        .epi_repo
        .create(NewEpi {
            workspace_id: payload.workspace_id,
            name: &payload.name,
            ca: payload.ca.as_deref(),
            category: &payload.category,
            protection_type: &payload.protection_type,
            lifespan: payload.lifespan.map(|n| n as i32),
            lifespan_unit: payload.lifespan_unit,
            unit_of_measure: &payload.unit_of_measure,
            application: &payload.application,
            has_uv_protection: payload.has_uv_protection,
            observations: payload.observations.as_deref(),
            image_url,
        })
        .await;

    match result {
        Ok(epi) => Ok((StatusCode::CREATED, Json(json!({ "data": epi })))),
        Err(err) => {
            // O banco falhou depois do upload: remove o arquivo órfão
            if let Some(staged) = staged {
                app_state.storage.discard(&staged.file_id).await;
            }
            Err(err.to_api_error(&locale, &app_state.i18n_store))
        }
    }
}

// GET /api/epis/{epiId}
#[utoipa::path(
    get,
    path = "/api/epis/{epiId}",
    tag = "EPIs",
    params(("epiId" = Uuid, Path, description = "ID do EPI")),
    responses(
        (status = 200, description = "Detalhes do EPI", body = Epi),
        (status = 401, description = "Usuário não é membro do workspace"),
        (status = 404, description = "EPI não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_epi(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(epi_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let epi = app_state
        .epi_repo
        .find_by_id(epi_id)
        .await
        .and_then(|e| e.ok_or(AppError::NotFound))
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .access
        .ensure_member_of(&epi, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(json!({ "data": epi })))
}

// PATCH /api/epis/{epiId}
#[utoipa::path(
    patch,
    path = "/api/epis/{epiId}",
    tag = "EPIs",
    params(("epiId" = Uuid, Path, description = "ID do EPI")),
    request_body(content = UpdateEpiPayload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "EPI atualizado", body = Epi),
        (status = 401, description = "Usuário não é membro do workspace"),
        (status = 404, description = "EPI não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_epi(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(epi_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let epi = app_state
        .epi_repo
        .find_by_id(epi_id)
        .await
        .and_then(|e| e.ok_or(AppError::NotFound))
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .access
        .ensure_member_of(&epi, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let (payload, image) = forms::parse_form::<UpdateEpiPayload>(multipart)
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
        .epi_repo
        .update(
            epi_id,
            EpiChanges {
                name: payload.name.as_deref(),
                ca: payload.ca.as_deref(),
                category: payload.category.as_deref(),
                protection_type: payload.protection_type.as_deref(),
                lifespan: payload.lifespan.map(|n| n as i32),
                lifespan_unit: payload.lifespan_unit,
                unit_of_measure: payload.unit_of_measure.as_deref(),
                application: payload.application.as_deref(),
                has_uv_protection: payload.has_uv_protection,
                observations: payload.observations.as_deref(),
                image_url,
            },
        )
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

// DELETE /api/epis/{epiId}
#[utoipa::path(
    delete,
    path = "/api/epis/{epiId}",
    tag = "EPIs",
    params(("epiId" = Uuid, Path, description = "ID do EPI")),
    responses(
        (status = 200, description = "EPI excluído (movimentações antigas preservam o nome)"),
        (status = 401, description = "Usuário não é membro do workspace"),
        (status = 404, description = "EPI não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_epi(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(epi_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let epi = app_state
        .epi_repo
        .find_by_id(epi_id)
        .await
        .and_then(|e| e.ok_or(AppError::NotFound))
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .access
        .ensure_member_of(&epi, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .epi_repo
        .delete(epi_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(json!({ "data": { "id": epi_id } })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload_base() -> serde_json::Value {
        json!({
            "name": "Capacete classe B",
            "workspaceId": "2f9adf60-6061-4cd2-a25c-21b4dc66dbd4",
            "category": "Proteção da cabeça",
            "protectionType": "Impacto",
            "unitOfMeasure": "unidade",
            "application": "Obra civil",
        })
    }

    #[test]
    fn vida_util_aceita_numero_ou_string() {
        let mut raw = payload_base();
        raw["lifespan"] = json!("12");
        let payload: CreateEpiPayload = serde_json::from_value(raw).unwrap();
        assert_eq!(payload.lifespan, Some(12));

        let mut raw = payload_base();
        raw["lifespan"] = json!(18);
        let payload: CreateEpiPayload = serde_json::from_value(raw).unwrap();
        assert_eq!(payload.lifespan, Some(18));
    }

    #[test]
    fn vida_util_vazia_fica_ausente() {
        let mut raw = payload_base();
        raw["lifespan"] = json!("");
        let payload: CreateEpiPayload = serde_json::from_value(raw).unwrap();

        assert_eq!(payload.lifespan, None);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn vida_util_negativa_e_rejeitada() {
        let mut raw = payload_base();
        raw["lifespan"] = json!(-1);
        let payload: CreateEpiPayload = serde_json::from_value(raw).unwrap();

        assert!(payload.validate().is_err());
    }

    #[test]
    fn protecao_uv_so_aceita_true_literal() {
        let mut raw = payload_base();
        raw["hasUvProtection"] = json!("true");
        let payload: CreateEpiPayload = serde_json::from_value(raw).unwrap();
        assert!(payload.has_uv_protection);

        for valor in ["false", "1", "sim", ""] {
            let mut raw = payload_base();
            raw["hasUvProtection"] = json!(valor);
            let payload: CreateEpiPayload = serde_json::from_value(raw).unwrap();
            assert!(!payload.has_uv_protection, "valor {valor:?} deveria ser false");
        }
    }

    #[test]
    fn unidade_de_vida_util_usa_rotulos_minusculos() {
        let mut raw = payload_base();
        raw["lifespanUnit"] = json!("meses");
        let payload: CreateEpiPayload = serde_json::from_value(raw).unwrap();

        assert_eq!(payload.lifespan_unit, Some(LifespanUnit::Meses));
    }

    #[test]
    fn atualizacao_parcial_sem_campos_e_aceita() {
        let payload: UpdateEpiPayload = serde_json::from_value(json!({})).unwrap();

        assert!(payload.validate().is_ok());
        assert_eq!(payload.has_uv_protection, None);
    }
}
