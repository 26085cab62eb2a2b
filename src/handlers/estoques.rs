// src/handlers/estoques.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    db::movement_repo::NewMovement,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        estoques::{Estoque, EstoqueType, EstoqueWithStock, Movement, MovementType},
        normalize,
    },
};

fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstoquesQuery {
    pub workspace_id: Uuid,
}

// ---
// Payload: criação de estoque (JSON)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEstoquePayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[serde(deserialize_with = "normalize::trimmed")]
    #[schema(example = "Almoxarifado Central")]
    pub name: String,

    #[serde(rename = "type")]
    pub estoque_type: EstoqueType,

    #[validate(length(min = 1, message = "A localização é obrigatória."))]
    #[serde(deserialize_with = "normalize::trimmed")]
    pub location: String,

    #[serde(default, deserialize_with = "normalize::opt_trimmed")]
    pub responsible: Option<String>,

    #[validate(range(min = 0, max = 2_147_483_647, message = "A capacidade não pode ser negativa."))]
    #[serde(default, deserialize_with = "normalize::opt_int_flex")]
    pub capacity: Option<i64>,

    #[serde(default, deserialize_with = "normalize::opt_trimmed")]
    pub observations: Option<String>,

    pub workspace_id: Uuid,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEstoquePayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[serde(default, deserialize_with = "normalize::opt_trimmed")]
    pub name: Option<String>,

    #[serde(default, rename = "type")]
    pub estoque_type: Option<EstoqueType>,

    #[validate(length(min = 1, message = "A localização é obrigatória."))]
    #[serde(default, deserialize_with = "normalize::opt_trimmed")]
    pub location: Option<String>,

    #[serde(default, deserialize_with = "normalize::opt_trimmed")]
    pub responsible: Option<String>,

    #[validate(range(min = 0, max = 2_147_483_647, message = "A capacidade não pode ser negativa."))]
    #[serde(default, deserialize_with = "normalize::opt_int_flex")]
    pub capacity: Option<i64>,

    #[serde(default, deserialize_with = "normalize::opt_trimmed")]
    pub observations: Option<String>,
}

// ---
// Payload: movimentação (JSON)
//
// O registro é gravado como chega: não conferimos se o estoque ou o
// EPI ainda existem, e uma transferência sem destino só debita a
// origem. O saldo é derivado depois, na leitura.
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMovementPayload {
    pub estoque_id: Uuid,
    pub epi_id: Uuid,

    // Nome desnormalizado: preserva a identificação mesmo que o EPI
    // seja excluído depois
    #[serde(default, deserialize_with = "normalize::opt_trimmed")]
    pub epi_name: Option<String>,

    #[serde(rename = "type")]
    pub movement_type: MovementType,

    #[validate(range(min = 1, max = 2_147_483_647, message = "A quantidade deve ser maior que zero."))]
    #[serde(deserialize_with = "normalize::int_flex")]
    pub quantity: i64,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default, deserialize_with = "normalize::opt_decimal_flex")]
    pub value: Option<Decimal>,

    #[serde(default, deserialize_with = "normalize::opt_trimmed")]
    pub order_number: Option<String>,

    // Canhoto de envio
    #[serde(default, deserialize_with = "normalize::opt_trimmed")]
    pub delivery_note: Option<String>,

    // Apenas para transferências
    pub destination_estoque_id: Option<Uuid>,

    #[serde(default, deserialize_with = "normalize::opt_trimmed")]
    pub observations: Option<String>,

    pub workspace_id: Uuid,
}

// GET /api/estoques?workspaceId=
#[utoipa::path(
    get,
    path = "/api/estoques",
    tag = "Estoques",
    params(("workspaceId" = Uuid, Query, description = "ID do workspace")),
    responses(
        (status = 200, description = "Estoques do workspace", body = [Estoque]),
        (status = 401, description = "Usuário não é membro do workspace")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_estoques(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<EstoquesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .access
        .require_member(query.workspace_id, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let estoques = app_state
        .estoque_repo
        .list_by_workspace(query.workspace_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let total = estoques.len();

    Ok(Json(
        json!({ "data": { "documents": estoques, "total": total } }),
    ))
}

// POST /api/estoques
#[utoipa::path(
    post,
    path = "/api/estoques",
    tag = "Estoques",
    request_body = CreateEstoquePayload,
    responses(
        (status = 201, description = "Estoque criado", body = Estoque),
        (status = 400, description = "Dados inválidos"),
        (status = 401, description = "Usuário não é membro do workspace")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_estoque(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateEstoquePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .access
        .require_member(payload.workspace_id, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let estoque = app_state
        .estoque_repo
        .create(
            payload.workspace_id,
            &payload.name,
            payload.estoque_type,
            &payload.location,
            payload.responsible.as_deref(),
            payload.capacity.map(|n| n as i32),
            payload.observations.as_deref(),
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(json!({ "data": estoque }))))
}

// GET /api/estoques/{estoqueId}
#[utoipa::path(
    get,
    path = "/api/estoques/{estoqueId}",
    tag = "Estoques",
    params(("estoqueId" = Uuid, Path, description = "ID do estoque")),
    responses(
        (status = 200, description = "Detalhes do estoque", body = Estoque),
        (status = 401, description = "Usuário não é membro do workspace"),
        (status = 404, description = "Estoque não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_estoque(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(estoque_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let estoque = app_state
        .estoque_repo
        .find_by_id(estoque_id)
        .await
        .and_then(|e| e.ok_or(AppError::NotFound))
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .access
        .ensure_member_of(&estoque, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(json!({ "data": estoque })))
}

// PATCH /api/estoques/{estoqueId}
#[utoipa::path(
    patch,
    path = "/api/estoques/{estoqueId}",
    tag = "Estoques",
    params(("estoqueId" = Uuid, Path, description = "ID do estoque")),
    request_body = UpdateEstoquePayload,
    responses(
        (status = 200, description = "Estoque atualizado", body = Estoque),
        (status = 401, description = "Usuário não é membro do workspace"),
        (status = 404, description = "Estoque não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_estoque(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(estoque_id): Path<Uuid>,
    Json(payload): Json<UpdateEstoquePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let estoque = app_state
        .estoque_repo
        .find_by_id(estoque_id)
        .await
        .and_then(|e| e.ok_or(AppError::NotFound))
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .access
        .ensure_member_of(&estoque, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let updated = app_state
        .estoque_repo
        .update(
            estoque_id,
            payload.name.as_deref(),
            payload.estoque_type,
            payload.location.as_deref(),
            payload.responsible.as_deref(),
            payload.capacity.map(|n| n as i32),
            payload.observations.as_deref(),
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(json!({ "data": updated })))
}

// DELETE /api/estoques/{estoqueId}
#[utoipa::path(
    delete,
    path = "/api/estoques/{estoqueId}",
    tag = "Estoques",
    params(("estoqueId" = Uuid, Path, description = "ID do estoque")),
    responses(
        (status = 200, description = "Estoque excluído; o livro-razão fica intacto"),
        (status = 401, description = "Usuário não é membro do workspace"),
        (status = 404, description = "Estoque não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_estoque(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(estoque_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let estoque = app_state
        .estoque_repo
        .find_by_id(estoque_id)
        .await
        .and_then(|e| e.ok_or(AppError::NotFound))
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .access
        .ensure_member_of(&estoque, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .estoque_repo
        .delete(estoque_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(json!({ "data": { "id": estoque_id } })))
}

// GET /api/estoques/{estoqueId}/movements
#[utoipa::path(
    get,
    path = "/api/estoques/{estoqueId}/movements",
    tag = "Estoques",
    params(("estoqueId" = Uuid, Path, description = "ID do estoque")),
    responses(
        (status = 200, description = "As 100 movimentações mais recentes do estoque", body = [Movement]),
        (status = 401, description = "Usuário não é membro do workspace"),
        (status = 404, description = "Estoque não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_movements(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(estoque_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let estoque = app_state
        .estoque_repo
        .find_by_id(estoque_id)
        .await
        .and_then(|e| e.ok_or(AppError::NotFound))
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .access
        .ensure_member_of(&estoque, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let movements = app_state
        .movement_repo
        .list_by_estoque(estoque_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let total = movements.len();

    Ok(Json(
        json!({ "data": { "documents": movements, "total": total } }),
    ))
}

// POST /api/estoques/movements
#[utoipa::path(
    post,
    path = "/api/estoques/movements",
    tag = "Estoques",
    request_body = CreateMovementPayload,
    responses(
        (status = 201, description = "Movimentação registrada no livro-razão", body = Movement),
        (status = 400, description = "Dados inválidos"),
        (status = 401, description = "Usuário não é membro do workspace")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_movement(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateMovementPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .access
        .require_member(payload.workspace_id, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let movement = app_state
        .movement_repo
        .create(NewMovement {
            workspace_id: payload.workspace_id,
            estoque_id: payload.estoque_id,
            epi_id: payload.epi_id,
            epi_name: payload.epi_name.as_deref(),
            movement_type: payload.movement_type,
            quantity: payload.quantity as i32,
            value: payload.value,
            order_number: payload.order_number.as_deref(),
            delivery_note: payload.delivery_note.as_deref(),
            destination_estoque_id: payload.destination_estoque_id,
            observations: payload.observations.as_deref(),
        })
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(json!({ "data": movement }))))
}

// GET /api/estoques/{estoqueId}/stock
//
// Saldo por EPI derivado do livro-razão: Entrada e Ajuste somam, Saída
// subtrai, Transferência subtrai na origem e soma no destino.
#[utoipa::path(
    get,
    path = "/api/estoques/{estoqueId}/stock",
    tag = "Estoques",
    params(("estoqueId" = Uuid, Path, description = "ID do estoque")),
    responses(
        (status = 200, description = "Estoque com o saldo agregado por EPI", body = EstoqueWithStock),
        (status = 401, description = "Usuário não é membro do workspace"),
        (status = 404, description = "Estoque não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_stock(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(estoque_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let estoque = app_state
        .estoque_repo
        .find_by_id(estoque_id)
        .await
        .and_then(|e| e.ok_or(AppError::NotFound))
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .access
        .ensure_member_of(&estoque, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let stock = app_state
        .movement_repo
        .stock_by_estoque(estoque_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(json!({ "data": EstoqueWithStock { estoque, stock } })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estoque_base() -> serde_json::Value {
        json!({
            "name": "Almoxarifado Central",
            "type": "Central",
            "location": "Canteiro A",
            "workspaceId": "2f9adf60-6061-4cd2-a25c-21b4dc66dbd4",
        })
    }

    fn movimento_base() -> serde_json::Value {
        json!({
            "estoqueId": "97c570e5-4a52-4f11-9a52-0d4ec3f066ef",
            "epiId": "b76a2769-34cc-4b3f-9a35-9a25ae21b090",
            "type": "Entrada",
            "quantity": 10,
            "workspaceId": "2f9adf60-6061-4cd2-a25c-21b4dc66dbd4",
        })
    }

    #[test]
    fn capacidade_aceita_numero_ou_string_e_vazio_vira_ausente() {
        let mut raw = estoque_base();
        raw["capacity"] = json!("50");
        let payload: CreateEstoquePayload = serde_json::from_value(raw).unwrap();
        assert_eq!(payload.capacity, Some(50));

        let mut raw = estoque_base();
        raw["capacity"] = json!("");
        let payload: CreateEstoquePayload = serde_json::from_value(raw).unwrap();
        assert_eq!(payload.capacity, None);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn tipo_de_estoque_usa_rotulos_com_inicial_maiuscula() {
        let mut raw = estoque_base();
        raw["type"] = json!("Obra");
        let payload: CreateEstoquePayload = serde_json::from_value(raw).unwrap();

        assert_eq!(payload.estoque_type, EstoqueType::Obra);
    }

    #[test]
    fn quantidade_aceita_string_numerica() {
        let mut raw = movimento_base();
        raw["quantity"] = json!("5");
        let payload: CreateMovementPayload = serde_json::from_value(raw).unwrap();

        assert_eq!(payload.quantity, 5);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn quantidade_zero_e_rejeitada() {
        let mut raw = movimento_base();
        raw["quantity"] = json!(0);
        let payload: CreateMovementPayload = serde_json::from_value(raw).unwrap();

        assert!(payload.validate().is_err());
    }

    #[test]
    fn valor_vazio_vira_zero() {
        let mut raw = movimento_base();
        raw["value"] = json!("");
        let payload: CreateMovementPayload = serde_json::from_value(raw).unwrap();

        assert_eq!(payload.value, Some(Decimal::ZERO));
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn valor_negativo_e_rejeitado() {
        let mut raw = movimento_base();
        raw["value"] = json!(-10.5);
        let payload: CreateMovementPayload = serde_json::from_value(raw).unwrap();

        assert!(payload.validate().is_err());
    }

    #[test]
    fn tipos_de_movimentacao_usam_rotulos_acentuados() {
        for (rotulo, esperado) in [
            ("Entrada", MovementType::Entrada),
            ("Saída", MovementType::Saida),
            ("Transferência", MovementType::Transferencia),
            ("Ajuste", MovementType::Ajuste),
        ] {
            let mut raw = movimento_base();
            raw["type"] = json!(rotulo);
            let payload: CreateMovementPayload = serde_json::from_value(raw).unwrap();

            assert_eq!(payload.movement_type, esperado, "rótulo {rotulo}");
        }
    }

    #[test]
    fn transferencia_sem_destino_e_aceita() {
        let mut raw = movimento_base();
        raw["type"] = json!("Transferência");
        let payload: CreateMovementPayload = serde_json::from_value(raw).unwrap();

        assert_eq!(payload.destination_estoque_id, None);
        assert!(payload.validate().is_ok());
    }
}
