// src/handlers/tasks.rs

use std::collections::HashSet;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    db::task_repo::TaskFilters,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        normalize,
        tasks::{Task, TaskStatus},
    },
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TasksQuery {
    pub workspace_id: Uuid,
    pub project_id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<DateTime<Utc>>,
    pub search: Option<String>,
}

// ---
// Payload: criação de tarefa (JSON)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[serde(deserialize_with = "normalize::trimmed")]
    #[schema(example = "Conferir entrega de capacetes")]
    pub name: String,

    pub status: TaskStatus,
    pub workspace_id: Uuid,
    pub project_id: Uuid,

    // ID do membro (não do usuário) responsável pela tarefa
    pub assignee_id: Uuid,

    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[serde(default, deserialize_with = "normalize::opt_trimmed")]
    pub name: Option<String>,

    pub status: Option<TaskStatus>,
    pub project_id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BulkUpdateTasksPayload {
    #[validate(
        length(min = 1, message = "Informe ao menos uma tarefa."),
        nested
    )]
    pub tasks: Vec<BulkTaskChange>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct BulkTaskChange {
    pub id: Uuid,
    pub status: TaskStatus,

    // Posições espaçadas de 1000 em 1000: dá para inserir um cartão
    // entre dois sem renumerar a coluna inteira
    #[validate(range(
        min = 1000,
        max = 1_000_000,
        message = "A posição deve ficar entre 1000 e 1000000."
    ))]
    pub position: i32,
}

// GET /api/tasks?workspaceId=&projectId=&assigneeId=&status=&search=&dueDate=
#[utoipa::path(
    get,
    path = "/api/tasks",
    tag = "Tarefas",
    params(
        ("workspaceId" = Uuid, Query, description = "ID do workspace"),
        ("projectId" = Option<Uuid>, Query, description = "Filtra por projeto"),
        ("assigneeId" = Option<Uuid>, Query, description = "Filtra por responsável (ID de membro)"),
        ("status" = Option<TaskStatus>, Query, description = "Filtra por status"),
        ("dueDate" = Option<String>, Query, description = "Filtra por data de entrega exata"),
        ("search" = Option<String>, Query, description = "Busca por nome (ILIKE)")
    ),
    responses(
        (status = 200, description = "Tarefas do workspace, mais recentes primeiro", body = [Task]),
        (status = 401, description = "Usuário não é membro do workspace")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_tasks(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<TasksQuery>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .access
        .require_member(query.workspace_id, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let filters = TaskFilters {
        project_id: query.project_id,
        assignee_id: query.assignee_id,
        status: query.status,
        due_date: query.due_date,
        search: query.search,
    };

    let tasks = app_state
        .task_repo
        .list_by_workspace(query.workspace_id, &filters)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let total = tasks.len();

    Ok(Json(
        json!({ "data": { "documents": tasks, "total": total } }),
    ))
}

// POST /api/tasks
#[utoipa::path(
    post,
    path = "/api/tasks",
    tag = "Tarefas",
    request_body = CreateTaskPayload,
    responses(
        (status = 201, description = "Tarefa criada no fim da coluna", body = Task),
        (status = 400, description = "Dados inválidos"),
        (status = 401, description = "Usuário não é membro do workspace")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_task(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateTaskPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .access
        .require_member(payload.workspace_id, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let task = app_state
        .task_repo
        .create(
            payload.workspace_id,
            payload.project_id,
            payload.assignee_id,
            &payload.name,
            payload.description.as_deref(),
            payload.status,
            payload.due_date,
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(json!({ "data": task }))))
}

// GET /api/tasks/{taskId}
#[utoipa::path(
    get,
    path = "/api/tasks/{taskId}",
    tag = "Tarefas",
    params(("taskId" = Uuid, Path, description = "ID da tarefa")),
    responses(
        (status = 200, description = "Detalhes da tarefa", body = Task),
        (status = 401, description = "Usuário não é membro do workspace"),
        (status = 404, description = "Tarefa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_task(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(task_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let task = app_state
        .task_repo
        .find_by_id(task_id)
        .await
        .and_then(|t| t.ok_or(AppError::NotFound))
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .access
        .ensure_member_of(&task, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(json!({ "data": task })))
}

// PATCH /api/tasks/{taskId}
#[utoipa::path(
    patch,
    path = "/api/tasks/{taskId}",
    tag = "Tarefas",
    params(("taskId" = Uuid, Path, description = "ID da tarefa")),
    request_body = UpdateTaskPayload,
    responses(
        (status = 200, description = "Tarefa atualizada", body = Task),
        (status = 401, description = "Usuário não é membro do workspace"),
        (status = 404, description = "Tarefa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_task(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(task_id): Path<Uuid>,
    Json(payload): Json<UpdateTaskPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let task = app_state
        .task_repo
        .find_by_id(task_id)
        .await
        .and_then(|t| t.ok_or(AppError::NotFound))
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .access
        .ensure_member_of(&task, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let updated = app_state
        .task_repo
        .update(
            task_id,
            payload.name.as_deref(),
            payload.description.as_deref(),
            payload.status,
            payload.project_id,
            payload.assignee_id,
            payload.due_date,
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(json!({ "data": updated })))
}

// DELETE /api/tasks/{taskId}
#[utoipa::path(
    delete,
    path = "/api/tasks/{taskId}",
    tag = "Tarefas",
    params(("taskId" = Uuid, Path, description = "ID da tarefa")),
    responses(
        (status = 200, description = "Tarefa excluída"),
        (status = 401, description = "Usuário não é membro do workspace"),
        (status = 404, description = "Tarefa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_task(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(task_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let task = app_state
        .task_repo
        .find_by_id(task_id)
        .await
        .and_then(|t| t.ok_or(AppError::NotFound))
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .access
        .ensure_member_of(&task, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .task_repo
        .delete(task_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(json!({ "data": { "id": task_id } })))
}

// POST /api/tasks/bulk-update
//
// Arrastar cartões no kanban reposiciona várias tarefas de uma vez.
// Todas precisam pertencer ao mesmo workspace e a gravação é atômica:
// ou a coluna inteira move, ou nada move.
#[utoipa::path(
    post,
    path = "/api/tasks/bulk-update",
    tag = "Tarefas",
    request_body = BulkUpdateTasksPayload,
    responses(
        (status = 200, description = "Tarefas reposicionadas", body = [Task]),
        (status = 400, description = "Dados inválidos"),
        (status = 401, description = "Tarefas de workspaces diferentes ou usuário sem vínculo"),
        (status = 404, description = "Alguma tarefa não existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn bulk_update_tasks(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<BulkUpdateTasksPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let ids: Vec<Uuid> = payload.tasks.iter().map(|t| t.id).collect();

    let existing = app_state
        .task_repo
        .find_many_by_ids(&ids)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    if existing.len() != ids.len() {
        return Err(AppError::NotFound.to_api_error(&locale, &app_state.i18n_store));
    }

    let workspace_ids: HashSet<Uuid> = existing.iter().map(|t| t.workspace_id).collect();

    // Um arrasto só acontece dentro de um quadro; ids de workspaces
    // misturados indicam requisição forjada
    if workspace_ids.len() != 1 {
        return Err(AppError::Unauthorized.to_api_error(&locale, &app_state.i18n_store));
    }

    let workspace_id = existing[0].workspace_id;

    app_state
        .access
        .require_member(workspace_id, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let result = async {
        let mut tx = app_state.db_pool.begin().await.map_err(AppError::from)?;

        let mut updated = Vec::with_capacity(payload.tasks.len());
        for change in &payload.tasks {
            let task = app_state
                .task_repo
                .update_position(&mut *tx, change.id, change.status, change.position)
                .await?;
            updated.push(task);
        }

        tx.commit().await.map_err(AppError::from)?;

        Ok::<_, AppError>(updated)
    }
    .await;

    let updated = result.map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(json!({ "data": updated })))
}
