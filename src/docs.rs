// src/docs.rs

use crate::handlers;
use crate::models;
use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::get_me,

        // --- Workspaces ---
        handlers::workspaces::get_workspaces,
        handlers::workspaces::create_workspace,
        handlers::workspaces::get_workspace,
        handlers::workspaces::update_workspace,
        handlers::workspaces::delete_workspace,
        handlers::workspaces::join_workspace,
        handlers::workspaces::reset_invite_code,

        // --- Membros ---
        handlers::members::get_members,
        handlers::members::update_member,
        handlers::members::delete_member,

        // --- Projetos ---
        handlers::projects::get_projects,
        handlers::projects::create_project,
        handlers::projects::get_project,
        handlers::projects::update_project,
        handlers::projects::delete_project,

        // --- Tarefas ---
        handlers::tasks::get_tasks,
        handlers::tasks::create_task,
        handlers::tasks::get_task,
        handlers::tasks::update_task,
        handlers::tasks::delete_task,
        handlers::tasks::bulk_update_tasks,

        // --- EPIs ---
        handlers::epis::get_epis,
        handlers::epis::create_epi,
        handlers::epis::get_epi,
        handlers::epis::update_epi,
        handlers::epis::delete_epi,

        // --- Estoques ---
        handlers::estoques::get_estoques,
        handlers::estoques::create_estoque,
        handlers::estoques::get_estoque,
        handlers::estoques::update_estoque,
        handlers::estoques::delete_estoque,
        handlers::estoques::get_movements,
        handlers::estoques::create_movement,
        handlers::estoques::get_stock,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Workspaces ---
            models::workspaces::Workspace,
            handlers::workspaces::CreateWorkspacePayload,
            handlers::workspaces::UpdateWorkspacePayload,
            handlers::workspaces::JoinWorkspacePayload,

            // --- Membros ---
            models::members::MemberRole,
            models::members::Member,
            models::members::MemberWithUser,
            handlers::members::UpdateMemberPayload,

            // --- Projetos ---
            models::projects::Project,
            handlers::projects::CreateProjectPayload,
            handlers::projects::UpdateProjectPayload,

            // --- Tarefas ---
            models::tasks::TaskStatus,
            models::tasks::Task,
            handlers::tasks::CreateTaskPayload,
            handlers::tasks::UpdateTaskPayload,
            handlers::tasks::BulkUpdateTasksPayload,
            handlers::tasks::BulkTaskChange,

            // --- EPIs ---
            models::epis::LifespanUnit,
            models::epis::Epi,
            handlers::epis::CreateEpiPayload,
            handlers::epis::UpdateEpiPayload,

            // --- Estoques ---
            models::estoques::EstoqueType,
            models::estoques::Estoque,
            models::estoques::MovementType,
            models::estoques::Movement,
            models::estoques::StockEntry,
            models::estoques::EstoqueWithStock,
            handlers::estoques::CreateEstoquePayload,
            handlers::estoques::UpdateEstoquePayload,
            handlers::estoques::CreateMovementPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Workspaces", description = "Workspaces e código de convite"),
        (name = "Membros", description = "Vínculos de usuários aos workspaces"),
        (name = "Projetos", description = "Projetos (obras) do workspace"),
        (name = "Tarefas", description = "Tarefas e quadro kanban"),
        (name = "EPIs", description = "Catálogo de Equipamentos de Proteção Individual"),
        (name = "Estoques", description = "Locais de estoque, movimentações e saldo")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme("api_jwt", SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)));
    }
}
