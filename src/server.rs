// src/server.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, patch, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_middleware};

// Uploads de imagem passam do limite padrão de 2 MB do axum
const BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

pub fn create_app(app_state: AppState) -> Router {
    // Rotas públicas de autenticação
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Rotas de sessão (exigem token)
    let session_routes = Router::new()
        .route("/logout", post(handlers::auth::logout))
        .route("/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let workspace_routes = Router::new()
        .route(
            "/",
            get(handlers::workspaces::get_workspaces).post(handlers::workspaces::create_workspace),
        )
        .route(
            "/{workspaceId}",
            get(handlers::workspaces::get_workspace)
                .patch(handlers::workspaces::update_workspace)
                .delete(handlers::workspaces::delete_workspace),
        )
        .route(
            "/{workspaceId}/join",
            post(handlers::workspaces::join_workspace),
        )
        .route(
            "/{workspaceId}/reset-invite-code",
            post(handlers::workspaces::reset_invite_code),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let member_routes = Router::new()
        .route("/", get(handlers::members::get_members))
        .route(
            "/{memberId}",
            patch(handlers::members::update_member).delete(handlers::members::delete_member),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let project_routes = Router::new()
        .route(
            "/",
            get(handlers::projects::get_projects).post(handlers::projects::create_project),
        )
        .route(
            "/{projectId}",
            get(handlers::projects::get_project)
                .patch(handlers::projects::update_project)
                .delete(handlers::projects::delete_project),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let task_routes = Router::new()
        .route(
            "/",
            get(handlers::tasks::get_tasks).post(handlers::tasks::create_task),
        )
        .route("/bulk-update", post(handlers::tasks::bulk_update_tasks))
        .route(
            "/{taskId}",
            get(handlers::tasks::get_task)
                .patch(handlers::tasks::update_task)
                .delete(handlers::tasks::delete_task),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let epi_routes = Router::new()
        .route(
            "/",
            get(handlers::epis::get_epis).post(handlers::epis::create_epi),
        )
        .route(
            "/{epiId}",
            get(handlers::epis::get_epi)
                .patch(handlers::epis::update_epi)
                .delete(handlers::epis::delete_epi),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let estoque_routes = Router::new()
        .route(
            "/",
            get(handlers::estoques::get_estoques).post(handlers::estoques::create_estoque),
        )
        // Rota estática antes das rotas com {estoqueId}
        .route("/movements", post(handlers::estoques::create_movement))
        .route(
            "/{estoqueId}",
            get(handlers::estoques::get_estoque)
                .patch(handlers::estoques::update_estoque)
                .delete(handlers::estoques::delete_estoque),
        )
        .route(
            "/{estoqueId}/movements",
            get(handlers::estoques::get_movements),
        )
        .route("/{estoqueId}/stock", get(handlers::estoques::get_stock))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes.merge(session_routes))
        .nest("/api/workspaces", workspace_routes)
        .nest("/api/members", member_routes)
        .nest("/api/projects", project_routes)
        .nest("/api/tasks", task_routes)
        .nest("/api/epis", epi_routes)
        .nest("/api/estoques", estoque_routes)
        .merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .with_state(app_state)
}
