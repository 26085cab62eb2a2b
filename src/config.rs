// src/config.rs

use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{env, time::Duration};

use crate::{
    common::i18n::I18nStore,
    db::{
        EpiRepository, EstoqueRepository, MemberRepository, MovementRepository, ProjectRepository,
        TaskRepository, UserRepository, WorkspaceRepository,
    },
    services::{AuthService, StorageService, WorkspaceAccess, WorkspaceService},
};

// Credenciais do provedor de armazenamento de arquivos (compatível com Appwrite)
#[derive(Clone)]
pub struct StorageConfig {
    pub endpoint: String,
    pub project_id: String,
    pub api_key: String,
    pub bucket_id: String,
}

impl StorageConfig {
    fn from_env() -> Self {
        Self {
            endpoint: env::var("APPWRITE_ENDPOINT").expect("APPWRITE_ENDPOINT deve ser definida"),
            project_id: env::var("APPWRITE_PROJECT_ID")
                .expect("APPWRITE_PROJECT_ID deve ser definida"),
            api_key: env::var("APPWRITE_API_KEY").expect("APPWRITE_API_KEY deve ser definida"),
            bucket_id: env::var("APPWRITE_IMAGES_BUCKET_ID")
                .expect("APPWRITE_IMAGES_BUCKET_ID deve ser definida"),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub i18n_store: I18nStore,
    pub auth_service: AuthService,
    pub workspace_service: WorkspaceService,
    pub access: WorkspaceAccess,
    pub storage: StorageService,
    pub workspace_repo: WorkspaceRepository,
    pub member_repo: MemberRepository,
    pub project_repo: ProjectRepository,
    pub task_repo: TaskRepository,
    pub epi_repo: EpiRepository,
    pub estoque_repo: EstoqueRepository,
    pub movement_repo: MovementRepository,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");
        let storage_config = StorageConfig::from_env();

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::from_pool(db_pool, jwt_secret, storage_config))
    }

    // Monta o gráfico de dependências a partir de um pool já criado
    pub fn from_pool(db_pool: PgPool, jwt_secret: String, storage_config: StorageConfig) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let workspace_repo = WorkspaceRepository::new(db_pool.clone());
        let member_repo = MemberRepository::new(db_pool.clone());
        let project_repo = ProjectRepository::new(db_pool.clone());
        let task_repo = TaskRepository::new(db_pool.clone());
        let epi_repo = EpiRepository::new(db_pool.clone());
        let estoque_repo = EstoqueRepository::new(db_pool.clone());
        let movement_repo = MovementRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo, jwt_secret, db_pool.clone());
        let workspace_service = WorkspaceService::new(
            workspace_repo.clone(),
            member_repo.clone(),
            db_pool.clone(),
        );
        let access = WorkspaceAccess::new(member_repo.clone());
        let storage = StorageService::new(storage_config);

        Self {
            db_pool,
            i18n_store: I18nStore::new(),
            auth_service,
            workspace_service,
            access,
            storage,
            workspace_repo,
            member_repo,
            project_repo,
            task_repo,
            epi_repo,
            estoque_repo,
            movement_repo,
        }
    }
}
