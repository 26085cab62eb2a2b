pub mod epi_repo;
pub use epi_repo::EpiRepository;
pub mod estoque_repo;
pub use estoque_repo::EstoqueRepository;
pub mod member_repo;
pub use member_repo::MemberRepository;
pub mod movement_repo;
pub use movement_repo::MovementRepository;
pub mod project_repo;
pub use project_repo::ProjectRepository;
pub mod task_repo;
pub use task_repo::TaskRepository;
pub mod user_repo;
pub use user_repo::UserRepository;
pub mod workspace_repo;
pub use workspace_repo::WorkspaceRepository;
