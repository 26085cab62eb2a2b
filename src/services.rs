// src/services.rs

pub mod access;
pub mod auth;
pub mod storage;
pub mod workspaces;

pub use access::WorkspaceAccess;
pub use auth::AuthService;
pub use storage::StorageService;
pub use workspaces::WorkspaceService;
