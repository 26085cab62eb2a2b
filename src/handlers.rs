// src/handlers.rs

pub mod auth;
pub mod epis;
pub mod estoques;
pub mod forms;
pub mod members;
pub mod projects;
pub mod tasks;
pub mod workspaces;
