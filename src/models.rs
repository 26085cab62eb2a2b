pub mod auth;
pub mod epis;
pub mod estoques;
pub mod members;
pub mod normalize;
pub mod projects;
pub mod tasks;
pub mod workspaces;

use uuid::Uuid;

// Todo recurso da API sabe dizer a qual workspace pertence. O guard de
// membership (`services::access`) opera em cima disso: busca o recurso,
// pergunta o workspace e exige o vínculo do usuário antes de qualquer
// leitura ou escrita.
pub trait WorkspaceScoped {
    fn workspace_id(&self) -> Uuid;
}

impl WorkspaceScoped for workspaces::Workspace {
    fn workspace_id(&self) -> Uuid {
        self.id
    }
}

impl WorkspaceScoped for members::Member {
    fn workspace_id(&self) -> Uuid {
        self.workspace_id
    }
}

impl WorkspaceScoped for projects::Project {
    fn workspace_id(&self) -> Uuid {
        self.workspace_id
    }
}

impl WorkspaceScoped for tasks::Task {
    fn workspace_id(&self) -> Uuid {
        self.workspace_id
    }
}

impl WorkspaceScoped for epis::Epi {
    fn workspace_id(&self) -> Uuid {
        self.workspace_id
    }
}

impl WorkspaceScoped for estoques::Estoque {
    fn workspace_id(&self) -> Uuid {
        self.workspace_id
    }
}

impl WorkspaceScoped for estoques::Movement {
    fn workspace_id(&self) -> Uuid {
        self.workspace_id
    }
}

impl WorkspaceScoped for estoques::Order {
    fn workspace_id(&self) -> Uuid {
        self.workspace_id
    }
}
