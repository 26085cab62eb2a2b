// src/services/access.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::MemberRepository,
    models::{WorkspaceScoped, members::Member},
};

// Guard de autorização por workspace. Toda rota de recurso passa por aqui
// antes de ler ou escrever qualquer coisa: sem vínculo, a resposta é 401 e
// nenhuma mutação acontece.
//
// A autorização é binária: qualquer membro opera os recursos do workspace.
// O papel ADMIN só é exigido na gestão do próprio workspace (configurações,
// código de convite, membros).
#[derive(Clone)]
pub struct WorkspaceAccess {
    member_repo: MemberRepository,
}

impl WorkspaceAccess {
    pub fn new(member_repo: MemberRepository) -> Self {
        Self { member_repo }
    }

    pub async fn require_member(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<Member, AppError> {
        self.member_repo
            .find_membership(workspace_id, user_id)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    pub async fn require_admin(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<Member, AppError> {
        let member = self.require_member(workspace_id, user_id).await?;

        if !member.is_admin() {
            return Err(AppError::Unauthorized);
        }

        Ok(member)
    }

    // Acesso via recurso já carregado: o fluxo "buscar pai -> derivar
    // workspace -> conferir vínculo" em uma chamada só.
    pub async fn ensure_member_of<R>(&self, resource: &R, user_id: Uuid) -> Result<Member, AppError>
    where
        R: WorkspaceScoped + Sync,
    {
        self.require_member(resource.workspace_id(), user_id).await
    }

    pub async fn ensure_admin_of<R>(&self, resource: &R, user_id: Uuid) -> Result<Member, AppError>
    where
        R: WorkspaceScoped + Sync,
    {
        self.require_admin(resource.workspace_id(), user_id).await
    }
}
