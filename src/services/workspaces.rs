// src/services/workspaces.rs

use rand::{Rng, distributions::Alphanumeric};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{MemberRepository, WorkspaceRepository},
    models::{
        members::{Member, MemberRole},
        workspaces::Workspace,
    },
};

const INVITE_CODE_LENGTH: usize = 10;

#[derive(Clone)]
pub struct WorkspaceService {
    workspace_repo: WorkspaceRepository,
    member_repo: MemberRepository,
    pool: PgPool,
}

impl WorkspaceService {
    pub fn new(
        workspace_repo: WorkspaceRepository,
        member_repo: MemberRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            workspace_repo,
            member_repo,
            pool,
        }
    }

    // Cria o workspace e, atomicamente, o vínculo ADMIN de quem criou.
    // Workspace sem nenhum membro não pode existir.
    pub async fn create_with_owner(
        &self,
        name: &str,
        image_url: Option<&str>,
        owner_id: Uuid,
    ) -> Result<Workspace, AppError> {
        let invite_code = generate_invite_code();

        let mut tx = self.pool.begin().await?;

        let workspace = self
            .workspace_repo
            .create(&mut *tx, name, owner_id, image_url, &invite_code)
            .await?;

        self.member_repo
            .create(&mut *tx, workspace.id, owner_id, MemberRole::Admin)
            .await?;

        tx.commit().await?;

        tracing::info!("✅ Workspace criado: {} ({})", workspace.name, workspace.id);

        Ok(workspace)
    }

    // Entrada via código de convite. Quem entra vira MEMBER.
    pub async fn join(
        &self,
        workspace: &Workspace,
        user_id: Uuid,
        code: &str,
    ) -> Result<Workspace, AppError> {
        let existing = self
            .member_repo
            .find_membership(workspace.id, user_id)
            .await?;

        if existing.is_some() {
            return Err(AppError::AlreadyMember);
        }

        if workspace.invite_code != code {
            return Err(AppError::InvalidInviteCode);
        }

        self.member_repo
            .create(&self.pool, workspace.id, user_id, MemberRole::Member)
            .await?;

        Ok(workspace.clone())
    }

    // Invalida o código atual gerando outro
    pub async fn reset_invite_code(&self, workspace_id: Uuid) -> Result<Workspace, AppError> {
        let code = generate_invite_code();

        self.workspace_repo
            .reset_invite_code(workspace_id, &code)
            .await
    }

    pub async fn change_member_role(
        &self,
        member: &Member,
        role: MemberRole,
    ) -> Result<Member, AppError> {
        self.ensure_not_last_member(member).await?;

        self.member_repo.update_role(member.id, role).await
    }

    pub async fn remove_member(&self, member: &Member) -> Result<(), AppError> {
        self.ensure_not_last_member(member).await?;

        self.member_repo.delete(member.id).await
    }

    // Rebaixar ou remover o único membro deixaria o workspace inacessível
    async fn ensure_not_last_member(&self, member: &Member) -> Result<(), AppError> {
        let count = self
            .member_repo
            .count_in_workspace(member.workspace_id)
            .await?;

        if count <= 1 {
            return Err(AppError::LastMember);
        }

        Ok(())
    }
}

pub fn generate_invite_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(INVITE_CODE_LENGTH)
        .map(char::from)
        .collect()
}
