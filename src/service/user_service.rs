use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::AuthService,
    domain::*,
    error::{AppError, Result},
    repository::UserRepository,
    service::audit_service::{snapshot, AuditService},
};

const AUDIT_ENTITY: &str = "user";

pub struct UserService {
    repo: Arc<dyn UserRepository>,
    auth_service: Arc<AuthService>,
    audit_service: Arc<AuditService>,
}

impl UserService {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        auth_service: Arc<AuthService>,
        audit_service: Arc<AuditService>,
    ) -> Self {
        Self {
            repo,
            auth_service,
            audit_service,
        }
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: CreateUserRequest) -> Result<User> {
        request.validate()?;

        let hash = AuthService::hash_password(&request.password)?;
        let user = self.repo.create(&request, &hash, UserRole::User).await?;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Checks credentials and opens a session. Returns the user and the raw token.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String)> {
        let (user_id, hash) = self
            .repo
            .password_hash(email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !AuthService::verify_password(password, &hash)? {
            return Err(AppError::Unauthorized);
        }

        let user = self
            .repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;
        if !user.is_active {
            return Err(AppError::Forbidden("Account is disabled".to_string()));
        }

        let (_session, token) = self.auth_service.create_session(user.id).await?;
        info!(user_id = %user.id, "User logged in");
        Ok((user, token))
    }

    pub async fn logout(&self, token: &str) -> Result<()> {
        self.auth_service.invalidate_session(token).await
    }

    /// Resolves a session token to its active user.
    pub async fn authenticate(&self, token: &str) -> Result<Option<User>> {
        let Some(session) = self.auth_service.validate_session(token).await? else {
            return Ok(None);
        };
        Ok(self
            .repo
            .find_by_id(session.user_id)
            .await?
            .filter(|user| user.is_active))
    }

    pub async fn get(&self, id: Uuid) -> Result<User> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Approving a plain user also promotes them to seller.
    #[instrument(skip(self, actor), fields(actor_id = %actor.id))]
    pub async fn set_vendor_status(&self, actor: &User, id: Uuid, status: ApprovalStatus) -> Result<User> {
        let before = self.get(id).await?;
        let user = self.repo.update_vendor_status(id, status).await?;
        info!(user_id = %id, status = status.as_str(), "Vendor status updated");

        self.audit_service
            .record(
                Some(actor.id),
                AUDIT_ENTITY,
                Some(id),
                AuditAction::StatusChange,
                snapshot(&before),
                snapshot(&user),
            )
            .await;
        Ok(user)
    }

    /// Creates an account with any role from the admin panel.
    #[instrument(skip(self, actor, request), fields(actor_id = %actor.id, email = %request.account.email))]
    pub async fn admin_create(&self, actor: &User, request: AdminCreateUserRequest) -> Result<User> {
        request.validate()?;
        let role = request.role.unwrap_or(UserRole::User);
        Self::check_role_grant(actor, role)?;

        let hash = AuthService::hash_password(&request.account.password)?;
        let user = self.repo.create(&request.account, &hash, role).await?;
        info!(user_id = %user.id, role = role.as_str(), "User created by admin");

        self.audit_service
            .record(
                Some(actor.id),
                AUDIT_ENTITY,
                Some(user.id),
                AuditAction::Create,
                None,
                snapshot(&user),
            )
            .await;
        Ok(user)
    }

    pub async fn list(&self, filter: &UserFilter, page: PageParams) -> Result<Page<User>> {
        let (users, total) = self.repo.list(filter, page).await?;
        Ok(Page::new(users, total, page))
    }

    /// Applies profile, role and flag changes. A role change is audited as such.
    #[instrument(skip(self, actor, update), fields(actor_id = %actor.id))]
    pub async fn admin_update(
        &self,
        actor: &User,
        id: Uuid,
        update: AdminUpdateUserRequest,
    ) -> Result<User> {
        update.validate()?;
        let before = self.get(id).await?;
        if before.role == UserRole::SuperAdmin {
            Self::check_role_grant(actor, UserRole::SuperAdmin)?;
        }
        if let Some(role) = update.role {
            Self::check_role_grant(actor, role)?;
        }

        let user = self.repo.admin_update(id, &update).await?;
        let action = match update.role {
            Some(role) if role != before.role => AuditAction::RoleChange,
            _ => AuditAction::Update,
        };
        info!(user_id = %id, action = action.as_str(), "User updated by admin");

        self.audit_service
            .record(
                Some(actor.id),
                AUDIT_ENTITY,
                Some(id),
                action,
                snapshot(&before),
                snapshot(&user),
            )
            .await;
        Ok(user)
    }

    /// Only super admins hand out or manage the super admin role.
    fn check_role_grant(actor: &User, role: UserRole) -> Result<()> {
        if role == UserRole::SuperAdmin && actor.role != UserRole::SuperAdmin {
            return Err(AppError::Forbidden(
                "Only super admins can manage super admin accounts".to_string(),
            ));
        }
        Ok(())
    }
}
