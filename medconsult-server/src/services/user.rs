use chrono::Utc;
use medconsult_core::validation::{validate_new_password, validate_password_change, UserChanges};
use medconsult_core::{Pagination, PasswordChangePayload, PublicUser, Role, User};
use medconsult_store::UserRepository;

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::AppState;

const USER_NOT_FOUND: &str = "User not found";

pub struct UserService<'a> {
    state: &'a AppState,
    users: UserRepository<'a>,
}

fn public(users: Vec<User>) -> Vec<PublicUser> {
    users.into_iter().map(PublicUser::from).collect()
}

impl<'a> UserService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self {
            state,
            users: UserRepository::new(&state.store),
        }
    }

    fn load(&self, id: &str) -> Result<User, AppError> {
        self.users
            .find_by_id(id)?
            .ok_or_else(|| AppError::not_found(USER_NOT_FOUND))
    }

    pub fn list(&self, page: Pagination) -> Result<Vec<PublicUser>, AppError> {
        Ok(public(self.users.list(page)?))
    }

    pub fn list_by_name(&self, name: &str, page: Pagination) -> Result<Vec<PublicUser>, AppError> {
        Ok(public(self.users.list_by_name(name, page)?))
    }

    pub fn list_by_role(&self, role: Role, page: Pagination) -> Result<Vec<PublicUser>, AppError> {
        Ok(public(self.users.list_by_role(role, page)?))
    }

    pub fn get_by_id(&self, id: &str) -> Result<PublicUser, AppError> {
        self.load(id).map(PublicUser::from)
    }

    pub fn get_by_email(&self, email: &str) -> Result<PublicUser, AppError> {
        self.users
            .find_by_email(email)?
            .map(PublicUser::from)
            .ok_or_else(|| AppError::not_found(USER_NOT_FOUND))
    }

    /// Partial profile update. Callers other than root may only edit
    /// themselves and may not change roles.
    pub fn update(
        &self,
        actor: &AuthUser,
        id: &str,
        changes: UserChanges,
    ) -> Result<PublicUser, AppError> {
        if !actor.is_root() && actor.id != id {
            return Err(AppError::forbidden("You can only update your own account"));
        }
        if changes.is_empty() {
            return Err(AppError::Validation("No fields to update".to_string()));
        }
        if changes.role.is_some() && !actor.is_root() {
            return Err(AppError::forbidden("Only root can change roles"));
        }

        let mut user = self.load(id)?;

        if let Some(email) = changes.email {
            if email != user.email
                && self
                    .users
                    .find_by_email(&email)?
                    .is_some_and(|other| other.id != user.id)
            {
                return Err(AppError::conflict("Email already registered"));
            }
            user.email = email;
        }
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        user.updated_at = Utc::now();

        if !self.users.update(&user)? {
            return Err(AppError::not_found(USER_NOT_FOUND));
        }
        tracing::info!(user_id = %user.id, actor = %actor.id, "User updated");
        Ok(user.into())
    }

    pub fn delete(&self, id: &str) -> Result<PublicUser, AppError> {
        let user = self
            .users
            .delete(id)?
            .ok_or_else(|| AppError::not_found(USER_NOT_FOUND))?;
        tracing::info!(user_id = %user.id, "User deleted");
        Ok(user.into())
    }

    /// Change a password. Users changing their own password must present the
    /// current one; root resetting someone else's password skips that check.
    pub async fn change_password(
        &self,
        actor: &AuthUser,
        id: &str,
        payload: &PasswordChangePayload,
    ) -> Result<(), AppError> {
        if !actor.is_root() && actor.id != id {
            return Err(AppError::forbidden(
                "You can only change your own password",
            ));
        }

        let mut user = self.load(id)?;
        let admin_override = actor.is_root() && actor.id != id;

        let new_password = if admin_override {
            validate_new_password(payload, &user.name, &user.email)?
        } else {
            let change = validate_password_change(payload, &user.name, &user.email)?;
            let matches = self
                .state
                .passwords
                .verify(change.current_password, user.password_hash.clone())
                .await?;
            if !matches {
                return Err(AppError::unauthorized("Current password is incorrect"));
            }
            change.new_password
        };

        user.password_hash = self.state.passwords.hash(new_password).await?;
        user.updated_at = Utc::now();
        if !self.users.update(&user)? {
            return Err(AppError::not_found(USER_NOT_FOUND));
        }
        tracing::info!(user_id = %user.id, admin_override, "Password changed");
        Ok(())
    }
}
