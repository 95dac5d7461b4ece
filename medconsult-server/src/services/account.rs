use chrono::Utc;
use medconsult_core::validation::{check_password_policy, normalize_email, Credentials, NewAccount};
use medconsult_core::{PublicUser, Role, User};
use medconsult_store::UserRepository;

use super::new_id;
use crate::config::BootstrapRoot;
use crate::error::AppError;
use crate::AppState;

/// Same message for unknown email and wrong password
const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub struct AuthService<'a> {
    state: &'a AppState,
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self {
            state,
            users: UserRepository::new(&state.store),
        }
    }

    /// Create the account and issue its first token
    pub async fn register(&self, account: NewAccount) -> Result<(PublicUser, String), AppError> {
        if self.users.find_by_email(&account.email)?.is_some() {
            return Err(AppError::conflict("Email already registered"));
        }

        let password_hash = self.state.passwords.hash(account.password).await?;
        let now = Utc::now();
        let user = User {
            id: new_id(),
            name: account.name,
            email: account.email,
            password_hash,
            role: account.role,
            created_at: now,
            updated_at: now,
        };
        // The unique index catches a registration racing past the check above
        self.users.create(&user)?;

        let token = self.state.tokens.issue(&user.id, user.role)?;
        tracing::info!(user_id = %user.id, role = %user.role, "User registered");
        Ok((user.into(), token))
    }

    pub async fn login(&self, credentials: Credentials) -> Result<(PublicUser, String), AppError> {
        let Some(user) = self.users.find_by_email(&credentials.email)? else {
            tracing::warn!("Login failed: unknown email");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        };

        let matches = self
            .state
            .passwords
            .verify(credentials.password, user.password_hash.clone())
            .await?;
        if !matches {
            tracing::warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        let token = self.state.tokens.issue(&user.id, user.role)?;
        tracing::info!(user_id = %user.id, role = %user.role, "User logged in");
        Ok((user.into(), token))
    }

    /// Create the configured root account unless its email is taken.
    /// Returns true if an account was created.
    pub async fn ensure_root(&self, root: &BootstrapRoot) -> Result<bool, AppError> {
        let email = normalize_email(&root.email);
        if self.users.find_by_email(&email)?.is_some() {
            return Ok(false);
        }
        check_password_policy(&root.password, &root.name, &email)?;

        let account = NewAccount {
            name: root.name.trim().to_string(),
            email,
            password: root.password.clone(),
            role: Role::Root,
        };
        let (user, _) = self.register(account).await?;
        tracing::info!(user_id = %user.id, "Bootstrap root account created");
        Ok(true)
    }
}
