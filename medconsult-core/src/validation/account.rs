//! Registration, login, profile and password rules

use super::{is_valid_email, required};
use crate::error::{Result, ValidationError};
use crate::model::Role;
use crate::payload::{LoginPayload, PasswordChangePayload, RegisterPayload, UserUpdatePayload};

const MIN_PASSWORD_LEN: usize = 12;
const MIN_AGE: f64 = 1.0;
const MAX_AGE: f64 = 150.0;

/// Validated registration fields
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub name: String,
    /// Lower-cased and trimmed
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Partial profile update. Every field is optional; the caller decides
/// whether an empty change set is acceptable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.role.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn parse_role(role: &str) -> Result<Role> {
    role.trim().parse().map_err(ValidationError::new)
}

fn email_field(value: Option<&str>) -> Result<String> {
    let email = required(value, "Email")?;
    if !is_valid_email(email) {
        return Err(ValidationError::new("Invalid email format"));
    }
    Ok(normalize_email(email))
}

pub fn validate_register(payload: &RegisterPayload) -> Result<NewAccount> {
    let name = required(payload.name.as_deref(), "Name")?;
    let email = email_field(payload.email.as_deref())?;
    let password = payload
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ValidationError::new("Password is required"))?;
    check_password_policy(password, name, &email)?;

    let role = parse_role(required(payload.role.as_deref(), "Role")?)?;
    match role {
        Role::Doctor => {
            required(payload.specialty.as_deref(), "Specialty")?;
        }
        Role::Client => match payload.age {
            Some(age) if (MIN_AGE..=MAX_AGE).contains(&age) => {}
            _ => {
                return Err(ValidationError::new(
                    "Age must be a number between 1 and 150",
                ));
            }
        },
        Role::Root | Role::Employee => {}
    }

    Ok(NewAccount {
        name: name.to_string(),
        email,
        password: password.to_string(),
        role,
    })
}

pub fn validate_login(payload: &LoginPayload) -> Result<Credentials> {
    let email = email_field(payload.email.as_deref())?;
    let password = payload
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ValidationError::new("Password is required"))?;
    Ok(Credentials {
        email,
        password: password.to_string(),
    })
}

pub fn validate_user_update(payload: &UserUpdatePayload) -> Result<UserChanges> {
    let name = match payload.name.as_deref() {
        Some(name) => Some(required(Some(name), "Name")?.to_string()),
        None => None,
    };
    let email = match payload.email.as_deref() {
        Some(email) => Some(email_field(Some(email))?),
        None => None,
    };
    let role = payload.role.as_deref().map(parse_role).transpose()?;
    Ok(UserChanges { name, email, role })
}

/// Validate a self-service password change for the account `name`/`email`.
pub fn validate_password_change(
    payload: &PasswordChangePayload,
    name: &str,
    email: &str,
) -> Result<PasswordChange> {
    let current = payload
        .current_password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ValidationError::new("Current password is required"))?;
    let new = validate_new_password(payload, name, email)?;
    if current == new {
        return Err(ValidationError::new(
            "New password must be different from the current password",
        ));
    }
    Ok(PasswordChange {
        current_password: current.to_string(),
        new_password: new,
    })
}

/// Validate only the new password of a change payload (administrative reset).
pub fn validate_new_password(
    payload: &PasswordChangePayload,
    name: &str,
    email: &str,
) -> Result<String> {
    let new = payload
        .new_password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ValidationError::new("New password is required"))?;
    check_password_policy(new, name, email)?;
    Ok(new.to_string())
}

/// Strength policy shared by registration and password changes: at least
/// twelve characters with upper, lower, digit and a special character (space
/// counts), and no trace of the owner's name or email local part.
pub fn check_password_policy(password: &str, name: &str, email: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::new(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        )));
    }

    let has_upper = password.chars().any(char::is_uppercase);
    let has_lower = password.chars().any(char::is_lowercase);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| !c.is_alphanumeric());
    if !(has_upper && has_lower && has_digit && has_special) {
        return Err(ValidationError::new(
            "Password must contain uppercase and lowercase letters, a number and a special character",
        ));
    }

    let lowered = password.to_lowercase();
    let name = name.trim().to_lowercase();
    let local_part = email
        .split('@')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();

    let mut personal: Vec<&str> = name.split_whitespace().filter(|p| p.len() >= 3).collect();
    if !name.is_empty() {
        personal.push(&name);
    }
    if !local_part.is_empty() {
        personal.push(&local_part);
    }
    if personal.iter().any(|p| lowered.contains(p)) {
        return Err(ValidationError::new(
            "Password must not contain your name or email",
        ));
    }

    Ok(())
}
