//! Payload validation.
//!
//! Validators are pure: they take a decoded payload and either return the
//! typed fields a service needs or a [`ValidationError`] describing the first
//! rule that failed.

pub mod account;
pub mod clinic;

pub use account::{
    check_password_policy, normalize_email, validate_login, validate_new_password,
    validate_password_change, validate_register, validate_user_update, Credentials, NewAccount,
    PasswordChange, UserChanges,
};
pub use clinic::{
    parse_consult_date, validate_change_request, validate_consult, validate_doctor,
    validate_patient, ChangeRequestFields, ConsultFields, DoctorFields, PatientFields,
};

use crate::error::{Result, ValidationError};

/// Require a present, non-blank string. Returns it trimmed.
pub(crate) fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ValidationError::new(format!("{} is required", field))),
    }
}

/// `local@domain.tld` with no whitespace and exactly one `@`
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty() && !host.starts_with('.'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_format() {
        assert!(is_valid_email("ana@example.com"));
        assert!(is_valid_email("a.b+c@sub.example.org"));
        assert!(!is_valid_email("ana.example.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ana@example"));
        assert!(!is_valid_email("ana@.com"));
        assert!(!is_valid_email("ana@example."));
        assert!(!is_valid_email("ana @example.com"));
        assert!(!is_valid_email("ana@ex@ample.com"));
    }

    #[test]
    fn test_required_trims() {
        assert_eq!(required(Some("  x "), "Name"), Ok("x"));
        assert_eq!(
            required(Some("   "), "Name").unwrap_err().message,
            "Name is required"
        );
        assert!(required(None, "Name").is_err());
    }
}
