//! Form checks that run before any request leaves the page.

use arena_types::LoginRequest;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[error("{}", joined_messages(.0))]
pub struct ValidationError(pub Vec<FieldError>);

fn joined_messages(errors: &[FieldError]) -> String {
    errors.iter().map(|e| e.message).collect::<Vec<_>>().join("; ")
}

pub const MIN_PASSWORD_LEN: usize = 4;

pub fn validate_login(request: &LoginRequest) -> Result<(), ValidationError> {
    let mut errors = Vec::new();

    let email = request.email.trim();
    if email.is_empty() {
        errors.push(FieldError {
            field: "email",
            message: "Email is required",
        });
    } else if !looks_like_email(email) {
        errors.push(FieldError {
            field: "email",
            message: "Enter a valid email address",
        });
    }

    if request.password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(FieldError {
            field: "password",
            message: "Password is too short",
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError(errors))
    }
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.ends_with('.'),
        None => false,
    }
}
