use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use super::{
    dto::{SignInRequest, SignUpRequest},
    jwt::IssuedToken,
    password::{hash_password, verify_password},
    repo_types::User,
};
use crate::{
    error::{AppError, AppResult, FieldError},
    state::AppState,
};

const NAME_MAX_CHARS: usize = 50;
const PASSWORD_MIN_CHARS: usize = 6;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Sign-up input after boundary validation.
#[derive(Debug)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
}

pub fn validate_sign_up(req: SignUpRequest) -> AppResult<NewAccount> {
    let name = req.name.as_deref().map(str::trim).unwrap_or_default();
    let email = req.email.as_deref().map(normalize_email).unwrap_or_default();
    let password = req.password.unwrap_or_default();

    if name.is_empty() || email.is_empty() || password.is_empty() {
        return Err(AppError::invalid("body", "Name, email and password are required"));
    }

    let mut errors = Vec::new();
    if name.chars().count() > NAME_MAX_CHARS {
        errors.push(FieldError::new("name", "Name must be at most 50 characters"));
    }
    if !is_valid_email(&email) {
        errors.push(FieldError::new("email", "Invalid email"));
    }
    if password.chars().count() < PASSWORD_MIN_CHARS {
        errors.push(FieldError::new("password", "Password must be at least 6 characters"));
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    Ok(NewAccount {
        name: name.to_string(),
        email,
        password,
    })
}

pub async fn register(state: &AppState, account: NewAccount) -> AppResult<User> {
    if state.users.find_by_email(&account.email).await?.is_some() {
        warn!(email = %account.email, "email already registered");
        return Err(AppError::Conflict("Email already registered"));
    }

    let hash = hash_password(account.password).await?;

    // The unique index still decides when two sign-ups race.
    let user = state
        .users
        .insert(&account.name, &account.email, &hash)
        .await?
        .ok_or(AppError::Conflict("Email already registered"))?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(user)
}

/// Checks credentials and opens a new session. No session is written unless
/// the password matches.
pub async fn sign_in(state: &AppState, req: SignInRequest) -> AppResult<(User, IssuedToken)> {
    let email = req.email.as_deref().map(normalize_email).unwrap_or_default();
    let password = req.password.unwrap_or_default();

    if email.is_empty() || password.is_empty() {
        return Err(AppError::invalid("body", "Email and password are required"));
    }
    if !is_valid_email(&email) {
        return Err(AppError::invalid("email", "Invalid email"));
    }

    let Some(user) = state.users.find_by_email(&email).await? else {
        warn!(email = %email, "sign-in unknown email");
        return Err(AppError::Authentication("Invalid email or password"));
    };

    if !verify_password(password, user.password_hash.clone()).await? {
        warn!(email = %email, user_id = %user.id, "sign-in invalid password");
        return Err(AppError::Authentication("Invalid email or password"));
    }

    let issued = state.tokens.issue(user.id)?;
    state
        .sessions
        .create(user.id, &issued.token, issued.expires)
        .await?;

    info!(user_id = %user.id, "user signed in");
    Ok((user, issued))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign_up(name: &str, email: &str, password: &str) -> SignUpRequest {
        SignUpRequest {
            name: Some(name.into()),
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }

    #[test]
    fn email_pattern() {
        assert!(is_valid_email("budi@test.com"));
        assert!(!is_valid_email("budi@test"));
        assert!(!is_valid_email("budi test@x.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn sign_up_normalizes_email_and_name() {
        let account = validate_sign_up(sign_up("  Budi ", " Budi@Test.COM ", "secret123"))
            .expect("valid");
        assert_eq!(account.name, "Budi");
        assert_eq!(account.email, "budi@test.com");
    }

    #[test]
    fn sign_up_requires_all_fields() {
        let err = validate_sign_up(SignUpRequest {
            name: Some("Budi".into()),
            email: None,
            password: Some("secret123".into()),
        })
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn sign_up_collects_every_field_error() {
        let err = validate_sign_up(sign_up(&"x".repeat(51), "nope", "123")).unwrap_err();
        let AppError::Validation(fields) = err else {
            panic!("expected validation error");
        };
        let names: Vec<_> = fields.iter().map(|f| f.field).collect();
        assert_eq!(names, vec!["name", "email", "password"]);
    }
}
