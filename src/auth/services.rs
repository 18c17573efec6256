use thiserror::Error;
use tracing::{info, warn};

use crate::auth::{
    dto::SignupForm,
    password::{check_policy, hash_password, verify_password, PolicyViolation},
    repo::UserRepo,
    repo_types::User,
};

#[derive(Debug, Error)]
pub enum SignupError {
    #[error(transparent)]
    Policy(#[from] PolicyViolation),
    #[error("Username already exists.")]
    UsernameTaken,
    #[error("Email already registered.")]
    EmailTaken,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl SignupError {
    /// Rejections shown back on the signup form, as opposed to server faults.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, SignupError::Internal(_))
    }
}

/// Validates and persists a new user. Nothing is written unless every check passes.
pub async fn signup(users: &dyn UserRepo, form: &SignupForm) -> Result<User, SignupError> {
    check_policy(&form.password, &form.confirm_password)?;

    if users.find_by_username(&form.username).await?.is_some() {
        return Err(SignupError::UsernameTaken);
    }
    if users.find_by_email(&form.email).await?.is_some() {
        return Err(SignupError::EmailTaken);
    }

    let hash = hash_password(&form.password)?;
    let user = users.create(&form.username, &form.email, &hash).await?;
    info!(user_id = user.id, username = %user.username, "user registered");
    Ok(user)
}

/// `Ok(None)` for both unknown usernames and wrong passwords.
pub async fn authenticate(
    users: &dyn UserRepo,
    username: &str,
    password: &str,
) -> anyhow::Result<Option<User>> {
    let Some(user) = users.find_by_username(username).await? else {
        warn!(%username, "login unknown username");
        return Ok(None);
    };
    if !verify_password(password, &user.password_hash)? {
        warn!(%username, user_id = user.id, "login invalid password");
        return Ok(None);
    }
    Ok(Some(user))
}
