//! Registration, credential checks, and the admin bootstrap.

use tracing::{info, instrument, warn};

use crate::auth::password;
use crate::error::PanelError;
use crate::storage::{DatabaseError, PanelDatabase, User};

const MAX_EMAIL_LEN: usize = 120;
const MIN_PASSWORD_LEN: usize = 8;

/// Message shown for any credential mismatch.
pub const LOGIN_FAILED: &str = "Login Unsuccessful. Please check email and password.";

/// Check the registration form fields. Uniqueness is checked separately
/// against the database.
pub fn validate_registration(
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), PanelError> {
    if !is_valid_email(email) {
        return Err(PanelError::Validation("Invalid email address.".into()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(PanelError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters."
        )));
    }
    if password != confirm_password {
        return Err(PanelError::Validation("Passwords must match.".into()));
    }
    Ok(())
}

fn is_valid_email(email: &str) -> bool {
    if email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

/// Create an account and its bot record.
#[instrument(skip(db, password, confirm_password))]
pub async fn register(
    db: &PanelDatabase,
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<User, PanelError> {
    let email = email.trim();
    validate_registration(email, password, confirm_password)?;

    if db.find_user_by_email(email).await?.is_some() {
        return Err(taken());
    }

    let hash = password::hash_password(password)?;
    let (user, bot) = db
        .create_account(email, &hash, false)
        .await
        .map_err(|e| match e {
            // Lost a race with a concurrent registration.
            DatabaseError::Conflict(_) => taken(),
            other => other.into(),
        })?;

    info!(user_id = user.id, bot_id = bot.id, "User registered");
    Ok(user)
}

fn taken() -> PanelError {
    PanelError::Validation("That email is taken. Please choose a different one.".into())
}

/// Check credentials and return the matching user.
#[instrument(skip(db, password))]
pub async fn authenticate(
    db: &PanelDatabase,
    email: &str,
    password: &str,
) -> Result<User, PanelError> {
    let Some(user) = db.find_user_by_email(email.trim()).await? else {
        warn!("Login attempt for unknown email");
        return Err(PanelError::Auth(LOGIN_FAILED.into()));
    };

    if !password::verify_password(password, &user.password_hash)? {
        warn!(user_id = user.id, "Failed login attempt");
        return Err(PanelError::Auth(LOGIN_FAILED.into()));
    }

    Ok(user)
}

/// Outcome of the admin bootstrap command.
#[derive(Debug)]
pub enum AdminBootstrap {
    Created(User),
    AlreadyExists,
}

/// Create the admin account unless one with this email already exists.
pub async fn create_admin(
    db: &PanelDatabase,
    email: &str,
    password: &str,
) -> Result<AdminBootstrap, PanelError> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(PanelError::Validation(
            "ADMIN_EMAIL and ADMIN_PASSWORD must be set".into(),
        ));
    }

    if db.find_user_by_email(email).await?.is_some() {
        info!(email, "Admin user already exists");
        return Ok(AdminBootstrap::AlreadyExists);
    }

    let hash = password::hash_password(password)?;
    match db.create_account(email, &hash, true).await {
        Ok((user, _)) => {
            info!(user_id = user.id, email, "Admin user created");
            Ok(AdminBootstrap::Created(user))
        }
        Err(DatabaseError::Conflict(_)) => Ok(AdminBootstrap::AlreadyExists),
        Err(e) => Err(e.into()),
    }
}
