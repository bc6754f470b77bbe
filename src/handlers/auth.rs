// src/handlers/auth.rs

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::user::{DeleteUserRequest, GoogleAuthRequest, LoginRequest, SignupRequest},
    store::{DynStore, NewUser},
    utils::{
        hash::{hash_password, verify_password},
        jwt::sign_jwt,
    },
};

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing it.
/// Returns the user object (excluding password).
pub async fn signup(
    State(store): State<DynStore>,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (Some(email), Some(password)) = (payload.email.as_deref(), payload.password.as_deref())
    else {
        return Err(AppError::BadRequest(
            "Email and password required".to_string(),
        ));
    };

    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let hashed_password = hash_password(password)?;

    let user = store
        .create_user(NewUser {
            email: email.to_string(),
            name: payload.name.clone(),
            password: Some(hashed_password),
            google_id: None,
        })
        .await?;

    Ok(Json(json!({
        "message": "User registered successfully",
        "user": user
    })))
}

/// Authenticates a user and returns a JWT token.
///
/// Verifies the email and password against the store. Accounts created
/// through Google auth carry no password and cannot log in this way.
pub async fn login(
    State(store): State<DynStore>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (Some(email), Some(password)) = (payload.email.as_deref(), payload.password.as_deref())
    else {
        return Err(AppError::BadRequest(
            "Email and password required".to_string(),
        ));
    };

    let user = store
        .user_by_email(email)
        .await?
        .ok_or(AppError::BadRequest("User not found".to_string()))?;

    let Some(stored_hash) = user.password.as_deref() else {
        return Err(AppError::BadRequest("Invalid login method".to_string()));
    };

    let is_valid = verify_password(password, stored_hash)?;

    if !is_valid {
        return Err(AppError::BadRequest("Invalid credentials".to_string()));
    }

    let token = sign_jwt(
        user.id,
        &user.email,
        &config.jwt_secret,
        config.jwt_expiration,
    )?;

    Ok(Json(json!({
        "message": "Login successful",
        "token": token
    })))
}

/// Signs a user in through a Google identity.
///
/// Creates the account when the email is new (no password, googleId set);
/// links the googleId onto an existing password account the first time;
/// otherwise uses the account as-is. Issues a JWT either way.
pub async fn google_auth(
    State(store): State<DynStore>,
    State(config): State<Config>,
    Json(payload): Json<GoogleAuthRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (Some(email), Some(google_id)) =
        (payload.email.as_deref(), payload.google_id.as_deref())
    else {
        return Err(AppError::BadRequest(
            "Email and Google ID required".to_string(),
        ));
    };

    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user = match store.user_by_email(email).await? {
        None => {
            store
                .create_user(NewUser {
                    email: email.to_string(),
                    name: payload.name.clone(),
                    password: None,
                    google_id: Some(google_id.to_string()),
                })
                .await?
        }
        Some(user) if user.google_id.is_none() => store.link_google_id(user.id, google_id).await?,
        Some(user) => user,
    };

    let token = sign_jwt(
        user.id,
        &user.email,
        &config.jwt_secret,
        config.jwt_expiration,
    )?;

    Ok(Json(json!({
        "message": "Login successful",
        "user": user,
        "token": token
    })))
}

/// Deletes a user account by email.
///
/// Attempts, answers, statistics and favorites go with it via cascade.
/// Returns the removed user.
pub async fn delete_user(
    State(store): State<DynStore>,
    Json(payload): Json<DeleteUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let Some(email) = payload.email.as_deref() else {
        return Err(AppError::BadRequest("Email is required".to_string()));
    };

    let user = store
        .delete_user_by_email(email)
        .await?
        .ok_or(AppError::NotFound("User does not exist".to_string()))?;

    Ok(Json(json!({
        "message": "User deleted successfully",
        "user": user
    })))
}
