//! Account handlers: register, login, and the caller's profile.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{Envelope, LoginRequest, RegisterRequest, UpdateProfileRequest};
use crate::api::extract::{ApiJson, AuthUser};
use crate::app_state::AppState;
use crate::domain::User;
use crate::error::{ApiError, ErrorResponse};
use crate::service::AuthSession;

/// `POST /auth/register`: Create an account.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] for bad input and
/// [`ApiError::Conflict`] for a taken email.
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Auth",
    summary = "Register",
    description = "Creates a `user` account and returns it with a bearer token.",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = Envelope<AuthSession>),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.auth.register(req.into()).await?;
    Ok((StatusCode::CREATED, Json(Envelope::new(session))))
}

/// `POST /auth/login`: Exchange credentials for a token.
///
/// # Errors
///
/// Returns [`ApiError::Unauthorized`] when the credentials do not match.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    summary = "Log in",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = Envelope<AuthSession>),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.auth.login(&req.email, &req.password).await?;
    Ok(Json(Envelope::new(session)))
}

/// `GET /auth/profile`: The caller's account.
///
/// # Errors
///
/// Returns [`ApiError::Unauthorized`] without a valid token.
#[utoipa::path(
    get,
    path = "/auth/profile",
    tag = "Auth",
    summary = "Current profile",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Profile", body = Envelope<User>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn profile(AuthUser(user): AuthUser) -> Json<Envelope<User>> {
    Json(Envelope::new(user))
}

/// `PATCH /auth/profile`: Edit the caller's account.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] for bad input.
#[utoipa::path(
    patch,
    path = "/auth/profile",
    tag = "Auth",
    summary = "Update profile",
    security(("bearer" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = Envelope<User>),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.auth.update_profile(user.id, req.into()).await?;
    Ok(Json(Envelope::new(user)))
}

/// Account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/profile", get(profile).patch(update_profile))
}
