//! Authentication API handlers

use axum::{extract::State, http::StatusCode, Json};

use super::dto::{LoginRequest, LoginResponse, RegisterRequest};
use crate::application::identity::CredentialService;
use crate::domain::DomainError;
use crate::interfaces::http::common::{ErrorResponse, JsonBody, MessageResponse};

/// Auth state
#[derive(Clone)]
pub struct AuthHandlerState {
    pub service: CredentialService,
}

#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = MessageResponse),
        (status = 400, description = "Missing fields or directory rejected the user", body = ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AuthHandlerState>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), DomainError> {
    state.service.register(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Successful login", body = LoginResponse),
        (status = 400, description = "Missing fields", body = ErrorResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AuthHandlerState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, DomainError> {
    let outcome = state.service.login(request).await?;
    Ok(Json(outcome.into()))
}

#[utoipa::path(
    delete,
    path = "/auth/logout",
    tag = "Authentication",
    responses(
        (status = 200, description = "Nothing to clear server-side", body = String)
    )
)]
pub async fn logout(State(state): State<AuthHandlerState>) -> (StatusCode, &'static str) {
    state.service.logout();
    (StatusCode::OK, "JWT token cleared")
}
