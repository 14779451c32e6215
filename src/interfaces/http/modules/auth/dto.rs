//! Authentication DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::identity::LoginOutcome;
use crate::domain::UserSummary;

pub use crate::domain::{Credentials as LoginRequest, RegistrationRequest as RegisterRequest};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until the token expires
    pub expires_in: i64,
    pub user: UserSummary,
}

impl From<LoginOutcome> for LoginResponse {
    fn from(outcome: LoginOutcome) -> Self {
        Self {
            access_token: outcome.access_token,
            token_type: outcome.token_type,
            expires_in: outcome.expires_in,
            user: outcome.user,
        }
    }
}
