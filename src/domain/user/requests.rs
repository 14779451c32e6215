use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

/// Registration input. Every field is optional on the wire so a missing field
/// surfaces as a validation failure instead of a JSON rejection.
#[derive(Debug, Default, Clone, Deserialize, Validate, ToSchema)]
pub struct RegistrationRequest {
    #[validate(required, length(min = 1))]
    pub name: Option<String>,
    #[validate(required, length(min = 1))]
    pub email: Option<String>,
    #[validate(required, length(min = 1))]
    pub password: Option<String>,
    /// Defaults to `customer`.
    pub role: Option<String>,
}

/// Login input.
#[derive(Debug, Default, Clone, Deserialize, Validate, ToSchema)]
pub struct Credentials {
    #[validate(required, length(min = 1))]
    pub email: Option<String>,
    #[validate(required, length(min = 1))]
    pub password: Option<String>,
}
