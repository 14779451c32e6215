//! Credential workflow — application-layer orchestration
//!
//! Registration hashes the password and forwards the user to the directory.
//! Login fetches the user, verifies the password and issues an access token.
//! HTTP handlers are thin wrappers around [`CredentialService`].

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};
use validator::Validate;

use crate::domain::{
    Credentials, DomainError, DomainResult, NewUser, RegistrationRequest, UserDirectory,
    UserRecord, UserSummary, DEFAULT_ROLE,
};
use crate::infrastructure::crypto::{PasswordHasher, TokenIssuer};

pub const REGISTER_FIELDS_REQUIRED: &str = "Name, email and password are required";
pub const LOGIN_FIELDS_REQUIRED: &str = "Email and password required";

/// Hashed once per service and verified against when the email is unknown.
const DECOY_PASSWORD: &str = "decoy-password-for-unknown-accounts";

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserSummary,
}

/// Credential service — registration, login and logout.
///
/// Holds only read-only collaborators, so one instance serves any number of
/// concurrent requests.
#[derive(Clone)]
pub struct CredentialService {
    directory: Arc<dyn UserDirectory>,
    hasher: PasswordHasher,
    issuer: TokenIssuer,
    token_ttl: Duration,
    decoy_hash: Arc<OnceCell<String>>,
}

impl CredentialService {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        hasher: PasswordHasher,
        issuer: TokenIssuer,
        token_ttl: Duration,
    ) -> Self {
        Self {
            directory,
            hasher,
            issuer,
            token_ttl,
            decoy_hash: Arc::new(OnceCell::new()),
        }
    }

    // ── Registration ────────────────────────────────────────────

    /// Hash the password and create the user in the directory.
    ///
    /// Every directory failure (duplicate email included) is reported as
    /// [`DomainError::RegistrationFailed`].
    pub async fn register(&self, request: RegistrationRequest) -> DomainResult<()> {
        let invalid = || DomainError::InvalidInput(REGISTER_FIELDS_REQUIRED.into());

        request.validate().map_err(|_| invalid())?;
        let RegistrationRequest {
            name: Some(name),
            email: Some(email),
            password: Some(password),
            role,
        } = request
        else {
            return Err(invalid());
        };

        let role = role
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_ROLE.to_string());

        let password_hash = self.hash(password).await?;

        let new_user = NewUser {
            name,
            email: email.clone(),
            password_hash,
            role,
        };

        match self.directory.create_user(new_user).await {
            Ok(()) => {
                metrics::counter!("auth_registrations_total", "outcome" => "created").increment(1);
                info!(email = %email, "New user registered");
                Ok(())
            }
            Err(e) => {
                metrics::counter!("auth_registrations_total", "outcome" => e.kind()).increment(1);
                warn!(email = %email, kind = e.kind(), error = %e, "Registration rejected");
                Err(DomainError::RegistrationFailed)
            }
        }
    }

    // ── Authentication ──────────────────────────────────────────

    /// Authenticate by email + password and return a signed access token.
    ///
    /// Unknown email, unreachable directory and wrong password all produce
    /// [`DomainError::InvalidCredentials`].
    pub async fn login(&self, credentials: Credentials) -> DomainResult<LoginOutcome> {
        let invalid = || DomainError::InvalidInput(LOGIN_FIELDS_REQUIRED.into());

        credentials.validate().map_err(|_| invalid())?;
        let Credentials {
            email: Some(email),
            password: Some(password),
        } = credentials
        else {
            return Err(invalid());
        };

        let record = match self.directory.fetch_by_email(&email).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                // Unknown accounts pay the same bcrypt cost as a wrong password.
                let decoy = self.decoy_hash().await?;
                self.verify(password, decoy).await?;
                debug!(email = %email, "Login for unknown email");
                return Err(self.reject("unknown_user"));
            }
            Err(e) => {
                warn!(email = %email, kind = e.kind(), error = %e, "Directory lookup failed during login");
                return Err(self.reject(e.kind()));
            }
        };

        if !self.verify(password, record.password_hash.clone()).await? {
            debug!(user_id = record.id, "Login with wrong password");
            return Err(self.reject("wrong_password"));
        }

        let access_token = self.issuer.issue(
            &record.id.to_string(),
            &identity_claims(&record),
            self.token_ttl,
        )?;

        metrics::counter!("auth_logins_total", "outcome" => "success").increment(1);
        info!(user_id = record.id, "User logged in");

        Ok(LoginOutcome {
            access_token,
            token_type: "Bearer".into(),
            expires_in: self.token_ttl.num_seconds(),
            user: UserSummary::from(&record),
        })
    }

    /// Tokens are self-contained; there is no server-side session to drop.
    pub fn logout(&self) {
        debug!("Logout requested; no server-side state to clear");
    }

    // ── Helpers ─────────────────────────────────────────────────

    fn reject(&self, reason: &'static str) -> DomainError {
        metrics::counter!("auth_logins_total", "outcome" => reason).increment(1);
        info!("Login rejected");
        DomainError::InvalidCredentials
    }

    async fn decoy_hash(&self) -> DomainResult<String> {
        self.decoy_hash
            .get_or_try_init(|| self.hash(DECOY_PASSWORD.to_string()))
            .await
            .cloned()
    }

    async fn hash(&self, password: String) -> DomainResult<String> {
        let hasher = self.hasher;
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| DomainError::Hashing(e.to_string()))?
    }

    async fn verify(&self, password: String, password_hash: String) -> DomainResult<bool> {
        let hasher = self.hasher;
        tokio::task::spawn_blocking(move || hasher.verify(&password, &password_hash))
            .await
            .map_err(|e| DomainError::Hashing(e.to_string()))
    }
}

fn identity_claims(record: &UserRecord) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("name".to_string(), record.name.clone()),
        ("email".to_string(), record.email.clone()),
        ("role".to_string(), record.role.clone()),
    ])
}
