//! Service runtime.
//!
//! [`ServerHandle`] wires the credential workflow to its collaborators,
//! binds the HTTP listener and owns graceful shutdown. The CLI binary and the
//! integration tests both start the service through it.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use secrecy::ExposeSecret;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::application::identity::CredentialService;
use crate::config::{DirectoryTarget, LoggingSection, Profile, RuntimeSettings, DEV_JWT_SECRET};
use crate::domain::{DirectoryError, DomainError, UserDirectory};
use crate::infrastructure::crypto::{PasswordHasher, TokenIssuer};
use crate::infrastructure::directory::{HttpUserDirectory, InMemoryUserDirectory};
use crate::interfaces::http::create_api_router;
use crate::support::shutdown::{listen_for_shutdown_signals, ShutdownSignal};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to set up the user directory: {0}")]
    Directory(#[from] DirectoryError),

    #[error("failed to set up token signing: {0}")]
    Token(#[from] DomainError),

    #[error("failed to install the metrics recorder: {0}")]
    Metrics(String),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },
}

/// The global metrics recorder can only be installed once per process, so a
/// restart within the same process reuses the first handle.
fn prometheus_handle() -> Result<PrometheusHandle, ServerError> {
    static PROM_HANDLE: OnceLock<Result<PrometheusHandle, String>> = OnceLock::new();

    PROM_HANDLE
        .get_or_init(|| {
            let handle = PrometheusBuilder::new()
                .install_recorder()
                .map_err(|e| e.to_string())?;
            info!("Prometheus metrics recorder installed");
            Ok(handle)
        })
        .clone()
        .map_err(ServerError::Metrics)
}

/// Build the credential workflow with the collaborators named in `settings`.
pub fn build_credential_service(settings: &RuntimeSettings) -> Result<CredentialService, ServerError> {
    let directory: Arc<dyn UserDirectory> = match &settings.directory {
        DirectoryTarget::Http { base_url, timeout } => {
            info!(%base_url, timeout_secs = timeout.as_secs(), "Using HTTP user directory");
            Arc::new(HttpUserDirectory::new(base_url, *timeout)?)
        }
        DirectoryTarget::InMemory => {
            warn!("Using in-memory user directory; users are lost on restart");
            Arc::new(InMemoryUserDirectory::new())
        }
    };

    if settings.profile == Profile::Development
        && settings.jwt_secret.expose_secret() == DEV_JWT_SECRET
    {
        warn!("Signing tokens with the development secret; never use this profile in production");
    }

    let issuer = TokenIssuer::new(&settings.jwt_secret, settings.issuer.clone())?;
    info!(
        "JWT configured with {}m token expiration",
        settings.token_ttl.num_minutes()
    );

    Ok(CredentialService::new(
        directory,
        PasswordHasher::new(settings.bcrypt_cost),
        issuer,
        settings.token_ttl,
    ))
}

/// Handle to a running service.
pub struct ServerHandle {
    /// Address the listener is bound to (resolved when port 0 was requested).
    pub address: SocketAddr,
    shutdown: ShutdownSignal,
    shutdown_timeout: Duration,
    api_task: JoinHandle<()>,
}

impl ServerHandle {
    /// Install metrics, build the workflow and start serving HTTP.
    pub async fn start(settings: RuntimeSettings) -> Result<Self, ServerError> {
        info!("Starting authentication service ({:?} profile)...", settings.profile);

        let metrics_handle = prometheus_handle()?;
        let service = build_credential_service(&settings)?;
        let router = create_api_router(service, metrics_handle);

        let address = settings.address();
        let listener = tokio::net::TcpListener::bind(&address)
            .await
            .map_err(|source| ServerError::Bind {
                address: address.clone(),
                source,
            })?;
        let address = listener.local_addr().map_err(|source| ServerError::Bind {
            address,
            source,
        })?;
        info!("HTTP server listening on http://{}", address);
        info!("Swagger UI available at http://{}/docs/", address);

        let shutdown = ShutdownSignal::new();
        let api_shutdown = shutdown.clone();

        let api_task = tokio::spawn(async move {
            let server = axum::serve(listener, router).with_graceful_shutdown(async move {
                api_shutdown.wait().await;
                info!("HTTP server received shutdown signal");
            });
            if let Err(e) = server.await {
                error!("HTTP server error: {}", e);
            }
        });

        Ok(Self {
            address,
            shutdown,
            shutdown_timeout: Duration::from_secs(settings.shutdown_timeout),
            api_task,
        })
    }

    /// Trigger shutdown on SIGTERM / SIGINT.
    pub fn install_signal_handler(&self) {
        tokio::spawn(listen_for_shutdown_signals(self.shutdown.clone()));
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.trigger();
    }

    /// Wait until the server stops, giving in-flight requests up to the
    /// configured shutdown timeout once shutdown has been triggered.
    pub async fn wait(self) {
        let mut api_task = self.api_task;

        tokio::select! {
            result = &mut api_task => {
                if let Err(e) = result {
                    error!("HTTP server task panicked: {}", e);
                }
                return;
            }
            _ = self.shutdown.wait() => {}
        }

        match tokio::time::timeout(self.shutdown_timeout, &mut api_task).await {
            Ok(Ok(())) => info!("HTTP server stopped"),
            Ok(Err(e)) => error!("HTTP server task panicked: {}", e),
            Err(_) => {
                warn!(
                    "Graceful shutdown timed out after {}s; aborting",
                    self.shutdown_timeout.as_secs()
                );
                api_task.abort();
            }
        }

        info!("Authentication service shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        self.trigger_shutdown();
        self.wait().await;
    }
}

/// Initialize tracing (logging) from the logging config.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(logging: &LoggingSection) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    match logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}
