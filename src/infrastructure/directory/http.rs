//! HTTP adapter for the user directory service
//!
//! - `POST {base}/users` creates a user (201 on success)
//! - `GET {base}/users/email/{email}` fetches a user (200 with the record)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use tracing::debug;

use crate::domain::{DirectoryError, NewUser, UserDirectory, UserRecord};

/// User directory reached over HTTP/JSON.
///
/// Every request is bounded by the client timeout; nothing is retried here.
#[derive(Debug, Clone)]
pub struct HttpUserDirectory {
    base_url: Url,
    http: reqwest::Client,
}

impl HttpUserDirectory {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DirectoryError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| DirectoryError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(DirectoryError::InvalidUrl(base_url.to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DirectoryError::Unreachable(e.to_string()))?;

        Ok(Self { base_url, http })
    }

    /// Append path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

fn transport_error(e: reqwest::Error) -> DirectoryError {
    if e.is_timeout() {
        DirectoryError::Timeout
    } else if e.is_decode() {
        DirectoryError::Decode(e.to_string())
    } else {
        DirectoryError::Unreachable(e.to_string())
    }
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    async fn create_user(&self, user: NewUser) -> Result<(), DirectoryError> {
        let url = self.endpoint(&["users"]);
        debug!(%url, email = %user.email, "Creating user in directory");

        let resp = self
            .http
            .post(url)
            .json(&user)
            .send()
            .await
            .map_err(transport_error)?;

        match resp.status() {
            StatusCode::CREATED => Ok(()),
            StatusCode::CONFLICT => Err(DirectoryError::Conflict),
            status => Err(DirectoryError::Rejected {
                status: status.as_u16(),
            }),
        }
    }

    async fn fetch_by_email(&self, email: &str) -> Result<Option<UserRecord>, DirectoryError> {
        let url = self.endpoint(&["users", "email", email]);
        debug!(%url, "Fetching user from directory");

        let resp = self.http.get(url).send().await.map_err(transport_error)?;

        match resp.status() {
            StatusCode::OK => {
                let record = resp
                    .json::<UserRecord>()
                    .await
                    .map_err(|e| DirectoryError::Decode(e.to_string()))?;
                Ok(Some(record))
            }
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(DirectoryError::Rejected {
                status: status.as_u16(),
            }),
        }
    }
}
