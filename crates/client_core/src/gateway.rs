use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::{Matter, MatterId, MatterStatus},
    protocol::{matter_status_route, matters_route, UpdateMatterStatusRequest},
};
use tracing::{debug, warn};
use url::Url;

use crate::error::GatewayError;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Persists a single matter's status. Implementations must not touch any
/// other field, and callers never retry.
#[async_trait]
pub trait StatusPersistenceGateway: Send + Sync {
    async fn update_status(
        &self,
        matter_id: MatterId,
        status: MatterStatus,
    ) -> Result<(), GatewayError>;
}

/// Talks to the matters API over HTTP.
#[derive(Clone)]
pub struct HttpMatterGateway {
    http: Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpMatterGateway {
    pub fn new(server_url: &str) -> Result<Self, GatewayError> {
        Self::with_timeout(server_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(server_url: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let mut base_url = Url::parse(server_url.trim())
            .map_err(|e| GatewayError::InvalidUrl(format!("{server_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::InvalidUrl(server_url.to_string()));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url,
            timeout,
        })
    }

    /// `GET /api/matters`, the source the board store is loaded from.
    pub async fn list_matters(&self) -> Result<Vec<Matter>, GatewayError> {
        let url = self.endpoint(matters_route())?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Http {
                status: status.as_u16(),
            });
        }
        response
            .json::<Vec<Matter>>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }

    fn endpoint(&self, route: &str) -> Result<Url, GatewayError> {
        self.base_url
            .join(route.trim_start_matches('/'))
            .map_err(|e| GatewayError::InvalidUrl(e.to_string()))
    }

    fn request_error(&self, err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Timeout(self.timeout)
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl StatusPersistenceGateway for HttpMatterGateway {
    async fn update_status(
        &self,
        matter_id: MatterId,
        status: MatterStatus,
    ) -> Result<(), GatewayError> {
        let url = self.endpoint(&matter_status_route(matter_id.0))?;
        let response = self
            .http
            .put(url)
            .json(&UpdateMatterStatusRequest { status })
            .send()
            .await
            .map_err(|e| {
                let error = self.request_error(e);
                warn!(matter_id = %matter_id, %status, %error, "status update did not reach the server");
                error
            })?;

        let code = response.status();
        if !code.is_success() {
            warn!(matter_id = %matter_id, %status, http_status = code.as_u16(), "status update rejected");
            return Err(GatewayError::Http {
                status: code.as_u16(),
            });
        }
        debug!(matter_id = %matter_id, %status, "status update accepted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
