use reqwest::{header::CONTENT_TYPE, Client};
use std::time::Duration;
use url::Url;

use crate::facade::{ActionLogger, LogActionParams, LogError};

pub const AUDIT_LOGS_PATH: &str = "/api/audit-logs";

#[derive(Clone)]
pub struct HttpActionLogger {
    client: Client,
    endpoint: Url,
}

impl HttpActionLogger {
    pub fn new(endpoint: Url) -> Result<Self, LogError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self::with_client(client, endpoint))
    }

    pub fn for_base_url(base_url: &str) -> Result<Self, LogError> {
        let endpoint = Url::parse(base_url)?.join(AUDIT_LOGS_PATH)?;
        Self::new(endpoint)
    }

    pub fn with_client(client: Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl ActionLogger for HttpActionLogger {
    async fn try_log(&self, params: &LogActionParams) -> Result<(), LogError> {
        let body = serde_json::to_vec(params)?;
        let resp = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(LogError::Status(status.as_u16()))
        }
    }
}
