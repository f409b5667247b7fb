use super::types::*;
use crate::config::EndpointConfig;
use crate::error::{CopilotError, Result};
use std::path::Path;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the backend's stateless REST endpoints. Each call is an
/// independent request/response exchange, separate from the chat socket.
pub struct ApiClient {
    client: reqwest::Client,
    api_root: String,
}

impl ApiClient {
    pub fn new(config: &EndpointConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CopilotError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_root: config.api_root(),
        })
    }

    pub async fn health(&self) -> Result<HealthReply> {
        let url = format!("{}/health", self.api_root);
        let response = self.client.get(&url).send().await?;
        Self::parse(response).await
    }

    /// Persist database settings on the backend.
    pub async fn save_db_config(&self, config: &DatabaseConfig) -> Result<StatusReply> {
        let url = format!("{}/config", self.api_root);
        let response = self.client.post(&url).json(config).send().await?;
        Self::parse(response).await
    }

    /// Probe a database config without saving it.
    pub async fn test_db_config(&self, config: &DatabaseConfig) -> Result<StatusReply> {
        let url = format!("{}/config/test", self.api_root);
        let response = self.client.post(&url).json(config).send().await?;
        Self::parse(response).await
    }

    pub async fn list_tables(&self) -> Result<TablesReply> {
        let url = format!("{}/tables", self.api_root);
        let response = self.client.get(&url).send().await?;
        Self::parse(response).await
    }

    /// Upload a local file for ETL import.
    pub async fn upload(&self, path: &Path) -> Result<UploadReply> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                CopilotError::Config(format!("'{}' has no usable file name", path.display()))
            })?
            .to_string();
        let bytes = tokio::fs::read(path).await?;

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new().part("file", part);

        let url = format!("{}/upload", self.api_root);
        let response = self.client.post(&url).multipart(form).send().await?;
        Self::parse(response).await
    }

    async fn parse<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(CopilotError::Api(format!(
                "API request failed with status {}: {}",
                status, error_text
            )));
        }
        Ok(response.json::<T>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        // Nothing listens on this endpoint.
        ApiClient::new(&EndpointConfig::new("http://127.0.0.1:1")).unwrap()
    }

    #[tokio::test]
    async fn test_upload_rejects_path_without_file_name() {
        let result = client().upload(Path::new("/")).await;
        assert!(matches!(result, Err(CopilotError::Config(_))));
    }

    #[tokio::test]
    async fn test_upload_of_missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = client().upload(&dir.path().join("absent.csv")).await;
        assert!(matches!(result, Err(CopilotError::Io(_))));
    }

    #[tokio::test]
    async fn test_unreachable_backend_surfaces_as_http_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.csv");
        tokio::fs::write(&path, "id,amount\n1,10\n").await.unwrap();

        let result = client().upload(&path).await;
        assert!(matches!(result, Err(CopilotError::Http(_))));
    }
}
