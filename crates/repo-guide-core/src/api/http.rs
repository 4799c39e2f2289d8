use futures_util::StreamExt;
use reqwest::Client;
use tracing::info;

use super::{Backend, ChunkStream};
use crate::error::ClientError;
use crate::protocol::AnswerRecord;

#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Use a preconfigured client (proxy, TLS or timeout settings).
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Backend for HttpBackend {
    async fn analyze(&self, github_url: &str) -> Result<ChunkStream, ClientError> {
        let url = format!("{}/analyze", self.base_url);
        info!(%url, github_url, "submitting repository for analysis");

        let response = self
            .client
            .post(&url)
            .form(&[("github_url", github_url)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::Status(response.status().as_u16()));
        }

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(ClientError::from))
            .boxed())
    }

    async fn ask(&self, question: &str) -> Result<AnswerRecord, ClientError> {
        let url = format!("{}/ask", self.base_url);
        info!(%url, "asking question");

        // The status code is not checked here: the body decides.
        let response = self
            .client
            .post(&url)
            .form(&[("question", question)])
            .send()
            .await?;

        let body = response.bytes().await?;
        AnswerRecord::from_json(&body)
    }
}
