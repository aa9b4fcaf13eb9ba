//! Client for the remote book service

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize};

use crate::{
    error::{AppError, AppResult},
    models::{BookDraft, BookId, BookRecord},
};

/// Operations offered by the book service.
///
/// The store only ever talks to the network through this trait.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookApi: Send + Sync {
    /// Fetch the whole collection
    async fn list(&self) -> AppResult<Vec<BookRecord>>;

    /// Fetch one book by identifier
    async fn get(&self, id: BookId) -> AppResult<BookRecord>;

    /// Create a book; the returned record carries the assigned identifier
    async fn create(&self, draft: &BookDraft) -> AppResult<BookRecord>;

    /// Replace a book, keyed by its identifier
    async fn update(&self, record: &BookRecord) -> AppResult<BookRecord>;

    async fn delete(&self, id: BookId) -> AppResult<()>;
}

/// Error body sent by the service, e.g. `{"error": "Book not found"}`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// `BookApi` over HTTP/JSON
#[derive(Clone)]
pub struct HttpBookApi {
    client: Client,
    base_url: String,
}

impl HttpBookApi {
    /// Create a client for the service rooted at `base_url`
    pub fn new(base_url: impl Into<String>) -> AppResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("bookcat/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}/api/books/", self.base_url)
    }

    fn record_url(&self, id: BookId) -> String {
        format!("{}/api/books/{}", self.base_url, id)
    }

    /// Turn a non-success response into `AppError::Api`
    async fn check(response: Response) -> AppResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.error.or(body.message));

        tracing::warn!(
            "Book service answered {} ({})",
            status,
            message.as_deref().unwrap_or("no message")
        );
        Err(AppError::Api { status, message })
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> AppResult<T> {
        let response = Self::check(response).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl BookApi for HttpBookApi {
    async fn list(&self) -> AppResult<Vec<BookRecord>> {
        let url = self.collection_url();
        tracing::debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;
        Self::read_json(response).await
    }

    async fn get(&self, id: BookId) -> AppResult<BookRecord> {
        let url = self.record_url(id);
        tracing::debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;
        Self::read_json(response).await
    }

    async fn create(&self, draft: &BookDraft) -> AppResult<BookRecord> {
        let url = self.collection_url();
        tracing::debug!("POST {}", url);
        let response = self.client.post(&url).json(draft).send().await?;
        Self::read_json(response).await
    }

    async fn update(&self, record: &BookRecord) -> AppResult<BookRecord> {
        let url = self.record_url(record.id);
        tracing::debug!("PUT {}", url);
        let response = self.client.put(&url).json(record).send().await?;
        Self::read_json(response).await
    }

    async fn delete(&self, id: BookId) -> AppResult<()> {
        let url = self.record_url(id);
        tracing::debug!("DELETE {}", url);
        let response = self.client.delete(&url).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}
