//! Typed client for the backend REST API.
//!
//! Every call makes a single attempt, attaches the session's bearer token
//! when one is present, and unwraps the backend's `{ "data": ... }` envelope.
//! Failures surface as [`ClientError`]; nothing is retried here.

mod auth;
mod emergency;
pub mod error;
mod quotes;
pub mod resource;

use anyhow::Context;
use reqwest::{Method, RequestBuilder, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ApiConfig;

pub use error::ClientError;
pub use resource::{EmergencyRequests, Quotes, Resource};

/// Success bodies come wrapped in `{ "data": ... }`; bare payloads are
/// accepted as well.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Payload<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Payload<T> {
    fn into_inner(self) -> T {
        match self {
            Payload::Wrapped { data } => data,
            Payload::Bare(data) => data,
        }
    }
}

/// Backend API client. Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    http: reqwest::Client,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        let base_url = config.parsed_base_url()?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("sikati/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url,
            http,
            token: None,
        })
    }

    /// A client that authenticates as the given session token.
    pub fn with_token(&self, token: Option<String>) -> Self {
        Self {
            base_url: self.base_url.clone(),
            http: self.http.clone(),
            token,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// GET the base URL and report whatever status comes back.
    pub async fn probe(&self) -> Result<reqwest::StatusCode, ClientError> {
        let response = self
            .http
            .get(self.base_url.clone())
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(response.status())
    }

    /// GET the collection.
    pub async fn list<R: Resource>(&self) -> Result<Vec<R::Record>, ClientError> {
        let url = self.collection_url(R::PATH)?;
        self.fetch(Method::GET, url, None::<&()>).await
    }

    /// GET one record by identifier.
    pub async fn get<R: Resource>(&self, id: &str) -> Result<R::Record, ClientError> {
        let url = self.item_url(R::PATH, id)?;
        self.fetch(Method::GET, url, None::<&()>).await
    }

    /// POST a new record.
    pub async fn create<R: Resource>(&self, draft: &R::Draft) -> Result<R::Record, ClientError> {
        let url = self.collection_url(R::PATH)?;
        self.fetch(Method::POST, url, Some(draft)).await
    }

    /// PUT the full set of mutable fields of an existing record.
    pub async fn update<R: Resource>(
        &self,
        id: &str,
        draft: &R::Draft,
    ) -> Result<R::Record, ClientError> {
        let url = self.item_url(R::PATH, id)?;
        self.fetch(Method::PUT, url, Some(draft)).await
    }

    /// DELETE a record. The response body, if any, is ignored.
    pub async fn delete<R: Resource>(&self, id: &str) -> Result<(), ClientError> {
        let url = self.item_url(R::PATH, id)?;
        self.execute(Method::DELETE, url, None::<&()>).await?;
        Ok(())
    }

    async fn fetch<B, T>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let bytes = self.execute(method, url, body).await?;
        let payload: Payload<T> = serde_json::from_slice(&bytes)?;
        Ok(payload.into_inner())
    }

    async fn execute<B>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<Vec<u8>, ClientError>
    where
        B: Serialize + ?Sized,
    {
        debug!(
            method = %method,
            url = %url,
            authenticated = self.token.is_some(),
            "Backend request"
        );

        let mut request = self.authorize(self.http.request(method.clone(), url.clone()));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            warn!(method = %method, url = %url, error = %e, "Backend unreachable");
            ClientError::Network(e.to_string())
        })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        if !status.is_success() {
            let err = ClientError::from_response(status, &bytes);
            warn!(
                method = %method,
                url = %url,
                status = status.as_u16(),
                error = %err,
                "Backend call failed"
            );
            return Err(err);
        }

        Ok(bytes.to_vec())
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn collection_url(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path.trim_matches('/'))
            .map_err(|e| ClientError::Network(format!("invalid request URL for {}: {}", path, e)))
    }

    fn item_url(&self, path: &str, id: &str) -> Result<Url, ClientError> {
        let mut url = self.collection_url(path)?;
        url.path_segments_mut()
            .map_err(|_| ClientError::Network(format!("cannot append id to {}", self.base_url)))?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }
}
