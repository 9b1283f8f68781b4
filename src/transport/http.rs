use crate::config::ClientConfig;
use crate::transport::{EventSource, TransportError};
use crate::types::SessionId;
use crate::{BoxStream, Error, Result};
use bytes::Bytes;
use futures::TryStreamExt;
use reqwest::{Method, Proxy, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

/// Longest response body excerpt carried in a remote error.
const ERROR_BODY_LIMIT: usize = 512;

pub struct HttpTransport {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpTransport {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        // No overall timeout on the client: the event stream is long-lived.
        // REST calls set a per-request timeout instead.
        let mut builder = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .pool_max_idle_per_host(16)
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .tcp_keepalive(Some(Duration::from_secs(30)))
            .user_agent(concat!("territory-intel/", env!("CARGO_PKG_VERSION")));

        if let Some(proxy_url) = &config.proxy_url {
            let proxy = Proxy::all(proxy_url).map_err(|e| Error::Transport(TransportError::Http(e)))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let mut req = self
            .client
            .request(method, url)
            .header("x-territory-request-id", Uuid::new_v4().to_string());
        if let Some(token) = &self.config.api_token {
            req = req.bearer_auth(token);
        }
        req
    }

    /// Open the event stream for `session_id` and return the raw body stream.
    pub async fn open_stream(&self, session_id: SessionId) -> Result<BoxStream<'static, Bytes>> {
        let url = self.config.stream_url(session_id)?;
        tracing::debug!(%session_id, %url, "opening event stream");

        let resp = self
            .request(Method::GET, url)
            .header("accept", self.config.stream_format.accept_header())
            .header("cache-control", "no-cache")
            .send()
            .await
            .map_err(|e| Error::Transport(TransportError::Http(e)))?;
        let resp = Self::ensure_success(resp).await?;

        let byte_stream = resp
            .bytes_stream()
            .map_err(|e| Error::Transport(TransportError::Http(e)));
        Ok(Box::pin(byte_stream))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send_json::<(), T>(Method::GET, path, None).await
    }

    pub async fn patch_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.send_json(Method::PATCH, path, Some(body)).await
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        let url = self.config.endpoint_url(path)?;
        tracing::debug!(%method, %url, "dashboard request");

        let mut req = self
            .request(method, url)
            .header("accept", "application/json")
            .timeout(self.config.request_timeout());
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| Error::Transport(TransportError::Http(e)))?;
        let resp = Self::ensure_success(resp).await?;

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| Error::Transport(TransportError::Http(e)))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn ensure_success(resp: Response) -> Result<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let mut message: String = body.trim().chars().take(ERROR_BODY_LIMIT).collect();
        if message.is_empty() {
            message = status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string();
        }
        Err(Error::Remote {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait::async_trait]
impl EventSource for HttpTransport {
    async fn open(&self, session_id: SessionId) -> Result<BoxStream<'static, Bytes>> {
        self.open_stream(session_id).await
    }
}
