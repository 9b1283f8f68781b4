//! 传输层：打开会话事件流并访问仪表盘 REST 接口。

pub mod http;

use crate::types::SessionId;
use crate::{BoxStream, Result};
use bytes::Bytes;

pub use http::HttpTransport;

/// Something that can open the event stream of one session.
///
/// The stream client only needs raw body bytes; framing happens in the pipeline.
#[async_trait::async_trait]
pub trait EventSource: Send + Sync {
    async fn open(&self, session_id: SessionId) -> Result<BoxStream<'static, Bytes>>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}
