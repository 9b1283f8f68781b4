//! 流水线模块：将传输层字节流切分为事件文本帧。
//!
//! # Frame Pipeline
//!
//! ```text
//! Raw Bytes → FrameDecoder → text frames → SessionState::apply_frame
//!     │            │
//!   HTTP       SSE / NDJSON
//! ```
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`FrameDecoder`] | Trait for stream framing |
//! | [`StreamFormat`] | Wire framing selected by configuration |
//! | [`decode`] | SSE and NDJSON decoders |

pub mod decode;

use crate::{BoxStream, PipeResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use decode::{create_decoder, NdjsonDecoder, SseDecoder};

/// Decoder trait for stream framing
#[async_trait::async_trait]
pub trait FrameDecoder: Send + Sync {
    /// Split a byte stream into text frames
    async fn decode_frames(
        &self,
        input: BoxStream<'static, bytes::Bytes>,
    ) -> PipeResult<BoxStream<'static, String>>;
}

/// Wire framing of the session stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamFormat {
    #[default]
    Sse,
    #[serde(alias = "jsonl")]
    Ndjson,
}

impl StreamFormat {
    pub fn accept_header(&self) -> &'static str {
        match self {
            StreamFormat::Sse => "text/event-stream",
            StreamFormat::Ndjson => "application/x-ndjson",
        }
    }
}

impl fmt::Display for StreamFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamFormat::Sse => f.write_str("sse"),
            StreamFormat::Ndjson => f.write_str("ndjson"),
        }
    }
}

impl FromStr for StreamFormat {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sse" => Ok(StreamFormat::Sse),
            "ndjson" | "jsonl" => Ok(StreamFormat::Ndjson),
            other => Err(PipelineError::Configuration(format!(
                "Unsupported stream format: {}. Supported formats: sse, ndjson, jsonl",
                other
            ))
            .with_hint("set TERRITORY_STREAM_FORMAT to sse or ndjson")),
        }
    }
}

/// Pipeline error types
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{source}\n💡 Hint: {hint}")]
    WithHint {
        source: Box<PipelineError>,
        hint: String,
    },
}

impl PipelineError {
    /// Attach an actionable hint to the error
    pub fn with_hint(self, hint: impl Into<String>) -> Self {
        PipelineError::WithHint {
            source: Box::new(self),
            hint: hint.into(),
        }
    }
}
