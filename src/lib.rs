//! # territory-intel
//!
//! 区域情报客户端运行时：订阅多智能体推理事件流、重建会话，并访问仪表盘 REST 接口。
//!
//! Client runtime for the territory intelligence dashboard. It follows one agent
//! reasoning session over a server-sent event stream, rebuilds the session's event log
//! and phase, and turns it into timeline data a front end can draw.
//!
//! ## Overview
//!
//! A [`StreamClient`] holds at most one subscription. Frames arriving on the stream are
//! decoded, classified by their `type`, filtered to the selected session and appended
//! to an append-only [`session::SessionLog`]. Bad frames never fail the stream: they are
//! dropped and reported to a [`diagnostics::DiagnosticSink`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use territory_intel::{ClientConfig, SessionId, StreamClient};
//!
//! #[tokio::main]
//! async fn main() -> territory_intel::Result<()> {
//!     let mut client = StreamClient::new(ClientConfig::from_env()?)?;
//!     client.subscribe(Some(SessionId::new(42)?))?;
//!
//!     let mut status = client.watch_status();
//!     while status.changed().await.is_ok() {
//!         println!("{} events, phase {}", client.event_count(), client.phase_label());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Stream client: subscribe, unsubscribe, frame delivery |
//! | [`session`] | Session log, phase tracker and state machine |
//! | [`pipeline`] | SSE / NDJSON framing of the raw byte stream |
//! | [`transport`] | HTTP transport and the [`transport::EventSource`] seam |
//! | [`render`] | Timeline rendering of a session |
//! | [`api`] | Dashboard REST client |
//! | [`types`] | Event, agent role and session id types |
//! | [`diagnostics`] | Dropped-frame and transport diagnostics |
//! | [`config`] | YAML / environment configuration |

pub mod api;
pub mod client;
pub mod config;
pub mod diagnostics;
pub mod pipeline;
pub mod render;
pub mod session;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use api::DashboardClient;
pub use client::{StreamClient, StreamClientBuilder};
pub use config::ClientConfig;
pub use diagnostics::{Diagnostic, DiagnosticSink};
pub use render::{render, render_snapshot, Timeline, TimelineEntry};
pub use session::{ConnectionState, FrameOutcome, SessionLog, SessionSnapshot, StreamStatus};
pub use types::{AgentEvent, AgentRole, EventKind, SessionId};

use futures::Stream;
use std::pin::Pin;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// A specialized Result for pipeline operations
pub type PipeResult<T> = std::result::Result<T, Error>;

/// A unified pinned, boxed stream that emits `PipeResult<T>`
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = PipeResult<T>> + Send + 'a>>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
