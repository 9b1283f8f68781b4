//! 会话模块：从事件流重建推理会话（事件日志、阶段标签、连接状态）。
//!
//! # Session Reconstruction
//!
//! The client-side model of one reasoning session:
//!
//! ```text
//! text frame → decode JSON → classify `type` → filter sessionId → { log, phase }
//!                  │               │                 │
//!              Malformed       UnknownType      ForeignSession   (dropped)
//! ```
//!
//! | Type | Description |
//! |------|-------------|
//! | [`SessionState`] | Synchronous state machine driven by frames |
//! | [`SessionLog`] | Append-only event log with a restartable iterator |
//! | [`PhaseTracker`] | Last-writer-wins phase label |
//! | [`ConnectionState`] | `Idle`, `Connecting`, `Open`, `Closed` |

pub mod log;
pub mod phase;
pub mod state;

pub use log::{Events, SessionLog};
pub use phase::{Phase, PhaseTracker, COMPLETED_LABEL, INITIALIZING_LABEL};
pub use state::{
    ConnectionState, FrameOutcome, FrameStats, IgnoreReason, SessionSnapshot, SessionState,
    StreamStatus,
};
