//! 类型系统模块：定义推理会话事件流的核心数据类型。
//!
//! # Types Module
//!
//! Strongly-typed representations of the agent reasoning stream.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`AgentEvent`] | Tagged union over the five stream event kinds |
//! | [`EventKind`] | Closed set of `type` discriminators |
//! | [`AgentRole`] | Agent role, open to unknown names |
//! | [`SessionId`] | Positive reasoning session identifier |
//!
//! ## Submodules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`events`] | Stream event variants and payloads |
//! | [`agent`] | Agent roles |
//! | [`session`] | Session identifiers |

pub mod agent;
pub mod events;
pub mod session;

pub use agent::AgentRole;
pub use events::{
    ActionEvent, AgentEvent, CompletedEvent, ConnectedEvent, EventKind, PhaseEvent, ThoughtEvent,
};
pub use session::SessionId;
