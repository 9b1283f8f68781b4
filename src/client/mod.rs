//! 客户端模块：管理单个推理会话的事件流订阅。
//!
//! | Type | Description |
//! |------|-------------|
//! | [`StreamClient`] | Subscribe / unsubscribe / frame delivery for one session at a time |
//! | [`StreamClientBuilder`] | Configuration, event source and diagnostic sink wiring |

mod builder;
mod core;

pub use self::builder::StreamClientBuilder;
pub use self::core::StreamClient;
