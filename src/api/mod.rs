//! 仪表盘 REST 客户端：HCP、NBA、处方转换与知识图谱数据。
//!
//! | Type | Description |
//! |------|-------------|
//! | [`DashboardClient`] | Typed calls against the dashboard REST endpoints |
//! | [`models`] | Response and request shapes (camelCase on the wire) |

mod client;
pub mod models;

pub use client::DashboardClient;
pub use models::{
    GraphEdge, GraphNode, Hcp, KnowledgeGraph, NbaProvenance, NbaStatus, NextBestAction,
    SwitchingAnalytics, SwitchingEvent, TerritoryPlan,
};
