//! Dashboard payloads.
//!
//! Only the fields this client acts on are typed. Everything else the server sends
//! is kept in `extra` so callers can still reach it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Healthcare provider with its current risk profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hcp {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub territory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Lifecycle of a next-best-action recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NbaStatus {
    Pending,
    Accepted,
    Completed,
    Dismissed,
    /// A status this client does not know; kept verbatim.
    #[serde(untagged)]
    Other(String),
}

impl NbaStatus {
    pub fn as_str(&self) -> &str {
        match self {
            NbaStatus::Pending => "pending",
            NbaStatus::Accepted => "accepted",
            NbaStatus::Completed => "completed",
            NbaStatus::Dismissed => "dismissed",
            NbaStatus::Other(s) => s,
        }
    }
}

impl fmt::Display for NbaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextBestAction {
    pub id: u64,
    pub hcp_id: u64,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub status: NbaStatus,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `PATCH /api/nba/{id}/status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct StatusUpdate<'a> {
    pub status: &'a NbaStatus,
}

/// How a recommendation was produced: policy output, rule triggers and narrative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NbaProvenance {
    pub nba_id: u64,
    #[serde(default)]
    pub rl_policy: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rule_triggers: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_narrative: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A detected prescription switch away from (or towards) a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchingEvent {
    pub id: u64,
    pub hcp_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Aggregate switching figures. The shape is open, so most of it lives in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchingAnalytics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_events: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerritoryPlan {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub territory: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hcp_ids: Vec<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeGraph {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
}

impl KnowledgeGraph {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Edges leaving or entering `id`.
    pub fn edges_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges
            .iter()
            .filter(move |e| e.source == id || e.target == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    #[serde(deserialize_with = "id_as_string")]
    pub source: String,
    #[serde(deserialize_with = "id_as_string")]
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Graph ids arrive as numbers or strings depending on the node type.
fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}
