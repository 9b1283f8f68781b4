use super::models::{
    Hcp, KnowledgeGraph, NbaProvenance, NbaStatus, NextBestAction, StatusUpdate,
    SwitchingAnalytics, SwitchingEvent, TerritoryPlan,
};
use crate::config::ClientConfig;
use crate::transport::HttpTransport;
use crate::Result;
use std::sync::Arc;

/// Typed client for the dashboard REST endpoints.
///
/// Shares its [`HttpTransport`] with the stream client when built from one, so both
/// use the same connection pool, proxy and credentials.
#[derive(Clone)]
pub struct DashboardClient {
    transport: Arc<HttpTransport>,
}

impl DashboardClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self::from_transport(Arc::new(HttpTransport::new(config)?)))
    }

    pub fn from_transport(transport: Arc<HttpTransport>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Arc<HttpTransport> {
        &self.transport
    }

    pub async fn list_hcps(&self) -> Result<Vec<Hcp>> {
        self.transport.get_json("/api/hcps").await
    }

    pub async fn get_hcp(&self, id: u64) -> Result<Hcp> {
        self.transport.get_json(&format!("/api/hcps/{}", id)).await
    }

    pub async fn list_next_best_actions(&self) -> Result<Vec<NextBestAction>> {
        self.transport.get_json("/api/nba").await
    }

    /// Set the status of a recommendation. Repeating the same status is harmless.
    pub async fn update_nba_status(&self, id: u64, status: &NbaStatus) -> Result<NextBestAction> {
        tracing::info!(nba_id = id, status = %status, "updating next best action status");
        self.transport
            .patch_json(&format!("/api/nba/{}/status", id), &StatusUpdate { status })
            .await
    }

    pub async fn nba_provenance(&self, id: u64) -> Result<NbaProvenance> {
        self.transport
            .get_json(&format!("/api/nba/{}/provenance", id))
            .await
    }

    pub async fn list_switching_events(&self) -> Result<Vec<SwitchingEvent>> {
        self.transport.get_json("/api/switching-events").await
    }

    pub async fn switching_analytics(&self) -> Result<SwitchingAnalytics> {
        self.transport.get_json("/api/analytics/switching").await
    }

    pub async fn list_territory_plans(&self) -> Result<Vec<TerritoryPlan>> {
        self.transport.get_json("/api/territory-plans").await
    }

    pub async fn knowledge_graph(&self) -> Result<KnowledgeGraph> {
        self.transport.get_json("/api/knowledge-graph").await
    }
}
