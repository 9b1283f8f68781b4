//! Dashboard REST client against a mock server

mod common;

use common::MockServerFixture;
use mockito::Matcher;
use serde_json::json;
use territory_intel::api::NbaStatus;
use territory_intel::DashboardClient;

fn client_for(fixture: &MockServerFixture) -> DashboardClient {
    DashboardClient::new(fixture.config()).unwrap()
}

#[tokio::test]
async fn test_list_and_get_hcps() {
    let fixture = MockServerFixture::new().await;
    let _list = fixture
        .mock_json(
            "GET",
            "/api/hcps",
            200,
            r#"[{"id":1,"name":"Dr. Ana Patel","specialty":"Cardiology","riskScore":0.91,"riskLevel":"high"},
                {"id":2,"name":"Dr. Ben Ortiz","riskScore":0.12}]"#,
        )
        .await;
    let _one = fixture
        .mock_json(
            "GET",
            "/api/hcps/2",
            200,
            r#"{"id":2,"name":"Dr. Ben Ortiz","riskScore":0.12,"lastVisit":"2024-04-28"}"#,
        )
        .await;

    let client = client_for(&fixture);
    let hcps = client.list_hcps().await.unwrap();
    assert_eq!(hcps.len(), 2);
    assert_eq!(hcps[0].risk_level.as_deref(), Some("high"));

    let hcp = client.get_hcp(2).await.unwrap();
    assert_eq!(hcp.name, "Dr. Ben Ortiz");
    assert_eq!(hcp.extra["lastVisit"], "2024-04-28");
}

#[tokio::test]
async fn test_update_nba_status_sends_patch() {
    let fixture = MockServerFixture::new().await;
    let mock = {
        let mut server = fixture.server.lock().await;
        server
            .mock("PATCH", "/api/nba/17/status")
            .match_body(Matcher::Json(json!({"status": "accepted"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"id":17,"hcpId":1,"action":"Schedule lunch-and-learn","status":"accepted"}"#,
            )
            .expect(2)
            .create_async()
            .await
    };

    let client = client_for(&fixture);
    let first = client.update_nba_status(17, &NbaStatus::Accepted).await.unwrap();
    let second = client.update_nba_status(17, &NbaStatus::Accepted).await.unwrap();
    mock.assert_async().await;
    assert_eq!(first, second);
    assert_eq!(first.status, NbaStatus::Accepted);
}

#[tokio::test]
async fn test_nba_listing_and_provenance() {
    let fixture = MockServerFixture::new().await;
    let _list = fixture
        .mock_json(
            "GET",
            "/api/nba",
            200,
            r#"[{"id":17,"hcpId":1,"action":"Call","status":"pending","confidence":0.8},
                {"id":18,"hcpId":2,"action":"Email","status":"snoozed"}]"#,
        )
        .await;
    let _prov = fixture
        .mock_json(
            "GET",
            "/api/nba/17/provenance",
            200,
            r#"{"nbaId":17,"rlPolicy":{"action":"call","qValue":0.72},
                "ruleTriggers":[{"rule":"switching_alert"}],
                "llmNarrative":"Competitor uptake doubled last quarter."}"#,
        )
        .await;

    let client = client_for(&fixture);
    let actions = client.list_next_best_actions().await.unwrap();
    assert_eq!(actions[0].status, NbaStatus::Pending);
    assert_eq!(actions[1].status, NbaStatus::Other("snoozed".into()));

    let provenance = client.nba_provenance(17).await.unwrap();
    assert_eq!(provenance.rl_policy["qValue"], 0.72);
    assert_eq!(provenance.rule_triggers.len(), 1);
    assert!(provenance.llm_narrative.unwrap().contains("Competitor"));
}

#[tokio::test]
async fn test_switching_plans_and_graph() {
    let fixture = MockServerFixture::new().await;
    let _events = fixture
        .mock_json(
            "GET",
            "/api/switching-events",
            200,
            r#"[{"id":3,"hcpId":1,"fromProduct":"Drug A","toProduct":"Drug B","severity":"high"}]"#,
        )
        .await;
    let _analytics = fixture
        .mock_json(
            "GET",
            "/api/analytics/switching",
            200,
            r#"{"totalEvents":12,"byProduct":{"Drug A":9}}"#,
        )
        .await;
    let _plans = fixture
        .mock_json(
            "GET",
            "/api/territory-plans",
            200,
            r#"[{"id":1,"name":"Q3 Northeast","hcpIds":[1,2]}]"#,
        )
        .await;
    let _graph = fixture
        .mock_json(
            "GET",
            "/api/knowledge-graph",
            200,
            r#"{"nodes":[{"id":1,"label":"Dr. Patel","type":"hcp"},{"id":"drug-b","label":"Drug B"}],
                "edges":[{"source":1,"target":"drug-b","relationship":"prescribes"}]}"#,
        )
        .await;

    let client = client_for(&fixture);
    let events = client.list_switching_events().await.unwrap();
    assert_eq!(events[0].to_product.as_deref(), Some("Drug B"));

    let analytics = client.switching_analytics().await.unwrap();
    assert_eq!(analytics.total_events, Some(12));
    assert_eq!(analytics.extra["byProduct"]["Drug A"], 9);

    let plans = client.list_territory_plans().await.unwrap();
    assert_eq!(plans[0].hcp_ids, vec![1, 2]);

    let graph = client.knowledge_graph().await.unwrap();
    assert_eq!(graph.nodes.len(), 2);
    assert_eq!(graph.edges_of("1").count(), 1);
}

#[tokio::test]
async fn test_remote_errors_carry_status() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_json("GET", "/api/hcps/99", 404, r#"{"message":"HCP not found"}"#)
        .await;

    let client = client_for(&fixture);
    let err = client.get_hcp(99).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert!(err.to_string().contains("HCP not found"));
}
