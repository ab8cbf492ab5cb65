//! End-to-end tests for the query lifecycle
//!
//! Drives a real `BackendClient` against a wiremock server and checks the
//! resulting conversation and classification.

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::{
    matchers::{body_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

use health_assistant_client::backend::BackendClient;
use health_assistant_client::classify::{RelevanceBucket, TierDetail, EMERGENCY_ACTIONS};
use health_assistant_client::config::{BackendConfig, RequestConfig};
use health_assistant_client::conversation::{Phase, Role};
use health_assistant_client::orchestrator::{
    QueryOrchestrator, QueryState, Rejection, Resolution, SubmitOutcome,
};
use health_assistant_client::render::{render_to_string, Renderer};
use health_assistant_client::Tier;

fn create_orchestrator(base_url: &str) -> QueryOrchestrator<BackendClient> {
    let config = BackendConfig {
        base_url: base_url.to_string(),
        query_path: "/query".to_string(),
    };
    let client =
        BackendClient::new(&config, RequestConfig::default()).expect("Failed to create client");
    QueryOrchestrator::new(client)
}

async fn mount_answer(server: &MockServer, text: &str, status: u16, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_json(json!({ "text": text })))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_standard_answer_end_to_end() {
    let server = MockServer::start().await;
    mount_answer(
        &server,
        "I have fever and headache",
        200,
        json!({
            "answer": "Likely a viral infection.",
            "explanation": "Fever with headache is common in viral illness.",
            "confidence": "High",
            "evidence": [
                { "content": "Viral fever...", "source": "fever.pdf", "score": 0.7 },
                { "content": "Headache causes...", "source": "neuro.pdf", "score": 0.4 },
                { "content": "Unrelated...", "source": "misc.txt", "score": 0.9, "relevance": "Low" }
            ],
            "is_safe": true,
            "refusal_reason": null,
            "risk_level": "Moderate",
            "disclaimer": "This information is not medical advice."
        }),
    )
    .await;

    let mut orchestrator = create_orchestrator(&server.uri());
    let outcome = orchestrator.submit("I have fever and headache").await;

    let messages = orchestrator.snapshot();
    assert_eq!(
        outcome,
        SubmitOutcome::Settled {
            message_id: messages[1].id,
            resolution: Resolution::Answered(Tier::Standard),
        }
    );
    assert_eq!(messages[0].role(), Role::User);
    assert_eq!(messages[1].phase(), Some(Phase::Final));

    let response = messages[1].response().unwrap();
    assert_eq!(response.confidence_style().unwrap().weight, 90);
    let buckets: Vec<_> = response
        .evidence_view()
        .iter()
        .map(|e| (e.score_percent, e.relevance))
        .collect();
    assert_eq!(
        buckets,
        vec![
            (70, RelevanceBucket::High),
            (40, RelevanceBucket::Medium),
            (90, RelevanceBucket::Low),
        ]
    );
    assert!(response.elevated_disclaimer());
}

#[tokio::test]
async fn test_emergency_answer_end_to_end() {
    let server = MockServer::start().await;
    mount_answer(
        &server,
        "crushing chest pain",
        200,
        json!({
            "answer": "**EMERGENCY ASSISTANCE REQUIRED**",
            "explanation": "This query matches symptoms of a life-threatening medical emergency.",
            "confidence": "High",
            "evidence": [],
            "is_safe": false,
            "refusal_reason": "This query implies a medical emergency. Please call 911 immediately.",
            "risk_level": "High",
            "disclaimer": "EMERGENCY PROTOCOL: This query indicates a potential medical emergency."
        }),
    )
    .await;

    let mut orchestrator = create_orchestrator(&server.uri());
    orchestrator.submit("crushing chest pain").await;

    let response = orchestrator.snapshot()[1].response().unwrap();
    assert_eq!(response.tier(), Tier::Emergency);
    assert_eq!(
        response.detail,
        TierDetail::Emergency {
            actions: EMERGENCY_ACTIONS
        }
    );

    let text = render_to_string(&Renderer::default(), orchestrator.snapshot());
    assert!(text.contains("MEDICAL EMERGENCY SUSPECTED"));
    assert!(text.contains("Please call 911 immediately."));
}

#[tokio::test]
async fn test_refusal_answer_end_to_end() {
    let server = MockServer::start().await;
    mount_answer(
        &server,
        "how many pills for an overdose",
        200,
        json!({
            "answer": "",
            "explanation": "",
            "confidence": "High",
            "evidence": [],
            "is_safe": false,
            "refusal_reason": "I can't help with that.\nIf you are in crisis, please reach out for support.",
            "disclaimer": "This information is for educational purposes only."
        }),
    )
    .await;

    let mut orchestrator = create_orchestrator(&server.uri());
    orchestrator.submit("how many pills for an overdose").await;

    let response = orchestrator.snapshot()[1].response().unwrap();
    assert_eq!(response.tier(), Tier::Refusal);
    assert!(response.confidence_style().is_none());
    match &response.detail {
        TierDetail::Refusal { reason_lines } => assert_eq!(reason_lines.len(), 2),
        other => panic!("Expected refusal, got {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_falls_back_and_recovers() {
    let server = MockServer::start().await;
    mount_answer(&server, "rash", 503, json!({ "detail": "overloaded" })).await;
    mount_answer(
        &server,
        "rash again",
        200,
        json!({ "answer": "Use a mild moisturiser.", "is_safe": true, "confidence": "Medium" }),
    )
    .await;

    let mut orchestrator = create_orchestrator(&server.uri());

    let first = orchestrator.submit("rash").await;
    assert!(matches!(
        first,
        SubmitOutcome::Settled {
            resolution: Resolution::Recovered,
            ..
        }
    ));
    let apology = orchestrator.snapshot()[1].response().unwrap();
    assert_eq!(apology.tier(), Tier::Standard);
    assert_eq!(apology.raw.confidence.as_deref(), Some("Low"));
    assert!(apology.raw.evidence.is_empty());
    assert!(!apology.raw.answer.is_empty());
    assert_eq!(orchestrator.state(), QueryState::Settled);

    let second = orchestrator.submit("rash again").await;
    assert!(matches!(
        second,
        SubmitOutcome::Settled {
            resolution: Resolution::Answered(Tier::Standard),
            ..
        }
    ));
    assert_eq!(orchestrator.snapshot().len(), 4);
    assert_eq!(
        orchestrator.snapshot()[3]
            .response()
            .unwrap()
            .confidence_style()
            .unwrap()
            .weight,
        55
    );
}

#[tokio::test]
async fn test_undecodable_body_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(1)
        .mount(&server)
        .await;

    let mut orchestrator = create_orchestrator(&server.uri());
    let outcome = orchestrator.submit("cough").await;

    assert!(matches!(
        outcome,
        SubmitOutcome::Settled {
            resolution: Resolution::Recovered,
            ..
        }
    ));
    assert!(!orchestrator.is_busy());
}

#[tokio::test]
async fn test_whitespace_query_never_reaches_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut orchestrator = create_orchestrator(&server.uri());
    let outcome = orchestrator.submit("   ").await;

    assert_eq!(outcome, SubmitOutcome::Rejected(Rejection::EmptyQuery));
    assert!(orchestrator.snapshot().is_empty());
}
