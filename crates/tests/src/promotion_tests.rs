use bson::oid::ObjectId;
use serde_json::Value;
use uuid::Uuid;

use crate::fixtures::test_app::TestApp;
use linguaflow_services::assessment::keys;
use linguaflow_services::store::EphemeralStore;

/// Runs a single-question session to completion and returns its id.
async fn finish_one_question_session(app: &TestApp, token: &str, scores: [f64; 4]) -> String {
    let started = app.start_assessment(token, 1).await;
    let aid = started["assessment_id"].as_str().unwrap().to_string();
    app.evaluator.push_scores(scores);
    let resp = app.submit_audio(token, &aid, 1).await;
    assert_eq!(resp.status().as_u16(), 200);
    aid
}

#[tokio::test]
async fn accept_promotes_to_durable_storage_exactly_once() {
    let app = TestApp::spawn().await;
    let user = ObjectId::new();
    let token = app.token_for(user);

    let aid = finish_one_question_session(&app, &token, [70.0, 70.0, 70.0, 70.0]).await;

    let resp = app
        .auth_post("/api/assessment/accept", &token)
        .json(&serde_json::json!({ "language_id": app.language_id.to_hex() }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["promoted"], true);
    assert_eq!(body["level"], "C1");

    // The durable record exists and the ephemeral state is gone.
    let record = app.proficiency.get(user, app.language_id).unwrap();
    assert_eq!(record.level, "C1");

    let assessment_id = Uuid::parse_str(&aid).unwrap();
    assert!(
        app.store
            .get(&keys::session(&assessment_id))
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        app.store
            .get(&keys::result(&user, &app.language_id))
            .await
            .unwrap()
            .is_none()
    );

    // Delete-on-success: a second accept finds nothing pending.
    let resp = app
        .auth_post("/api/assessment/accept", &token)
        .json(&serde_json::json!({ "language_id": app.language_id.to_hex() }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);

    // The committed record is readable through the proficiency endpoint.
    let body: Value = app
        .auth_get(
            &format!("/api/proficiency/{}", app.language_id.to_hex()),
            &token,
        )
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["level"], "C1");
}

#[tokio::test]
async fn reject_discards_and_is_idempotent() {
    let app = TestApp::spawn().await;
    let user = ObjectId::new();
    let token = app.token_for(user);

    finish_one_question_session(&app, &token, [60.0, 60.0, 60.0, 60.0]).await;

    let reject_body = serde_json::json!({ "language_id": app.language_id.to_hex() });
    let resp = app
        .auth_post("/api/assessment/reject", &token)
        .json(&reject_body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    // Nothing durable was written.
    assert!(app.proficiency.is_empty());

    // Rejecting again is a no-op success.
    let resp = app
        .auth_post("/api/assessment/reject", &token)
        .json(&reject_body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    // After a reject there is nothing left to accept.
    let resp = app
        .auth_post("/api/assessment/accept", &token)
        .json(&reject_body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn accept_without_pending_result_is_not_found() {
    let app = TestApp::spawn().await;
    let token = app.token_for(ObjectId::new());

    let resp = app
        .auth_post("/api/assessment/accept", &token)
        .json(&serde_json::json!({ "language_id": app.language_id.to_hex() }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn all_skipped_result_cannot_be_promoted() {
    let app = TestApp::spawn().await;
    let user = ObjectId::new();
    let token = app.token_for(user);

    let started = app.start_assessment(&token, 2).await;
    let aid = started["assessment_id"].as_str().unwrap().to_string();
    app.submit_skip(&token, &aid, 1).await;
    app.submit_skip(&token, &aid, 2).await;

    let result: Value = app
        .auth_post(&format!("/api/assessment/{aid}/complete"), &token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(result["determined_level"], "InsufficientData");
    assert_eq!(result["level_confidence"], 0.0);
    assert_eq!(result["answered_count"], 0);

    let resp = app
        .auth_post("/api/assessment/accept", &token)
        .json(&serde_json::json!({ "language_id": app.language_id.to_hex() }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);
    assert!(app.proficiency.is_empty());

    // The useless pending result can still be rejected to clear the way.
    let resp = app
        .auth_post("/api/assessment/reject", &token)
        .json(&serde_json::json!({ "language_id": app.language_id.to_hex() }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
}

#[tokio::test]
async fn proficiency_read_before_any_accept_is_not_found() {
    let app = TestApp::spawn().await;
    let token = app.token_for(ObjectId::new());

    let resp = app
        .auth_get(
            &format!("/api/proficiency/{}", app.language_id.to_hex()),
            &token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}
