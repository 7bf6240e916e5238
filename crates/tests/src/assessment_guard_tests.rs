use std::time::Duration;

use bson::oid::ObjectId;
use serde_json::Value;
use uuid::Uuid;

use crate::fixtures::test_app::TestApp;
use linguaflow_services::assessment::keys;
use linguaflow_services::store::EphemeralStore;

#[tokio::test]
async fn out_of_sequence_submit_fails_and_mutates_nothing() {
    let app = TestApp::spawn().await;
    let token = app.token_for(ObjectId::new());

    let started = app.start_assessment(&token, 3).await;
    let aid = started["assessment_id"].as_str().unwrap().to_string();

    // Question 2 before question 1: rejected, no state change.
    let resp = app.submit_skip(&token, &aid, 2).await;
    assert_eq!(resp.status().as_u16(), 409);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "conflict");

    // A replay of an already-recorded question is rejected the same way.
    let resp = app.submit_skip(&token, &aid, 1).await;
    assert_eq!(resp.status().as_u16(), 200);
    let resp = app.submit_skip(&token, &aid, 1).await;
    assert_eq!(resp.status().as_u16(), 409);

    // The session still expects question 2.
    let body: Value = app
        .auth_get(&format!("/api/assessment/{aid}/current-question"), &token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["question"]["number"], 2);
}

#[tokio::test]
async fn foreign_user_is_forbidden() {
    let app = TestApp::spawn().await;
    let owner_token = app.token_for(ObjectId::new());
    let intruder_token = app.token_for(ObjectId::new());

    let started = app.start_assessment(&owner_token, 2).await;
    let aid = started["assessment_id"].as_str().unwrap().to_string();

    let resp = app
        .auth_get(
            &format!("/api/assessment/{aid}/current-question"),
            &intruder_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    let resp = app.submit_skip(&intruder_token, &aid, 1).await;
    assert_eq!(resp.status().as_u16(), 403);
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let app = TestApp::spawn().await;
    let resp = app
        .client
        .get(app.url("/api/assessment"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);
}

#[tokio::test]
async fn unknown_program_fails_and_creates_no_session() {
    let app = TestApp::spawn().await;
    let user = ObjectId::new();
    let token = app.token_for(user);

    let resp = app
        .auth_post("/api/assessment/start", &token)
        .json(&serde_json::json!({
            "language_id": app.language_id.to_hex(),
            "program_id": ObjectId::new().to_hex(),
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "validation");

    // No session was registered for the user.
    let members = app
        .store
        .set_members(&keys::user_index(&user))
        .await
        .unwrap();
    assert!(members.is_empty());
}

#[tokio::test]
async fn unknown_language_fails_validation() {
    let app = TestApp::spawn().await;
    let token = app.token_for(ObjectId::new());

    let resp = app
        .auth_post("/api/assessment/start", &token)
        .json(&serde_json::json!({ "language_id": ObjectId::new().to_hex() }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);
}

#[tokio::test]
async fn oversized_question_count_fails_validation() {
    let app = TestApp::spawn().await;
    let token = app.token_for(ObjectId::new());

    let resp = app
        .auth_post("/api/assessment/start", &token)
        .json(&serde_json::json!({
            "language_id": app.language_id.to_hex(),
            "question_count": 50,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);
}

#[tokio::test]
async fn expired_session_is_gone_while_the_index_still_lists_it() {
    let app = TestApp::spawn_with(|s| s.assessment.session_ttl_secs = 1).await;
    let user = ObjectId::new();
    let token = app.token_for(user);

    let started = app.start_assessment(&token, 2).await;
    let aid = started["assessment_id"].as_str().unwrap().to_string();

    tokio::time::sleep(Duration::from_millis(1300)).await;

    // The session record expired out of the store.
    let resp = app
        .auth_get(&format!("/api/assessment/{aid}/current-question"), &token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);

    // The index has its own, longer TTL and still carries the stale id.
    let members = app
        .store
        .set_members(&keys::user_index(&user))
        .await
        .unwrap();
    assert_eq!(members, vec![aid.clone()]);

    // Listing treats the stale id as silently absent.
    let sessions: Value = app
        .auth_get("/api/assessment", &token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(sessions.as_array().unwrap().is_empty());

    // And the stale entry was pruned opportunistically.
    let members = app
        .store
        .set_members(&keys::user_index(&user))
        .await
        .unwrap();
    assert!(members.is_empty());

    let assessment_id = Uuid::parse_str(&aid).unwrap();
    assert!(
        app.store
            .get(&keys::session(&assessment_id))
            .await
            .unwrap()
            .is_none()
    );
}
