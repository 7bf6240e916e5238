use bson::oid::ObjectId;
use serde_json::Value;

use crate::fixtures::test_app::TestApp;

#[tokio::test]
async fn three_question_flow_aggregates_answered_questions_only() {
    let app = TestApp::spawn().await;
    let user = ObjectId::new();
    let token = app.token_for(user);

    let started = app.start_assessment(&token, 3).await;
    let aid = started["assessment_id"].as_str().unwrap().to_string();
    assert_eq!(started["question_count"], 3);
    assert_eq!(started["first_question"]["number"], 1);

    // Q1: answered with good scores
    app.evaluator.push_scores([80.0, 70.0, 90.0, 75.0]);
    let resp = app.submit_audio(&token, &aid, 1).await;
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["is_completed"], false);
    assert_eq!(body["next_question_number"], 2);

    // Q2: skipped
    let resp = app.submit_skip(&token, &aid, 2).await;
    assert_eq!(resp.status().as_u16(), 200);

    // Q3: answered with weaker scores
    app.evaluator.push_scores([60.0, 65.0, 70.0, 60.0]);
    let resp = app.submit_audio(&token, &aid, 3).await;
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["is_completed"], true);
    assert!(body["next_question_number"].is_null());

    let resp = app
        .auth_post(&format!("/api/assessment/{aid}/complete"), &token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let result: Value = resp.json().await.unwrap();

    // Mean of Q1 (78.75) and Q3 (63.75); the skip contributes nothing.
    assert!((result["overall_score"].as_f64().unwrap() - 71.25).abs() < 1e-9);
    assert_eq!(result["answered_count"], 2);
    assert_eq!(result["skipped_count"], 1);
    assert_eq!(result["determined_level"], "C1");

    // One of three questions skipped caps confidence at the answered ratio.
    let confidence = result["level_confidence"].as_f64().unwrap();
    assert!(confidence > 0.0);
    assert!(confidence <= 2.0 / 3.0 + 1e-9);

    // The session is terminal: current-question now reports completion.
    let resp = app
        .auth_get(&format!("/api/assessment/{aid}/current-question"), &token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["completed"], true);
}

#[tokio::test]
async fn complete_is_idempotent() {
    let app = TestApp::spawn().await;
    let token = app.token_for(ObjectId::new());

    let started = app.start_assessment(&token, 1).await;
    let aid = started["assessment_id"].as_str().unwrap().to_string();

    app.evaluator.push_scores([70.0, 70.0, 70.0, 70.0]);
    app.submit_audio(&token, &aid, 1).await;

    let first: Value = app
        .auth_post(&format!("/api/assessment/{aid}/complete"), &token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let second: Value = app
        .auth_post(&format!("/api/assessment/{aid}/complete"), &token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(first["assessment_id"], second["assessment_id"]);
    assert_eq!(first["overall_score"], second["overall_score"]);
    assert_eq!(first["created_at"], second["created_at"]);
}

#[tokio::test]
async fn evaluator_failure_degrades_the_question_not_the_session() {
    let app = TestApp::spawn().await;
    let token = app.token_for(ObjectId::new());

    let started = app.start_assessment(&token, 2).await;
    let aid = started["assessment_id"].as_str().unwrap().to_string();

    app.evaluator.push_scores([80.0, 80.0, 80.0, 80.0]);
    let resp = app.submit_audio(&token, &aid, 1).await;
    assert_eq!(resp.status().as_u16(), 200);

    // The scoring backend fails; the submission still advances the session.
    app.evaluator.push_failure();
    let resp = app.submit_audio(&token, &aid, 2).await;
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["is_completed"], true);

    let result: Value = app
        .auth_post(&format!("/api/assessment/{aid}/complete"), &token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // The degraded answer counts as answered with zero scores.
    assert_eq!(result["answered_count"], 2);
    assert_eq!(result["skipped_count"], 0);
    assert!((result["overall_score"].as_f64().unwrap() - 40.0).abs() < 1e-9);
}

#[tokio::test]
async fn current_question_walks_the_sequence() {
    let app = TestApp::spawn().await;
    let token = app.token_for(ObjectId::new());

    let started = app.start_assessment(&token, 2).await;
    let aid = started["assessment_id"].as_str().unwrap().to_string();

    let body: Value = app
        .auth_get(&format!("/api/assessment/{aid}/current-question"), &token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["completed"], false);
    assert_eq!(body["question"]["number"], 1);

    app.submit_skip(&token, &aid, 1).await;

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
async fn list_shows_live_sessions_for_the_caller() {
    let app = TestApp::spawn().await;
    let user = ObjectId::new();
    let token = app.token_for(user);

    let first = app.start_assessment(&token, 2).await;
    let second = app.start_assessment(&token, 3).await;

    let sessions: Value = app
        .auth_get("/api/assessment", &token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let items = sessions.as_array().unwrap();
    assert_eq!(items.len(), 2);

    let ids: Vec<&str> = items
        .iter()
        .map(|s| s["assessment_id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&first["assessment_id"].as_str().unwrap()));
    assert!(ids.contains(&second["assessment_id"].as_str().unwrap()));

    // Another user sees nothing.
    let other_token = app.token_for(ObjectId::new());
    let sessions: Value = app
        .auth_get("/api/assessment", &other_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(sessions.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn recommended_courses_match_the_determined_level() {
    let app = TestApp::spawn().await;
    let token = app.token_for(ObjectId::new());
    // 70 overall lands in C1 under the default cutoffs.
    app.catalog
        .add_course(app.language_id, "C1", "Advanced conversation");

    let started = app.start_assessment(&token, 1).await;
    let aid = started["assessment_id"].as_str().unwrap().to_string();

    app.evaluator.push_scores([70.0, 70.0, 70.0, 70.0]);
    app.submit_audio(&token, &aid, 1).await;

    let result: Value = app
        .auth_post(&format!("/api/assessment/{aid}/complete"), &token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(result["determined_level"], "C1");
    let courses = result["recommended_courses"].as_array().unwrap();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0]["title"], "Advanced conversation");
    assert_eq!(courses[0]["level"], "C1");
}
