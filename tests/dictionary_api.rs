mod common;

use axum::http::StatusCode;
use common::{MockServices, TestApp};
use serde_json::json;

#[tokio::test]
async fn gender_crud() {
    let app = TestApp::new(MockServices::default()).await;

    let (status, male) = app.post("/genders", json!({"name": "male"})).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = male["id"].as_i64().unwrap();

    let (status, fetched) = app.get(&format!("/genders/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, male);

    let (status, unchanged) = app.patch(&format!("/genders/{}", id), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unchanged, male);

    let (status, renamed) = app.patch(&format!("/genders/{}", id), json!({"name": "m"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["name"], "m");

    let (status, deleted) = app.delete(&format!("/genders/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, json!({"id": id, "name": "m"}));

    let (status, _) = app.get(&format!("/genders/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_missing_gender_is_not_found() {
    let app = TestApp::new(MockServices::default()).await;
    let (status, body) = app.delete("/genders/12345").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn create_requires_a_name() {
    let app = TestApp::new(MockServices::default()).await;

    let (status, body) = app.post("/nationalities", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "name is required");

    let (status, _) = app.post("/nationalities", json!({"name": "  "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.post("/nationalities", json!({"name": 5})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_names_are_a_store_error() {
    let app = TestApp::new(MockServices::default()).await;
    let (status, _) = app.post("/genders", json!({"name": "male"})).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = app.post("/genders", json!({"name": "male"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().starts_with("constraint violation"));

    let (status, _) = app.post("/nationalities", json!({"name": "US"})).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app.post("/nationalities", json!({"name": "us"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn listing_filters_by_id_name_and_page() {
    let app = TestApp::new(MockServices::default()).await;
    let mut ids = Vec::new();
    for code in ["US", "GB", "DE", "FR", "USX"] {
        let (_, created) = app.post("/nationalities", json!({"name": code})).await;
        ids.push(created["id"].as_i64().unwrap());
    }

    let (_, all) = app.get("/nationalities?id=0&page=0&limit=2").await;
    assert_eq!(all.as_array().unwrap().len(), 5);

    let (_, by_id) = app.get(&format!("/nationalities?id={}", ids[2])).await;
    assert_eq!(by_id, json!([{"id": ids[2], "name": "DE"}]));

    let (_, us) = app.get("/nationalities?name=us").await;
    let names: Vec<&str> = us.as_array().unwrap().iter().map(|n| n["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["US", "USX"]);

    let (_, page) = app.get("/nationalities?page=2&limit=2").await;
    let names: Vec<&str> = page.as_array().unwrap().iter().map(|n| n["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["DE", "FR"]);
}

#[tokio::test]
async fn deleting_a_gender_unsets_it_on_persons() {
    let app = TestApp::new(MockServices::default()).await;
    let (_, person) = app.post("/persons", json!({"name": "John", "surname": "Doe"})).await;
    let gender_id = person["gender"]["id"].as_i64().unwrap();

    let (status, _) = app.delete(&format!("/genders/{}", gender_id)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, reloaded) = app.get(&format!("/persons/{}", person["id"])).await;
    assert_eq!(reloaded["gender"], json!({"id": 0, "name": ""}));
    assert_eq!(reloaded["nationality"]["name"], "US");
}

#[tokio::test]
async fn health_check_reports_healthy() {
    let app = TestApp::new(MockServices::default()).await;
    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}
