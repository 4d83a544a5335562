mod common;

use axum::http::StatusCode;
use common::{spawn_mock_services, MockServices};
use name_enricher::{HttpNameLookup, LookupError, NameLookup};
use serde_json::json;

#[tokio::test]
async fn fetches_all_three_lookups() {
    let config = spawn_mock_services(MockServices::default()).await;
    let lookup = HttpNameLookup::new(&config).unwrap();

    assert_eq!(lookup.fetch_age("John").await.unwrap(), 35);
    assert_eq!(lookup.fetch_gender_label("John").await.unwrap(), "male");
    assert_eq!(lookup.fetch_nationality_code("John").await.unwrap(), "US");
}

#[tokio::test]
async fn tie_keeps_the_first_country() {
    let config = spawn_mock_services(MockServices {
        countries: json!([
            {"country_id": "IE", "probability": 0.3},
            {"country_id": "GB", "probability": 0.3}
        ]),
        ..MockServices::default()
    })
    .await;
    let lookup = HttpNameLookup::new(&config).unwrap();
    assert_eq!(lookup.fetch_nationality_code("Sean").await.unwrap(), "IE");
}

#[tokio::test]
async fn empty_country_list_is_no_country() {
    let config = spawn_mock_services(MockServices {
        countries: json!([]),
        ..MockServices::default()
    })
    .await;
    let lookup = HttpNameLookup::new(&config).unwrap();
    let err = lookup.fetch_nationality_code("Zyx").await.unwrap_err();
    assert!(matches!(err, LookupError::NoCountry { .. }));
}

#[tokio::test]
async fn unknown_name_yields_defaults() {
    let config = spawn_mock_services(MockServices {
        age: json!(null),
        gender: json!(null),
        ..MockServices::default()
    })
    .await;
    let lookup = HttpNameLookup::new(&config).unwrap();
    assert_eq!(lookup.fetch_age("Zyx").await.unwrap(), 0);
    assert_eq!(lookup.fetch_gender_label("Zyx").await.unwrap(), "");
}

#[tokio::test]
async fn error_status_is_a_transport_error() {
    let config = spawn_mock_services(MockServices {
        age_status: StatusCode::INTERNAL_SERVER_ERROR,
        ..MockServices::default()
    })
    .await;
    let lookup = HttpNameLookup::new(&config).unwrap();
    let err = lookup.fetch_age("John").await.unwrap_err();
    assert!(matches!(err, LookupError::Transport { service: "age", .. }));
}

#[tokio::test]
async fn non_json_body_is_a_decode_error() {
    let mut config = spawn_mock_services(MockServices::default()).await;
    config.gender_url = config.age_url.replace("/age", "/garbage");
    let lookup = HttpNameLookup::new(&config).unwrap();
    let err = lookup.fetch_gender_label("John").await.unwrap_err();
    assert!(matches!(err, LookupError::Decode { service: "gender", .. }));
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let mut config = spawn_mock_services(MockServices::default()).await;
    config.age_url = "http://127.0.0.1:1/age".to_string();
    let lookup = HttpNameLookup::new(&config).unwrap();
    let err = lookup.fetch_age("John").await.unwrap_err();
    assert!(matches!(err, LookupError::Transport { .. }));
}
