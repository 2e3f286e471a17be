use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};
use wiremock::{
    matchers::{body_partial_json, method, path},
    Mock, ResponseTemplate,
};

use crate::helpers::TestApp;

fn record_page_for(email: &str) -> Value {
    json!({
        "records": [{
            "id": "recEXISTING",
            "fields": { "Email": email, "SignupDate": "2026-01-01T00:00:00+00:00" }
        }]
    })
}

fn created_record_for(email: &str) -> Value {
    json!({
        "records": [{
            "id": "recNEW",
            "fields": { "Email": email, "SignupDate": "2026-01-01T00:00:00+00:00" }
        }]
    })
}

#[tokio::test]
async fn api_subscribe_ok() -> Result<()> {
    let app = TestApp::spawn().await?;
    let email = "john.doe@example.com";

    // Setup the mock record store: no existing row, then a successful create.
    Mock::given(method("GET"))
        .and(path(app.store_table_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "records": [] })))
        .expect(1)
        .mount(&app.store_server)
        .await;
    Mock::given(method("POST"))
        .and(path(app.store_table_path()))
        .and(body_partial_json(
            json!({ "records": [{ "fields": { "Email": email } }] }),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(created_record_for(email)))
        .expect(1)
        .mount(&app.store_server)
        .await;

    let res = app.post_subscribe(&json!({ "email": email })).await?;

    assert_eq!(
        res.status(),
        StatusCode::OK,
        "Wrong response StatusCode: {}",
        res.status()
    );
    let body: Value = res.json().await?;
    assert_eq!(body, json!({ "message": "Successfully subscribed" }));

    Ok(())
}

#[tokio::test]
async fn api_subscribe_persists_optional_fields() -> Result<()> {
    let app = TestApp::spawn().await?;
    let email = "builder@example.com";

    Mock::given(method("GET"))
        .and(path(app.store_table_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "records": [] })))
        .expect(1)
        .mount(&app.store_server)
        .await;
    Mock::given(method("POST"))
        .and(path(app.store_table_path()))
        .and(body_partial_json(json!({
            "records": [{
                "fields": {
                    "Email": email,
                    "Handle": "builder",
                    "WarpcastHandle": "builder.eth",
                    "Topic": "governance",
                    "Type": "landing",
                }
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(created_record_for(email)))
        .expect(1)
        .mount(&app.store_server)
        .await;

    let res = app
        .post_subscribe(&json!({
            "email": email,
            "handle": "builder",
            "warpcastHandle": "builder.eth",
            "topic": "governance",
            "type": "landing",
        }))
        .await?;

    assert_eq!(res.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn api_subscribe_missing_email_is_400() -> Result<()> {
    let app = TestApp::spawn().await?;

    let tests = [
        (json!({}), "Empty json"),
        (json!({ "handle": "jd" }), "Handle only"),
        (json!({ "email": null }), "Null email"),
        (json!({ "email": "" }), "Empty email"),
        (json!({ "email": "   " }), "Blank email"),
    ];

    for (json_request, params) in tests {
        let res = app.post_subscribe(&json_request).await?;
        assert_eq!(
            res.status(),
            StatusCode::BAD_REQUEST,
            "Wrong response: ({}), Expected: ({}); for request with: {params}",
            res.status(),
            StatusCode::BAD_REQUEST
        );

        let body: Value = res.json().await?;
        assert_eq!(
            body,
            json!({ "error": "Email is required" }),
            "Wrong body for request with: {params}"
        );
    }

    Ok(())
}

#[tokio::test]
async fn api_subscribe_invalid_email_is_400() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .post_subscribe(&json!({ "email": "not an email" }))
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    let error = body["error"].as_str().unwrap_or_default();
    assert!(
        error.starts_with("Received invalid input"),
        "Unexpected error message: {error}"
    );

    Ok(())
}

#[tokio::test]
async fn api_subscribe_duplicate_email_is_400() -> Result<()> {
    let app = TestApp::spawn().await?;
    let email = "jane.doe@example.com";

    Mock::given(method("GET"))
        .and(path(app.store_table_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(record_page_for(email)))
        .expect(1)
        .mount(&app.store_server)
        .await;
    // The duplicate must short-circuit before any create call.
    Mock::given(method("POST"))
        .and(path(app.store_table_path()))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.store_server)
        .await;

    let res = app.post_subscribe(&json!({ "email": email })).await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body, json!({ "error": "This email is already registered" }));

    Ok(())
}

#[tokio::test]
async fn api_subscribe_twice_is_ok_then_400() -> Result<()> {
    let app = TestApp::spawn().await?;
    let email = "a@x.com";

    // First lookup finds nothing; every lookup after the insert finds the row.
    Mock::given(method("GET"))
        .and(path(app.store_table_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "records": [] })))
        .up_to_n_times(1)
        .mount(&app.store_server)
        .await;
    Mock::given(method("GET"))
        .and(path(app.store_table_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(record_page_for(email)))
        .mount(&app.store_server)
        .await;
    Mock::given(method("POST"))
        .and(path(app.store_table_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(created_record_for(email)))
        .expect(1)
        .mount(&app.store_server)
        .await;

    let first = app.post_subscribe(&json!({ "email": email })).await?;
    assert_eq!(first.status(), StatusCode::OK);
    let body: Value = first.json().await?;
    assert_eq!(body, json!({ "message": "Successfully subscribed" }));

    let second = app.post_subscribe(&json!({ "email": email })).await?;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let body: Value = second.json().await?;
    assert_eq!(body, json!({ "error": "This email is already registered" }));

    Ok(())
}

#[tokio::test]
async fn api_subscribe_without_store_credentials_is_500() -> Result<()> {
    let app = TestApp::spawn_without_store_credentials().await?;

    // The misconfiguration wins even over an invalid payload.
    let payloads = [json!({ "email": "a@x.com" }), json!({ "email": "nonsense" })];

    for payload in payloads {
        let res = app.post_subscribe(&payload).await?;

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = res.json().await?;
        let error = body["error"].as_str().unwrap_or_default();
        assert!(
            error.starts_with("Failed to subscribe"),
            "Unexpected error message: {error}"
        );
    }

    Ok(())
}

#[tokio::test]
async fn api_subscribe_store_failure_is_500_with_detail() -> Result<()> {
    let app = TestApp::spawn().await?;

    Mock::given(method("GET"))
        .and(path(app.store_table_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "records": [] })))
        .expect(1)
        .mount(&app.store_server)
        .await;
    Mock::given(method("POST"))
        .and(path(app.store_table_path()))
        .respond_with(ResponseTemplate::new(500).set_body_string("INVALID_PERMISSIONS"))
        .expect(1)
        .mount(&app.store_server)
        .await;

    let res = app.post_subscribe(&json!({ "email": "a@x.com" })).await?;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await?;
    let error = body["error"].as_str().unwrap_or_default();
    assert!(
        error.starts_with("Failed to subscribe") && error.contains("INVALID_PERMISSIONS"),
        "Unexpected error message: {error}"
    );

    Ok(())
}
