use wiremock::{
    Mock, ResponseTemplate,
    matchers::{any, bearer_token, method, path},
};

use crate::helpers::{SITE_URL, WEBHOOK_SECRET, spawn_app_with};

fn webhook_body(email: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "INSERT",
        "table": "signups",
        "record": { "email": email, "source": "pricing:pro" }
    })
}

#[tokio::test]
async fn valid_webhook_sends_one_email_and_relays_the_provider_body() {
    let app = spawn_app_with(|_| {}).await;

    Mock::given(path("/emails"))
        .and(method("POST"))
        .and(bearer_token("test-provider-key"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id":"msg_1"}"#))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let response = app
        .post_welcome_email(&webhook_body("a@b.com"), Some(WEBHOOK_SECRET))
        .await;

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text().await.unwrap(), r#"{"id":"msg_1"}"#);
}

#[tokio::test]
async fn welcome_email_mentions_the_recipient_and_the_site() {
    let app = spawn_app_with(|_| {}).await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.email_server)
        .await;

    app.post_welcome_email(&webhook_body("a@b.com"), Some(WEBHOOK_SECRET))
        .await;

    let received = &app.email_server.received_requests().await.unwrap()[0];
    let body = app.welcome_email_body(received);

    assert_eq!(body["to"], serde_json::json!(["a@b.com"]));
    for part in ["html", "text"] {
        let content = body[part].as_str().unwrap();
        assert!(content.contains("a@b.com"), "{part} misses the recipient");
        assert!(content.contains(SITE_URL), "{part} misses the site url");
    }
}

#[tokio::test]
async fn flat_payload_is_accepted() {
    let app = spawn_app_with(|_| {}).await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let response = app
        .post_welcome_email(&serde_json::json!({ "email": "a@b.com" }), Some(WEBHOOK_SECRET))
        .await;

    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn wrong_or_missing_bearer_token_is_rejected_with_401() {
    let app = spawn_app_with(|_| {}).await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    for token in [None, Some("not-the-secret")] {
        let response = app.post_welcome_email(&webhook_body("a@b.com"), token).await;

        assert_eq!(response.status().as_u16(), 401, "token: {token:?}");
        assert!(response.headers().contains_key("WWW-Authenticate"));
    }
}

#[tokio::test]
async fn open_mode_skips_the_bearer_check() {
    let app = spawn_app_with(|c| c.dispatch.webhook_secret = None).await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let response = app.post_welcome_email(&webhook_body("a@b.com"), None).await;

    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn non_post_methods_are_rejected_with_405() {
    let app = spawn_app_with(|_| {}).await;

    for method in [reqwest::Method::GET, reqwest::Method::PUT, reqwest::Method::DELETE] {
        let response = app
            .api_client
            .request(method.clone(), format!("{}/welcome-email", &app.address))
            .bearer_auth(WEBHOOK_SECRET)
            .send()
            .await
            .expect("Failed to execute request.");

        assert_eq!(response.status().as_u16(), 405, "method: {method}");
    }
}

#[tokio::test]
async fn payload_without_email_is_rejected_with_400() {
    let app = spawn_app_with(|_| {}).await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let test_cases = vec![
        (serde_json::json!({}), "empty object"),
        (serde_json::json!({ "record": {} }), "record without email"),
        (serde_json::json!({ "email": "" }), "empty email"),
        (serde_json::json!({ "email": "not-an-email" }), "malformed email"),
    ];

    for (body, description) in test_cases {
        let response = app.post_welcome_email(&body, Some(WEBHOOK_SECRET)).await;

        assert_eq!(
            response.status().as_u16(),
            400,
            "The API did not fail with 400 Bad Request when the payload was {description}."
        );
    }
}

#[tokio::test]
async fn invalid_json_is_rejected_with_400() {
    let app = spawn_app_with(|_| {}).await;

    let response = app
        .api_client
        .post(format!("{}/welcome-email", &app.address))
        .bearer_auth(WEBHOOK_SECRET)
        .header("Content-Type", "application/json")
        .body("{ not json")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(response.text().await.unwrap(), "Invalid JSON payload");
}

#[tokio::test]
async fn missing_provider_credential_is_rejected_with_500() {
    let app = spawn_app_with(|c| c.email_client.auth_token = None).await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let response = app
        .post_welcome_email(&webhook_body("a@b.com"), Some(WEBHOOK_SECRET))
        .await;

    assert_eq!(response.status().as_u16(), 500);
    assert_eq!(
        response.text().await.unwrap(),
        "Missing email provider credential"
    );
}

#[tokio::test]
async fn authorization_is_checked_before_configuration() {
    let app = spawn_app_with(|c| c.email_client.auth_token = None).await;

    let response = app.post_welcome_email(&webhook_body("a@b.com"), None).await;

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn provider_failure_is_relayed_as_500_with_its_body() {
    let app = spawn_app_with(|_| {}).await;
    let provider_body = r#"{"statusCode":422,"name":"validation_error","message":"Invalid `to` field."}"#;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(422).set_body_string(provider_body))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let response = app
        .post_welcome_email(&webhook_body("a@b.com"), Some(WEBHOOK_SECRET))
        .await;

    assert_eq!(response.status().as_u16(), 500);
    assert_eq!(response.text().await.unwrap(), provider_body);
}

#[tokio::test]
async fn each_invocation_is_a_single_attempt() {
    let app = spawn_app_with(|_| {}).await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let response = app
        .post_welcome_email(&webhook_body("a@b.com"), Some(WEBHOOK_SECRET))
        .await;

    assert_eq!(response.status().as_u16(), 500);
}
