use waitlist::capture::{CONFLICT_MESSAGE, SUCCESS_MESSAGE};
use wiremock::{Mock, ResponseTemplate, matchers::any};

use crate::helpers::spawn_app;

#[tokio::test]
async fn signup_returns_200_for_valid_form_data() {
    let app = spawn_app().await;
    let body = "email=ursula_le_guin%40gmail.com&section=hero";

    let response = app.post_signup(body.into()).await;

    assert_eq!(200, response.status().as_u16());
    assert_eq!(response.text().await.unwrap(), SUCCESS_MESSAGE);
}

#[tokio::test]
async fn signup_persists_the_new_record() {
    let app = spawn_app().await;
    let body = "email=ursula_le_guin%40gmail.com&section=pricing&plan=pro";

    app.post_signup(body.into()).await;

    let (email, source, user_agent): (String, String, String) =
        sqlx::query_as("SELECT email, source, user_agent FROM signups")
            .fetch_one(&app.db_pool)
            .await
            .expect("Failed to fetch saved signup");

    assert_eq!(email, "ursula_le_guin@gmail.com");
    assert_eq!(source, "pricing:pro");
    assert_eq!(user_agent, "integration-test/1.0");
}

#[tokio::test]
async fn the_same_email_from_another_section_is_a_conflict() {
    let app = spawn_app().await;

    let first = app
        .post_signup("email=ursula_le_guin%40gmail.com&section=hero".into())
        .await;
    let second = app
        .post_signup("email=ursula_le_guin%40gmail.com&section=footer".into())
        .await;

    assert_eq!(first.status().as_u16(), 200);
    assert_eq!(second.status().as_u16(), 409);
    assert_eq!(second.text().await.unwrap(), CONFLICT_MESSAGE);

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM signups")
        .fetch_one(&app.db_pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn concurrent_signups_for_one_email_store_a_single_record() {
    let app = spawn_app().await;
    let body = || "email=ursula_le_guin%40gmail.com&section=hero".to_string();

    let (a, b) = tokio::join!(app.post_signup(body()), app.post_signup(body()));

    let mut statuses = vec![a.status().as_u16(), b.status().as_u16()];
    statuses.sort();
    assert_eq!(statuses, vec![200, 409]);
}

#[tokio::test]
async fn signup_never_calls_the_email_provider() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    app.post_signup("email=ursula_le_guin%40gmail.com&section=hero".into())
        .await;
}

#[tokio::test]
async fn signup_returns_400_when_data_is_missing() {
    let app = spawn_app().await;
    let test_cases = vec![
        ("section=hero", "missing the email"),
        ("email=ursula_le_guin%40gmail.com", "missing the section"),
        ("", "missing both email and section"),
    ];

    for (body, err_message) in test_cases {
        let response = app.post_signup(body.into()).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request when the payload was {}.",
            err_message
        );
    }
}

#[tokio::test]
async fn signup_returns_400_when_fields_are_present_but_invalid() {
    let app = spawn_app().await;
    let test_cases = vec![
        ("email=&section=hero", "empty email"),
        ("email=definitely-not-an-email&section=hero", "invalid email"),
        ("email=ursula%40gmail.com&section=", "empty section"),
        ("email=ursula%40gmail.com&section=hero%3Ax", "section with a colon"),
    ];

    for (body, description) in test_cases {
        let response = app.post_signup(body.into()).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not return a 400 Bad Request when the payload was {}.",
            description
        );
    }

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM signups")
        .fetch_one(&app.db_pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn signup_returns_500_if_the_store_fails() {
    let app = spawn_app().await;
    sqlx::query("ALTER TABLE signups DROP COLUMN source;")
        .execute(&app.db_pool)
        .await
        .unwrap();

    let response = app
        .post_signup("email=ursula_le_guin%40gmail.com&section=hero".into())
        .await;

    assert_eq!(response.status().as_u16(), 500);
}
