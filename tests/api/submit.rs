use crate::helpers::{refused_url, spawn_app, spawn_app_with, valid_submission, WEBHOOK_PATH};
use serde_json::{json, Value};
use subscription_relay::routes::MAX_BODY_SIZE;
use wiremock::matchers::{any, header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[actix_rt::test]
async fn submit_returns_200_and_forwards_the_webhook_json() {
    let app = spawn_app().await;

    Mock::given(path(WEBHOOK_PATH))
        .and(method("POST"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "sub_42"})))
        .expect(1)
        .mount(&app.webhook_server)
        .await;

    let response = app.post_submission(&valid_submission()).await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"success": true, "data": {"id": "sub_42"}}));
}

#[actix_rt::test]
async fn submit_renames_fields_for_the_webhook() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.webhook_server)
        .await;

    app.post_submission(&valid_submission()).await;

    let bodies = app.webhook_bodies().await;
    assert_eq!(
        bodies[0],
        json!({
            "name": "Ursula Le Guin",
            "phone_number": "+1 555 010 2030",
            "email": "ursula@example.com",
            "notes": "Call after 5pm",
            "service_price": 49.99,
            "service_name": "Gold plan",
            "start_date": "2024-01-31",
            "end_date": "2024-02-29"
        })
    );
}

#[actix_rt::test]
async fn omitted_or_empty_notes_are_forwarded_as_null() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&app.webhook_server)
        .await;

    let mut without_notes = valid_submission();
    without_notes.as_object_mut().unwrap().remove("notes");
    let mut empty_notes = valid_submission();
    empty_notes["notes"] = json!("");

    app.post_submission(&without_notes).await;
    app.post_submission(&empty_notes).await;

    for body in app.webhook_bodies().await {
        assert_eq!(body["notes"], Value::Null);
        assert!(body.as_object().unwrap().contains_key("notes"));
    }
}

#[actix_rt::test]
async fn a_numeric_string_price_is_forwarded_as_a_number() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.webhook_server)
        .await;

    let mut body = valid_submission();
    body["price"] = json!("120");

    let response = app.post_submission(&body).await;

    assert_eq!(200, response.status().as_u16());
    assert_eq!(app.webhook_bodies().await[0]["service_price"], json!(120.0));
}

#[actix_rt::test]
async fn submit_returns_400_when_data_is_missing() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.webhook_server)
        .await;

    let test_cases = vec![
        ("name", "missing the name"),
        ("phone", "missing the phone"),
        ("email", "missing the email"),
        ("price", "missing the price"),
        ("service", "missing the service"),
        ("start_date", "missing the start date"),
        ("end_date", "missing the end date"),
    ];

    for (field, error_message) in test_cases {
        let mut body = valid_submission();
        body.as_object_mut().unwrap().remove(field);

        let response = app.post_submission(&body).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request when {}",
            error_message
        );
        let envelope: Value = response.json().await.unwrap();
        assert_eq!(envelope["success"], json!(false));
        assert_eq!(
            envelope["errors"],
            json!([{"code": "invalid_type", "path": [field], "message": "Required"}])
        );
    }
}

#[actix_rt::test]
async fn submit_returns_400_when_fields_are_invalid() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.webhook_server)
        .await;

    let test_cases = vec![
        ("name", json!("U"), "one character name"),
        ("phone", json!("555-0102"), "short phone"),
        ("email", json!("not-an-email"), "invalid email"),
        ("price", json!(-1), "negative price"),
        ("service", json!(""), "empty service"),
    ];

    for (field, value, description) in test_cases {
        let mut body = valid_submission();
        body[field] = value;

        let response = app.post_submission(&body).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not return a 400 with payload {}",
            description
        );
        let envelope: Value = response.json().await.unwrap();
        assert_eq!(envelope["errors"][0]["path"], json!([field]));
    }
}

#[actix_rt::test]
async fn an_end_date_before_the_start_date_is_reported_on_end_date() {
    let app = spawn_app().await;

    let mut body = valid_submission();
    body["start_date"] = json!("2024-03-01");
    body["end_date"] = json!("2024-02-01");

    let response = app.post_submission(&body).await;

    assert_eq!(400, response.status().as_u16());
    let envelope: Value = response.json().await.unwrap();
    assert_eq!(
        envelope["errors"],
        json!([{
            "code": "custom",
            "path": ["end_date"],
            "message": "End date must be after or equal to start date"
        }])
    );
}

#[actix_rt::test]
async fn a_webhook_error_status_and_message_are_relayed() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(502).set_body_json(json!({"message": "bad gateway"})))
        .expect(1)
        .mount(&app.webhook_server)
        .await;

    let response = app.post_submission(&valid_submission()).await;

    assert_eq!(502, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"success": false, "message": "bad gateway"}));
}

#[actix_rt::test]
async fn a_plain_text_webhook_error_is_relayed_verbatim() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(503).set_body_string("Workflow is not active"))
        .expect(1)
        .mount(&app.webhook_server)
        .await;

    let response = app.post_submission(&valid_submission()).await;

    assert_eq!(503, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({"success": false, "message": "Workflow is not active"})
    );
}

#[actix_rt::test]
async fn an_empty_webhook_error_mentions_the_status_code() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&app.webhook_server)
        .await;

    let response = app.post_submission(&valid_submission()).await;

    assert_eq!(404, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["message"],
        json!("Failed to submit form to external endpoint (Status: 404)")
    );
}

#[actix_rt::test]
async fn a_plain_text_success_is_wrapped_as_a_message() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&app.webhook_server)
        .await;

    let response = app.post_submission(&valid_submission()).await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"success": true, "data": {"message": "ok"}}));
}

#[actix_rt::test]
async fn an_empty_success_gets_a_placeholder_payload() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&app.webhook_server)
        .await;

    let response = app.post_submission(&valid_submission()).await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"success": true, "data": {"success": true}}));
}

#[actix_rt::test]
async fn a_failing_webhook_is_called_exactly_once() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&app.webhook_server)
        .await;

    let response = app.post_submission(&valid_submission()).await;

    assert_eq!(500, response.status().as_u16());
}

#[actix_rt::test]
async fn an_unreachable_webhook_is_a_network_error() {
    let url = refused_url();
    let app = spawn_app_with(|c| c.webhook.url = url.clone()).await;

    let response = app.post_submission(&valid_submission()).await;

    assert_eq!(500, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], json!(false));
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("Network"), "Unexpected message: {}", message);
    assert!(!message.contains(&url), "The webhook URL leaked: {}", message);
}

#[actix_rt::test]
async fn a_webhook_timeout_is_a_network_error_without_retry() {
    let app = spawn_app_with(|c| c.webhook.timeout_milliseconds = Some(200)).await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(5)))
        .expect(1)
        .mount(&app.webhook_server)
        .await;

    let response = app.post_submission(&valid_submission()).await;

    assert_eq!(500, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("Network"));
}

#[actix_rt::test]
async fn a_malformed_body_is_an_internal_error() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.webhook_server)
        .await;

    let response = app.post_raw_submission("{\"name\": ".to_string()).await;

    assert_eq!(500, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({"success": false, "message": "Internal server error"})
    );
}

#[actix_rt::test]
async fn an_oversized_body_gets_the_error_envelope() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.webhook_server)
        .await;

    let mut submission = valid_submission();
    submission["notes"] = json!("x".repeat(MAX_BODY_SIZE));

    let response = app.post_submission(&submission).await;

    assert_eq!(500, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({"success": false, "message": "Internal server error"})
    );
}

#[actix_rt::test]
async fn a_body_just_under_the_limit_is_relayed() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.webhook_server)
        .await;

    let mut submission = valid_submission();
    submission["notes"] = json!("x".repeat(MAX_BODY_SIZE / 2));

    let response = app.post_submission(&submission).await;

    assert_eq!(200, response.status().as_u16());
}
