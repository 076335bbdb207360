use std::time::{Duration, Instant};

use fake::{faker::{internet::en::SafeEmail, name::en::Name}, Fake};
use serde_json::{json, Value};
use wiremock::{
    matchers::{any, header_exists, method, path},
    Mock, ResponseTemplate
};

use crate::helpers::{TestApp, PASSWORD};

fn signup_body() -> Value {
    let name: String = Name().fake();
    let email: String = SafeEmail().fake();
    json!({ "name": name, "email": email, "password": PASSWORD, "telephone": "06 12 34 56 78" })
}

#[actix_web::test]
async fn signup_returns_201_with_token_and_never_the_password(){
    let app = TestApp::spawn_app().await;
    let body = signup_body();

    let response = app.signup(&body).await;
    assert_eq!(response.status().as_u16(), 201);

    let text = response.text().await.unwrap();
    assert!(!text.contains("password"));
    assert!(!text.contains(PASSWORD));

    let json: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["user"]["email"], body["email"]);
    assert_eq!(json["user"]["role"], "USER");
    assert!(json["token"].as_str().is_some());

    let stored = app.repository
        .find_user_by_email(body["email"].as_str().unwrap())
        .unwrap()
        .unwrap();
    assert_ne!(stored.password, PASSWORD);

    let me = app.get("/api/auth/me", json["token"].as_str()).await;
    assert_eq!(me.status().as_u16(), 200);
    let me: Value = me.json().await.unwrap();
    assert_eq!(me["id"], json["user"]["id"]);
    assert!(me.get("password").is_none());
}

#[actix_web::test]
async fn signup_applies_the_requested_role(){
    let app = TestApp::spawn_app().await;
    let mut body = signup_body();
    body["role"] = json!("STAFF");

    let response = app.signup(&body).await;
    assert_eq!(response.status().as_u16(), 201);

    let json: Value = response.json().await.unwrap();
    assert_eq!(json["user"]["role"], "STAFF");
}

#[actix_web::test]
async fn signup_with_registered_email_is_a_conflict(){
    let app = TestApp::spawn_app().await;
    let body = signup_body();

    assert_eq!(app.signup(&body).await.status().as_u16(), 201);
    let response = app.signup(&body).await;

    assert_eq!(response.status().as_u16(), 409);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["error"], "Email already in use");
}

#[actix_web::test]
async fn signup_with_invalid_data_is_rejected(){
    let app = TestApp::spawn_app().await;

    let test_cases = vec![
        (json!({ "name": "", "email": "ana@festival.test", "password": PASSWORD }), "empty name"),
        (json!({ "name": "Ana", "email": "not-an-email", "password": PASSWORD }), "invalid email"),
        (json!({ "name": "Ana", "email": "ana@festival.test", "password": "abc" }), "short password"),
        (json!({ "name": "Ana", "email": "ana@festival.test", "password": PASSWORD, "telephone": "call me" }), "invalid telephone"),
        (json!({ "name": "Ana", "password": PASSWORD }), "missing email"),
        (json!({ "name": "Ana", "email": "ana@festival.test", "password": PASSWORD, "role": "CHEF" }), "unknown role")
    ];

    for (body, description) in test_cases {
        let response = app.signup(&body).await;
        assert_eq!(
            response.status().as_u16(),
            400,
            "The API did not fail with 400 when the payload had an {}",
            description
        );

        let json: Value = response.json().await.unwrap();
        assert!(json["error"].as_str().is_some(), "Missing error message for {}", description);
    }
}

#[actix_web::test]
async fn signin_failures_are_indistinguishable(){
    let app = TestApp::spawn_app().await;
    let body = signup_body();
    app.signup(&body).await;
    let email = body["email"].as_str().unwrap();

    let wrong_password = app.signin(email, "not-the-password").await;
    let unknown_email = app.signin("nobody@festival.test", PASSWORD).await;

    assert_eq!(wrong_password.status().as_u16(), 401);
    assert_eq!(unknown_email.status().as_u16(), 401);
    assert_eq!(wrong_password.text().await.unwrap(), unknown_email.text().await.unwrap());

    let success = app.signin(email, PASSWORD).await;
    assert_eq!(success.status().as_u16(), 200);
}

#[actix_web::test]
async fn me_requires_a_valid_bearer_token(){
    let app = TestApp::spawn_app().await;

    let missing = app.get("/api/auth/me", None).await;
    assert_eq!(missing.status().as_u16(), 401);

    let garbage = app.get("/api/auth/me", Some("definitely.not.a-jwt")).await;
    assert_eq!(garbage.status().as_u16(), 401);

    let wrong_scheme = app.request(reqwest::Method::GET, "/api/auth/me", None)
        .header("Authorization", "Basic dXNlcjpwYXNz")
        .send()
        .await
        .unwrap();
    assert_eq!(wrong_scheme.status().as_u16(), 401);
}

#[actix_web::test]
async fn me_fails_once_the_user_is_deleted(){
    let app = TestApp::spawn_app().await;
    let user = app.create_user(foodfest::models::Role::User).await;

    app.repository.delete_user(user.id).unwrap();

    let response = app.get("/api/auth/me", Some(&user.token)).await;
    assert_eq!(response.status().as_u16(), 401);
}

#[actix_web::test]
async fn reset_password_answers_generically_and_mails_only_known_users(){
    let app = TestApp::spawn_app().await;
    let body = signup_body();
    app.signup(&body).await;

    let guard = Mock::given(path("/email"))
        .and(method("POST"))
        .and(header_exists("X-Postmark-Server-Token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount_as_scoped(&app.email_api)
        .await;

    let known = app.post_json("/api/auth/reset-password", &json!({ "email": body["email"] }), None).await;
    guard.wait_until_satisfied().await;
    let unknown = app.post_json("/api/auth/reset-password", &json!({ "email": "ghost@festival.test" }), None).await;

    assert_eq!(known.status().as_u16(), 200);
    assert_eq!(unknown.status().as_u16(), 200);
    assert_eq!(known.text().await.unwrap(), unknown.text().await.unwrap());

    let requests = guard.received_requests().await;
    assert_eq!(requests.len(), 1);
    let email: Value = requests[0].body_json().unwrap();
    assert_eq!(email["To"], body["email"]);
}

#[actix_web::test]
async fn reset_password_link_sets_a_new_password(){
    let app = TestApp::spawn_app().await;
    let body = signup_body();
    app.signup(&body).await;
    let email = body["email"].as_str().unwrap();

    let guard = Mock::given(path("/email"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount_as_scoped(&app.email_api)
        .await;

    app.post_json("/api/auth/reset-password", &json!({ "email": email }), None).await;
    guard.wait_until_satisfied().await;

    let requests = guard.received_requests().await;
    let sent: Value = requests[0].body_json().unwrap();
    let links = app.get_links(sent["TextBody"].as_str().unwrap());
    assert_eq!(links.len(), 1);

    let link = reqwest::Url::parse(&links[0]).unwrap();
    assert_eq!(link.path(), "/reset-password");
    let token = link.query_pairs()
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.into_owned())
        .expect("Reset link without token");

    // A reset token is not an access token
    let as_bearer = app.get("/api/auth/me", Some(&token)).await;
    assert_eq!(as_bearer.status().as_u16(), 401);

    let confirm = app.post_json(
        "/api/auth/reset-password/confirm",
        &json!({ "token": token, "password": "brand-new-secret" }),
        None
    ).await;
    assert_eq!(confirm.status().as_u16(), 200);

    assert_eq!(app.signin(email, PASSWORD).await.status().as_u16(), 401);
    assert_eq!(app.signin(email, "brand-new-secret").await.status().as_u16(), 200);
}

#[actix_web::test]
async fn reset_confirmation_refuses_access_tokens(){
    let app = TestApp::spawn_app().await;
    let user = app.create_user(foodfest::models::Role::User).await;

    let response = app.post_json(
        "/api/auth/reset-password/confirm",
        &json!({ "token": user.token, "password": "brand-new-secret" }),
        None
    ).await;

    assert_eq!(response.status().as_u16(), 401);
}

#[actix_web::test]
async fn reset_password_hides_email_delivery_failures(){
    let app = TestApp::spawn_app().await;
    let body = signup_body();
    app.signup(&body).await;

    let guard = Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount_as_scoped(&app.email_api)
        .await;

    let response = app.post_json("/api/auth/reset-password", &json!({ "email": body["email"] }), None).await;

    assert_eq!(response.status().as_u16(), 200);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["message"], "If this email exists, a reset link has been sent");
    guard.wait_until_satisfied().await;
}

#[actix_web::test]
async fn reset_password_does_not_wait_for_the_email_api(){
    let app = TestApp::spawn_app().await;
    let body = signup_body();
    app.signup(&body).await;

    let guard = Mock::given(path("/email"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .expect(1)
        .mount_as_scoped(&app.email_api)
        .await;

    let started = Instant::now();
    let known = app.post_json("/api/auth/reset-password", &json!({ "email": body["email"] }), None).await;
    let known_elapsed = started.elapsed();

    let started = Instant::now();
    let unknown = app.post_json("/api/auth/reset-password", &json!({ "email": "ghost@festival.test" }), None).await;
    let unknown_elapsed = started.elapsed();

    assert_eq!(known.status().as_u16(), 200);
    assert_eq!(unknown.status().as_u16(), 200);
    assert!(known_elapsed < Duration::from_secs(1), "Known email answered in {:?}", known_elapsed);
    assert!(unknown_elapsed < Duration::from_secs(1), "Unknown email answered in {:?}", unknown_elapsed);

    guard.wait_until_satisfied().await;
}
