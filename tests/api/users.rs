use foodfest::models::Role;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::helpers::{id_of, TestApp, PASSWORD};

#[actix_web::test]
async fn user_administration_is_admin_only(){
    let app = TestApp::spawn_app().await;
    let user = app.create_user(Role::User).await;
    let staff = app.create_user(Role::Staff).await;
    let user_path = format!("/api/users/{}", user.id);

    for token in [user.token.as_str(), staff.token.as_str()] {
        assert_eq!(app.get("/api/users", Some(token)).await.status().as_u16(), 403);
        assert_eq!(app.get(&user_path, Some(token)).await.status().as_u16(), 403);
        assert_eq!(app.put_json(&user_path, &json!({ "role": "ADMIN" }), Some(token)).await.status().as_u16(), 403);
        assert_eq!(app.delete(&user_path, Some(token)).await.status().as_u16(), 403);
    }

    assert_eq!(app.get("/api/users", None).await.status().as_u16(), 401);

    let me: Value = app.get("/api/auth/me", Some(&user.token)).await.json().await.unwrap();
    assert_eq!(me["role"], "USER");
}

#[actix_web::test]
async fn admin_lists_and_filters_users(){
    let app = TestApp::spawn_app().await;
    let admin = app.create_user(Role::Admin).await;
    app.create_user(Role::User).await;
    let staff = app.create_user(Role::Staff).await;

    let response = app.get("/api/users", Some(&admin.token)).await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["pagination"]["total"], 3);
    assert!(body["items"].as_array().unwrap().iter().all(|user| user.get("password").is_none()));

    let body: Value = app.get("/api/users?role=STAFF", Some(&admin.token)).await.json().await.unwrap();
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["items"][0]["id"], json!(staff.id));

    let prefix = staff.email.split('.').next().unwrap();
    let body: Value = app.get(&format!("/api/users?search={}", prefix), Some(&admin.token))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["pagination"]["total"], 1);

    let single: Value = app.get(&format!("/api/users/{}", staff.id), Some(&admin.token)).await.json().await.unwrap();
    assert_eq!(single["email"], json!(staff.email));

    let missing = app.get(&format!("/api/users/{}", Uuid::new_v4()), Some(&admin.token)).await;
    assert_eq!(missing.status().as_u16(), 404);
}

#[actix_web::test]
async fn admin_creates_a_user_who_can_sign_in(){
    let app = TestApp::spawn_app().await;
    let admin = app.create_user(Role::Admin).await;

    let response = app.post_json("/api/users", &json!({
        "name": "Festival Cashier",
        "email": "cashier@festival.test",
        "password": PASSWORD,
        "role": "STAFF"
    }), Some(&admin.token)).await;
    assert_eq!(response.status().as_u16(), 201);

    let created: Value = response.json().await.unwrap();
    assert_eq!(created["role"], "STAFF");
    assert!(created.get("password").is_none());

    let signin = app.signin("cashier@festival.test", PASSWORD).await;
    assert_eq!(signin.status().as_u16(), 200);

    let duplicate = app.post_json("/api/users", &json!({
        "name": "Someone Else",
        "email": "cashier@festival.test",
        "password": PASSWORD
    }), Some(&admin.token)).await;
    assert_eq!(duplicate.status().as_u16(), 409);
}

#[actix_web::test]
async fn admin_updates_a_user(){
    let app = TestApp::spawn_app().await;
    let admin = app.create_user(Role::Admin).await;
    let user = app.create_user(Role::User).await;
    let other = app.create_user(Role::User).await;
    let path = format!("/api/users/{}", user.id);

    let response = app.put_json(&path, &json!({ "role": "STAFF", "name": "Promoted Volunteer" }), Some(&admin.token)).await;
    assert_eq!(response.status().as_u16(), 200);
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["role"], "STAFF");
    assert_eq!(updated["name"], "Promoted Volunteer");
    assert_eq!(updated["email"], json!(user.email));

    // Keeping one's own email is not a conflict
    let same_email = app.put_json(&path, &json!({ "email": user.email }), Some(&admin.token)).await;
    assert_eq!(same_email.status().as_u16(), 200);

    let conflict = app.put_json(&path, &json!({ "email": other.email }), Some(&admin.token)).await;
    assert_eq!(conflict.status().as_u16(), 409);

    let invalid = app.put_json(&path, &json!({ "email": "nope" }), Some(&admin.token)).await;
    assert_eq!(invalid.status().as_u16(), 400);

    let missing = app.put_json(&format!("/api/users/{}", Uuid::new_v4()), &json!({ "name": "Ghost" }), Some(&admin.token)).await;
    assert_eq!(missing.status().as_u16(), 404);
}

#[actix_web::test]
async fn profile_update_ignores_role(){
    let app = TestApp::spawn_app().await;
    let user = app.create_user(Role::User).await;

    let response = app.put_json("/api/users/profile", &json!({
        "name": "Renamed Visitor",
        "telephone": "+33 6 12 34 56 78",
        "role": "SUPER_ADMIN"
    }), Some(&user.token)).await;
    assert_eq!(response.status().as_u16(), 200);

    let profile: Value = response.json().await.unwrap();
    assert_eq!(profile["id"], json!(user.id));
    assert_eq!(profile["name"], "Renamed Visitor");
    assert_eq!(profile["telephone"], "+33 6 12 34 56 78");
    assert_eq!(profile["role"], "USER");

    let me: Value = app.get("/api/auth/me", Some(&user.token)).await.json().await.unwrap();
    assert_eq!(me["role"], "USER");

    let unauthenticated = app.put_json("/api/users/profile", &json!({ "name": "Nobody" }), None).await;
    assert_eq!(unauthenticated.status().as_u16(), 401);
}

#[actix_web::test]
async fn deleting_a_user_removes_their_orders_and_reviews(){
    let app = TestApp::spawn_app().await;
    let admin = app.create_user(Role::Admin).await;
    let chef = app.create_user(Role::User).await;
    let visitor = app.create_user(Role::User).await;

    let dish = app.create_dish(&chef.token, "Socca", 500).await;
    let order = app.create_order(&visitor.token, &id_of(&dish), 2).await;
    let review: Value = app.create_review(&visitor.token, &id_of(&dish)).await.json().await.unwrap();

    let response = app.delete(&format!("/api/users/{}", visitor.id), Some(&admin.token)).await;
    assert_eq!(response.status().as_u16(), 200);

    assert_eq!(app.get(&format!("/api/users/{}", visitor.id), Some(&admin.token)).await.status().as_u16(), 404);
    assert_eq!(app.get(&format!("/api/orders/{}", id_of(&order)), Some(&admin.token)).await.status().as_u16(), 404);
    assert_eq!(app.get(&format!("/api/reviews/{}", id_of(&review)), None).await.status().as_u16(), 404);

    // With its only order gone the dish can be deleted
    let deleted = app.delete(&format!("/api/dishes/{}", id_of(&dish)), Some(&chef.token)).await;
    assert_eq!(deleted.status().as_u16(), 200);
}

#[actix_web::test]
async fn deleting_a_dish_owner_keeps_the_dish(){
    let app = TestApp::spawn_app().await;
    let admin = app.create_user(Role::Admin).await;
    let chef = app.create_user(Role::User).await;
    let dish = app.create_dish(&chef.token, "Pichade", 650).await;

    app.delete(&format!("/api/users/{}", chef.id), Some(&admin.token)).await;

    let body: Value = app.get(&format!("/api/dishes/{}", id_of(&dish)), None).await.json().await.unwrap();
    assert!(body["userId"].is_null());
    assert!(body["user"].is_null());
}
