use foodfest::models::{ReviewChanges, ReviewStatus, Role};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::helpers::{id_of, TestApp};

#[actix_web::test]
async fn create_dish_returns_201_with_owner_summary(){
    let app = TestApp::spawn_app().await;
    let user = app.create_user(Role::User).await;

    let dish = app.create_dish(&user.token, "Socca niçoise", 850).await;

    assert_eq!(dish["name"], "Socca niçoise");
    assert_eq!(dish["price"], 850);
    assert_eq!(dish["imageUrl"], "https://img.festival.test/dish.png");
    assert_eq!(dish["userId"], json!(user.id));
    assert_eq!(dish["user"]["name"], json!(user.name));
    assert_eq!(dish["reviewCount"], 0);
    assert!(dish["user"].get("email").is_none());
}

#[actix_web::test]
async fn create_dish_requires_authentication(){
    let app = TestApp::spawn_app().await;

    let response = app.post_json("/api/dishes", &json!({
        "name": "Pan bagnat",
        "description": "Tuna, egg and olive sandwich",
        "imageUrl": "https://img.festival.test/pan-bagnat.png",
        "price": 700
    }), None).await;

    assert_eq!(response.status().as_u16(), 401);
}

#[actix_web::test]
async fn create_dish_with_invalid_fields_is_rejected(){
    let app = TestApp::spawn_app().await;
    let user = app.create_user(Role::User).await;

    let valid = json!({
        "name": "Pissaladière",
        "description": "Onion tart with anchovies and olives",
        "imageUrl": "https://img.festival.test/pissaladiere.png",
        "price": 600
    });

    let test_cases = vec![
        ("name", json!("Pi"), "too short name"),
        ("description", json!("Tart"), "too short description"),
        ("imageUrl", json!("not a url"), "invalid image url"),
        ("price", json!(0), "zero price"),
        ("price", json!(-10), "negative price"),
        ("price", json!("ten"), "non numeric price")
    ];

    for (field, value, description) in test_cases {
        let mut body = valid.clone();
        body[field] = value;

        let response = app.post_json("/api/dishes", &body, Some(&user.token)).await;
        assert_eq!(
            response.status().as_u16(),
            400,
            "The API did not reject a dish with a {}",
            description
        );
    }
}

#[actix_web::test]
async fn list_dishes_is_paginated(){
    let app = TestApp::spawn_app().await;
    let user = app.create_user(Role::User).await;

    for i in 0..25 {
        app.create_dish(&user.token, &format!("Festival dish {}", i), 100 + i).await;
    }

    let response = app.get("/api/dishes?page=3&limit=10", None).await;
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["pagination"]["total"], 25);
    assert_eq!(body["pagination"]["pages"], 3);
    assert_eq!(body["pagination"]["page"], 3);
    assert_eq!(body["items"].as_array().unwrap().len(), 5);

    let empty: Value = app.get("/api/dishes?page=4&limit=10", None).await.json().await.unwrap();
    assert!(empty["items"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn list_dishes_rejects_bad_paging(){
    let app = TestApp::spawn_app().await;

    for query in ["page=0", "limit=0", "limit=101", "page=abc", "page=9223372036854775807&limit=100"] {
        let response = app.get(&format!("/api/dishes?{}", query), None).await;
        assert_eq!(response.status().as_u16(), 400, "Query {} was accepted", query);
    }
}

#[actix_web::test]
async fn list_dishes_filters_by_search_price_and_owner(){
    let app = TestApp::spawn_app().await;
    let alice = app.create_user(Role::User).await;
    let bob = app.create_user(Role::User).await;

    app.create_dish(&alice.token, "Socca", 500).await;
    app.create_dish(&alice.token, "Ratatouille", 1200).await;
    app.create_dish(&bob.token, "Tarte tropézienne", 900).await;

    let body: Value = app.get("/api/dishes?search=SOCCA", None).await.json().await.unwrap();
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["items"][0]["name"], "Socca");

    // Matches on description too
    let body: Value = app.get("/api/dishes?search=festival%20grounds", None).await.json().await.unwrap();
    assert_eq!(body["pagination"]["total"], 3);

    let body: Value = app.get("/api/dishes?minPrice=600&maxPrice=1000", None).await.json().await.unwrap();
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["items"][0]["name"], "Tarte tropézienne");

    let body: Value = app.get(&format!("/api/dishes?ownerId={}", alice.id), None).await.json().await.unwrap();
    assert_eq!(body["pagination"]["total"], 2);
}

#[actix_web::test]
async fn get_dish_embeds_only_approved_reviews(){
    let app = TestApp::spawn_app().await;
    let owner = app.create_user(Role::User).await;
    let approved_author = app.create_user(Role::User).await;
    let pending_author = app.create_user(Role::User).await;

    let dish = app.create_dish(&owner.token, "Daube provençale", 1500).await;
    let dish_id = id_of(&dish);

    let approved: Value = app.create_review(&approved_author.token, &dish_id).await.json().await.unwrap();
    app.create_review(&pending_author.token, &dish_id).await;

    let approved_id: Uuid = serde_json::from_value(approved["id"].clone()).unwrap();
    app.repository
        .update_review(approved_id, ReviewChanges{ status: Some(ReviewStatus::Approved), ..Default::default() })
        .unwrap();

    let response = app.get(&format!("/api/dishes/{}", dish_id), None).await;
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["id"], dish["id"]);
    assert_eq!(body["reviewCount"], 2);
    let reviews = body["reviews"].as_array().unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0]["id"], approved["id"]);
    assert_eq!(reviews[0]["status"], "APPROVED");
}

#[actix_web::test]
async fn get_dish_with_unknown_or_malformed_id(){
    let app = TestApp::spawn_app().await;

    let missing = app.get(&format!("/api/dishes/{}", Uuid::new_v4()), None).await;
    assert_eq!(missing.status().as_u16(), 404);
    let body: Value = missing.json().await.unwrap();
    assert_eq!(body["error"], "Dish not found");

    let malformed = app.get("/api/dishes/not-a-uuid", None).await;
    assert_eq!(malformed.status().as_u16(), 400);
}

#[actix_web::test]
async fn update_dish_changes_only_present_fields(){
    let app = TestApp::spawn_app().await;
    let user = app.create_user(Role::User).await;
    let dish = app.create_dish(&user.token, "Barbajuans", 650).await;

    let response = app.put_json(
        &format!("/api/dishes/{}", id_of(&dish)),
        &json!({ "price": 700 }),
        Some(&user.token)
    ).await;
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["price"], 700);
    assert_eq!(body["name"], "Barbajuans");
    assert_eq!(body["description"], dish["description"]);

    let invalid = app.put_json(
        &format!("/api/dishes/{}", id_of(&dish)),
        &json!({ "price": -1 }),
        Some(&user.token)
    ).await;
    assert_eq!(invalid.status().as_u16(), 400);

    let missing = app.put_json(
        &format!("/api/dishes/{}", Uuid::new_v4()),
        &json!({ "price": 700 }),
        Some(&user.token)
    ).await;
    assert_eq!(missing.status().as_u16(), 404);
}

#[actix_web::test]
async fn delete_dish_referenced_by_an_order_is_a_conflict(){
    let app = TestApp::spawn_app().await;
    let user = app.create_user(Role::User).await;
    let dish = app.create_dish(&user.token, "Fougasse", 400).await;
    let dish_id = id_of(&dish);

    app.create_order(&user.token, &dish_id, 1).await;

    let response = app.delete(&format!("/api/dishes/{}", dish_id), Some(&user.token)).await;
    assert_eq!(response.status().as_u16(), 409);

    let still_there = app.get(&format!("/api/dishes/{}", dish_id), None).await;
    assert_eq!(still_there.status().as_u16(), 200);
}

#[actix_web::test]
async fn delete_dish_removes_it(){
    let app = TestApp::spawn_app().await;
    let user = app.create_user(Role::User).await;
    let dish = app.create_dish(&user.token, "Tapenade", 300).await;
    let dish_id = id_of(&dish);

    let response = app.delete(&format!("/api/dishes/{}", dish_id), Some(&user.token)).await;
    assert_eq!(response.status().as_u16(), 200);

    let gone = app.get(&format!("/api/dishes/{}", dish_id), None).await;
    assert_eq!(gone.status().as_u16(), 404);
}
