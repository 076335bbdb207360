use crate::helpers::TestApp;

#[actix_web::test]
async fn check_health_route(){
    let app = TestApp::spawn_app().await;
    let url = app.get_app_url();

    let response = reqwest::get(format!("{}/health", url))
                    .await
                    .expect("Failed to get response");

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text().await.unwrap(), "Working");
}

#[actix_web::test]
async fn unknown_route_is_not_found(){
    let app = TestApp::spawn_app().await;

    let response = app.get("/api/festival-tickets", None).await;

    assert_eq!(response.status().as_u16(), 404);
}
