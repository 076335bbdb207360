use std::sync::Arc;

use fake::{faker::{internet::en::SafeEmail, name::en::Name}, Fake};
use foodfest::{
    configuration::Settings,
    models::{Role, UserChanges},
    repository::{InMemoryRepository, Repository},
    startup::Application,
    telemetry::{get_subscriber, init_subscriber}
};
use once_cell::sync::Lazy;
use reqwest::{redirect::Policy, Method, RequestBuilder, Response};
use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::MockServer;

static LOGGER_INSTANCE: Lazy<()> = Lazy::new(|| {
    let log_level = "info".to_string();
    let name = "foodfest-test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(name, log_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(name, log_level, std::io::sink);
        init_subscriber(subscriber);
    }
});

pub const PASSWORD: &str = "festival-2024";

pub struct TestUser{
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub token: String
}

pub struct TestApp{
    pub host: String,
    pub port: u16,
    pub repository: Arc<dyn Repository>,
    pub email_api: MockServer,
    pub api_client: reqwest::Client
}

impl TestApp {
    pub async fn spawn_app() -> TestApp{
        Self::spawn_app_with_repository(Arc::new(InMemoryRepository::new())).await
    }

    pub async fn spawn_app_with_repository(repository: Arc<dyn Repository>) -> TestApp{
        Lazy::force(&LOGGER_INSTANCE);

        let email_api = MockServer::start().await;

        let mut settings = Settings::get().expect("Failed to read configuration");
        settings.application.host = "127.0.0.1".to_string();
        settings.application.port = 0;
        settings.database.in_memory = true;
        settings.email.api_uri = email_api.uri();

        let application = Application::build_with_repository(settings, repository.clone())
                            .expect("Failed to build application");

        let host = application.host.clone();
        let port = application.port;
        tokio::task::spawn(application.run_until_stopped());

        let api_client = reqwest::Client::builder()
                            .redirect(Policy::none())
                            .build()
                            .unwrap();

        TestApp{
            host,
            port,
            repository,
            email_api,
            api_client
        }
    }

    pub fn get_app_url(&self) -> String{
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let builder = self.api_client.request(method, format!("{}{}", self.get_app_url(), path));
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder
        }
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Response {
        self.request(Method::GET, path, token)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_json(&self, path: &str, body: &Value, token: Option<&str>) -> Response {
        self.request(Method::POST, path, token)
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn put_json(&self, path: &str, body: &Value, token: Option<&str>) -> Response {
        self.request(Method::PUT, path, token)
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> Response {
        self.request(Method::DELETE, path, token)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn signup(&self, body: &Value) -> Response {
        self.post_json("/api/auth/signup", body, None).await
    }

    pub async fn signin(&self, email: &str, password: &str) -> Response {
        self.post_json("/api/auth/signin", &json!({ "email": email, "password": password }), None).await
    }

    // Signs a fresh account up, changes its role in the store and signs in
    // again so the token carries the role
    pub async fn create_user(&self, role: Role) -> TestUser {
        let name: String = Name().fake();
        let email: String = SafeEmail().fake();
        let email = format!("{}.{}", Uuid::new_v4().simple(), email);

        let response = self.signup(&json!({
            "name": name,
            "email": email,
            "password": PASSWORD
        })).await;
        assert_eq!(response.status().as_u16(), 201);
        let body: Value = response.json().await.unwrap();
        let id: Uuid = serde_json::from_value(body["user"]["id"].clone()).unwrap();

        if role != Role::User {
            self.repository
                .update_user(id, UserChanges{ role: Some(role), ..Default::default() })
                .expect("Failed to change role");
        }

        let response = self.signin(&email, PASSWORD).await;
        assert_eq!(response.status().as_u16(), 200);
        let body: Value = response.json().await.unwrap();

        TestUser{
            id,
            name,
            email,
            token: body["token"].as_str().unwrap().to_string()
        }
    }

    pub async fn create_dish(&self, token: &str, name: &str, price: i64) -> Value {
        let response = self.post_json("/api/dishes", &json!({
            "name": name,
            "description": "Prepared fresh at the festival grounds",
            "imageUrl": "https://img.festival.test/dish.png",
            "price": price
        }), Some(token)).await;
        assert_eq!(response.status().as_u16(), 201);

        response.json().await.unwrap()
    }

    pub async fn create_order(&self, token: &str, dish_id: &str, quantity: i32) -> Value {
        let response = self.post_json("/api/orders", &json!({
            "items": [{ "dishId": dish_id, "quantity": quantity }]
        }), Some(token)).await;
        assert_eq!(response.status().as_u16(), 201);

        response.json().await.unwrap()
    }

    pub async fn create_review(&self, token: &str, dish_id: &str) -> Response {
        self.post_json("/api/reviews", &json!({
            "dishId": dish_id,
            "rating": 5,
            "comment": "Best socca of the weekend"
        }), Some(token)).await
    }

    pub fn get_links(&self, text: &str) -> Vec<String>{
        linkify::LinkFinder::new()
            .links(text)
            .filter(|l| *l.kind() == linkify::LinkKind::Url)
            .map(|l| l.as_str().to_owned())
            .collect()
    }
}

pub fn id_of(body: &Value) -> String {
    body["id"].as_str().expect("Missing id").to_string()
}
