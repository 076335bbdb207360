use std::{net::TcpListener, sync::Arc};

use actix_cors::Cors;
use actix_web::{
    dev::Server,
    http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    web, App, HttpServer
};
use anyhow::Context;
use tracing_actix_web::TracingLogger;

use crate::{
    auth::jwt::Tokenizer,
    configuration::Settings,
    db_interaction::PgRepository,
    email_client::EmailClient,
    error::ApiError,
    repository::{InMemoryRepository, Repository},
    routes::{
        confirm_reset_password, create_dish, create_order, create_review, create_review_reply,
        create_user, delete_dish, delete_order, delete_review, delete_user, get_dish, get_order,
        get_order_by_code, get_review, get_user, health_check, list_dishes, list_orders,
        list_reviews, list_users, me, reset_password, signin, signup, update_dish, update_order,
        update_profile, update_review, update_user
    },
    telemetry::spawn_blocking_with_tracing
};

// Public url of the frontend, prefix of links sent by email
pub struct ApplicationBaseUrl(pub String);

pub struct Application{
    pub host: String,
    pub port: u16,
    pub server: Server
}

impl Application {
    // Connects to postgres and runs pending migrations, unless configured to
    // serve from memory
    pub async fn build(settings: Settings) -> Result<Self, anyhow::Error> {
        let repository: Arc<dyn Repository> = if settings.database.in_memory {
            tracing::warn!("Serving from the in-memory repository, data is lost on restart");
            Arc::new(InMemoryRepository::new())
        } else {
            let database = settings.database.clone();
            let repository = spawn_blocking_with_tracing(move || {
                let pool = database.build_pool()
                    .context("Failed to build connection pool")?;
                let repository = PgRepository::new(pool);
                repository.run_migrations()?;

                Ok::<_, anyhow::Error>(repository)
            })
            .await
            .context("Failed due to threadpool error")??;

            Arc::new(repository)
        };

        Self::build_with_repository(settings, repository)
    }

    pub fn build_with_repository(
        settings: Settings,
        repository: Arc<dyn Repository>
    ) -> Result<Self, anyhow::Error> {
        let listener = TcpListener::bind((settings.application.host.as_str(), settings.application.port))
            .context("Failed to bind address")?;
        let port = listener.local_addr()?.port();

        let email_client = settings.email.client()
            .context("Failed to build email client")?;
        let tokenizer = Tokenizer::new(&settings.jwt);

        let server = run(
            listener,
            repository,
            tokenizer,
            email_client,
            settings.application.base_url,
            settings.application.frontend_url
        )?;

        Ok(Self{
            host: settings.application.host,
            port,
            server
        })
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

fn cors(frontend_url: &str) -> Cors {
    Cors::default()
        .allowed_origin(frontend_url)
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allowed_headers(vec![AUTHORIZATION, CONTENT_TYPE, ACCEPT])
        .max_age(3600)
}

// Malformed bodies, query strings and path segments answer 400 `{error}`
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| ApiError::Validation(err.to_string()).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| ApiError::Validation(err.to_string()).into())
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| ApiError::Validation(err.to_string()).into())
}

pub fn run(
    listener: TcpListener,
    repository: Arc<dyn Repository>,
    tokenizer: Tokenizer,
    email_client: EmailClient,
    base_url: String,
    frontend_url: String
) -> Result<Server, anyhow::Error> {
    let repository: web::Data<dyn Repository> = web::Data::from(repository);
    let tokenizer = web::Data::new(tokenizer);
    let email_client = web::Data::new(email_client);
    let base_url = web::Data::new(ApplicationBaseUrl(base_url));

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(cors(&frontend_url))
            .app_data(json_config())
            .app_data(query_config())
            .app_data(path_config())
            .app_data(repository.clone())
            .app_data(tokenizer.clone())
            .app_data(email_client.clone())
            .app_data(base_url.clone())
            .route("/health", web::get().to(health_check))
            .service(
                web::scope("/api")
                    .service(
                        web::scope("/auth")
                            .route("/signup", web::post().to(signup))
                            .route("/signin", web::post().to(signin))
                            .route("/me", web::get().to(me))
                            .route("/reset-password", web::post().to(reset_password))
                            .route("/reset-password/confirm", web::post().to(confirm_reset_password))
                    )
                    .service(
                        web::scope("/dishes")
                            .route("", web::get().to(list_dishes))
                            .route("", web::post().to(create_dish))
                            .route("/{id}", web::get().to(get_dish))
                            .route("/{id}", web::put().to(update_dish))
                            .route("/{id}", web::delete().to(delete_dish))
                    )
                    .service(
                        web::scope("/orders")
                            .route("", web::get().to(list_orders))
                            .route("", web::post().to(create_order))
                            .route("/secret-code/{code}", web::get().to(get_order_by_code))
                            .route("/{id}", web::get().to(get_order))
                            .route("/{id}", web::put().to(update_order))
                            .route("/{id}", web::delete().to(delete_order))
                    )
                    .service(
                        web::scope("/reviews")
                            .route("", web::get().to(list_reviews))
                            .route("", web::post().to(create_review))
                            .route("/{id}", web::get().to(get_review))
                            .route("/{id}", web::put().to(update_review))
                            .route("/{id}", web::delete().to(delete_review))
                            .route("/{id}/replies", web::post().to(create_review_reply))
                    )
                    .service(
                        web::scope("/users")
                            .route("", web::get().to(list_users))
                            .route("", web::post().to(create_user))
                            // ahead of /{id}
                            .route("/profile", web::put().to(update_profile))
                            .route("/{id}", web::get().to(get_user))
                            .route("/{id}", web::put().to(update_user))
                            .route("/{id}", web::delete().to(delete_user))
                    )
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
