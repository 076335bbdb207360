use anyhow::Context;
use foodfest::{configuration::Settings, startup::Application, telemetry::{get_subscriber, init_subscriber}};

#[actix_web::main]
async fn main() -> anyhow::Result<()>{
    let subscriber = get_subscriber("foodfest".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let settings = Settings::get().context("Failed to read configuration")?;

    let application = Application::build(settings).await?;
    tracing::info!(host = %application.host, port = application.port, "Server listening");
    application.run_until_stopped().await?;
    Ok(())
}
