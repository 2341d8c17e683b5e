use anyhow::Context;
use subscription_relay::configuration::get_configuration;
use subscription_relay::startup::Application;
use subscription_relay::telemetry::{get_subscriber, init_subscriber};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("subscription-relay".into(), "info".into());
    init_subscriber(subscriber);

    let configuration = get_configuration().context("Failed to read configuration")?;
    let application = Application::build(&configuration).await?;
    tracing::info!(
        port = application.port(),
        webhook_url = %configuration.webhook.url,
        "Listening for submissions"
    );
    application.run_until_stopped().await?;
    Ok(())
}
