use crate::configuration::Settings;
use crate::routes::{health_check, submit};
use crate::webhook_client::WebhookClient;
use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(configuration: &Settings) -> Result<Self, anyhow::Error> {
        let webhook_client = WebhookClient::new(
            configuration.webhook.url.clone(),
            configuration.webhook.timeout(),
        )
        .context("Failed to build the webhook HTTP client")?;

        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(&address)
            .with_context(|| format!("Failed to bind to {}", address))?;
        let port = listener.local_addr()?.port();
        let server = run(listener, webhook_client)?;

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run(listener: TcpListener, webhook_client: WebhookClient) -> Result<Server, std::io::Error> {
    let webhook_client = web::Data::new(webhook_client);
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .route("/api/submit", web::post().to(submit))
            .app_data(webhook_client.clone())
    })
    .listen(listener)?
    .run();
    Ok(server)
}
