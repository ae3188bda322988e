use std::net::TcpListener;
use std::time::Duration;

use actix_web::dev::Server;
use actix_web::{App, HttpServer, web};
use secrecy::SecretString;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing_actix_web::TracingLogger;

use crate::configuration::{DatabaseSettings, Settings};
use crate::email_client::EmailClient;
use crate::routes::{health_check, send_welcome_email, signup};

pub struct Application {
    port: u16,
    server: Server,
}

/// Public address of the site, quoted in every welcome email.
pub struct SiteUrl(pub String);

/// `None` runs the welcome email endpoint in open mode.
pub struct WebhookSecret(pub Option<SecretString>);

/// `None` when no provider credential is configured.
pub struct EmailProvider(pub Option<EmailClient>);

impl Application {
    pub async fn build(config: Settings) -> Result<Self, anyhow::Error> {
        let email_client = config.email_client.client()?;
        if email_client.is_none() {
            tracing::warn!("No email provider credential configured, welcome emails will fail.");
        }

        let webhook_secret = config.dispatch.secret();
        if webhook_secret.is_none() {
            tracing::warn!("No webhook secret configured, welcome email calls are not authenticated.");
        }

        let address = format!("{}:{}", config.app.host, config.app.port);
        let connection_pool = get_connection_pool(&config.database);

        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();
        let server = run(
            listener,
            connection_pool,
            email_client,
            config.app.site_url,
            webhook_secret,
        )?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run(
    listener: TcpListener,
    db_pool: PgPool,
    email_client: Option<EmailClient>,
    site_url: String,
    webhook_secret: Option<SecretString>,
) -> Result<Server, std::io::Error> {
    let db_pool = web::Data::new(db_pool);
    let email_provider = web::Data::new(EmailProvider(email_client));
    let site_url = web::Data::new(SiteUrl(site_url));
    let webhook_secret = web::Data::new(WebhookSecret(webhook_secret));

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .route("/signups", web::post().to(signup))
            .route("/welcome-email", web::to(send_welcome_email))
            .app_data(db_pool.clone())
            .app_data(email_provider.clone())
            .app_data(site_url.clone())
            .app_data(webhook_secret.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}

pub fn get_connection_pool(db_config: &DatabaseSettings) -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(2))
        .connect_lazy_with(db_config.with_db())
}
