use mail::HttpRelayGateway;
use serde::Deserialize;
use server::ServerState;
use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use writecue_core::gateway::{MessagingGateway, TracingGateway};
use writecue_db::client::{DbClient, DbError};

mod mail;
mod server;

#[derive(Debug, Error)]
enum InitError {
    #[error("Error parsing .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
    #[error("Error parsing environment: {0}")]
    Envy(#[from] envy::Error),
    #[error("Error setting up the database: {0}")]
    Db(#[from] DbError),
    #[error("Error building the mail relay client: {0}")]
    MailRelay(#[from] reqwest::Error),
    #[error("Error binding tcp listener: {0}")]
    TcpBind(std::io::Error),
    #[error("Error serving server: {0}")]
    TcpServe(std::io::Error),
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
struct Env {
    server_address: IpAddr,
    server_port: u16,
    database_url: String,
    #[serde(default = "default_database_max_connections")]
    database_max_connections: u32,
    mail_relay_url: Option<String>,
    #[serde(default = "default_mail_sender")]
    mail_sender: String,
    #[serde(default = "default_mail_sender_name")]
    mail_sender_name: String,
}

fn default_database_max_connections() -> u32 {
    5
}

fn default_mail_sender() -> String {
    "noreply@writecue.com".to_owned()
}

fn default_mail_sender_name() -> String {
    "WriteCue".to_owned()
}

fn install_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "writecue_api=debug,\
                writecue_core=debug,\
                writecue_db=debug,\
                tower_http=debug,axum::rejection=trace,sqlx=warn"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn get_env() -> Result<Env, InitError> {
    if let Err(e) = dotenvy::dotenv() {
        if e.not_found() {
            debug!("No .dotenv file found");
        } else {
            return Err(e.into());
        }
    }

    envy::from_env().map_err(InitError::from)
}

fn messaging_gateway(env: Env) -> Result<Arc<dyn MessagingGateway>, InitError> {
    let Some(endpoint) = env.mail_relay_url else {
        warn!("MAIL_RELAY_URL is not set, emails are only logged");
        return Ok(Arc::new(TracingGateway));
    };

    info!(%endpoint, "Sending emails through the mail relay");
    let gateway = HttpRelayGateway::new(endpoint, env.mail_sender, env.mail_sender_name)?;
    Ok(Arc::new(gateway))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Could not listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Could not listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<(), InitError> {
    install_tracing();
    let env = get_env()?;

    let db = DbClient::connect(&env.database_url, env.database_max_connections).await?;
    db.migrate().await?;

    let server_address = SocketAddr::new(env.server_address, env.server_port);
    let gateway = messaging_gateway(env)?;
    let state = ServerState::new(Arc::new(db), gateway);

    let tracing_layer = TraceLayer::new_for_http();
    let app = server::routes().layer(tracing_layer).with_state(state);

    let listener = tokio::net::TcpListener::bind(server_address)
        .await
        .map_err(InitError::TcpBind)?;
    info!(%server_address, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(InitError::TcpServe)?;

    Ok(())
}
