//! Server entry point: loads settings, installs tracing and runs the API.

mod server;

use actix_web::web;
use livepoll::inbound::http::health::HealthState;
use ortho_config::OrthoConfig;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use server::{AppSettings, create_server};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load()
        .map_err(|err| std::io::Error::other(format!("failed to load settings: {err}")))?;

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), &settings).await?;
    let result = server.await;
    health_state.mark_unhealthy();
    result
}
