//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::AppSettings;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use livepoll::Trace;
#[cfg(debug_assertions)]
use livepoll::doc::ApiDoc;
use livepoll::inbound::http::configure;
use livepoll::inbound::http::health::{HealthState, live, ready};
use livepoll::inbound::http::state::HttpState;
use tracing::info;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use state_builders::build_wiring;

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(web::scope("/api/v1").configure(configure))
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Build adapters from `settings`, start the mirror dispatcher and bind the
/// HTTP listener.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when settings are invalid, storage cannot be
/// prepared, or the socket cannot be bound.
pub async fn create_server(
    health_state: web::Data<HealthState>,
    settings: &AppSettings,
) -> std::io::Result<Server> {
    let bind_addr = settings
        .bind_addr()
        .map_err(|err| std::io::Error::other(err.to_string()))?;
    let wiring = build_wiring(settings).await?;
    tokio::spawn(wiring.dispatcher.run());

    let http_state = web::Data::new(wiring.http_state);
    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || build_app(server_health_state.clone(), http_state.clone()))
        .bind(bind_addr)?
        .run();

    info!(%bind_addr, "listening");
    health_state.mark_ready();
    Ok(server)
}
