//! Server construction and route wiring.

use std::net::SocketAddr;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::api_key::ApiKeyGuard;
use crate::inbound::http::error::{json_error_handler, query_error_handler};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{checks, health, zones};

/// Grace period for in-flight requests during shutdown.
const SHUTDOWN_DEADLINE_SECS: u64 = 15;

fn build_app(
    state: web::Data<HttpState>,
    api_key: String,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    // The stats route must be registered ahead of the guarded
    // `/incidents` scope so it is matched before `/incidents/{id}`.
    let api = web::scope("/api/v1")
        .service(checks::check_location)
        .service(checks::zone_stats)
        .service(health::health)
        .service(
            web::scope("/incidents")
                .wrap(ApiKeyGuard::new(api_key))
                .service(zones::create_zone)
                .service(zones::list_zones)
                .service(zones::get_zone)
                .service(zones::update_zone)
                .service(zones::delete_zone),
        );

    let app = App::new()
        .app_data(state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .service(api);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct the Actix HTTP server.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    state: HttpState,
    api_key: String,
    bind_addr: SocketAddr,
) -> std::io::Result<Server> {
    let state = web::Data::new(state);
    let server = HttpServer::new(move || build_app(state.clone(), api_key.clone()))
        .bind(bind_addr)?
        .shutdown_timeout(SHUTDOWN_DEADLINE_SECS)
        .run();
    Ok(server)
}
