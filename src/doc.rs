//! OpenAPI documentation setup.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{ErrorCode, LocationCheck, Pagination, Zone, ZonePage, ZoneStat};
use crate::inbound::http::checks::{CheckJson, StatsResponse};
use crate::inbound::http::error::{ErrorBody, ErrorEnvelope};
use crate::inbound::http::zones::ZoneJson;

/// Enrich the generated document with the API key security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "ApiKey",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "X-API-Key",
                "Static key required by the zone management routes.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "zonewatch API",
        description = "Danger zone catalogue, location checks, and per-zone statistics."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::zones::create_zone,
        crate::inbound::http::zones::list_zones,
        crate::inbound::http::zones::get_zone,
        crate::inbound::http::zones::update_zone,
        crate::inbound::http::zones::delete_zone,
        crate::inbound::http::checks::check_location,
        crate::inbound::http::checks::zone_stats,
        crate::inbound::http::health::health,
    ),
    components(schemas(
        Zone,
        ZoneJson,
        ZonePage,
        Pagination,
        LocationCheck,
        CheckJson,
        ZoneStat,
        StatsResponse,
        ErrorEnvelope,
        ErrorBody,
        ErrorCode,
    )),
    tags(
        (name = "incidents", description = "Danger zone management and statistics"),
        (name = "location", description = "Location checks"),
        (name = "system", description = "Health probes")
    )
)]
pub struct ApiDoc;
