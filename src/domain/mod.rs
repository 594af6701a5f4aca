//! Domain model, services, and ports.
//!
//! Everything here is adapter-agnostic: the Diesel, Redis, reqwest, and
//! Actix pieces live in `outbound/` and `inbound/` and talk to this
//! module exclusively through the types and traits it exports.

pub mod check;
pub mod check_service;
pub mod delivery_worker;
pub mod error;
pub mod ports;
pub mod zone;
pub mod zone_service;

#[cfg(test)]
mod zone_service_tests;

pub use self::check::{DeliveryTask, LocationCheck, ZoneStat};
pub use self::check_service::{CheckCoordinatesRequest, CheckService};
pub use self::delivery_worker::{DeliveryWorker, DeliveryWorkerHandle, MAX_RETRIES};
pub use self::error::{Error, ErrorCode};
pub use self::zone::{
    DESCRIPTION_PLACEHOLDER, MIN_RADIUS_M, NewZone, Zone, ZoneValidationError,
    validate_coordinates,
};
pub use self::zone_service::{
    Pagination, UpsertZoneRequest, ZonePage, ZoneService,
};
