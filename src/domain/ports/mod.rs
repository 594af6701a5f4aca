//! Domain ports for the hexagonal boundary.
//!
//! Services depend only on these traits; the Diesel, Redis, and reqwest
//! adapters live in `outbound/`. Each port carries a narrow error enum so
//! services can map storage faults without knowing the backend.

mod check_repository;
mod delivery_queue;
mod webhook_sink;
mod zone_cache;
mod zone_repository;

#[cfg(test)]
pub use check_repository::MockCheckRepository;
pub use check_repository::{CheckRepository, CheckRepositoryError};
#[cfg(test)]
pub use delivery_queue::MockDeliveryQueue;
pub use delivery_queue::{DeliveryQueue, DeliveryQueueError, InMemoryDeliveryQueue};
#[cfg(test)]
pub use webhook_sink::MockWebhookSink;
pub use webhook_sink::{WebhookSink, WebhookSinkError};
#[cfg(test)]
pub use zone_cache::MockZoneCache;
pub use zone_cache::{FixtureZoneCache, ZoneCache, ZoneCacheError};
#[cfg(test)]
pub use zone_repository::MockZoneRepository;
pub use zone_repository::{ZoneRepository, ZoneRepositoryError};
