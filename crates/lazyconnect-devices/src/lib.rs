/*!
 * Lazyconnect Devices
 *
 * Lazily-connected device proxies for the lazyconnect system. A proxy is
 * usable the moment it is created: until its device answers it reports
 * placeholder values, and a background worker owned by the
 * [`LazyInitCoordinator`] keeps probing and connecting pending devices.
 */

#![warn(missing_docs)]

// Re-export core types
pub use lazyconnect_core::prelude;

pub mod connection;
pub mod coordinator;
pub mod device;
pub mod discovery;
pub mod entity;
pub mod inert;
pub mod probe;
pub mod proxy;
pub mod wake;

#[cfg(test)]
mod testing;

pub use connection::Connector;
pub use coordinator::{CoordinatorEvent, LazyInitCoordinator};
pub use device::{DeviceError, SpeakerControl, SpeakerInfo, ZoneGroup};
pub use discovery::{DiscoveryOptions, ProxyDiscovery, StaticDiscovery};
pub use entity::ProxyEntity;
pub use probe::{ProbeOutcome, Prober, TcpProber};
pub use proxy::DeviceProxy;

/// Lazyconnect devices crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the device system
pub fn init() -> Result<(), lazyconnect_core::error::Error> {
    tracing::info!("Lazyconnect Devices {} initialized", VERSION);
    Ok(())
}
