/*!
 * Entity-side view of a device proxy.
 *
 * A [`ProxyEntity`] wraps a [`DeviceProxy`] for the host platform's entity
 * layer and tracks when the device was last seen.
 */
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use lazyconnect_core::types::Id;

use crate::device::SpeakerControl;
use crate::proxy::DeviceProxy;

/// Entity wrapper around a lazily-connected device
#[derive(Debug)]
pub struct ProxyEntity {
    proxy: Arc<DeviceProxy>,
    last_seen: RwLock<Option<DateTime<Utc>>>,
}

impl ProxyEntity {
    /// Create an entity for `proxy`
    pub fn new(proxy: Arc<DeviceProxy>) -> Self {
        Self {
            proxy,
            last_seen: RwLock::new(None),
        }
    }

    /// The wrapped proxy
    pub fn proxy(&self) -> &Arc<DeviceProxy> {
        &self.proxy
    }

    /// Record a discovery sighting
    ///
    /// A device that is not connected yet has never really been seen, so
    /// the timestamp stays cleared until the proxy is ready.
    pub fn seen(&self) {
        let stamp = if self.proxy.is_ready() {
            Some(Utc::now())
        } else {
            None
        };
        *self.last_seen.write().unwrap_or_else(PoisonError::into_inner) = stamp;
    }

    /// When the device was last seen, if ever
    pub fn last_seen(&self) -> Option<DateTime<Utc>> {
        *self.last_seen.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether the entity should be reported as available
    pub fn available(&self) -> bool {
        self.proxy.is_ready()
    }

    /// Stable unique id of the entity
    pub fn unique_id(&self) -> Id {
        self.proxy.uid()
    }

    /// Display name of the entity
    pub fn name(&self) -> &str {
        self.proxy.display_name()
    }
}
