/*!
 * Inert stand-ins returned by a proxy that is not connected yet.
 *
 * Every call succeeds with a neutral result so that callers polling a
 * not-ready device see "idle" rather than an error.
 */
use std::time::Duration;

use lazyconnect_core::types::{Metadata, Value};

use crate::device::{ControlService, MusicLibrary, Result, Subscription, ZoneGroupTopology};

/// Service name reported by the inert audio transport service
pub const AV_TRANSPORT: &str = "AVTransport";
/// Service name reported by the inert rendering control service
pub const RENDERING_CONTROL: &str = "RenderingControl";
/// Service name reported by the inert content directory service
pub const CONTENT_DIRECTORY: &str = "ContentDirectory";
/// Service name reported by the inert zone group topology service
pub const ZONE_GROUP_TOPOLOGY: &str = "ZoneGroupTopology";

/// A subscription that was never established; cancelling it does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoneSubscription;

impl Subscription for NoneSubscription {
    fn sid(&self) -> Option<&str> {
        None
    }

    fn cancel(&self) {}
}

/// A control service that accepts every call and does nothing
#[derive(Debug, Clone)]
pub struct LazyService {
    name: &'static str,
}

impl LazyService {
    /// Create an inert service reporting `name`
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl ControlService for LazyService {
    fn service_name(&self) -> &str {
        self.name
    }

    fn subscribe(
        &self,
        _requested_timeout: Option<Duration>,
        _auto_renew: bool,
    ) -> Result<Box<dyn Subscription>> {
        Ok(Box::new(NoneSubscription))
    }

    fn call(&self, _action: &str, _arguments: &Metadata) -> Result<Value> {
        Ok(Value::Null)
    }
}

/// A topology service with no zone groups
#[derive(Debug, Clone)]
pub struct LazyZoneGroupTopology {
    service: LazyService,
}

impl Default for LazyZoneGroupTopology {
    fn default() -> Self {
        Self {
            service: LazyService::new(ZONE_GROUP_TOPOLOGY),
        }
    }
}

impl ControlService for LazyZoneGroupTopology {
    fn service_name(&self) -> &str {
        self.service.service_name()
    }

    fn subscribe(
        &self,
        requested_timeout: Option<Duration>,
        auto_renew: bool,
    ) -> Result<Box<dyn Subscription>> {
        self.service.subscribe(requested_timeout, auto_renew)
    }

    fn call(&self, action: &str, arguments: &Metadata) -> Result<Value> {
        self.service.call(action, arguments)
    }
}

impl ZoneGroupTopology for LazyZoneGroupTopology {
    fn zone_group_state(&self) -> Result<String> {
        Ok(String::new())
    }
}

/// A music library without entries
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyMusicLibrary;

impl MusicLibrary for EmptyMusicLibrary {
    fn favorites(&self) -> Result<Vec<Value>> {
        Ok(Vec::new())
    }
}
