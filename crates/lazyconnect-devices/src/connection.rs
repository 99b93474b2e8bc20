/*!
 * Connector seam to the external device-control client.
 *
 * Once a probe confirms a device is reachable, the proxy asks its
 * [`Connector`] for a live connection and delegates to it from then on.
 */
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use crate::device::{Result, SpeakerControl};

/// Builds live connections for reachable devices
#[async_trait]
pub trait Connector: Send + Sync + Debug {
    /// Get the connector name
    fn name(&self) -> &'static str;

    /// Build a live connection to the device at `address`
    ///
    /// Only called after a reachability probe succeeded. An error leaves the
    /// proxy pending, and the next worker cycle tries again.
    async fn connect(&self, address: &str) -> Result<Arc<dyn SpeakerControl>>;
}
