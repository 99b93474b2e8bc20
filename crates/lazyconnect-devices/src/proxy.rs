/*!
 * Lazy device proxy.
 *
 * A [`DeviceProxy`] is handed out immediately for a device address and acts
 * as an inert stand-in until a reachability probe succeeds. From then on it
 * delegates every capability to the live connection.
 */
use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tracing::{debug, info, warn};

use lazyconnect_core::types::Id;
use lazyconnect_core::utils::with_timeout;

use crate::connection::Connector;
use crate::coordinator::LazyInitCoordinator;
use crate::device::{
    ControlService, DeviceError, MusicLibrary, SpeakerControl, SpeakerInfo, ZoneGroup,
    ZoneGroupTopology,
};
use crate::inert::{
    EmptyMusicLibrary, LazyService, LazyZoneGroupTopology, AV_TRANSPORT, CONTENT_DIRECTORY,
    RENDERING_CONTROL,
};
use crate::probe::Prober;

/// Model name reported while the proxy is not connected
pub const PLACEHOLDER_MODEL_NAME: &str = "Lazy Connector";

/// Prefix of the placeholder unique id derived from the address
pub const PLACEHOLDER_UID_PREFIX: &str = "lazy";

/// What a proxy needs to bring itself up
#[derive(Debug, Clone)]
pub(crate) struct InitContext {
    pub(crate) prober: Arc<dyn Prober>,
    pub(crate) connector: Arc<dyn Connector>,
    pub(crate) connect_timeout: Duration,
}

/// A lazily-connected device
pub struct DeviceProxy {
    address: String,
    display_name: String,
    lazy_uid: OnceLock<Id>,
    connection: OnceLock<Arc<dyn SpeakerControl>>,
    context: InitContext,
}

impl fmt::Debug for DeviceProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceProxy")
            .field("address", &self.address)
            .field("display_name", &self.display_name)
            .field("ready", &self.is_ready())
            .finish()
    }
}

impl DeviceProxy {
    /// Create a proxy for the device at `address` and register it with `coordinator`
    ///
    /// Returns at once; probing happens on the coordinator's worker.
    pub fn new<A, N>(address: A, display_name: N, coordinator: &LazyInitCoordinator) -> Arc<Self>
    where
        A: Into<String>,
        N: Into<String>,
    {
        let proxy = Self::with_context(address, display_name, coordinator.init_context());
        proxy.register(coordinator);
        proxy
    }

    pub(crate) fn with_context<A, N>(address: A, display_name: N, context: InitContext) -> Arc<Self>
    where
        A: Into<String>,
        N: Into<String>,
    {
        Arc::new(Self {
            address: address.into(),
            display_name: display_name.into(),
            lazy_uid: OnceLock::new(),
            connection: OnceLock::new(),
            context,
        })
    }

    fn register(self: &Arc<Self>, coordinator: &LazyInitCoordinator) {
        coordinator.register_proxy(self.clone());
    }

    /// The device's network address
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The name the proxy was registered with
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Whether a live connection has been established
    pub fn is_ready(&self) -> bool {
        self.connection.get().is_some()
    }

    /// The live connection, once ready
    pub fn connection(&self) -> Option<&Arc<dyn SpeakerControl>> {
        self.connection.get()
    }

    /// The protocol-level id reported by the live connection, once ready
    pub fn device_uid(&self) -> Option<Id> {
        self.connection().map(|connection| connection.uid())
    }

    /// Probe the device once and connect if it answers
    ///
    /// Returns whether the proxy is ready afterwards. Unreachability and
    /// connector failures leave the proxy untouched. Calling this on a ready
    /// proxy does nothing.
    pub async fn initialize(&self) -> bool {
        if self.is_ready() {
            return true;
        }

        let outcome = self.context.prober.probe(&self.address).await;
        if !outcome.is_reachable() {
            debug!(address = %self.address, %outcome, "Device not reachable yet");
            return false;
        }

        let connected = with_timeout(
            self.context.connect_timeout,
            self.context.connector.connect(&self.address),
        )
        .await;

        match connected {
            Ok(connection) => {
                // A concurrent initialize may have won; both connections
                // describe the same device, so the first one stays.
                if self.connection.set(connection).is_ok() {
                    info!(
                        address = %self.address,
                        name = %self.display_name,
                        connector = self.context.connector.name(),
                        "Device connected"
                    );
                }
                true
            }
            Err(e) => {
                log_connect_failure(&self.address, &e);
                false
            }
        }
    }

    fn placeholder_uid(&self) -> &Id {
        self.lazy_uid
            .get_or_init(|| Id::prefixed(PLACEHOLDER_UID_PREFIX, &self.address))
    }
}

fn log_connect_failure(address: &str, error: &DeviceError) {
    warn!(address, error = %error, "Device answered but connecting failed");
}

impl SpeakerControl for DeviceProxy {
    /// The placeholder id stays the proxy's id for its whole lifetime, so
    /// whoever keyed state on it before the device connected keeps a
    /// consistent key. See [`DeviceProxy::device_uid`] for the device's own id.
    fn uid(&self) -> Id {
        self.placeholder_uid().clone()
    }

    fn speaker_info(&self) -> SpeakerInfo {
        match self.connection() {
            Some(connection) => connection.speaker_info(),
            None => SpeakerInfo::new(self.display_name.clone(), PLACEHOLDER_MODEL_NAME),
        }
    }

    fn shuffle(&self) -> bool {
        self.connection().map_or(false, |c| c.shuffle())
    }

    fn volume(&self) -> u8 {
        self.connection().map_or(0, |c| c.volume())
    }

    fn mute(&self) -> bool {
        self.connection().map_or(true, |c| c.mute())
    }

    fn night_mode(&self) -> Option<bool> {
        self.connection().and_then(|c| c.night_mode())
    }

    fn dialog_mode(&self) -> Option<bool> {
        self.connection().and_then(|c| c.dialog_mode())
    }

    fn music_library(&self) -> Arc<dyn MusicLibrary> {
        match self.connection() {
            Some(connection) => connection.music_library(),
            None => Arc::new(EmptyMusicLibrary),
        }
    }

    fn av_transport(&self) -> Arc<dyn ControlService> {
        match self.connection() {
            Some(connection) => connection.av_transport(),
            None => Arc::new(LazyService::new(AV_TRANSPORT)),
        }
    }

    fn rendering_control(&self) -> Arc<dyn ControlService> {
        match self.connection() {
            Some(connection) => connection.rendering_control(),
            None => Arc::new(LazyService::new(RENDERING_CONTROL)),
        }
    }

    fn content_directory(&self) -> Arc<dyn ControlService> {
        match self.connection() {
            Some(connection) => connection.content_directory(),
            None => Arc::new(LazyService::new(CONTENT_DIRECTORY)),
        }
    }

    fn zone_group_topology(&self) -> Arc<dyn ZoneGroupTopology> {
        match self.connection() {
            Some(connection) => connection.zone_group_topology(),
            None => Arc::new(LazyZoneGroupTopology::default()),
        }
    }

    fn group(&self) -> Option<ZoneGroup> {
        self.connection().and_then(|c| c.group())
    }
}
