/*!
 * Device capability traits and core device abstractions.
 *
 * [`SpeakerControl`] is the capability surface shared by live connections
 * (supplied by an external device-control client) and by the lazy
 * [`DeviceProxy`](crate::proxy::DeviceProxy) that stands in for them.
 */
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use lazyconnect_core::{
    error::Error as CoreError,
    types::{Id, Metadata, Value},
};

/// Error type for device operations
#[derive(Error, Debug)]
pub enum DeviceError {
    /// The device is not connected
    #[error("Device not connected")]
    NotConnected,

    /// Communication error with the device
    #[error("Communication error: {0}")]
    CommunicationError(String),

    /// Timeout error
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Other error
    #[error("Other error: {0}")]
    Other(String),

    /// Core error
    #[error("Core error: {0}")]
    CoreError(#[from] CoreError),
}

/// Result type for device operations
pub type Result<T> = std::result::Result<T, DeviceError>;

/// Descriptive information reported by a speaker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakerInfo {
    /// Zone (room) name
    pub zone_name: String,
    /// Hardware model name
    pub model_name: String,
    /// Any further fields the device reports
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub extra: Metadata,
}

impl SpeakerInfo {
    /// Create speaker info with no extra fields
    pub fn new<Z: Into<String>, M: Into<String>>(zone_name: Z, model_name: M) -> Self {
        Self {
            zone_name: zone_name.into(),
            model_name: model_name.into(),
            extra: Metadata::new(),
        }
    }
}

/// The group a speaker currently plays in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneGroup {
    /// Group identifier
    pub uid: String,
    /// The speaker coordinating playback for the group
    pub coordinator: Id,
    /// All speakers in the group, coordinator included
    pub members: Vec<Id>,
}

/// An event subscription handed out by a control service
pub trait Subscription: Send + Sync + Debug {
    /// Subscription id assigned by the device, if any
    fn sid(&self) -> Option<&str>;

    /// Cancel the subscription
    fn cancel(&self);
}

/// A control service exposed by a device (transport, rendering, content directory)
pub trait ControlService: Send + Sync + Debug {
    /// The service name as the device advertises it
    fn service_name(&self) -> &str;

    /// Subscribe to the service's events
    fn subscribe(
        &self,
        requested_timeout: Option<Duration>,
        auto_renew: bool,
    ) -> Result<Box<dyn Subscription>>;

    /// Invoke a service action
    fn call(&self, action: &str, arguments: &Metadata) -> Result<Value>;
}

/// The zone/group topology service
pub trait ZoneGroupTopology: ControlService {
    /// The raw zone group state document
    fn zone_group_state(&self) -> Result<String>;
}

/// The music library of a speaker
pub trait MusicLibrary: Send + Sync + Debug {
    /// Favorites saved on the device
    fn favorites(&self) -> Result<Vec<Value>>;
}

/// The capability surface of a speaker
///
/// Accessors are synchronous and total: implementations return a value for
/// every call rather than raising.
pub trait SpeakerControl: Send + Sync + Debug {
    /// Stable unique id
    fn uid(&self) -> Id;

    /// Zone and model information
    fn speaker_info(&self) -> SpeakerInfo;

    /// Whether shuffle is enabled
    fn shuffle(&self) -> bool;

    /// Volume level (0-100)
    fn volume(&self) -> u8;

    /// Whether the speaker is muted
    fn mute(&self) -> bool;

    /// Night mode, if the speaker supports it
    fn night_mode(&self) -> Option<bool>;

    /// Dialog enhancement mode, if the speaker supports it
    fn dialog_mode(&self) -> Option<bool>;

    /// Music library
    fn music_library(&self) -> Arc<dyn MusicLibrary>;

    /// Audio transport service
    fn av_transport(&self) -> Arc<dyn ControlService>;

    /// Rendering control service
    fn rendering_control(&self) -> Arc<dyn ControlService>;

    /// Content directory service
    fn content_directory(&self) -> Arc<dyn ControlService>;

    /// Zone/group topology service
    fn zone_group_topology(&self) -> Arc<dyn ZoneGroupTopology>;

    /// The group this speaker belongs to
    fn group(&self) -> Option<ZoneGroup>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speaker_info_serialization() {
        let info = SpeakerInfo::new("Kitchen", "Play:1");
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json, serde_json::json!({"zone_name": "Kitchen", "model_name": "Play:1"}));

        let parsed: SpeakerInfo =
            serde_json::from_str(r#"{"zone_name":"Den","model_name":"Beam"}"#).unwrap();
        assert!(parsed.extra.is_empty());
    }

    #[test]
    fn test_device_error_from_core() {
        let err: DeviceError = CoreError::timeout("probe").into();
        assert!(matches!(err, DeviceError::CoreError(CoreError::Timeout(_))));
        assert_eq!(DeviceError::NotConnected.to_string(), "Device not connected");
    }
}
