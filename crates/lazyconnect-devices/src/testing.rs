//! Test doubles shared by the unit tests of this crate.

use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;

use lazyconnect_core::config::CoordinatorConfig;
use lazyconnect_core::types::{Id, Metadata, Value};

use crate::connection::Connector;
use crate::coordinator::{CoordinatorEvent, LazyInitCoordinator};
use crate::device::{
    ControlService, DeviceError, MusicLibrary, Result, SpeakerControl, SpeakerInfo, Subscription,
    ZoneGroup, ZoneGroupTopology,
};
use crate::probe::{ProbeOutcome, Prober};
use crate::proxy::InitContext;

/// Prober whose answers are scripted per address
#[derive(Debug, Default)]
pub(crate) struct ScriptedProber {
    reachable: Mutex<HashSet<String>>,
    probes: Mutex<HashMap<String, usize>>,
    delay: Duration,
}

impl ScriptedProber {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn with_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            ..Self::default()
        })
    }

    pub(crate) fn set_reachable(&self, address: &str) {
        self.reachable.lock().unwrap().insert(address.to_string());
    }

    pub(crate) fn set_unreachable(&self, address: &str) {
        self.reachable.lock().unwrap().remove(address);
    }

    pub(crate) fn probe_count(&self, address: &str) -> usize {
        self.probes.lock().unwrap().get(address).copied().unwrap_or(0)
    }
}

#[async_trait]
impl Prober for ScriptedProber {
    async fn probe(&self, address: &str) -> ProbeOutcome {
        *self.probes.lock().unwrap().entry(address.to_string()).or_default() += 1;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.reachable.lock().unwrap().contains(address) {
            ProbeOutcome::Reachable
        } else {
            ProbeOutcome::Unreachable(io::ErrorKind::ConnectionRefused)
        }
    }
}

/// Connector handing out [`MockSpeaker`]s
#[derive(Debug, Default)]
pub(crate) struct MockConnector {
    fail: bool,
    connects: AtomicUsize,
}

impl MockConnector {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    pub(crate) fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for MockConnector {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn connect(&self, address: &str) -> Result<Arc<dyn SpeakerControl>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DeviceError::CommunicationError(format!(
                "device description of {} unavailable",
                address
            )));
        }
        Ok(Arc::new(MockSpeaker::new(address)))
    }
}

#[derive(Debug)]
pub(crate) struct MockSubscription;

impl Subscription for MockSubscription {
    fn sid(&self) -> Option<&str> {
        Some("uuid:mock-sid")
    }

    fn cancel(&self) {}
}

#[derive(Debug)]
pub(crate) struct MockService(&'static str);

impl ControlService for MockService {
    fn service_name(&self) -> &str {
        self.0
    }

    fn subscribe(&self, _: Option<Duration>, _: bool) -> Result<Box<dyn Subscription>> {
        Ok(Box::new(MockSubscription))
    }

    fn call(&self, action: &str, _: &Metadata) -> Result<Value> {
        Ok(Value::from(format!("{}:{}", self.0, action)))
    }
}

impl ZoneGroupTopology for MockService {
    fn zone_group_state(&self) -> Result<String> {
        Ok("<ZoneGroupState/>".to_string())
    }
}

#[derive(Debug)]
pub(crate) struct MockLibrary;

impl MusicLibrary for MockLibrary {
    fn favorites(&self) -> Result<Vec<Value>> {
        Ok(vec![Value::from("Radio One"), Value::from("Morning Jazz")])
    }
}

/// A connected speaker with fixed state
#[derive(Debug)]
pub(crate) struct MockSpeaker {
    uid: Id,
}

impl MockSpeaker {
    pub(crate) fn new(address: &str) -> Self {
        Self {
            uid: Id::prefixed("RINCON_", address),
        }
    }
}

impl SpeakerControl for MockSpeaker {
    fn uid(&self) -> Id {
        self.uid.clone()
    }

    fn speaker_info(&self) -> SpeakerInfo {
        SpeakerInfo::new("Den", "Play:5")
    }

    fn shuffle(&self) -> bool {
        true
    }

    fn volume(&self) -> u8 {
        35
    }

    fn mute(&self) -> bool {
        false
    }

    fn night_mode(&self) -> Option<bool> {
        Some(false)
    }

    fn dialog_mode(&self) -> Option<bool> {
        Some(true)
    }

    fn music_library(&self) -> Arc<dyn MusicLibrary> {
        Arc::new(MockLibrary)
    }

    fn av_transport(&self) -> Arc<dyn ControlService> {
        Arc::new(MockService("MockAVTransport"))
    }

    fn rendering_control(&self) -> Arc<dyn ControlService> {
        Arc::new(MockService("MockRenderingControl"))
    }

    fn content_directory(&self) -> Arc<dyn ControlService> {
        Arc::new(MockService("MockContentDirectory"))
    }

    fn zone_group_topology(&self) -> Arc<dyn ZoneGroupTopology> {
        Arc::new(MockService("MockZoneGroupTopology"))
    }

    fn group(&self) -> Option<ZoneGroup> {
        Some(ZoneGroup {
            uid: format!("{}:1", self.uid),
            coordinator: self.uid.clone(),
            members: vec![self.uid.clone()],
        })
    }
}

pub(crate) fn context(prober: &Arc<ScriptedProber>, connector: Arc<MockConnector>) -> InitContext {
    InitContext {
        prober: prober.clone(),
        connector,
        connect_timeout: Duration::from_secs(3),
    }
}

/// Coordinator on the current runtime with a scripted prober
pub(crate) fn coordinator_with(
    prober: &Arc<ScriptedProber>,
    connector: Arc<MockConnector>,
    retry_ceiling_ms: u64,
) -> LazyInitCoordinator {
    let config = CoordinatorConfig {
        retry_ceiling_ms,
        ..CoordinatorConfig::default()
    };
    LazyInitCoordinator::with_parts(
        &config,
        prober.clone(),
        connector,
        tokio::runtime::Handle::current(),
    )
    .unwrap()
}

pub(crate) fn drain_events(
    events: &mut broadcast::Receiver<CoordinatorEvent>,
) -> Vec<CoordinatorEvent> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}
