use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lazyconnect_core::config::CoordinatorConfig;
use lazyconnect_core::types::Id;
use lazyconnect_devices::device::{
    ControlService, MusicLibrary, Result as DeviceResult, ZoneGroupTopology,
};
use lazyconnect_devices::inert::{
    EmptyMusicLibrary, LazyService, LazyZoneGroupTopology, AV_TRANSPORT, CONTENT_DIRECTORY,
    RENDERING_CONTROL,
};
use lazyconnect_devices::{
    Connector, CoordinatorEvent, DeviceProxy, DiscoveryOptions, LazyInitCoordinator, ProxyDiscovery,
    ProxyEntity, SpeakerControl, SpeakerInfo, StaticDiscovery, ZoneGroup,
};
use tokio::net::TcpListener;
use tokio::time::timeout;
use tracing::info;

/// A speaker that answers with fixed values
#[derive(Debug)]
struct DemoSpeaker {
    address: String,
}

impl SpeakerControl for DemoSpeaker {
    fn uid(&self) -> Id {
        Id::prefixed("DEMO_", &self.address)
    }

    fn speaker_info(&self) -> SpeakerInfo {
        SpeakerInfo::new("Living Room", "Demo One")
    }

    fn shuffle(&self) -> bool {
        false
    }

    fn volume(&self) -> u8 {
        20
    }

    fn mute(&self) -> bool {
        false
    }

    fn night_mode(&self) -> Option<bool> {
        None
    }

    fn dialog_mode(&self) -> Option<bool> {
        None
    }

    fn music_library(&self) -> Arc<dyn MusicLibrary> {
        Arc::new(EmptyMusicLibrary)
    }

    fn av_transport(&self) -> Arc<dyn ControlService> {
        Arc::new(LazyService::new(AV_TRANSPORT))
    }

    fn rendering_control(&self) -> Arc<dyn ControlService> {
        Arc::new(LazyService::new(RENDERING_CONTROL))
    }

    fn content_directory(&self) -> Arc<dyn ControlService> {
        Arc::new(LazyService::new(CONTENT_DIRECTORY))
    }

    fn zone_group_topology(&self) -> Arc<dyn ZoneGroupTopology> {
        Arc::new(LazyZoneGroupTopology::default())
    }

    fn group(&self) -> Option<ZoneGroup> {
        None
    }
}

#[derive(Debug)]
struct DemoConnector;

#[async_trait]
impl Connector for DemoConnector {
    fn name(&self) -> &'static str {
        "demo"
    }

    async fn connect(&self, address: &str) -> DeviceResult<Arc<dyn SpeakerControl>> {
        Ok(Arc::new(DemoSpeaker {
            address: address.to_string(),
        }))
    }
}

fn print_status(proxy: &DeviceProxy) {
    let info = proxy.speaker_info();
    println!(
        "{:<12} {:<16} ready={:<5} model={:<16} volume={}",
        proxy.display_name(),
        proxy.address(),
        proxy.is_ready(),
        info.model_name,
        proxy.volume()
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    lazyconnect_core::logging::init()?;

    // Stand in for a device's control port on localhost
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            drop(socket);
        }
    });

    let config = CoordinatorConfig {
        control_port: port,
        probe_timeout_ms: 500,
        retry_ceiling_ms: 2_000,
    };
    let coordinator = LazyInitCoordinator::new(&config, Arc::new(DemoConnector))?;
    let mut events = coordinator.subscribe();

    // 192.0.2.0/24 is reserved for documentation and never answers
    let kitchen = DeviceProxy::new("127.0.0.1", "Kitchen", &coordinator);
    let office = DeviceProxy::new("192.0.2.10", "Office", &coordinator);
    let entity = ProxyEntity::new(kitchen.clone());

    println!("Before the worker ran:");
    let discovery = StaticDiscovery::new(coordinator.clone());
    discovery.discover(&DiscoveryOptions::default(), &mut |proxy| print_status(&proxy));

    let ready = timeout(Duration::from_secs(5), async {
        while let Ok(event) = events.recv().await {
            info!(?event, "Coordinator event");
            if event == (CoordinatorEvent::ProxyReady {
                address: kitchen.address().to_string(),
            }) {
                return true;
            }
        }
        false
    })
    .await
    .unwrap_or(false);

    entity.seen();
    println!("\nAfter waiting (kitchen ready: {}):", ready);
    discovery.discover(&DiscoveryOptions::default(), &mut |proxy| print_status(&proxy));
    println!(
        "\nKitchen entity {} available={} last_seen={:?} device_uid={:?}",
        entity.unique_id(),
        entity.available(),
        entity.last_seen(),
        kitchen.device_uid()
    );
    println!(
        "Pending: {} of {} (office still pending: {})",
        coordinator.pending_count(),
        coordinator.proxy_count(),
        !office.is_ready()
    );

    Ok(())
}
