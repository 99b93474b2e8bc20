/*!
 * Device discovery for lazyconnect.
 *
 * Instead of scanning the network, discovery enumerates the proxies already
 * registered with a [`LazyInitCoordinator`]. An external discovery subsystem
 * calls [`ProxyDiscovery::discover`] where it would otherwise start an active
 * scan.
 */
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::coordinator::LazyInitCoordinator;
use crate::proxy::DeviceProxy;

/// Discovery options
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// How long an active scan would be allowed to take
    ///
    /// Enumerating registered proxies never waits, so this is not consulted.
    pub timeout: Duration,
    /// Whether to stop after the first device
    pub first_only: bool,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            first_only: false,
        }
    }
}

/// Device discovery trait
///
/// Implementations report each known device to `callback` synchronously.
pub trait ProxyDiscovery: Send + Sync + Debug {
    /// Get the discovery provider name
    fn name(&self) -> &'static str;

    /// Report known devices to `callback`
    fn discover(&self, options: &DiscoveryOptions, callback: &mut dyn FnMut(Arc<DeviceProxy>));
}

/// Discovery backed by the coordinator's registry
#[derive(Debug, Clone)]
pub struct StaticDiscovery {
    coordinator: LazyInitCoordinator,
}

impl StaticDiscovery {
    /// Create a discovery adapter over `coordinator`
    pub fn new(coordinator: LazyInitCoordinator) -> Self {
        Self { coordinator }
    }

    /// Every registered proxy
    pub fn discover_all(&self) -> Vec<Arc<DeviceProxy>> {
        self.coordinator.proxies()
    }
}

impl ProxyDiscovery for StaticDiscovery {
    fn name(&self) -> &'static str {
        "static"
    }

    fn discover(&self, options: &DiscoveryOptions, callback: &mut dyn FnMut(Arc<DeviceProxy>)) {
        let mut reported = 0usize;
        self.coordinator.discover(|proxy| {
            if options.first_only && reported > 0 {
                return;
            }
            reported += 1;
            callback(proxy.clone());
        });
        debug!(reported, provider = self.name(), "Discovery finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{coordinator_with, MockConnector, ScriptedProber};

    #[tokio::test]
    async fn test_discover_reports_registered_proxies() {
        let prober = ScriptedProber::new();
        let coordinator = coordinator_with(&prober, MockConnector::new(), 30_000);
        DeviceProxy::new("10.0.6.1", "Bedroom", &coordinator);
        DeviceProxy::new("10.0.6.2", "Study", &coordinator);

        let discovery = StaticDiscovery::new(coordinator.clone());
        let mut names = Vec::new();
        discovery.discover(&DiscoveryOptions::default(), &mut |proxy| {
            names.push(proxy.display_name().to_string())
        });

        assert_eq!(names, vec!["Bedroom", "Study"]);
        assert_eq!(discovery.discover_all().len(), 2);
        // discovery itself never probes
        assert_eq!(prober.probe_count("10.0.6.1"), 0);
    }

    #[tokio::test]
    async fn test_discover_first_only() {
        let prober = ScriptedProber::new();
        let coordinator = coordinator_with(&prober, MockConnector::new(), 30_000);
        DeviceProxy::new("10.0.7.1", "A", &coordinator);
        DeviceProxy::new("10.0.7.2", "B", &coordinator);

        let discovery = StaticDiscovery::new(coordinator);
        let options = DiscoveryOptions {
            first_only: true,
            ..DiscoveryOptions::default()
        };
        let mut found = Vec::new();
        discovery.discover(&options, &mut |proxy| found.push(proxy));

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].address(), "10.0.7.1");
    }

    #[tokio::test]
    async fn test_discover_empty_registry() {
        let prober = ScriptedProber::new();
        let discovery = StaticDiscovery::new(coordinator_with(&prober, MockConnector::new(), 30_000));

        let mut calls = 0;
        discovery.discover(&DiscoveryOptions::default(), &mut |_| calls += 1);
        assert_eq!(calls, 0);
    }

    #[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 2))]
    async fn test_discover_concurrent_with_registration() {
        let prober = ScriptedProber::new();
        let coordinator = coordinator_with(&prober, MockConnector::new(), 30_000);
        let discovery = StaticDiscovery::new(coordinator.clone());

        let registering = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move {
                for i in 0..200 {
                    DeviceProxy::new(format!("10.2.0.{}", i), "concurrent", &coordinator);
                    tokio::task::yield_now().await;
                }
            })
        };

        let mut last_seen = 0;
        while !registering.is_finished() {
            let mut seen = 0;
            discovery.discover(&DiscoveryOptions::default(), &mut |proxy| {
                assert_eq!(proxy.display_name(), "concurrent");
                seen += 1;
            });
            assert!(seen >= last_seen);
            last_seen = seen;
            tokio::task::yield_now().await;
        }
        registering.await.unwrap();

        assert_eq!(discovery.discover_all().len(), 200);
    }
}
