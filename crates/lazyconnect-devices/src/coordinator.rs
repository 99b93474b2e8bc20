/*!
 * Lazy-initialization coordinator.
 *
 * The coordinator owns every registered [`DeviceProxy`], the set of proxies
 * still waiting for their device, and at most one background worker that
 * probes the pending set until it is empty.
 */
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::join_all;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tracing::{debug, error, info, Instrument};

use lazyconnect_core::config::CoordinatorConfig;
use lazyconnect_core::error::Error as CoreError;
use lazyconnect_core::logging::component_span;

use crate::connection::Connector;
use crate::device::{DeviceError, Result};
use crate::probe::{Prober, TcpProber};
use crate::proxy::{DeviceProxy, InitContext};
use crate::wake::WakeSignal;

const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Lifecycle events published by the coordinator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorEvent {
    /// A proxy was registered and is pending
    ProxyRegistered {
        /// The proxy's address
        address: String,
    },
    /// A pending proxy was found ready and left the pending set
    ProxyReady {
        /// The proxy's address
        address: String,
    },
    /// A worker task started
    WorkerStarted,
    /// The worker task ended
    WorkerStopped {
        /// Number of probe rounds the worker ran
        cycles: u64,
    },
}

#[derive(Debug, Default)]
struct RegistryState {
    proxies: Vec<Arc<DeviceProxy>>,
    pending: Vec<Arc<DeviceProxy>>,
    worker_running: bool,
}

#[derive(Debug)]
struct Inner {
    state: Mutex<RegistryState>,
    wake: WakeSignal,
    retry_ceiling: Duration,
    context: InitContext,
    runtime: Handle,
    events: broadcast::Sender<CoordinatorEvent>,
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, RegistryState> {
        // Critical sections only touch plain bookkeeping, so the data is
        // consistent even if a holder panicked.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, event: CoordinatorEvent) {
        let _ = self.events.send(event);
    }
}

/// Coordinates lazy initialization of device proxies
///
/// Cheap to clone; clones share the same registry and worker.
#[derive(Debug, Clone)]
pub struct LazyInitCoordinator {
    inner: Arc<Inner>,
}

impl LazyInitCoordinator {
    /// Create a coordinator that probes over TCP on the configured control port
    ///
    /// Must be called from within a tokio runtime; the worker is spawned on it.
    pub fn new(config: &CoordinatorConfig, connector: Arc<dyn Connector>) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| {
            DeviceError::CoreError(CoreError::runtime(format!(
                "Lazy-initialization coordinator needs a tokio runtime: {}",
                e
            )))
        })?;
        Self::with_parts(config, Arc::new(TcpProber::from_config(config)), connector, runtime)
    }

    /// Create a coordinator from explicit parts
    pub fn with_parts(
        config: &CoordinatorConfig,
        prober: Arc<dyn Prober>,
        connector: Arc<dyn Connector>,
        runtime: Handle,
    ) -> Result<Self> {
        config
            .validate()
            .map_err(|e| DeviceError::ConfigurationError(e.to_string()))?;

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            inner: Arc::new(Inner {
                state: Mutex::new(RegistryState::default()),
                wake: WakeSignal::new(),
                retry_ceiling: config.retry_ceiling(),
                context: InitContext {
                    prober,
                    connector,
                    connect_timeout: config.probe_timeout(),
                },
                runtime,
                events,
            }),
        })
    }

    pub(crate) fn init_context(&self) -> InitContext {
        self.inner.context.clone()
    }

    /// Register a proxy: record it, mark it pending, wake the worker
    ///
    /// Registration is never rejected. Registering the same proxy twice has
    /// no further effect.
    pub fn register_proxy(&self, proxy: Arc<DeviceProxy>) {
        {
            let mut state = self.inner.lock_state();
            if state.proxies.iter().any(|known| Arc::ptr_eq(known, &proxy)) {
                return;
            }
            state.proxies.push(proxy.clone());
            state.pending.push(proxy.clone());
            self.inner.wake.set();
        }

        debug!(address = proxy.address(), name = proxy.display_name(), "Registered proxy");
        self.inner.publish(CoordinatorEvent::ProxyRegistered {
            address: proxy.address().to_string(),
        });

        self.ensure_worker_started();
    }

    /// Start a worker if work is pending and none is running
    ///
    /// Returns whether a worker was started by this call.
    pub fn ensure_worker_started(&self) -> bool {
        {
            let mut state = self.inner.lock_state();
            if state.pending.is_empty() || state.worker_running {
                return false;
            }
            state.worker_running = true;
            // Start and stop events are published under the lock so they
            // never interleave between two workers.
            self.inner.publish(CoordinatorEvent::WorkerStarted);
        }

        let inner = self.inner.clone();
        self.inner.runtime.spawn(
            run_worker(inner).instrument(component_span("lazy-init-worker", None)),
        );
        true
    }

    /// Invoke `callback` for every registered proxy
    ///
    /// Works on a snapshot, so `callback` may register further proxies.
    /// Never probes and never blocks on the network.
    pub fn discover<F>(&self, mut callback: F)
    where
        F: FnMut(&Arc<DeviceProxy>),
    {
        let snapshot = self.proxies();
        for proxy in &snapshot {
            callback(proxy);
        }
    }

    /// All registered proxies, in registration order
    pub fn proxies(&self) -> Vec<Arc<DeviceProxy>> {
        self.inner.lock_state().proxies.clone()
    }

    /// Number of registered proxies
    pub fn proxy_count(&self) -> usize {
        self.inner.lock_state().proxies.len()
    }

    /// Number of proxies the worker has not yet seen ready
    pub fn pending_count(&self) -> usize {
        self.inner.lock_state().pending.len()
    }

    /// Whether a worker task is active
    pub fn is_worker_running(&self) -> bool {
        self.inner.lock_state().worker_running
    }

    /// Subscribe to coordinator lifecycle events
    pub fn subscribe(&self) -> broadcast::Receiver<CoordinatorEvent> {
        self.inner.events.subscribe()
    }
}

/// Resets the running flag if the worker ends without reaching its exit point
struct WorkerGuard {
    inner: Arc<Inner>,
    cycles: u64,
    finished: bool,
}

impl Drop for WorkerGuard {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let mut state = self.inner.lock_state();
        state.worker_running = false;
        self.inner.publish(CoordinatorEvent::WorkerStopped { cycles: self.cycles });
        drop(state);
        error!(cycles = self.cycles, "Lazy-initialization worker ended abnormally");
    }
}

async fn run_worker(inner: Arc<Inner>) {
    let mut guard = WorkerGuard {
        inner: inner.clone(),
        cycles: 0,
        finished: false,
    };
    info!("Lazy-initialization worker started");

    loop {
        let still_pending = {
            let mut state = inner.lock_state();
            // Everything registered up to here is in this scan.
            inner.wake.clear();

            // Proxies brought up outside this worker since the last round.
            let mut ready = Vec::new();
            state.pending.retain(|proxy| {
                if proxy.is_ready() {
                    ready.push(proxy.address().to_string());
                    false
                } else {
                    true
                }
            });
            for address in ready {
                inner.publish(CoordinatorEvent::ProxyReady { address });
            }

            if state.pending.is_empty() {
                state.worker_running = false;
                guard.finished = true;
                inner.publish(CoordinatorEvent::WorkerStopped { cycles: guard.cycles });
                break;
            }
            state.pending.clone()
        };

        guard.cycles += 1;
        debug!(cycle = guard.cycles, pending = still_pending.len(), "Probing pending devices");

        let results = join_all(still_pending.iter().map(|proxy| proxy.initialize())).await;
        let connected: Vec<&Arc<DeviceProxy>> = still_pending
            .iter()
            .zip(&results)
            .filter_map(|(proxy, ready)| ready.then_some(proxy))
            .collect();
        debug!(
            cycle = guard.cycles,
            connected = connected.len(),
            remaining = still_pending.len() - connected.len(),
            "Probe round finished"
        );

        if !connected.is_empty() {
            let mut state = inner.lock_state();
            state
                .pending
                .retain(|proxy| !connected.iter().any(|done| Arc::ptr_eq(done, proxy)));
            for proxy in &connected {
                inner.publish(CoordinatorEvent::ProxyReady {
                    address: proxy.address().to_string(),
                });
            }
        }

        if connected.len() < still_pending.len() {
            inner.wake.wait(inner.retry_ceiling).await;
        }
    }

    info!(cycles = guard.cycles, "Lazy-initialization worker stopped, nothing pending");
}
