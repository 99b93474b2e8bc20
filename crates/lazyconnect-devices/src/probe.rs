/*!
 * Reachability probing.
 *
 * A probe is a single bounded-timeout TCP connect against a device's control
 * port. Unreachability is an expected outcome and is reported as a value.
 */
use std::fmt::{self, Debug};
use std::io;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tracing::{debug, trace};

use lazyconnect_core::config::CoordinatorConfig;

/// Outcome of a single reachability probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// A connection to the control port was established
    Reachable,
    /// No connection within the probe timeout
    TimedOut,
    /// The connection attempt failed (refused, host unreachable, unresolvable)
    Unreachable(io::ErrorKind),
}

impl ProbeOutcome {
    /// Whether the device answered on its control port
    pub fn is_reachable(&self) -> bool {
        matches!(self, ProbeOutcome::Reachable)
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::Reachable => write!(f, "reachable"),
            ProbeOutcome::TimedOut => write!(f, "timed out"),
            ProbeOutcome::Unreachable(kind) => write!(f, "unreachable ({})", kind),
        }
    }
}

/// Checks whether a device address is reachable
#[async_trait]
pub trait Prober: Send + Sync + Debug {
    /// Probe `address` once; never fails, never outlives its own timeout
    async fn probe(&self, address: &str) -> ProbeOutcome;
}

/// Probe `port` on `address` with a single connect attempt
///
/// The connection is closed as soon as it is established. On timeout the
/// pending connect is dropped, which releases its socket.
pub async fn probe_control_port(address: &str, port: u16, timeout: Duration) -> ProbeOutcome {
    match tokio::time::timeout(timeout, TcpStream::connect((address, port))).await {
        Ok(Ok(stream)) => {
            drop(stream);
            trace!(address, port, "Control port answered");
            ProbeOutcome::Reachable
        }
        Ok(Err(e)) => {
            debug!(address, port, error = %e, "Probe failed");
            ProbeOutcome::Unreachable(e.kind())
        }
        Err(_) => {
            debug!(address, port, timeout_ms = timeout.as_millis() as u64, "Probe timed out");
            ProbeOutcome::TimedOut
        }
    }
}

/// Probes a fixed control port over TCP
#[derive(Debug, Clone)]
pub struct TcpProber {
    port: u16,
    timeout: Duration,
}

impl TcpProber {
    /// Create a prober for `port` with a per-probe `timeout`
    pub fn new(port: u16, timeout: Duration) -> Self {
        Self { port, timeout }
    }

    /// Create a prober from coordinator settings
    pub fn from_config(config: &CoordinatorConfig) -> Self {
        Self::new(config.control_port, config.probe_timeout())
    }

    /// The probed control port
    pub fn port(&self) -> u16 {
        self.port
    }

    /// The per-probe timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for TcpProber {
    fn default() -> Self {
        Self::from_config(&CoordinatorConfig::default())
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, address: &str) -> ProbeOutcome {
        probe_control_port(address, self.port, self.timeout).await
    }
}
