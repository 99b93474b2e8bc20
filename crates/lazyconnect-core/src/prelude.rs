/*!
 * Prelude module for lazyconnect Core.
 *
 * Re-exports commonly used types and functions so downstream crates can
 * pull them in with a single import.
 */

// Re-export error types
pub use crate::error::{Error, Result};

// Re-export core types
pub use crate::types::{Id, Metadata, Value};

// Re-export config types
pub use crate::config::{Config, ConfigBuilder, CoordinatorConfig, SharedConfig};

// Re-export utility functions
pub use crate::utils::{duration_to_millis, millis_to_duration, with_timeout};

// Re-export logging helpers
pub use crate::log_with_fields;
pub use crate::logging::{component_span, operation_span};
pub use tracing::{debug, error, info, trace, warn};

// Re-export core initialization
pub use crate::init;
