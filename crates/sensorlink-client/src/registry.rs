/*!
 * Registry of available IO systems.
 *
 * A client owns one registry and resolves the `io_type` strings callers
 * pass against it. Backends register themselves under a unique name; the
 * default registry carries the simulated backend when the `sim` feature is
 * enabled, and custom backends can be added before client initialization.
 */
use std::collections::HashMap;
use std::sync::Arc;

#[cfg(feature = "sim")]
use sensorlink_core::config::SessionConfig;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{ClientError, Result};
use crate::io::IoSystem;

/// Registry mapping IO-type names to backends
#[derive(Debug, Default)]
pub struct IoRegistry {
    systems: RwLock<HashMap<String, Arc<dyn IoSystem>>>,
}

impl IoRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            systems: RwLock::new(HashMap::new()),
        }
    }

    /// Create a registry with the built-in backends registered
    #[cfg(feature = "sim")]
    pub async fn with_defaults(session: &SessionConfig) -> Self {
        let registry = Self::new();

        let sim = Arc::new(crate::sim::SimIoSystem::with_sample_period(
            session.sim_sample_period(),
        ));
        if let Err(e) = registry.register(sim).await {
            debug!("Default backend already present: {}", e);
        }

        registry
    }

    /// Create a registry with the built-in backends registered
    ///
    /// Without the `sim` feature there are no built-in backends.
    #[cfg(not(feature = "sim"))]
    pub async fn with_defaults(_session: &sensorlink_core::config::SessionConfig) -> Self {
        Self::new()
    }

    /// Register a backend under its own name
    ///
    /// Fails if a backend with the same name is already registered.
    pub async fn register(&self, system: Arc<dyn IoSystem>) -> Result<()> {
        let name = system.name().to_string();
        let mut systems = self.systems.write().await;

        if systems.contains_key(&name) {
            return Err(ClientError::InitFailed(format!(
                "IO system {} is already registered",
                name
            )));
        }

        info!("Registered IO system {}", name);
        systems.insert(name, system);
        Ok(())
    }

    /// Resolve an IO-type name to its backend
    pub async fn get(&self, io_type: &str) -> Result<Arc<dyn IoSystem>> {
        let systems = self.systems.read().await;
        systems
            .get(io_type)
            .cloned()
            .ok_or_else(|| ClientError::UnsupportedIoType(io_type.to_string()))
    }

    /// The names of all registered backends, sorted
    pub async fn io_types(&self) -> Vec<String> {
        let systems = self.systems.read().await;
        let mut names: Vec<String> = systems.keys().cloned().collect();
        names.sort();
        names
    }

    /// All registered backends, ordered by name
    ///
    /// Discovery iterates this list so listing passes visit backends in a
    /// stable order.
    pub(crate) async fn all(&self) -> Vec<Arc<dyn IoSystem>> {
        let systems = self.systems.read().await;
        let mut entries: Vec<_> = systems.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter().map(|(_, s)| Arc::clone(s)).collect()
    }
}
