//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;
use std::time::Duration;

use crate::application::services::{IntegrationService, PasswordService};
use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::infrastructure::store::JsonFileStore;
use crate::infrastructure::traits::{
    FileSystem, FormSubmitter, RealFileSystem, StateStore, UreqFormSubmitter,
};

/// Container holding shared dependencies; services are opened on demand.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// State persistence (rooted at `settings.data_dir`)
    pub store: Arc<dyn StateStore>,

    /// Outbound form submission
    pub submitter: Arc<dyn FormSubmitter>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        let timeout = Duration::from_millis(settings.submit_timeout_ms);
        Self::with_deps(
            settings,
            Arc::new(RealFileSystem),
            Arc::new(UreqFormSubmitter::new(timeout)),
        )
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        submitter: Arc<dyn FormSubmitter>,
    ) -> Self {
        let settings = Arc::new(settings);
        let store = Arc::new(JsonFileStore::new(fs.clone(), settings.data_dir.clone()));

        Self {
            settings,
            fs,
            store,
            submitter,
        }
    }

    /// Load (or seed) the service registry.
    pub fn password_service(&self) -> ApplicationResult<PasswordService> {
        PasswordService::open(self.store.clone(), self.settings.service_defaults())
    }

    /// Load the integration settings.
    pub fn integration_service(&self) -> ApplicationResult<IntegrationService> {
        IntegrationService::open(self.store.clone(), self.submitter.clone())
    }
}
