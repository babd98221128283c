//! Shared test doubles for the boundary traits

#![allow(dead_code)]

use std::io;
use std::sync::Mutex;

use hirepass::domain::{IntegrationSettings, Service, ServiceId};
use hirepass::infrastructure::traits::{FormSubmitter, StateStore};

/// In-memory state store that counts writes.
#[derive(Default)]
pub struct MemoryStore {
    pub services: Mutex<Option<Vec<Service>>>,
    pub active: Mutex<Option<ServiceId>>,
    pub integrations: Mutex<Option<IntegrationSettings>>,
    pub service_writes: Mutex<usize>,
    pub active_writes: Mutex<usize>,
    pub integration_writes: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_services(services: Vec<Service>) -> Self {
        let store = Self::default();
        *store.services.lock().unwrap() = Some(services);
        store
    }

    pub fn stored_services(&self) -> Vec<Service> {
        self.services.lock().unwrap().clone().unwrap_or_default()
    }

    pub fn stored_active(&self) -> Option<ServiceId> {
        self.active.lock().unwrap().clone()
    }

    pub fn stored_integrations(&self) -> IntegrationSettings {
        self.integrations.lock().unwrap().clone().unwrap_or_default()
    }

    pub fn service_writes(&self) -> usize {
        *self.service_writes.lock().unwrap()
    }

    pub fn active_writes(&self) -> usize {
        *self.active_writes.lock().unwrap()
    }

    pub fn integration_writes(&self) -> usize {
        *self.integration_writes.lock().unwrap()
    }
}

impl StateStore for MemoryStore {
    fn load_services(&self) -> io::Result<Option<Vec<Service>>> {
        Ok(self.services.lock().unwrap().clone())
    }

    fn save_services(&self, services: &[Service]) -> io::Result<()> {
        *self.services.lock().unwrap() = Some(services.to_vec());
        *self.service_writes.lock().unwrap() += 1;
        Ok(())
    }

    fn load_active(&self) -> io::Result<Option<ServiceId>> {
        Ok(self.active.lock().unwrap().clone())
    }

    fn save_active(&self, id: &ServiceId) -> io::Result<()> {
        *self.active.lock().unwrap() = Some(id.clone());
        *self.active_writes.lock().unwrap() += 1;
        Ok(())
    }

    fn load_integrations(&self) -> io::Result<Option<IntegrationSettings>> {
        Ok(self.integrations.lock().unwrap().clone())
    }

    fn save_integrations(&self, settings: &IntegrationSettings) -> io::Result<()> {
        *self.integrations.lock().unwrap() = Some(settings.clone());
        *self.integration_writes.lock().unwrap() += 1;
        Ok(())
    }
}

/// Form submitter that records requests instead of sending them.
pub struct MockSubmitter {
    pub requests: Mutex<Vec<(String, Vec<(String, String)>)>>,
    should_fail: bool,
}

impl MockSubmitter {
    pub fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            should_fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            should_fail: true,
        }
    }

    pub fn requests(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.requests.lock().unwrap().clone()
    }
}

impl FormSubmitter for MockSubmitter {
    fn submit(&self, url: &str, params: &[(String, String)]) -> io::Result<()> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), params.to_vec()));
        if self.should_fail {
            return Err(io::Error::new(io::ErrorKind::ConnectionRefused, "offline"));
        }
        Ok(())
    }
}
