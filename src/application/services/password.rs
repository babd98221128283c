//! Password service
//!
//! Owns the service registry and writes it through to the state store after
//! every applied transition. Refused operations are not persisted.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::{
    now, NewService, Outcome, Registry, Service, ServiceDefaults, ServiceId, ServiceUpdate,
};
use crate::infrastructure::traits::StateStore;

/// Service for generating and rewinding rolling passwords.
pub struct PasswordService {
    store: Arc<dyn StateStore>,
    registry: Registry,
}

impl PasswordService {
    /// Load the registry from `store`, or seed it from `defaults` when
    /// nothing is stored yet. A seeded registry is written immediately.
    pub fn open(store: Arc<dyn StateStore>, defaults: ServiceDefaults) -> ApplicationResult<Self> {
        let services = store.load_services().with_context("load services")?;
        let active = store.load_active().with_context("load active service")?;

        let service = match services {
            Some(services) if !services.is_empty() => {
                info!("open: loaded {} services", services.len());
                Self {
                    store,
                    registry: Registry::from_services(services, active, defaults),
                }
            }
            _ => {
                info!("open: no stored services, seeding '{}'", defaults.name);
                let service = Self {
                    store,
                    registry: Registry::seeded(defaults),
                };
                service.flush()?;
                service
            }
        };
        Ok(service)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn active(&self) -> &Service {
        self.registry.active()
    }

    /// Resolve a service by id or unique name.
    pub fn resolve(&self, reference: &str) -> Option<&Service> {
        self.registry.resolve(reference)
    }

    /// Write the full state (services and active selection).
    pub fn flush(&self) -> ApplicationResult<()> {
        self.save_services()?;
        self.save_active()
    }

    fn save_services(&self) -> ApplicationResult<()> {
        debug!("save_services: {} services", self.registry.services().len());
        self.store
            .save_services(self.registry.services())
            .with_context("save services")
    }

    fn save_active(&self) -> ApplicationResult<()> {
        self.store
            .save_active(self.registry.active_id())
            .with_context("save active service")
    }

    /// Persist after an applied transition and hand back an owned copy.
    fn commit(&self, outcome: Outcome<Service>) -> ApplicationResult<Outcome<Service>> {
        match &outcome {
            Outcome::Applied(_) => self.save_services()?,
            Outcome::Refused(refusal) => warn!("refused: {refusal}"),
        }
        Ok(outcome)
    }

    #[instrument(skip(self))]
    pub fn generate(&mut self, id: &ServiceId) -> ApplicationResult<Outcome<Service>> {
        let outcome = self.registry.generate(id, now())?.map(Service::clone);
        if let Outcome::Applied(s) = &outcome {
            debug!("generate: index={} password={}", s.current_index, s.current_password);
        }
        self.commit(outcome)
    }

    #[instrument(skip(self))]
    pub fn undo(&mut self, id: &ServiceId) -> ApplicationResult<Outcome<Service>> {
        let outcome = self.registry.undo(id).map(Service::clone);
        self.commit(outcome)
    }

    /// Rewind to a history entry, discarding newer entries.
    #[instrument(skip(self))]
    pub fn restore_from_history(
        &mut self,
        id: &ServiceId,
        index: u64,
        password: i64,
    ) -> ApplicationResult<Outcome<Service>> {
        let outcome = self
            .registry
            .restore_from_history(id, index, password)
            .map(Service::clone);
        self.commit(outcome)
    }

    #[instrument(skip(self))]
    pub fn set_manual_state(
        &mut self,
        id: &ServiceId,
        index: u64,
        password: i64,
    ) -> ApplicationResult<Outcome<Service>> {
        let outcome = self
            .registry
            .set_manual_state(id, index, password, now())
            .map(Service::clone);
        self.commit(outcome)
    }

    #[instrument(skip(self))]
    pub fn reset_history(&mut self, id: &ServiceId) -> ApplicationResult<Outcome<Service>> {
        let outcome = self.registry.reset_history(id).map(Service::clone);
        self.commit(outcome)
    }

    #[instrument(skip(self))]
    pub fn update_service_settings(
        &mut self,
        id: &ServiceId,
        update: &ServiceUpdate,
    ) -> ApplicationResult<Outcome<Service>> {
        let outcome = self
            .registry
            .update_service_settings(id, update)
            .map(Service::clone);
        self.commit(outcome)
    }

    /// Create a service and make it active.
    #[instrument(skip(self))]
    pub fn add_service(&mut self, new: NewService) -> ApplicationResult<Service> {
        let added = self.registry.add_service(new).clone();
        info!("add_service: id={} name={}", added.id, added.name);
        self.flush()?;
        Ok(added)
    }

    /// Delete a service; refused for the last one.
    #[instrument(skip(self))]
    pub fn delete_service(&mut self, id: &ServiceId) -> ApplicationResult<Outcome<Service>> {
        let outcome = self.registry.delete_service(id);
        match &outcome {
            Outcome::Applied(removed) => {
                info!("delete_service: removed {}", removed.name);
                self.flush()?;
            }
            Outcome::Refused(refusal) => warn!("refused: {refusal}"),
        }
        Ok(outcome)
    }

    #[instrument(skip(self))]
    pub fn select(&mut self, id: &ServiceId) -> ApplicationResult<Outcome<Service>> {
        let outcome = self.registry.select(id).map(Service::clone);
        match &outcome {
            Outcome::Applied(_) => self.save_active()?,
            Outcome::Refused(refusal) => warn!("refused: {refusal}"),
        }
        Ok(outcome)
    }
}
