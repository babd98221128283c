//! Service registry: the ordered collection of services and the active pointer.
//!
//! Invariants held after every operation:
//! - the registry contains at least one service
//! - the active id resolves to a service in the collection

use std::convert::Infallible;

use chrono::{DateTime, Utc};

use super::entities::{Outcome, Recurrence, Refusal, Service, ServiceId, ServiceUpdate};
use super::error::DomainError;

/// Defaults for new services and for seeding an empty registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDefaults {
    pub name: String,
    pub seed: i64,
    pub recurrence: Recurrence,
}

impl ServiceDefaults {
    /// Id of the service created when seeding an empty registry.
    pub const SEED_ID: &'static str = "default";

    pub fn seed_service(&self) -> Service {
        Service::new(
            ServiceId::from(Self::SEED_ID),
            self.name.clone(),
            self.seed,
            self.recurrence,
        )
    }
}

impl Default for ServiceDefaults {
    fn default() -> Self {
        Self {
            name: "(G) Trailer".into(),
            seed: 41378,
            recurrence: Recurrence {
                multiplier: 7,
                addend: 386,
                modulus: 100_000,
            },
        }
    }
}

/// Parameters for a new service; `None` falls back to [`ServiceDefaults`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewService {
    pub name: String,
    pub seed: Option<i64>,
    pub multiplier: Option<i64>,
    pub addend: Option<i64>,
    pub modulus: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    services: Vec<Service>,
    active: ServiceId,
    defaults: ServiceDefaults,
}

impl Registry {
    /// Registry holding only the seed service.
    pub fn seeded(defaults: ServiceDefaults) -> Self {
        let seed = defaults.seed_service();
        Self {
            active: seed.id.clone(),
            services: vec![seed],
            defaults,
        }
    }

    /// Registry from loaded services. Empty input is seeded; an unknown or
    /// missing `active` falls back to the first service.
    pub fn from_services(
        services: Vec<Service>,
        active: Option<ServiceId>,
        defaults: ServiceDefaults,
    ) -> Self {
        if services.is_empty() {
            return Self::seeded(defaults);
        }
        let active = active
            .filter(|id| services.iter().any(|s| &s.id == id))
            .unwrap_or_else(|| services[0].id.clone());
        Self {
            services,
            active,
            defaults,
        }
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn defaults(&self) -> &ServiceDefaults {
        &self.defaults
    }

    pub fn active_id(&self) -> &ServiceId {
        &self.active
    }

    pub fn active(&self) -> &Service {
        self.get(&self.active).unwrap_or(&self.services[0])
    }

    pub fn get(&self, id: &ServiceId) -> Option<&Service> {
        self.services.iter().find(|s| &s.id == id)
    }

    fn position(&self, id: &ServiceId) -> Option<usize> {
        self.services.iter().position(|s| &s.id == id)
    }

    /// Replace the service `id` with the result of `transition`.
    ///
    /// The new value is computed in full before it is stored, so a refused
    /// or failed transition leaves the registry untouched.
    fn apply<E, F>(&mut self, id: &ServiceId, transition: F) -> Result<Outcome<&Service>, E>
    where
        F: FnOnce(&Service) -> Result<Outcome<Service>, E>,
    {
        let Some(pos) = self.position(id) else {
            return Ok(Outcome::Refused(Refusal::UnknownService(id.clone())));
        };
        match transition(&self.services[pos])? {
            Outcome::Applied(updated) => {
                self.services[pos] = updated;
                Ok(Outcome::Applied(&self.services[pos]))
            }
            Outcome::Refused(r) => Ok(Outcome::Refused(r)),
        }
    }

    pub fn generate(
        &mut self,
        id: &ServiceId,
        now: DateTime<Utc>,
    ) -> Result<Outcome<&Service>, DomainError> {
        self.apply(id, |s| s.generate(now).map(Outcome::Applied))
    }

    pub fn undo(&mut self, id: &ServiceId) -> Outcome<&Service> {
        self.apply_infallible(id, |s| s.undo())
    }

    pub fn restore_from_history(
        &mut self,
        id: &ServiceId,
        index: u64,
        password: i64,
    ) -> Outcome<&Service> {
        self.apply_infallible(id, |s| s.restore_from_history(index, password))
    }

    pub fn set_manual_state(
        &mut self,
        id: &ServiceId,
        index: u64,
        password: i64,
        now: DateTime<Utc>,
    ) -> Outcome<&Service> {
        self.apply_infallible(id, |s| {
            Outcome::Applied(s.set_manual_state(index, password, now))
        })
    }

    pub fn reset_history(&mut self, id: &ServiceId) -> Outcome<&Service> {
        self.apply_infallible(id, |s| Outcome::Applied(s.reset_history()))
    }

    pub fn update_service_settings(
        &mut self,
        id: &ServiceId,
        update: &ServiceUpdate,
    ) -> Outcome<&Service> {
        self.apply_infallible(id, |s| Outcome::Applied(s.apply_settings(update)))
    }

    fn apply_infallible<F>(&mut self, id: &ServiceId, transition: F) -> Outcome<&Service>
    where
        F: FnOnce(&Service) -> Outcome<Service>,
    {
        match self.apply(id, |s| Ok::<_, Infallible>(transition(s))) {
            Ok(outcome) => outcome,
            Err(never) => match never {},
        }
    }

    /// Append a new service with a fresh id and make it active.
    pub fn add_service(&mut self, new: NewService) -> &Service {
        let recurrence = Recurrence {
            multiplier: new.multiplier.unwrap_or(self.defaults.recurrence.multiplier),
            addend: new.addend.unwrap_or(self.defaults.recurrence.addend),
            modulus: new.modulus.unwrap_or(self.defaults.recurrence.modulus),
        };
        let service = Service::new(
            ServiceId::generate(),
            new.name,
            new.seed.unwrap_or(self.defaults.seed),
            recurrence,
        );
        self.active = service.id.clone();
        self.services.push(service);
        &self.services[self.services.len() - 1]
    }

    /// Remove a service. Refused for the last remaining service. If the
    /// active service is removed, the first remaining service becomes active.
    pub fn delete_service(&mut self, id: &ServiceId) -> Outcome<Service> {
        let Some(pos) = self.position(id) else {
            return Outcome::Refused(Refusal::UnknownService(id.clone()));
        };
        if self.services.len() <= 1 {
            return Outcome::Refused(Refusal::LastService);
        }
        let removed = self.services.remove(pos);
        if self.active == removed.id {
            self.active = self.services[0].id.clone();
        }
        Outcome::Applied(removed)
    }

    /// Change the active service. Unknown ids are refused.
    pub fn select(&mut self, id: &ServiceId) -> Outcome<&Service> {
        let Some(pos) = self.position(id) else {
            return Outcome::Refused(Refusal::UnknownService(id.clone()));
        };
        self.active = id.clone();
        Outcome::Applied(&self.services[pos])
    }

    /// Resolve a user-supplied reference: exact id first, then unique name.
    pub fn resolve(&self, reference: &str) -> Option<&Service> {
        let by_id = self.services.iter().find(|s| s.id.as_str() == reference);
        by_id.or_else(|| {
            let mut named = self.services.iter().filter(|s| s.name == reference);
            match (named.next(), named.next()) {
                (Some(s), None) => Some(s),
                _ => None,
            }
        })
    }
}
