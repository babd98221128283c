//! JSON file state store
//!
//! Layout under the data directory:
//! - `hirepass-data-v1.json`: array of services
//! - `hirepass-integrations-v1.json`: integration settings
//! - `active-service`: id of the active service (plain text)

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::{IntegrationSettings, Service, ServiceId};
use crate::infrastructure::traits::{FileSystem, StateStore};

pub const SERVICES_FILE: &str = "hirepass-data-v1.json";
pub const INTEGRATIONS_FILE: &str = "hirepass-integrations-v1.json";
pub const ACTIVE_FILE: &str = "active-service";

/// Suffix for unreadable state files moved out of the way.
pub const CORRUPT_SUFFIX: &str = ".corrupt";

pub struct JsonFileStore {
    fs: Arc<dyn FileSystem>,
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(fs: Arc<dyn FileSystem>, dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            dir: dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read and parse `name`. A file that does not parse is moved to
    /// `<name>.corrupt` and treated as absent.
    fn read_json<T: DeserializeOwned>(&self, name: &str) -> io::Result<Option<T>> {
        let path = self.dir.join(name);
        if !self.fs.exists(&path) {
            debug!("read_json: {} not found", path.display());
            return Ok(None);
        }
        let content = self.fs.read_to_string(&path)?;
        match serde_json::from_str(&content) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                let mut aside = path.clone().into_os_string();
                aside.push(CORRUPT_SUFFIX);
                let aside = PathBuf::from(aside);
                warn!(
                    "unreadable state {}: {e}; moved to {}",
                    path.display(),
                    aside.display()
                );
                self.fs.rename(&path, &aside)?;
                Ok(None)
            }
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> io::Result<()> {
        let path = self.dir.join(name);
        let content = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        debug!("write_json: {} ({} bytes)", path.display(), content.len());
        self.fs.write_atomic(&path, &content)
    }
}

impl StateStore for JsonFileStore {
    fn load_services(&self) -> io::Result<Option<Vec<Service>>> {
        self.read_json(SERVICES_FILE)
    }

    fn save_services(&self, services: &[Service]) -> io::Result<()> {
        self.write_json(SERVICES_FILE, services)
    }

    fn load_active(&self) -> io::Result<Option<ServiceId>> {
        let path = self.dir.join(ACTIVE_FILE);
        if !self.fs.exists(&path) {
            return Ok(None);
        }
        let content = self.fs.read_to_string(&path)?;
        let id = content.trim();
        Ok((!id.is_empty()).then(|| ServiceId::from(id)))
    }

    fn save_active(&self, id: &ServiceId) -> io::Result<()> {
        self.fs
            .write_atomic(&self.dir.join(ACTIVE_FILE), &format!("{id}\n"))
    }

    fn load_integrations(&self) -> io::Result<Option<IntegrationSettings>> {
        self.read_json(INTEGRATIONS_FILE)
    }

    fn save_integrations(&self, settings: &IntegrationSettings) -> io::Result<()> {
        self.write_json(INTEGRATIONS_FILE, settings)
    }
}
