//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::io;
use std::path::Path;
use std::time::Duration;

use crate::domain::{IntegrationSettings, Service, ServiceId};

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Replace file contents atomically (temp file in the same directory, then rename).
    /// Creates parent directories as needed.
    fn write_atomic(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Rename/move a file.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;
}

/// Persistence of the service registry and integration settings.
///
/// `load_*` returns `Ok(None)` when nothing is stored. The two halves are
/// written independently; there is no transaction spanning both.
pub trait StateStore: Send + Sync {
    fn load_services(&self) -> io::Result<Option<Vec<Service>>>;

    fn save_services(&self, services: &[Service]) -> io::Result<()>;

    fn load_active(&self) -> io::Result<Option<ServiceId>>;

    fn save_active(&self, id: &ServiceId) -> io::Result<()>;

    fn load_integrations(&self) -> io::Result<Option<IntegrationSettings>>;

    fn save_integrations(&self, settings: &IntegrationSettings) -> io::Result<()>;
}

/// Outbound form submission (HTTP GET with query parameters).
pub trait FormSubmitter: Send + Sync {
    fn submit(&self, url: &str, params: &[(String, String)]) -> io::Result<()>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write_atomic(&self, path: &Path, content: &str) -> io::Result<()> {
        use std::io::Write;

        self.ensure_parent(path)?;
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                self.create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

/// Form submitter using a blocking `ureq` agent.
pub struct UreqFormSubmitter {
    agent: ureq::Agent,
}

impl UreqFormSubmitter {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("hirepass/", env!("CARGO_PKG_VERSION")))
            .build();
        Self { agent }
    }
}

impl FormSubmitter for UreqFormSubmitter {
    fn submit(&self, url: &str, params: &[(String, String)]) -> io::Result<()> {
        let request = params
            .iter()
            .fold(self.agent.get(url), |req, (key, value)| req.query(key, value));

        match request.call() {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(status, _)) => Err(io::Error::other(format!(
                "form endpoint returned HTTP {status}"
            ))),
            Err(ureq::Error::Transport(transport)) => Err(io::Error::other(transport.to_string())),
        }
    }
}
