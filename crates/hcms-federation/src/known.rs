//! The static list of remotes the shell knows about at startup.

use serde::{Deserialize, Serialize};

use hcms_core::{Result, naming};

/// A remote the shell should discover: its technical name and where it is served.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KnownRemote {
    /// Technical (kebab-case) name; also the registry key.
    pub name: String,
    /// Base URL the remote is served from, e.g. `http://localhost:4201`.
    pub base_url: String,
}

impl KnownRemote {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
        }
    }

    pub fn manifest_url(&self) -> String {
        naming::manifest_url_for(&self.base_url)
    }

    pub fn validate(&self) -> Result<()> {
        if !naming::is_valid_remote_name(&self.name) {
            return Err(hcms_core::CoreError::configuration(format!(
                "invalid remote name '{}'",
                self.name
            )));
        }
        naming::validate_base_url(&self.base_url)?;
        Ok(())
    }
}

/// Remotes of the healthcare portal served by the local development setup.
pub fn default_known_remotes() -> Vec<KnownRemote> {
    vec![
        KnownRemote::new("patient-records", "http://localhost:4201"),
        KnownRemote::new("demographics", "http://localhost:4203"),
        KnownRemote::new("appointment-scheduling", "http://localhost:4202"),
    ]
}
