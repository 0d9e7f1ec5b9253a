use std::collections::HashSet;
use std::{net::SocketAddr, time::Duration};

use hcms_federation::{KnownRemote, default_known_remotes};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Remote discovery settings
    #[serde(default)]
    pub registry: RegistryConfig,
    /// Module loader settings
    #[serde(default)]
    pub loader: LoaderConfig,
    /// Shared dashboard composition
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        // Logging validation
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        // Registry validation
        if self.registry.fetch_timeout_ms == 0 {
            return Err("registry.fetch_timeout_ms must be > 0".into());
        }
        if self.registry.max_manifest_bytes == 0 {
            return Err("registry.max_manifest_bytes must be > 0".into());
        }
        let mut seen = HashSet::new();
        for remote in &self.registry.remotes {
            remote
                .validate()
                .map_err(|e| format!("registry.remotes: {e}"))?;
            if !seen.insert(remote.name.as_str()) {
                return Err(format!(
                    "registry.remotes: duplicate remote name '{}'",
                    remote.name
                ));
            }
        }
        // Loader validation
        if self.loader.timeout_ms == 0 {
            return Err("loader.timeout_ms must be > 0".into());
        }
        // Dashboard validation
        for slot in &self.dashboard.slots {
            if slot.slot.trim().is_empty() || slot.remote.trim().is_empty() {
                return Err("dashboard.slots entries need both 'slot' and 'remote'".into());
            }
        }
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        use std::net::{IpAddr, Ipv4Addr};
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.registry.fetch_timeout_ms)
    }

    pub fn loader_timeout(&self) -> Duration {
        Duration::from_millis(self.loader.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    4200
}
fn default_body_limit() -> usize {
    64 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Remote discovery configuration
///
/// The list of known remotes replaces the built-in list when set:
///
/// ```toml
/// [[registry.remotes]]
/// name = "patient-records"
/// base_url = "http://localhost:4201"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Re-fetch all manifests after the first pass and overwrite fallbacks
    #[serde(default = "default_true")]
    pub overlay: bool,
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
    #[serde(default = "default_max_manifest_bytes")]
    pub max_manifest_bytes: usize,
    #[serde(default = "default_known_remotes")]
    pub remotes: Vec<KnownRemote>,
}

fn default_true() -> bool {
    true
}
fn default_fetch_timeout_ms() -> u64 {
    10_000
}
fn default_max_manifest_bytes() -> usize {
    64 * 1024
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            overlay: true,
            fetch_timeout_ms: default_fetch_timeout_ms(),
            max_manifest_bytes: default_max_manifest_bytes(),
            remotes: default_known_remotes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    #[serde(default = "default_loader_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_loader_timeout_ms() -> u64 {
    15_000
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_loader_timeout_ms(),
        }
    }
}

/// Components mounted on the shared dashboard, one per slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_dashboard_slots")]
    pub slots: Vec<DashboardSlotConfig>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            slots: default_dashboard_slots(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSlotConfig {
    /// View container name
    pub slot: String,
    /// Registry key of the remote providing the component
    pub remote: String,
    #[serde(default = "default_component_module")]
    pub exposed_module: String,
    /// Used when the remote is not in the registry
    #[serde(default)]
    pub base_url: Option<String>,
}

fn default_component_module() -> String {
    "./Module".into()
}

fn default_dashboard_slots() -> Vec<DashboardSlotConfig> {
    vec![
        DashboardSlotConfig {
            slot: "patientRecordsContainer".into(),
            remote: "patient-records".into(),
            exposed_module: default_component_module(),
            base_url: Some("http://localhost:4201".into()),
        },
        DashboardSlotConfig {
            slot: "appointmentSchedulingContainer".into(),
            remote: "appointment-scheduling".into(),
            exposed_module: default_component_module(),
            base_url: Some("http://localhost:4202".into()),
        },
    ]
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    /// Default configuration file looked up in the working directory.
    pub const DEFAULT_CONFIG_FILE: &str = "hcms.toml";

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        match path {
            Some(p) => {
                let pathbuf = PathBuf::from(p);
                if pathbuf.exists() {
                    builder = builder.add_source(File::from(pathbuf));
                }
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    builder = builder.add_source(File::from(default_path));
                }
            }
        }
        // Environment variable overrides, e.g., HCMS__SERVER__PORT=9090
        builder = builder.add_source(
            Environment::with_prefix("HCMS")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}
