//! Registry Initializer
//!
//! Seeds the registry from the known remotes in two phases:
//!
//! 1. **Fallback phase**: fetch each manifest; build the descriptor from the
//!    manifest when it arrives, otherwise entirely from naming conventions.
//! 2. **Overlay phase** (optional): re-fetch all manifests as a batch and
//!    overwrite every descriptor whose manifest is now available.
//!
//! A slow or missing manifest endpoint never prevents the registry from being
//! complete; it only degrades that remote to convention defaults.
//!
//! Initialization is single-flight: callers arriving while a run is in
//! progress wait for it and share its report.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwapOption;
use serde::Serialize;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use hcms_core::{DescriptorOrigin, RemoteDescriptor};

use crate::fetcher::{FetchOutcome, ManifestFetcher};
use crate::known::KnownRemote;
use crate::registry::RemoteRegistry;

/// How one remote ended up in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteInitStatus {
    pub name: String,
    pub origin: DescriptorOrigin,
    /// Whether the overlay phase replaced the first-phase descriptor.
    pub overlaid: bool,
    /// Last fetch error, when the remote is running on fallback values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of one initialization run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitReport {
    pub generation: u64,
    pub remotes: Vec<RemoteInitStatus>,
    #[serde(with = "time::serde::rfc3339")]
    pub completed_at: OffsetDateTime,
}

impl InitReport {
    pub fn from_manifest(&self) -> usize {
        self.count(DescriptorOrigin::Manifest)
    }

    pub fn from_fallback(&self) -> usize {
        self.count(DescriptorOrigin::Fallback)
    }

    pub fn status(&self, name: &str) -> Option<&RemoteInitStatus> {
        self.remotes.iter().find(|s| s.name == name)
    }

    fn count(&self, origin: DescriptorOrigin) -> usize {
        self.remotes.iter().filter(|s| s.origin == origin).count()
    }
}

/// Populates a [`RemoteRegistry`] from manifests of the known remotes.
pub struct RegistryInitializer {
    registry: Arc<RemoteRegistry>,
    fetcher: ManifestFetcher,
    remotes: Vec<KnownRemote>,
    overlay: bool,
    /// Serializes runs; held for the whole two-phase merge.
    gate: Mutex<()>,
    /// Number of completed runs.
    completed: AtomicU64,
    last_report: ArcSwapOption<InitReport>,
}

impl RegistryInitializer {
    pub fn new(
        registry: Arc<RemoteRegistry>,
        fetcher: ManifestFetcher,
        remotes: Vec<KnownRemote>,
    ) -> Self {
        Self {
            registry,
            fetcher,
            remotes,
            overlay: true,
            gate: Mutex::new(()),
            completed: AtomicU64::new(0),
            last_report: ArcSwapOption::empty(),
        }
    }

    /// Enables or disables the overlay phase.
    #[must_use]
    pub fn with_overlay(mut self, overlay: bool) -> Self {
        self.overlay = overlay;
        self
    }

    pub fn registry(&self) -> &Arc<RemoteRegistry> {
        &self.registry
    }

    /// Report of the most recent completed run, if any.
    pub fn last_report(&self) -> Option<Arc<InitReport>> {
        self.last_report.load_full()
    }

    /// Number of completed initialization runs.
    pub fn generation(&self) -> u64 {
        self.completed.load(Ordering::Acquire)
    }

    /// Runs the two-phase initialization, or joins the one already in flight.
    #[instrument(skip(self), fields(remotes = self.remotes.len(), overlay = self.overlay))]
    pub async fn initialize(&self) -> Arc<InitReport> {
        let observed = self.completed.load(Ordering::Acquire);
        let _guard = self.gate.lock().await;

        if self.completed.load(Ordering::Acquire) != observed
            && let Some(report) = self.last_report.load_full()
        {
            info!(
                generation = report.generation,
                "Joined in-flight registry initialization"
            );
            return report;
        }

        let mut statuses = self.fallback_phase().await;
        if self.overlay {
            self.overlay_phase(&mut statuses).await;
        }

        let generation = observed + 1;
        let report = Arc::new(InitReport {
            generation,
            remotes: statuses,
            completed_at: OffsetDateTime::now_utc(),
        });

        self.last_report.store(Some(Arc::clone(&report)));
        self.completed.store(generation, Ordering::Release);

        info!(
            generation,
            registered = self.registry.len(),
            from_manifest = report.from_manifest(),
            from_fallback = report.from_fallback(),
            "Remote registry initialized"
        );
        report
    }

    /// Fetches one remote's manifest and registers the resulting descriptor.
    ///
    /// Used for remotes added after startup; never fails, degrading to
    /// convention defaults like the fallback phase.
    pub async fn register_remote(&self, remote: &KnownRemote) -> RemoteDescriptor {
        let (descriptor, error) = match self.fetcher.fetch(&remote.base_url).await {
            Ok(manifest) => (manifest.into_descriptor(&remote.name, &remote.base_url), None),
            Err(e) => {
                warn!(
                    remote = %remote.name,
                    base_url = %remote.base_url,
                    error = %e,
                    "Manifest unavailable, registering with defaults"
                );
                (
                    RemoteDescriptor::fallback(&remote.name, &remote.base_url),
                    Some(e),
                )
            }
        };
        self.registry.set(&remote.name, descriptor.clone());
        info!(
            remote = %remote.name,
            route_path = %descriptor.route_path,
            fallback = error.is_some(),
            "Remote module registered"
        );
        descriptor
    }

    async fn fallback_phase(&self) -> Vec<RemoteInitStatus> {
        let outcomes = self.fetcher.fetch_all(&self.remotes).await;
        outcomes
            .into_iter()
            .map(|outcome| {
                let status = match &outcome.result {
                    Ok(_) => RemoteInitStatus {
                        name: outcome.remote.name.clone(),
                        origin: DescriptorOrigin::Manifest,
                        overlaid: false,
                        error: None,
                    },
                    Err(e) => RemoteInitStatus {
                        name: outcome.remote.name.clone(),
                        origin: DescriptorOrigin::Fallback,
                        overlaid: false,
                        error: Some(e.to_string()),
                    },
                };
                let name = outcome.remote.name.clone();
                self.registry.set(name, descriptor_for(outcome));
                status
            })
            .collect()
    }

    async fn overlay_phase(&self, statuses: &mut [RemoteInitStatus]) {
        let outcomes = self.fetcher.fetch_all(&self.remotes).await;
        for (status, outcome) in statuses.iter_mut().zip(outcomes) {
            if !outcome.is_success() {
                continue;
            }
            status.origin = DescriptorOrigin::Manifest;
            status.overlaid = true;
            status.error = None;
            let name = outcome.remote.name.clone();
            self.registry.set(name, descriptor_for(outcome));
        }
    }
}

fn descriptor_for(outcome: FetchOutcome) -> RemoteDescriptor {
    let FetchOutcome { remote, result } = outcome;
    match result {
        Ok(manifest) => manifest.into_descriptor(&remote.name, &remote.base_url),
        Err(_) => RemoteDescriptor::fallback(&remote.name, &remote.base_url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::FetcherConfig;

    fn unreachable_initializer() -> RegistryInitializer {
        // Port 9 (discard) is never served in test environments.
        let remotes = vec![
            KnownRemote::new("patient-records", "http://127.0.0.1:9"),
            KnownRemote::new("demographics", "http://127.0.0.1:9/demo"),
        ];
        let fetcher = ManifestFetcher::new(
            FetcherConfig::default().with_request_timeout(std::time::Duration::from_secs(2)),
        )
        .unwrap();
        RegistryInitializer::new(Arc::new(RemoteRegistry::new()), fetcher, remotes)
    }

    #[tokio::test]
    async fn unreachable_remotes_fall_back() {
        let init = unreachable_initializer();
        let report = init.initialize().await;

        assert_eq!(report.generation, 1);
        assert_eq!(report.from_fallback(), 2);
        assert!(report.status("patient-records").unwrap().error.is_some());

        let registry = init.registry();
        assert_eq!(registry.keys(), ["patient-records", "demographics"]);
        let d = registry.get("patient-records").unwrap();
        assert_eq!(d.route_path, "patients");
        assert_eq!(d.display_name, "Patient Records");
        assert_eq!(d.origin, DescriptorOrigin::Fallback);
    }

    #[tokio::test]
    async fn sequential_runs_advance_generation() {
        let init = unreachable_initializer().with_overlay(false);
        assert!(init.last_report().is_none());

        init.initialize().await;
        let second = init.initialize().await;

        assert_eq!(second.generation, 2);
        assert_eq!(init.generation(), 2);
        assert_eq!(init.registry().len(), 2);
    }
}
