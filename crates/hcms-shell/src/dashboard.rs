//! Shared dashboard.
//!
//! Mounts configured remote components into fixed view slots. Slots are
//! mounted one after another and each one succeeds or fails on its own.

use serde::Serialize;
use tracing::{info, warn};

use hcms_core::{LoadRequest, naming};

use crate::config::DashboardSlotConfig;
use crate::shell::PortalShell;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotMount {
    pub slot: String,
    pub remote: String,
    pub exposed_module: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_url: Option<String>,
    /// Name of the mounted component.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SlotMount {
    pub fn is_mounted(&self) -> bool {
        self.error.is_none()
    }
}

/// Registry entry wins; the slot's own base URL covers remotes not registered.
fn entry_url_for_slot(shell: &PortalShell, slot: &DashboardSlotConfig) -> Option<String> {
    if let Some(descriptor) = shell.registry().get(&slot.remote) {
        return Some(descriptor.entry_url);
    }
    slot.base_url.as_deref().map(naming::entry_url_for)
}

pub async fn mount_slots(shell: &PortalShell, slots: &[DashboardSlotConfig]) -> Vec<SlotMount> {
    let mut mounts = Vec::with_capacity(slots.len());
    for slot in slots {
        let mut mount = SlotMount {
            slot: slot.slot.clone(),
            remote: slot.remote.clone(),
            exposed_module: slot.exposed_module.clone(),
            entry_url: entry_url_for_slot(shell, slot),
            component: None,
            error: None,
        };

        let Some(entry_url) = mount.entry_url.clone() else {
            warn!(slot = %slot.slot, remote = %slot.remote, "Dashboard remote is not registered");
            mount.error = Some(format!("remote '{}' is not registered", slot.remote));
            mounts.push(mount);
            continue;
        };

        let request = LoadRequest::new(entry_url, &slot.exposed_module);
        match shell.loader().load_module(&request).await {
            Ok(unit) => {
                info!(slot = %slot.slot, remote = %slot.remote, "Dashboard component mounted");
                mount.component = Some(unit.export.name().to_string());
            }
            Err(e) => {
                warn!(slot = %slot.slot, remote = %slot.remote, error = %e, "Dashboard component failed to mount");
                mount.error = Some(e.to_string());
            }
        }
        mounts.push(mount);
    }
    mounts
}
