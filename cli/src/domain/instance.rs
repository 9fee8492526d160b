//! Compute Engine instance and image types, plus the pure helpers the
//! lifecycle workflows are built from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Image family used when no custom image is requested.
pub const DEFAULT_IMAGE_PROJECT: &str = "ubuntu-os-cloud";
pub const DEFAULT_IMAGE_FAMILY: &str = "ubuntu-2204-lts";

/// Placeholder substituted into startup script templates.
const INSTANCE_USER_PLACEHOLDER: &str = "{instance_user}";

/// Instance status as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceStatus {
    Provisioning,
    Staging,
    Running,
    Stopping,
    Suspending,
    Suspended,
    Terminated,
    Other(String),
}

impl InstanceStatus {
    #[must_use]
    pub fn parse(status: &str) -> Self {
        match status {
            "PROVISIONING" => Self::Provisioning,
            "STAGING" => Self::Staging,
            "RUNNING" => Self::Running,
            "STOPPING" => Self::Stopping,
            "SUSPENDING" => Self::Suspending,
            "SUSPENDED" => Self::Suspended,
            "TERMINATED" => Self::Terminated,
            other => Self::Other(other.to_owned()),
        }
    }
}

/// Attached disk of an instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachedDisk {
    #[serde(default)]
    pub boot: bool,
    #[serde(default)]
    pub source: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessConfig {
    #[serde(default, rename = "natIP", skip_serializing_if = "Option::is_none")]
    pub nat_ip: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    #[serde(default, rename = "networkIP", skip_serializing_if = "Option::is_none")]
    pub network_ip: Option<String>,
    #[serde(default)]
    pub access_configs: Vec<AccessConfig>,
}

/// VM instance resource (the subset the tool reads).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub zone: String,
    #[serde(default)]
    pub machine_type: String,
    #[serde(default)]
    pub disks: Vec<AttachedDisk>,
    #[serde(default)]
    pub network_interfaces: Vec<NetworkInterface>,
}

impl Instance {
    #[must_use]
    pub fn status(&self) -> InstanceStatus {
        InstanceStatus::parse(&self.status)
    }

    /// Source URL of the boot disk.
    #[must_use]
    pub fn boot_disk(&self) -> Option<&str> {
        self.disks
            .iter()
            .find(|d| d.boot)
            .map(|d| d.source.as_str())
            .filter(|s| !s.is_empty())
    }

    /// First external (NAT) address, if any.
    #[must_use]
    pub fn external_ip(&self) -> Option<&str> {
        self.network_interfaces
            .iter()
            .flat_map(|n| &n.access_configs)
            .find_map(|a| a.nat_ip.as_deref())
    }
}

/// Image resource (the subset the tool reads).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub self_link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<String>,
}

// ── Pure helpers ─────────────────────────────────────────────────────────────

/// Every image of a family except those named in `keep`.
#[must_use]
pub fn dangling_images(images: &[Image], keep: &[&str]) -> Vec<String> {
    images
        .iter()
        .filter(|img| !keep.contains(&img.name.as_str()))
        .map(|img| img.name.clone())
        .collect()
}

/// Snapshot image name: `<base>-<yyyymmddhhmmss>` in UTC.
#[must_use]
pub fn snapshot_image_name(base: &str, now: DateTime<Utc>) -> String {
    format!("{base}-{}", now.format("%Y%m%d%H%M%S"))
}

/// Source image path for a new instance.
///
/// A custom image is looked up in the profile's own project; otherwise the
/// public Ubuntu LTS family is used.
#[must_use]
pub fn source_image(project: &str, custom: Option<&str>) -> String {
    match custom {
        Some(name) => format!("projects/{project}/global/images/{name}"),
        None => {
            format!("projects/{DEFAULT_IMAGE_PROJECT}/global/images/family/{DEFAULT_IMAGE_FAMILY}")
        }
    }
}

/// Region of a zone: the zone without its last `-` segment.
#[must_use]
pub fn region_from_zone(zone: &str) -> String {
    match zone.rsplit_once('-') {
        Some((region, _)) => region.to_owned(),
        None => zone.to_owned(),
    }
}

/// Last path segment of a resource URL (`.../zones/europe-west1-b` → `europe-west1-b`).
#[must_use]
pub fn short_name(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

/// Fill the instance user into a startup script template.
#[must_use]
pub fn render_startup_script(template: &str, instance_user: &str) -> String {
    template.replace(INSTANCE_USER_PLACEHOLDER, instance_user)
}

/// VS Code remote URI for the instance's SSH host alias.
///
/// `gcloud compute config-ssh` registers hosts as `<instance>.<zone>.<project>`.
#[must_use]
pub fn vscode_remote_uri(instance: &str, zone: &str, project: &str, path: &str) -> String {
    let path = if path.starts_with('/') {
        path.to_owned()
    } else {
        format!("/{path}")
    };
    format!("vscode-remote://ssh-remote+{instance}.{zone}.{project}{path}")
}
