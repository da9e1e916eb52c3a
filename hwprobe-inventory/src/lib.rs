//! Cross-platform hardware and software inventory collection.
//!
//! The collector probes the host through platform-native sources (WMI,
//! sysctl, procfs, dmidecode, system_profiler and friends), extracts
//! fields with per-source patterns, normalizes units into canonical GiB
//! and MHz scalars, and aggregates everything into one serializable
//! [`InventorySnapshot`]. A degraded or missing source never fails the
//! snapshot: affected fields carry `Error` or `Unknown` markers instead.

pub mod collectors;
pub mod error;
pub mod extract;
pub mod field;
pub mod platform;
pub mod source;
pub mod strategy;
pub mod units;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

pub use error::{CollectError, Result};
pub use field::{Domain, DomainRecord, FieldValue, InstanceRecord};
pub use platform::PlatformKind;
pub use source::{SourceKind, SourceQuery};

/// A complete inventory of the host at one point in time.
#[derive(Debug, Clone, Serialize)]
pub struct InventorySnapshot {
    pub platform: PlatformKind,
    pub collected_at: DateTime<Utc>,
    pub os: DomainRecord,
    pub cpu: DomainRecord,
    pub memory: DomainRecord,
    pub disk: DomainRecord,
    pub network: DomainRecord,
    pub gpu: DomainRecord,
    pub motherboard: DomainRecord,
}

/// Collects full inventory snapshots for one platform.
pub struct InventoryCollector {
    platform: PlatformKind,
}

impl InventoryCollector {
    /// Collector for the detected host platform.
    pub fn new() -> Self {
        let platform = PlatformKind::detect();
        debug!(%platform, "detected host platform");
        Self { platform }
    }

    /// Collector pinned to a specific platform. Useful for exercising the
    /// strategy table without that platform's tooling.
    pub fn with_platform(platform: PlatformKind) -> Self {
        Self { platform }
    }

    pub fn platform(&self) -> PlatformKind {
        self.platform
    }

    /// Collect all domains concurrently. Always returns a snapshot;
    /// degraded domains report field-level `Error`/`Unknown` markers.
    pub async fn collect(&self) -> InventorySnapshot {
        let started = std::time::Instant::now();
        let platform = self.platform;

        let (os, cpu, memory, disk, network, gpu, motherboard) = tokio::join!(
            collectors::os::collect(platform),
            collectors::cpu::collect(platform),
            collectors::memory::collect(platform),
            collectors::disk::collect(platform),
            collectors::network::collect(platform),
            collectors::gpu::collect(platform),
            collectors::motherboard::collect(platform),
        );

        info!(
            %platform,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "inventory collected"
        );

        InventorySnapshot {
            platform,
            collected_at: Utc::now(),
            os,
            cpu,
            memory,
            disk,
            network,
            gpu,
            motherboard,
        }
    }
}

impl Default for InventoryCollector {
    fn default() -> Self {
        Self::new()
    }
}
