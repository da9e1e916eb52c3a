//! Operating system identity collection.

use sysinfo::System;

use crate::field::{Domain, DomainRecord, FieldValue};
use crate::platform::PlatformKind;

pub const FIELDS: &[&str] = &["system", "version", "kernel", "architecture", "hostname"];

/// Collect OS identity. Built entirely on platform introspection
/// primitives, so it succeeds on every platform including `Other`.
pub async fn collect(_platform: PlatformKind) -> DomainRecord {
    let mut record = DomainRecord::new(Domain::Os, FIELDS);

    record.set("system", text_or_unknown(System::name()));
    record.set("version", text_or_unknown(System::os_version()));
    record.set("kernel", text_or_unknown(System::kernel_version()));
    record.set(
        "architecture",
        FieldValue::Text(std::env::consts::ARCH.to_string()),
    );
    record.set("hostname", text_or_unknown(System::host_name()));

    record
}

fn text_or_unknown(value: Option<String>) -> FieldValue {
    match value {
        Some(text) if !text.is_empty() => FieldValue::Text(text),
        _ => FieldValue::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_schema_complete_and_architecture_known() {
        let record = collect(PlatformKind::detect()).await;
        assert!(record.matches_schema(FIELDS));
        assert!(record.get("architecture").is_known());
    }

    #[tokio::test]
    async fn test_succeeds_on_other_platform() {
        let record = collect(PlatformKind::Other).await;
        assert!(record.matches_schema(FIELDS));
    }
}
