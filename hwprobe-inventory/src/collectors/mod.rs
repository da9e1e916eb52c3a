//! Domain collectors.
//!
//! One collector per inventory domain. Each exposes
//! `collect(platform) -> DomainRecord` and never fails outright: a degraded
//! source marks only the fields it feeds as `Error`, siblings are still
//! populated.

pub mod cpu;
pub mod disk;
pub mod gpu;
pub mod memory;
pub mod motherboard;
pub mod network;
pub mod os;

use tracing::warn;

use crate::error::{CollectError, Result};
use crate::extract;
use crate::field::{Domain, DomainRecord, FieldValue, InstanceRecord};
use crate::platform::PlatformKind;
use crate::source;
use crate::strategy;

/// Run the labeled query from the strategy table. `None` means the table
/// has no such source for this platform, which callers treat as "no data",
/// not an error.
pub(crate) async fn fetch(
    domain: Domain,
    platform: PlatformKind,
    label: &'static str,
) -> Option<Result<String>> {
    let query = strategy::query(domain, platform, label)?;
    Some(source::invoke(&query).await)
}

/// Wire a source outcome into a record: parse on success, mark exactly the
/// fields fed by this source as `Error` on failure, leave them `Unknown`
/// when the platform has no such source.
pub(crate) fn apply(
    record: &mut DomainRecord,
    fields: &[&'static str],
    outcome: Option<Result<String>>,
    parse: impl FnOnce(&mut DomainRecord, &str),
) {
    match outcome {
        None => {}
        Some(Ok(raw)) => parse(record, &raw),
        Some(Err(err)) => {
            warn!(domain = %record.domain(), error = %err, "source degraded, marking fields");
            for field in fields {
                record.set(field, FieldValue::error(&err));
            }
        }
    }
}

/// Set a record field from the first match of `pattern`, normalized. No
/// match leaves the field `Unknown`.
pub(crate) fn set_first(
    record: &mut DomainRecord,
    field: &'static str,
    raw: &str,
    pattern: &str,
    normalize: fn(&str) -> FieldValue,
) {
    if let Some(value) = extract::first(raw, pattern) {
        record.set(field, normalize(&value));
    }
}

/// Instance-record flavor of [`set_first`].
pub(crate) fn set_inst_first(
    instance: &mut InstanceRecord,
    field: &'static str,
    raw: &str,
    pattern: &str,
    normalize: fn(&str) -> FieldValue,
) {
    if let Some(value) = extract::first(raw, pattern) {
        instance.set(field, normalize(&value));
    }
}

/// Mark the given fields of every instance with one error.
pub(crate) fn mark_instances(
    record: &mut DomainRecord,
    fields: &[&'static str],
    err: &CollectError,
) {
    for instance in record.instances_mut() {
        for field in fields {
            instance.set(field, FieldValue::error(err));
        }
    }
}
