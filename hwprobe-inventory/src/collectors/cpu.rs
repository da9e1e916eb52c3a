//! CPU inventory collection.
//!
//! Windows reads the processor name from the registry with the WMI `Name`
//! field as fallback; macOS walks sysctl keys one by one so a missing key
//! (Apple Silicon has no `hw.cpufrequency`) degrades only its own field;
//! Linux parses `/proc/cpuinfo` plus independent sysfs/procfs supplements.

use tracing::debug;

use super::{apply, fetch, set_first};
use crate::extract;
use crate::field::{Domain, DomainRecord, FieldValue};
use crate::platform::PlatformKind;
use crate::units;

pub const FIELDS: &[&str] = &[
    "model",
    "manufacturer",
    "family",
    "architecture",
    "socket",
    "cores",
    "threads",
    "current_clock_speed",
    "max_clock_speed",
    "l1d_cache_size",
    "l1i_cache_size",
    "l2_cache_size",
    "l3_cache_size",
    "cache_size",
    "context_switches",
    "total_interrupts",
];

const WMI_FIELDS: &[&str] = &[
    "model",
    "manufacturer",
    "family",
    "architecture",
    "socket",
    "cores",
    "threads",
    "current_clock_speed",
    "max_clock_speed",
    "l2_cache_size",
    "l3_cache_size",
];

pub async fn collect(platform: PlatformKind) -> DomainRecord {
    let mut record = DomainRecord::new(Domain::Cpu, FIELDS);
    match platform {
        PlatformKind::Windows => collect_windows(&mut record, platform).await,
        PlatformKind::MacOs => collect_macos(&mut record, platform).await,
        PlatformKind::Linux => collect_linux(&mut record, platform).await,
        PlatformKind::Other => {}
    }
    record
}

async fn collect_windows(record: &mut DomainRecord, platform: PlatformKind) {
    apply(
        record,
        WMI_FIELDS,
        fetch(Domain::Cpu, platform, "cpu-wmi").await,
        parse_wmic_cpu,
    );

    // Registry name is the preferred source; WMI `Name` stays in place as
    // the fallback when the registry lookup degrades.
    if let Some(outcome) = fetch(Domain::Cpu, platform, "cpu-name-registry").await {
        match outcome {
            Ok(raw) => {
                if let Some(name) = extract::first(&raw, r"ProcessorNameString\s+REG_SZ\s+(.+)") {
                    record.set("model", FieldValue::Text(name));
                }
            }
            Err(err) => {
                debug!(error = %err, "registry CPU name unavailable, keeping WMI name");
            }
        }
    }
}

fn parse_wmic_cpu(record: &mut DomainRecord, raw: &str) {
    set_first(record, "model", raw, r"(?m)^Name=(.+)", units::to_text);
    set_first(record, "manufacturer", raw, r"(?m)^Manufacturer=(.+)", units::to_text);
    set_first(record, "family", raw, r"(?m)^Family=(.+)", units::to_text);
    set_first(record, "architecture", raw, r"(?m)^DataWidth=(.+)", units::to_text);
    set_first(record, "socket", raw, r"(?m)^SocketDesignation=(.+)", units::to_text);
    set_first(record, "cores", raw, r"(?m)^NumberOfCores=(.+)", units::to_int);
    set_first(record, "threads", raw, r"(?m)^NumberOfLogicalProcessors=(.+)", units::to_int);
    set_first(record, "current_clock_speed", raw, r"(?m)^CurrentClockSpeed=(.+)", units::to_int);
    set_first(record, "max_clock_speed", raw, r"(?m)^MaxClockSpeed=(.+)", units::to_int);
    set_first(record, "l2_cache_size", raw, r"(?m)^L2CacheSize=(.+)", units::to_int);
    set_first(record, "l3_cache_size", raw, r"(?m)^L3CacheSize=(.+)", units::to_int);
}

async fn collect_macos(record: &mut DomainRecord, platform: PlatformKind) {
    record.set(
        "architecture",
        FieldValue::Text(std::env::consts::ARCH.to_string()),
    );

    let sysctl_fields: [(&'static str, &'static str, fn(&str) -> FieldValue); 8] = [
        ("model", "cpu-brand", units::to_text),
        ("current_clock_speed", "cpu-frequency", units::hz_to_mhz),
        ("cores", "cpu-cores", units::to_int),
        ("threads", "cpu-threads", units::to_int),
        ("l1d_cache_size", "cpu-l1d", units::to_int),
        ("l1i_cache_size", "cpu-l1i", units::to_int),
        ("l2_cache_size", "cpu-l2", units::to_int),
        ("l3_cache_size", "cpu-l3", units::to_int),
    ];

    for (field, label, normalize) in sysctl_fields {
        match fetch(Domain::Cpu, platform, label).await {
            None => {}
            Some(Ok(raw)) => record.set(field, normalize(raw.trim())),
            Some(Err(err)) => record.set(field, FieldValue::error(&err)),
        }
    }
}

async fn collect_linux(record: &mut DomainRecord, platform: PlatformKind) {
    record.set(
        "architecture",
        FieldValue::Text(std::env::consts::ARCH.to_string()),
    );
    if let Ok(parallelism) = std::thread::available_parallelism() {
        record.set("threads", FieldValue::Integer(parallelism.get() as i64));
    }

    apply(
        record,
        &["model", "manufacturer", "family", "cores", "current_clock_speed", "cache_size"],
        fetch(Domain::Cpu, platform, "cpu-cpuinfo").await,
        parse_proc_cpuinfo,
    );
    apply(
        record,
        &["max_clock_speed"],
        fetch(Domain::Cpu, platform, "cpu-max-freq").await,
        |record, raw| record.set("max_clock_speed", units::khz_to_mhz(raw.trim())),
    );
    apply(
        record,
        &["context_switches"],
        fetch(Domain::Cpu, platform, "cpu-stat").await,
        parse_proc_stat,
    );
    apply(
        record,
        &["total_interrupts"],
        fetch(Domain::Cpu, platform, "cpu-interrupts").await,
        |record, raw| {
            record.set(
                "total_interrupts",
                FieldValue::Integer(sum_interrupts(raw) as i64),
            );
        },
    );
}

fn parse_proc_cpuinfo(record: &mut DomainRecord, raw: &str) {
    set_first(record, "model", raw, r"(?m)^model name\s*:\s*(.+)", units::to_text);
    set_first(record, "manufacturer", raw, r"(?m)^vendor_id\s*:\s*(.+)", units::to_text);
    set_first(record, "family", raw, r"(?m)^cpu family\s*:\s*(.+)", units::to_text);
    set_first(record, "cores", raw, r"(?m)^cpu cores\s*:\s*(.+)", units::to_int);
    set_first(record, "current_clock_speed", raw, r"(?m)^cpu MHz\s*:\s*(.+)", units::to_float);
    set_first(record, "cache_size", raw, r"(?m)^cache size\s*:\s*(.+)", units::to_text);
}

fn parse_proc_stat(record: &mut DomainRecord, raw: &str) {
    set_first(record, "context_switches", raw, r"(?m)^ctxt\s+(\d+)", units::to_int);
}

/// Total interrupts since boot: sum of every numeric token of the
/// non-header rows, malformed tokens ignored.
fn sum_interrupts(raw: &str) -> u64 {
    raw.lines()
        .filter(|line| !line.trim_start().starts_with("CPU"))
        .map(|line| {
            line.split_whitespace()
                .skip(1)
                .filter_map(|token| token.parse::<u64>().ok())
                .sum::<u64>()
        })
        .sum()
}
