//! Memory inventory collection.
//!
//! Per-module detail exists where the platform exposes it (WMI on Windows,
//! dmidecode on Linux with privilege); macOS carries an explicit
//! unavailability marker instead. Swap/virtual-memory counters are
//! platform specific: meminfo swap on Linux, pagefile aggregates on
//! Windows, vm_stat page counters on macOS.

use super::{apply, fetch, set_first, set_inst_first};
use crate::error::CollectError;
use crate::extract;
use crate::field::{Domain, DomainRecord, FieldValue, InstanceRecord};
use crate::platform::PlatformKind;
use crate::units::{self, round2, BYTES_PER_GIB};

pub const FIELDS: &[&str] = &[
    "total_gb",
    "free_gb",
    "swap_total_gb",
    "swap_free_gb",
    "vm_free_gb",
    "vm_active_gb",
    "vm_inactive_gb",
    "vm_wired_gb",
    "module_count",
];

pub const MODULE_FIELDS: &[&str] = &[
    "capacity_gb",
    "speed_mhz",
    "configured_speed_mhz",
    "manufacturer",
    "part_number",
    "serial_number",
    "form_factor",
    "memory_type",
    "locator",
];

const VM_FIELDS: &[&str] = &["vm_free_gb", "vm_active_gb", "vm_inactive_gb", "vm_wired_gb"];

pub async fn collect(platform: PlatformKind) -> DomainRecord {
    let mut record = DomainRecord::new(Domain::Memory, FIELDS);
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
        &["total_gb"],
        fetch(Domain::Memory, platform, "memory-total").await,
        |record, raw| {
            set_first(record, "total_gb", raw, r"(?m)^TotalPhysicalMemory=(.+)", units::bytes_to_gib);
        },
    );
    apply(
        record,
        &["module_count"],
        fetch(Domain::Memory, platform, "memory-modules").await,
        parse_wmic_modules,
    );
    apply(
        record,
        &["swap_total_gb", "swap_free_gb"],
        fetch(Domain::Memory, platform, "memory-pagefiles").await,
        parse_wmic_pagefiles,
    );
}

fn parse_wmic_modules(record: &mut DomainRecord, raw: &str) {
    let capacities = extract::all(raw, r"(?m)^Capacity=(.+)");
    let speeds = extract::all(raw, r"(?m)^Speed=(.+)");
    let configured = extract::all(raw, r"(?m)^ConfiguredClockSpeed=(.+)");
    let manufacturers = extract::all(raw, r"(?m)^Manufacturer=(.+)");
    let part_numbers = extract::all(raw, r"(?m)^PartNumber=(.+)");
    let serial_numbers = extract::all(raw, r"(?m)^SerialNumber=(.+)");
    let form_factors = extract::all(raw, r"(?m)^FormFactor=(.+)");
    let memory_types = extract::all(raw, r"(?m)^MemoryType=(.+)");

    for i in 0..capacities.len() {
        let mut module = InstanceRecord::new(MODULE_FIELDS);
        module.set("capacity_gb", units::bytes_to_gib(&capacities[i]));
        module.set("speed_mhz", extract::nth_norm(&speeds, i, units::to_int));
        module.set("configured_speed_mhz", extract::nth_norm(&configured, i, units::to_int));
        module.set("manufacturer", extract::nth(&manufacturers, i));
        module.set("part_number", extract::nth(&part_numbers, i));
        module.set("serial_number", extract::nth(&serial_numbers, i));
        module.set("form_factor", extract::nth(&form_factors, i));
        module.set("memory_type", extract::nth(&memory_types, i));
        record.push_instance(module);
    }
    record.set("module_count", FieldValue::Integer(record.instances().len() as i64));
}

/// Pagefile counters are reported per file in MB; the record carries the
/// aggregate as the platform's swap numbers.
fn parse_wmic_pagefiles(record: &mut DomainRecord, raw: &str) {
    let allocated: f64 = extract::all(raw, r"(?m)^AllocatedBaseSize=(.+)")
        .iter()
        .filter_map(|value| value.parse::<f64>().ok())
        .sum();
    let used: f64 = extract::all(raw, r"(?m)^CurrentUsage=(.+)")
        .iter()
        .filter_map(|value| value.parse::<f64>().ok())
        .sum();

    if allocated > 0.0 {
        record.set("swap_total_gb", FieldValue::Float(round2(allocated / 1024.0)));
        record.set(
            "swap_free_gb",
            FieldValue::Float(round2((allocated - used) / 1024.0)),
        );
    }
}

async fn collect_macos(record: &mut DomainRecord, platform: PlatformKind) {
    apply(
        record,
        &["total_gb"],
        fetch(Domain::Memory, platform, "memory-total").await,
        |record, raw| record.set("total_gb", units::bytes_to_gib(raw.trim())),
    );

    // The platform exposes no per-DIMM detail without third-party tools.
    record.set(
        "module_count",
        FieldValue::Text("per-module detail not exposed by the platform".into()),
    );

    let pagesize = fetch(Domain::Memory, platform, "memory-pagesize").await;
    let vmstat = fetch(Domain::Memory, platform, "memory-vmstat").await;
    match (pagesize, vmstat) {
        (Some(Ok(pagesize)), Some(Ok(vmstat))) => match pagesize.trim().parse::<f64>() {
            Ok(page_bytes) => parse_vm_stat(record, &vmstat, page_bytes),
            Err(_) => {
                let err = CollectError::UnitConversion {
                    raw: pagesize.trim().to_string(),
                    unit: "bytes",
                };
                for field in VM_FIELDS {
                    record.set(field, FieldValue::error(&err));
                }
            }
        },
        (Some(Err(err)), _) | (_, Some(Err(err))) => {
            for field in VM_FIELDS {
                record.set(field, FieldValue::error(&err));
            }
        }
        _ => {}
    }
}

fn parse_vm_stat(record: &mut DomainRecord, raw: &str, page_bytes: f64) {
    let counters: [(&'static str, &str); 4] = [
        ("vm_free_gb", r"Pages free:\s*(\d+)\."),
        ("vm_active_gb", r"Pages active:\s*(\d+)\."),
        ("vm_inactive_gb", r"Pages inactive:\s*(\d+)\."),
        ("vm_wired_gb", r"Pages wired down:\s*(\d+)\."),
    ];
    for (field, pattern) in counters {
        if let Some(pages) = extract::first(raw, pattern) {
            if let Ok(pages) = pages.parse::<f64>() {
                record.set(
                    field,
                    FieldValue::Float(round2(pages * page_bytes / BYTES_PER_GIB)),
                );
            }
        }
    }
}

async fn collect_linux(record: &mut DomainRecord, platform: PlatformKind) {
    apply(
        record,
        &["total_gb", "free_gb", "swap_total_gb", "swap_free_gb"],
        fetch(Domain::Memory, platform, "memory-meminfo").await,
        parse_meminfo,
    );
    apply(
        record,
        &["module_count"],
        fetch(Domain::Memory, platform, "memory-dmidecode").await,
        parse_dmidecode_memory,
    );
}

fn parse_meminfo(record: &mut DomainRecord, raw: &str) {
    set_first(record, "total_gb", raw, r"(?m)^MemTotal:\s*(\d+) kB", units::kib_to_gib);
    set_first(record, "free_gb", raw, r"(?m)^MemFree:\s*(\d+) kB", units::kib_to_gib);
    set_first(record, "swap_total_gb", raw, r"(?m)^SwapTotal:\s*(\d+) kB", units::kib_to_gib);
    set_first(record, "swap_free_gb", raw, r"(?m)^SwapFree:\s*(\d+) kB", units::kib_to_gib);
}

fn parse_dmidecode_memory(record: &mut DomainRecord, raw: &str) {
    for block in raw.split("Memory Device").skip(1) {
        let mut module = InstanceRecord::new(MODULE_FIELDS);
        set_inst_first(&mut module, "capacity_gb", block, r"(?m)^\s*Size:\s*(.+)", units::capacity_to_gib);
        set_inst_first(&mut module, "speed_mhz", block, r"(?m)^\s*Speed:\s*(.+)", units::to_int);
        set_inst_first(
            &mut module,
            "configured_speed_mhz",
            block,
            r"(?m)^\s*Configured (?:Clock|Memory) Speed:\s*(.+)",
            units::to_int,
        );
        set_inst_first(&mut module, "manufacturer", block, r"(?m)^\s*Manufacturer:\s*(.+)", units::to_text);
        set_inst_first(&mut module, "part_number", block, r"(?m)^\s*Part Number:\s*(.+)", units::to_text);
        set_inst_first(&mut module, "serial_number", block, r"(?m)^\s*Serial Number:\s*(.+)", units::to_text);
        set_inst_first(&mut module, "form_factor", block, r"(?m)^\s*Form Factor:\s*(.+)", units::to_text);
        set_inst_first(&mut module, "locator", block, r"(?m)^\s*Locator:\s*(.+)", units::to_text);
        record.push_instance(module);
    }
    record.set("module_count", FieldValue::Integer(record.instances().len() as i64));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wmic_modules_zip_by_index() {
        let raw = "\
Capacity=8589934592\r\n\
ConfiguredClockSpeed=2133\r\n\
Manufacturer=Samsung\r\n\
Speed=2400\r\n\
\r\n\
Capacity=8589934592\r\n\
ConfiguredClockSpeed=2133\r\n\
Manufacturer=Hynix\r\n\
Speed=2400\r\n";
        let mut record = DomainRecord::new(Domain::Memory, FIELDS);
        parse_wmic_modules(&mut record, raw);

        assert_eq!(*record.get("module_count"), FieldValue::Integer(2));
        let modules = record.instances();
        assert_eq!(*modules[0].get("capacity_gb"), FieldValue::Float(8.0));
        assert_eq!(*modules[0].get("manufacturer"), FieldValue::Text("Samsung".into()));
        assert_eq!(*modules[1].get("manufacturer"), FieldValue::Text("Hynix".into()));
        // Speed= must not match the ConfiguredClockSpeed= lines
        assert_eq!(*modules[0].get("speed_mhz"), FieldValue::Integer(2400));
        assert_eq!(*modules[0].get("configured_speed_mhz"), FieldValue::Integer(2133));
        // column absent entirely -> Unknown, alignment intact
        assert_eq!(*modules[1].get("serial_number"), FieldValue::Unknown);
    }

    #[test]
    fn test_pagefile_aggregation() {
        let raw = "AllocatedBaseSize=4096\r\nCurrentUsage=1024\r\nName=C:\\pagefile.sys\r\n";
        let mut record = DomainRecord::new(Domain::Memory, FIELDS);
        parse_wmic_pagefiles(&mut record, raw);
        assert_eq!(*record.get("swap_total_gb"), FieldValue::Float(4.0));
        assert_eq!(*record.get("swap_free_gb"), FieldValue::Float(3.0));
    }

    #[test]
    fn test_meminfo_counters() {
        let raw = "\
MemTotal:       16315292 kB\n\
MemFree:         8157646 kB\n\
SwapTotal:       2097148 kB\n\
SwapFree:        2097148 kB\n";
        let mut record = DomainRecord::new(Domain::Memory, FIELDS);
        parse_meminfo(&mut record, raw);
        assert_eq!(*record.get("total_gb"), FieldValue::Float(15.56));
        assert_eq!(*record.get("swap_total_gb"), FieldValue::Float(2.0));
    }

    #[test]
    fn test_dmidecode_mixed_units() {
        let raw = "\
Memory Device\n\
\tSize: 512 MB\n\
\tForm Factor: DIMM\n\
\tLocator: DIMM_A1\n\
\tManufacturer: Kingston\n\
\tSpeed: 2400 MT/s\n\
Memory Device\n\
\tSize: 16 GB\n\
\tForm Factor: SODIMM\n\
\tLocator: DIMM_B1\n\
\tManufacturer: Crucial\n";
        let mut record = DomainRecord::new(Domain::Memory, FIELDS);
        parse_dmidecode_memory(&mut record, raw);

        assert_eq!(*record.get("module_count"), FieldValue::Integer(2));
        let modules = record.instances();
        assert_eq!(*modules[0].get("capacity_gb"), FieldValue::Float(0.5));
        assert_eq!(*modules[1].get("capacity_gb"), FieldValue::Float(16.0));
        // "2400 MT/s" fails integer parse and stays an unparsed literal
        assert_eq!(*modules[0].get("speed_mhz"), FieldValue::Text("2400 MT/s".into()));
        assert_eq!(*modules[1].get("locator"), FieldValue::Text("DIMM_B1".into()));
    }

    #[test]
    fn test_vm_stat_pages() {
        let raw = "\
Mach Virtual Memory Statistics: (page size of 4096 bytes)\n\
Pages free:                              262144.\n\
Pages active:                            524288.\n\
Pages inactive:                          131072.\n\
Pages wired down:                         65536.\n";
        let mut record = DomainRecord::new(Domain::Memory, FIELDS);
        parse_vm_stat(&mut record, raw, 4096.0);
        assert_eq!(*record.get("vm_free_gb"), FieldValue::Float(1.0));
        assert_eq!(*record.get("vm_active_gb"), FieldValue::Float(2.0));
        assert_eq!(*record.get("vm_wired_gb"), FieldValue::Float(0.25));
    }

    #[tokio::test]
    async fn test_schema_complete_on_every_platform() {
        for platform in [
            PlatformKind::Windows,
            PlatformKind::MacOs,
            PlatformKind::Linux,
            PlatformKind::Other,
        ] {
            let record = collect(platform).await;
            assert!(record.matches_schema(FIELDS), "schema broken on {platform}");
        }
    }
}
