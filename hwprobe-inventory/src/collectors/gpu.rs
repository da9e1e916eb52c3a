//! GPU inventory collection.
//!
//! One instance per detected adapter. Windows zips WMI columns; macOS
//! aligns `system_profiler` chipset/VRAM matches; Linux scans `lspci -v`
//! block-wise for display controllers rather than row-oriented key/value
//! output.

use super::{apply, fetch, set_inst_first};
use crate::extract;
use crate::field::{Domain, DomainRecord, FieldValue, InstanceRecord};
use crate::platform::PlatformKind;
use crate::units;

pub const FIELDS: &[&str] = &["adapter_count"];

pub const ADAPTER_FIELDS: &[&str] = &[
    "name",
    "memory_gb",
    "driver_version",
    "driver_date",
    "status",
    "video_processor",
    "dac_type",
    "max_refresh_rate",
    "min_refresh_rate",
    "installed_drivers",
    "video_mode",
    "revision",
];

pub async fn collect(platform: PlatformKind) -> DomainRecord {
    let mut record = DomainRecord::new(Domain::Gpu, FIELDS);
    let (label, parse): (&'static str, fn(&mut DomainRecord, &str)) = match platform {
        PlatformKind::Windows => ("gpu-wmi", parse_wmic_gpus),
        PlatformKind::MacOs => ("gpu-profiler", parse_system_profiler),
        PlatformKind::Linux => ("gpu-lspci", parse_lspci),
        PlatformKind::Other => return record,
    };
    apply(
        &mut record,
        &["adapter_count"],
        fetch(Domain::Gpu, platform, label).await,
        parse,
    );
    record
}

fn parse_wmic_gpus(record: &mut DomainRecord, raw: &str) {
    let names = extract::all(raw, r"(?m)^Name=(.+)");
    let rams = extract::all(raw, r"(?m)^AdapterRAM=(.+)");
    let driver_versions = extract::all(raw, r"(?m)^DriverVersion=(.+)");
    let driver_dates = extract::all(raw, r"(?m)^DriverDate=(.+)");
    let statuses = extract::all(raw, r"(?m)^Status=(.+)");
    let processors = extract::all(raw, r"(?m)^VideoProcessor=(.+)");
    let dac_types = extract::all(raw, r"(?m)^AdapterDACType=(.+)");
    let max_refresh = extract::all(raw, r"(?m)^MaxRefreshRate=(.+)");
    let min_refresh = extract::all(raw, r"(?m)^MinRefreshRate=(.+)");
    let drivers = extract::all(raw, r"(?m)^InstalledDisplayDrivers=(.+)");
    let video_modes = extract::all(raw, r"(?m)^VideoModeDescription=(.+)");

    for i in 0..names.len() {
        let mut adapter = InstanceRecord::new(ADAPTER_FIELDS);
        adapter.set("name", FieldValue::Text(names[i].clone()));
        adapter.set("memory_gb", extract::nth_norm(&rams, i, units::bytes_to_gib));
        adapter.set("driver_version", extract::nth(&driver_versions, i));
        adapter.set("driver_date", extract::nth(&driver_dates, i));
        adapter.set("status", extract::nth(&statuses, i));
        adapter.set("video_processor", extract::nth(&processors, i));
        adapter.set("dac_type", extract::nth(&dac_types, i));
        adapter.set("max_refresh_rate", extract::nth_norm(&max_refresh, i, units::to_int));
        adapter.set("min_refresh_rate", extract::nth_norm(&min_refresh, i, units::to_int));
        adapter.set("installed_drivers", extract::nth(&drivers, i));
        adapter.set("video_mode", extract::nth(&video_modes, i));
        record.push_instance(adapter);
    }
    record.set("adapter_count", FieldValue::Integer(record.instances().len() as i64));
}

fn parse_system_profiler(record: &mut DomainRecord, raw: &str) {
    let chipsets = extract::all(raw, r"Chipset Model:\s*(.+)");
    let vrams = extract::all(raw, r"VRAM \([^)]*\):\s*(.+)");

    for i in 0..chipsets.len() {
        let mut adapter = InstanceRecord::new(ADAPTER_FIELDS);
        adapter.set("name", FieldValue::Text(chipsets[i].clone()));
        adapter.set("memory_gb", extract::nth_norm(&vrams, i, units::capacity_to_gib));
        record.push_instance(adapter);
    }
    record.set("adapter_count", FieldValue::Integer(record.instances().len() as i64));
}

/// `lspci -v` groups one device per blank-line-separated block; display
/// adapters are the VGA/3D/Display controller classes.
fn parse_lspci(record: &mut DomainRecord, raw: &str) {
    for block in raw.split("\n\n") {
        let Some(name) = extract::first(
            block,
            r"(?:VGA compatible controller|3D controller|Display controller):\s*(.+)",
        ) else {
            continue;
        };

        let mut adapter = InstanceRecord::new(ADAPTER_FIELDS);
        // the class prefix match includes the revision suffix; strip it
        let trimmed = match name.split_once(" (rev ") {
            Some((bare, _)) => bare.to_string(),
            None => name.clone(),
        };
        adapter.set("name", FieldValue::Text(trimmed));
        set_inst_first(&mut adapter, "revision", block, r"\(rev ([0-9a-f]+)\)", units::to_text);
        set_inst_first(
            &mut adapter,
            "driver_version",
            block,
            r"Kernel driver in use:\s*(.+)",
            units::to_text,
        );
        set_inst_first(
            &mut adapter,
            "memory_gb",
            block,
            r"Memory at \S+ \([^)]*, prefetchable\) \[size=(\d+[KMG])\]",
            units::capacity_to_gib,
        );
        record.push_instance(adapter);
    }
    record.set("adapter_count", FieldValue::Integer(record.instances().len() as i64));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wmic_adapters_zip() {
        let raw = "\
AdapterDACType=Integrated RAMDAC\r\n\
AdapterRAM=4294967296\r\n\
DriverVersion=31.0.15.3623\r\n\
MaxRefreshRate=240\r\n\
MinRefreshRate=24\r\n\
Name=NVIDIA GeForce GTX 1660\r\n\
Status=OK\r\n\
VideoModeDescription=2560 x 1440 x 4294967296 colors\r\n\
\r\n\
AdapterDACType=Internal\r\n\
AdapterRAM=1073741824\r\n\
DriverVersion=27.20.100.8587\r\n\
MaxRefreshRate=75\r\n\
MinRefreshRate=29\r\n\
Name=Intel(R) UHD Graphics 630\r\n\
Status=OK\r\n\
VideoModeDescription=1920 x 1080 x 4294967296 colors\r\n";
        let mut record = DomainRecord::new(Domain::Gpu, FIELDS);
        parse_wmic_gpus(&mut record, raw);

        assert_eq!(*record.get("adapter_count"), FieldValue::Integer(2));
        let adapters = record.instances();
        assert_eq!(*adapters[0].get("name"), FieldValue::Text("NVIDIA GeForce GTX 1660".into()));
        assert_eq!(*adapters[0].get("memory_gb"), FieldValue::Float(4.0));
        assert_eq!(*adapters[0].get("max_refresh_rate"), FieldValue::Integer(240));
        assert_eq!(*adapters[0].get("dac_type"), FieldValue::Text("Integrated RAMDAC".into()));
        assert_eq!(*adapters[1].get("memory_gb"), FieldValue::Float(1.0));
        assert_eq!(*adapters[1].get("min_refresh_rate"), FieldValue::Integer(29));
        assert_eq!(
            *adapters[1].get("video_mode"),
            FieldValue::Text("1920 x 1080 x 4294967296 colors".into())
        );
        assert_eq!(*adapters[1].get("driver_date"), FieldValue::Unknown);
        assert_eq!(*adapters[1].get("installed_drivers"), FieldValue::Unknown);
    }

    #[test]
    fn test_system_profiler_chipset_and_vram() {
        let raw = "\
Graphics/Displays:\n\
\n\
    Intel Iris Plus Graphics 655:\n\
\n\
      Chipset Model: Intel Iris Plus Graphics 655\n\
      Type: GPU\n\
      VRAM (Dynamic, Max): 1536 MB\n";
        let mut record = DomainRecord::new(Domain::Gpu, FIELDS);
        parse_system_profiler(&mut record, raw);

        assert_eq!(*record.get("adapter_count"), FieldValue::Integer(1));
        let adapter = &record.instances()[0];
        assert_eq!(*adapter.get("name"), FieldValue::Text("Intel Iris Plus Graphics 655".into()));
        assert_eq!(*adapter.get("memory_gb"), FieldValue::Float(1.5));
    }

    #[test]
    fn test_lspci_display_blocks_only() {
        let raw = "\
00:02.0 VGA compatible controller: Intel Corporation UHD Graphics 630 (rev 02) (prog-if 00 [VGA controller])\n\
\tSubsystem: Dell UHD Graphics 630\n\
\tMemory at eb000000 (64-bit, non-prefetchable) [size=16M]\n\
\tMemory at 80000000 (64-bit, prefetchable) [size=256M]\n\
\tKernel driver in use: i915\n\
\n\
00:1f.3 Audio device: Intel Corporation Cannon Lake PCH cAVS (rev 10)\n\
\tKernel driver in use: snd_hda_intel\n\
\n\
01:00.0 3D controller: NVIDIA Corporation GP107M [GeForce GTX 1050 Ti Mobile] (rev a1)\n\
\tMemory at c0000000 (64-bit, prefetchable) [size=256M]\n\
\tKernel driver in use: nvidia\n";
        let mut record = DomainRecord::new(Domain::Gpu, FIELDS);
        parse_lspci(&mut record, raw);

        assert_eq!(*record.get("adapter_count"), FieldValue::Integer(2));
        let adapters = record.instances();
        assert_eq!(
            *adapters[0].get("name"),
            FieldValue::Text("Intel Corporation UHD Graphics 630".into())
        );
        assert_eq!(*adapters[0].get("driver_version"), FieldValue::Text("i915".into()));
        // the 16M non-prefetchable register BAR comes first; VRAM is the
        // prefetchable 256M BAR
        assert_eq!(*adapters[0].get("memory_gb"), FieldValue::Float(0.25));
        assert_eq!(*adapters[0].get("revision"), FieldValue::Text("02".into()));
        assert_eq!(
            *adapters[1].get("name"),
            FieldValue::Text("NVIDIA Corporation GP107M [GeForce GTX 1050 Ti Mobile]".into())
        );
        // audio device block is skipped entirely
        assert!(adapters.iter().all(|a| *a.get("driver_version") != FieldValue::Text("snd_hda_intel".into())));
    }

    #[tokio::test]
    async fn test_schema_complete_on_other() {
        let record = collect(PlatformKind::Other).await;
        assert!(record.matches_schema(FIELDS));
        assert!(record.instances().is_empty());
    }
}
