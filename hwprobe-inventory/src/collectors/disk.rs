//! Disk inventory collection.
//!
//! Windows enumerates physical drives with geometry and (privilege
//! permitting) health status via WMI; POSIX platforms enumerate mounted
//! filesystems from `df -h`, with an optional per-device serial lookup on
//! Linux that usually needs elevated privilege.

use super::{apply, fetch, mark_instances};
use crate::extract;
use crate::field::{Domain, DomainRecord, FieldValue, InstanceRecord};
use crate::platform::PlatformKind;
use crate::source;
use crate::strategy;
use crate::units;

pub const FIELDS: &[&str] = &["drive_count"];

pub const DRIVE_FIELDS: &[&str] = &[
    "name",
    "size_gb",
    "interface",
    "media_type",
    "model",
    "serial_number",
    "partitions",
    "index",
    "firmware_revision",
    "bytes_per_sector",
    "sectors_per_track",
    "total_cylinders",
    "total_sectors",
    "total_tracks",
    "status",
    "availability",
    "error_description",
    "mount_point",
];

const HEALTH_FIELDS: &[&str] = &["status", "availability", "error_description"];

pub async fn collect(platform: PlatformKind) -> DomainRecord {
    let mut record = DomainRecord::new(Domain::Disk, FIELDS);
    match platform {
        PlatformKind::Windows => collect_windows(&mut record, platform).await,
        PlatformKind::MacOs | PlatformKind::Linux => collect_posix(&mut record, platform).await,
        PlatformKind::Other => {}
    }
    record
}

async fn collect_windows(record: &mut DomainRecord, platform: PlatformKind) {
    apply(
        record,
        &["drive_count"],
        fetch(Domain::Disk, platform, "disk-wmi").await,
        parse_wmic_drives,
    );

    // Health detail is a separate, usually privileged query; its failure
    // touches only the health fields of each drive.
    match fetch(Domain::Disk, platform, "disk-health").await {
        None => {}
        Some(Ok(raw)) => parse_wmic_health(record, &raw),
        Some(Err(err)) => mark_instances(record, HEALTH_FIELDS, &err),
    }
}

fn parse_wmic_drives(record: &mut DomainRecord, raw: &str) {
    let captions = extract::all(raw, r"(?m)^Caption=(.+)");
    let sizes = extract::all(raw, r"(?m)^Size=(.+)");
    let interfaces = extract::all(raw, r"(?m)^InterfaceType=(.+)");
    let media_types = extract::all(raw, r"(?m)^MediaType=(.+)");
    let models = extract::all(raw, r"(?m)^Model=(.+)");
    let serials = extract::all(raw, r"(?m)^SerialNumber=(.+)");
    let partitions = extract::all(raw, r"(?m)^Partitions=(.+)");
    let indices = extract::all(raw, r"(?m)^Index=(.+)");
    let firmware = extract::all(raw, r"(?m)^FirmwareRevision=(.+)");
    let bytes_per_sector = extract::all(raw, r"(?m)^BytesPerSector=(.+)");
    let sectors_per_track = extract::all(raw, r"(?m)^SectorsPerTrack=(.+)");
    let cylinders = extract::all(raw, r"(?m)^TotalCylinders=(.+)");
    let sectors = extract::all(raw, r"(?m)^TotalSectors=(.+)");
    let tracks = extract::all(raw, r"(?m)^TotalTracks=(.+)");

    for i in 0..captions.len() {
        let mut drive = InstanceRecord::new(DRIVE_FIELDS);
        drive.set("name", FieldValue::Text(captions[i].clone()));
        drive.set("size_gb", extract::nth_norm(&sizes, i, units::bytes_to_gib));
        drive.set("interface", extract::nth(&interfaces, i));
        drive.set("media_type", extract::nth(&media_types, i));
        drive.set("model", extract::nth(&models, i));
        drive.set("serial_number", extract::nth(&serials, i));
        drive.set("partitions", extract::nth_norm(&partitions, i, units::to_int));
        drive.set("index", extract::nth_norm(&indices, i, units::to_int));
        drive.set("firmware_revision", extract::nth(&firmware, i));
        drive.set("bytes_per_sector", extract::nth_norm(&bytes_per_sector, i, units::to_int));
        drive.set("sectors_per_track", extract::nth_norm(&sectors_per_track, i, units::to_int));
        drive.set("total_cylinders", extract::nth_norm(&cylinders, i, units::to_int));
        drive.set("total_sectors", extract::nth_norm(&sectors, i, units::to_int));
        drive.set("total_tracks", extract::nth_norm(&tracks, i, units::to_int));
        record.push_instance(drive);
    }
    record.set("drive_count", FieldValue::Integer(record.instances().len() as i64));
}

fn parse_wmic_health(record: &mut DomainRecord, raw: &str) {
    let statuses = extract::all(raw, r"(?m)^Status=(.+)");
    let availabilities = extract::all(raw, r"(?m)^Availability=(.+)");
    let errors = extract::all(raw, r"(?m)^ErrorDescription=(.+)");

    for (i, drive) in record.instances_mut().iter_mut().enumerate() {
        drive.set("status", extract::nth(&statuses, i));
        drive.set("availability", extract::nth(&availabilities, i));
        drive.set("error_description", extract::nth(&errors, i));
    }
}

async fn collect_posix(record: &mut DomainRecord, platform: PlatformKind) {
    apply(
        record,
        &["drive_count"],
        fetch(Domain::Disk, platform, "disk-df").await,
        parse_df,
    );

    if platform == PlatformKind::Linux {
        attach_serials(record).await;
    }
}

fn parse_df(record: &mut DomainRecord, raw: &str) {
    for line in raw.lines().skip(1) {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 6 {
            continue;
        }
        let mut filesystem = InstanceRecord::new(DRIVE_FIELDS);
        filesystem.set("name", FieldValue::Text(parts[0].to_string()));
        filesystem.set("size_gb", units::capacity_to_gib(parts[1]));
        filesystem.set("mount_point", FieldValue::Text(parts[5].to_string()));
        record.push_instance(filesystem);
    }
    record.set("drive_count", FieldValue::Integer(record.instances().len() as i64));
}

/// Serial numbers come from udevadm per device node and usually need
/// elevated privilege; every lookup degrades independently.
async fn attach_serials(record: &mut DomainRecord) {
    let devices: Vec<(usize, String)> = record
        .instances()
        .iter()
        .enumerate()
        .filter_map(|(i, filesystem)| match filesystem.get("name") {
            FieldValue::Text(name) if name.starts_with("/dev/") => Some((i, name.clone())),
            _ => None,
        })
        .collect();

    for (i, device) in devices {
        let query = strategy::disk_serial_query(&device);
        let serial = match source::invoke(&query).await {
            Ok(raw) => extract::first(&raw, r"ID_SERIAL=(.+)")
                .map(FieldValue::Text)
                .unwrap_or(FieldValue::Unknown),
            Err(err) => FieldValue::error(&err),
        };
        if let Some(filesystem) = record.instances_mut().get_mut(i) {
            filesystem.set("serial_number", serial);
        }
    }
}
