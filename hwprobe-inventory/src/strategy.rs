//! Platform strategy selection.
//!
//! A pure lookup table from (domain, platform) to the ordered source
//! queries a collector runs. No I/O happens here; collectors feed the
//! returned descriptors to [`crate::source::invoke`]. An empty sequence
//! means the combination has no sources, which collectors treat as "no
//! data available", not an error.

use crate::field::Domain;
use crate::platform::PlatformKind;
use crate::source::SourceQuery;

/// Ordered source queries for one (domain, platform) pair.
pub fn queries(domain: Domain, platform: PlatformKind) -> Vec<SourceQuery> {
    use Domain as D;
    use PlatformKind as P;

    match (domain, platform) {
        // OS identity comes from platform introspection primitives, no
        // external process involved.
        (D::Os, _) => Vec::new(),

        (D::Cpu, P::Windows) => vec![
            SourceQuery::command(
                "cpu-name-registry",
                "reg",
                &[
                    "query",
                    r"HKLM\HARDWARE\DESCRIPTION\System\CentralProcessor\0",
                    "/v",
                    "ProcessorNameString",
                ],
            ),
            SourceQuery::command(
                "cpu-wmi",
                "wmic",
                &[
                    "cpu",
                    "get",
                    "CurrentClockSpeed,L2CacheSize,L3CacheSize,MaxClockSpeed,DataWidth,\
                     NumberOfCores,NumberOfLogicalProcessors,SocketDesignation,\
                     Manufacturer,Family,Name",
                    "/Value",
                ],
            ),
        ],
        (D::Cpu, P::MacOs) => vec![
            sysctl("cpu-brand", "machdep.cpu.brand_string"),
            sysctl("cpu-frequency", "hw.cpufrequency"),
            sysctl("cpu-cores", "hw.ncpu"),
            sysctl("cpu-threads", "hw.logicalcpu"),
            sysctl("cpu-l1d", "hw.l1dcachesize"),
            sysctl("cpu-l1i", "hw.l1icachesize"),
            sysctl("cpu-l2", "hw.l2cachesize"),
            sysctl("cpu-l3", "hw.l3cachesize"),
        ],
        // /proc/cpuinfo is the primary source; the sysfs and /proc
        // supplements below are independent of its success.
        (D::Cpu, P::Linux) => vec![
            SourceQuery::pseudo_file("cpu-cpuinfo", "/proc/cpuinfo"),
            SourceQuery::pseudo_file(
                "cpu-max-freq",
                "/sys/devices/system/cpu/cpu0/cpufreq/cpuinfo_max_freq",
            ),
            SourceQuery::pseudo_file("cpu-stat", "/proc/stat"),
            SourceQuery::pseudo_file("cpu-interrupts", "/proc/interrupts"),
        ],

        (D::Memory, P::Windows) => vec![
            SourceQuery::command(
                "memory-total",
                "wmic",
                &["computersystem", "get", "TotalPhysicalMemory", "/Value"],
            ),
            SourceQuery::command(
                "memory-modules",
                "wmic",
                &[
                    "memorychip",
                    "get",
                    "Capacity,Speed,Manufacturer,PartNumber,SerialNumber,FormFactor,\
                     MemoryType,ConfiguredClockSpeed",
                    "/Value",
                ],
            ),
            SourceQuery::command(
                "memory-pagefiles",
                "wmic",
                &["pagefile", "get", "AllocatedBaseSize,CurrentUsage,Name", "/Value"],
            ),
        ],
        (D::Memory, P::MacOs) => vec![
            sysctl("memory-total", "hw.memsize"),
            SourceQuery::command("memory-vmstat", "vm_stat", &[]),
            SourceQuery::command("memory-pagesize", "pagesize", &[]),
        ],
        (D::Memory, P::Linux) => vec![
            SourceQuery::pseudo_file("memory-meminfo", "/proc/meminfo"),
            // Requires elevated privilege; denial degrades to an Error field.
            SourceQuery::command("memory-dmidecode", "dmidecode", &["-t", "memory"]),
        ],

        (D::Disk, P::Windows) => vec![
            SourceQuery::command(
                "disk-wmi",
                "wmic",
                &[
                    "diskdrive",
                    "get",
                    "Caption,Size,InterfaceType,MediaType,Model,SerialNumber,Partitions,\
                     Index,FirmwareRevision,BytesPerSector,SectorsPerTrack,TotalCylinders,\
                     TotalSectors,TotalTracks",
                    "/Value",
                ],
            ),
            // Health detail needs admin rights on most systems.
            SourceQuery::command(
                "disk-health",
                "wmic",
                &["diskdrive", "get", "Status,Availability,ErrorDescription", "/Value"],
            ),
        ],
        (D::Disk, P::MacOs) | (D::Disk, P::Linux) => vec![
            SourceQuery::command("disk-df", "df", &["-h"]),
        ],

        (D::Network, P::Windows) => vec![
            SourceQuery::command("net-ipconfig", "ipconfig", &["/all"]),
        ],
        (D::Network, P::MacOs) | (D::Network, P::Linux) => vec![
            SourceQuery::command("net-fqdn", "hostname", &["-f"]),
            SourceQuery::command("net-route-probe", "ip", &["route", "get", "1"]),
            SourceQuery::command("net-addr", "ip", &["addr", "show"]),
            SourceQuery::command("net-dns", "resolvectl", &["status"]),
            SourceQuery::command("net-routes", "ip", &["route"]),
            SourceQuery::command("net-interfaces", "ip", &["-o", "-4", "a", "show"]),
        ],

        (D::Gpu, P::Windows) => vec![
            SourceQuery::command(
                "gpu-wmi",
                "wmic",
                &[
                    "path",
                    "win32_VideoController",
                    "get",
                    "Name,AdapterRAM,DriverVersion,DriverDate,Status,VideoProcessor,\
                     AdapterDACType,MaxRefreshRate,MinRefreshRate,InstalledDisplayDrivers,\
                     VideoModeDescription",
                    "/Value",
                ],
            ),
        ],
        (D::Gpu, P::MacOs) => vec![
            SourceQuery::command("gpu-profiler", "system_profiler", &["SPDisplaysDataType"]),
        ],
        (D::Gpu, P::Linux) => vec![
            SourceQuery::command("gpu-lspci", "lspci", &["-v"]),
        ],

        (D::Motherboard, P::Windows) => vec![
            SourceQuery::command(
                "board-wmi",
                "wmic",
                &[
                    "baseboard",
                    "get",
                    "Manufacturer,Product,SerialNumber,Version,HostingBoard,PoweredOn,\
                     Removable,Replaceable",
                    "/Value",
                ],
            ),
        ],
        (D::Motherboard, P::MacOs) => vec![
            SourceQuery::command("board-profiler", "system_profiler", &["SPHardwareDataType"]),
            SourceQuery::command("board-boot-volume", "diskutil", &["info", "/"]),
        ],
        (D::Motherboard, P::Linux) => vec![
            // Requires elevated privilege; denial degrades to Error fields.
            SourceQuery::command("board-dmidecode", "dmidecode", &["-t", "baseboard"]),
        ],

        (_, P::Other) => Vec::new(),
    }
}

/// Look up a single query by label.
pub fn query(domain: Domain, platform: PlatformKind, label: &str) -> Option<SourceQuery> {
    queries(domain, platform).into_iter().find(|q| q.label == label)
}

/// Per-device serial lookup on Linux; typically needs elevated privilege.
pub fn disk_serial_query(device: &str) -> SourceQuery {
    SourceQuery::command("disk-serial", "udevadm", &["info", "--name", device])
}

fn sysctl(label: &'static str, key: &'static str) -> SourceQuery {
    SourceQuery::command(label, "sysctl", &["-n", key])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceKind;

    #[test]
    fn test_unsupported_pairs_are_empty() {
        for domain in Domain::ALL {
            assert!(queries(domain, PlatformKind::Other).is_empty());
        }
        for platform in [PlatformKind::Windows, PlatformKind::MacOs, PlatformKind::Linux] {
            assert!(queries(Domain::Os, platform).is_empty());
        }
    }

    #[test]
    fn test_linux_cpu_chain_order() {
        let chain = queries(Domain::Cpu, PlatformKind::Linux);
        let labels: Vec<&str> = chain.iter().map(|q| q.label).collect();
        assert_eq!(
            labels,
            vec!["cpu-cpuinfo", "cpu-max-freq", "cpu-stat", "cpu-interrupts"]
        );
        assert_eq!(
            chain[0].kind,
            SourceKind::PseudoFile { path: "/proc/cpuinfo" }
        );
    }

    #[test]
    fn test_windows_cpu_registry_precedes_wmi() {
        let labels: Vec<&str> = queries(Domain::Cpu, PlatformKind::Windows)
            .iter()
            .map(|q| q.label)
            .collect();
        assert_eq!(labels, vec!["cpu-name-registry", "cpu-wmi"]);
    }

    #[test]
    fn test_lookup_by_label() {
        let q = query(Domain::Memory, PlatformKind::Linux, "memory-dmidecode").unwrap();
        match q.kind {
            SourceKind::Command { program, ref args } => {
                assert_eq!(program, "dmidecode");
                assert_eq!(args, &["-t".to_string(), "memory".to_string()]);
            }
            _ => panic!("expected a command"),
        }
        assert!(query(Domain::Memory, PlatformKind::Linux, "no-such-label").is_none());
    }

    #[test]
    fn test_tables_are_pure() {
        assert_eq!(
            queries(Domain::Gpu, PlatformKind::Linux),
            queries(Domain::Gpu, PlatformKind::Linux)
        );
    }
}
