//! Network inventory collection.
//!
//! Windows derives everything from one `ipconfig /all` read, including the
//! per-adapter breakdown and DHCP state. POSIX platforms use the
//! `ip`/`resolvectl` chain; tools missing on a given system (macOS has no
//! `ip`) degrade field by field.

use super::{apply, fetch, set_first};
use crate::extract;
use crate::field::{Domain, DomainRecord, FieldValue, InstanceRecord};
use crate::platform::PlatformKind;
use crate::units;

pub const FIELDS: &[&str] = &[
    "hostname",
    "fqdn",
    "ip_address",
    "mac_address",
    "dns_servers",
    "dhcp_enabled",
    "default_gateway",
];

pub const ADAPTER_FIELDS: &[&str] = &[
    "name",
    "ip_address",
    "subnet_mask",
    "dns_suffix",
    "dhcp_server",
];

pub async fn collect(platform: PlatformKind) -> DomainRecord {
    let mut record = DomainRecord::new(Domain::Network, FIELDS);

    match hostname::get() {
        Ok(name) => record.set(
            "hostname",
            FieldValue::Text(name.to_string_lossy().into_owned()),
        ),
        Err(err) => record.set("hostname", FieldValue::error(&err)),
    }

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
        &["fqdn", "ip_address", "mac_address", "dns_servers", "dhcp_enabled", "default_gateway"],
        fetch(Domain::Network, platform, "net-ipconfig").await,
        parse_ipconfig,
    );
}

fn parse_ipconfig(record: &mut DomainRecord, raw: &str) {
    set_first(record, "ip_address", raw, r"IPv4 Address[\s.]*: ([0-9.]+)", units::to_text);
    set_first(record, "mac_address", raw, r"Physical Address[\s.]*: ([0-9A-Fa-f-]+)", units::to_text);
    set_first(record, "dhcp_enabled", raw, r"DHCP Enabled[\s.]*: (Yes|No)", units::to_text);
    set_first(record, "default_gateway", raw, r"Default Gateway[\s.]*: (\S+)", units::to_text);

    let dns = extract::all(raw, r"DNS Servers[\s.]*: (.+)");
    if !dns.is_empty() {
        record.set("dns_servers", FieldValue::Text(dns.join(", ")));
    }

    // FQDN assembles from host name and primary DNS suffix.
    let host = extract::first(raw, r"Host Name[\s.]*: (.+)");
    let suffix = extract::first(raw, r"Primary Dns Suffix[\s.]*: (.+)");
    match (host, suffix) {
        (Some(host), Some(suffix)) if !suffix.is_empty() => {
            record.set("fqdn", FieldValue::Text(format!("{host}.{suffix}")));
        }
        (Some(host), _) => record.set("fqdn", FieldValue::Text(host)),
        _ => {}
    }

    parse_ipconfig_adapters(record, raw);
}

fn parse_ipconfig_adapters(record: &mut DomainRecord, raw: &str) {
    let splitter = match regex::Regex::new(r"Ethernet adapter|Wireless LAN adapter") {
        Ok(re) => re,
        Err(_) => return,
    };
    for block in splitter.split(raw).skip(1) {
        let mut adapter = InstanceRecord::new(ADAPTER_FIELDS);
        if let Some(name) = extract::first(block, r"Description[\s.]*: (.+)") {
            adapter.set("name", FieldValue::Text(name));
        }
        if let Some(ip) = extract::first(block, r"IPv4 Address[\s.]*: ([0-9.]+)") {
            adapter.set("ip_address", FieldValue::Text(ip));
        }
        if let Some(mask) = extract::first(block, r"Subnet Mask[\s.]*: ([0-9.]+)") {
            adapter.set("subnet_mask", FieldValue::Text(mask));
        }
        if let Some(suffix) = extract::first(block, r"Connection-specific DNS Suffix[\s.]*: (.+)") {
            adapter.set("dns_suffix", FieldValue::Text(suffix));
        }
        if let Some(server) = extract::first(block, r"DHCP Server[\s.]*: (.+)") {
            adapter.set("dhcp_server", FieldValue::Text(server));
        }
        record.push_instance(adapter);
    }
}

async fn collect_posix(record: &mut DomainRecord, platform: PlatformKind) {
    apply(
        record,
        &["fqdn"],
        fetch(Domain::Network, platform, "net-fqdn").await,
        |record, raw| record.set("fqdn", units::to_text(raw)),
    );
    apply(
        record,
        &["ip_address"],
        fetch(Domain::Network, platform, "net-route-probe").await,
        |record, raw| set_first(record, "ip_address", raw, r"src ([0-9.]+)", units::to_text),
    );
    apply(
        record,
        &["mac_address"],
        fetch(Domain::Network, platform, "net-addr").await,
        |record, raw| {
            set_first(record, "mac_address", raw, r"link/ether ([0-9A-Fa-f:]+)", units::to_text)
        },
    );
    apply(
        record,
        &["dns_servers"],
        fetch(Domain::Network, platform, "net-dns").await,
        |record, raw| {
            set_first(record, "dns_servers", raw, r"Current DNS Server:\s*(.+)", units::to_text)
        },
    );
    apply(
        record,
        &["default_gateway"],
        fetch(Domain::Network, platform, "net-routes").await,
        |record, raw| {
            set_first(record, "default_gateway", raw, r"default via (\S+)", units::to_text)
        },
    );
    match fetch(Domain::Network, platform, "net-interfaces").await {
        None | Some(Err(_)) => {}
        Some(Ok(raw)) => parse_ip_interfaces(record, &raw),
    }
}

fn parse_ip_interfaces(record: &mut DomainRecord, raw: &str) {
    for line in raw.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() <= 3 {
            continue;
        }
        let mut interface = InstanceRecord::new(ADAPTER_FIELDS);
        interface.set("name", FieldValue::Text(parts[1].to_string()));
        let address = parts[3].split('/').next().unwrap_or(parts[3]);
        interface.set("ip_address", FieldValue::Text(address.to_string()));
        record.push_instance(interface);
    }
}
