//! Motherboard inventory collection.
//!
//! Single-instance domain. Windows reads the WMI baseboard row with each
//! attribute matched against its own key, macOS combines `system_profiler`
//! hardware output with the `diskutil` boot volume, Linux reads
//! `dmidecode -t baseboard` (usually privileged).

use super::{apply, fetch, set_first};
use crate::field::{Domain, DomainRecord, FieldValue};
use crate::platform::PlatformKind;
use crate::units;

pub const FIELDS: &[&str] = &[
    "manufacturer",
    "product",
    "serial_number",
    "version",
    "hosting_board",
    "powered_on",
    "removable",
    "replaceable",
    "boot_volume",
];

const WMI_FIELDS: &[&str] = &[
    "manufacturer",
    "product",
    "serial_number",
    "version",
    "hosting_board",
    "powered_on",
    "removable",
    "replaceable",
];

const DMI_FIELDS: &[&str] = &["manufacturer", "product", "serial_number", "version"];

pub async fn collect(platform: PlatformKind) -> DomainRecord {
    let mut record = DomainRecord::new(Domain::Motherboard, FIELDS);
    match platform {
        PlatformKind::Windows => {
            apply(
                &mut record,
                WMI_FIELDS,
                fetch(Domain::Motherboard, platform, "board-wmi").await,
                parse_wmic_baseboard,
            );
        }
        PlatformKind::MacOs => collect_macos(&mut record, platform).await,
        PlatformKind::Linux => {
            apply(
                &mut record,
                DMI_FIELDS,
                fetch(Domain::Motherboard, platform, "board-dmidecode").await,
                parse_dmidecode_baseboard,
            );
        }
        PlatformKind::Other => {}
    }
    record
}

// Each attribute matches its own anchored key. Boolean flags
// (HostingBoard, PoweredOn, Removable, Replaceable) must not alias each
// other when one of them is missing from the output.
fn parse_wmic_baseboard(record: &mut DomainRecord, raw: &str) {
    set_first(record, "manufacturer", raw, r"(?m)^Manufacturer=(.+)", units::to_text);
    set_first(record, "product", raw, r"(?m)^Product=(.+)", units::to_text);
    set_first(record, "serial_number", raw, r"(?m)^SerialNumber=(.+)", units::to_text);
    set_first(record, "version", raw, r"(?m)^Version=(.+)", units::to_text);
    set_first(record, "hosting_board", raw, r"(?m)^HostingBoard=(.+)", units::to_text);
    set_first(record, "powered_on", raw, r"(?m)^PoweredOn=(.+)", units::to_text);
    set_first(record, "removable", raw, r"(?m)^Removable=(.+)", units::to_text);
    set_first(record, "replaceable", raw, r"(?m)^Replaceable=(.+)", units::to_text);
}

async fn collect_macos(record: &mut DomainRecord, platform: PlatformKind) {
    record.set("manufacturer", FieldValue::Text("Apple".to_string()));
    apply(
        record,
        &["product", "serial_number"],
        fetch(Domain::Motherboard, platform, "board-profiler").await,
        parse_system_profiler_hardware,
    );
    apply(
        record,
        &["boot_volume"],
        fetch(Domain::Motherboard, platform, "board-boot-volume").await,
        |record, raw| {
            set_first(record, "boot_volume", raw, r"Volume Name:\s*(.+)", units::to_text)
        },
    );
}

fn parse_system_profiler_hardware(record: &mut DomainRecord, raw: &str) {
    set_first(record, "product", raw, r"Model Identifier:\s*(.+)", units::to_text);
    set_first(
        record,
        "serial_number",
        raw,
        r"Serial Number \(system\):\s*(.+)",
        units::to_text,
    );
}

fn parse_dmidecode_baseboard(record: &mut DomainRecord, raw: &str) {
    set_first(record, "manufacturer", raw, r"(?m)^\s*Manufacturer:\s*(.+)", units::to_text);
    set_first(record, "product", raw, r"(?m)^\s*Product Name:\s*(.+)", units::to_text);
    set_first(record, "serial_number", raw, r"(?m)^\s*Serial Number:\s*(.+)", units::to_text);
    set_first(record, "version", raw, r"(?m)^\s*Version:\s*(.+)", units::to_text);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wmic_flags_do_not_alias() {
        // PoweredOn missing entirely; Removable and Replaceable must keep
        // their own values and PoweredOn must stay Unknown.
        let raw = "\
HostingBoard=TRUE\r\n\
Manufacturer=ASUSTeK COMPUTER INC.\r\n\
Product=PRIME Z390-A\r\n\
Removable=FALSE\r\n\
Replaceable=TRUE\r\n\
SerialNumber=190441234500293\r\n\
Version=Rev 1.xx\r\n";
        let mut record = DomainRecord::new(Domain::Motherboard, FIELDS);
        parse_wmic_baseboard(&mut record, raw);

        assert_eq!(*record.get("hosting_board"), FieldValue::Text("TRUE".into()));
        assert_eq!(*record.get("powered_on"), FieldValue::Unknown);
        assert_eq!(*record.get("removable"), FieldValue::Text("FALSE".into()));
        assert_eq!(*record.get("replaceable"), FieldValue::Text("TRUE".into()));
        assert_eq!(*record.get("product"), FieldValue::Text("PRIME Z390-A".into()));
    }

    #[test]
    fn test_dmidecode_baseboard() {
        let raw = "\
# dmidecode 3.3\n\
Handle 0x0002, DMI type 2, 15 bytes\n\
Base Board Information\n\
\tManufacturer: Micro-Star International Co., Ltd.\n\
\tProduct Name: MPG B550 GAMING PLUS\n\
\tVersion: 1.0\n\
\tSerial Number: K716123456\n\
\tAsset Tag: Default string\n";
        let mut record = DomainRecord::new(Domain::Motherboard, FIELDS);
        parse_dmidecode_baseboard(&mut record, raw);

        assert_eq!(
            *record.get("manufacturer"),
            FieldValue::Text("Micro-Star International Co., Ltd.".into())
        );
        assert_eq!(*record.get("product"), FieldValue::Text("MPG B550 GAMING PLUS".into()));
        assert_eq!(*record.get("version"), FieldValue::Text("1.0".into()));
        assert_eq!(*record.get("serial_number"), FieldValue::Text("K716123456".into()));
    }

    #[test]
    fn test_system_profiler_hardware() {
        let raw = "\
Hardware:\n\
\n\
    Hardware Overview:\n\
\n\
      Model Name: MacBook Pro\n\
      Model Identifier: MacBookPro16,1\n\
      Serial Number (system): C02XG2JMH7JY\n";
        let mut record = DomainRecord::new(Domain::Motherboard, FIELDS);
        parse_system_profiler_hardware(&mut record, raw);

        assert_eq!(*record.get("product"), FieldValue::Text("MacBookPro16,1".into()));
        assert_eq!(*record.get("serial_number"), FieldValue::Text("C02XG2JMH7JY".into()));
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
