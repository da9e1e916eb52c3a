//! Typed inventory records.
//!
//! Every domain record carries a fixed schema: each declared field name is
//! always present as a key, with [`FieldValue::Unknown`] as the initial
//! value. Consumers never branch on key presence, only on the value tag.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// One inventory category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Os,
    Cpu,
    Memory,
    Disk,
    Network,
    Gpu,
    Motherboard,
}

impl Domain {
    /// All domains, in report order.
    pub const ALL: [Domain; 7] = [
        Domain::Os,
        Domain::Cpu,
        Domain::Memory,
        Domain::Disk,
        Domain::Network,
        Domain::Gpu,
        Domain::Motherboard,
    ];
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Os => write!(f, "os"),
            Domain::Cpu => write!(f, "cpu"),
            Domain::Memory => write!(f, "memory"),
            Domain::Disk => write!(f, "disk"),
            Domain::Network => write!(f, "network"),
            Domain::Gpu => write!(f, "gpu"),
            Domain::Motherboard => write!(f, "motherboard"),
        }
    }
}

/// A collected field: a parsed scalar in canonical units, an explicit
/// absence marker, or a diagnostic for an attempted-but-failed collection.
///
/// `Text` also carries unparsed literals when unit conversion degrades
/// (see [`crate::units`]).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
    Text(String),
    /// No data available; not an error.
    Unknown,
    /// Collection was attempted and failed; carries a short diagnostic.
    Error(String),
}

impl FieldValue {
    /// Wrap an error's display form as an `Error` field.
    pub fn error<E: fmt::Display>(err: E) -> Self {
        FieldValue::Error(err.to_string())
    }

    /// True for parsed scalars, false for `Unknown`/`Error`.
    pub fn is_known(&self) -> bool {
        matches!(
            self,
            FieldValue::Integer(_) | FieldValue::Float(_) | FieldValue::Text(_)
        )
    }
}

const UNKNOWN: FieldValue = FieldValue::Unknown;

/// Per-instance sub-record for multi-instance domains (memory modules,
/// drives, network adapters, GPU adapters). Same fixed-schema contract as
/// [`DomainRecord`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceRecord {
    fields: BTreeMap<&'static str, FieldValue>,
}

impl InstanceRecord {
    /// Create an instance record with every schema field set to `Unknown`.
    pub fn new(schema: &'static [&'static str]) -> Self {
        Self {
            fields: schema.iter().map(|name| (*name, FieldValue::Unknown)).collect(),
        }
    }

    /// Set a declared field. Fields outside the schema are rejected in debug
    /// builds and ignored in release builds.
    pub fn set(&mut self, field: &'static str, value: FieldValue) {
        debug_assert!(
            self.fields.contains_key(field),
            "{field} is not part of the instance schema"
        );
        if let Some(slot) = self.fields.get_mut(field) {
            *slot = value;
        }
    }

    /// Look up a field; undeclared names read as `Unknown`.
    pub fn get(&self, field: &str) -> &FieldValue {
        self.fields.get(field).unwrap_or(&UNKNOWN)
    }

    /// Iterate over fields in schema order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (*name, value))
    }
}

/// The collected record for one domain: a fixed-schema field map plus an
/// ordered list of per-instance sub-records. Instance order follows the
/// order reported by the underlying source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainRecord {
    domain: Domain,
    fields: BTreeMap<&'static str, FieldValue>,
    instances: Vec<InstanceRecord>,
}

impl DomainRecord {
    /// Create a record with every schema field set to `Unknown` and no
    /// instances.
    pub fn new(domain: Domain, schema: &'static [&'static str]) -> Self {
        Self {
            domain,
            fields: schema.iter().map(|name| (*name, FieldValue::Unknown)).collect(),
            instances: Vec::new(),
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Set a declared field. Fields outside the schema are rejected in debug
    /// builds and ignored in release builds.
    pub fn set(&mut self, field: &'static str, value: FieldValue) {
        debug_assert!(
            self.fields.contains_key(field),
            "{field} is not part of the {} schema",
            self.domain
        );
        if let Some(slot) = self.fields.get_mut(field) {
            *slot = value;
        }
    }

    /// Look up a field; undeclared names read as `Unknown`.
    pub fn get(&self, field: &str) -> &FieldValue {
        self.fields.get(field).unwrap_or(&UNKNOWN)
    }

    /// True when the record's keys are exactly `schema`.
    pub fn matches_schema(&self, schema: &[&str]) -> bool {
        self.fields.len() == schema.len()
            && schema.iter().all(|name| self.fields.contains_key(name))
    }

    /// Iterate over fields in schema order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (*name, value))
    }

    /// Append a per-instance sub-record, preserving source order.
    pub fn push_instance(&mut self, instance: InstanceRecord) {
        self.instances.push(instance);
    }

    pub fn instances(&self) -> &[InstanceRecord] {
        &self.instances
    }

    pub fn instances_mut(&mut self) -> &mut [InstanceRecord] {
        &mut self.instances
    }
}
