//! Static catalogue of the telegram fields this firmware decodes.
//!
//! Every field carries its metadata (name, unit, OBIS reference, value
//! kind) in [`FIELDS`]; a [`Record`](super::Record) stores one slot per
//! entry, in the same order.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Text between the parentheses.
    Text,
    /// Everything after the OBIS reference, unparsed.
    Raw,
    Fixed,
    Integer,
    /// `(timestamp)(value*unit)`
    TimestampedFixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub unit: &'static str,
    /// OBIS reference, empty for the `/` identification header.
    pub obis: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    const fn new(
        name: &'static str,
        obis: &'static str,
        unit: &'static str,
        kind: FieldKind,
    ) -> Self {
        Self {
            name,
            unit,
            obis,
            kind,
        }
    }

    /// Unit without its `k` multiplier, accepted as an integer count of thousandths.
    pub fn base_unit(&self) -> Option<&'static str> {
        self.unit.strip_prefix('k').filter(|u| !u.is_empty())
    }
}

use FieldKind::*;

pub const FIELD_COUNT: usize = 35;

pub static FIELDS: [FieldSpec; FIELD_COUNT] = [
    FieldSpec::new("identification", "", "", Text),
    FieldSpec::new("p1_version", "1-3:0.2.8", "", Text),
    FieldSpec::new("timestamp", "0-0:1.0.0", "", Text),
    FieldSpec::new("equipment_id", "0-0:96.1.1", "", Text),
    FieldSpec::new("energy_delivered_tariff1", "1-0:1.8.1", "kWh", Fixed),
    FieldSpec::new("energy_delivered_tariff2", "1-0:1.8.2", "kWh", Fixed),
    FieldSpec::new("energy_returned_tariff1", "1-0:2.8.1", "kWh", Fixed),
    FieldSpec::new("energy_returned_tariff2", "1-0:2.8.2", "kWh", Fixed),
    FieldSpec::new("electricity_tariff", "0-0:96.14.0", "", Text),
    FieldSpec::new("power_delivered", "1-0:1.7.0", "kW", Fixed),
    FieldSpec::new("power_returned", "1-0:2.7.0", "kW", Fixed),
    FieldSpec::new("electricity_failures", "0-0:96.7.21", "", Integer),
    FieldSpec::new("electricity_long_failures", "0-0:96.7.9", "", Integer),
    FieldSpec::new("electricity_failure_log", "1-0:99.97.0", "", Raw),
    FieldSpec::new("electricity_sags_l1", "1-0:32.32.0", "", Integer),
    FieldSpec::new("electricity_sags_l2", "1-0:52.32.0", "", Integer),
    FieldSpec::new("electricity_sags_l3", "1-0:72.32.0", "", Integer),
    FieldSpec::new("electricity_swells_l1", "1-0:32.36.0", "", Integer),
    FieldSpec::new("electricity_swells_l2", "1-0:52.36.0", "", Integer),
    FieldSpec::new("electricity_swells_l3", "1-0:72.36.0", "", Integer),
    FieldSpec::new("voltage_l1", "1-0:32.7.0", "V", Fixed),
    FieldSpec::new("voltage_l2", "1-0:52.7.0", "V", Fixed),
    FieldSpec::new("voltage_l3", "1-0:72.7.0", "V", Fixed),
    FieldSpec::new("current_l1", "1-0:31.7.0", "A", Fixed),
    FieldSpec::new("current_l2", "1-0:51.7.0", "A", Fixed),
    FieldSpec::new("current_l3", "1-0:71.7.0", "A", Fixed),
    FieldSpec::new("power_delivered_l1", "1-0:21.7.0", "kW", Fixed),
    FieldSpec::new("power_delivered_l2", "1-0:41.7.0", "kW", Fixed),
    FieldSpec::new("power_delivered_l3", "1-0:61.7.0", "kW", Fixed),
    FieldSpec::new("power_returned_l1", "1-0:22.7.0", "kW", Fixed),
    FieldSpec::new("power_returned_l2", "1-0:42.7.0", "kW", Fixed),
    FieldSpec::new("power_returned_l3", "1-0:62.7.0", "kW", Fixed),
    FieldSpec::new("gas_device_type", "0-1:24.1.0", "", Integer),
    FieldSpec::new("gas_equipment_id", "0-1:96.1.0", "", Text),
    FieldSpec::new("gas_delivered", "0-1:24.2.1", "m3", TimestampedFixed),
];

/// Index of the identification header in [`FIELDS`].
pub const IDENTIFICATION: usize = 0;

/// Slot index of the field with this OBIS reference.
pub fn index_of_obis(obis: &str) -> Option<usize> {
    if obis.is_empty() {
        return None;
    }
    FIELDS.iter().position(|f| f.obis == obis)
}

pub fn index_of_name(name: &str) -> Option<usize> {
    FIELDS.iter().position(|f| f.name == name)
}
