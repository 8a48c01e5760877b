use crate::error::RowError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessType {
    #[serde(rename = "R")]
    Read,
    #[serde(rename = "RW")]
    ReadWrite,
}

impl FromStr for AccessType {
    type Err = RowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "R" => Ok(Self::Read),
            "RW" => Ok(Self::ReadWrite),
            other => Err(RowError::UnknownAccess(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemoryType {
    #[serde(rename = "EEPROM")]
    Eeprom,
    #[serde(rename = "RAM")]
    Ram,
}

impl FromStr for MemoryType {
    type Err = RowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EEPROM" => Ok(Self::Eeprom),
            "RAM" => Ok(Self::Ram),
            other => Err(RowError::UnknownMemory(other.to_string())),
        }
    }
}

/// One register in a model's memory map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlTableEntry {
    pub name: String,
    pub address: u16,
    pub length: u16,
    pub access: AccessType,
    pub memory: MemoryType,
}

/// Name-indexed control table.
///
/// Serialized as a list of entries in address order; the index is rebuilt
/// from each entry's `name` on deserialize.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<ControlTableEntry>", into = "Vec<ControlTableEntry>")]
pub struct ControlTable {
    items: HashMap<String, ControlTableEntry>,
}

impl From<Vec<ControlTableEntry>> for ControlTable {
    fn from(entries: Vec<ControlTableEntry>) -> Self {
        let mut table = Self::default();
        for entry in entries {
            table.insert(entry);
        }
        table
    }
}

impl From<ControlTable> for Vec<ControlTableEntry> {
    fn from(table: ControlTable) -> Self {
        let mut entries: Vec<ControlTableEntry> = table.items.into_values().collect();
        entries.sort_by(|a, b| a.address.cmp(&b.address).then_with(|| a.name.cmp(&b.name)));
        entries
    }
}

impl ControlTable {
    /// Stores `entry`, replacing any entry with the same name.
    pub fn insert(&mut self, entry: ControlTableEntry) -> Option<ControlTableEntry> {
        self.items.insert(entry.name.clone(), entry)
    }

    pub fn get(&self, name: &str) -> Option<&ControlTableEntry> {
        self.items.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    pub fn is_writable(&self, name: &str) -> bool {
        matches!(
            self.get(name),
            Some(ControlTableEntry {
                access: AccessType::ReadWrite,
                ..
            })
        )
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Entries in ascending address order, ties broken by name.
    pub fn iter(&self) -> impl Iterator<Item = &ControlTableEntry> {
        let mut entries: Vec<&ControlTableEntry> = self.items.values().collect();
        entries.sort_by(|a, b| a.address.cmp(&b.address).then_with(|| a.name.cmp(&b.name)));
        entries.into_iter()
    }
}

/// Baud-rate register code to line rate in bits per second.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaudRateTable {
    rates: BTreeMap<u8, u32>,
}

impl BaudRateTable {
    pub fn insert(&mut self, code: u8, baud: u32) -> Option<u32> {
        self.rates.insert(code, baud)
    }

    pub fn get(&self, code: u8) -> Option<u32> {
        self.rates.get(&code).copied()
    }

    /// Lowest code that selects `baud`.
    pub fn code_for(&self, baud: u32) -> Option<u8> {
        self.rates
            .iter()
            .find(|(_, &rate)| rate == baud)
            .map(|(&code, _)| code)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, u32)> + '_ {
        self.rates.iter().map(|(&code, &baud)| (code, baud))
    }
}

/// Per-model unit conversion and position range constants.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TypeInfo {
    pub torque_to_current_value_ratio: f64,
    pub velocity_to_value_ratio: f64,
    pub value_of_zero_radian_position: i32,
    pub value_of_min_radian_position: i32,
    pub value_of_max_radian_position: i32,
    pub min_radian: f64,
    pub max_radian: f64,
}

impl TypeInfo {
    /// Goal position register value for `radian`, clamped to the model's range.
    pub fn radian_to_value(&self, radian: f64) -> i32 {
        let zero = f64::from(self.value_of_zero_radian_position);
        let value = if radian > 0.0 && self.max_radian > 0.0 {
            let span = f64::from(self.value_of_max_radian_position) - zero;
            radian.min(self.max_radian) * span / self.max_radian + zero
        } else if radian < 0.0 && self.min_radian < 0.0 {
            let span = f64::from(self.value_of_min_radian_position) - zero;
            radian.max(self.min_radian) * span / self.min_radian + zero
        } else {
            zero
        };
        value.round() as i32
    }

    pub fn value_to_radian(&self, value: i32) -> f64 {
        let zero = f64::from(self.value_of_zero_radian_position);
        let max = f64::from(self.value_of_max_radian_position);
        let min = f64::from(self.value_of_min_radian_position);
        let offset = f64::from(value) - zero;
        if offset > 0.0 && max > zero {
            offset * self.max_radian / (max - zero)
        } else if offset < 0.0 && min < zero {
            offset * self.min_radian / (min - zero)
        } else {
            0.0
        }
    }

    /// Velocity register value for a speed in rad/s.
    pub fn velocity_to_value(&self, velocity: f64) -> i32 {
        (velocity * self.velocity_to_value_ratio).round() as i32
    }

    pub fn value_to_velocity(&self, value: i32) -> Option<f64> {
        (self.velocity_to_value_ratio != 0.0)
            .then(|| f64::from(value) / self.velocity_to_value_ratio)
    }

    /// Current register value for a torque in N·m.
    pub fn torque_to_value(&self, torque: f64) -> i32 {
        (torque * self.torque_to_current_value_ratio).round() as i32
    }

    pub fn value_to_torque(&self, value: i32) -> Option<f64> {
        (self.torque_to_current_value_ratio != 0.0)
            .then(|| f64::from(value) / self.torque_to_current_value_ratio)
    }
}

/// Numeric model code paired with its canonical name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelIdentity {
    /// `None` when the tool was built from a model name.
    pub number: Option<u16>,
    pub name: String,
}

/// Everything parsed from one `.device` file.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub control_table: ControlTable,
    pub type_info: TypeInfo,
    pub baud_rates: BaudRateTable,
}
