use super::fields::{index_of_name, FieldSpec, FIELDS, FIELD_COUNT};
use super::value::Value;

/// All fields decoded from one telegram.
///
/// Only the parser fills a record, and only hands it out once the whole
/// telegram decoded cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    slots: [Option<Value>; FIELD_COUNT],
}

/// One slot of a [`Record`] together with its static metadata.
#[derive(Debug, Clone, Copy)]
pub struct Field<'a> {
    pub spec: &'static FieldSpec,
    pub value: Option<&'a Value>,
}

impl Field<'_> {
    pub fn present(&self) -> bool {
        self.value.is_some()
    }
}

impl Default for Record {
    fn default() -> Self {
        Self::new()
    }
}

impl Record {
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| None),
        }
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> &mut Option<Value> {
        &mut self.slots[index]
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        index_of_name(name).and_then(|i| self.slots[i].as_ref())
    }

    /// Every slot in declaration order, present or not.
    pub fn fields(&self) -> impl Iterator<Item = Field<'_>> {
        FIELDS.iter().zip(self.slots.iter()).map(|(spec, value)| Field {
            spec,
            value: value.as_ref(),
        })
    }

    pub fn present_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}
