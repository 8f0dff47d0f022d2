use crate::equipment::{Equipment, EquipmentFilter, EquipmentStatus};
use crate::error::{SchedulingError, SchedulingResult};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Authoritative list of equipment units, keyed by id.
///
/// A `BTreeMap` keeps listings in ascending-id order, which the availability
/// ranking relies on for determinism.
#[derive(Debug, Default)]
pub struct EquipmentRegistry {
    units: RwLock<BTreeMap<String, Equipment>>,
}

impl EquipmentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, equipment: Equipment) -> SchedulingResult<()> {
        if equipment.id.trim().is_empty() {
            return Err(SchedulingError::validation(
                "equipment requires a non-empty id",
            ));
        }
        let mut units = self.units.write();
        if units.contains_key(&equipment.id) {
            return Err(SchedulingError::validation(format!(
                "equipment '{}' already registered",
                equipment.id
            )));
        }
        units.insert(equipment.id.clone(), equipment);
        Ok(())
    }

    pub fn list(&self, filter: &EquipmentFilter) -> Vec<Equipment> {
        self.units
            .read()
            .values()
            .filter(|equipment| filter.matches(equipment))
            .cloned()
            .collect()
    }

    pub fn get(&self, id: &str) -> SchedulingResult<Equipment> {
        self.units
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| SchedulingError::EquipmentNotFound(id.to_string()))
    }

    /// Idempotent status write. The engine layers the calendar-consistency
    /// rule on top of this; the registry itself only records the value.
    pub fn set_status(&self, id: &str, status: EquipmentStatus) -> SchedulingResult<()> {
        let mut units = self.units.write();
        match units.get_mut(id) {
            Some(equipment) => {
                equipment.status = status;
                Ok(())
            }
            None => Err(SchedulingError::EquipmentNotFound(id.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.units.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.read().is_empty()
    }
}
