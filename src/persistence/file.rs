use super::{PersistenceError, PersistenceResult};
use crate::equipment::{BusinessUnit, Equipment, EquipmentCategory, EquipmentStatus};
use crate::{EquipmentFilter, RentalRequest, SchedulingEngine};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Whole-state snapshot. The booking calendar is not stored: it is derived
/// from the requests' assignments and rebuilt (and re-validated) on load.
#[derive(Debug, Serialize, Deserialize)]
pub struct FleetSnapshot {
    pub equipment: Vec<Equipment>,
    pub requests: Vec<RentalRequest>,
}

impl FleetSnapshot {
    pub fn from_engine(engine: &SchedulingEngine) -> PersistenceResult<Self> {
        let requests = engine.list_requests(None);
        super::validate_requests(&requests)?;
        Ok(Self {
            equipment: engine.list_equipment(&EquipmentFilter::default()),
            requests,
        })
    }

    pub fn into_engine(self) -> PersistenceResult<SchedulingEngine> {
        super::validate_requests(&self.requests)?;
        let engine = SchedulingEngine::from_parts(self.equipment, self.requests)?;
        Ok(engine)
    }
}

pub fn save_fleet_to_json<P: AsRef<Path>>(
    engine: &SchedulingEngine,
    path: P,
) -> PersistenceResult<()> {
    let snapshot = FleetSnapshot::from_engine(engine)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    Ok(())
}

pub fn load_fleet_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<SchedulingEngine> {
    let file = File::open(path)?;
    let snapshot: FleetSnapshot = serde_json::from_reader(file)?;
    snapshot.into_engine()
}

#[derive(Debug, Serialize, Deserialize)]
struct RosterCsvRecord {
    id: String,
    category: String,
    business_unit: String,
    status: String,
    location: String,
}

impl From<&Equipment> for RosterCsvRecord {
    fn from(equipment: &Equipment) -> Self {
        Self {
            id: equipment.id.clone(),
            category: equipment.category.as_str().to_string(),
            business_unit: equipment.business_unit.as_str().to_string(),
            status: equipment.status.as_str().to_string(),
            location: equipment.location.clone(),
        }
    }
}

impl RosterCsvRecord {
    fn into_equipment(self) -> PersistenceResult<Equipment> {
        let category = EquipmentCategory::from_str(self.category.trim()).ok_or_else(|| {
            PersistenceError::InvalidData(format!("invalid category '{}'", self.category))
        })?;
        let business_unit = BusinessUnit::from_str(self.business_unit.trim()).ok_or_else(|| {
            PersistenceError::InvalidData(format!(
                "invalid business_unit '{}'",
                self.business_unit
            ))
        })?;
        let status = EquipmentStatus::from_str(self.status.trim()).ok_or_else(|| {
            PersistenceError::InvalidData(format!("invalid status '{}'", self.status))
        })?;
        if self.id.trim().is_empty() {
            return Err(PersistenceError::InvalidData(
                "equipment row requires a non-empty id".into(),
            ));
        }
        Ok(Equipment {
            id: self.id,
            category,
            business_unit,
            status,
            location: self.location,
        })
    }
}

/// Writes the equipment roster only; requests and bookings stay in the
/// JSON/SQLite formats.
pub fn save_roster_to_csv<P: AsRef<Path>>(
    engine: &SchedulingEngine,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for equipment in engine.list_equipment(&EquipmentFilter::default()) {
        writer.serialize(RosterCsvRecord::from(&equipment))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_roster_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<Equipment>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut roster = Vec::new();
    for record in reader.deserialize::<RosterCsvRecord>() {
        roster.push(record?.into_equipment()?);
    }
    if roster.is_empty() {
        return Err(PersistenceError::InvalidData(
            "CSV file contained no equipment rows".into(),
        ));
    }
    Ok(roster)
}
