use crate::equipment::{BusinessUnit, Equipment, EquipmentCategory};
use crate::interval::BookingInterval;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityQuery {
    pub category: EquipmentCategory,
    pub interval: BookingInterval,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_unit: Option<BusinessUnit>,
    pub quantity: u32,
}

/// Outcome of an availability check. `Partial` is a result state, not an
/// error: fewer eligible units exist than the request asked for, and the
/// caller must decide what to do with the shortfall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Availability {
    Full {
        units: Vec<Equipment>,
    },
    Partial {
        units: Vec<Equipment>,
        requested: u32,
    },
}

impl Availability {
    pub fn from_ranked(ranked: Vec<Equipment>, requested: u32) -> Self {
        if (ranked.len() as u32) < requested {
            Availability::Partial {
                units: ranked,
                requested,
            }
        } else {
            Availability::Full { units: ranked }
        }
    }

    pub fn units(&self) -> &[Equipment] {
        match self {
            Availability::Full { units } | Availability::Partial { units, .. } => units,
        }
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, Availability::Partial { .. })
    }
}

/// Ranking key for an eligible candidate: same business unit first, then the
/// lightest committed load near the queried window (soonest available), then
/// id for determinism.
pub(crate) fn rank_key(
    equipment: &Equipment,
    affinity: Option<BusinessUnit>,
    committed_days: i64,
) -> (u8, i64, String) {
    let unit_rank = match affinity {
        Some(unit) if equipment.business_unit == unit => 0,
        Some(_) => 1,
        None => 0,
    };
    (unit_rank, committed_days, equipment.id.clone())
}
