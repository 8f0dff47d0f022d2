use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentCategory {
    Excavator,
    Dozer,
    Crane,
    Loader,
    Grader,
    DumpTruck,
}

impl EquipmentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentCategory::Excavator => "excavator",
            EquipmentCategory::Dozer => "dozer",
            EquipmentCategory::Crane => "crane",
            EquipmentCategory::Loader => "loader",
            EquipmentCategory::Grader => "grader",
            EquipmentCategory::DumpTruck => "dump_truck",
        }
    }

    pub fn from_str(input: &str) -> Option<Self> {
        match input {
            "excavator" => Some(EquipmentCategory::Excavator),
            "dozer" => Some(EquipmentCategory::Dozer),
            "crane" => Some(EquipmentCategory::Crane),
            "loader" => Some(EquipmentCategory::Loader),
            "grader" => Some(EquipmentCategory::Grader),
            "dump_truck" => Some(EquipmentCategory::DumpTruck),
            _ => None,
        }
    }
}

impl fmt::Display for EquipmentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Organizational division owning or requesting equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessUnit {
    Construction,
    Mining,
    Infrastructure,
    Rentals,
}

impl BusinessUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            BusinessUnit::Construction => "construction",
            BusinessUnit::Mining => "mining",
            BusinessUnit::Infrastructure => "infrastructure",
            BusinessUnit::Rentals => "rentals",
        }
    }

    pub fn from_str(input: &str) -> Option<Self> {
        match input {
            "construction" => Some(BusinessUnit::Construction),
            "mining" => Some(BusinessUnit::Mining),
            "infrastructure" => Some(BusinessUnit::Infrastructure),
            "rentals" => Some(BusinessUnit::Rentals),
            _ => None,
        }
    }
}

impl fmt::Display for BusinessUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentStatus {
    Available,
    OnRent,
    Maintenance,
    OutOfService,
}

impl EquipmentStatus {
    /// Maintenance and OutOfService are manual overrides that suppress
    /// eligibility regardless of the booking calendar.
    pub fn is_override(&self) -> bool {
        matches!(
            self,
            EquipmentStatus::Maintenance | EquipmentStatus::OutOfService
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentStatus::Available => "available",
            EquipmentStatus::OnRent => "on_rent",
            EquipmentStatus::Maintenance => "maintenance",
            EquipmentStatus::OutOfService => "out_of_service",
        }
    }

    pub fn from_str(input: &str) -> Option<Self> {
        match input {
            "available" => Some(EquipmentStatus::Available),
            "on_rent" => Some(EquipmentStatus::OnRent),
            "maintenance" => Some(EquipmentStatus::Maintenance),
            "out_of_service" => Some(EquipmentStatus::OutOfService),
            _ => None,
        }
    }
}

impl fmt::Display for EquipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: String,
    pub category: EquipmentCategory,
    pub business_unit: BusinessUnit,
    pub status: EquipmentStatus,
    pub location: String,
}

impl Equipment {
    pub fn new(
        id: impl Into<String>,
        category: EquipmentCategory,
        business_unit: BusinessUnit,
        location: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            category,
            business_unit,
            status: EquipmentStatus::Available,
            location: location.into(),
        }
    }
}

/// Optional criteria combined with logical AND; an empty filter matches all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquipmentFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<EquipmentCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_unit: Option<BusinessUnit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EquipmentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl EquipmentFilter {
    pub fn matches(&self, equipment: &Equipment) -> bool {
        if let Some(category) = self.category {
            if equipment.category != category {
                return false;
            }
        }
        if let Some(business_unit) = self.business_unit {
            if equipment.business_unit != business_unit {
                return false;
            }
        }
        if let Some(status) = self.status {
            if equipment.status != status {
                return false;
            }
        }
        if let Some(ref location) = self.location {
            if &equipment.location != location {
                return false;
            }
        }
        true
    }
}
