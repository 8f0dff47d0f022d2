use crate::equipment::{BusinessUnit, EquipmentCategory};
use crate::interval::BookingInterval;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Routine,
    Urgent,
    Critical,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Routine => "routine",
            Urgency::Urgent => "urgent",
            Urgency::Critical => "critical",
        }
    }

    pub fn from_str(input: &str) -> Option<Self> {
        match input {
            "routine" => Some(Urgency::Routine),
            "urgent" => Some(Urgency::Urgent),
            "critical" => Some(Urgency::Critical),
            _ => None,
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle stage of a rental request. Stages only ever move forward along
/// the directed graph encoded in [`RequestStage::permits`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStage {
    Submitted,
    Approved,
    PendingInspection,
    ReadyForDispatch,
    InTransit,
    Completed,
    Rejected,
    Cancelled,
}

impl RequestStage {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RequestStage::Completed | RequestStage::Rejected | RequestStage::Cancelled
        )
    }

    /// Whether `action` is a legal edge out of this stage.
    pub fn permits(&self, action: TransitionAction) -> bool {
        match action {
            TransitionAction::Approve => *self == RequestStage::Submitted,
            TransitionAction::PassInspection => *self == RequestStage::PendingInspection,
            TransitionAction::Dispatch => *self == RequestStage::ReadyForDispatch,
            TransitionAction::Complete => *self == RequestStage::InTransit,
            TransitionAction::Reject => matches!(
                self,
                RequestStage::Submitted | RequestStage::Approved | RequestStage::PendingInspection
            ),
            // Once equipment is in transit the physical commitment forces the
            // off-rent flow (`complete`) instead of a bare cancel.
            TransitionAction::Cancel => matches!(
                self,
                RequestStage::Submitted
                    | RequestStage::Approved
                    | RequestStage::PendingInspection
                    | RequestStage::ReadyForDispatch
            ),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStage::Submitted => "submitted",
            RequestStage::Approved => "approved",
            RequestStage::PendingInspection => "pending_inspection",
            RequestStage::ReadyForDispatch => "ready_for_dispatch",
            RequestStage::InTransit => "in_transit",
            RequestStage::Completed => "completed",
            RequestStage::Rejected => "rejected",
            RequestStage::Cancelled => "cancelled",
        }
    }

    pub fn from_str(input: &str) -> Option<Self> {
        match input {
            "submitted" => Some(RequestStage::Submitted),
            "approved" => Some(RequestStage::Approved),
            "pending_inspection" => Some(RequestStage::PendingInspection),
            "ready_for_dispatch" => Some(RequestStage::ReadyForDispatch),
            "in_transit" => Some(RequestStage::InTransit),
            "completed" => Some(RequestStage::Completed),
            "rejected" => Some(RequestStage::Rejected),
            "cancelled" => Some(RequestStage::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for RequestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Named lifecycle operations. Assignment is not listed here: it is driven
/// through [`crate::engine::SchedulingEngine::assign`] because it carries a
/// booking side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionAction {
    Approve,
    PassInspection,
    Dispatch,
    Complete,
    Reject,
    Cancel,
}

impl TransitionAction {
    /// The stage this action lands in when permitted.
    pub fn target(&self) -> RequestStage {
        match self {
            TransitionAction::Approve => RequestStage::Approved,
            TransitionAction::PassInspection => RequestStage::ReadyForDispatch,
            TransitionAction::Dispatch => RequestStage::InTransit,
            TransitionAction::Complete => RequestStage::Completed,
            TransitionAction::Reject => RequestStage::Rejected,
            TransitionAction::Cancel => RequestStage::Cancelled,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionAction::Approve => "approve",
            TransitionAction::PassInspection => "pass_inspection",
            TransitionAction::Dispatch => "dispatch",
            TransitionAction::Complete => "complete",
            TransitionAction::Reject => "reject",
            TransitionAction::Cancel => "cancel",
        }
    }

    pub fn from_str(input: &str) -> Option<Self> {
        match input {
            "approve" => Some(TransitionAction::Approve),
            "pass_inspection" => Some(TransitionAction::PassInspection),
            "dispatch" => Some(TransitionAction::Dispatch),
            "complete" => Some(TransitionAction::Complete),
            "reject" => Some(TransitionAction::Reject),
            "cancel" => Some(TransitionAction::Cancel),
            _ => None,
        }
    }

    pub fn variants() -> &'static [TransitionAction] {
        &[
            TransitionAction::Approve,
            TransitionAction::PassInspection,
            TransitionAction::Dispatch,
            TransitionAction::Complete,
            TransitionAction::Reject,
            TransitionAction::Cancel,
        ]
    }
}

impl fmt::Display for TransitionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A committed binding of one equipment unit to one request for a specific
/// interval. References ids only; it never embeds the equipment record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub request_id: i32,
    pub equipment_id: String,
    pub interval: BookingInterval,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalRequest {
    pub id: i32,
    pub category: EquipmentCategory,
    pub quantity: u32,
    pub business_unit: BusinessUnit,
    pub project: String,
    pub interval: BookingInterval,
    pub requested_by: String,
    pub urgency: Urgency,
    pub stage: RequestStage,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

impl RentalRequest {
    pub fn new(
        id: i32,
        category: EquipmentCategory,
        quantity: u32,
        business_unit: BusinessUnit,
        project: impl Into<String>,
        interval: BookingInterval,
        requested_by: impl Into<String>,
        urgency: Urgency,
    ) -> Self {
        Self {
            id,
            category,
            quantity,
            business_unit,
            project: project.into(),
            interval,
            requested_by: requested_by.into(),
            urgency,
            stage: RequestStage::Submitted,
            assignments: Vec::new(),
        }
    }

    pub fn is_fully_assigned(&self) -> bool {
        self.assignments.len() as u32 >= self.quantity
    }

    pub fn assignment_for(&self, equipment_id: &str) -> Option<&Assignment> {
        self.assignments
            .iter()
            .find(|a| a.equipment_id == equipment_id)
    }
}
