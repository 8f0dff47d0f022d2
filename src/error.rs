use crate::interval::BookingInterval;
use crate::request::RequestStage;
use std::fmt;

/// Engine-level error taxonomy.
///
/// `ConflictingBooking` is expected and recoverable: the caller should
/// re-check availability and retry with a different unit. `InvalidTransition`
/// is a workflow error and is surfaced without retry. Partial availability is
/// not an error; see [`crate::availability::Availability`].
#[derive(Debug, Clone, PartialEq)]
pub enum SchedulingError {
    Validation(String),
    EquipmentNotFound(String),
    RequestNotFound(i32),
    ConflictingBooking {
        equipment_id: String,
        requested: BookingInterval,
    },
    InvalidTransition {
        stage: RequestStage,
        action: String,
    },
}

impl SchedulingError {
    pub fn validation(message: impl Into<String>) -> Self {
        SchedulingError::Validation(message.into())
    }

    pub fn invalid_transition(stage: RequestStage, action: impl Into<String>) -> Self {
        SchedulingError::InvalidTransition {
            stage,
            action: action.into(),
        }
    }
}

impl fmt::Display for SchedulingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulingError::Validation(message) => write!(f, "{message}"),
            SchedulingError::EquipmentNotFound(id) => write!(f, "equipment '{id}' not found"),
            SchedulingError::RequestNotFound(id) => write!(f, "request {id} not found"),
            SchedulingError::ConflictingBooking {
                equipment_id,
                requested,
            } => write!(
                f,
                "equipment '{equipment_id}' already booked within {requested}"
            ),
            SchedulingError::InvalidTransition { stage, action } => write!(
                f,
                "action '{action}' is not permitted while the request is {stage}"
            ),
        }
    }
}

impl std::error::Error for SchedulingError {}

pub type SchedulingResult<T> = Result<T, SchedulingError>;
