use crate::request::{RentalRequest, RequestStage};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone)]
pub struct RequestValidationError {
    message: String,
}

impl RequestValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for RequestValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for RequestValidationError {}

pub fn validate_request(request: &RentalRequest) -> Result<(), RequestValidationError> {
    if request.quantity < 1 {
        return Err(RequestValidationError::new(format!(
            "request {} must ask for at least one unit",
            request.id
        )));
    }

    if request.project.trim().is_empty() {
        return Err(RequestValidationError::new(format!(
            "request {} requires a non-empty project",
            request.id
        )));
    }

    if request.requested_by.trim().is_empty() {
        return Err(RequestValidationError::new(format!(
            "request {} requires a non-empty requested_by",
            request.id
        )));
    }

    if request.assignments.len() as u32 > request.quantity {
        return Err(RequestValidationError::new(format!(
            "request {} holds {} assignments but asked for {} units",
            request.id,
            request.assignments.len(),
            request.quantity
        )));
    }

    let mut units = HashSet::with_capacity(request.assignments.len());
    for assignment in &request.assignments {
        if assignment.request_id != request.id {
            return Err(RequestValidationError::new(format!(
                "request {} holds an assignment recorded for request {}",
                request.id, assignment.request_id
            )));
        }
        if !units.insert(assignment.equipment_id.as_str()) {
            return Err(RequestValidationError::new(format!(
                "request {} holds duplicate assignments for equipment '{}'",
                request.id, assignment.equipment_id
            )));
        }
        if !assignment.interval.within(&request.interval) {
            return Err(RequestValidationError::new(format!(
                "request {} assignment for '{}' lies outside the requested range {}",
                request.id, assignment.equipment_id, request.interval
            )));
        }
    }

    // Terminal actions release every hold before the stage advances, so a
    // terminal request carrying assignments can only be corrupt data.
    if !request.assignments.is_empty()
        && (request.stage == RequestStage::Submitted || request.stage.is_terminal())
    {
        return Err(RequestValidationError::new(format!(
            "request {} holds assignments while {}",
            request.id, request.stage
        )));
    }

    Ok(())
}

pub fn validate_request_collection(
    requests: &[RentalRequest],
) -> Result<(), RequestValidationError> {
    let mut seen_ids = HashSet::with_capacity(requests.len());
    for request in requests {
        if !seen_ids.insert(request.id) {
            return Err(RequestValidationError::new(format!(
                "duplicate request id {}",
                request.id
            )));
        }
        validate_request(request)?;
    }
    Ok(())
}
