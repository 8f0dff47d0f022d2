use crate::availability::{rank_key, Availability, AvailabilityQuery};
use crate::calendar::BookingCalendar;
use crate::equipment::{Equipment, EquipmentFilter, EquipmentStatus};
use crate::error::{SchedulingError, SchedulingResult};
use crate::interval::BookingInterval;
use crate::registry::EquipmentRegistry;
use crate::request::{Assignment, RentalRequest, RequestStage, TransitionAction};
use crate::request_validation::{self, RequestValidationError};
use crate::timeline::{project_entries, EquipmentTimeline, Granularity};
use chrono::{Duration, NaiveDate};
use parking_lot::RwLock;
use rayon::prelude::*;
use std::collections::BTreeMap;

/// The scheduling and allocation engine.
///
/// Single writer of the booking calendar, equipment status, and request
/// stage. Every mutating operation either fully succeeds or leaves no
/// partial state: the calendar commit happens first, and only on success do
/// the assignment record, equipment status, and request stage change.
#[derive(Debug)]
pub struct SchedulingEngine {
    registry: EquipmentRegistry,
    calendar: BookingCalendar,
    requests: RwLock<BTreeMap<i32, RentalRequest>>,
    /// Overrides "now" for the status-derivation rule; tests pin this.
    reference_override: RwLock<Option<NaiveDate>>,
}

impl Default for SchedulingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SchedulingEngine {
    pub fn new() -> Self {
        Self {
            registry: EquipmentRegistry::new(),
            calendar: BookingCalendar::new(),
            requests: RwLock::new(BTreeMap::new()),
            reference_override: RwLock::new(None),
        }
    }

    /// Rebuilds an engine from persisted parts, recommitting every held
    /// assignment. A snapshot whose assignments conflict is refused rather
    /// than loaded into a calendar that violates the non-overlap invariant.
    pub fn from_parts(
        equipment: Vec<Equipment>,
        requests: Vec<RentalRequest>,
    ) -> SchedulingResult<Self> {
        let engine = Self::new();
        for unit in equipment {
            engine.registry.add(unit)?;
        }
        request_validation::validate_request_collection(&requests)
            .map_err(Self::validation_error)?;
        {
            let mut stored = engine.requests.write();
            for request in requests {
                for assignment in &request.assignments {
                    engine.registry.get(&assignment.equipment_id)?;
                    engine.calendar.commit(
                        &assignment.equipment_id,
                        request.id,
                        assignment.interval,
                    )?;
                }
                stored.insert(request.id, request);
            }
        }
        Ok(engine)
    }

    fn validation_error(err: RequestValidationError) -> SchedulingError {
        SchedulingError::Validation(err.to_string())
    }

    /// The date "now" resolves to for status derivation.
    pub fn reference_date(&self) -> NaiveDate {
        self.reference_override
            .read()
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    pub fn set_reference_date(&self, date: NaiveDate) {
        *self.reference_override.write() = Some(date);
    }

    // --- equipment registry surface ---

    pub fn add_equipment(&self, equipment: Equipment) -> SchedulingResult<()> {
        self.registry.add(equipment)
    }

    /// Status filtering happens after derivation so a unit whose booking has
    /// lapsed matches `available` even if no mutation has touched it since.
    pub fn list_equipment(&self, filter: &EquipmentFilter) -> Vec<Equipment> {
        let mut base = filter.clone();
        let status = base.status.take();
        self.registry
            .list(&base)
            .into_iter()
            .map(|unit| self.overlay_derived_status(unit))
            .filter(|unit| status.map_or(true, |s| unit.status == s))
            .collect()
    }

    pub fn get_equipment(&self, id: &str) -> SchedulingResult<Equipment> {
        Ok(self.overlay_derived_status(self.registry.get(id)?))
    }

    /// The stored status is a cache; barring a manual override the booking
    /// calendar is authoritative, so reads re-derive against the current
    /// reference date.
    fn overlay_derived_status(&self, mut equipment: Equipment) -> Equipment {
        if !equipment.status.is_override() {
            equipment.status = self.derived_status(&equipment.id);
        }
        equipment
    }

    /// Manual status change. Maintenance and OutOfService always win; a
    /// manual Available/OnRent that contradicts an assignment overlapping
    /// the reference date is refused rather than silently overridden.
    pub fn set_equipment_status(
        &self,
        id: &str,
        status: EquipmentStatus,
    ) -> SchedulingResult<()> {
        self.registry.get(id)?;
        if status.is_override() {
            self.registry.set_status(id, status)?;
            tracing::info!(equipment_id = id, status = %status, "equipment status override");
            return Ok(());
        }
        let derived = self.derived_status(id);
        if derived != status {
            return Err(SchedulingError::validation(format!(
                "equipment '{id}' is {derived} per its booking calendar; cannot set {status}"
            )));
        }
        self.registry.set_status(id, status)
    }

    fn derived_status(&self, equipment_id: &str) -> EquipmentStatus {
        if self.calendar.occupied_on(equipment_id, self.reference_date()) {
            EquipmentStatus::OnRent
        } else {
            EquipmentStatus::Available
        }
    }

    /// Re-derives a unit's status from its calendar unless a manual
    /// Maintenance/OutOfService override holds.
    fn refresh_equipment_status(&self, equipment_id: &str) {
        let Ok(equipment) = self.registry.get(equipment_id) else {
            return;
        };
        if equipment.status.is_override() {
            return;
        }
        let derived = self.derived_status(equipment_id);
        if derived != equipment.status {
            let _ = self.registry.set_status(equipment_id, derived);
        }
    }

    // --- request surface ---

    pub fn create_request(&self, request: RentalRequest) -> SchedulingResult<RentalRequest> {
        if request.stage != RequestStage::Submitted {
            return Err(SchedulingError::validation(format!(
                "request {} must be created in the submitted stage",
                request.id
            )));
        }
        request_validation::validate_request(&request).map_err(Self::validation_error)?;
        let mut requests = self.requests.write();
        if requests.contains_key(&request.id) {
            return Err(SchedulingError::validation(format!(
                "request {} already exists",
                request.id
            )));
        }
        requests.insert(request.id, request.clone());
        tracing::info!(request_id = request.id, project = %request.project, "request created");
        Ok(request)
    }

    pub fn next_request_id(&self) -> i32 {
        self.requests
            .read()
            .keys()
            .next_back()
            .map(|id| id + 1)
            .unwrap_or(1)
    }

    pub fn get_request(&self, id: i32) -> SchedulingResult<RentalRequest> {
        self.requests
            .read()
            .get(&id)
            .cloned()
            .ok_or(SchedulingError::RequestNotFound(id))
    }

    pub fn list_requests(&self, stage: Option<RequestStage>) -> Vec<RentalRequest> {
        self.requests
            .read()
            .values()
            .filter(|request| stage.map_or(true, |s| request.stage == s))
            .cloned()
            .collect()
    }

    /// Applies a named lifecycle action. The stage only advances if the
    /// required side effect (releasing held equipment for the terminal
    /// actions) has succeeded; releases themselves cannot fail.
    pub fn transition(
        &self,
        request_id: i32,
        action: TransitionAction,
    ) -> SchedulingResult<RentalRequest> {
        let mut requests = self.requests.write();
        let request = requests
            .get_mut(&request_id)
            .ok_or(SchedulingError::RequestNotFound(request_id))?;

        if !request.stage.permits(action) {
            return Err(SchedulingError::invalid_transition(
                request.stage,
                action.as_str(),
            ));
        }

        let released = match action {
            TransitionAction::Cancel | TransitionAction::Reject | TransitionAction::Complete => {
                let held = std::mem::take(&mut request.assignments);
                for assignment in &held {
                    self.calendar
                        .release(&assignment.equipment_id, request_id);
                }
                held
            }
            _ => Vec::new(),
        };

        let from = request.stage;
        request.stage = action.target();
        let result = request.clone();
        drop(requests);

        for assignment in &released {
            self.refresh_equipment_status(&assignment.equipment_id);
        }
        tracing::info!(
            request_id,
            action = %action,
            from = %from,
            to = %result.stage,
            released = released.len(),
            "request transitioned"
        );
        Ok(result)
    }

    // --- availability ---

    pub fn check_availability(&self, query: &AvailabilityQuery) -> SchedulingResult<Availability> {
        if query.quantity < 1 {
            return Err(SchedulingError::validation(
                "availability check must ask for at least one unit",
            ));
        }

        let filter = EquipmentFilter {
            category: Some(query.category),
            ..EquipmentFilter::default()
        };
        let candidates: Vec<Equipment> = self
            .registry
            .list(&filter)
            .into_iter()
            .filter(|equipment| !equipment.status.is_override())
            .collect();

        // Load counts only bookings within one window-length of the queried
        // range, so a unit busy in a far-off quarter is not penalized.
        let lookaround = Duration::days(query.interval.num_days());
        let near_start = query.interval.start() - lookaround;
        let near_end = query.interval.end() + lookaround;
        let mut eligible: Vec<(Equipment, i64)> = candidates
            .into_par_iter()
            .filter(|equipment| !self.calendar.would_conflict(&equipment.id, &query.interval))
            .map(|equipment| {
                let load = self
                    .calendar
                    .committed_days_between(&equipment.id, near_start, near_end);
                (equipment, load)
            })
            .collect();

        eligible.sort_by_key(|(equipment, load)| rank_key(equipment, query.business_unit, *load));
        let ranked: Vec<Equipment> = eligible
            .into_iter()
            .take(query.quantity as usize)
            .map(|(equipment, _)| equipment)
            .collect();

        Ok(Availability::from_ranked(ranked, query.quantity))
    }

    // --- assignment manager ---

    /// Links a request to a unit for the effective interval. The calendar
    /// commit is the gate: on `ConflictingBooking` the whole operation
    /// aborts with no state change.
    pub fn assign(
        &self,
        request_id: i32,
        equipment_id: &str,
        narrowed: Option<BookingInterval>,
    ) -> SchedulingResult<Assignment> {
        let mut requests = self.requests.write();
        let request = requests
            .get_mut(&request_id)
            .ok_or(SchedulingError::RequestNotFound(request_id))?;

        if !matches!(
            request.stage,
            RequestStage::Approved | RequestStage::PendingInspection
        ) {
            return Err(SchedulingError::invalid_transition(request.stage, "assign"));
        }

        let equipment = self.registry.get(equipment_id)?;
        if equipment.status.is_override() {
            return Err(SchedulingError::validation(format!(
                "equipment '{equipment_id}' is {} and not eligible for assignment",
                equipment.status
            )));
        }
        if equipment.category != request.category {
            return Err(SchedulingError::validation(format!(
                "equipment '{equipment_id}' is a {} but request {request_id} asks for a {}",
                equipment.category, request.category
            )));
        }
        if request.assignment_for(equipment_id).is_some() {
            return Err(SchedulingError::validation(format!(
                "request {request_id} already holds equipment '{equipment_id}'"
            )));
        }
        if request.is_fully_assigned() {
            return Err(SchedulingError::validation(format!(
                "request {request_id} already holds all {} required units",
                request.quantity
            )));
        }

        let effective = match narrowed {
            Some(interval) => {
                if !interval.within(&request.interval) {
                    return Err(SchedulingError::validation(format!(
                        "narrowed interval {interval} lies outside the requested range {}",
                        request.interval
                    )));
                }
                interval
            }
            None => request.interval,
        };

        self.calendar.commit(equipment_id, request_id, effective)?;

        let assignment = Assignment {
            request_id,
            equipment_id: equipment_id.to_string(),
            interval: effective,
        };
        request.assignments.push(assignment.clone());
        if request.stage == RequestStage::Approved && request.is_fully_assigned() {
            request.stage = RequestStage::PendingInspection;
        }
        let stage = request.stage;
        drop(requests);

        self.refresh_equipment_status(equipment_id);
        tracing::info!(
            request_id,
            equipment_id,
            interval = %effective,
            stage = %stage,
            "equipment assigned"
        );
        Ok(assignment)
    }

    /// Removes a request's hold on a unit. Idempotent: releasing a unit the
    /// request does not hold is a no-op. Restores the unit to Available when
    /// nothing else overlaps the reference date and no override holds.
    pub fn release(&self, request_id: i32, equipment_id: &str) -> SchedulingResult<()> {
        let mut requests = self.requests.write();
        let request = requests
            .get_mut(&request_id)
            .ok_or(SchedulingError::RequestNotFound(request_id))?;

        let held = request
            .assignments
            .iter()
            .position(|assignment| assignment.equipment_id == equipment_id);
        match held {
            Some(position) => {
                request.assignments.remove(position);
                self.calendar.release(equipment_id, request_id);
            }
            None => {
                tracing::debug!(request_id, equipment_id, "release of unheld equipment ignored");
                return Ok(());
            }
        }
        drop(requests);

        self.refresh_equipment_status(equipment_id);
        tracing::info!(request_id, equipment_id, "equipment released");
        Ok(())
    }

    // --- read-only projections ---

    pub fn booking_entries(&self, equipment_id: &str) -> Vec<crate::calendar::BookingEntry> {
        self.calendar.intervals_for(equipment_id)
    }

    pub fn timeline(
        &self,
        equipment_ids: &[String],
        granularity: Granularity,
        range: &BookingInterval,
    ) -> SchedulingResult<Vec<EquipmentTimeline>> {
        let mut timelines = Vec::with_capacity(equipment_ids.len());
        for equipment_id in equipment_ids {
            self.registry.get(equipment_id)?;
            let entries = self.calendar.intervals_for(equipment_id);
            timelines.push(EquipmentTimeline {
                equipment_id: equipment_id.clone(),
                buckets: project_entries(&entries, granularity, range),
            });
        }
        Ok(timelines)
    }
}
