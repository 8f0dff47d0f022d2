use chrono::NaiveDate;
use fleet_scheduler::{
    BookingInterval, BusinessUnit, Equipment, EquipmentCategory, EquipmentStatus, RentalRequest,
    RequestStage, SchedulingEngine, SchedulingError, TransitionAction, Urgency,
};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn interval(start: NaiveDate, end: NaiveDate) -> BookingInterval {
    BookingInterval::new(start, end).unwrap()
}

fn seeded_engine() -> SchedulingEngine {
    let engine = SchedulingEngine::new();
    engine.set_reference_date(d(2025, 11, 3));
    engine
        .add_equipment(Equipment::new(
            "EXC-001",
            EquipmentCategory::Excavator,
            BusinessUnit::Construction,
            "North Yard",
        ))
        .unwrap();
    engine
        .create_request(RentalRequest::new(
            1,
            EquipmentCategory::Excavator,
            1,
            BusinessUnit::Construction,
            "Site A",
            interval(d(2025, 11, 1), d(2025, 11, 10)),
            "j.ops",
            Urgency::Routine,
        ))
        .unwrap();
    engine
}

#[test]
fn happy_path_walks_every_stage_in_order() {
    let engine = seeded_engine();
    engine.transition(1, TransitionAction::Approve).unwrap();
    engine.assign(1, "EXC-001", None).unwrap();
    assert_eq!(
        engine.get_request(1).unwrap().stage,
        RequestStage::PendingInspection
    );

    let request = engine
        .transition(1, TransitionAction::PassInspection)
        .unwrap();
    assert_eq!(request.stage, RequestStage::ReadyForDispatch);

    let request = engine.transition(1, TransitionAction::Dispatch).unwrap();
    assert_eq!(request.stage, RequestStage::InTransit);

    let request = engine.transition(1, TransitionAction::Complete).unwrap();
    assert_eq!(request.stage, RequestStage::Completed);
    assert!(request.assignments.is_empty());
}

#[test]
fn skipping_a_stage_is_an_invalid_transition() {
    let engine = seeded_engine();
    let err = engine.transition(1, TransitionAction::Dispatch).unwrap_err();
    assert!(matches!(err, SchedulingError::InvalidTransition { .. }));
    assert_eq!(engine.get_request(1).unwrap().stage, RequestStage::Submitted);
}

#[test]
fn cancel_is_refused_once_equipment_is_in_transit() {
    let engine = seeded_engine();
    engine.transition(1, TransitionAction::Approve).unwrap();
    engine.assign(1, "EXC-001", None).unwrap();
    engine
        .transition(1, TransitionAction::PassInspection)
        .unwrap();
    engine.transition(1, TransitionAction::Dispatch).unwrap();

    let err = engine.transition(1, TransitionAction::Cancel).unwrap_err();
    assert!(matches!(err, SchedulingError::InvalidTransition { .. }));

    // The off-rent path is complete, which also releases the booking.
    engine.transition(1, TransitionAction::Complete).unwrap();
    assert!(engine.booking_entries("EXC-001").is_empty());
}

#[test]
fn cancel_releases_held_equipment_and_frees_the_calendar() {
    let engine = seeded_engine();
    engine.transition(1, TransitionAction::Approve).unwrap();
    engine.assign(1, "EXC-001", None).unwrap();
    assert_eq!(
        engine.get_equipment("EXC-001").unwrap().status,
        EquipmentStatus::OnRent
    );

    let request = engine.transition(1, TransitionAction::Cancel).unwrap();
    assert_eq!(request.stage, RequestStage::Cancelled);
    assert!(request.assignments.is_empty());
    assert!(engine.booking_entries("EXC-001").is_empty());
    assert_eq!(
        engine.get_equipment("EXC-001").unwrap().status,
        EquipmentStatus::Available
    );
}

#[test]
fn reject_is_allowed_through_pending_inspection_only() {
    let engine = seeded_engine();
    engine.transition(1, TransitionAction::Approve).unwrap();
    engine.assign(1, "EXC-001", None).unwrap();
    let request = engine.transition(1, TransitionAction::Reject).unwrap();
    assert_eq!(request.stage, RequestStage::Rejected);
    assert!(engine.booking_entries("EXC-001").is_empty());

    // Terminal stages admit nothing further.
    for action in TransitionAction::variants() {
        let err = engine.transition(1, *action).unwrap_err();
        assert!(matches!(err, SchedulingError::InvalidTransition { .. }));
    }
}

#[test]
fn assignment_requires_an_approved_request() {
    let engine = seeded_engine();
    let err = engine.assign(1, "EXC-001", None).unwrap_err();
    assert!(matches!(err, SchedulingError::InvalidTransition { .. }));
    assert!(engine.booking_entries("EXC-001").is_empty());
}

#[test]
fn transition_on_unknown_request_reports_not_found() {
    let engine = seeded_engine();
    let err = engine.transition(99, TransitionAction::Approve).unwrap_err();
    assert!(matches!(err, SchedulingError::RequestNotFound(99)));
}
