use chrono::NaiveDate;
use fleet_scheduler::{
    BookingInterval, BusinessUnit, Equipment, EquipmentCategory, RentalRequest, RequestStage,
    SchedulingEngine, SchedulingError, TransitionAction, Urgency,
};
use std::sync::Arc;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn november(start: u32, end: u32) -> BookingInterval {
    BookingInterval::new(d(2025, 11, start), d(2025, 11, end)).unwrap()
}

fn request(id: i32, quantity: u32, interval: BookingInterval) -> RentalRequest {
    RentalRequest::new(
        id,
        EquipmentCategory::Excavator,
        quantity,
        BusinessUnit::Construction,
        "Site A",
        interval,
        "j.ops",
        Urgency::Routine,
    )
}

fn engine_with_units(ids: &[&str]) -> SchedulingEngine {
    let engine = SchedulingEngine::new();
    engine.set_reference_date(d(2025, 10, 20));
    for id in ids {
        engine
            .add_equipment(Equipment::new(
                *id,
                EquipmentCategory::Excavator,
                BusinessUnit::Construction,
                "North Yard",
            ))
            .unwrap();
    }
    engine
}

#[test]
fn multi_unit_request_advances_only_when_fully_assigned() {
    let engine = engine_with_units(&["EXC-001", "EXC-002"]);
    engine.create_request(request(1, 2, november(1, 10))).unwrap();
    engine.transition(1, TransitionAction::Approve).unwrap();

    engine.assign(1, "EXC-001", None).unwrap();
    assert_eq!(engine.get_request(1).unwrap().stage, RequestStage::Approved);

    engine.assign(1, "EXC-002", None).unwrap();
    let full = engine.get_request(1).unwrap();
    assert_eq!(full.stage, RequestStage::PendingInspection);
    assert_eq!(full.assignments.len(), 2);
}

#[test]
fn a_narrowed_interval_must_sit_inside_the_requested_range() {
    let engine = engine_with_units(&["EXC-001"]);
    engine.create_request(request(1, 1, november(1, 10))).unwrap();
    engine.transition(1, TransitionAction::Approve).unwrap();

    let err = engine
        .assign(1, "EXC-001", Some(november(8, 15)))
        .unwrap_err();
    assert!(matches!(err, SchedulingError::Validation(_)));
    assert!(engine.booking_entries("EXC-001").is_empty());

    let assignment = engine
        .assign(1, "EXC-001", Some(november(2, 6)))
        .unwrap();
    assert_eq!(assignment.interval, november(2, 6));
}

#[test]
fn category_mismatch_and_double_hold_are_rejected() {
    let engine = engine_with_units(&["EXC-001"]);
    engine
        .add_equipment(Equipment::new(
            "CRN-001",
            EquipmentCategory::Crane,
            BusinessUnit::Construction,
            "North Yard",
        ))
        .unwrap();
    engine.create_request(request(1, 2, november(1, 10))).unwrap();
    engine.transition(1, TransitionAction::Approve).unwrap();

    let err = engine.assign(1, "CRN-001", None).unwrap_err();
    assert!(matches!(err, SchedulingError::Validation(_)));

    engine.assign(1, "EXC-001", None).unwrap();
    let err = engine.assign(1, "EXC-001", None).unwrap_err();
    assert!(matches!(err, SchedulingError::Validation(_)));
}

#[test]
fn release_is_idempotent_and_reopens_the_window() {
    let engine = engine_with_units(&["EXC-001"]);
    engine.set_reference_date(d(2025, 11, 3));
    engine.create_request(request(1, 1, november(1, 10))).unwrap();
    engine.transition(1, TransitionAction::Approve).unwrap();
    engine.assign(1, "EXC-001", None).unwrap();

    engine.release(1, "EXC-001").unwrap();
    assert!(engine.booking_entries("EXC-001").is_empty());
    // Releasing again is a no-op, not an error.
    engine.release(1, "EXC-001").unwrap();

    // The freed window can be booked by another request.
    engine.create_request(request(2, 1, november(1, 10))).unwrap();
    engine.transition(2, TransitionAction::Approve).unwrap();
    engine.assign(2, "EXC-001", None).unwrap();
}

#[test]
fn concurrent_assigns_for_one_unit_admit_exactly_one_winner() {
    let engine = Arc::new(engine_with_units(&["EXC-001"]));
    for id in 1..=8 {
        engine.create_request(request(id, 1, november(1, 10))).unwrap();
        engine.transition(id, TransitionAction::Approve).unwrap();
    }

    let handles: Vec<_> = (1..=8)
        .map(|id| {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || engine.assign(id, "EXC-001", None).is_ok())
        })
        .collect();
    let wins = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .filter(|&won| won)
        .count();

    assert_eq!(wins, 1);
    assert_eq!(engine.booking_entries("EXC-001").len(), 1);
}

#[test]
fn concurrent_assign_and_release_preserve_non_overlap() {
    let engine = Arc::new(engine_with_units(&["EXC-001", "EXC-002"]));
    // Staggered one-day windows so several can coexist on a unit.
    for id in 1..=10 {
        let day = id as u32;
        engine
            .create_request(request(id, 1, november(day, day + 1)))
            .unwrap();
        engine.transition(id, TransitionAction::Approve).unwrap();
    }

    let handles: Vec<_> = (1..=10)
        .map(|id| {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || {
                for unit in ["EXC-001", "EXC-002"] {
                    if engine.assign(id, unit, None).is_ok() {
                        if id % 3 == 0 {
                            engine.release(id, unit).unwrap();
                        }
                        break;
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for unit in ["EXC-001", "EXC-002"] {
        let entries = engine.booking_entries(unit);
        for (i, a) in entries.iter().enumerate() {
            for b in entries.iter().skip(i + 1) {
                assert!(
                    !a.interval.overlaps(&b.interval),
                    "unit {unit} holds overlapping entries {} and {}",
                    a.interval,
                    b.interval
                );
            }
        }
    }
}
