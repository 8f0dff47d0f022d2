use chrono::NaiveDate;
use fleet_scheduler::{
    BookingInterval, BusinessUnit, Equipment, EquipmentCategory, Granularity, RentalRequest,
    SchedulingEngine, SchedulingError, TransitionAction, Urgency,
};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn interval(start: NaiveDate, end: NaiveDate) -> BookingInterval {
    BookingInterval::new(start, end).unwrap()
}

fn engine_with_booking() -> SchedulingEngine {
    let engine = SchedulingEngine::new();
    engine.set_reference_date(d(2025, 10, 20));
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
            interval(d(2025, 11, 3), d(2025, 11, 12)),
            "j.ops",
            Urgency::Routine,
        ))
        .unwrap();
    engine.transition(1, TransitionAction::Approve).unwrap();
    engine.assign(1, "EXC-001", None).unwrap();
    engine
}

#[test]
fn weekly_timeline_marks_booked_weeks_with_the_request() {
    let engine = engine_with_booking();
    let range = interval(d(2025, 11, 3), d(2025, 11, 24));
    let timelines = engine
        .timeline(&["EXC-001".to_string()], Granularity::Week, &range)
        .unwrap();

    assert_eq!(timelines.len(), 1);
    let buckets = &timelines[0].buckets;
    assert_eq!(buckets.len(), 3);
    // Nov 3 and Nov 10 weeks overlap the Nov 3-12 booking; Nov 17 does not.
    assert!(buckets[0].busy);
    assert_eq!(buckets[0].request_id, Some(1));
    assert!(buckets[1].busy);
    assert!(!buckets[2].busy);
    assert_eq!(buckets[2].request_id, None);
}

#[test]
fn monthly_timeline_spans_multiple_units() {
    let engine = engine_with_booking();
    engine
        .add_equipment(Equipment::new(
            "EXC-002",
            EquipmentCategory::Excavator,
            BusinessUnit::Mining,
            "Pit 4",
        ))
        .unwrap();

    let range = interval(d(2025, 11, 1), d(2025, 12, 1));
    let timelines = engine
        .timeline(
            &["EXC-001".to_string(), "EXC-002".to_string()],
            Granularity::Month,
            &range,
        )
        .unwrap();

    assert_eq!(timelines.len(), 2);
    assert!(timelines[0].buckets[0].busy);
    assert!(!timelines[1].buckets[0].busy);
}

#[test]
fn timeline_for_unknown_equipment_is_not_found() {
    let engine = engine_with_booking();
    let range = interval(d(2025, 11, 1), d(2025, 12, 1));
    let err = engine
        .timeline(&["EXC-404".to_string()], Granularity::Week, &range)
        .unwrap_err();
    assert!(matches!(err, SchedulingError::EquipmentNotFound(_)));
}
