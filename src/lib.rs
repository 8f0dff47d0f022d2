pub mod availability;
pub mod calendar;
pub mod engine;
pub mod equipment;
pub mod error;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod interval;
pub mod persistence;
pub mod registry;
pub mod request;
pub(crate) mod request_validation;
pub mod timeline;

pub use availability::{Availability, AvailabilityQuery};
pub use calendar::{BookingCalendar, BookingEntry};
pub use engine::SchedulingEngine;
pub use equipment::{
    BusinessUnit, Equipment, EquipmentCategory, EquipmentFilter, EquipmentStatus,
};
pub use error::{SchedulingError, SchedulingResult};
pub use interval::BookingInterval;
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteFleetStore;
pub use persistence::{
    load_fleet_from_json, load_roster_from_csv, save_fleet_to_json, save_roster_to_csv,
    FleetSnapshot, FleetStore, PersistenceError, PersistenceResult,
};
pub use request::{Assignment, RentalRequest, RequestStage, TransitionAction, Urgency};
pub use timeline::{EquipmentTimeline, Granularity, TimelineBucket};
