use crate::error::{SchedulingError, SchedulingResult};
use crate::interval::BookingInterval;
use chrono::NaiveDate;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// One committed interval on an equipment unit's lane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingEntry {
    pub request_id: i32,
    pub interval: BookingInterval,
}

/// Per-equipment store of committed, non-overlapping intervals.
///
/// Each equipment id owns a lane guarded by its own mutex, so commits for
/// different units proceed in parallel while two commits for the same unit
/// serialize: exactly one wins, the other observes `ConflictingBooking`.
/// Reads clone the lane under its lock and therefore always see a fully
/// committed state.
#[derive(Debug, Default)]
pub struct BookingCalendar {
    lanes: RwLock<HashMap<String, Arc<Mutex<Vec<BookingEntry>>>>>,
}

impl BookingCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    fn lane(&self, equipment_id: &str) -> Arc<Mutex<Vec<BookingEntry>>> {
        if let Some(lane) = self.lanes.read().get(equipment_id) {
            return lane.clone();
        }
        let mut lanes = self.lanes.write();
        lanes
            .entry(equipment_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Vec::new())))
            .clone()
    }

    /// Ordered snapshot of the committed intervals for one unit.
    pub fn intervals_for(&self, equipment_id: &str) -> Vec<BookingEntry> {
        match self.lanes.read().get(equipment_id) {
            Some(lane) => lane.lock().clone(),
            None => Vec::new(),
        }
    }

    /// Advisory overlap test; the authoritative check happens inside
    /// [`BookingCalendar::commit`] under the lane lock.
    pub fn would_conflict(&self, equipment_id: &str, interval: &BookingInterval) -> bool {
        self.intervals_for(equipment_id)
            .iter()
            .any(|entry| entry.interval.overlaps(interval))
    }

    /// Check-then-insert, atomic per equipment id.
    pub fn commit(
        &self,
        equipment_id: &str,
        request_id: i32,
        interval: BookingInterval,
    ) -> SchedulingResult<()> {
        let lane = self.lane(equipment_id);
        let mut entries = lane.lock();
        if entries.iter().any(|entry| entry.interval.overlaps(&interval)) {
            return Err(SchedulingError::ConflictingBooking {
                equipment_id: equipment_id.to_string(),
                requested: interval,
            });
        }
        let position = entries
            .iter()
            .position(|entry| interval.start() < entry.interval.start())
            .unwrap_or(entries.len());
        entries.insert(
            position,
            BookingEntry {
                request_id,
                interval,
            },
        );
        Ok(())
    }

    /// Removes the entry a request holds on a unit, returning it if present.
    pub fn release(&self, equipment_id: &str, request_id: i32) -> Option<BookingEntry> {
        let lane = self.lane(equipment_id);
        let mut entries = lane.lock();
        let position = entries
            .iter()
            .position(|entry| entry.request_id == request_id)?;
        Some(entries.remove(position))
    }

    /// True when any committed interval on the unit covers `date`.
    pub fn occupied_on(&self, equipment_id: &str, date: NaiveDate) -> bool {
        self.intervals_for(equipment_id)
            .iter()
            .any(|entry| entry.interval.contains_date(date))
    }

    /// Committed days falling inside `[from, to)`; the availability ranking
    /// uses this as its soonest-available proxy, weighing only bookings near
    /// the queried window.
    pub fn committed_days_between(&self, equipment_id: &str, from: NaiveDate, to: NaiveDate) -> i64 {
        self.intervals_for(equipment_id)
            .iter()
            .map(|entry| {
                let start = entry.interval.start().max(from);
                let end = entry.interval.end().min(to);
                (end - start).num_days().max(0)
            })
            .sum()
    }

    pub fn equipment_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.lanes.read().keys().cloned().collect();
        ids.sort();
        ids
    }
}
