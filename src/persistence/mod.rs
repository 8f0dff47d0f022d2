use crate::request_validation;
use crate::{RentalRequest, SchedulingError};
use serde_json::Error as SerdeJsonError;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum PersistenceError {
    Serialization(SerdeJsonError),
    Io(io::Error),
    #[cfg(feature = "sqlite")]
    Sqlite(rusqlite::Error),
    Csv(csv::Error),
    InvalidData(String),
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::Serialization(err) => write!(f, "serialization error: {err}"),
            PersistenceError::Io(err) => write!(f, "io error: {err}"),
            #[cfg(feature = "sqlite")]
            PersistenceError::Sqlite(err) => write!(f, "sqlite error: {err}"),
            PersistenceError::Csv(err) => write!(f, "csv error: {err}"),
            PersistenceError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<SerdeJsonError> for PersistenceError {
    fn from(value: SerdeJsonError) -> Self {
        Self::Serialization(value)
    }
}

impl From<io::Error> for PersistenceError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<csv::Error> for PersistenceError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<SchedulingError> for PersistenceError {
    fn from(value: SchedulingError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

pub trait FleetStore {
    fn save_fleet(&self, snapshot: &file::FleetSnapshot) -> PersistenceResult<()>;
    fn load_fleet(&self) -> PersistenceResult<Option<file::FleetSnapshot>>;
}

pub fn validate_requests(requests: &[RentalRequest]) -> PersistenceResult<()> {
    request_validation::validate_request_collection(requests)
        .map_err(|err| PersistenceError::InvalidData(err.to_string()))
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    load_fleet_from_json, load_roster_from_csv, save_fleet_to_json, save_roster_to_csv,
    FleetSnapshot,
};
