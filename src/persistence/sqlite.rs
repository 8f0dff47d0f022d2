use super::{FleetSnapshot, FleetStore, PersistenceResult};
use crate::{Equipment, RentalRequest};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::Mutex;

pub struct SqliteFleetStore {
    connection: Mutex<Connection>,
}

impl SqliteFleetStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS equipment (
                id TEXT PRIMARY KEY,
                equipment_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS requests (
                id INTEGER PRIMARY KEY,
                request_json TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }
}

impl FleetStore for SqliteFleetStore {
    fn save_fleet(&self, snapshot: &FleetSnapshot) -> PersistenceResult<()> {
        super::validate_requests(&snapshot.requests)?;
        let mut conn = self.connection.lock().expect("sqlite mutex poisoned");
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM equipment", [])?;
        tx.execute("DELETE FROM requests", [])?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO equipment (id, equipment_json) VALUES (?1, ?2)")?;
            for equipment in &snapshot.equipment {
                let json = serde_json::to_string(equipment)?;
                stmt.execute(params![equipment.id, json])?;
            }
            let mut stmt = tx.prepare("INSERT INTO requests (id, request_json) VALUES (?1, ?2)")?;
            for request in &snapshot.requests {
                let json = serde_json::to_string(request)?;
                stmt.execute(params![request.id, json])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn load_fleet(&self) -> PersistenceResult<Option<FleetSnapshot>> {
        let conn = self.connection.lock().expect("sqlite mutex poisoned");

        let mut stmt = conn.prepare("SELECT COUNT(*) FROM equipment")?;
        let count: i64 = stmt.query_row([], |row| row.get(0)).optional()?.unwrap_or(0);
        if count == 0 {
            return Ok(None);
        }

        let mut stmt = conn.prepare("SELECT equipment_json FROM equipment ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut equipment = Vec::new();
        for json in rows {
            let unit: Equipment = serde_json::from_str(&json?)?;
            equipment.push(unit);
        }

        let mut stmt = conn.prepare("SELECT request_json FROM requests ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut requests = Vec::new();
        for json in rows {
            let request: RentalRequest = serde_json::from_str(&json?)?;
            requests.push(request);
        }

        super::validate_requests(&requests)?;
        Ok(Some(FleetSnapshot {
            equipment,
            requests,
        }))
    }
}
