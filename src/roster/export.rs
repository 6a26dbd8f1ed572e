//! CSV export of the normalized roster tables.

use std::fs;
use std::path::{Path, PathBuf};

use super::{Roster, RosterError, JOINED_COLUMNS};

pub const PERSONAL_FILE: &str = "personal.csv";
pub const PUESTOS_FILE: &str = "puestos.csv";
pub const JOINED_FILE: &str = "personal_puestos.csv";

/// Write the person, position and joined tables into `dir`.
///
/// The person table references positions through `puesto_id`; a person with
/// no title gets an empty cell. Returns the paths written, in that order.
pub fn write_tables(roster: &Roster, dir: &Path) -> Result<Vec<PathBuf>, RosterError> {
    fs::create_dir_all(dir).map_err(|source| RosterError::Io {
        path: dir.display().to_string(),
        source,
    })?;

    let personal = dir.join(PERSONAL_FILE);
    let mut w = csv::Writer::from_path(&personal)?;
    w.write_record(["id", "nombre", "apellido", "puesto_id"])?;
    for row in &roster.joined {
        let puesto_id = row.position_id.map(|id| id.to_string()).unwrap_or_default();
        w.write_record([
            row.person.id.as_str(),
            row.person.nombre.as_str(),
            row.person.apellido.as_str(),
            puesto_id.as_str(),
        ])?;
    }
    w.flush().map_err(|source| RosterError::Io {
        path: personal.display().to_string(),
        source,
    })?;

    let puestos = dir.join(PUESTOS_FILE);
    let mut w = csv::Writer::from_path(&puestos)?;
    w.write_record(["id", "nombre"])?;
    for p in &roster.positions {
        w.write_record([p.id.to_string(), p.nombre.clone()])?;
    }
    w.flush().map_err(|source| RosterError::Io {
        path: puestos.display().to_string(),
        source,
    })?;

    let joined = dir.join(JOINED_FILE);
    let mut w = csv::Writer::from_path(&joined)?;
    w.write_record(JOINED_COLUMNS)?;
    for row in &roster.joined {
        w.write_record(row.to_row())?;
    }
    w.flush().map_err(|source| RosterError::Io {
        path: joined.display().to_string(),
        source,
    })?;

    Ok(vec![personal, puestos, joined])
}
