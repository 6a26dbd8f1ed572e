//! Roster normalization: person table, position table and their left join.

pub mod export;

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::path::Path;

use csv::StringRecord;
use thiserror::Error;

/// Source column names, after header normalization.
pub const COL_ID: &str = "id";
pub const COL_NOMBRES: &str = "nombres";
pub const COL_APELLIDOS: &str = "apellidos";
pub const COL_CARGO: &str = "cargo";

/// Columns of the joined table. `id` and `nombre` exist on both sides of the
/// join, so they carry `_x` (person) and `_y` (position) suffixes.
pub const JOINED_COLUMNS: [&str; 6] = [
    "id_x",
    "nombre_x",
    "apellido",
    "cargo_completo",
    "id_y",
    "nombre_y",
];

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("failed to read roster '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed roster CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing column '{0}' in roster header")]
    MissingColumn(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonRecord {
    pub id: String,
    pub nombre: String,
    pub apellido: String,
    /// `None` when the source cell is empty.
    pub cargo_completo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionRecord {
    pub id: u32,
    pub nombre: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedRecord {
    pub person: PersonRecord,
    pub position_id: Option<u32>,
    pub position_nombre: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Roster {
    pub persons: Vec<PersonRecord>,
    pub positions: Vec<PositionRecord>,
    pub joined: Vec<JoinedRecord>,
}

/// Trim, lowercase and drop a leading BOM from a header name.
pub fn normalize_header(name: &str) -> String {
    name.trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// Read a roster CSV and project it into person records.
pub fn read_roster(path: &Path) -> Result<Vec<PersonRecord>, RosterError> {
    let file = File::open(path).map_err(|source| RosterError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(file);

    let headers = reader.headers()?.clone();
    let records = reader.records().collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(rows = records.len(), "roster rows read");
    select_columns(&headers, &records)
}

/// Select and rename the four roster columns. Does not touch the input.
pub fn select_columns(
    headers: &StringRecord,
    records: &[StringRecord],
) -> Result<Vec<PersonRecord>, RosterError> {
    let index: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| (normalize_header(h), i))
        .collect();
    let column = |name: &str| {
        index
            .get(name)
            .copied()
            .ok_or_else(|| RosterError::MissingColumn(name.to_string()))
    };
    let (id, nombres, apellidos, cargo) = (
        column(COL_ID)?,
        column(COL_NOMBRES)?,
        column(COL_APELLIDOS)?,
        column(COL_CARGO)?,
    );

    let cell = |r: &StringRecord, i: usize| r.get(i).unwrap_or_default().to_string();
    Ok(records
        .iter()
        .map(|r| {
            let title = cell(r, cargo);
            PersonRecord {
                id: cell(r, id),
                nombre: cell(r, nombres),
                apellido: cell(r, apellidos),
                cargo_completo: if title.is_empty() { None } else { Some(title) },
            }
        })
        .collect())
}

/// Distinct titles in codepoint order, numbered from 1.
pub fn derive_positions(persons: &[PersonRecord]) -> Vec<PositionRecord> {
    let titles: BTreeSet<&str> = persons
        .iter()
        .filter_map(|p| p.cargo_completo.as_deref())
        .collect();
    titles
        .into_iter()
        .zip(1u32..)
        .map(|(nombre, id)| PositionRecord { id, nombre: nombre.to_string() })
        .collect()
}

/// Left join of persons to positions on exact title equality.
pub fn join_positions(persons: &[PersonRecord], positions: &[PositionRecord]) -> Vec<JoinedRecord> {
    let by_name: HashMap<&str, &PositionRecord> =
        positions.iter().map(|p| (p.nombre.as_str(), p)).collect();
    persons
        .iter()
        .map(|person| {
            let hit = person
                .cargo_completo
                .as_deref()
                .and_then(|t| by_name.get(t));
            JoinedRecord {
                person: person.clone(),
                position_id: hit.map(|p| p.id),
                position_nombre: hit.map(|p| p.nombre.clone()),
            }
        })
        .collect()
}

pub fn normalize(persons: Vec<PersonRecord>) -> Roster {
    let positions = derive_positions(&persons);
    let joined = join_positions(&persons, &positions);
    Roster { persons, positions, joined }
}

impl JoinedRecord {
    /// Row values in `JOINED_COLUMNS` order; missing values are empty.
    pub fn to_row(&self) -> [String; 6] {
        [
            self.person.id.clone(),
            self.person.nombre.clone(),
            self.person.apellido.clone(),
            self.person.cargo_completo.clone().unwrap_or_default(),
            self.position_id.map(|id| id.to_string()).unwrap_or_default(),
            self.position_nombre.clone().unwrap_or_default(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(id: &str, cargo: &str) -> PersonRecord {
        PersonRecord {
            id: id.into(),
            nombre: format!("N{id}"),
            apellido: format!("A{id}"),
            cargo_completo: if cargo.is_empty() { None } else { Some(cargo.into()) },
        }
    }

    fn record(fields: &[&str]) -> StringRecord {
        StringRecord::from(fields.to_vec())
    }

    #[test]
    fn positions_are_distinct_and_sorted() {
        let persons = vec![person("1", "Técnico"), person("2", "Supervisor"), person("3", "Técnico")];
        let positions = derive_positions(&persons);
        assert_eq!(
            positions,
            vec![
                PositionRecord { id: 1, nombre: "Supervisor".into() },
                PositionRecord { id: 2, nombre: "Técnico".into() },
            ]
        );
    }

    #[test]
    fn sort_is_codepoint_order() {
        // Uppercase sorts before lowercase, accented letters after ASCII.
        let persons = vec![person("1", "álgebra"), person("2", "beta"), person("3", "Zeta")];
        let names: Vec<_> = derive_positions(&persons).into_iter().map(|p| p.nombre).collect();
        assert_eq!(names, vec!["Zeta", "beta", "álgebra"]);
    }

    #[test]
    fn join_preserves_cardinality_and_ids() {
        let persons = vec![
            person("10", "Jefe"),
            person("11", "Auxiliar"),
            person("12", "Jefe"),
            person("13", "Técnico"),
        ];
        let roster = normalize(persons.clone());
        assert_eq!(roster.joined.len(), persons.len());
        let ids: HashMap<_, _> = roster.positions.iter().map(|p| (p.nombre.clone(), p.id)).collect();
        for (row, src) in roster.joined.iter().zip(&persons) {
            assert_eq!(&row.person, src);
            let title = src.cargo_completo.clone().unwrap();
            assert_eq!(row.position_id, Some(ids[&title]));
            assert_eq!(row.position_nombre.as_deref(), Some(title.as_str()));
        }
    }

    #[test]
    fn normalize_is_deterministic() {
        let persons = vec![person("1", "B"), person("2", "A"), person("3", "C"), person("4", "A")];
        let first = normalize(persons.clone());
        let second = normalize(persons);
        assert_eq!(first.positions, second.positions);
        assert_eq!(first.joined, second.joined);
    }

    #[test]
    fn blank_title_joins_to_nothing() {
        let roster = normalize(vec![person("1", ""), person("2", "Jefe")]);
        assert_eq!(roster.positions.len(), 1);
        assert_eq!(roster.joined[0].position_id, None);
        assert_eq!(roster.joined[0].to_row()[4], "");
        assert_eq!(roster.joined[1].position_id, Some(1));
    }

    #[test]
    fn headers_are_trimmed_and_lowercased() {
        let headers = record(&["\u{feff} ID ", "Nombres", " APELLIDOS", "Cargo ", "Extra"]);
        let rows = vec![record(&["7", "Ana", "Paz", "Jefe de Turno", "x"])];
        let persons = select_columns(&headers, &rows).unwrap();
        assert_eq!(
            persons,
            vec![PersonRecord {
                id: "7".into(),
                nombre: "Ana".into(),
                apellido: "Paz".into(),
                cargo_completo: Some("Jefe de Turno".into()),
            }]
        );
    }

    #[test]
    fn whitespace_title_is_a_position_of_its_own() {
        let headers = record(&["id", "nombres", "apellidos", "cargo"]);
        let rows = vec![record(&["1", "a", "b", "  "]), record(&["2", "c", "d", "Jefe"])];
        let roster = normalize(select_columns(&headers, &rows).unwrap());
        assert_eq!(
            roster.positions,
            vec![
                PositionRecord { id: 1, nombre: "  ".into() },
                PositionRecord { id: 2, nombre: "Jefe".into() },
            ]
        );
        assert_eq!(roster.joined[0].position_id, Some(1));
        assert_eq!(roster.joined[1].position_id, Some(2));
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let headers = record(&["id", "nombres", "apellidos"]);
        let err = select_columns(&headers, &[]).unwrap_err();
        assert!(matches!(err, RosterError::MissingColumn(ref c) if c == "cargo"), "{err}");
    }

    #[test]
    fn read_roster_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.csv");
        std::fs::write(
            &path,
            "Id,Nombres,Apellidos,Cargo,Sector\n1,Ana,Paz,Técnico,CNSE\n2,Luis,Gil,Supervisor,CNSE\n",
        )
        .unwrap();
        let persons = read_roster(&path).unwrap();
        assert_eq!(persons.len(), 2);
        assert_eq!(persons[1].cargo_completo.as_deref(), Some("Supervisor"));
    }

    #[test]
    fn read_roster_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_roster(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, RosterError::Io { .. }));
    }

    #[test]
    fn ragged_row_is_a_csv_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.csv");
        std::fs::write(&path, "id,nombres,apellidos,cargo\n1,Ana,Paz\n").unwrap();
        assert!(matches!(read_roster(&path), Err(RosterError::Csv(_))));
    }
}
