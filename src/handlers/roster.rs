//! Roster handler: read, normalize, report and optionally export.

use std::path::Path;

use anyhow::{Context, Result};

use crate::printer::{status, Tone};
use crate::roster::{self, export, JOINED_COLUMNS};

pub struct RosterHandler;

impl RosterHandler {
    pub fn run(csv: &Path, out_dir: Option<&Path>) -> Result<()> {
        let persons = roster::read_roster(csv)
            .with_context(|| format!("roster normalization failed for {}", csv.display()))?;
        let roster = roster::normalize(persons);
        tracing::info!(
            persons = roster.persons.len(),
            positions = roster.positions.len(),
            "roster normalized"
        );

        println!("columns after join: {:?}", JOINED_COLUMNS);
        status(
            Tone::Info,
            &format!(
                "{} persons, {} distinct positions",
                roster.persons.len(),
                roster.positions.len()
            ),
        );

        if let Some(dir) = out_dir {
            for path in export::write_tables(&roster, dir)? {
                status(Tone::Success, &format!("wrote {}", path.display()));
            }
        }
        Ok(())
    }
}
