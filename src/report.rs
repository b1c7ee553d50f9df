//! Output of a finished run: a per-day CSV table and a short final-day summary.

use crate::compartment::Compartment;
use crate::error::SeirdError;
use crate::simulator::Trajectory;
use csv::Writer;
use std::ffi::OsStr;
use std::fmt::{self, Display};
use std::fs::{create_dir_all, File};
use std::io::Write;
use std::path::Path;

/// Writes `day,S,E,I,R,D` (plus `P` when the model has vital rates), one row per simulated day.
///
/// # Errors
/// `CsvError` if a record cannot be written, `IoError` if the final flush fails.
pub fn write_csv<W: Write>(trajectory: &Trajectory, writer: W) -> Result<(), SeirdError> {
    let mut writer = Writer::from_writer(writer);

    let mut header = vec!["day".to_string()];
    header.extend(trajectory.compartments.iter().map(ToString::to_string));
    writer.write_record(&header)?;

    for (day, state) in trajectory.days.iter().zip(&trajectory.states) {
        let mut record = vec![day.to_string()];
        record.extend(
            trajectory
                .compartments
                .iter()
                .map(|compartment| state.get(*compartment).to_string()),
        );
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Creates `path` (and any missing parent directories) and writes the trajectory to it.
///
/// # Errors
/// `InvalidParameter` if `path` does not end in `.csv`, otherwise the errors of [`write_csv`].
pub fn write_csv_file(trajectory: &Trajectory, path: &Path) -> Result<(), SeirdError> {
    if path.extension().and_then(OsStr::to_str) != Some("csv") {
        return Err(SeirdError::invalid(format!(
            "report output files must be CSVs, got {}",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    write_csv(trajectory, File::create(path)?)
}

/// Rounded final-day counts of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub days_to_simulate: usize,
    /// Rounded count per populated compartment, in state order.
    pub counts: Vec<(Compartment, f64)>,
    pub population_size: f64,
    pub activation_day: u32,
}

impl Summary {
    /// Returns `None` for an empty trajectory.
    #[must_use]
    pub fn from_trajectory(trajectory: &Trajectory) -> Option<Self> {
        let last = trajectory.last()?;
        Some(Summary {
            days_to_simulate: trajectory.len(),
            counts: trajectory
                .compartments
                .iter()
                .map(|compartment| (*compartment, last.get(*compartment).round()))
                .collect(),
            population_size: trajectory.population_size,
            activation_day: trajectory.activation_day,
        })
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "Countermeasures in effect from day: {}",
            self.activation_day
        )?;
        for (compartment, count) in &self.counts {
            writeln!(
                f,
                "Number of {} at Day {}: {count}",
                compartment.label(),
                self.days_to_simulate
            )?;
        }
        write!(
            f,
            "Total Number of Population: {}",
            self.population_size.round()
        )
    }
}
