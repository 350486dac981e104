//! Writing rosters and rental histories.
//!
//! Output goes to stdout unless a file is given, so logging is sent to
//! stderr.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use populace_core::Population;
use populace_rental::{ApplicationStatus, RentalHistory};
use serde::{Deserialize, Serialize};

use crate::error::CliError;

/// Columns of the rental history CSV.
pub const HISTORY_HEADER: [&str; 4] = ["individual_id", "application_id", "status", "property_id"];

/// Roster output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One row per individual with a header row.
    #[default]
    Csv,
    /// A JSON array of objects.
    Json,
}

/// Open `path` for writing, or stdout when `None`.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>, CliError> {
    match path {
        Some(path) => Ok(Box::new(BufWriter::new(File::create(path)?))),
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

/// Write the roster in `format`.
pub fn write_population<W: Write>(population: &Population, format: OutputFormat, writer: W) -> Result<(), CliError> {
    match format {
        OutputFormat::Csv => write_population_csv(population, writer),
        OutputFormat::Json => write_population_json(population, writer),
    }
}

/// Header row `id, <dimensions in order>`, then one row per individual.
pub fn write_population_csv<W: Write>(population: &Population, writer: W) -> Result<(), CliError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(population.header())?;
    for row in population.rows() {
        csv_writer.write_record(&row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Pretty-printed array of records with keys in column order.
pub fn write_population_json<W: Write>(population: &Population, mut writer: W) -> Result<(), CliError> {
    let records: Vec<_> = population.records().collect();
    serde_json::to_writer_pretty(&mut writer, &records)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct HistoryRow<'a> {
    individual_id: &'a str,
    application_id: u64,
    status: ApplicationStatus,
    property_id: &'a str,
}

/// One row per application, header always written.
pub fn write_histories_csv<W: Write>(histories: &[RentalHistory], writer: W) -> Result<(), CliError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(HISTORY_HEADER)?;
    for history in histories {
        for application in &history.applications {
            csv_writer.serialize(HistoryRow {
                individual_id: &history.individual_id,
                application_id: application.application_id,
                status: application.status,
                property_id: &application.property_id,
            })?;
        }
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use populace_core::{EstimateTable, OrderStrategy, generate_population};
    use populace_rental::Application;

    use super::*;

    fn population(size: u32) -> Population {
        let table = EstimateTable::from_json_str(
            r#"{"has_pet": {"yes": {"age_group": {"young": 0.8, "": 0.2}},
                            "no": {"age_group": {"young": 0.2, "": 0.8}}},
                "age_group": {"young": 0.6, "old": 0.4}}"#,
        )
        .unwrap();
        generate_population(&table, size, OrderStrategy::default()).unwrap()
    }

    #[test]
    fn csv_has_header_in_dimension_order() {
        let mut buffer = Vec::new();
        write_population(&population(3), OutputFormat::Csv, &mut buffer).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(
            text,
            "id,age_group,has_pet\n1,young,yes\n2,old,no\n3,young,yes\n"
        );
    }

    #[test]
    fn empty_population_still_writes_header() {
        let mut buffer = Vec::new();
        write_population_csv(&population(0), &mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "id,age_group,has_pet\n");
    }

    #[test]
    fn json_output_is_an_array_of_records() {
        let mut buffer = Vec::new();
        write_population(&population(2), OutputFormat::Json, &mut buffer).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        let records = value.as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["id"], 2);
        assert_eq!(records[1]["age_group"], "old");
        assert_eq!(records[1]["has_pet"], "no");
    }

    #[test]
    fn histories_flatten_to_one_row_per_application() {
        let histories = vec![
            RentalHistory {
                individual_id: String::from("1"),
                applications: vec![
                    Application {
                        application_id: 1,
                        status: ApplicationStatus::Ignored,
                        property_id: String::from("p2"),
                    },
                    Application {
                        application_id: 2,
                        status: ApplicationStatus::Approved,
                        property_id: String::from("p1"),
                    },
                ],
            },
            RentalHistory {
                individual_id: String::from("2"),
                applications: Vec::new(),
            },
        ];

        let mut buffer = Vec::new();
        write_histories_csv(&histories, &mut buffer).unwrap();
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "individual_id,application_id,status,property_id\n1,1,I,p2\n1,2,A,p1\n"
        );
    }
}
