//! Reading individual and property CSV files.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use populace_core::ID_COLUMN;
use populace_rental::Property;

use crate::error::CliError;

type Row = BTreeMap<String, String>;

/// Read the `id` column of an individuals CSV, in file order.
pub fn read_individual_ids(path: &Path) -> Result<Vec<String>, CliError> {
    let rows = read_rows(csv::Reader::from_path(path)?, path)?;
    Ok(rows
        .into_iter()
        .filter_map(|mut row| row.remove(ID_COLUMN))
        .collect())
}

/// Read a properties CSV; every column other than `id` becomes an attribute.
pub fn read_properties(path: &Path) -> Result<Vec<Property>, CliError> {
    let rows = read_rows(csv::Reader::from_path(path)?, path)?;
    Ok(rows
        .into_iter()
        .filter_map(|mut row| {
            let id = row.remove(ID_COLUMN)?;
            Some(Property::with_attributes(id, row))
        })
        .collect())
}

/// Read every row as a column map, requiring an `id` column.
fn read_rows<R: Read>(mut reader: csv::Reader<R>, path: &Path) -> Result<Vec<Row>, CliError> {
    if !reader.headers()?.iter().any(|h| h == ID_COLUMN) {
        return Err(CliError::MissingColumn {
            path: path.to_path_buf(),
            column: ID_COLUMN,
        });
    }
    let mut rows = Vec::new();
    for record in reader.deserialize::<Row>() {
        rows.push(record?);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn temp_csv(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "populace-input-{}-{name}.csv",
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn reads_ids_from_population_output() {
        let path = temp_csv("individuals", "id,age_group,has_pet\n1,young,yes\n2,old,no\n");
        let ids = read_individual_ids(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn properties_keep_extra_columns() {
        let path = temp_csv("properties", "suburb,id,rent\nFitzroy,p1,450\nCarlton,p2,520\n");
        let properties = read_properties(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(properties.len(), 2);
        let first = properties.first().unwrap();
        assert_eq!(first.id(), "p1");
        assert_eq!(first.attribute("suburb"), Some("Fitzroy"));
        assert_eq!(first.attribute("rent"), Some("450"));
        assert_eq!(first.attribute("id"), None);
    }

    #[test]
    fn missing_id_column_is_rejected() {
        let path = temp_csv("no-id", "name,rent\nA,1\n");
        let err = read_properties(&path).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert!(matches!(err, CliError::MissingColumn { column: "id", .. }));
    }

    #[test]
    fn missing_file_is_a_csv_error() {
        let err = read_individual_ids(Path::new("/nonexistent/individuals.csv")).unwrap_err();
        assert!(matches!(err, CliError::Csv { .. }));
    }
}
