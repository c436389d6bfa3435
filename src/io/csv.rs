use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::path::Path;
use tracing::debug;

use crate::table::{Column, DataKind, Table, Value};

/// Read a comma-delimited file with a header row into a `Table`.
///
/// The delimited-text reader tags every column as a string; type
/// classification happens later in the cast stage. Empty cells load as
/// null. A missing file is a fatal error.
#[tracing::instrument(level = "debug", skip(path), fields(path = %path.as_ref().display()))]
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let columns: Vec<Column> = rdr
        .headers()
        .context("reading CSV header row")?
        .iter()
        .map(|name| Column::new(name, DataKind::Str))
        .collect();

    let mut table = Table::new(columns)?;
    for (idx, result) in rdr.records().enumerate() {
        let record =
            result.with_context(|| format!("CSV parse error in {} at record {}", path.display(), idx))?;
        let row = record
            .iter()
            .map(|s| {
                if s.is_empty() {
                    Value::Null
                } else {
                    Value::Str(s.to_string())
                }
            })
            .collect();
        table.push_row(row)?;
    }

    debug!(rows = table.num_rows(), columns = table.num_columns(), "loaded csv");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn reads_headers_and_rows_as_strings() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        writeln!(tmp, "policy,premium,start_date")?;
        writeln!(tmp, "CAR0001,1000,20180101")?;
        writeln!(tmp, "CAR0002,,20190401")?;

        let t = read_csv(tmp.path())?;
        assert_eq!(t.column_names(), vec!["policy", "premium", "start_date"]);
        assert!(t.columns().iter().all(|c| c.kind == DataKind::Str));
        assert_eq!(t.num_rows(), 2);
        assert_eq!(t.get(0, "premium"), Some(&Value::Str("1000".into())));
        // empty cell loads as null, not as an empty string
        assert_eq!(t.get(1, "premium"), Some(&Value::Null));
        Ok(())
    }

    #[test]
    fn missing_file_is_a_fatal_error() {
        let err = read_csv("no/such/file.csv");
        assert!(err.is_err());
    }
}
