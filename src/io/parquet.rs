use anyhow::{anyhow, bail, Context, Result};
use arrow::array::{Array, ArrayRef, Date32Array, Date32Builder, Int64Array, Int64Builder, StringArray, StringBuilder};
use arrow::datatypes::Date32Type;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{BrotliLevel, Compression};
use parquet::file::properties::WriterProperties;
use rayon::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::schema::arrow::{build_arrow_schema, from_arrow_type};
use crate::table::{Column, DataKind, Table, Value};

/// Zero-byte marker written after all parts land, for consumers polling for
/// completion.
pub const SUCCESS_MARKER: &str = "_SUCCESS";

/// Write `table` to `dir` as `parts` Parquet files plus a `_SUCCESS` marker.
///
/// The table is split into contiguous slices, so row order is preserved
/// within each part and part filenames (`part-00000.parquet`, ...) preserve
/// table identity across parts. Parts are written in parallel, each to a
/// `.tmp` path first and renamed once complete.
#[tracing::instrument(level = "info", skip(table, dir), fields(dir = %dir.as_ref().display(), parts))]
pub fn write_parquet<P: AsRef<Path>>(table: &Table, dir: P, parts: usize) -> Result<()> {
    anyhow::ensure!(parts > 0, "part count must be at least 1");
    let dir = dir.as_ref();
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let chunk = table.num_rows().div_ceil(parts);
    (0..parts)
        .into_par_iter()
        .try_for_each(|i| -> Result<()> {
            let slice = table.slice(i * chunk, chunk);
            let path = dir.join(format!("part-{:05}.parquet", i));
            write_part(&slice, &path)
                .with_context(|| format!("writing {}", path.display()))?;
            debug!(part = i, rows = slice.num_rows(), "wrote part");
            Ok(())
        })?;

    // marker is last: its presence implies every part is in place
    File::create(dir.join(SUCCESS_MARKER)).context("creating _SUCCESS marker")?;
    info!(rows = table.num_rows(), "parquet write complete");
    Ok(())
}

fn write_part(table: &Table, path: &Path) -> Result<()> {
    let batch = to_record_batch(table)?;
    let props = WriterProperties::builder()
        .set_compression(Compression::BROTLI(BrotliLevel::try_new(5)?))
        .build();

    let tmp_path = path.with_extension("tmp");
    let file = File::create(&tmp_path)
        .with_context(|| format!("creating {}", tmp_path.display()))?;
    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), Some(props)).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch to parquet")?;
    writer.close().context("closing parquet writer")?;

    fs::rename(&tmp_path, path)
        .with_context(|| format!("renaming {} -> {}", tmp_path.display(), path.display()))?;
    Ok(())
}

/// Read a Parquet part, or a whole output directory (parts concatenated in
/// filename order). The container's types are authoritative and map straight
/// back to column kinds.
#[tracing::instrument(level = "debug", skip(path), fields(path = %path.as_ref().display()))]
pub fn read_parquet<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    if path.is_dir() {
        let mut parts: Vec<PathBuf> = fs::read_dir(path)
            .with_context(|| format!("reading {}", path.display()))?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("parquet"))
            .collect();
        parts.sort();
        anyhow::ensure!(!parts.is_empty(), "no parquet parts under {}", path.display());

        let mut out: Option<Table> = None;
        for part in parts {
            let t = read_single(&part)?;
            match &mut out {
                None => out = Some(t),
                Some(acc) => {
                    anyhow::ensure!(
                        acc.columns() == t.columns(),
                        "part {} disagrees on schema",
                        part.display()
                    );
                    for row in t.raw_rows() {
                        acc.push_row(row.clone())?;
                    }
                }
            }
        }
        Ok(out.unwrap_or_else(|| Table::from_parts(Vec::new(), Vec::new())))
    } else {
        read_single(path)
    }
}

fn read_single(path: &Path) -> Result<Table> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .with_context(|| format!("reading parquet metadata of {}", path.display()))?
        .build()
        .context("building parquet reader")?;

    let mut out: Option<Table> = None;
    for batch in reader {
        let batch = batch.context("decoding record batch")?;
        let t = from_record_batch(&batch)?;
        match &mut out {
            None => out = Some(t),
            Some(acc) => {
                for row in t.raw_rows() {
                    acc.push_row(row.clone())?;
                }
            }
        }
    }
    // a parquet file with no batches still carries a schema
    match out {
        Some(t) => Ok(t),
        None => {
            let file = File::open(path)?;
            let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
            let columns = columns_from_arrow(builder.schema())?;
            Ok(Table::from_parts(columns, Vec::new()))
        }
    }
}

fn columns_from_arrow(schema: &arrow::datatypes::Schema) -> Result<Vec<Column>> {
    schema
        .fields()
        .iter()
        .map(|f| {
            let kind = from_arrow_type(f.data_type()).ok_or_else(|| {
                anyhow!(
                    "unsupported arrow type {:?} for column `{}`",
                    f.data_type(),
                    f.name()
                )
            })?;
            Ok(Column::new(f.name().clone(), kind))
        })
        .collect()
}

/// Build an Arrow RecordBatch from a table, one typed array per column.
pub fn to_record_batch(table: &Table) -> Result<RecordBatch> {
    let schema = build_arrow_schema(table.columns());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(table.num_columns());

    for (i, col) in table.columns().iter().enumerate() {
        let array: ArrayRef = match col.kind {
            DataKind::Str => {
                let mut b = StringBuilder::new();
                for row in table.raw_rows() {
                    match &row[i] {
                        Value::Str(s) => b.append_value(s),
                        Value::Null => b.append_null(),
                        other => bail!("column `{}` holds non-string value {:?}", col.name, other),
                    }
                }
                Arc::new(b.finish())
            }
            DataKind::Int => {
                let mut b = Int64Builder::new();
                for row in table.raw_rows() {
                    match &row[i] {
                        Value::Int(v) => b.append_value(*v),
                        Value::Null => b.append_null(),
                        other => bail!("column `{}` holds non-integer value {:?}", col.name, other),
                    }
                }
                Arc::new(b.finish())
            }
            DataKind::Date => {
                let mut b = Date32Builder::new();
                for row in table.raw_rows() {
                    match &row[i] {
                        Value::Date(d) => b.append_value(Date32Type::from_naive_date(*d)),
                        Value::Null => b.append_null(),
                        other => bail!("column `{}` holds non-date value {:?}", col.name, other),
                    }
                }
                Arc::new(b.finish())
            }
        };
        arrays.push(array);
    }

    RecordBatch::try_new(schema, arrays).context("building record batch")
}

/// Rebuild a table from an Arrow RecordBatch.
pub fn from_record_batch(batch: &RecordBatch) -> Result<Table> {
    let columns = columns_from_arrow(&batch.schema())?;
    let mut rows: Vec<Vec<Value>> = vec![Vec::with_capacity(columns.len()); batch.num_rows()];

    for (i, col) in columns.iter().enumerate() {
        let arr = batch.column(i);
        match col.kind {
            DataKind::Str => {
                let sarr = arr
                    .as_any()
                    .downcast_ref::<StringArray>()
                    .ok_or_else(|| anyhow!("column `{}` is not a string array", col.name))?;
                for (r, row) in rows.iter_mut().enumerate() {
                    row.push(if sarr.is_null(r) {
                        Value::Null
                    } else {
                        Value::Str(sarr.value(r).to_string())
                    });
                }
            }
            DataKind::Int => {
                let iarr = arr
                    .as_any()
                    .downcast_ref::<Int64Array>()
                    .ok_or_else(|| anyhow!("column `{}` is not an int64 array", col.name))?;
                for (r, row) in rows.iter_mut().enumerate() {
                    row.push(if iarr.is_null(r) {
                        Value::Null
                    } else {
                        Value::Int(iarr.value(r))
                    });
                }
            }
            DataKind::Date => {
                let darr = arr
                    .as_any()
                    .downcast_ref::<Date32Array>()
                    .ok_or_else(|| anyhow!("column `{}` is not a date32 array", col.name))?;
                for (r, row) in rows.iter_mut().enumerate() {
                    row.push(if darr.is_null(r) {
                        Value::Null
                    } else {
                        Value::Date(Date32Type::to_naive_date(darr.value(r)))
                    });
                }
            }
        }
    }

    Ok(Table::from_parts(columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn date(y: i32, m: u32, d: u32) -> Value {
        Value::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn typed_table(rows: usize) -> Table {
        let mut t = Table::new(vec![
            Column::new("policy", DataKind::Str),
            Column::new("premium", DataKind::Int),
            Column::new("start_date", DataKind::Date),
        ])
        .unwrap();
        for i in 0..rows {
            t.push_row(vec![
                Value::Str(format!("CAR{:04}", i + 1)),
                Value::Int(1000 - i as i64),
                date(2018 + (i % 3) as i32, 1, 1),
            ])
            .unwrap();
        }
        t
    }

    #[test]
    fn record_batch_round_trips() -> Result<()> {
        let mut t = typed_table(3);
        t.push_row(vec![Value::Null, Value::Null, Value::Null])?;
        let restored = from_record_batch(&to_record_batch(&t)?)?;
        assert_eq!(restored, t);
        Ok(())
    }

    #[test]
    fn mixed_kind_column_is_rejected() {
        let mut t = typed_table(1);
        t.push_row(vec!["CAR0002".into(), "oops".into(), Value::Null])
            .unwrap();
        assert!(to_record_batch(&t).is_err());
    }

    #[test]
    fn writes_requested_parts_and_marker() -> Result<()> {
        let dir = tempdir()?;
        let t = typed_table(10);
        write_parquet(&t, dir.path(), 3)?;

        let mut names: Vec<String> = fs::read_dir(dir.path())?
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                SUCCESS_MARKER.to_string(),
                "part-00000.parquet".to_string(),
                "part-00001.parquet".to_string(),
                "part-00002.parquet".to_string(),
            ]
        );
        assert_eq!(fs::metadata(dir.path().join(SUCCESS_MARKER))?.len(), 0);
        Ok(())
    }

    #[test]
    fn directory_read_preserves_row_order_across_parts() -> Result<()> {
        let dir = tempdir()?;
        let t = typed_table(10);
        write_parquet(&t, dir.path(), 3)?;

        let restored = read_parquet(dir.path())?;
        assert_eq!(restored, t);
        Ok(())
    }

    #[test]
    fn single_part_read_uses_container_types() -> Result<()> {
        let dir = tempdir()?;
        let t = typed_table(4);
        write_parquet(&t, dir.path(), 1)?;

        let restored = read_parquet(dir.path().join("part-00000.parquet"))?;
        assert_eq!(restored.columns(), t.columns());
        assert_eq!(restored.num_rows(), 4);
        Ok(())
    }

    #[test]
    fn missing_path_is_a_fatal_error() {
        assert!(read_parquet("no/such/dir").is_err());
        assert!(write_parquet(&typed_table(1), "/proc/definitely-readonly/x", 1).is_err());
    }
}
