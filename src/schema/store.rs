use anyhow::{Context, Result};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use crate::table::Column;

/// Persist the column list for `table_name` as `<table_name>_columns.json`
/// in `dir`, so downstream consumers can pick up the normalized schema
/// without opening a Parquet footer.
///
/// Written atomically: to a tmp file first, then renamed over the target.
pub fn write_columns<P: AsRef<Path>>(table_name: &str, dir: P, cols: &[Column]) -> Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let path = dir.join(format!("{}_columns.json", table_name));
    let tmp_path = dir.join(format!(".{}_columns.json.tmp", table_name));

    let mut tmp = fs::File::create(&tmp_path)
        .with_context(|| format!("creating {}", tmp_path.display()))?;
    serde_json::to_writer_pretty(&mut tmp, cols).context("serializing columns")?;
    tmp.write_all(b"\n")?;

    fs::rename(&tmp_path, &path)
        .with_context(|| format!("renaming {} -> {}", tmp_path.display(), path.display()))?;

    Ok(path)
}

/// Load a previously written column list.
pub fn load_columns<P: AsRef<Path>>(table_name: &str, dir: P) -> Result<Vec<Column>> {
    let path = dir.as_ref().join(format!("{}_columns.json", table_name));
    let f = fs::File::open(&path).with_context(|| format!("opening {}", path.display()))?;
    serde_json::from_reader(f).with_context(|| format!("parsing {}", path.display()))
}
