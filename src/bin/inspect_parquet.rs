use anyhow::{Context, Result};
use parquet::file::reader::{FileReader, SerializedFileReader};
use std::{env, fs::File, path::Path, process::exit};

use policyflow::io::read_parquet;

/// Print schema, row-group layout, and the first rows of one Parquet part.
fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <PARQUET_FILE>", args[0]);
        exit(1);
    }
    if let Err(e) = inspect(Path::new(&args[1])) {
        eprintln!("Error: {:#}", e);
        exit(1);
    }
}

fn inspect(path: &Path) -> Result<()> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let reader = SerializedFileReader::new(file).context("reading parquet metadata")?;
    let meta = reader.metadata();
    let file_meta = meta.file_metadata();

    println!("=== {} ===", path.display());
    println!("rows:       {}", file_meta.num_rows());
    println!("row groups: {}", meta.num_row_groups());
    println!("size:       {} bytes", std::fs::metadata(path)?.len());
    println!();

    println!("=== Columns ===");
    for col in file_meta.schema_descr().columns() {
        let logical = col
            .logical_type()
            .as_ref()
            .map_or("<none>".to_string(), |lt| format!("{:?}", lt));
        println!(
            "- {:<20} | physical: {:<10?} | logical: {}",
            col.name(),
            col.physical_type(),
            logical
        );
    }
    println!();

    for idx in 0..meta.num_row_groups() {
        let rg = meta.row_group(idx);
        println!(
            "row group {}: {} rows, {} bytes uncompressed",
            idx,
            rg.num_rows(),
            rg.total_byte_size()
        );
    }
    println!();

    let table = read_parquet(path)?;
    println!("{}", table.show(10));

    Ok(())
}
