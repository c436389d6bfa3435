pub mod csv;
pub mod parquet;

pub use csv::read_csv;
pub use parquet::{read_parquet, write_parquet, SUCCESS_MARKER};
