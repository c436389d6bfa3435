pub mod io;
pub mod schema;
pub mod table;
pub mod transform;

pub use table::{Column, DataKind, Table, Value};
