use arrow::datatypes::{DataType, Field as ArrowField, Schema as ArrowSchema};
use std::sync::Arc;

use crate::table::{Column, DataKind};

/// Map a declared column kind to the Arrow type used on the wire:
/// - Str  → Utf8
/// - Int  → Int64
/// - Date → Date32 (days since epoch, no time-of-day)
pub fn map_to_arrow_type(kind: DataKind) -> DataType {
    match kind {
        DataKind::Str => DataType::Utf8,
        DataKind::Int => DataType::Int64,
        DataKind::Date => DataType::Date32,
    }
}

/// Inverse mapping for reading a columnar container whose types are
/// authoritative. `None` for anything the data model doesn't carry.
pub fn from_arrow_type(dt: &DataType) -> Option<DataKind> {
    match dt {
        DataType::Utf8 => Some(DataKind::Str),
        DataType::Int64 => Some(DataKind::Int),
        DataType::Date32 => Some(DataKind::Date),
        _ => None,
    }
}

/// Build an ArrowSchema (inside an Arc) from a slice of `Column`s.
pub fn build_arrow_schema(cols: &[Column]) -> Arc<ArrowSchema> {
    let fields: Vec<ArrowField> = cols
        .iter()
        .map(|col| ArrowField::new(&col.name, map_to_arrow_type(col.kind), true))
        .collect();

    Arc::new(ArrowSchema::new(fields))
}
