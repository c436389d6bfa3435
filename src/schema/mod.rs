pub mod arrow;
pub mod classify;
pub mod date;
pub mod normalize;
pub mod store;

pub use arrow::{build_arrow_schema, map_to_arrow_type};
pub use classify::{classify, ColumnAction};
pub use normalize::{normalize, normalize_with, CastReport};
pub use store::{load_columns, write_columns};
