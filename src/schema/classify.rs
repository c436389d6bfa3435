use once_cell::sync::Lazy;
use std::collections::HashSet;

use crate::table::DataKind;

/// Columns that always hold integers, whatever the source declared.
static INTEGER_COLUMNS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["premium", "sum_insured", "vehicle_age"]
        .into_iter()
        .collect()
});

/// Name suffix marking calendar-date columns.
pub const DATE_SUFFIX: &str = "_date";

/// Wire format for date columns: 8 ASCII digits, no timezone.
pub const DATE_FORMAT: &str = "yyyyMMdd";

/// What the cast stage should do with one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnAction {
    Keep,
    CastInteger,
    ParseDate(&'static str),
}

/// Pure classification rule from (column name, declared kind) to action.
///
/// Columns already holding a non-string kind pass through untouched, which
/// is what makes the cast stage idempotent.
pub fn classify(name: &str, kind: DataKind) -> ColumnAction {
    if kind != DataKind::Str {
        return ColumnAction::Keep;
    }
    if INTEGER_COLUMNS.contains(name) {
        return ColumnAction::CastInteger;
    }
    if name.ends_with(DATE_SUFFIX) {
        return ColumnAction::ParseDate(DATE_FORMAT);
    }
    ColumnAction::Keep
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowlisted_names_cast_to_integer() {
        assert_eq!(classify("premium", DataKind::Str), ColumnAction::CastInteger);
        assert_eq!(
            classify("sum_insured", DataKind::Str),
            ColumnAction::CastInteger
        );
        assert_eq!(
            classify("vehicle_age", DataKind::Str),
            ColumnAction::CastInteger
        );
    }

    #[test]
    fn date_suffix_parses_as_date() {
        assert_eq!(
            classify("start_date", DataKind::Str),
            ColumnAction::ParseDate(DATE_FORMAT)
        );
        assert_eq!(
            classify("incident_date", DataKind::Str),
            ColumnAction::ParseDate(DATE_FORMAT)
        );
    }

    #[test]
    fn everything_else_is_kept() {
        assert_eq!(classify("policy", DataKind::Str), ColumnAction::Keep);
        assert_eq!(classify("make", DataKind::Str), ColumnAction::Keep);
        // suffix match alone is not enough once the column is already typed
        assert_eq!(classify("start_date", DataKind::Date), ColumnAction::Keep);
        assert_eq!(classify("premium", DataKind::Int), ColumnAction::Keep);
    }
}
