use tracing::{info, warn};

use super::classify::{classify, ColumnAction};
use super::date::parse_yyyymmdd;
use crate::table::{Column, DataKind, Table, Value};

/// Per-column count of cells a permissive cast degraded to null.
///
/// Advisory only: a nonzero count usually means dirty source data, never a
/// failed stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CastReport {
    pub degraded: Vec<(String, usize)>,
}

impl CastReport {
    pub fn total_degraded(&self) -> usize {
        self.degraded.iter().map(|(_, n)| n).sum()
    }
}

/// Column classification & cast stage using the fixed rule in [`classify`]:
/// allowlisted names become integers, `_date`-suffixed string columns become
/// calendar dates.
pub fn normalize(table: &Table) -> (Table, CastReport) {
    normalize_with(table, classify)
}

/// Cast stage over an arbitrary classification rule.
///
/// Converts each column's values according to the rule's verdict. Malformed
/// cells degrade to null rather than failing the stage. Row count and column
/// order are unchanged, and applying the stage twice yields the same table
/// as applying it once.
pub fn normalize_with<R>(table: &Table, rule: R) -> (Table, CastReport)
where
    R: Fn(&str, DataKind) -> ColumnAction,
{
    let actions: Vec<ColumnAction> = table
        .columns()
        .iter()
        .map(|c| rule(&c.name, c.kind))
        .collect();

    let mut columns = Vec::with_capacity(table.num_columns());
    let mut degraded = vec![0usize; table.num_columns()];

    for (col, action) in table.columns().iter().zip(&actions) {
        let kind = match action {
            ColumnAction::Keep => col.kind,
            ColumnAction::CastInteger => {
                info!(column = %col.name, "casting column to integer");
                DataKind::Int
            }
            ColumnAction::ParseDate(format) => {
                info!(column = %col.name, format, "parsing column as date");
                DataKind::Date
            }
        };
        columns.push(Column::new(col.name.clone(), kind));
    }

    let rows = table
        .raw_rows()
        .iter()
        .map(|row| {
            row.iter()
                .zip(&actions)
                .enumerate()
                .map(|(i, (v, action))| cast_cell(v, action, &mut degraded[i]))
                .collect()
        })
        .collect();

    let report = CastReport {
        degraded: table
            .columns()
            .iter()
            .zip(degraded)
            .filter(|(_, n)| *n > 0)
            .map(|(c, n)| (c.name.clone(), n))
            .collect(),
    };
    if report.total_degraded() > 0 {
        warn!(
            cells = report.total_degraded(),
            columns = ?report.degraded,
            "malformed cells degraded to null during cast"
        );
    }

    (Table::from_parts(columns, rows), report)
}

fn cast_cell(v: &Value, action: &ColumnAction, degraded: &mut usize) -> Value {
    let s = match (action, v) {
        (ColumnAction::Keep, _) => return v.clone(),
        // already-typed cells pass through; only strings are converted
        (_, Value::Str(s)) => s.trim(),
        (_, other) => return other.clone(),
    };
    if s.is_empty() {
        return Value::Null;
    }
    let parsed = match action {
        ColumnAction::CastInteger => s.parse::<i64>().ok().map(Value::Int),
        ColumnAction::ParseDate(_) => parse_yyyymmdd(s).map(Value::Date),
        ColumnAction::Keep => unreachable!(),
    };
    match parsed {
        Some(v) => v,
        None => {
            *degraded += 1;
            Value::Null
        }
    }
}
