use anyhow::Result;
use std::collections::HashMap;
use tracing::debug;

use crate::table::{Column, Table, Value};

/// Suffix applied to right-side columns whose names collide with the left.
/// Both original values survive the join; callers drop what they don't want.
pub const RIGHT_SUFFIX: &str = "_right";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinMode {
    /// Only matching combinations; unmatched rows from either side drop out.
    Inner,
    /// Every left row at least once; unmatched rows get null-filled right
    /// columns.
    Left,
}

/// Range condition: right-side `date` within the left row's `[lo, hi]`,
/// inclusive on both ends.
#[derive(Debug, Clone)]
pub struct DateBetween {
    pub date: String,
    pub lo: String,
    pub hi: String,
}

#[derive(Debug, Clone)]
pub struct JoinSpec {
    /// Equality key, present on both sides.
    pub key: String,
    pub between: Option<DateBetween>,
    pub mode: JoinMode,
}

/// Equi-join with an optional inclusive date-range condition.
///
/// A null key or a null range comparand yields "no match" for that row,
/// never an error.
#[tracing::instrument(level = "debug", skip(left, right, spec), fields(mode = ?spec.mode, key = %spec.key))]
pub fn join(left: &Table, right: &Table, spec: &JoinSpec) -> Result<Table> {
    let lk = left.require_col(&spec.key)?;
    let rk = right.require_col(&spec.key)?;
    let between = spec
        .between
        .as_ref()
        .map(|b| -> Result<(usize, usize, usize)> {
            Ok((
                right.require_col(&b.date)?,
                left.require_col(&b.lo)?,
                left.require_col(&b.hi)?,
            ))
        })
        .transpose()?;

    // output columns: left as-is, right with colliding names suffixed
    let mut columns: Vec<Column> = left.columns().to_vec();
    for col in right.columns() {
        let collides = left.columns().iter().any(|c| c.name == col.name);
        let name = if collides {
            format!("{}{}", col.name, RIGHT_SUFFIX)
        } else {
            col.name.clone()
        };
        columns.push(Column::new(name, col.kind));
    }

    // hash the right side on the key; null keys never match anything
    let mut index: HashMap<&Value, Vec<usize>> = HashMap::new();
    for (i, row) in right.raw_rows().iter().enumerate() {
        if !row[rk].is_null() {
            index.entry(&row[rk]).or_default().push(i);
        }
    }

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for lrow in left.raw_rows() {
        let mut matched = false;
        if !lrow[lk].is_null() {
            if let Some(candidates) = index.get(&lrow[lk]) {
                for &ri in candidates {
                    let rrow = &right.raw_rows()[ri];
                    if let Some((date, lo, hi)) = between {
                        if !date_within(&rrow[date], &lrow[lo], &lrow[hi]) {
                            continue;
                        }
                    }
                    let mut out = lrow.clone();
                    out.extend(rrow.iter().cloned());
                    rows.push(out);
                    matched = true;
                }
            }
        }
        if !matched && spec.mode == JoinMode::Left {
            let mut out = lrow.clone();
            out.extend(std::iter::repeat(Value::Null).take(right.num_columns()));
            rows.push(out);
        }
    }

    debug!(
        left_rows = left.num_rows(),
        right_rows = right.num_rows(),
        out_rows = rows.len(),
        "join complete"
    );
    Ok(Table::from_parts(columns, rows))
}

/// Inclusive containment over calendar dates. Any null or non-date
/// comparand is "no match".
fn date_within(date: &Value, lo: &Value, hi: &Value) -> bool {
    match (date, lo, hi) {
        (Value::Date(d), Value::Date(lo), Value::Date(hi)) => lo <= d && d <= hi,
        _ => false,
    }
}
