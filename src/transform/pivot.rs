use anyhow::Result;
use std::collections::{BTreeMap, BTreeSet};

use crate::table::{Column, DataKind, Table, Value};

/// Count cross-tabulation of two categorical columns.
///
/// One output row per distinct `row_key` value, one generated column per
/// distinct `col_key` value (lexicographic order), each cell holding the
/// count of source rows for that pair and 0 where none match. The first
/// output column is named `{row_key}_{col_key}`; null keys group under the
/// rendered string `null`.
pub fn crosstab(table: &Table, row_key: &str, col_key: &str) -> Result<Table> {
    let r = table.require_col(row_key)?;
    let c = table.require_col(col_key)?;

    let mut col_values: BTreeSet<String> = BTreeSet::new();
    let mut counts: BTreeMap<Value, BTreeMap<String, i64>> = BTreeMap::new();

    for row in table.raw_rows() {
        let col_value = row[c].to_string();
        col_values.insert(col_value.clone());
        *counts
            .entry(row[r].clone())
            .or_default()
            .entry(col_value)
            .or_insert(0) += 1;
    }

    let mut columns = vec![Column::new(
        format!("{}_{}", row_key, col_key),
        table.columns()[r].kind,
    )];
    for v in &col_values {
        columns.push(Column::new(v.clone(), DataKind::Int));
    }

    let rows = counts
        .into_iter()
        .map(|(key, by_col)| {
            let mut out = Vec::with_capacity(col_values.len() + 1);
            out.push(key);
            for v in &col_values {
                out.push(Value::Int(by_col.get(v).copied().unwrap_or(0)));
            }
            out
        })
        .collect();

    Ok(Table::from_parts(columns, rows))
}
