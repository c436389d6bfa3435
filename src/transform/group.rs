use anyhow::Result;
use std::collections::HashMap;

use crate::table::{Column, DataKind, Table, Value};

/// Group aggregate: one output row per distinct `group_col` value holding
/// the sum of `value_col` over that group. Null cells contribute nothing to
/// the sum; a null group value forms its own group.
///
/// Groups appear in first-appearance order, and the sum column is named
/// `sum_{value_col}` so callers can rename it post-hoc.
pub fn group_sum(table: &Table, group_col: &str, value_col: &str) -> Result<Table> {
    let g = table.require_col(group_col)?;
    let v = table.require_col(value_col)?;

    let mut order: Vec<Value> = Vec::new();
    let mut sums: HashMap<Value, i64> = HashMap::new();

    for row in table.raw_rows() {
        let key = &row[g];
        if !sums.contains_key(key) {
            order.push(key.clone());
        }
        *sums.entry(key.clone()).or_insert(0) += row[v].as_int().unwrap_or(0);
    }

    let columns = vec![
        table.columns()[g].clone(),
        Column::new(format!("sum_{}", value_col), DataKind::Int),
    ];
    let rows = order
        .into_iter()
        .map(|key| {
            let total = sums[&key];
            vec![key, Value::Int(total)]
        })
        .collect();

    Ok(Table::from_parts(columns, rows))
}
