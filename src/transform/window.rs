use anyhow::Result;
use std::collections::HashMap;
use tracing::debug;

use crate::table::{Column, DataKind, Table, Value};

/// Separator between the partition key and the rank in `composite_key`.
const COMPOSITE_SEPARATOR: &str = "-";

/// Partitioned ranking & running aggregate.
///
/// For each row, computed within its partition (rows sharing the
/// `partition_by` value), ordered by `order_by` ascending with nulls first:
///
/// - `rank`: competition ranking — ties share a rank and the next distinct
///   order value skips the tied count.
/// - `running_total`: inclusive cumulative sum of `sum_col` over rows whose
///   order value is ≤ the current row's (ties land together).
/// - `composite_key`: `"{partition}-{rank}"`.
///
/// Input row order is preserved in the output.
#[tracing::instrument(level = "debug", skip(table))]
pub fn with_partition_rank(
    table: &Table,
    partition_by: &str,
    order_by: &str,
    sum_col: &str,
) -> Result<Table> {
    let p = table.require_col(partition_by)?;
    let o = table.require_col(order_by)?;
    let s = table.require_col(sum_col)?;

    let mut partitions: HashMap<&Value, Vec<usize>> = HashMap::new();
    for (i, row) in table.raw_rows().iter().enumerate() {
        partitions.entry(&row[p]).or_default().push(i);
    }
    debug!(
        rows = table.num_rows(),
        partitions = partitions.len(),
        "computing partitioned rank"
    );

    let mut ranks = vec![Value::Null; table.num_rows()];
    let mut totals = vec![Value::Null; table.num_rows()];
    let mut keys = vec![Value::Null; table.num_rows()];

    for (key, members) in partitions {
        for &i in &members {
            let order = &table.raw_rows()[i][o];
            let mut rank = 1i64;
            let mut total = 0i64;
            for &j in &members {
                let other = &table.raw_rows()[j][o];
                if other < order {
                    rank += 1;
                }
                if other <= order {
                    total += table.raw_rows()[j][s].as_int().unwrap_or(0);
                }
            }
            ranks[i] = Value::Int(rank);
            totals[i] = Value::Int(total);
            keys[i] = Value::Str(format!("{}{}{}", key, COMPOSITE_SEPARATOR, rank));
        }
    }

    let mut columns = table.columns().to_vec();
    columns.push(Column::new("rank", DataKind::Int));
    columns.push(Column::new("running_total", DataKind::Int));
    columns.push(Column::new("composite_key", DataKind::Str));

    let rows = table
        .raw_rows()
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut out = row.clone();
            out.push(ranks[i].clone());
            out.push(totals[i].clone());
            out.push(keys[i].clone());
            out
        })
        .collect();

    Ok(Table::from_parts(columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> Value {
        Value::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn terms() -> Table {
        let mut t = Table::new(vec![
            Column::new("policy", DataKind::Str),
            Column::new("start_date", DataKind::Date),
            Column::new("premium", DataKind::Int),
        ])
        .unwrap();
        // CAR0001 rows deliberately out of order
        t.push_row(vec!["CAR0001".into(), date(2019, 1, 1), 900i64.into()])
            .unwrap();
        t.push_row(vec!["CAR0002".into(), date(2019, 4, 1), 1200i64.into()])
            .unwrap();
        t.push_row(vec!["CAR0001".into(), date(2018, 1, 1), 1000i64.into()])
            .unwrap();
        t.push_row(vec!["CAR0001".into(), date(2020, 1, 1), 800i64.into()])
            .unwrap();
        t
    }

    #[test]
    fn ranks_and_running_totals_per_partition() {
        let out = with_partition_rank(&terms(), "policy", "start_date", "premium").unwrap();
        // input order preserved
        assert_eq!(out.get(0, "start_date"), Some(&date(2019, 1, 1)));

        // CAR0001: 2018 → rank 1/1000, 2019 → rank 2/1900, 2020 → rank 3/2700
        assert_eq!(out.get(2, "rank"), Some(&Value::Int(1)));
        assert_eq!(out.get(2, "running_total"), Some(&Value::Int(1000)));
        assert_eq!(out.get(0, "rank"), Some(&Value::Int(2)));
        assert_eq!(out.get(0, "running_total"), Some(&Value::Int(1900)));
        assert_eq!(out.get(3, "rank"), Some(&Value::Int(3)));
        assert_eq!(out.get(3, "running_total"), Some(&Value::Int(2700)));

        // CAR0002 is its own partition
        assert_eq!(out.get(1, "rank"), Some(&Value::Int(1)));
        assert_eq!(out.get(1, "running_total"), Some(&Value::Int(1200)));
    }

    #[test]
    fn composite_key_concatenates_partition_and_rank() {
        let out = with_partition_rank(&terms(), "policy", "start_date", "premium").unwrap();
        assert_eq!(
            out.get(2, "composite_key"),
            Some(&Value::Str("CAR0001-1".into()))
        );
        assert_eq!(
            out.get(3, "composite_key"),
            Some(&Value::Str("CAR0001-3".into()))
        );
    }

    #[test]
    fn ties_share_a_rank_and_the_next_value_skips() {
        let mut t = Table::new(vec![
            Column::new("policy", DataKind::Str),
            Column::new("start_date", DataKind::Date),
            Column::new("premium", DataKind::Int),
        ])
        .unwrap();
        t.push_row(vec!["P1".into(), date(2020, 1, 1), 100i64.into()])
            .unwrap();
        t.push_row(vec!["P1".into(), date(2020, 1, 1), 200i64.into()])
            .unwrap();
        t.push_row(vec!["P1".into(), date(2021, 1, 1), 50i64.into()])
            .unwrap();

        let out = with_partition_rank(&t, "policy", "start_date", "premium").unwrap();
        // competition ranking: 1, 1, 3 — not dense
        assert_eq!(out.get(0, "rank"), Some(&Value::Int(1)));
        assert_eq!(out.get(1, "rank"), Some(&Value::Int(1)));
        assert_eq!(out.get(2, "rank"), Some(&Value::Int(3)));
        // tied rows are summed together in the running total
        assert_eq!(out.get(0, "running_total"), Some(&Value::Int(300)));
        assert_eq!(out.get(1, "running_total"), Some(&Value::Int(300)));
        assert_eq!(out.get(2, "running_total"), Some(&Value::Int(350)));
    }

    #[test]
    fn null_order_key_sorts_first() {
        let mut t = Table::new(vec![
            Column::new("policy", DataKind::Str),
            Column::new("start_date", DataKind::Date),
            Column::new("premium", DataKind::Int),
        ])
        .unwrap();
        t.push_row(vec!["P1".into(), Value::Null, 10i64.into()])
            .unwrap();
        t.push_row(vec!["P1".into(), date(2020, 1, 1), 20i64.into()])
            .unwrap();

        let out = with_partition_rank(&t, "policy", "start_date", "premium").unwrap();
        assert_eq!(out.get(0, "rank"), Some(&Value::Int(1)));
        assert_eq!(out.get(1, "rank"), Some(&Value::Int(2)));
        assert_eq!(out.get(1, "running_total"), Some(&Value::Int(30)));
    }
}
