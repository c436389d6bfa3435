use anyhow::Result;

use crate::table::{DataKind, Table, Value};

pub const NEW_BUSINESS: &str = "New Business";
pub const RENEWAL: &str = "Renewal";

/// Derived `status` column: `"New Business"` when the term starts at policy
/// inception (`start_date == inception_date`, both non-null), `"Renewal"`
/// otherwise. Pure per-row; a null comparand never matches.
pub fn with_status(table: &Table) -> Result<Table> {
    table.require_col("start_date")?;
    table.require_col("inception_date")?;

    Ok(table.with_column("status", DataKind::Str, |row| {
        let start = row.get("start_date").unwrap_or(&Value::Null);
        let inception = row.get("inception_date").unwrap_or(&Value::Null);
        let status = if !start.is_null() && start == inception {
            NEW_BUSINESS
        } else {
            RENEWAL
        };
        Value::Str(status.to_string())
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> Value {
        Value::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn terms() -> Table {
        let mut t = Table::new(vec![
            Column::new("policy", DataKind::Str),
            Column::new("inception_date", DataKind::Date),
            Column::new("start_date", DataKind::Date),
        ])
        .unwrap();
        t.push_row(vec!["CAR0001".into(), date(2018, 1, 1), date(2018, 1, 1)])
            .unwrap();
        t.push_row(vec!["CAR0001".into(), date(2018, 1, 1), date(2019, 1, 1)])
            .unwrap();
        t.push_row(vec!["CAR0009".into(), Value::Null, Value::Null])
            .unwrap();
        t
    }

    #[test]
    fn status_is_new_business_iff_start_equals_inception() {
        let t = with_status(&terms()).unwrap();
        assert_eq!(t.get(0, "status"), Some(&Value::Str(NEW_BUSINESS.into())));
        assert_eq!(t.get(1, "status"), Some(&Value::Str(RENEWAL.into())));
    }

    #[test]
    fn null_comparand_means_renewal() {
        let t = with_status(&terms()).unwrap();
        assert_eq!(t.get(2, "status"), Some(&Value::Str(RENEWAL.into())));
    }

    #[test]
    fn missing_columns_are_an_error() {
        let t = Table::new(vec![Column::new("policy", DataKind::Str)]).unwrap();
        assert!(with_status(&t).is_err());
    }
}
