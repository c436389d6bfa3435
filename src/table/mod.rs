mod display;
mod value;

pub use value::{DataKind, Value};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// A single column definition.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Eq, Hash)]
pub struct Column {
    pub name: String,
    pub kind: DataKind,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: DataKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// An ordered sequence of rows sharing one column set.
///
/// Tables are values: every transformation builds and returns a new `Table`,
/// the input is never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
}

/// Borrowed view of one row, with lookup by column name.
#[derive(Clone, Copy)]
pub struct RowRef<'a> {
    table: &'a Table,
    idx: usize,
}

impl<'a> RowRef<'a> {
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        let col = self.table.col_index(name)?;
        Some(&self.table.rows[self.idx][col])
    }

    pub fn index(&self) -> usize {
        self.idx
    }
}

impl Table {
    /// Create an empty table, rejecting duplicate column names.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        for (i, c) in columns.iter().enumerate() {
            if columns[..i].iter().any(|o| o.name == c.name) {
                return Err(anyhow!("duplicate column name `{}`", c.name));
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    /// Internal constructor for stages that have already built consistent
    /// columns and rows.
    pub(crate) fn from_parts(columns: Vec<Column>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(anyhow!(
                "row has {} cells, table has {} columns",
                row.len(),
                self.columns.len()
            ));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = RowRef<'_>> {
        (0..self.rows.len()).map(move |idx| RowRef { table: self, idx })
    }

    pub(crate) fn raw_rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn col_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub(crate) fn require_col(&self, name: &str) -> Result<usize> {
        self.col_index(name)
            .ok_or_else(|| anyhow!("no column named `{}`", name))
    }

    pub fn value(&self, row: usize, col: usize) -> &Value {
        &self.rows[row][col]
    }

    pub fn get(&self, row: usize, name: &str) -> Option<&Value> {
        let col = self.col_index(name)?;
        self.rows.get(row).map(|r| &r[col])
    }

    /// Projection: keep only the named columns, in the order given.
    pub fn select(&self, names: &[&str]) -> Result<Table> {
        let idxs = names
            .iter()
            .map(|n| self.require_col(n))
            .collect::<Result<Vec<_>>>()?;
        let columns = idxs.iter().map(|&i| self.columns[i].clone()).collect();
        let rows = self
            .rows
            .iter()
            .map(|r| idxs.iter().map(|&i| r[i].clone()).collect())
            .collect();
        Ok(Table::from_parts(columns, rows))
    }

    /// Drop the named columns; names that don't exist are ignored.
    pub fn drop_columns(&self, names: &[&str]) -> Table {
        let keep: Vec<usize> = (0..self.columns.len())
            .filter(|&i| !names.contains(&self.columns[i].name.as_str()))
            .collect();
        let columns = keep.iter().map(|&i| self.columns[i].clone()).collect();
        let rows = self
            .rows
            .iter()
            .map(|r| keep.iter().map(|&i| r[i].clone()).collect())
            .collect();
        Table::from_parts(columns, rows)
    }

    /// Rename a column. If a column named `to` already exists it is dropped
    /// first and the renamed column silently takes its place — the permissive
    /// behavior of the reference engine, kept for compatibility.
    pub fn rename(&self, from: &str, to: &str) -> Result<Table> {
        let src = self.require_col(from)?;
        if from == to {
            return Ok(self.clone());
        }
        let mut out = self.clone();
        if let Some(existing) = out.col_index(to) {
            out.columns.remove(existing);
            for row in &mut out.rows {
                row.remove(existing);
            }
        }
        let src = out.col_index(from).unwrap_or(src);
        out.columns[src].name = to.to_string();
        Ok(out)
    }

    /// Add a column computed per row. If a column of that name already
    /// exists it is replaced in place; otherwise the new column is appended.
    pub fn with_column<F>(&self, name: &str, kind: DataKind, f: F) -> Table
    where
        F: Fn(RowRef<'_>) -> Value,
    {
        let values: Vec<Value> = self.rows().map(f).collect();
        let mut out = self.clone();
        match out.col_index(name) {
            Some(i) => {
                out.columns[i].kind = kind;
                for (row, v) in out.rows.iter_mut().zip(values) {
                    row[i] = v;
                }
            }
            None => {
                out.columns.push(Column::new(name, kind));
                for (row, v) in out.rows.iter_mut().zip(values) {
                    row.push(v);
                }
            }
        }
        out
    }

    /// Predicate filter: keep rows for which `f` returns true.
    pub fn filter<F>(&self, f: F) -> Table
    where
        F: Fn(RowRef<'_>) -> bool,
    {
        let rows = self
            .rows()
            .filter(|r| f(*r))
            .map(|r| self.rows[r.idx].clone())
            .collect();
        Table::from_parts(self.columns.clone(), rows)
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> Table {
        let rows = self.rows.iter().take(n).cloned().collect();
        Table::from_parts(self.columns.clone(), rows)
    }

    /// Contiguous slice of rows, for splitting output into parts.
    pub(crate) fn slice(&self, start: usize, len: usize) -> Table {
        let end = (start + len).min(self.rows.len());
        let rows = self.rows[start.min(self.rows.len())..end].to_vec();
        Table::from_parts(self.columns.clone(), rows)
    }

    /// Fixed-width rendering of the first `n` rows, for inspection.
    pub fn show(&self, n: usize) -> String {
        display::render(self, n)
    }
}
