use chrono::NaiveDateTime;
use std::fmt;

use crate::{DT_FORMAT, TIMESTAMP};

/// Typed values of one column.
#[derive(Debug, Clone, PartialEq)]
pub enum Series {
    Timestamp(Vec<NaiveDateTime>),
    /// NaN stands for a null number.
    Numeric(Vec<f64>),
    /// `None` is an empty cell.
    Text(Vec<Option<String>>),
}

impl Series {
    pub fn len(&self) -> usize {
        match self {
            Series::Timestamp(v) => v.len(),
            Series::Numeric(v) => v.len(),
            Series::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The cell at row `i`; panics when `i` is out of bounds, like slice indexing.
    pub fn value(&self, i: usize) -> Value<'_> {
        match self {
            Series::Timestamp(v) => Value::Timestamp(v[i]),
            Series::Numeric(v) => Value::Number(v[i]),
            Series::Text(v) => match &v[i] {
                Some(s) => Value::Text(s),
                None => Value::Null,
            },
        }
    }

    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            Series::Numeric(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_timestamps(&self) -> Option<&[NaiveDateTime]> {
        match self {
            Series::Timestamp(v) => Some(v),
            _ => None,
        }
    }

    /// Keeps the rows whose index is in `rows`, in that order.
    pub fn take(&self, rows: &[usize]) -> Series {
        match self {
            Series::Timestamp(v) => Series::Timestamp(rows.iter().map(|&i| v[i]).collect()),
            Series::Numeric(v) => Series::Numeric(rows.iter().map(|&i| v[i]).collect()),
            Series::Text(v) => Series::Text(rows.iter().map(|&i| v[i].clone()).collect()),
        }
    }
}

/// Borrowed view of a single cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Timestamp(NaiveDateTime),
    Number(f64),
    Text(&'a str),
    Null,
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Timestamp(t) => write!(f, "{}", t.format(DT_FORMAT)),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
            Value::Null => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub series: Series,
}

impl Column {
    pub fn new(name: impl Into<String>, series: Series) -> Column {
        Column {
            name: name.into(),
            series,
        }
    }
}

/// A cleaned table: the first column is always the `Timestamp` column and
/// every column has the same number of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Builds a table from the timestamps and the remaining columns.
    /// Panics if a column length differs from the timestamp length.
    pub fn new(time: Vec<NaiveDateTime>, rest: Vec<Column>) -> Table {
        let n_rows = time.len();
        for c in rest.iter() {
            assert_eq!(
                c.series.len(),
                n_rows,
                "column '{}' has {} rows, expected {}",
                c.name,
                c.series.len(),
                n_rows
            );
        }
        let mut columns = Vec::with_capacity(rest.len() + 1);
        columns.push(Column::new(TIMESTAMP, Series::Timestamp(time)));
        columns.extend(rest);
        Table { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// First column with the given name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        self.columns[0].series.as_timestamps().unwrap_or(&[])
    }

    pub fn n_rows(&self) -> usize {
        self.timestamps().len()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// The first `n` rows, for previews.
    pub fn head(&self, n: usize) -> Table {
        let rows: Vec<usize> = (0..n.min(self.n_rows())).collect();
        Table {
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), c.series.take(&rows)))
                .collect(),
        }
    }
}

/// Aligned text rendering of the whole table, header first.
impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<Vec<String>> = self
            .columns
            .iter()
            .map(|c| {
                (0..c.series.len())
                    .map(|i| c.series.value(i).to_string())
                    .collect()
            })
            .collect();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .zip(cells.iter())
            .map(|(c, col)| {
                col.iter()
                    .map(|s| s.chars().count())
                    .chain(std::iter::once(c.name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();
        let header: Vec<String> = self
            .columns
            .iter()
            .zip(widths.iter())
            .map(|(c, w)| format!("{:<w$}", c.name, w = w))
            .collect();
        writeln!(f, "{}", header.join(" | ").trim_end())?;
        for i in 0..self.n_rows() {
            let row: Vec<String> = cells
                .iter()
                .zip(widths.iter())
                .map(|(col, w)| format!("{:<w$}", col[i], w = w))
                .collect();
            writeln!(f, "{}", row.join(" | ").trim_end())?;
        }
        Ok(())
    }
}
