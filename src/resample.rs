use chrono::{NaiveDate, NaiveDateTime};
use log::info;
use std::collections::BTreeMap;

use crate::table::{Column, Series, Table};

/// Row indices of each calendar day, days in ascending order.
fn group_by_day(time: &[NaiveDateTime]) -> BTreeMap<NaiveDate, Vec<usize>> {
    let mut days: BTreeMap<NaiveDate, Vec<usize>> = BTreeMap::new();
    for (i, t) in time.iter().enumerate() {
        days.entry(t.date()).or_default().push(i);
    }
    days
}

/// Mean of the non-NaN values, NaN when there are none.
pub fn nanmean(v: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = v
        .filter(|x| !x.is_nan())
        .fold((0., 0usize), |(s, n), x| (s + x, n + 1));
    if n == 0 {
        f64::NAN
    } else {
        sum / n as f64
    }
}

/// Resamples the table to one row per calendar day present in the data.
/// Numeric columns take the daily mean; text columns take the first
/// non-empty value of the day. Every input column is kept, in order, and the
/// timestamp of each row is the day at midnight.
pub fn daily_mean(table: &Table) -> Table {
    let days = group_by_day(table.timestamps());

    let time: Vec<NaiveDateTime> = days
        .keys()
        .filter_map(|d| d.and_hms_opt(0, 0, 0))
        .collect();

    let columns: Vec<Column> = table
        .columns()
        .iter()
        .skip(1)
        .map(|c| {
            let series = match &c.series {
                Series::Numeric(v) => Series::Numeric(
                    days.values()
                        .map(|rows| nanmean(rows.iter().map(|&i| v[i])))
                        .collect(),
                ),
                Series::Text(v) => Series::Text(
                    days.values()
                        .map(|rows| rows.iter().find_map(|&i| v[i].clone()))
                        .collect(),
                ),
                Series::Timestamp(v) => Series::Timestamp(
                    days.values().map(|rows| v[rows[0]]).collect(),
                ),
            };
            Column::new(c.name.clone(), series)
        })
        .collect();

    info!(
        "resampled {} rows to {} daily rows",
        table.n_rows(),
        time.len()
    );
    Table::new(time, columns)
}
