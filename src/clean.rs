use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::{debug, info};

use crate::load::RawTable;
use crate::table::{Column, Series, Table};
use crate::{DT_FORMAT, NONE_STR, SENTINEL_STR};

/// Date-time layouts tried in order after `DT_FORMAT`.
/// Ambiguous slash dates are read month first.
const DT_FORMATS: [&str; 12] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
];

/// Date-only layouts, read as midnight.
const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y", "%d.%m.%Y"];

/// Parses a timestamp cell, `None` when no known layout matches.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(t) = NaiveDateTime::parse_from_str(s, DT_FORMAT) {
        return Some(t);
    }
    for fmt in DT_FORMATS.iter() {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(t);
        }
    }
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.naive_utc());
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parses a numeric cell; anything that is not a finite number is `None`.
/// `"0"` is a number like any other.
pub fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Swaps the "not recorded" token for the none marker.
pub fn replace_sentinel(cell: &str) -> &str {
    if cell == SENTINEL_STR {
        NONE_STR
    } else {
        cell
    }
}

/// Types a column of cells: numeric when at least one cell is a number,
/// with NaN for the others; text otherwise, with `None` for empty cells.
pub fn coerce_numeric(cells: &[&str]) -> Series {
    let numbers: Vec<Option<f64>> = cells.iter().map(|c| parse_number(c)).collect();
    if numbers.iter().any(Option::is_some) {
        Series::Numeric(numbers.into_iter().map(|n| n.unwrap_or(f64::NAN)).collect())
    } else {
        Series::Text(
            cells
                .iter()
                .map(|c| {
                    if c.is_empty() {
                        None
                    } else {
                        Some(c.to_string())
                    }
                })
                .collect(),
        )
    }
}

/// Turns the raw text table into a typed one:
/// 1) parse the timestamps, 2) drop the rows without one,
/// 3) replace the sentinel token, 4) coerce the other columns to numbers.
/// Rows are only ever removed.
pub fn clean(raw: &RawTable) -> Table {
    let parsed: Vec<Option<NaiveDateTime>> = raw.column(0).map(parse_datetime).collect();

    let mut time: Vec<NaiveDateTime> = Vec::with_capacity(parsed.len());
    let mut kept: Vec<usize> = Vec::with_capacity(parsed.len());
    for (i, t) in parsed.into_iter().enumerate() {
        match t {
            Some(t) => {
                time.push(t);
                kept.push(i);
            }
            None => debug!("dropping row {}, invalid timestamp '{}'", i, raw.rows[i][0]),
        }
    }
    let dropped = raw.n_rows() - kept.len();
    if dropped > 0 {
        info!("dropped {} rows with invalid timestamps", dropped);
    }

    let columns: Vec<Column> = raw
        .headers
        .iter()
        .enumerate()
        .skip(1)
        .map(|(j, name)| {
            let cells: Vec<&str> = kept
                .iter()
                .map(|&i| replace_sentinel(&raw.rows[i][j]))
                .collect();
            let series = coerce_numeric(&cells);
            if let Series::Text(_) = series {
                debug!("column '{}' kept as text", name);
            }
            Column::new(name.clone(), series)
        })
        .collect();

    Table::new(time, columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn raw(csv: &str) -> RawTable {
        RawTable::from_bytes(csv.as_bytes()).unwrap()
    }

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn documented_example() {
        let t = clean(&raw(
            "junk,junk\nTimestamp,Value,Category\n2024-01-01,5,A\n2024-01-01,NR,B\nbad-date,3,C\n",
        ));
        assert_eq!(t.n_rows(), 2);
        assert_eq!(t.timestamps(), &[day(1), day(1)]);
        let v = t.column("Value").unwrap().series.as_numeric().unwrap();
        assert_eq!(v[0], 5.0);
        assert!(v[1].is_nan());
        assert_eq!(
            t.column("Category").unwrap().series,
            Series::Text(vec![Some("A".to_string()), Some("B".to_string())])
        );
    }

    #[test]
    fn zero_stays_zero() {
        let t = clean(&raw("x\nt,v\n2024-01-01,0\n2024-01-02,0.0\n2024-01-03,\n"));
        let v = t.column("v").unwrap().series.as_numeric().unwrap();
        assert_eq!(v[0], 0.0);
        assert_eq!(v[1], 0.0);
        assert!(v[2].is_nan());
    }

    #[test]
    fn sentinel_becomes_none_marker() {
        assert_eq!(replace_sentinel("NR"), "none");
        assert_eq!(replace_sentinel("nr"), "nr");
        assert_eq!(replace_sentinel("5"), "5");
        let t = clean(&raw("x\nt,note\n2024-01-01,NR\n2024-01-02,ok\n2024-01-03,\n"));
        assert_eq!(
            t.column("note").unwrap().series,
            Series::Text(vec![Some("none".to_string()), Some("ok".to_string()), None])
        );
    }

    #[test]
    fn timestamp_layouts() {
        let noon = NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();
        for s in [
            "2024-03-04 12:30:00",
            "2024-03-04T12:30:00",
            "2024-03-04 12:30",
            "2024/03/04 12:30:00",
            "03/04/2024 12:30",
            "2024-03-04T12:30:00Z",
            "2024-03-04T14:30:00+02:00",
            " 2024-03-04 12:30:00.000 ",
        ]
        .iter()
        {
            assert_eq!(parse_datetime(s), Some(noon), "{}", s);
        }
        assert_eq!(parse_datetime("2024-01-05"), Some(day(5)));
        assert_eq!(parse_datetime("25/01/2024").map(|t| t.date()), NaiveDate::from_ymd_opt(2024, 1, 25));
        assert_eq!(parse_datetime("bad-date"), None);
        assert_eq!(parse_datetime(""), None);
        assert_eq!(parse_datetime("2024-13-40"), None);
    }

    #[test]
    fn numbers() {
        assert_eq!(parse_number(" 12.5 "), Some(12.5));
        assert_eq!(parse_number("-3"), Some(-3.0));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number("none"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("12 kg"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("-Infinity"), None);
        assert_eq!(parse_number("NaN"), None);
    }

    #[test]
    fn infinite_cells_become_null() {
        let t = clean(&raw("junk\nt,v\n2024-01-01,1\n2024-01-02,inf\n"));
        let v = t.column("v").unwrap().series.as_numeric().unwrap();
        assert_eq!(v[0], 1.0);
        assert!(v[1].is_nan());
    }

    #[test]
    fn all_rows_invalid() {
        let t = clean(&raw("x\nt,v\nnope,1\nstill no,2\n"));
        assert_eq!(t.n_rows(), 0);
        assert_eq!(t.column_names(), vec!["Timestamp", "v"]);
    }

    proptest! {
        #[test]
        fn rows_only_decrease(cells in proptest::collection::vec(
            (prop_oneof![Just("2024-01-01"), Just("2024-02-03 10:00:00"), Just("bad"), Just("")],
             prop_oneof![Just("0"), Just("NR"), Just("1.5"), Just("x")]),
            0..40,
        )) {
            let mut csv = String::from("junk\nt,v\n");
            for (t, v) in cells.iter() {
                csv.push_str(&format!("{},{}\n", t, v));
            }
            let raw = RawTable::from_bytes(csv.as_bytes()).unwrap();
            let table = clean(&raw);
            prop_assert!(table.n_rows() <= raw.n_rows());
            let valid = cells.iter().filter(|(t, _)| parse_datetime(t).is_some()).count();
            prop_assert_eq!(table.n_rows(), valid);
        }

        #[test]
        fn zero_is_never_null(n in 1usize..20, k in 0usize..20) {
            let mut csv = String::from("junk\nt,v\n");
            for i in 0..n {
                let v = if i == k % n { "0".to_string() } else { format!("{}", i + 1) };
                csv.push_str(&format!("2024-01-01 00:00:{:02},{}\n", i, v));
            }
            let table = clean(&RawTable::from_bytes(csv.as_bytes()).unwrap());
            let v = table.column("v").unwrap().series.as_numeric().unwrap();
            prop_assert_eq!(v[k % n], 0.0);
        }
    }
}
