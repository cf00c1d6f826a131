use csv_dashboard::{
    run, ChartKind, Error, Figure, Plot, PipelineConfig, PlotError, Request, Series, Value,
};
use proptest::prelude::*;

const EXAMPLE: &[u8] =
    b"junk,junk\nTimestamp,Value,Category\n2024-01-01,5,A\n2024-01-01,NR,B\nbad-date,3,C\n";

fn daily() -> PipelineConfig {
    PipelineConfig {
        aggregate: true,
        ..PipelineConfig::default()
    }
}

fn chart(bytes: &[u8], x: &str, y: &str, kind: ChartKind) -> Result<Figure, PlotError> {
    run(&Request {
        bytes,
        x: Some(x.to_string()),
        y: Some(y.to_string()),
        kind: Some(kind),
        render: true,
        ..Request::default()
    })
    .unwrap()
    .chart
    .unwrap()
}

/// One row per hour starting at 2024-01-01 00:00, label `L{i % labels}`.
fn hourly_csv(rows: usize, labels: usize) -> String {
    let mut csv = String::from("exported by logger\ntime,load,label\n");
    for i in 0..rows {
        csv.push_str(&format!(
            "2024-01-{:02} {:02}:00:00,{},L{}\n",
            1 + i / 24,
            i % 24,
            i % 7,
            i % labels
        ));
    }
    csv
}

#[test]
fn example_upload_is_cleaned() {
    let r = run(&Request {
        bytes: EXAMPLE,
        ..Request::default()
    })
    .unwrap();
    assert_eq!(r.table.column_names(), vec!["Timestamp", "Value", "Category"]);
    assert_eq!(r.table.n_rows(), 2);
    let value = r.table.column("Value").unwrap().series.as_numeric().unwrap();
    assert_eq!(value[0], 5.0);
    assert!(value[1].is_nan());
    assert_eq!(r.choices.default_x, "Timestamp");
    assert_eq!(r.choices.default_y, "Value");
}

#[test]
fn first_header_is_renamed() {
    let r = run(&Request {
        bytes: hourly_csv(3, 3).as_bytes(),
        ..Request::default()
    })
    .unwrap();
    assert_eq!(r.table.column_names()[0], "Timestamp");
    assert!(matches!(
        r.table.columns()[0].series.value(0),
        Value::Timestamp(_)
    ));
}

#[test]
fn daily_rows_match_distinct_days() {
    let csv = hourly_csv(60, 3);
    let r = run(&Request {
        bytes: csv.as_bytes(),
        config: daily(),
        ..Request::default()
    })
    .unwrap();
    assert_eq!(r.table.n_rows(), 3);
    assert_eq!(r.table.column_names(), vec!["Timestamp", "load", "label"]);
    assert!(!r.choices.kinds.contains(&ChartKind::Pie));
    match &r.table.column("label").unwrap().series {
        Series::Text(v) => assert_eq!(v[0].as_deref(), Some("L0")),
        other => panic!("label should stay text, got {:?}", other),
    }
}

#[test]
fn daily_mean_of_two_values() {
    let csv = b"x\nt,y\n2024-05-01 06:00:00,4\n2024-05-01 18:00:00,6\n";
    let r = run(&Request {
        bytes: csv,
        config: daily(),
        ..Request::default()
    })
    .unwrap();
    assert_eq!(r.table.column("y").unwrap().series, Series::Numeric(vec![5.0]));
}

#[test]
fn pie_limit_is_ten_categories() {
    let ten = hourly_csv(30, 10);
    let f = chart(ten.as_bytes(), "label", "load", ChartKind::Pie).unwrap();
    assert_eq!(f.slice_count(), 10);

    let eleven = hourly_csv(30, 11);
    let err = chart(eleven.as_bytes(), "label", "load", ChartKind::Pie).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Pie chart requires fewer unique categories in the X-axis"
    );
}

#[test]
fn every_kind_renders_on_the_example() {
    for kind in ChartKind::ALL.iter() {
        let f = chart(EXAMPLE, "Category", "Value", *kind).unwrap();
        assert_eq!(f.kind, *kind);
        match (&f.plot, kind) {
            (Plot::Pie { slices, .. }, ChartKind::Pie) => assert_eq!(slices.len(), 2),
            (Plot::Xy { points, .. }, _) => assert_eq!(points.len(), 2),
            (plot, _) => panic!("unexpected plot {:?} for {}", plot, kind),
        }
    }
}

#[test]
fn infinite_cells_still_draw() {
    let csv = b"junk\nt,v\n2024-01-01,1\n2024-01-02,inf\n2024-01-03,2\n";
    for kind in [ChartKind::Line, ChartKind::Scatter, ChartKind::Bar].iter() {
        let figure = chart(csv, "Timestamp", "v", *kind).unwrap();
        assert!(figure.to_svg_string().unwrap().contains(&figure.title));
    }
}

#[test]
fn pie_request_on_daily_table_is_refused() {
    let r = run(&Request {
        bytes: EXAMPLE,
        config: daily(),
        kind: Some(ChartKind::Pie),
        render: true,
        ..Request::default()
    });
    assert!(matches!(r, Err(Error::UnsupportedChart(ChartKind::Pie))));
}

#[test]
fn unknown_column_is_refused() {
    let r = run(&Request {
        bytes: EXAMPLE,
        y: Some("Weight".to_string()),
        render: true,
        ..Request::default()
    });
    assert!(matches!(r, Err(Error::UnknownColumn(ref c)) if c == "Weight"));
}

#[test]
fn malformed_upload_is_an_error() {
    let r = run(&Request {
        bytes: b"junk\nt,v\n2024-01-01,1,2,3\n",
        ..Request::default()
    });
    assert!(matches!(r, Err(Error::TooManyFields { .. })));
}

proptest! {
    #[test]
    fn daily_rows_equal_distinct_days(days in proptest::collection::vec(1u32..28, 1..50)) {
        let mut csv = String::from("junk\nt,v,c\n");
        for (i, d) in days.iter().enumerate() {
            csv.push_str(&format!("2024-02-{:02} {:02}:00:00,{},x{}\n", d, i % 24, i, i));
        }
        let r = run(&Request { bytes: csv.as_bytes(), config: daily(), ..Request::default() }).unwrap();
        let mut distinct = days.clone();
        distinct.sort_unstable();
        distinct.dedup();
        prop_assert_eq!(r.table.n_rows(), distinct.len());
        prop_assert_eq!(r.table.n_columns(), 3);
    }
}
