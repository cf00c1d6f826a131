pub mod clean;
pub mod cli;
pub mod error;
pub mod load;
pub mod pipeline;
pub mod render;
pub mod resample;
pub mod select;
pub mod table;

pub use error::{Error, PlotError, Result};
pub use pipeline::{run, Dashboard, PipelineConfig, Request, Response};
pub use render::{render, Figure, Plot, Slice, XScale};
pub use select::{ChartKind, ColumnChoices, Selection};
pub use table::{Column, Series, Table, Value};

pub const VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");

/// Canonical date-time format, used for display and tried first when parsing.
pub const DT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Name given to the first column of every loaded table.
pub const TIMESTAMP: &str = "Timestamp";

/// "Not recorded" token found in the source data.
pub const SENTINEL_STR: &str = "NR";
/// Marker replacing the sentinel before numeric coercion.
pub const NONE_STR: &str = "none";

/// Pie charts with more distinct X values than this are refused.
pub const PIE_MAX_CATEGORIES: usize = 10;

/// Min and max of a slice, `None` when the slice is empty.
/// Values that do not compare with themselves (NaN) are skipped.
pub fn min_and_max<T: std::cmp::PartialOrd + Copy>(s: &[T]) -> Option<(T, T)> {
    let mut self_iter = s.iter().filter(|v| v.partial_cmp(v).is_some());
    let (mut min, mut max) = match self_iter.next() {
        Some(v) => (*v, *v),
        None => return None,
    };
    for es in self_iter {
        if *es > max {
            max = *es
        }
        if *es < min {
            min = *es
        }
    }
    Some((min, max))
}

/// Date-time label format suited to the time span of the x axis.
pub fn suitable_xfmt(d: chrono::Duration) -> &'static str {
    if d > chrono::Duration::weeks(1) {
        "%y-%m-%d"
    } else if d > chrono::Duration::days(1) {
        "%m-%d %H"
    } else {
        "%d %H:%M"
    }
}
