use thiserror::Error;

use crate::select::ChartKind;

/// Failures that end a pipeline run: the upload cannot be read, or the
/// selection does not name something the active table offers.
#[derive(Debug, Error)]
pub enum Error {
    #[error("could not parse the csv file: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("the csv file needs a throwaway first row followed by a header row")]
    MissingHeader,

    #[error("line {line}: expected {expected} fields, found {found}")]
    TooManyFields {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("column '{0}' is not in the table")]
    UnknownColumn(String),

    #[error("{0} chart is not available for this table")]
    UnsupportedChart(ChartKind),

    #[error("unknown chart kind '{0}', expected one of line, scatter, bar, pie")]
    UnknownChartKind(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a chart cannot be produced for an otherwise valid selection.
/// These are shown to the user; the loaded table stays usable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlotError {
    #[error("Pie chart requires fewer unique categories in the X-axis")]
    TooManyCategories { found: usize, max: usize },

    #[error("column '{0}' is not in the table")]
    MissingColumn(String),

    #[error("column '{0}' has no numeric values to plot")]
    NonNumeric(String),

    #[error("pie slice '{0}' has a negative total")]
    NegativeSlice(String),

    #[error("pie chart has no positive values")]
    EmptyPie,

    #[error("could not draw the chart: {0}")]
    Drawing(String),
}
